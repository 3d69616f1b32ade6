//! Tests for GitHub pull request and review operations.

use super::*;
use crate::client::ClientConfig;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GithubClient {
    GithubClient::new(ClientConfig::default().with_base_url(server.uri())).expect("client builds")
}

fn pull_request_json() -> serde_json::Value {
    json!({
        "number": 1347,
        "state": "open",
        "title": "Amazing new feature",
        "body": "Please pull these awesome changes in!",
        "html_url": "https://github.com/octocat/Hello-World/pull/1347",
        "diff_url": "https://github.com/octocat/Hello-World/pull/1347.diff",
        "user": { "id": 1, "login": "octocat" },
        "draft": false,
        "merged": null,
        "merged_at": null,
        "merge_commit_sha": null,
        "head": {
            "ref": "new-topic",
            "sha": "6dcb09b5b57875f334f61aebed695e2e4193db5e",
            "repo": { "id": 2, "name": "Hello-World", "full_name": "hubot/Hello-World" }
        },
        "base": { "ref": "master", "sha": "6dcb09b5b57875f334f61aebed695e2e4193db5e" },
        "labels": [ { "name": "bug", "color": "f29513" } ],
        "created_at": "2011-01-26T19:01:12Z",
        "updated_at": "2011-01-26T19:01:12Z"
    })
}

fn comment_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "body": "Me too",
        "html_url": format!("https://github.com/octocat/Hello-World/issues/1347#issuecomment-{}", id),
        "user": { "id": 1, "login": "octocat" },
        "created_at": "2011-04-14T16:00:49Z",
        "updated_at": "2011-04-14T16:00:49Z"
    })
}

fn review_comment_json() -> serde_json::Value {
    json!({
        "id": 10,
        "body": "Great stuff!",
        "path": "file1.txt",
        "commit_id": "6dcb09b5b57875f334f61aebed695e2e4193db5e",
        "line": null,
        "original_line": 2,
        "html_url": "https://github.com/octocat/Hello-World/pull/1#discussion-diff-1",
        "user": { "id": 1, "login": "octocat" }
    })
}

// ============================================================================
// Pull Request Tests
// ============================================================================

#[tokio::test]
async fn test_find_pull_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/pulls/1347"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pull_request_json()))
        .mount(&server)
        .await;

    let pr = PullRequestService::find(&client_for(&server), "octocat/Hello-World", 1347)
        .await
        .expect("pull request found");

    assert_eq!(pr.number, 1347);
    assert_eq!(pr.ref_name, "refs/pull/1347/head");
    assert_eq!(pr.source, "new-topic");
    assert_eq!(pr.target, "master");
    assert_eq!(pr.fork, "hubot/Hello-World");
    assert_eq!(pr.head.path, "refs/heads/new-topic");
    assert_eq!(pr.labels[0].name, "bug");
    assert!(!pr.closed);
    assert!(!pr.merged);
}

#[tokio::test]
async fn test_list_pull_requests_uses_state_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/pulls"))
        .and(query_param("state", "closed"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([pull_request_json()])))
        .mount(&server)
        .await;

    let opts = StateListOptions {
        page: ListOptions::new(1, 10),
        open: false,
        closed: true,
    };
    let page = PullRequestService::list(&client_for(&server), "octocat/Hello-World", &opts)
        .await
        .expect("pull requests listed");

    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn test_create_pull_request_sends_head_and_base() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/octocat/Hello-World/pulls"))
        .and(body_json(json!({
            "title": "Amazing new feature",
            "body": "Please pull these awesome changes in!",
            "head": "new-topic",
            "base": "master"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(pull_request_json()))
        .mount(&server)
        .await;

    let input = PullRequestInput {
        title: "Amazing new feature".to_string(),
        body: "Please pull these awesome changes in!".to_string(),
        source: "new-topic".to_string(),
        target: "master".to_string(),
    };
    let pr = PullRequestService::create(&client_for(&server), "octocat/Hello-World", &input)
        .await
        .expect("pull request created");

    assert_eq!(pr.number, 1347);
}

#[tokio::test]
async fn test_merge_and_close_pull_request() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/octocat/Hello-World/pulls/1347/merge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"merged": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/repos/octocat/Hello-World/pulls/1347"))
        .and(body_json(json!({"state": "closed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(pull_request_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .merge("octocat/Hello-World", 1347)
        .await
        .expect("merged");
    PullRequestService::close(&client, "octocat/Hello-World", 1347)
        .await
        .expect("closed");
}

#[tokio::test]
async fn test_merge_conflict_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/octocat/Hello-World/pulls/1347/merge"))
        .respond_with(
            ResponseTemplate::new(405)
                .set_body_json(json!({"message": "Pull Request is not mergeable"})),
        )
        .mount(&server)
        .await;

    let result = client_for(&server).merge("octocat/Hello-World", 1347).await;

    match result {
        Err(ApiError::HttpError { status, message }) => {
            assert_eq!(status, 405);
            assert_eq!(message, "Pull Request is not mergeable");
        }
        other => panic!("expected HttpError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pull_request_comments_use_issue_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/issues/1347/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([comment_json(1), comment_json(2)])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/octocat/Hello-World/issues/1347/comments"))
        .and(body_json(json!({"body": "Me too"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(comment_json(3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/issues/comments/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(comment_json(3)))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/repos/octocat/Hello-World/issues/comments/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let repo = "octocat/Hello-World";

    let comments = PullRequestService::list_comments(&client, repo, 1347, &ListOptions::default())
        .await
        .expect("comments listed");
    assert_eq!(comments.items.len(), 2);

    let input = CommentInput {
        body: "Me too".to_string(),
    };
    let created = PullRequestService::create_comment(&client, repo, 1347, &input)
        .await
        .expect("comment created");
    assert_eq!(created.id, 3);
    assert_eq!(created.author.login, "octocat");

    let found = PullRequestService::find_comment(&client, repo, 1347, 3)
        .await
        .expect("comment found");
    assert_eq!(found.body, "Me too");

    PullRequestService::delete_comment(&client, repo, 1347, 3)
        .await
        .expect("comment deleted");
}

#[tokio::test]
async fn test_pull_request_list_changes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/pulls/1347/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "filename": "file1.txt", "status": "added", "sha": "bbcd538c8e72b8c175046e27cc8f907076331401" }
        ])))
        .mount(&server)
        .await;

    let changes =
        PullRequestService::list_changes(&client_for(&server), "octocat/Hello-World", 1347, &ListOptions::default())
            .await
            .expect("changes listed");

    assert_eq!(changes.items.len(), 1);
    assert!(changes.items[0].added);
    assert_eq!(changes.items[0].path, "file1.txt");
}

// ============================================================================
// Review Tests
// ============================================================================

#[tokio::test]
async fn test_find_review_falls_back_to_original_line() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/pulls/comments/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(review_comment_json()))
        .mount(&server)
        .await;

    let review = ReviewService::find(&client_for(&server), "octocat/Hello-World", 1, 10)
        .await
        .expect("review found");

    assert_eq!(review.id, 10);
    assert_eq!(review.path, "file1.txt");
    assert_eq!(review.line, 2);
    assert_eq!(review.sha, "6dcb09b5b57875f334f61aebed695e2e4193db5e");
}

#[tokio::test]
async fn test_create_list_and_delete_review() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/octocat/Hello-World/pulls/1/comments"))
        .and(body_partial_json(json!({
            "body": "Great stuff!",
            "commit_id": "6dcb09b5b57875f334f61aebed695e2e4193db5e",
            "path": "file1.txt",
            "line": 2
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(review_comment_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/pulls/1/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([review_comment_json()])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/repos/octocat/Hello-World/pulls/comments/10"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let repo = "octocat/Hello-World";
    let input = ReviewInput {
        body: "Great stuff!".to_string(),
        sha: "6dcb09b5b57875f334f61aebed695e2e4193db5e".to_string(),
        path: "file1.txt".to_string(),
        line: 2,
    };

    let created = ReviewService::create(&client, repo, 1, &input)
        .await
        .expect("review created");
    assert_eq!(created.id, 10);

    let listed = ReviewService::list(&client, repo, 1, &ListOptions::default())
        .await
        .expect("reviews listed");
    assert_eq!(listed.items.len(), 1);

    ReviewService::delete(&client, repo, 1, 10)
        .await
        .expect("review deleted");
}
