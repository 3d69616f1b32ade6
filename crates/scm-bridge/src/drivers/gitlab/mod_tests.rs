//! Tests for GitLab webhook parsing.

use super::*;
use crate::model::{Visibility, EMPTY_COMMIT};
use crate::webhook::StaticSecret;
use serde_json::json;

const TOKEN: &str = "gitlab-token";

fn project() -> serde_json::Value {
    json!({
        "id": 4861503,
        "name": "hello-world",
        "path_with_namespace": "sytses/hello-world",
        "default_branch": "master",
        "visibility_level": 20,
        "web_url": "https://gitlab.com/sytses/hello-world",
        "git_http_url": "https://gitlab.com/sytses/hello-world.git",
        "git_ssh_url": "git@gitlab.com:sytses/hello-world.git"
    })
}

fn user() -> serde_json::Value {
    json!({
        "id": 1,
        "name": "Sid Sijbrandij",
        "username": "sytses",
        "avatar_url": "https://secure.gravatar.com/avatar/78b060780d36f51a6763ac9831a4f022"
    })
}

fn request(event: &str, body: &serde_json::Value, token: Option<&str>) -> WebhookRequest {
    let mut headers = vec![(EVENT_HEADER.to_string(), event.to_string())];
    if let Some(token) = token {
        headers.push((TOKEN_HEADER.to_string(), token.to_string()));
    }
    WebhookRequest::new(headers, serde_json::to_vec(body).expect("serializable"))
}

async fn parse(request: &WebhookRequest) -> Result<Webhook, WebhookError> {
    GitlabWebhookParser::new()
        .parse(request, &StaticSecret::new(TOKEN))
        .await
}

fn push(before: &str, after: &str, reference: &str) -> serde_json::Value {
    json!({
        "object_kind": "push",
        "before": before,
        "after": after,
        "ref": reference,
        "checkout_sha": after,
        "user_id": 1,
        "user_name": "Sid Sijbrandij",
        "user_username": "sytses",
        "user_email": "",
        "user_avatar": "https://secure.gravatar.com/avatar/78b060780d36f51a6763ac9831a4f022",
        "project": project(),
        "commits": [
            {
                "id": "2adc9465c4edfc33834e173fe89436a7cb899a1d",
                "message": "first commit\n",
                "timestamp": "2017-12-10T17:01:11Z",
                "url": "https://gitlab.com/sytses/hello-world/commit/2adc9465c4edfc33834e173fe89436a7cb899a1d",
                "author": { "name": "Sid Sijbrandij", "email": "sid@example.com" }
            },
            {
                "id": "2a91a6e8c1e4bd6ee0a8e1e1e0f1c1d6c6e4f1a2",
                "message": "update readme\n",
                "timestamp": "2017-12-10T17:02:00Z",
                "url": "https://gitlab.com/sytses/hello-world/commit/2a91a6e8c1e4bd6ee0a8e1e1e0f1c1d6c6e4f1a2",
                "author": { "name": "Sid Sijbrandij", "email": "sid@example.com" }
            }
        ]
    })
}

// ============================================================================
// Push
// ============================================================================

#[tokio::test]
async fn test_push_selects_commit_matching_after() {
    let payload = push(
        "7e2e5b2b0d2d5f1c1e1a1b0c5f9e6d3c2b1a0f9e",
        "2adc9465c4edfc33834e173fe89436a7cb899a1d",
        "refs/heads/master",
    );

    let hook = parse(&request("Push Hook", &payload, Some(TOKEN)))
        .await
        .expect("push parses");

    let Webhook::Push(push) = hook else {
        panic!("expected push hook");
    };
    assert_eq!(push.reference, "refs/heads/master");
    assert_eq!(push.commit.sha, "2adc9465c4edfc33834e173fe89436a7cb899a1d");
    assert_eq!(push.commit.message, "first commit\n");
    assert_eq!(push.commits.len(), 2);
    assert_eq!(push.sender.login, "sytses");
    assert_eq!(push.repo.namespace, "sytses");
    assert_eq!(push.repo.full_name, "sytses/hello-world");
    assert_eq!(push.repo.visibility, Visibility::Public);
    assert!(!push.repo.private);
}

#[tokio::test]
async fn test_push_falls_back_to_last_commit() {
    let payload = push(
        "7e2e5b2b0d2d5f1c1e1a1b0c5f9e6d3c2b1a0f9e",
        "ffffffffffffffffffffffffffffffffffffffff",
        "master",
    );

    let hook = parse(&request("Push Hook", &payload, Some(TOKEN)))
        .await
        .expect("push parses");

    let Webhook::Push(push) = hook else {
        panic!("expected push hook");
    };
    assert_eq!(push.reference, "refs/heads/master");
    assert_eq!(push.commit.sha, "2a91a6e8c1e4bd6ee0a8e1e1e0f1c1d6c6e4f1a2");
}

#[tokio::test]
async fn test_push_without_commits_uses_pusher() {
    let mut payload = push(
        "7e2e5b2b0d2d5f1c1e1a1b0c5f9e6d3c2b1a0f9e",
        "2adc9465c4edfc33834e173fe89436a7cb899a1d",
        "refs/heads/master",
    );
    payload["commits"] = json!([]);

    let hook = parse(&request("Push Hook", &payload, Some(TOKEN)))
        .await
        .expect("push parses");

    let Webhook::Push(push) = hook else {
        panic!("expected push hook");
    };
    assert_eq!(push.commit.sha, "2adc9465c4edfc33834e173fe89436a7cb899a1d");
    assert_eq!(push.commit.author.login, "sytses");
    assert_eq!(push.commit.author.name, "Sid Sijbrandij");
}

#[tokio::test]
async fn test_branch_create_and_delete() {
    let created = push(
        EMPTY_COMMIT,
        "2adc9465c4edfc33834e173fe89436a7cb899a1d",
        "refs/heads/feature",
    );
    let hook = parse(&request("Push Hook", &created, Some(TOKEN)))
        .await
        .expect("branch create parses");
    let Webhook::Branch(branch) = hook else {
        panic!("expected branch hook");
    };
    assert_eq!(branch.action, Action::Create);
    assert_eq!(branch.reference.name, "feature");
    assert_eq!(branch.reference.sha, "2adc9465c4edfc33834e173fe89436a7cb899a1d");

    let deleted = push(
        "2adc9465c4edfc33834e173fe89436a7cb899a1d",
        EMPTY_COMMIT,
        "refs/heads/feature",
    );
    let hook = parse(&request("Push Hook", &deleted, Some(TOKEN)))
        .await
        .expect("branch delete parses");
    assert_eq!(hook.action(), Action::Delete);
}

#[tokio::test]
async fn test_tag_push_create() {
    let mut payload = push(
        EMPTY_COMMIT,
        "2adc9465c4edfc33834e173fe89436a7cb899a1d",
        "refs/tags/v1.0.0",
    );
    payload["object_kind"] = json!("tag_push");

    let hook = parse(&request("Tag Push Hook", &payload, Some(TOKEN)))
        .await
        .expect("tag push parses");

    let Webhook::Tag(tag) = hook else {
        panic!("expected tag hook");
    };
    assert_eq!(tag.action, Action::Create);
    assert_eq!(tag.reference.path, "refs/tags/v1.0.0");
}

// ============================================================================
// Merge Requests
// ============================================================================

fn merge_request(action: &str, state: &str, oldrev: Option<&str>) -> serde_json::Value {
    let mut attributes = json!({
        "iid": 1,
        "title": "update readme",
        "description": "adds a line to the readme",
        "state": state,
        "url": "https://gitlab.com/sytses/hello-world/merge_requests/1",
        "source_branch": "feature",
        "target_branch": "master",
        "source": { "path_with_namespace": "octocat/hello-world" },
        "last_commit": {
            "id": "c4c79227ed610f1151f05bbc5be33b4f340d39c8",
            "message": "update readme",
            "timestamp": "2017-12-10T17:01:11Z",
            "url": "https://gitlab.com/sytses/hello-world/commit/c4c79227ed610f1151f05bbc5be33b4f340d39c8",
            "author": { "name": "Sid Sijbrandij", "email": "sid@example.com" }
        },
        "work_in_progress": false,
        "action": action,
        "created_at": "2017-12-10 17:01:11 UTC",
        "updated_at": "2017-12-10 17:01:11 UTC"
    });
    if let Some(oldrev) = oldrev {
        attributes["oldrev"] = json!(oldrev);
    }
    json!({
        "object_kind": "merge_request",
        "user": user(),
        "project": project(),
        "object_attributes": attributes,
        "labels": [ { "title": "bug", "color": "#d9534f" } ]
    })
}

#[tokio::test]
async fn test_merge_request_opened() {
    let payload = merge_request("open", "opened", None);

    let hook = parse(&request("Merge Request Hook", &payload, Some(TOKEN)))
        .await
        .expect("merge request parses");

    let Webhook::PullRequest(pr) = hook else {
        panic!("expected pull request hook");
    };
    assert_eq!(pr.action, Action::Open);
    assert_eq!(pr.pull_request.number, 1);
    assert_eq!(pr.pull_request.ref_name, "refs/merge-requests/1/head");
    assert_eq!(pr.pull_request.sha, "c4c79227ed610f1151f05bbc5be33b4f340d39c8");
    assert_eq!(pr.pull_request.source, "feature");
    assert_eq!(pr.pull_request.target, "master");
    assert_eq!(pr.pull_request.fork, "octocat/hello-world");
    assert_eq!(pr.pull_request.labels[0].name, "bug");
    assert!(pr.pull_request.created.is_some());
    assert!(!pr.pull_request.closed);
}

#[tokio::test]
async fn test_merge_request_update_with_oldrev_is_sync() {
    let payload = merge_request(
        "update",
        "opened",
        Some("a9e8b2d9d2cbd1c1f2fcbc6e4f9e8c5b7e3c0a1d"),
    );

    let hook = parse(&request("Merge Request Hook", &payload, Some(TOKEN)))
        .await
        .expect("merge request parses");

    assert_eq!(hook.action(), Action::Sync);
}

#[tokio::test]
async fn test_merge_request_update_without_oldrev_is_update() {
    let payload = merge_request("update", "opened", None);

    let hook = parse(&request("Merge Request Hook", &payload, Some(TOKEN)))
        .await
        .expect("merge request parses");

    assert_eq!(hook.action(), Action::Update);
}

#[tokio::test]
async fn test_merge_request_merged() {
    let payload = merge_request("merge", "merged", None);

    let hook = parse(&request("Merge Request Hook", &payload, Some(TOKEN)))
        .await
        .expect("merge request parses");

    let Webhook::PullRequest(pr) = hook else {
        panic!("expected pull request hook");
    };
    assert_eq!(pr.action, Action::Merge);
    assert!(pr.pull_request.merged);
    assert!(pr.pull_request.closed);
}

// ============================================================================
// Issues and Notes
// ============================================================================

fn issue_attributes() -> serde_json::Value {
    json!({
        "iid": 2,
        "title": "New API: create/update/delete file",
        "description": "Create new API for manipulations with repository",
        "state": "opened",
        "url": "https://gitlab.com/sytses/hello-world/issues/2",
        "action": "open",
        "created_at": "2017-12-10 17:01:11 UTC"
    })
}

#[tokio::test]
async fn test_confidential_issue_is_issue() {
    let payload = json!({
        "object_kind": "issue",
        "user": user(),
        "project": project(),
        "object_attributes": issue_attributes(),
        "labels": [ { "title": "api" } ]
    });

    let hook = parse(&request("Confidential Issue Hook", &payload, Some(TOKEN)))
        .await
        .expect("issue parses");

    let Webhook::Issue(issue) = hook else {
        panic!("expected issue hook");
    };
    assert_eq!(issue.action, Action::Open);
    assert_eq!(issue.issue.number, 2);
    assert_eq!(issue.issue.labels, vec!["api"]);
    assert_eq!(issue.issue.author.login, "sytses");
}

fn note(noteable_type: &str) -> serde_json::Value {
    json!({
        "object_kind": "note",
        "user": user(),
        "project": project(),
        "object_attributes": {
            "id": 1241,
            "note": "Hello world",
            "noteable_type": noteable_type,
            "url": "https://gitlab.com/sytses/hello-world/issues/2#note_1241",
            "created_at": "2017-12-10 17:01:11 UTC"
        },
        "issue": issue_attributes(),
        "merge_request": merge_request("open", "opened", None)["object_attributes"]
    })
}

#[tokio::test]
async fn test_note_on_merge_request() {
    let hook = parse(&request("Note Hook", &note("MergeRequest"), Some(TOKEN)))
        .await
        .expect("note parses");

    let Webhook::PullRequestComment(hook) = hook else {
        panic!("expected pull request comment hook");
    };
    assert_eq!(hook.action, Action::Create);
    assert_eq!(hook.comment.id, 1241);
    assert_eq!(hook.comment.body, "Hello world");
    assert_eq!(hook.pull_request.number, 1);
}

#[tokio::test]
async fn test_note_on_issue() {
    let hook = parse(&request("Note Hook", &note("Issue"), Some(TOKEN)))
        .await
        .expect("note parses");

    let Webhook::IssueComment(hook) = hook else {
        panic!("expected issue comment hook");
    };
    assert_eq!(hook.issue.number, 2);
}

#[tokio::test]
async fn test_note_on_snippet_is_unknown_event() {
    let result = parse(&request("Note Hook", &note("Snippet"), Some(TOKEN))).await;
    assert!(matches!(result, Err(WebhookError::UnknownEvent { .. })));
}

// ============================================================================
// Dispatch and Verification
// ============================================================================

#[tokio::test]
async fn test_unknown_event() {
    let result = parse(&request("Pipeline Hook", &json!({}), Some(TOKEN))).await;
    match result {
        Err(WebhookError::UnknownEvent { event }) => assert_eq!(event, "Pipeline Hook"),
        other => panic!("expected UnknownEvent, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wrong_token_is_rejected() {
    let payload = merge_request("open", "opened", None);
    let result = parse(&request("Merge Request Hook", &payload, Some("wrong"))).await;

    let err = result.expect_err("token must not match");
    assert!(matches!(err, WebhookError::SignatureInvalid { .. }));
    assert_eq!(
        err.hook().map(|h| h.repository().full_name.clone()),
        Some("sytses/hello-world".to_string())
    );
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let payload = merge_request("open", "opened", None);
    let result = parse(&request("Merge Request Hook", &payload, None)).await;
    assert!(matches!(result, Err(WebhookError::SignatureInvalid { .. })));
}

#[tokio::test]
async fn test_private_project_visibility() {
    let mut payload = merge_request("open", "opened", None);
    payload["project"]["visibility_level"] = json!(10);

    let hook = parse(&request("Merge Request Hook", &payload, Some(TOKEN)))
        .await
        .expect("merge request parses");

    assert_eq!(hook.repository().visibility, Visibility::Internal);
    assert!(hook.repository().private);
}
