//! Tests for GitHub git operations.

use super::*;
use crate::client::ClientConfig;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GithubClient {
    GithubClient::new(ClientConfig::default().with_base_url(server.uri())).expect("client builds")
}

fn commit_json(sha: &str) -> serde_json::Value {
    json!({
        "sha": sha,
        "html_url": format!("https://github.com/octocat/Hello-World/commit/{}", sha),
        "commit": {
            "message": "Fix all the bugs",
            "author": { "name": "Monalisa Octocat", "email": "support@github.com", "date": "2011-04-14T16:00:49Z" },
            "committer": { "name": "Monalisa Octocat", "email": "support@github.com", "date": "2011-04-14T16:00:49Z" }
        },
        "author": { "id": 1, "login": "octocat", "avatar_url": "https://avatars.example/octocat" },
        "committer": null,
        "files": [
            { "filename": "README.md", "status": "modified", "sha": "bbcd538c8e72b8c175046e27cc8f907076331401" },
            { "filename": "docs/new.md", "status": "added", "sha": "a1" },
            { "filename": "old.txt", "status": "removed", "sha": null },
            { "filename": "src/b.rs", "previous_filename": "src/a.rs", "status": "renamed", "sha": "c3" }
        ]
    })
}

#[tokio::test]
async fn test_find_branch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/branches/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "main",
            "commit": { "sha": "7fd1a60b01f91b314f59955a4e4d4e80d8edf11d" }
        })))
        .mount(&server)
        .await;

    let branch = client_for(&server)
        .find_branch("octocat/Hello-World", "main")
        .await
        .expect("branch found");

    assert_eq!(branch.name, "main");
    assert_eq!(branch.path, "refs/heads/main");
    assert_eq!(branch.sha, "7fd1a60b01f91b314f59955a4e4d4e80d8edf11d");
}

#[tokio::test]
async fn test_find_tag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/git/ref/tags/v1.0.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/tags/v1.0.0",
            "object": { "sha": "aa218f56b14c9653891f9e74264a383fa43fefbd", "type": "commit" }
        })))
        .mount(&server)
        .await;

    let tag = client_for(&server)
        .find_tag("octocat/Hello-World", "v1.0.0")
        .await
        .expect("tag found");

    assert_eq!(tag.name, "v1.0.0");
    assert_eq!(tag.path, "refs/tags/v1.0.0");
}

#[tokio::test]
async fn test_find_commit() {
    let server = MockServer::start().await;
    let sha = "6dcb09b5b57875f334f61aebed695e2e4193db5e";
    Mock::given(method("GET"))
        .and(path(format!("/repos/octocat/Hello-World/commits/{}", sha)))
        .respond_with(ResponseTemplate::new(200).set_body_json(commit_json(sha)))
        .mount(&server)
        .await;

    let commit = client_for(&server)
        .find_commit("octocat/Hello-World", sha)
        .await
        .expect("commit found");

    assert_eq!(commit.sha, sha);
    assert_eq!(commit.message, "Fix all the bugs");
    assert_eq!(commit.author.login, "octocat");
    assert_eq!(commit.author.email, "support@github.com");
    assert!(commit.author.date.is_some());
    assert_eq!(commit.committer.login, "");
}

#[tokio::test]
async fn test_list_branches_and_tags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/branches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "main", "commit": { "sha": "a" } },
            { "name": "feature/x", "commit": { "sha": "b" } }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "v1.0.0", "commit": { "sha": "c" } }
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let branches = client
        .list_branches("octocat/Hello-World", &ListOptions::default())
        .await
        .expect("branches listed");
    assert_eq!(branches.items.len(), 2);
    assert_eq!(branches.items[1].path, "refs/heads/feature/x");

    let tags = client
        .list_tags("octocat/Hello-World", &ListOptions::default())
        .await
        .expect("tags listed");
    assert_eq!(tags.items[0].path, "refs/tags/v1.0.0");
    assert_eq!(tags.items[0].sha, "c");
}

#[tokio::test]
async fn test_list_commits_passes_ref_and_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/commits"))
        .and(query_param("sha", "develop"))
        .and(query_param("path", "src/lib.rs"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([commit_json("abc")])))
        .mount(&server)
        .await;

    let opts = CommitListOptions {
        ref_name: "develop".to_string(),
        path: "src/lib.rs".to_string(),
        page: ListOptions::default(),
    };
    let commits = client_for(&server)
        .list_commits("octocat/Hello-World", &opts)
        .await
        .expect("commits listed");

    assert_eq!(commits.items.len(), 1);
    assert_eq!(commits.items[0].sha, "abc");
}

#[tokio::test]
async fn test_list_changes_maps_file_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/commits/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(commit_json("abc")))
        .mount(&server)
        .await;

    let changes = client_for(&server)
        .list_changes("octocat/Hello-World", "abc", &ListOptions::default())
        .await
        .expect("changes listed");

    let items = changes.items;
    assert_eq!(items.len(), 4);
    assert!(!items[0].added && !items[0].deleted && !items[0].renamed);
    assert!(items[1].added);
    assert!(items[2].deleted);
    assert_eq!(items[2].sha, "");
    assert!(items[3].renamed);
    assert_eq!(items[3].previous_path, "src/a.rs");
}

#[tokio::test]
async fn test_compare_changes_pages_locally() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octocat/Hello-World/compare/main...feature"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [
                { "filename": "a", "status": "modified" },
                { "filename": "b", "status": "modified" },
                { "filename": "c", "status": "added" }
            ]
        })))
        .mount(&server)
        .await;

    let changes = client_for(&server)
        .compare_changes("octocat/Hello-World", "main", "feature", &ListOptions::new(2, 2))
        .await
        .expect("changes compared");

    assert_eq!(changes.items.len(), 1);
    assert_eq!(changes.items[0].path, "c");
    assert!(changes.is_last_page());
}
