//! Tests for Bitbucket Server webhook parsing.

use super::*;
use crate::hmac::HashAlgorithm;
use crate::webhook::StaticSecret;
use serde_json::json;

const SECRET: &str = "stash-secret";

fn actor() -> serde_json::Value {
    json!({
        "name": "jcitizen",
        "emailAddress": "jane@example.com",
        "id": 1,
        "displayName": "Jane Citizen",
        "active": true,
        "slug": "jcitizen",
        "type": "NORMAL"
    })
}

fn repository() -> serde_json::Value {
    json!({
        "slug": "my-repo",
        "id": 1,
        "name": "My Repo",
        "scmId": "git",
        "state": "AVAILABLE",
        "forkable": true,
        "project": { "key": "PRJ", "id": 1, "name": "Project", "public": false, "type": "NORMAL" },
        "public": false,
        "links": {
            "clone": [
                { "href": "ssh://git@example.com:7999/prj/my-repo.git", "name": "ssh" },
                { "href": "https://example.com/scm/prj/my-repo.git", "name": "http" }
            ],
            "self": [{ "href": "https://example.com/projects/PRJ/repos/my-repo/browse" }]
        }
    })
}

fn refs_changed(ref_type: &str, change_type: &str, id: &str) -> serde_json::Value {
    json!({
        "eventKey": "repo:refs_changed",
        "date": "2018-06-20T09:48:06-0400",
        "actor": actor(),
        "repository": repository(),
        "changes": [{
            "ref": { "id": id, "displayId": id.rsplit('/').next(), "type": ref_type },
            "refId": id,
            "fromHash": if change_type == "ADD" { "0000000000000000000000000000000000000000" } else { "208b0a4d1d7f4b4a0d8c5ea1e6f5a6a0fb8fd3fd" },
            "toHash": if change_type == "DELETE" { "0000000000000000000000000000000000000000" } else { "823b2230a56056231c9425d63758fa87078a66b4" },
            "type": change_type
        }]
    })
}

fn pull_request(state: &str, closed: bool) -> serde_json::Value {
    json!({
        "id": 2,
        "version": 0,
        "title": "Add a readme",
        "description": "Adds the project readme",
        "state": state,
        "open": !closed,
        "closed": closed,
        "createdDate": 1529502495000_i64,
        "updatedDate": 1529502495000_i64,
        "fromRef": {
            "id": "refs/heads/readme",
            "displayId": "readme",
            "latestCommit": "823b2230a56056231c9425d63758fa87078a66b4",
            "repository": repository()
        },
        "toRef": {
            "id": "refs/heads/master",
            "displayId": "master",
            "latestCommit": "208b0a4d1d7f4b4a0d8c5ea1e6f5a6a0fb8fd3fd",
            "repository": repository()
        },
        "locked": false,
        "author": { "user": actor(), "role": "AUTHOR", "approved": false, "status": "UNAPPROVED" },
        "links": { "self": [{ "href": "https://example.com/projects/PRJ/repos/my-repo/pull-requests/2" }] }
    })
}

fn signed_request(event: &str, body: &serde_json::Value) -> WebhookRequest {
    let body = serde_json::to_vec(body).expect("serializable");
    let signature = format!(
        "sha256={}",
        hmac::sign_encoded(HashAlgorithm::Sha256, SECRET.as_bytes(), &body)
    );
    WebhookRequest::new(
        vec![(EVENT_HEADER, event.to_string()), (SIGNATURE_HEADER, signature)],
        body,
    )
}

async fn parse(request: &WebhookRequest) -> Result<Webhook, WebhookError> {
    StashWebhookParser::new()
        .parse(request, &StaticSecret::new(SECRET))
        .await
}

// ============================================================================
// repo:refs_changed
// ============================================================================

#[tokio::test]
async fn test_update_is_push() {
    let payload = refs_changed("BRANCH", "UPDATE", "refs/heads/master");

    let hook = parse(&signed_request("repo:refs_changed", &payload))
        .await
        .expect("valid");

    let Webhook::Push(push) = hook else {
        panic!("expected push hook");
    };
    assert_eq!(push.reference, "refs/heads/master");
    assert_eq!(push.before, "208b0a4d1d7f4b4a0d8c5ea1e6f5a6a0fb8fd3fd");
    assert_eq!(push.after, "823b2230a56056231c9425d63758fa87078a66b4");
    assert_eq!(push.commit.sha, push.after);
    assert_eq!(push.commit.author.login, "jcitizen");
    assert_eq!(
        push.commit.link,
        "https://example.com/projects/PRJ/repos/my-repo/commits/823b2230a56056231c9425d63758fa87078a66b4"
    );
    assert_eq!(push.repo.full_name, "PRJ/my-repo");
    assert_eq!(push.repo.namespace, "PRJ");
    assert_eq!(push.repo.clone, "https://example.com/scm/prj/my-repo.git");
    assert_eq!(push.repo.clone_ssh, "ssh://git@example.com:7999/prj/my-repo.git");
    assert!(push.repo.private);
    assert_eq!(push.sender.name, "Jane Citizen");
}

#[tokio::test]
async fn test_branch_add_is_branch_create() {
    let payload = refs_changed("BRANCH", "ADD", "refs/heads/feature");

    let hook = parse(&signed_request("repo:refs_changed", &payload))
        .await
        .expect("valid");

    let Webhook::Branch(branch) = hook else {
        panic!("expected branch hook");
    };
    assert_eq!(branch.action, Action::Create);
    assert_eq!(branch.reference.name, "feature");
    assert_eq!(branch.reference.sha, "823b2230a56056231c9425d63758fa87078a66b4");
}

#[tokio::test]
async fn test_tag_delete_is_tag_delete() {
    let payload = refs_changed("TAG", "DELETE", "refs/tags/v1.0");

    let hook = parse(&signed_request("repo:refs_changed", &payload))
        .await
        .expect("valid");

    let Webhook::Tag(tag) = hook else {
        panic!("expected tag hook");
    };
    assert_eq!(tag.action, Action::Delete);
    assert_eq!(tag.reference.path, "refs/tags/v1.0");
    assert_eq!(tag.reference.sha, "208b0a4d1d7f4b4a0d8c5ea1e6f5a6a0fb8fd3fd");
}

#[tokio::test]
async fn test_empty_changes_is_malformed() {
    let mut payload = refs_changed("BRANCH", "UPDATE", "refs/heads/master");
    payload["changes"] = json!([]);

    let err = parse(&signed_request("repo:refs_changed", &payload))
        .await
        .unwrap_err();

    assert!(matches!(err, WebhookError::MalformedPayload { .. }));
}

// ============================================================================
// Pull requests
// ============================================================================

#[tokio::test]
async fn test_pull_request_events_map_to_actions() {
    let cases = [
        ("pr:opened", "OPEN", false, Action::Open),
        ("pr:from_ref_updated", "OPEN", false, Action::Sync),
        ("pr:modified", "OPEN", false, Action::Update),
        ("pr:declined", "DECLINED", true, Action::Close),
        ("pr:deleted", "DECLINED", true, Action::Close),
        ("pr:merged", "MERGED", true, Action::Merge),
    ];

    for (event, state, closed, expected) in cases {
        let payload = json!({
            "eventKey": event,
            "actor": actor(),
            "pullRequest": pull_request(state, closed)
        });

        let hook = parse(&signed_request(event, &payload))
            .await
            .unwrap_or_else(|e| panic!("{} failed: {}", event, e));

        assert_eq!(hook.action(), expected, "event {}", event);
    }
}

#[tokio::test]
async fn test_pull_request_fields() {
    let payload = json!({
        "eventKey": "pr:merged",
        "actor": actor(),
        "pullRequest": pull_request("MERGED", true)
    });

    let hook = parse(&signed_request("pr:merged", &payload))
        .await
        .expect("valid");

    let Webhook::PullRequest(hook) = hook else {
        panic!("expected pull request hook");
    };
    let pr = hook.pull_request;
    assert_eq!(pr.number, 2);
    assert_eq!(pr.source, "readme");
    assert_eq!(pr.target, "master");
    assert_eq!(pr.sha, "823b2230a56056231c9425d63758fa87078a66b4");
    assert_eq!(pr.head.path, "refs/heads/readme");
    assert_eq!(pr.base.name, "master");
    assert!(pr.merged);
    assert!(pr.closed);
    assert_eq!(pr.fork, "PRJ/my-repo");
    assert_eq!(
        pr.created.map(|d| d.timestamp()),
        Some(1529502495),
        "millisecond timestamps"
    );
    assert_eq!(hook.repo.full_name, "PRJ/my-repo");
}

#[tokio::test]
async fn test_comment_events() {
    let cases = [
        ("pr:comment:added", Action::Create),
        ("pr:comment:edited", Action::Edited),
        ("pr:comment:deleted", Action::Delete),
    ];

    for (event, expected) in cases {
        let payload = json!({
            "eventKey": event,
            "actor": actor(),
            "pullRequest": pull_request("OPEN", false),
            "comment": {
                "id": 62,
                "version": 0,
                "text": "Looks good",
                "author": actor(),
                "createdDate": 1529502500000_i64,
                "updatedDate": 1529502500000_i64
            }
        });

        let hook = parse(&signed_request(event, &payload))
            .await
            .expect("valid");

        let Webhook::PullRequestComment(hook) = hook else {
            panic!("expected pull request comment hook for {}", event);
        };
        assert_eq!(hook.action, expected);
        assert_eq!(hook.comment.id, 62);
        assert_eq!(hook.comment.body, "Looks good");
    }
}

#[tokio::test]
async fn test_unknown_event() {
    let err = parse(&signed_request("repo:forked", &json!({})))
        .await
        .unwrap_err();

    assert!(matches!(err, WebhookError::UnknownEvent { event } if event == "repo:forked"));
}

// ============================================================================
// Verification
// ============================================================================

#[tokio::test]
async fn test_sha1_prefixed_signature_is_accepted() {
    let payload = refs_changed("BRANCH", "UPDATE", "refs/heads/master");
    let body = serde_json::to_vec(&payload).expect("serializable");
    let signature = format!(
        "sha1={}",
        hmac::sign_encoded(HashAlgorithm::Sha1, SECRET.as_bytes(), &body)
    );
    let request = WebhookRequest::new(
        vec![
            (EVENT_HEADER, "repo:refs_changed".to_string()),
            (SIGNATURE_HEADER, signature),
        ],
        body,
    );

    assert!(parse(&request).await.is_ok());
}

#[tokio::test]
async fn test_unprefixed_signature_is_rejected() {
    let payload = refs_changed("BRANCH", "UPDATE", "refs/heads/master");
    let body = serde_json::to_vec(&payload).expect("serializable");
    let signature = hmac::sign_encoded(HashAlgorithm::Sha256, SECRET.as_bytes(), &body);
    let request = WebhookRequest::new(
        vec![
            (EVENT_HEADER, "repo:refs_changed".to_string()),
            (SIGNATURE_HEADER, signature),
        ],
        body,
    );

    let err = parse(&request).await.unwrap_err();

    assert!(matches!(err, WebhookError::SignatureInvalid { .. }));
}

#[tokio::test]
async fn test_missing_signature_is_rejected() {
    let payload = refs_changed("BRANCH", "UPDATE", "refs/heads/master");
    let request = WebhookRequest::new(
        vec![(EVENT_HEADER, "repo:refs_changed")],
        serde_json::to_vec(&payload).expect("serializable"),
    );

    let err = parse(&request).await.unwrap_err();

    assert!(matches!(err, WebhookError::SignatureInvalid { .. }));
}
