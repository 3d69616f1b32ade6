//! Tests for the shared Gitea/Gogs payload conversion.

use super::*;

#[test]
fn test_convert_user_falls_back_to_username() {
    let user = convert_user(GtUser {
        id: "1".into(),
        username: "gogs".into(),
        full_name: "Gogs Admin".into(),
        ..Default::default()
    });

    assert_eq!(user.login, "gogs");
    assert_eq!(user.name, "Gogs Admin");
}

#[test]
fn test_convert_user_prefers_login() {
    let user = convert_user(GtUser {
        login: "gitea".into(),
        username: "ignored".into(),
        ..Default::default()
    });

    assert_eq!(user.login, "gitea");
}

#[test]
fn test_convert_repository_without_owner_uses_full_name() {
    let repo = convert_repository(GtRepository {
        name: "hello-world".into(),
        full_name: "gogits/hello-world".into(),
        private: true,
        ..Default::default()
    });

    assert_eq!(repo.namespace, "gogits");
    assert!(repo.private);
    assert_eq!(repo.visibility, Visibility::Private);
}

#[test]
fn test_pull_request_action_overrides() {
    assert_eq!(pull_request_action("label_updated", false), Action::Label);
    assert_eq!(pull_request_action("label_cleared", false), Action::Unlabel);
    assert_eq!(pull_request_action("closed", true), Action::Merge);
    assert_eq!(pull_request_action("closed", false), Action::Close);
    assert_eq!(pull_request_action("synchronized", false), Action::Sync);
    assert_eq!(pull_request_action("milestoned", false), Action::Unknown);
}

#[test]
fn test_embedded_secret_ignores_empty_and_missing() {
    assert_eq!(
        embedded_secret(br#"{"secret":"s3cr3t"}"#).as_deref(),
        Some("s3cr3t")
    );
    assert_eq!(embedded_secret(br#"{"secret":""}"#), None);
    assert_eq!(embedded_secret(br#"{"ref":"refs/heads/master"}"#), None);
    assert_eq!(embedded_secret(b"not json"), None);
}

#[test]
fn test_convert_pull_request_uses_head_repo_as_fork() {
    let pr = convert_pull_request(GtPullRequest {
        number: 7,
        state: "open".into(),
        head: GtBranch {
            ref_name: "feature".into(),
            sha: "2eba238e33607c1fa49253182e9fff42baafa1eb".into(),
            repo: Some(GtRepository {
                full_name: "jcitizen/hello-world".into(),
                ..Default::default()
            }),
        },
        base: GtBranch {
            ref_name: "master".into(),
            ..Default::default()
        },
        ..Default::default()
    });

    assert_eq!(pr.fork, "jcitizen/hello-world");
    assert_eq!(pr.ref_name, "refs/pull/7/head");
    assert_eq!(pr.head.path, "refs/heads/feature");
    assert_eq!(pr.sha, "2eba238e33607c1fa49253182e9fff42baafa1eb");
    assert!(!pr.closed);
}
