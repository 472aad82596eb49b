use super::*;
use crate::git::operations::remote_ops::RemoteOps;
use crate::testing::ScriptedRunner;

#[test]
fn test_connection_success() {
    let runner = ScriptedRunner::new().succeed("git ls-remote", "abc123\trefs/heads/main\n");
    let result = RemoteOps::test_connection(&runner, "https://github.com/acme/widgets.git");

    assert!(result.success);
    assert!(result.error.is_none());
    assert_eq!(runner.count("git ls-remote --heads"), 1);
}

#[test]
fn test_connection_failure_reports_stderr() {
    let runner = ScriptedRunner::new().fail("git ls-remote", "fatal: repository not found\n");
    let result = RemoteOps::test_connection(&runner, "https://github.com/acme/missing.git");

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("fatal: repository not found"));
}

#[test]
fn test_handle_import_uses_canonical_url() {
    let runner = ScriptedRunner::new().succeed("git ls-remote", "");
    let result = RemoteOps::handle_import(&runner, "git@github.com:acme/widgets.git");

    assert!(result.success);
    assert_eq!(result.field("owner").unwrap(), "acme");
    assert_eq!(result.field("repo").unwrap(), "widgets");
    assert_eq!(
        runner.commands(),
        vec!["git ls-remote --heads https://github.com/acme/widgets.git".to_string()]
    );
}

#[test]
fn test_handle_import_rejects_unknown_host() {
    let runner = ScriptedRunner::new();
    let result = RemoteOps::handle_import(&runner, "https://gitlab.com/acme/widgets");

    assert!(!result.success);
    assert!(result.error.unwrap().starts_with("Invalid GitHub URL"));
    assert!(runner.commands().is_empty());
}

#[test]
fn test_associate_initializes_missing_repository() {
    let temp_dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new();
    let result = RemoteOps::associate(&runner, temp_dir.path(), "https://github.com/acme/widgets.git");

    assert!(result.success);
    let commands = runner.commands();
    assert_eq!(commands[0], "git init");
    assert_eq!(commands[1], "git remote -v");
    assert_eq!(
        commands[2],
        "git remote add origin https://github.com/acme/widgets.git"
    );
}

#[test]
fn test_associate_updates_existing_origin() {
    let temp_dir = create_test_repo();
    let runner = ScriptedRunner::new().succeed(
        "git remote -v",
        "origin\thttps://github.com/old/repo.git (fetch)\norigin\thttps://github.com/old/repo.git (push)\n",
    );
    let result = RemoteOps::associate(&runner, temp_dir.path(), "https://github.com/acme/widgets.git");

    assert!(result.success);
    assert_eq!(runner.count("git init"), 0);
    assert_eq!(runner.count("git remote set-url origin"), 1);
    assert_eq!(runner.count("git remote add"), 0);
}

#[test]
fn test_associate_ignores_other_remotes_named_like_origin() {
    let temp_dir = create_test_repo();
    let runner = ScriptedRunner::new().succeed("git remote -v", "origin-mirror\thttps://example.com/x.git (fetch)\n");
    RemoteOps::associate(&runner, temp_dir.path(), "https://github.com/acme/widgets.git");

    assert_eq!(runner.count("git remote add origin"), 1);
}

#[test]
fn test_associate_rejects_missing_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new();
    let result = RemoteOps::associate(&runner, &temp_dir.path().join("gone"), "https://github.com/acme/widgets.git");

    assert!(!result.success);
    assert!(runner.commands().is_empty());
}

#[test]
fn test_associate_reports_init_failure() {
    let temp_dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new().fail("git init", "permission denied");
    let result = RemoteOps::associate(&runner, temp_dir.path(), "https://github.com/acme/widgets.git");

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("permission denied"));
    assert_eq!(runner.count("git remote"), 0);
}
