use super::*;
use crate::git::operations::commit_ops::CommitOps;
use crate::process::CommandOutput;
use crate::testing::ScriptedRunner;

#[test]
fn test_commit_stages_then_commits() {
    let temp_dir = create_test_repo();
    let runner = ScriptedRunner::new().succeed("git commit", "[main 1a2b3c4] auto commit\n 1 file changed\n");

    let result = CommitOps::commit(&runner, temp_dir.path(), "auto commit");

    assert!(result.success);
    let commands = runner.commands();
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0], "git add .");
    assert!(commands[1].starts_with("git commit -m"));
    assert!(commands[1].contains("auto commit"));
    assert!(runner.calls().iter().all(|c| c.cwd.as_deref() == Some(temp_dir.path())));
}

#[test]
fn test_nothing_to_commit_is_success() {
    let temp_dir = create_test_repo();
    let runner = ScriptedRunner::new().on(
        "git commit",
        CommandOutput::new("On branch main\nnothing to commit, working tree clean\n", "", 1),
    );

    let result = CommitOps::commit(&runner, temp_dir.path(), "auto commit");

    assert!(result.success);
    assert!(result.error.is_none());
    assert_eq!(result.message.as_deref(), Some("Nothing to commit, working tree clean"));
}

#[test]
fn test_commit_failure_is_reported() {
    let temp_dir = create_test_repo();
    let runner = ScriptedRunner::new().fail("git commit", "Author identity unknown\n");

    let result = CommitOps::commit(&runner, temp_dir.path(), "auto commit");

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Author identity unknown"));
}

#[test]
fn test_commit_requires_repository() {
    let temp_dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new();

    let result = CommitOps::commit(&runner, temp_dir.path(), "auto commit");

    assert!(!result.success);
    assert!(runner.commands().is_empty());
}

#[test]
fn test_add_failure_skips_commit() {
    let temp_dir = create_test_repo();
    let runner = ScriptedRunner::new().fail("git add", "fatal: index.lock exists");

    let result = CommitOps::commit(&runner, temp_dir.path(), "auto commit");

    assert!(!result.success);
    assert_eq!(runner.count("git commit"), 0);
}

#[test]
fn test_push_uses_stderr_when_stdout_empty() {
    let temp_dir = create_test_repo();
    let runner = ScriptedRunner::new().on("git push", CommandOutput::new("", "Everything up-to-date\n", 0));

    let result = CommitOps::push(&runner, temp_dir.path(), "main");

    assert!(result.success);
    assert_eq!(result.output.as_deref(), Some("Everything up-to-date\n"));
    assert_eq!(result.message.as_deref(), Some("Pushed main to origin"));
    assert_eq!(runner.commands(), vec!["git push origin main".to_string()]);
}

#[test]
fn test_commit_failure_never_pushes() {
    let temp_dir = create_test_repo();
    let runner = ScriptedRunner::new().fail("git commit", "error: gpg failed to sign the data");

    let result = CommitOps::commit_and_push(&runner, temp_dir.path(), "auto commit", "main");

    assert!(!result.success);
    assert_eq!(runner.count("git push"), 0);
}

#[test]
fn test_nothing_to_commit_still_pushes() {
    let temp_dir = create_test_repo();
    let runner = ScriptedRunner::new()
        .on("git commit", CommandOutput::new("nothing to commit, working tree clean", "", 1))
        .succeed("git push", "");

    let result = CommitOps::commit_and_push(&runner, temp_dir.path(), "auto commit", "develop");

    assert!(result.success);
    assert_eq!(runner.count("git push origin develop"), 1);
}

#[test]
fn test_push_failure_is_returned() {
    let temp_dir = create_test_repo();
    let runner = ScriptedRunner::new().fail("git push", "rejected: non-fast-forward");

    let result = CommitOps::commit_and_push(&runner, temp_dir.path(), "auto commit", "main");

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("rejected: non-fast-forward"));
}
