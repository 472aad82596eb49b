use super::*;
use crate::git::operations::pull_ops::PullOps;
use crate::testing::ScriptedRunner;

const NO_TRACKING: &str = "There is no tracking information for the current branch.\n";

#[test]
fn test_pull_success() {
    let temp_dir = create_test_repo();
    let runner = ScriptedRunner::new().succeed("git pull", "Already up to date.\n");

    let result = PullOps::pull(&runner, temp_dir.path(), None);

    assert!(result.success);
    assert_eq!(result.output.as_deref(), Some("Already up to date.\n"));
    assert_eq!(runner.commands(), vec!["git pull".to_string()]);
}

#[test]
fn test_pull_sets_origin_first() {
    let temp_dir = create_test_repo();
    let runner = ScriptedRunner::new();

    let result = PullOps::pull(&runner, temp_dir.path(), Some("https://github.com/acme/widgets.git"));

    assert!(result.success);
    let commands = runner.commands();
    assert_eq!(commands[0], "git remote -v");
    assert_eq!(commands[1], "git remote add origin https://github.com/acme/widgets.git");
    assert_eq!(commands[2], "git pull");
}

#[test]
fn test_pull_failure_is_verbatim() {
    let temp_dir = create_test_repo();
    let runner = ScriptedRunner::new().fail("git pull", "fatal: refusing to merge unrelated histories\n");

    let result = PullOps::pull(&runner, temp_dir.path(), None);

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("fatal: refusing to merge unrelated histories"));
    assert_eq!(runner.commands().len(), 1);
}

#[test]
fn test_pull_falls_back_to_main() {
    let temp_dir = create_test_repo();
    let runner = ScriptedRunner::new()
        .succeed("git pull origin main", "Fast-forward\n")
        .fail("git pull", NO_TRACKING);

    let result = PullOps::pull(&runner, temp_dir.path(), None);

    assert!(result.success);
    assert_eq!(result.field("branch").unwrap(), "main");
    assert_eq!(runner.commands(), vec!["git pull".to_string(), "git pull origin main".to_string()]);
}

#[test]
fn test_pull_falls_back_to_first_remote_branch() {
    let temp_dir = create_test_repo();
    let runner = ScriptedRunner::new()
        .succeed("git pull origin trunk", "Fast-forward\n")
        .succeed("git branch -r", "  origin/HEAD -> origin/trunk\n  origin/trunk\n  origin/feature\n")
        .fail("git pull", NO_TRACKING);

    let result = PullOps::pull(&runner, temp_dir.path(), None);

    assert!(result.success);
    assert_eq!(result.field("branch").unwrap(), "trunk");
    assert_eq!(runner.count("git pull origin master"), 1);
}

#[test]
fn test_pull_fallback_exhausted_reports_original_error() {
    let temp_dir = create_test_repo();
    let runner = ScriptedRunner::new()
        .succeed("git branch -r", "")
        .fail("git pull origin", "fatal: couldn't find remote ref")
        .fail("git pull", NO_TRACKING);

    let result = PullOps::pull(&runner, temp_dir.path(), None);

    assert!(!result.success);
    assert!(result.error.unwrap().contains("no tracking information"));
}

#[test]
fn test_pull_requires_repository() {
    let temp_dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new();

    let result = PullOps::pull(&runner, temp_dir.path(), None);

    assert!(!result.success);
    assert!(runner.commands().is_empty());
}
