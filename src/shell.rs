//! The terminal pane. Commands run through the process runner, except `cd`, which only
//! moves the pane's working directory and never spawns anything.

use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::process::ProcessRunner;

/// What the terminal pane shows after a command, plus the directory it is now in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellOutput {
    pub output: String,
    pub error: String,
    pub cwd: String,
}

/// Run `command` in `cwd`, defaulting to the process's current directory.
pub fn execute_command(runner: &dyn ProcessRunner, command: &str, cwd: Option<&str>) -> ShellOutput {
    let cwd = match cwd.map(str::trim).filter(|c| !c.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    let cwd_text = cwd.to_string_lossy().into_owned();
    let trimmed = command.trim();

    if let Some(target) = cd_target(trimmed) {
        return change_directory(&cwd, &cwd_text, target);
    }

    if trimmed.is_empty() {
        return ShellOutput {
            output: String::new(),
            error: "Empty command".to_string(),
            cwd: cwd_text,
        };
    }

    debug!("Executing '{}' in {}", trimmed, cwd_text);
    let result = runner.run(trimmed, Some(&cwd));
    ShellOutput {
        output: result.stdout,
        error: result.stderr,
        cwd: cwd_text,
    }
}

/// Argument of a leading, case-insensitive `cd `
fn cd_target(command: &str) -> Option<&str> {
    let prefix = command.get(..3)?;
    if !prefix.eq_ignore_ascii_case("cd ") {
        return None;
    }
    Some(unquote(command[3..].trim()))
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn change_directory(cwd: &Path, cwd_text: &str, target: &str) -> ShellOutput {
    let requested = if target == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(target))
    } else if let Some(rest) = target.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        home.join(rest)
    } else {
        let path = Path::new(target);
        if path.is_absolute() { path.to_path_buf() } else { cwd.join(path) }
    };
    let new_dir = normalize_path(&requested);
    let new_text = new_dir.to_string_lossy().into_owned();

    if new_dir.is_dir() {
        ShellOutput {
            output: format!("Changed directory to: {new_text}"),
            error: String::new(),
            cwd: new_text,
        }
    } else {
        ShellOutput {
            output: String::new(),
            error: format!("Directory does not exist: {new_text}"),
            cwd: cwd_text.to_string(),
        }
    }
}

/// Resolve `.` and `..` lexically, without touching the filesystem.
/// `..` at the root stays at the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    normalized.pop();
                    depth -= 1;
                } else if !path.has_root() {
                    normalized.push("..");
                }
            }
            Component::Normal(part) => {
                normalized.push(part);
                depth += 1;
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::CommandOutput;
    use crate::testing::ScriptedRunner;

    #[test]
    fn test_cd_into_existing_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp_dir.path().join("sub")).unwrap();
        let runner = ScriptedRunner::new();
        let cwd = temp_dir.path().to_string_lossy().to_string();

        let result = execute_command(&runner, "cd sub", Some(&cwd));

        let expected = temp_dir.path().join("sub").to_string_lossy().to_string();
        assert_eq!(result.cwd, expected);
        assert!(result.error.is_empty());
        assert!(result.output.contains(&expected));
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_cd_is_case_insensitive_and_normalized() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("a").join("b")).unwrap();
        let runner = ScriptedRunner::new();
        let start = temp_dir.path().join("a").join("b").to_string_lossy().to_string();

        let result = execute_command(&runner, "  CD ../.", Some(&start));

        assert_eq!(result.cwd, temp_dir.path().join("a").to_string_lossy());
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_cd_to_missing_directory_keeps_cwd() {
        let temp_dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new();
        let cwd = temp_dir.path().to_string_lossy().to_string();

        let result = execute_command(&runner, "cd nowhere", Some(&cwd));

        assert_eq!(result.cwd, cwd);
        assert!(result.output.is_empty());
        assert!(result.error.starts_with("Directory does not exist"));
        assert!(result.error.contains("nowhere"));
    }

    #[test]
    fn test_cd_to_file_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("file.txt"), "x").unwrap();
        let runner = ScriptedRunner::new();
        let cwd = temp_dir.path().to_string_lossy().to_string();

        let result = execute_command(&runner, "cd file.txt", Some(&cwd));

        assert_eq!(result.cwd, cwd);
        assert!(!result.error.is_empty());
    }

    #[test]
    fn test_cd_absolute_and_quoted() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp_dir.path().join("with space")).unwrap();
        let runner = ScriptedRunner::new();
        let target = temp_dir.path().join("with space");

        let result = execute_command(&runner, &format!("cd \"{}\"", target.display()), Some("/"));

        assert_eq!(result.cwd, target.to_string_lossy());
    }

    #[test]
    fn test_other_commands_run_in_cwd() {
        let temp_dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new().on("ls", CommandOutput::new("a.txt\n", "", 0));
        let cwd = temp_dir.path().to_string_lossy().to_string();

        let result = execute_command(&runner, "ls -la", Some(&cwd));

        assert_eq!(result.output, "a.txt\n");
        assert_eq!(result.cwd, cwd);
        assert_eq!(runner.calls()[0].cwd.as_deref(), Some(temp_dir.path()));
    }

    #[test]
    fn test_cdrom_is_not_cd() {
        let runner = ScriptedRunner::new();
        execute_command(&runner, "cdrom eject", Some("/"));
        assert_eq!(runner.count("cdrom"), 1);
    }

    #[test]
    fn test_spawn_failure_is_reported_as_error() {
        let runner = ScriptedRunner::new().on("missing", CommandOutput::spawn_failure("No such file or directory"));
        let result = execute_command(&runner, "missing --flag", Some("/"));

        assert!(result.output.is_empty());
        assert_eq!(result.error, "No such file or directory");
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize_path(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize_path(Path::new("a/../..")), PathBuf::from(".."));
        assert_eq!(normalize_path(Path::new("./")), PathBuf::from("."));
    }
}
