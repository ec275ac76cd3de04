//! Discovery and bounded invocation of external tools.
//!
//! The pipeline never assumes a tool is installed. Discovery runs once per
//! stage invocation (no process-wide caching) through an ordered list of
//! strategies: the primary executable name on the search path, a documented
//! alternate name, and finally a short-timeout probe for invocability as a
//! python module. Every invocation is a blocking call bounded by an explicit
//! timeout; an expired timeout kills the child and is reported distinctly
//! from a completed run.

use std::env;
use std::ffi::OsStr;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;
use tracing::debug;
use wait_timeout::ChildExt;

/// Timeout for the python-module availability probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Names and strategies for locating one external tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    /// Primary executable name looked up on the search path.
    pub primary: &'static str,
    /// Alternate executable name, tried second.
    pub alternate: Option<&'static str>,
    /// Python module path probed last (`python -c "import <module>"`).
    pub python_module: Option<&'static str>,
}

/// A resolved way of invoking an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    /// A binary found on the search path.
    Binary(PathBuf),
    /// A python module invoked as `python -m <module>`.
    PythonModule(&'static str),
}

impl ToolInvocation {
    /// Builds a `Command` for this invocation, arguments not yet applied.
    pub fn command(&self) -> Command {
        match self {
            ToolInvocation::Binary(path) => Command::new(path),
            ToolInvocation::PythonModule(module) => {
                let mut cmd = Command::new("python");
                cmd.arg("-m").arg(module);
                cmd
            }
        }
    }
}

/// Resolves a tool through the ordered discovery strategies.
///
/// Returns `None` when no strategy succeeds; callers treat that as the tool
/// being unavailable, not as an error.
pub fn locate(spec: &ToolSpec) -> Option<ToolInvocation> {
    if let Some(path) = find_in_path(spec.primary) {
        debug!(tool = spec.primary, path = %path.display(), "tool found on PATH");
        return Some(ToolInvocation::Binary(path));
    }
    if let Some(alternate) = spec.alternate {
        if let Some(path) = find_in_path(alternate) {
            debug!(tool = alternate, path = %path.display(), "tool found under alternate name");
            return Some(ToolInvocation::Binary(path));
        }
    }
    if let Some(module) = spec.python_module {
        if probe_python_module(module) {
            debug!(module, "tool invocable as python module");
            return Some(ToolInvocation::PythonModule(module));
        }
    }
    None
}

/// Searches the `PATH` environment variable for an executable file.
pub fn find_in_path(name: &str) -> Option<PathBuf> {
    search_dirs(name, env::var_os("PATH").unwrap_or_default().as_os_str())
}

fn search_dirs(name: &str, paths: &OsStr) -> Option<PathBuf> {
    env::split_paths(paths)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &PathBuf) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &PathBuf) -> bool {
    path.is_file()
}

fn probe_python_module(module: &str) -> bool {
    let mut cmd = Command::new("python");
    cmd.arg("-c").arg(format!("import {}", module));
    matches!(
        run_with_timeout(&mut cmd, PROBE_TIMEOUT),
        Ok(RunOutcome::Completed(run)) if run.status.success()
    )
}

/// The result of a completed (non-timed-out) tool invocation.
#[derive(Debug)]
pub struct ToolRun {
    pub status: ExitStatus,
    pub stderr: String,
}

impl ToolRun {
    /// A single-line, length-bounded rendering of the captured stderr for
    /// log messages and status reports.
    pub fn stderr_summary(&self) -> String {
        let flat = self.stderr.split_whitespace().collect::<Vec<_>>().join(" ");
        match flat.char_indices().nth(200) {
            Some((cut, _)) => format!("{}...", &flat[..cut]),
            None => flat,
        }
    }
}

/// Outcome of a bounded invocation.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(ToolRun),
    TimedOut,
}

/// Runs a command to completion or until the timeout expires.
///
/// Stdout is discarded and stderr is spooled through an unnamed temporary
/// file, so a chatty child can never fill a pipe and deadlock against the
/// bounded wait. On timeout the child is killed and reaped.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> io::Result<RunOutcome> {
    let mut spool = tempfile::tempfile()?;
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::from(spool.try_clone()?))
        .spawn()?;

    match child.wait_timeout(timeout)? {
        Some(status) => {
            let mut stderr = String::new();
            spool.seek(SeekFrom::Start(0))?;
            spool.read_to_string(&mut stderr).unwrap_or_default();
            Ok(RunOutcome::Completed(ToolRun { status, stderr }))
        }
        None => {
            child.kill().ok();
            child.wait().ok();
            Ok(RunOutcome::TimedOut)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[cfg(unix)]
    fn make_executable(dir: &std::path::Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    #[cfg(unix)]
    fn search_dirs_finds_executable_in_listed_directory() {
        let dir = tempfile::tempdir().unwrap();
        let expected = make_executable(dir.path(), "faketool");

        let paths = env::join_paths([dir.path().to_path_buf()]).unwrap();
        assert_eq!(search_dirs("faketool", &paths), Some(expected));
        assert_eq!(search_dirs("othertool", &paths), None);
    }

    #[test]
    #[cfg(unix)]
    fn search_dirs_ignores_non_executable_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("plainfile"), "data").unwrap();

        let paths = env::join_paths([dir.path().to_path_buf()]).unwrap();
        assert_eq!(search_dirs("plainfile", &paths), None);
    }

    #[test]
    fn locate_returns_none_for_unknown_tool() {
        let spec = ToolSpec {
            primary: "definitely-not-a-real-tool-name",
            alternate: Some("also-not-a-real-tool-name"),
            python_module: None,
        };
        assert_eq!(locate(&spec), None);
    }

    #[test]
    #[cfg(unix)]
    fn run_with_timeout_captures_exit_status_and_stderr() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo oops >&2; exit 3");

        match run_with_timeout(&mut cmd, Duration::from_secs(10)).unwrap() {
            RunOutcome::Completed(run) => {
                assert_eq!(run.status.code(), Some(3));
                assert_eq!(run.stderr.trim(), "oops");
            }
            RunOutcome::TimedOut => panic!("command should complete"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn run_with_timeout_kills_slow_commands() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("sleep 30");

        match run_with_timeout(&mut cmd, Duration::from_millis(100)).unwrap() {
            RunOutcome::TimedOut => {}
            RunOutcome::Completed(_) => panic!("command should time out"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn stderr_summary_is_single_line_and_bounded() {
        let run = ToolRun {
            status: Command::new("true").status().unwrap(),
            stderr: format!("line one\nline two\n{}", "x".repeat(500)),
        };
        let summary = run.stderr_summary();
        assert!(!summary.contains('\n'));
        assert!(summary.len() <= 203);
        assert!(summary.starts_with("line one line two"));
    }
}
