//! Git metadata for the project a conversation was saved from
//!
//! Every lookup is best effort: a missing `git`, a directory outside a repository or a
//! command that hangs all yield `None`.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

pub const GIT_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitInfo {
    pub branch: Option<String>,
    pub commit: Option<String>,
}

/// Run `git <args>` in `cwd`, returning trimmed stdout on success
///
/// The child is killed once `timeout` elapses. Empty output counts as no answer.
pub fn run_git(args: &[&str], cwd: &Path, timeout: Duration) -> Option<String> {
    let mut child = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| tracing::debug!(error = %e, "could not start git"))
        .ok()?;

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                tracing::debug!(?args, "git timed out");
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                tracing::debug!(error = %e, "waiting for git failed");
                return None;
            }
        }
    };

    if !status.success() {
        return None;
    }

    let mut stdout = String::new();
    child.stdout.take()?.read_to_string(&mut stdout).ok()?;
    let trimmed = stdout.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn current_branch(cwd: &Path) -> Option<String> {
    run_git(&["rev-parse", "--abbrev-ref", "HEAD"], cwd, GIT_TIMEOUT)
}

/// Short hash of `HEAD`
pub fn current_commit(cwd: &Path) -> Option<String> {
    run_git(&["rev-parse", "--short", "HEAD"], cwd, GIT_TIMEOUT)
}

/// Branch and commit, looked up concurrently; both finish before this returns
pub fn collect_git_info(cwd: &Path) -> GitInfo {
    let (branch, commit) = rayon::join(|| current_branch(cwd), || current_commit(cwd));
    GitInfo { branch, commit }
}
