//! Local git operations for squashing fixup commits.
//!
//! Each repository gets one working clone under the configured base directory.
//! All operations run in **detached HEAD mode** so no local branch ever needs
//! to be kept in sync with the remote. Pushes use `HEAD:refs/heads/<branch>`
//! refspecs.
//!
//! Git is invoked as a subprocess with a clean environment (no system or user
//! config) so behavior does not depend on the host's git setup.

mod squash;

pub use squash::LocalGitRepos;

use std::path::Path;
use std::process::Output;

use thiserror::Error;

use crate::types::Sha;

/// Failures of the git subprocesses behind squashing.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("git command failed: {command}\nstderr: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The autosquash rebase stopped on a conflict.
    #[error("rebase conflict: {details}")]
    RebaseConflict { details: String },

    /// Push was rejected (the branch moved since we fetched it).
    #[error("push rejected: {details}")]
    PushRejected { details: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking git task panicked or was cancelled.
    #[error("git task failed: {0}")]
    TaskFailed(String),
}

pub type GitResult<T> = Result<T, GitError>;

/// Identity used for rewriting commits.
///
/// Passed via `-c` flags to git commands, so commits can be created even
/// though global and system git config is disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    /// The committer name (git `user.name`).
    pub name: String,

    /// The committer email (git `user.email`).
    pub email: String,
}

/// A `git` invocation in `workdir` that ignores system and user config and
/// never prompts for credentials.
pub(crate) fn git_command(workdir: &Path) -> std::process::Command {
    use std::process::Command;

    let mut cmd = Command::new("git");
    cmd.current_dir(workdir);

    cmd.env("GIT_CONFIG_NOSYSTEM", "1");
    cmd.env("GIT_CONFIG_GLOBAL", "/dev/null");
    cmd.env("GIT_TERMINAL_PROMPT", "0");

    cmd
}

/// Create a git Command configured for rewriting commits.
///
/// Extends [`git_command`] with `-c user.name=<name> -c user.email=<email>`.
pub(crate) fn git_commit_command(
    workdir: &Path,
    identity: &CommitIdentity,
) -> std::process::Command {
    let mut cmd = git_command(workdir);

    cmd.arg("-c");
    cmd.arg(format!("user.name={}", identity.name));
    cmd.arg("-c");
    cmd.arg(format!("user.email={}", identity.email));

    cmd
}

/// Runs `git args...` in `workdir`; a non-zero exit becomes
/// [`GitError::CommandFailed`] carrying stderr.
pub fn run_git_sync(workdir: &Path, args: &[&str]) -> GitResult<Output> {
    let output = git_command(workdir).args(args).output()?;

    if output.status.success() {
        Ok(output)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let command = format!("git {}", args.join(" "));
        Err(GitError::CommandFailed { command, stderr })
    }
}

/// Like [`run_git_sync`], returning trimmed stdout.
pub fn run_git_stdout(workdir: &Path, args: &[&str]) -> GitResult<String> {
    let output = run_git_sync(workdir, args)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Resolves `rev` to a full commit hash.
pub fn rev_parse(workdir: &Path, rev: &str) -> GitResult<Sha> {
    run_git_stdout(workdir, &["rev-parse", rev]).map(Sha::new)
}

/// Find the best common ancestor of two revisions.
pub fn merge_base(workdir: &Path, a: &str, b: &str) -> GitResult<Sha> {
    run_git_stdout(workdir, &["merge-base", a, b]).map(Sha::new)
}

/// Checkout a target in detached HEAD mode, discarding local changes.
pub fn checkout_detached(workdir: &Path, target: &str) -> GitResult<()> {
    run_git_sync(workdir, &["checkout", "--force", "--detach", target])?;
    Ok(())
}

/// Commit subjects from `base` (exclusive) to HEAD, oldest first.
#[cfg(test)]
pub(crate) fn log_subjects(workdir: &Path, base: &str) -> GitResult<Vec<String>> {
    let range = format!("{}..HEAD", base);
    let output = run_git_stdout(workdir, &["log", "--reverse", "--format=%s", &range])?;
    Ok(output.lines().map(str::to_string).collect())
}
