//! Autosquash of `fixup!`/`squash!` commits on a PR branch.
//!
//! The squash runs in the repository's working clone:
//!
//! 1. Point `origin` at the remote (refreshing credentials) and fetch
//! 2. Check out the PR head in detached HEAD mode
//! 3. `git rebase --interactive --autosquash <merge-base>` with a no-op
//!    sequence editor, so git applies its own autosquash todo list
//! 4. Push `HEAD:refs/heads/<head_ref>` with a lease on the head SHA the PR
//!    snapshot saw, so a push that raced us is never overwritten
//!
//! Rebasing onto the merge base rather than the tip of the base branch keeps
//! the squash from pulling in unrelated base changes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::collaborators::GitRepos;
use crate::types::{PullRequestSnapshot, RepoId, Sha};

use super::{
    CommitIdentity, GitError, GitResult, checkout_detached, git_command, git_commit_command,
    merge_base, rev_parse, run_git_sync,
};

/// [`GitRepos`] backed by local working clones.
///
/// Clones live in `<base_dir>/<owner>-<repo>` and are reused across requests.
/// Access to one clone is serialized; different repositories squash in
/// parallel.
pub struct LocalGitRepos {
    base_dir: PathBuf,
    remote_base: String,
    identity: CommitIdentity,
    locks: Mutex<HashMap<RepoId, Arc<tokio::sync::Mutex<()>>>>,
}

impl LocalGitRepos {
    /// Creates a repository set whose remotes are `<remote_base>/<owner>/<repo>.git`.
    pub fn new(
        base_dir: impl Into<PathBuf>,
        remote_base: impl Into<String>,
        identity: CommitIdentity,
    ) -> Self {
        LocalGitRepos {
            base_dir: base_dir.into(),
            remote_base: remote_base.into(),
            identity,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a repository set that fetches from and pushes to github.com,
    /// authenticating with `token`.
    pub fn for_github(
        base_dir: impl Into<PathBuf>,
        token: &str,
        identity: CommitIdentity,
    ) -> Self {
        Self::new(
            base_dir,
            format!("https://x-access-token:{}@github.com", token),
            identity,
        )
    }

    /// Returns the path to the working clone of `repo`.
    pub fn repo_dir(&self, repo: &RepoId) -> PathBuf {
        self.base_dir.join(format!("{}-{}", repo.owner, repo.repo))
    }

    fn remote_url(&self, repo: &RepoId) -> String {
        format!(
            "{}/{}/{}.git",
            self.remote_base.trim_end_matches('/'),
            repo.owner,
            repo.repo
        )
    }

    fn lock_for(&self, repo: &RepoId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(repo.clone()).or_default().clone()
    }
}

impl std::fmt::Debug for LocalGitRepos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // remote_base may embed a token
        f.debug_struct("LocalGitRepos")
            .field("base_dir", &self.base_dir)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl GitRepos for LocalGitRepos {
    async fn squash(&self, repo: &RepoId, pr: &PullRequestSnapshot) -> Result<(), GitError> {
        let lock = self.lock_for(repo);
        let _guard = lock.lock().await;

        let repo_dir = self.repo_dir(repo);
        let url = self.remote_url(repo);
        let identity = self.identity.clone();
        let pr = pr.clone();

        info!(repo = %repo, pr = %pr.number, head = %pr.head_sha.short(), "Squashing PR");

        tokio::task::spawn_blocking(move || squash_sync(&repo_dir, &url, &identity, &pr))
            .await
            .map_err(|e| GitError::TaskFailed(e.to_string()))?
    }
}

fn squash_sync(
    repo_dir: &Path,
    url: &str,
    identity: &CommitIdentity,
    pr: &PullRequestSnapshot,
) -> GitResult<()> {
    prepare_clone(repo_dir, url)?;
    run_git_sync(repo_dir, &["fetch", "--prune", "origin"])?;
    abort_interrupted_rebase(repo_dir);

    checkout_detached(repo_dir, pr.head_sha.as_str())?;
    let upstream = format!("origin/{}", pr.base_ref);
    let base = merge_base(repo_dir, "HEAD", &upstream)?;
    debug!(pr = %pr.number, base = %base.short(), "Rebasing onto merge base");

    autosquash(repo_dir, identity, &base)?;
    let squashed = rev_parse(repo_dir, "HEAD")?;
    push_with_lease(repo_dir, &pr.head_ref, &pr.head_sha)?;
    info!(pr = %pr.number, old = %pr.head_sha.short(), new = %squashed.short(), "Pushed squashed branch");
    Ok(())
}

/// Ensures `repo_dir` is a git repository whose `origin` is `url`.
///
/// The URL may carry credentials, so failures report a redacted command.
fn prepare_clone(repo_dir: &Path, url: &str) -> GitResult<()> {
    if !repo_dir.join(".git").exists() {
        std::fs::create_dir_all(repo_dir)?;
        run_git_sync(repo_dir, &["init", "--quiet"])?;
    }

    let has_origin = git_command(repo_dir)
        .args(["remote", "get-url", "origin"])
        .output()?
        .status
        .success();
    let verb = if has_origin { "set-url" } else { "add" };

    let output = git_command(repo_dir)
        .args(["remote", verb, "origin", url])
        .output()?;
    if output.status.success() {
        Ok(())
    } else {
        Err(GitError::CommandFailed {
            command: format!("git remote {} origin <redacted>", verb),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// A previous squash that died mid-rebase leaves the clone in a rebase state
/// that blocks checkout.
fn abort_interrupted_rebase(repo_dir: &Path) {
    let git_dir = repo_dir.join(".git");
    if git_dir.join("rebase-merge").exists() || git_dir.join("rebase-apply").exists() {
        warn!(dir = %repo_dir.display(), "Aborting interrupted rebase");
        if let Err(e) = run_git_sync(repo_dir, &["rebase", "--abort"]) {
            warn!(error = %e, "Failed to abort interrupted rebase");
        }
    }
}

fn autosquash(repo_dir: &Path, identity: &CommitIdentity, base: &Sha) -> GitResult<()> {
    let output = git_commit_command(repo_dir, identity)
        .env("GIT_SEQUENCE_EDITOR", "true")
        .env("GIT_EDITOR", "true")
        .args(["rebase", "--interactive", "--autosquash", base.as_str()])
        .output()?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    if let Err(e) = run_git_sync(repo_dir, &["rebase", "--abort"]) {
        warn!(error = %e, "Failed to abort conflicting rebase");
    }
    Err(GitError::RebaseConflict { details: stderr })
}

fn push_with_lease(repo_dir: &Path, branch: &str, expected: &Sha) -> GitResult<()> {
    let lease = format!("--force-with-lease=refs/heads/{}:{}", branch, expected);
    let refspec = format!("HEAD:refs/heads/{}", branch);

    let output = git_command(repo_dir)
        .args(["push", &lease, "origin", &refspec])
        .output()?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    if stderr.contains("stale info") || stderr.contains("rejected") {
        return Err(GitError::PushRejected { details: stderr });
    }
    Err(GitError::CommandFailed {
        command: format!("git push {} origin {}", lease, refspec),
        stderr,
    })
}
