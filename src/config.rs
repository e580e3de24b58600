//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or through its environment variable;
//! the flag wins when both are set.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::git::CommitIdentity;

#[derive(Clone, Parser)]
#[command(
    name = "review-helper",
    about = "Merges and squashes GitHub pull requests on reviewer comment commands",
    version
)]
pub struct Config {
    #[arg(long, env = "PORT", default_value_t = 8080, help = "Port to listen on")]
    pub port: u16,

    #[arg(
        long = "github-secret",
        env = "GITHUB_SECRET",
        hide_env_values = true,
        help = "Shared secret GitHub signs webhook deliveries with"
    )]
    pub github_secret: String,

    #[arg(
        long = "github-api-token",
        env = "GITHUB_API_TOKEN",
        hide_env_values = true,
        help = "Token for the GitHub API and for pushing squashed branches"
    )]
    pub github_api_token: String,

    #[arg(
        long = "repos-dir",
        env = "REPOS_DIR",
        default_value = "./repos",
        help = "Directory holding the working clones used for squashing"
    )]
    pub repos_dir: PathBuf,

    #[arg(
        long = "git-user-name",
        env = "GIT_USER_NAME",
        default_value = "review-helper",
        help = "Committer name for squashed commits"
    )]
    pub git_user_name: String,

    #[arg(
        long = "git-user-email",
        env = "GIT_USER_EMAIL",
        default_value = "review-helper@localhost",
        help = "Committer email for squashed commits"
    )]
    pub git_user_email: String,
}

impl Config {
    /// Address to bind the HTTP server to.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn commit_identity(&self) -> CommitIdentity {
        CommitIdentity {
            name: self.git_user_name.clone(),
            email: self.git_user_email.clone(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("github_secret", &"<redacted>")
            .field("github_api_token", &"<redacted>")
            .field("repos_dir", &self.repos_dir)
            .field("git_user_name", &self.git_user_name)
            .field("git_user_email", &self.git_user_email)
            .finish()
    }
}
