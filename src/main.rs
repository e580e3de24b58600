use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use review_helper::collaborators::Collaborators;
use review_helper::config::Config;
use review_helper::git::LocalGitRepos;
use review_helper::github::GitHubClient;
use review_helper::server::{AppState, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "review_helper=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    tracing::debug!(?config, "Loaded configuration");

    let github = Arc::new(
        GitHubClient::from_token(&config.github_api_token)
            .context("failed to build GitHub client")?,
    );
    let git_repos = Arc::new(LocalGitRepos::for_github(
        &config.repos_dir,
        &config.github_api_token,
        config.commit_identity(),
    ));

    let collaborators = Collaborators {
        issues: github.clone(),
        pull_requests: github.clone(),
        repositories: github,
        git_repos,
    };
    let app = build_router(AppState::new(
        config.github_secret.as_bytes(),
        collaborators,
    ));

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
