pub mod bitbucket;
pub mod filter;
pub mod github;

use reqwest::Client;

use crate::config::Config;
use crate::infrastructure::error::ReviewError;
use crate::models::{FileBatch, RemoteConfig, RemoteProvider};

pub use bitbucket::BitbucketWalker;
pub use github::GithubWalker;

/// Produce a review batch from a hosted repository, dispatching to the
/// provider-specific walker. Runs before and independently of any review
/// invocation; the returned batch is owned by the caller.
pub async fn fetch_remote_batch(
    client: &Client,
    config: &Config,
    remote: &RemoteConfig,
) -> Result<FileBatch, ReviewError> {
    if remote.owner.trim().is_empty() || remote.repo.trim().is_empty() {
        return Err(ReviewError::config(
            "remote repository coordinates require owner and repo",
        ));
    }

    let batch = match remote.provider {
        RemoteProvider::GitHub => {
            GithubWalker::new(client, config.github_api_url.clone())
                .walk(remote)
                .await?
        }
        RemoteProvider::Bitbucket => {
            BitbucketWalker::new(client, config.bitbucket_api_url.clone())
                .walk(remote)
                .await?
        }
    };

    tracing::info!(
        provider = ?remote.provider,
        owner = %remote.owner,
        repo = %remote.repo,
        files = batch.len(),
        "remote batch assembled"
    );

    Ok(batch)
}
