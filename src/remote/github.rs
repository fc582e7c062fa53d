use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures_util::{stream, StreamExt};
use reqwest::Client;
use serde::Deserialize;

use crate::infrastructure::error::ReviewError;
use crate::models::{FileBatch, RemoteConfig, SourceFile};
use crate::remote::filter;

/// How many blob fetches may be in flight at once. Results are reassembled
/// in discovery order, so concurrency never changes batch ordering.
const BLOB_FETCH_CONCURRENCY: usize = 8;

#[derive(Debug, Deserialize)]
struct GitTreeResponse {
    tree: Vec<GitTreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct GitTreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitBlobResponse {
    content: String,
    encoding: String,
}

/// Walks a GitHub repository through the recursive tree endpoint and
/// materializes the eligible files' text content.
pub struct GithubWalker<'a> {
    client: &'a Client,
    api_url: String,
}

impl<'a> GithubWalker<'a> {
    pub fn new(client: &'a Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    pub async fn walk(&self, remote: &RemoteConfig) -> Result<FileBatch, ReviewError> {
        let tree_url = format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.api_url.trim_end_matches('/'),
            remote.owner,
            remote.repo,
            remote.branch
        );

        let listing: GitTreeResponse = self
            .get_json(&tree_url, remote.token.as_deref())
            .await?;

        if listing.truncated {
            tracing::warn!(
                owner = %remote.owner,
                repo = %remote.repo,
                "GitHub tree listing was truncated by the API; review covers a partial tree"
            );
        }

        // Eligible blobs in discovery order, cut to the global ceiling before
        // any content fetch is issued.
        let eligible: Vec<&GitTreeEntry> = listing
            .tree
            .iter()
            .filter(|entry| {
                entry.kind == "blob" && filter::accept(&entry.path, entry.size.unwrap_or(0))
            })
            .take(filter::MAX_REVIEW_FILES)
            .collect();

        tracing::debug!(
            total = listing.tree.len(),
            eligible = eligible.len(),
            "GitHub tree filtered"
        );

        let token = remote.token.as_deref();
        let fetches = eligible.into_iter().map(|entry| {
            let path = entry.path.clone();
            let blob_url = entry.url.clone();
            async move {
                let blob_url = blob_url.ok_or_else(|| {
                    ReviewError::network(
                        format!("blob entry '{}' has no content URL", path),
                        None,
                    )
                })?;
                let blob: GitBlobResponse = self.get_json(&blob_url, token).await?;
                let content = decode_blob(&blob)?;
                Ok::<SourceFile, ReviewError>(SourceFile::new(path, content))
            }
        });

        // buffered() yields in input order regardless of completion order
        let mut batch = FileBatch::new();
        let mut results = stream::iter(fetches).buffered(BLOB_FETCH_CONCURRENCY);
        while let Some(file) = results.next().await {
            batch.push(file?);
        }

        Ok(batch)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: Option<&str>,
    ) -> Result<T, ReviewError> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ReviewError::transport(
                status,
                format!("GitHub API error: {}", text),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            ReviewError::network(
                format!("GitHub API returned bad JSON: {}", e),
                Some(url.to_string()),
            )
        })
    }
}

/// GitHub ships blob content base64-encoded with embedded newlines.
fn decode_blob(blob: &GitBlobResponse) -> Result<String, ReviewError> {
    match blob.encoding.as_str() {
        "base64" => {
            let compact: String = blob
                .content
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            let bytes = BASE64.decode(compact.as_bytes()).map_err(|e| {
                ReviewError::network(format!("failed to decode blob content: {}", e), None)
            })?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => Ok(blob.content.clone()),
    }
}
