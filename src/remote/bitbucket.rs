use reqwest::Client;
use serde::Deserialize;

use crate::infrastructure::error::ReviewError;
use crate::models::{FileBatch, RemoteConfig, SourceFile};
use crate::remote::filter;

#[derive(Debug, Deserialize)]
struct SrcListing {
    #[serde(default)]
    values: Vec<SrcEntry>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SrcEntry {
    #[serde(rename = "type")]
    kind: String,
    path: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    links: Option<SrcLinks>,
}

#[derive(Debug, Deserialize)]
struct SrcLinks {
    #[serde(rename = "self")]
    self_link: Option<SrcLink>,
}

#[derive(Debug, Deserialize)]
struct SrcLink {
    href: String,
}

/// One unit of pending work in the depth-first walk. Directory listings and
/// accepted file fetches share a single explicit stack, which keeps the
/// count-ceiling short-circuit and cancellation trivial to reason about.
enum WorkItem {
    List(String),
    Fetch { path: String, href: String },
}

/// Walks a Bitbucket repository via paginated `src` directory listings.
///
/// Bitbucket has no recursive tree endpoint, so the walker performs an
/// in-order depth-first traversal from the repository root.
pub struct BitbucketWalker<'a> {
    client: &'a Client,
    api_url: String,
}

impl<'a> BitbucketWalker<'a> {
    pub fn new(client: &'a Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    pub async fn walk(&self, remote: &RemoteConfig) -> Result<FileBatch, ReviewError> {
        // Resource-owner credentials are a hard precondition; fail before
        // any request goes out.
        let (username, password) = match (&remote.username, &remote.app_password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u.as_str(), p.as_str()),
            _ => {
                return Err(ReviewError::config(
                    "Bitbucket requires a username and app password",
                ))
            }
        };

        let mut batch = FileBatch::new();
        let mut stack = vec![WorkItem::List(String::new())];

        while let Some(item) = stack.pop() {
            if batch.len() >= filter::MAX_REVIEW_FILES {
                tracing::debug!(
                    limit = filter::MAX_REVIEW_FILES,
                    "file ceiling reached, abandoning remaining work"
                );
                break;
            }

            match item {
                WorkItem::List(dir) => {
                    let entries = self
                        .list_directory(remote, &dir, username, password)
                        .await?;

                    // Entries are pushed in reverse so they pop in listing
                    // order: subdirectories are descended into at the point
                    // they appear, exactly like in-order recursion.
                    for entry in entries.into_iter().rev() {
                        match entry.kind.as_str() {
                            "commit_directory" => stack.push(WorkItem::List(entry.path)),
                            "commit_file" => {
                                if !filter::accept(&entry.path, entry.size.unwrap_or(0)) {
                                    continue;
                                }
                                let href = entry
                                    .links
                                    .and_then(|links| links.self_link)
                                    .map(|link| link.href);
                                if let Some(href) = href {
                                    stack.push(WorkItem::Fetch {
                                        path: entry.path,
                                        href,
                                    });
                                } else {
                                    tracing::warn!(path = %entry.path, "file entry without self link, skipped");
                                }
                            }
                            other => {
                                tracing::debug!(kind = %other, path = %entry.path, "ignoring entry");
                            }
                        }
                    }
                }
                WorkItem::Fetch { path, href } => {
                    let content = self.fetch_raw(&href, username, password).await?;
                    batch.push(SourceFile::new(path, content));
                }
            }
        }

        Ok(batch)
    }

    /// Lists one directory, following `next` pagination links until the
    /// level is exhausted.
    async fn list_directory(
        &self,
        remote: &RemoteConfig,
        dir: &str,
        username: &str,
        password: &str,
    ) -> Result<Vec<SrcEntry>, ReviewError> {
        let mut url = self.src_url(remote, dir);
        let mut entries = Vec::new();

        loop {
            let response = self
                .client
                .get(&url)
                .basic_auth(username, Some(password))
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let text = response.text().await.unwrap_or_default();
                return Err(ReviewError::transport(
                    status,
                    format!("Bitbucket API error: {}", text),
                ));
            }

            let page: SrcListing = response.json().await.map_err(|e| {
                ReviewError::network(
                    format!("Bitbucket API returned bad JSON: {}", e),
                    Some(url.clone()),
                )
            })?;

            entries.extend(page.values);
            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(entries)
    }

    async fn fetch_raw(
        &self,
        href: &str,
        username: &str,
        password: &str,
    ) -> Result<String, ReviewError> {
        let response = self
            .client
            .get(href)
            .basic_auth(username, Some(password))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ReviewError::transport(
                status,
                format!("Bitbucket content fetch failed: {}", text),
            ));
        }

        Ok(response.text().await?)
    }

    fn src_url(&self, remote: &RemoteConfig, dir: &str) -> String {
        let mut url = format!(
            "{}/2.0/repositories/{}/{}/src/{}/",
            self.api_url.trim_end_matches('/'),
            remote.owner,
            remote.repo,
            urlencoding::encode(&remote.branch)
        );
        if !dir.is_empty() {
            let encoded: Vec<String> = dir
                .split('/')
                .map(|segment| urlencoding::encode(segment).into_owned())
                .collect();
            url.push_str(&encoded.join("/"));
            url.push('/');
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RemoteProvider;

    fn remote() -> RemoteConfig {
        RemoteConfig {
            provider: RemoteProvider::Bitbucket,
            owner: "acme".to_string(),
            repo: "shop".to_string(),
            branch: "main".to_string(),
            token: None,
            username: Some("dev".to_string()),
            app_password: Some("secret".to_string()),
        }
    }

    #[test]
    fn test_src_url_root() {
        let client = Client::new();
        let walker = BitbucketWalker::new(&client, "https://api.bitbucket.org");
        assert_eq!(
            walker.src_url(&remote(), ""),
            "https://api.bitbucket.org/2.0/repositories/acme/shop/src/main/"
        );
    }

    #[test]
    fn test_src_url_encodes_segments() {
        let client = Client::new();
        let walker = BitbucketWalker::new(&client, "https://api.bitbucket.org");
        let mut cfg = remote();
        cfg.branch = "feature/login".to_string();
        assert_eq!(
            walker.src_url(&cfg, "src/main java"),
            "https://api.bitbucket.org/2.0/repositories/acme/shop/src/feature%2Flogin/src/main%20java/"
        );
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_fast() {
        let client = Client::new();
        let walker = BitbucketWalker::new(&client, "https://api.bitbucket.org");
        let mut cfg = remote();
        cfg.username = None;
        cfg.app_password = None;

        let err = walker.walk(&cfg).await.unwrap_err();
        assert!(matches!(err, ReviewError::Configuration { .. }));
    }
}
