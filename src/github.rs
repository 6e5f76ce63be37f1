use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA, USER_AGENT};
use reqwest::Client;

use crate::config::SiteConfig;
use crate::error::FetchError;
use crate::route::Route;
use crate::template::{encode_segment, is_absolute, strip_base};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GithubRepo {
    pub owner: String,
    pub name: String,
}

/// Reads page documents and site files straight from a repository branch on
/// the raw-content host. Every request bypasses HTTP caches so a freshly
/// pushed page shows up on the next render.
#[derive(Clone, Debug)]
pub struct RawContentClient {
    client: Client,
    repo: GithubRepo,
    branch: String,
    raw_base: String,
    base_path: String,
    timeout: Duration,
}

impl RawContentClient {
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        let repo = config
            .repo()
            .ok_or_else(|| anyhow!("no repository configured; set `repository` in folios.toml"))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("folios-cli"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let timeout = Duration::from_secs(config.fetch_timeout_secs.max(1));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("building raw content client")?;

        Ok(Self {
            client,
            repo,
            branch: config.branch.clone(),
            raw_base: config.raw_content_base.trim_end_matches('/').to_string(),
            base_path: config.base_path.clone(),
            timeout,
        })
    }

    pub fn repo(&self) -> &GithubRepo {
        &self.repo
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn page_url(&self, route: &Route) -> String {
        self.content_url(&route.page_path())
    }

    /// Maps a resolved locator to something fetchable: absolute locators are
    /// used as-is, site-relative ones are read from the repository branch.
    pub fn absolute_url(&self, locator: &str) -> String {
        if is_absolute(locator) {
            return locator.to_string();
        }
        let relative = strip_base(locator, &self.base_path)
            .unwrap_or_else(|| locator.trim_start_matches('/'));
        self.content_url(relative)
    }

    pub async fn get_text(&self, locator: &str) -> Result<String, FetchError> {
        let url = self.absolute_url(locator);
        tracing::debug!(%locator, %url, "fetching");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| FetchError::Transport {
                locator: locator.to_string(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                locator: locator.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|err| FetchError::Transport {
            locator: locator.to_string(),
            message: err.to_string(),
        })
    }

    fn content_url(&self, encoded_path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.raw_base,
            encode_segment(&self.repo.owner),
            encode_segment(&self.repo.name),
            encode_segment(&self.branch),
            encoded_path.trim_start_matches('/')
        )
    }
}

pub fn parse_github_repo(raw: &str) -> Option<GithubRepo> {
    let cleaned = raw.trim().trim_end_matches(".git");
    if cleaned.is_empty() {
        return None;
    }

    let repo_part = if let Some(stripped) = cleaned.strip_prefix("git@github.com:") {
        stripped
    } else if let Some(stripped) = cleaned.strip_prefix("ssh://git@github.com/") {
        stripped
    } else if let Some(stripped) = parse_http_github_repo(cleaned) {
        stripped
    } else if cleaned.contains('/') && !cleaned.contains(':') {
        cleaned
    } else {
        return None;
    };

    let mut segments = repo_part.trim_matches('/').split('/');
    let owner = segments.next()?.trim();
    let name = segments.next()?.trim();
    if owner.is_empty() || name.is_empty() {
        return None;
    }

    Some(GithubRepo {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}

fn parse_http_github_repo(cleaned: &str) -> Option<&str> {
    let rest = cleaned
        .strip_prefix("https://")
        .or_else(|| cleaned.strip_prefix("http://"))?;
    let (host, path) = rest.split_once('/')?;
    if host != "github.com" && host != "www.github.com" {
        return None;
    }
    (!path.is_empty()).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client(base_path: &str) -> RawContentClient {
        let config = SiteConfig {
            repository: Some("team5840/notebook".into()),
            branch: "gh-pages".into(),
            base_path: base_path.into(),
            ..SiteConfig::default()
        };
        RawContentClient::from_config(&config).expect("client builds")
    }

    #[test]
    fn parses_repository_forms() {
        for raw in [
            "team5840/notebook",
            "https://github.com/team5840/notebook",
            "https://github.com/team5840/notebook.git",
            "git@github.com:team5840/notebook.git",
        ] {
            let repo = parse_github_repo(raw).unwrap_or_else(|| panic!("{raw} should parse"));
            assert_eq!(repo.owner, "team5840");
            assert_eq!(repo.name, "notebook");
        }
        assert!(parse_github_repo("https://gitlab.com/a/b").is_none());
        assert!(parse_github_repo("").is_none());
    }

    #[test]
    fn page_url_encodes_each_segment() {
        let route = Route {
            class: "DE".into(),
            id: "1.1.9 Soldering".into(),
        };
        assert_eq!(
            client("/").page_url(&route),
            "https://raw.githubusercontent.com/team5840/notebook/gh-pages/pages/DE/1.1.9%20Soldering.json"
        );
    }

    #[test]
    fn site_relative_locators_map_to_the_branch() {
        let client = client("/notebook");
        assert_eq!(
            client.absolute_url("/notebook/resources/a%20b/main.py"),
            "https://raw.githubusercontent.com/team5840/notebook/gh-pages/resources/a%20b/main.py"
        );
        assert_eq!(
            client.absolute_url("https://example.com/x.py"),
            "https://example.com/x.py"
        );
    }

    #[test]
    fn requests_are_bounded_by_the_configured_timeout() {
        assert_eq!(client("/").timeout(), Duration::from_secs(30));

        let config = SiteConfig {
            repository: Some("team5840/notebook".into()),
            fetch_timeout_secs: 0,
            ..SiteConfig::default()
        };
        let client = RawContentClient::from_config(&config).expect("client builds");
        assert_eq!(client.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn missing_repository_is_an_error() {
        let err = RawContentClient::from_config(&SiteConfig::default()).expect_err("no repo");
        assert!(err.to_string().contains("no repository configured"), "got: {err}");
    }
}
