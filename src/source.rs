use std::future::Future;
use std::path::{Component, Path, PathBuf};

use crate::config::SiteConfig;
use crate::error::FetchError;
use crate::github::RawContentClient;
use crate::page::Page;
use crate::route::Route;
use crate::template::{decode_path, join_base, strip_base};

/// Where page documents and deferred block content are read from.
pub trait ContentSource: Clone + Send + Sync + 'static {
    fn page_locator(&self, route: &Route) -> String;

    fn fetch_text(&self, locator: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

pub async fn fetch_page<S: ContentSource>(source: &S, route: &Route) -> Result<Page, FetchError> {
    let locator = source.page_locator(route);
    let raw = source.fetch_text(&locator).await?;
    Page::from_json_str(&raw).map_err(|message| FetchError::InvalidDocument { locator, message })
}

/// A site checkout on disk, addressed with the same locators the renderer
/// produces for the deployed site.
#[derive(Clone, Debug)]
pub struct LocalSite {
    root: PathBuf,
    base_path: String,
}

impl LocalSite {
    pub fn new(root: impl Into<PathBuf>, config: &SiteConfig) -> Self {
        Self {
            root: root.into(),
            base_path: config.base_path.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File behind a site-relative locator. Absolute locators and paths that
    /// would leave the site root have none.
    pub fn path_for(&self, locator: &str) -> Option<PathBuf> {
        let relative = strip_base(locator, &self.base_path)?;
        let decoded = decode_path(relative);
        let relative_path = Path::new(&decoded);
        let escapes = relative_path
            .components()
            .any(|component| !matches!(component, Component::Normal(_)));
        if decoded.is_empty() || escapes {
            return None;
        }
        Some(self.root.join(relative_path))
    }
}

impl ContentSource for LocalSite {
    fn page_locator(&self, route: &Route) -> String {
        join_base(&self.base_path, &route.page_path())
    }

    fn fetch_text(&self, locator: &str) -> impl Future<Output = Result<String, FetchError>> + Send {
        let path = self.path_for(locator);
        let locator = locator.to_string();
        async move {
            let Some(path) = path else {
                return Err(FetchError::Transport {
                    message: "locator is outside the local site".to_string(),
                    locator,
                });
            };
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => Ok(contents),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    Err(FetchError::Status { locator, status: 404 })
                }
                Err(err) => Err(FetchError::Transport {
                    locator,
                    message: err.to_string(),
                }),
            }
        }
    }
}

impl ContentSource for RawContentClient {
    fn page_locator(&self, route: &Route) -> String {
        self.page_url(route)
    }

    fn fetch_text(&self, locator: &str) -> impl Future<Output = Result<String, FetchError>> + Send {
        self.get_text(locator)
    }
}

/// Runtime choice between the deployed repository and a local checkout.
#[derive(Clone, Debug)]
pub enum SiteSource {
    Remote(RawContentClient),
    Local(LocalSite),
}

impl ContentSource for SiteSource {
    fn page_locator(&self, route: &Route) -> String {
        match self {
            SiteSource::Remote(client) => client.page_locator(route),
            SiteSource::Local(site) => site.page_locator(route),
        }
    }

    fn fetch_text(&self, locator: &str) -> impl Future<Output = Result<String, FetchError>> + Send {
        async move {
            match self {
                SiteSource::Remote(client) => client.get_text(locator).await,
                SiteSource::Local(site) => site.fetch_text(locator).await,
            }
        }
    }
}
