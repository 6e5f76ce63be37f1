use crate::config::SiteConfig;
use crate::error::RouteError;
use crate::template::{decode_path, encode_path, encode_segment, strip_base};

/// The `(class, id)` pair naming one page document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    pub class: String,
    pub id: String,
}

impl Route {
    pub fn new(class: &str, id: &str, config: &SiteConfig) -> Result<Self, RouteError> {
        let class = class.trim();
        let id = id.trim().trim_matches('/');
        if class.is_empty() || id.is_empty() {
            return Err(RouteError::Missing);
        }
        if !config.class_allowed(class) {
            return Err(RouteError::ClassNotAllowed(class.to_string()));
        }
        Ok(Self {
            class: class.to_string(),
            id: id.to_string(),
        })
    }

    /// Route from already-decoded `class` and `id` query parameters.
    pub fn from_params(
        class: Option<&str>,
        id: Option<&str>,
        config: &SiteConfig,
    ) -> Result<Self, RouteError> {
        match (class, id) {
            (Some(class), Some(id)) => Self::new(class, id, config),
            _ => Err(RouteError::Missing),
        }
    }

    /// Route from a request path of the form `/<base>/<class>/<id...>`.
    pub fn from_path(path: &str, config: &SiteConfig) -> Result<Self, RouteError> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let relative = strip_base(path, &config.base_path).ok_or(RouteError::Missing)?;
        let decoded = decode_path(relative.trim_end_matches('/'));
        let (class, id) = decoded.split_once('/').ok_or(RouteError::Missing)?;
        Self::new(class, id, config)
    }

    /// Site-relative location of the page document, each segment encoded.
    pub fn page_path(&self) -> String {
        format!(
            "pages/{}/{}.json",
            encode_segment(&self.class),
            encode_path(&self.id)
        )
    }
}
