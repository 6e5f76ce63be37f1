//! Placeholder expansion and media-reference resolution.
//!
//! Page documents refer to their media with templated paths such as
//! `resources/{class}/{file}/main.py`. [`Placeholders`] expands those tokens
//! from the page and route, and [`Resolver`] turns the expanded string into a
//! locator that can be embedded or fetched directly.

use lazy_static::lazy_static;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::config::SiteConfig;
use crate::page::Page;
use crate::route::Route;

/// Characters left untouched by `encodeURIComponent`.
const SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    id: String,
    class: String,
    file: String,
    page_type: String,
    title: String,
}

impl Placeholders {
    pub fn new(page: &Page, route: &Route) -> Self {
        let mut placeholders = Self {
            id: route.id.clone(),
            class: route.class.clone(),
            file: file_stem(&route.id),
            page_type: page.page_type.clone().unwrap_or_default(),
            title: String::new(),
        };

        // The title may itself be templated; it is expanded before it becomes
        // available as `{title}`.
        let raw_title = [page.title.as_deref(), page.name.as_deref()]
            .into_iter()
            .flatten()
            .find(|value| !value.trim().is_empty())
            .unwrap_or(&route.id)
            .to_string();
        placeholders.title = placeholders.expand(&raw_title);
        placeholders
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Substitutes every known token in one pass. Substituted values are not
    /// scanned again, so a title containing `{id}` text is inserted verbatim.
    pub fn expand(&self, template: &str) -> String {
        lazy_static! {
            static ref TOKEN_RE: Regex = Regex::new(r"\{(file|class|id|title|type)\}").unwrap();
        }

        TOKEN_RE
            .replace_all(template, |caps: &regex::Captures| match &caps[1] {
                "file" => self.file.clone(),
                "class" => self.class.clone(),
                "id" => self.id.clone(),
                "title" => self.title.clone(),
                "type" => self.page_type.clone(),
                _ => String::new(),
            })
            .into_owned()
    }
}

/// Expands the placeholders of `template` for the given page and route.
pub fn expand(template: &str, page: &Page, route: &Route) -> String {
    Placeholders::new(page, route).expand(template)
}

#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    placeholders: Placeholders,
    base_path: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(config: &'a SiteConfig, page: &Page, route: &Route) -> Self {
        Self {
            placeholders: Placeholders::new(page, route),
            base_path: &config.base_path,
        }
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    /// Returns `None` when the reference is empty after expansion.
    pub fn resolve(&self, raw: &str) -> Option<String> {
        let expanded = self.placeholders.expand(raw);
        let trimmed = expanded.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return None;
        }

        if is_absolute(trimmed) {
            return Some(trimmed.to_string());
        }

        Some(join_base(self.base_path, &encode_path(trimmed)))
    }
}

pub fn resolve_reference(
    raw: &str,
    page: &Page,
    route: &Route,
    config: &SiteConfig,
) -> Option<String> {
    Resolver::new(config, page, route).resolve(raw)
}

pub fn is_absolute(value: &str) -> bool {
    lazy_static! {
        static ref ABSOLUTE_RE: Regex = Regex::new(r"(?i)^https?://").unwrap();
    }
    ABSOLUTE_RE.is_match(value)
}

/// Last `/` segment of an id with a trailing extension removed.
pub fn file_stem(id: &str) -> String {
    lazy_static! {
        static ref EXTENSION_RE: Regex = Regex::new(r"\.[^.]+$").unwrap();
    }
    let name = id.rsplit('/').next().unwrap_or(id);
    EXTENSION_RE.replace(name, "").into_owned()
}

pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT_ENCODE_SET).to_string()
}

/// Percent-encodes each `/`-separated segment on its own.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

pub fn decode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn join_base(base: &str, path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    if base.is_empty() {
        return trimmed.to_string();
    }
    format!("{}/{trimmed}", base.trim_end_matches('/'))
}

/// Inverse of [`join_base`]: the site-relative part of a locator produced for
/// `base`, or `None` when the locator points somewhere else.
pub fn strip_base<'l>(locator: &'l str, base: &str) -> Option<&'l str> {
    let base = base.trim_end_matches('/');
    let relative = if base.is_empty() {
        if is_absolute(locator) {
            return None;
        }
        locator
    } else {
        locator.strip_prefix(base)?
    };

    if !base.is_empty() && !relative.is_empty() && !relative.starts_with('/') {
        return None;
    }
    Some(relative.trim_start_matches('/'))
}
