//! Printable notebook: every page listed in `pages/manifest.json`, composed
//! and hydrated from a local checkout, in one HTML document.
//!
//! The notebook is meant to be opened straight from disk, so every local
//! reference is written relative to the output directory and local images
//! are copied into `<output>/assets/`.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use maud::{html, Markup, PreEscaped};
use serde_json::{Map, Value};
use unicode_normalization::UnicodeNormalization;

use crate::compose::compose;
use crate::config::SiteConfig;
use crate::hydrate::{hydrate, MountedPage};
use crate::layout::{base_layout, Assets};
use crate::page::{Element, Page};
use crate::route::Route;
use crate::source::{fetch_page, LocalSite};
use crate::template::{decode_path, encode_path, is_absolute, strip_base, Resolver};

pub const MANIFEST_PATH: &str = "pages/manifest.json";

#[derive(Debug, Clone)]
pub struct NotebookEntry {
    pub anchor: String,
    pub title: String,
    pub date: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct NotebookSection {
    pub name: String,
    pub anchor: String,
    pub entries: Vec<NotebookEntry>,
}

/// Output directory of one notebook build and the path from it back to the
/// site root.
#[derive(Debug)]
pub struct NotebookOutput {
    dir: PathBuf,
    site_prefix: String,
    copied: usize,
}

impl NotebookOutput {
    pub fn new(site_root: &Path, output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Creating {}", output_dir.display()))?;
        let root = site_root
            .canonicalize()
            .with_context(|| format!("Resolving {}", site_root.display()))?;
        let dir = output_dir
            .canonicalize()
            .with_context(|| format!("Resolving {}", output_dir.display()))?;

        Ok(Self {
            site_prefix: encode_path(&relative_path(&dir, &root)),
            dir,
            copied: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Base path that makes site references resolve from the output
    /// directory: `../..` for `<site>/compilation/output`, empty when the
    /// notebook is written into the site root itself.
    pub fn site_prefix(&self) -> &str {
        &self.site_prefix
    }

    pub fn copied(&self) -> usize {
        self.copied
    }

    /// Copies a site file to `assets/<relative>` unless an up-to-date copy is
    /// already there, and returns its href from the output directory.
    fn copy_asset(&mut self, source: &Path, relative: &str) -> Result<String> {
        let target = self.dir.join("assets").join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).with_context(|| format!("Creating {}", parent.display()))?;
        }

        let modified = |path: &Path| fs::metadata(path).and_then(|meta| meta.modified()).ok();
        let stale = match (modified(&target), modified(source)) {
            (Some(copy), Some(original)) => copy < original,
            _ => true,
        };
        if stale {
            fs::copy(source, &target).with_context(|| {
                format!("Copying {} to {}", source.display(), target.display())
            })?;
            tracing::debug!(source = %source.display(), target = %target.display(), "Copied asset");
        }

        self.copied += 1;
        Ok(format!("assets/{}", encode_path(relative)))
    }
}

/// Builds every manifest entry of the site at `site_root`. References in the
/// entries are relative to `output`.
pub async fn build_notebook(
    site_root: &Path,
    config: &SiteConfig,
    output: &mut NotebookOutput,
) -> Result<Vec<NotebookSection>> {
    let manifest_path = site_root.join(MANIFEST_PATH);
    if !manifest_path.exists() {
        bail!("Manifest not found at {}", manifest_path.display());
    }
    let raw = fs::read_to_string(&manifest_path)
        .with_context(|| format!("Reading {}", manifest_path.display()))?;
    let manifest: Map<String, Value> = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing {}", manifest_path.display()))?;

    let config = SiteConfig {
        base_path: output.site_prefix().to_string(),
        ..config.clone()
    };
    let site = LocalSite::new(site_root, &config);

    let mut sections = Vec::with_capacity(manifest.len());
    for (class, listed) in &manifest {
        let mut metas: Vec<&Map<String, Value>> = listed
            .as_array()
            .map(|entries| entries.iter().filter_map(Value::as_object).collect())
            .unwrap_or_default();
        metas.sort_by_key(|meta| sort_key(meta));

        let mut entries = Vec::with_capacity(metas.len());
        for meta in metas {
            let id = meta
                .get("id")
                .and_then(Value::as_str)
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| anyhow!("Entry in {class} missing 'id'"))?;
            entries.push(load_entry(&site, &config, output, class, id).await?);
        }

        sections.push(NotebookSection {
            name: class.clone(),
            anchor: slugify(class),
            entries,
        });
    }

    tracing::info!(
        sections = sections.len(),
        entries = sections.iter().map(|s| s.entries.len()).sum::<usize>(),
        assets = output.copied(),
        "Built notebook"
    );
    Ok(sections)
}

fn sort_key(meta: &Map<String, Value>) -> String {
    ["date", "id"]
        .iter()
        .filter_map(|key| meta.get(*key).and_then(Value::as_str))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string()
}

async fn load_entry(
    site: &LocalSite,
    config: &SiteConfig,
    output: &mut NotebookOutput,
    class: &str,
    id: &str,
) -> Result<NotebookEntry> {
    let route = Route {
        class: class.to_string(),
        id: id.to_string(),
    };
    let page = fetch_page(site, &route)
        .await
        .with_context(|| format!("Loading entry {class}/{id}"))?;

    let composed = compose(&page, &route, config);
    let mut mounted = MountedPage::mount(&composed);
    let report = hydrate(&mut mounted, &composed.pending, site, std::future::pending()).await;
    if report.failed > 0 {
        tracing::warn!(%class, %id, failed = report.failed, "Some scripts could not be loaded");
    }

    let mut body = mounted.into_html();
    for (href, asset) in local_images(&page, &route, config, site) {
        let relative = strip_base(&href, &config.base_path)
            .map(decode_path)
            .unwrap_or_default();
        let copied = output.copy_asset(&asset, &relative)?;
        body = body.replace(
            &format!(r#"<img src="{href}""#),
            &format!(r#"<img src="{copied}""#),
        );
    }

    let date = page.date.clone();
    let anchor = slugify(&format!(
        "{class}-{}-{}",
        composed.title,
        date.as_deref().unwrap_or(id)
    ));
    Ok(NotebookEntry {
        anchor,
        title: composed.title,
        date,
        body,
    })
}

/// Resolved hrefs of the page's images that exist as files in the site.
fn local_images(
    page: &Page,
    route: &Route,
    config: &SiteConfig,
    site: &LocalSite,
) -> Vec<(String, PathBuf)> {
    let resolver = Resolver::new(config, page, route);
    page.elements
        .iter()
        .filter_map(|element| match element {
            Element::Image(media) => Some(&media.items),
            _ => None,
        })
        .flatten()
        .filter_map(|item| resolver.resolve(item.src.as_deref()?))
        .filter(|href| !is_absolute(href))
        .filter_map(|href| {
            let path = site.path_for(&href)?;
            path.is_file().then_some((href, path))
        })
        .collect()
}

/// `to` as seen from `from`, `/`-separated; empty when they are the same
/// directory.
fn relative_path(from: &Path, to: &Path) -> String {
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = to.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    std::iter::repeat("..".to_string())
        .take(from.len() - common)
        .chain(
            to[common..]
                .iter()
                .map(|part| part.as_os_str().to_string_lossy().into_owned()),
        )
        .collect::<Vec<_>>()
        .join("/")
}

pub fn render_notebook(
    sections: &[NotebookSection],
    config: &SiteConfig,
    assets: &Assets,
) -> Markup {
    let compiled = Local::now().format("%B %-d, %Y").to_string();
    let content = html! {
        section class="notebook-title-page" id="title-page" {
            h1 { (config.site_name) }
            p class="muted" { "Compiled " (compiled) }
        }
        nav class="notebook-toc" id="table-of-contents" {
            h2 { "Table of Contents" }
            ol {
                li { a href="#title-page" { "Title Page" } }
                li { a href="#table-of-contents" { "Table of Contents" } }
                @for section in sections {
                    li {
                        a href={ "#" (section.anchor) } { (section.name) }
                        @if !section.entries.is_empty() {
                            ol {
                                @for entry in &section.entries {
                                    li {
                                        a href={ "#" (entry.anchor) } { (entry.title) }
                                        @if let Some(date) = &entry.date {
                                            " " span class="muted" { "(" (date) ")" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        @for section in sections {
            section class="notebook-section" id=(section.anchor) {
                h2 class="notebook-section-title" { (section.name) }
                @for entry in &section.entries {
                    article class="notebook-entry" id=(entry.anchor) {
                        (PreEscaped(&entry.body))
                    }
                }
            }
        }
    };
    base_layout(&config.site_name, config, assets, content)
}

/// Builds the notebook for `site_root` and writes `notebook.html` into
/// `output_dir`.
pub async fn write_notebook(
    site_root: &Path,
    output_dir: &Path,
    config: &SiteConfig,
) -> Result<PathBuf> {
    let assets = Assets::from_assets_dir(site_root.join("assets"));
    let mut output = NotebookOutput::new(site_root, output_dir)?;
    let sections = build_notebook(site_root, config, &mut output).await?;

    let html_path = output.dir().join("notebook.html");
    let html = render_notebook(&sections, config, &assets).into_string();
    fs::write(&html_path, &html).with_context(|| format!("Writing {}", html_path.display()))?;

    tracing::info!(
        path = %html_path.display(),
        size_kb = format!("{:.1}", html.len() as f64 / 1024.0),
        "Wrote notebook"
    );
    Ok(html_path)
}

pub fn slugify(value: &str) -> String {
    let mut slug = String::new();
    let mut last_dash = false;

    for ch in value.nfkd() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
            continue;
        }
        if unicode_normalization::char::is_combining_mark(ch) {
            continue;
        }
        if !last_dash && !slug.is_empty() {
            slug.push('-');
            last_dash = true;
        }
    }

    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug.to_string()
    }
}
