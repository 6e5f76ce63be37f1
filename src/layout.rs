use std::fs;
use std::path::PathBuf;

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::config::SiteConfig;
use crate::hydrate::COPY_SCRIPT;

const EMBEDDED_CSS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/folios.css"));

#[derive(Clone, Debug)]
enum AssetSource {
    Embedded(&'static str),
    File(PathBuf),
}

/// Stylesheet and copy script, either built in or overridden by files in a
/// site's `assets/` directory.
#[derive(Clone, Debug)]
pub struct Assets {
    css_source: AssetSource,
    copy_script_source: AssetSource,
}

impl Default for Assets {
    fn default() -> Self {
        Self::embedded()
    }
}

impl Assets {
    pub fn embedded() -> Self {
        Self {
            css_source: AssetSource::Embedded(EMBEDDED_CSS),
            copy_script_source: AssetSource::Embedded(COPY_SCRIPT),
        }
    }

    pub fn from_assets_dir(dir: PathBuf) -> Self {
        let css_path = dir.join("folios.css");
        let copy_path = dir.join("copy-button.js");

        Self {
            css_source: if css_path.exists() {
                AssetSource::File(css_path)
            } else {
                AssetSource::Embedded(EMBEDDED_CSS)
            },
            copy_script_source: if copy_path.exists() {
                AssetSource::File(copy_path)
            } else {
                AssetSource::Embedded(COPY_SCRIPT)
            },
        }
    }

    pub fn css(&self) -> String {
        Self::read(&self.css_source, EMBEDDED_CSS, "stylesheet")
    }

    pub fn copy_script(&self) -> String {
        Self::read(&self.copy_script_source, COPY_SCRIPT, "copy script")
    }

    fn read(source: &AssetSource, fallback: &'static str, label: &str) -> String {
        match source {
            AssetSource::Embedded(contents) => contents.to_string(),
            AssetSource::File(path) => match fs::read_to_string(path) {
                Ok(contents) => contents,
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "Failed to read {label}; falling back to the embedded version"
                    );
                    fallback.to_string()
                }
            },
        }
    }
}

/// Full HTML document around the mounted root. The copy handler is attached
/// once to `#app` and reads its feedback delay from the root.
pub fn base_layout(
    document_title: &str,
    config: &SiteConfig,
    assets: &Assets,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (document_title) }
                style { (PreEscaped(assets.css())) }
            }
            body {
                header class="site-header" {
                    div class="container" {
                        span class="brand-name" { (config.site_name) }
                    }
                }
                main id="app" class="container" data-copy-feedback-ms=(config.copy_feedback_ms) {
                    (content)
                }
                script { (PreEscaped(assets.copy_script())) }
            }
        }
    }
}

pub fn error_card(message: &str) -> Markup {
    html! {
        div class="card error-card" role="alert" {
            h2 { "Unable to load page" }
            p class="error-message" { (message) }
        }
    }
}

/// Failure page: the root holds the error card and nothing else.
pub fn render_error(message: &str, config: &SiteConfig, assets: &Assets) -> Markup {
    let document_title = config.document_title_for("Error");
    base_layout(&document_title, config, assets, error_card(message))
}
