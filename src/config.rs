use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::github::{parse_github_repo, GithubRepo};

pub const CONFIG_FILE_NAME: &str = "folios.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    #[serde(alias = "base_path")]
    pub base_path: String,
    pub repository: Option<String>,
    #[serde(alias = "repo_owner")]
    pub repo_owner: Option<String>,
    #[serde(alias = "repo_name")]
    pub repo_name: Option<String>,
    pub branch: String,
    #[serde(alias = "allowed_classes")]
    pub allowed_classes: Vec<String>,
    #[serde(alias = "pdf_zoom_level")]
    pub pdf_zoom_level: String,
    #[serde(alias = "document_title")]
    pub document_title: String,
    #[serde(alias = "site_name")]
    pub site_name: String,
    #[serde(alias = "copy_feedback_ms")]
    pub copy_feedback_ms: u64,
    #[serde(alias = "raw_content_base")]
    pub raw_content_base: String,
    /// Upper bound for one raw-content request, in seconds.
    #[serde(alias = "fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            repository: None,
            repo_owner: None,
            repo_name: None,
            branch: "main".to_string(),
            allowed_classes: Vec::new(),
            pdf_zoom_level: "page-width".to_string(),
            document_title: "{title} | Engineering Notebook".to_string(),
            site_name: "Engineering Notebook".to_string(),
            copy_feedback_ms: 1200,
            raw_content_base: "https://raw.githubusercontent.com".to_string(),
            fetch_timeout_secs: 30,
        }
    }
}

impl SiteConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Explicit owner/name win over the `repository` string.
    pub fn repo(&self) -> Option<GithubRepo> {
        match (&self.repo_owner, &self.repo_name) {
            (Some(owner), Some(name)) if !owner.trim().is_empty() && !name.trim().is_empty() => {
                Some(GithubRepo {
                    owner: owner.trim().to_string(),
                    name: name.trim().to_string(),
                })
            }
            _ => self.repository.as_deref().and_then(parse_github_repo),
        }
    }

    /// An empty allow-list admits every class.
    pub fn class_allowed(&self, class: &str) -> bool {
        self.allowed_classes.is_empty()
            || self
                .allowed_classes
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(class))
    }

    pub fn document_title_for(&self, title: &str) -> String {
        self.document_title.replace("{title}", title)
    }

    pub fn apply_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_path) = lookup("FOLIOS_BASE_PATH") {
            let trimmed = base_path.trim();
            if !trimmed.is_empty() {
                self.base_path = trimmed.to_string();
            }
        }

        if let Some(repository) = lookup("GITHUB_REPOSITORY") {
            if parse_github_repo(&repository).is_some() {
                self.repository = Some(repository.trim().to_string());
                self.repo_owner = None;
                self.repo_name = None;
            }
        }

        self
    }
}

/// Reads `folios.toml` from `override_path` or the site root. Missing or
/// broken files fall back to the defaults.
pub fn load_site_configuration(
    site_root: Option<&Path>,
    override_path: Option<&Path>,
) -> SiteConfig {
    let config_path = override_path.map(|p| p.to_path_buf()).or_else(|| {
        let default = site_root?.join(CONFIG_FILE_NAME);
        default.exists().then_some(default)
    });

    let config = match config_path {
        None => SiteConfig::default(),
        Some(path) => match fs::read_to_string(&path) {
            Ok(raw) => match SiteConfig::from_toml_str(&raw) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Failed to parse site configuration");
                    SiteConfig::default()
                }
            },
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to read site configuration");
                SiteConfig::default()
            }
        },
    };

    config.apply_env_overrides(|key| std::env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn parses_camel_and_snake_case_keys() {
        let config = SiteConfig::from_toml_str(
            r#"
basePath = "/notebook/"
repository = "https://github.com/team5840/notebook.git"
allowed_classes = ["August", "October"]
pdfZoomLevel = "125"
"#,
        )
        .expect("config parses");

        assert_eq!(config.base_path, "/notebook/");
        assert_eq!(config.pdf_zoom_level, "125");
        assert_eq!(config.branch, "main");
        assert_eq!(config.copy_feedback_ms, 1200);
        let repo = config.repo().expect("repository parses");
        assert_eq!(repo.owner, "team5840");
        assert_eq!(repo.name, "notebook");
    }

    #[test]
    fn explicit_owner_and_name_override_repository() {
        let config = SiteConfig {
            repository: Some("a/b".into()),
            repo_owner: Some("c".into()),
            repo_name: Some("d".into()),
            ..SiteConfig::default()
        };
        let repo = config.repo().expect("repo");
        assert_eq!((repo.owner.as_str(), repo.name.as_str()), ("c", "d"));
    }

    #[test]
    fn allow_list_is_case_insensitive_and_optional() {
        let open = SiteConfig::default();
        assert!(open.class_allowed("anything"));

        let restricted = SiteConfig {
            allowed_classes: vec!["August".into()],
            ..SiteConfig::default()
        };
        assert!(restricted.class_allowed("august"));
        assert!(!restricted.class_allowed("September"));
    }

    #[test]
    fn env_overrides_apply_only_valid_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("FOLIOS_BASE_PATH", "/preview"),
            ("GITHUB_REPOSITORY", "owner/site"),
        ]);
        let config = SiteConfig::default()
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.base_path, "/preview");
        assert_eq!(config.repo().expect("repo").name, "site");

        let untouched = SiteConfig::default()
            .apply_env_overrides(|key| {
                (key == "GITHUB_REPOSITORY").then(|| "nonsense".to_string())
            });
        assert_eq!(untouched.repository, None);
    }

    #[test]
    fn broken_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "basePath = [").expect("write config");
        let config = load_site_configuration(Some(dir.path()), None);
        assert_eq!(config.branch, "main");
        assert_eq!(config.pdf_zoom_level, "page-width");
    }

    #[test]
    fn document_title_uses_template() {
        let config = SiteConfig::default();
        assert_eq!(config.document_title_for("Gearbox"), "Gearbox | Engineering Notebook");
    }
}
