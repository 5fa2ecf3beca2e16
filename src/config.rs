use crate::core::{Sanitizer, SourceParams};
use crate::models::{FieldLimits, FilterWindow};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// Which review source implementation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Http,
    Demo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
    #[serde(default)]
    pub kind: SourceKind,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            endpoint: default_endpoint(),
            language: default_language(),
            region: default_region(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String { "http://localhost:3000".to_string() }
fn default_language() -> String { "ru".to_string() }
fn default_region() -> String { "ru".to_string() }
fn default_page_size() -> u32 { 100 }
fn default_max_pages() -> u32 { 10 }
fn default_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,
    #[serde(default = "default_max_count")]
    pub max_count: usize,
    /// Upper bound for per-request `limit` overrides
    #[serde(default = "default_max_count_limit")]
    pub max_count_limit: usize,
    #[serde(default = "default_author_max_len")]
    pub author_max_len: usize,
    #[serde(default = "default_title_max_len")]
    pub title_max_len: usize,
    #[serde(default = "default_body_max_len")]
    pub body_max_len: usize,
    #[serde(default = "default_missing_author")]
    pub missing_author: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            max_age_days: default_max_age_days(),
            max_count: default_max_count(),
            max_count_limit: default_max_count_limit(),
            author_max_len: default_author_max_len(),
            title_max_len: default_title_max_len(),
            body_max_len: default_body_max_len(),
            missing_author: default_missing_author(),
        }
    }
}

fn default_max_age_days() -> u32 { 365 }
fn default_max_count() -> usize { 100 }
fn default_max_count_limit() -> usize { 1000 }
fn default_author_max_len() -> usize { 100 }
fn default_title_max_len() -> usize { 200 }
fn default_body_max_len() -> usize { 2000 }
fn default_missing_author() -> String { "N/A".to_string() }

impl ExportSettings {
    pub fn window(&self) -> FilterWindow {
        FilterWindow::new(self.max_age_days, self.max_count.min(self.max_count_limit))
    }

    pub fn field_limits(&self) -> FieldLimits {
        FieldLimits {
            author: self.author_max_len,
            title: self.title_max_len,
            body: self.body_max_len,
            missing_author: self.missing_author.clone(),
        }
    }
}

impl SourceSettings {
    pub fn params(&self) -> SourceParams {
        SourceParams {
            language: self.language.clone(),
            region: self.region.clone(),
            page_size: self.page_size.max(1),
            max_pages: self.max_pages.max(1),
        }
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with REVIEWS_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., REVIEWS__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("REVIEWS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_platform_port(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("REVIEWS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Sanitizer configured with the export field bounds
    pub fn sanitizer(&self) -> Sanitizer {
        Sanitizer::new(self.export.field_limits())
    }
}

/// Hosting platforms hand the listen port over as a bare `PORT` variable
fn apply_platform_port(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
        Some(port) => Config::builder()
            .add_source(settings)
            .set_override("server.port", i64::from(port))?
            .build(),
        None => Ok(settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.source.kind, SourceKind::Http);
        assert_eq!(settings.export.window(), FilterWindow::new(365, 100));
        assert_eq!(settings.export.field_limits(), FieldLimits::default());
    }

    #[test]
    fn test_window_clamped_to_limit() {
        let export = ExportSettings {
            max_count: 5000,
            max_count_limit: 1000,
            ..Default::default()
        };
        assert_eq!(export.window().max_count, 1000);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("review_export_settings_test.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[source]\nkind = \"demo\"\nlanguage = \"en\"\n\n[export]\nmax_age_days = 30\nbody_max_len = 500"
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.source.kind, SourceKind::Demo);
        assert_eq!(settings.source.language, "en");
        assert_eq!(settings.source.region, "ru");
        assert_eq!(settings.export.max_age_days, 30);
        assert_eq!(settings.export.field_limits().body, 500);
        assert_eq!(settings.server.port, 8080);

        std::fs::remove_file(&path).ok();
    }
}
