use crate::domain::numbering::DEFAULT_INSTITUTION_CODE;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "surat.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub institution: InstitutionConfig,
    #[serde(default)]
    pub app: UiConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstitutionConfig {
    /// Institution code and organisation abbreviation, e.g. `071073/LPM`.
    #[serde(default = "default_institution_code")]
    pub code: String,
    #[serde(default = "default_app_name")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,
    #[serde(default = "default_min_search_chars")]
    pub min_search_chars: usize,
    #[serde(default = "default_recent_limit")]
    pub recent_recipient_limit: u32,
    #[serde(default = "default_search_limit")]
    pub search_recipient_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_session_dir")]
    pub session_dir: String,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_institution_code() -> String {
    DEFAULT_INSTITUTION_CODE.to_string()
}

fn default_app_name() -> String {
    "Aplikasi Surat LPM UNIROW".to_string()
}

fn default_items_per_page() -> u32 {
    20
}

fn default_min_search_chars() -> usize {
    2
}

fn default_recent_limit() -> u32 {
    5
}

fn default_search_limit() -> u32 {
    10
}

fn default_session_dir() -> String {
    ".surat".to_string()
}

fn default_export_dir() -> String {
    ".".to_string()
}

impl Default for InstitutionConfig {
    fn default() -> Self {
        Self {
            code: default_institution_code(),
            name: default_app_name(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            items_per_page: default_items_per_page(),
            min_search_chars: default_min_search_chars(),
            recent_recipient_limit: default_recent_limit(),
            search_recipient_limit: default_search_limit(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            session_dir: default_session_dir(),
            export_dir: default_export_dir(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Builds a configuration from `SURAT_*` environment variables alone.
    pub fn from_env() -> Result<Self> {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let url = var("SURAT_BACKEND_URL").ok_or_else(|| AppError::MissingConfigError {
            field: "SURAT_BACKEND_URL".to_string(),
        })?;
        let anon_key = var("SURAT_ANON_KEY").ok_or_else(|| AppError::MissingConfigError {
            field: "SURAT_ANON_KEY".to_string(),
        })?;

        let mut config = Self {
            backend: BackendConfig {
                url,
                anon_key,
                timeout_seconds: default_timeout_seconds(),
            },
            institution: InstitutionConfig::default(),
            app: UiConfig::default(),
            paths: PathsConfig::default(),
        };

        if let Some(code) = var("SURAT_INSTITUTION_CODE") {
            config.institution.code = code;
        }
        if let Some(dir) = var("SURAT_SESSION_DIR") {
            config.paths.session_dir = dir;
        }
        if let Some(dir) = var("SURAT_EXPORT_DIR") {
            config.paths.export_dir = dir;
        }

        Ok(config)
    }

    /// Explicit path first, then `./surat.toml`, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                Self::from_file(path)
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::info!("📁 Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => {
                tracing::debug!("No {} found, reading SURAT_* environment", DEFAULT_CONFIG_FILE);
                Self::from_env()
            }
        }
    }

    /// Replaces `${VAR}` placeholders (e.g. `${SURAT_ANON_KEY}`) from the environment.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("backend.url", &self.backend.url)?;
        validation::validate_non_empty_string("backend.anon_key", &self.backend.anon_key)?;
        validation::validate_unsubstituted("backend.anon_key", &self.backend.anon_key)?;
        validation::validate_range("backend.timeout_seconds", self.backend.timeout_seconds, 1, 300)?;

        validation::validate_institution_code("institution.code", &self.institution.code)?;

        validation::validate_range("app.items_per_page", self.app.items_per_page, 1, 1000)?;
        validation::validate_positive_number("app.min_search_chars", self.app.min_search_chars, 1)?;
        validation::validate_range(
            "app.recent_recipient_limit",
            self.app.recent_recipient_limit,
            1,
            100,
        )?;
        validation::validate_range(
            "app.search_recipient_limit",
            self.app.search_recipient_limit,
            1,
            100,
        )?;

        validation::validate_path("paths.session_dir", &self.paths.session_dir)?;
        validation::validate_path("paths.export_dir", &self.paths.export_dir)?;

        Ok(())
    }

    pub fn session_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.session_dir)
    }

    pub fn export_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.export_dir)
    }
}

impl ConfigProvider for AppConfig {
    fn backend_url(&self) -> &str {
        &self.backend.url
    }

    fn anon_key(&self) -> &str {
        &self.backend.anon_key
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_seconds)
    }

    fn institution_code(&self) -> &str {
        &self.institution.code
    }

    fn items_per_page(&self) -> u32 {
        self.app.items_per_page
    }

    fn min_search_chars(&self) -> usize {
        self.app.min_search_chars
    }

    fn recent_recipient_limit(&self) -> u32 {
        self.app.recent_recipient_limit
    }

    fn search_recipient_limit(&self) -> u32 {
        self.app.search_recipient_limit
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
