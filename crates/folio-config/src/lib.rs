//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! Overrides can be applied during load via [`ConfigOverrides`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.github_account`
//! - `site.repository`
//! - `site.branch`
//! - `site.homefile`
//! - `site.docs_folder`
//!
//! Bare `$VAR` is left alone.
//!
//! ## Process-wide configuration
//!
//! The configuration is loaded once and shared read-only through
//! [`init_global`] and [`global`]. Tests reset it with [`reset_global`].

mod global;
mod sections;

use serde::Deserialize;
use std::env::VarError;
use std::path::{Path, PathBuf};

pub use global::{global, init_global, reset_global};
pub use sections::{SectionEntry, SectionMap};

/// Settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    /// Override GitHub account owning the content repository.
    pub github_account: Option<String>,
    /// Override content repository name.
    pub repository: Option<String>,
    /// Override branch to read content from.
    pub branch: Option<String>,
    /// Override the document served for the empty site path.
    pub homefile: Option<String>,
    /// Override the global default template.
    pub default_template: Option<String>,
    /// Override raw HTML pass-through.
    pub allow_scripts: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site and content repository settings.
    pub site: SiteConfig,
    /// Virtual path prefix to repository folder mapping.
    pub sections: SectionMap,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Site and content repository settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// GitHub account owning the content repository.
    #[serde(alias = "githubaccount")]
    pub github_account: String,
    /// Content repository name. Also the first segment of site URLs.
    pub repository: String,
    /// Branch the content is read from.
    pub branch: String,
    /// Optional root folder inside the repository.
    #[serde(alias = "docsfolder")]
    pub docs_folder: Option<String>,
    /// Document served when the site path is empty.
    pub homefile: String,
    /// Template used when neither the page nor its settings name one.
    #[serde(alias = "defaultTemplate")]
    pub default_template: String,
    /// Title used when the page has none.
    #[serde(alias = "defaultTitle")]
    pub default_title: String,
    /// Pass raw HTML in markdown through unescaped.
    #[serde(alias = "allowScripts")]
    pub allow_scripts: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            github_account: String::new(),
            repository: String::new(),
            branch: "main".to_owned(),
            docs_folder: None,
            homefile: "README.md".to_owned(),
            default_template: "default".to_owned(),
            default_title: "My Portfolio".to_owned(),
            allow_scripts: false,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.repository`").
        field: String,
        /// Error message (e.g., "${`FOLIO_REPO`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Reject folder values that climb out of the repository.
fn require_no_parent_segments(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.split('/').any(|segment| segment.trim() == "..") {
        return Err(ConfigError::Validation(format!(
            "{field} cannot contain '..' segments"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional overrides.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// Overrides are applied after loading, allowing callers to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            tracing::debug!("No {CONFIG_FILENAME} found, using defaults");
            Self::default()
        };

        if let Some(overrides) = overrides {
            config.apply_overrides(overrides);
            config.validate()?;
        }

        Ok(config)
    }

    /// Parse configuration from TOML text.
    ///
    /// Expands environment variables and validates the result.
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed, an environment variable is
    /// missing, or validation fails.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides to the configuration.
    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(account) = &overrides.github_account {
            self.site.github_account.clone_from(account);
        }
        if let Some(repository) = &overrides.repository {
            self.site.repository.clone_from(repository);
        }
        if let Some(branch) = &overrides.branch {
            self.site.branch.clone_from(branch);
        }
        if let Some(homefile) = &overrides.homefile {
            self.site.homefile.clone_from(homefile);
        }
        if let Some(template) = &overrides.default_template {
            self.site.default_template.clone_from(template);
        }
        if let Some(allow_scripts) = overrides.allow_scripts {
            self.site.allow_scripts = allow_scripts;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        config.config_path = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_sections()?;
        Ok(())
    }

    /// Validate site configuration.
    fn validate_site(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site.branch, "site.branch")?;
        require_non_empty(&self.site.homefile, "site.homefile")?;
        require_non_empty(&self.site.default_template, "site.default_template")?;

        // Account and repository only make sense together
        if self.site.github_account.is_empty() != self.site.repository.is_empty() {
            return Err(ConfigError::Validation(
                "site.github_account and site.repository must be set together".to_owned(),
            ));
        }

        if let Some(folder) = &self.site.docs_folder {
            require_no_parent_segments(folder, "site.docs_folder")?;
        }

        Ok(())
    }

    /// Validate section map entries.
    fn validate_sections(&self) -> Result<(), ConfigError> {
        for (prefix, entry) in self.sections.iter() {
            let field = format!("sections.\"{prefix}\"");
            require_no_parent_segments(entry.folder(), &field)?;
            if prefix.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "{field} must be a single path segment"
                )));
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let site = &mut self.site;
        for (field, value) in [
            ("site.github_account", &mut site.github_account),
            ("site.repository", &mut site.repository),
            ("site.branch", &mut site.branch),
            ("site.homefile", &mut site.homefile),
        ] {
            expand_in_place(value, field)?;
        }
        if let Some(folder) = site.docs_folder.as_mut() {
            expand_in_place(folder, "site.docs_folder")?;
        }
        Ok(())
    }
}

/// Replace `${VAR}` and `${VAR:-default}` references in `value`.
fn expand_in_place(value: &mut String, field: &str) -> Result<(), ConfigError> {
    if !value.contains("${") {
        return Ok(());
    }

    let expanded = shellexpand::env_with_context(value.as_str(), |var| {
        std::env::var(var).map(Some)
    })
    .map_err(|e| {
        let reason = match e.cause {
            VarError::NotPresent => "not set",
            VarError::NotUnicode(_) => "is not valid unicode",
        };
        ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} {reason}", e.var_name),
        }
    })?;
    *value = expanded.into_owned();
    Ok(())
}
