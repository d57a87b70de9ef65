#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for update-gotools
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/gotools.yml, YAML or TOML)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod constants;
pub mod paths;

use serde::{Deserialize, Serialize};
use gotools_errors::{ConfigError, Error};
use std::path::{Path, PathBuf};
use tokio::fs;

pub use paths::expand_home;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Working directory for hook commands and `go get` / `go install`.
    /// Empty means the user's home directory.
    #[serde(default)]
    pub cwd: PathBuf,

    /// Install root, exported as `GOPATH` to every command.
    #[serde(default)]
    pub gopath: PathBuf,

    /// Capacity of the parallel build phase (0 = auto-detect)
    #[serde(default)]
    pub jobs: usize,

    #[serde(default = "default_go_binary")]
    pub go_binary: String,

    #[serde(default = "default_git_binary")]
    pub git_binary: String,

    #[serde(default)]
    pub packages: Vec<PackageConfig>,

    #[serde(default)]
    pub pre_commands: Vec<Vec<String>>,

    #[serde(default)]
    pub post_commands: Vec<Vec<String>>,
}

/// One package entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageConfig {
    pub name: String,

    /// Build this package alone, after every parallel package finished
    #[serde(default)]
    pub single: bool,

    /// Literal git reference to pin to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// URL whose response body is the git reference to pin to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_url: Option<String>,
}

impl PackageConfig {
    /// Create a package entry without a pinned version
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            single: false,
            version: None,
            version_url: None,
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_version_url(mut self, url: impl Into<String>) -> Self {
        self.version_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: PathBuf::new(),
            gopath: PathBuf::new(),
            jobs: 0, // 0 = auto-detect
            go_binary: default_go_binary(),
            git_binary: default_git_binary(),
            packages: Vec::new(),
            pre_commands: Vec::new(),
            post_commands: Vec::new(),
        }
    }
}

fn default_go_binary() -> String {
    constants::DEFAULT_GO_BINARY.to_string()
}

fn default_git_binary() -> String {
    constants::DEFAULT_GIT_BINARY.to_string()
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        expand_home(Path::new(constants::DEFAULT_CONFIG_FILE))
    }

    /// Parse configuration from a string, picking the format from `path`
    ///
    /// Files ending in `.toml` are parsed as TOML, everything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the contents cannot be parsed.
    pub fn from_str_for_path(contents: &str, path: &Path) -> Result<Self, Error> {
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let config: Self = if is_toml {
            toml::from_str(contents)?
        } else if contents.trim().is_empty() {
            // An empty YAML document deserializes to unit, not to a mapping.
            Self::default()
        } else {
            serde_yaml::from_str(contents)?
        };
        Ok(config)
    }

    /// Load configuration from file, expand paths and validate it
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, cannot be parsed, or
    /// fails validation.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.display().to_string(),
                }
                .into()
            } else {
                Error::io_with_path(&e, path)
            }
        })?;

        let mut config = Self::from_str_for_path(&contents, path)?;
        config.resolve_paths()?;
        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            packages = config.packages.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Load configuration from an optional path or use the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(&expand_home(config_path)?).await,
            None => Self::load_from_file(&Self::default_path()?).await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(cwd) = std::env::var(constants::ENV_CWD) {
            self.cwd = expand_home(Path::new(&cwd))?;
        }

        if let Ok(gopath) = std::env::var(constants::ENV_GOPATH) {
            self.gopath = expand_home(Path::new(&gopath))?;
        }

        if let Ok(jobs) = std::env::var(constants::ENV_JOBS) {
            self.jobs = jobs.parse().map_err(|_| ConfigError::InvalidValue {
                field: constants::ENV_JOBS.to_string(),
                value: jobs,
            })?;
        }

        Ok(())
    }

    /// Expand `~` in configured paths and fill in directory defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory is needed but unknown.
    pub fn resolve_paths(&mut self) -> Result<(), Error> {
        self.cwd = if self.cwd.as_os_str().is_empty() {
            paths::home_dir()?
        } else {
            expand_home(&self.cwd)?
        };

        self.gopath = if self.gopath.as_os_str().is_empty() {
            expand_home(Path::new(constants::DEFAULT_GOPATH))?
        } else {
            expand_home(&self.gopath)?
        };

        Ok(())
    }

    /// Check invariants the rest of the tool relies on
    ///
    /// # Errors
    ///
    /// Returns an error on empty package names, duplicate packages or
    /// commands without a program.
    pub fn validate(&self) -> Result<(), Error> {
        let mut seen = std::collections::HashSet::new();
        for (index, package) in self.packages.iter().enumerate() {
            if package.name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    message: format!("package #{index} has an empty name"),
                }
                .into());
            }
            if !seen.insert(package.name.as_str()) {
                return Err(ConfigError::Invalid {
                    message: format!("package {} is listed more than once", package.name),
                }
                .into());
            }
            if package.version.is_some() && package.version_url.is_some() {
                tracing::warn!(
                    pkg = %package.name,
                    "both version and version_url set, the literal version wins"
                );
            }
        }

        for (step, commands) in [
            ("pre_commands", &self.pre_commands),
            ("post_commands", &self.post_commands),
        ] {
            for (index, command) in commands.iter().enumerate() {
                if command.first().is_none_or(|program| program.trim().is_empty()) {
                    return Err(ConfigError::Invalid {
                        message: format!("{step} #{index} has no program to run"),
                    }
                    .into());
                }
            }
        }

        if self.go_binary.trim().is_empty() || self.git_binary.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "go_binary and git_binary must not be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Packages that run in the parallel phase, in configuration order
    pub fn parallel_packages(&self) -> impl Iterator<Item = &PackageConfig> {
        self.packages.iter().filter(|p| !p.single)
    }

    /// Packages that run in the single phase, in configuration order
    pub fn single_packages(&self) -> impl Iterator<Item = &PackageConfig> {
        self.packages.iter().filter(|p| p.single)
    }

    /// Source checkout directory of a package below the install root
    #[must_use]
    pub fn package_source_dir(&self, package: &str) -> PathBuf {
        self.gopath.join("src").join(package)
    }
}
