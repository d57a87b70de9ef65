//! Package specifications and version resolution

use gotools_config::PackageConfig;
use gotools_errors::{Error, VersionError};
use gotools_events::{AppEvent, EventEmitter, EventSender, PackageEvent};
use gotools_net::NetClient;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Versions that leave the checkout at whatever `go get` fetched
pub const UNPINNED_VERSIONS: [&str; 3] = ["", "master", "HEAD"];

/// Whether `version` leaves the checkout unpinned
#[must_use]
pub fn is_unpinned(version: &str) -> bool {
    UNPINNED_VERSIONS.contains(&version)
}

/// One package to install
///
/// Clones share the memoized version, so the version source is consulted at
/// most once per run no matter how many clones ask.
#[derive(Debug, Clone)]
pub struct PackageSpec {
    name: String,
    single: bool,
    version: Option<String>,
    version_url: Option<String>,
    resolved: Arc<OnceCell<String>>,
}

impl PackageSpec {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            single: false,
            version: None,
            version_url: None,
            resolved: Arc::new(OnceCell::new()),
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
    pub fn single(mut self, single: bool) -> Self {
        self.single = single;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_single(&self) -> bool {
        self.single
    }

    #[must_use]
    pub fn version_url(&self) -> Option<&str> {
        self.version_url.as_deref()
    }

    /// The version if it has already been resolved
    #[must_use]
    pub fn cached_version(&self) -> Option<&str> {
        self.resolved.get().map(String::as_str)
    }

    /// Best known version for reporting: resolved, literal or empty
    #[must_use]
    pub fn display_version(&self) -> &str {
        self.cached_version()
            .or(self.literal_version())
            .unwrap_or_default()
    }

    fn literal_version(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.is_empty())
    }

    /// Resolve the version to pin to
    ///
    /// A non-empty literal version wins, then the trimmed body of
    /// `version_url`, then the empty string. The first successful result is
    /// kept for the lifetime of this spec and its clones.
    ///
    /// # Errors
    ///
    /// Returns an error if `version_url` cannot be fetched or yields an empty
    /// body.
    pub async fn resolved_version(
        &self,
        client: &NetClient,
        tx: &EventSender,
    ) -> Result<&str, Error> {
        let version = self
            .resolved
            .get_or_try_init(|| self.resolve(client, tx))
            .await?;
        Ok(version.as_str())
    }

    async fn resolve(&self, client: &NetClient, tx: &EventSender) -> Result<String, Error> {
        if let Some(version) = self.literal_version() {
            return Ok(version.to_string());
        }

        let Some(url) = self.version_url.as_deref().filter(|u| !u.is_empty()) else {
            return Ok(String::new());
        };

        let body = gotools_net::fetch_text(client, url, tx)
            .await
            .map_err(|e| VersionError::ResolutionFailed {
                package: self.name.clone(),
                source_url: url.to_string(),
                message: e.to_string(),
            })?;

        let version = body.trim();
        if version.is_empty() {
            return Err(VersionError::EmptyVersion {
                package: self.name.clone(),
                source_url: url.to_string(),
            }
            .into());
        }

        tx.emit(AppEvent::Package(PackageEvent::VersionResolved {
            package: self.name.clone(),
            version: version.to_string(),
            source_url: url.to_string(),
        }));

        Ok(version.to_string())
    }
}

impl From<&PackageConfig> for PackageSpec {
    fn from(config: &PackageConfig) -> Self {
        let mut spec = Self::new(config.name.clone()).single(config.single);
        spec.version = config.version.clone();
        spec.version_url = config.version_url.clone();
        spec
    }
}
