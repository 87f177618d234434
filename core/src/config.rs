//! Client configuration.
//!
//! Settings come from code, or from external sources the same way other IBM
//! Cloud SDKs read them: a credentials file named by `IBM_CREDENTIALS_FILE`
//! holding `KEY=value` lines, overlaid by environment variables. Keys carry
//! the upper-cased service name as a prefix, so the default service reads
//! `CLOUD_DATABASES_URL`.

use std::path::Path;

use tracing::debug;

pub const DEFAULT_SERVICE_NAME: &str = "cloud_databases";
pub const DEFAULT_SERVICE_URL: &str = "https://api.us-south.databases.cloud.ibm.com/v5/ibm";
pub const CREDENTIALS_FILE_ENV: &str = "IBM_CREDENTIALS_FILE";

/// The regional endpoint, e.g. `eu-de` →
/// `https://api.eu-de.databases.cloud.ibm.com/v5/ibm`.
pub fn service_url_for_region(region: &str) -> String {
    format!("https://api.{region}.databases.cloud.ibm.com/v5/ibm")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub service_name: String,
    pub service_url: String,
    /// Sent with every request; operation and caller headers override them.
    pub headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            service_url: DEFAULT_SERVICE_URL.to_string(),
            headers: Vec::new(),
        }
    }
}

impl ClientConfig {
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Load the default service's configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_named(DEFAULT_SERVICE_NAME)
    }

    /// Load configuration for `service_name` from the credentials file and
    /// process environment.
    pub fn from_env_named(service_name: &str) -> Self {
        let file = std::env::var(CREDENTIALS_FILE_ENV)
            .ok()
            .and_then(|path| read_credentials_file(Path::new(&path)));
        Self::from_sources(service_name, file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Resolve configuration from credentials file contents and an
    /// environment lookup. Environment values override file values.
    pub fn from_sources(
        service_name: &str,
        credentials_file: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let prefix = env_prefix(service_name);
        let url_key = format!("{prefix}_URL");

        let mut config = Self {
            service_name: service_name.to_string(),
            ..Self::default()
        };

        if let Some(contents) = credentials_file {
            if let Some(url) = parse_credentials(contents)
                .into_iter()
                .rev()
                .find(|(k, _)| *k == url_key)
                .map(|(_, v)| v)
            {
                config.service_url = url;
            }
        }
        if let Some(url) = env(&url_key).filter(|v| !v.is_empty()) {
            config.service_url = url;
        }

        debug!(service = service_name, url = %config.service_url, "resolved client configuration");
        config
    }
}

fn env_prefix(service_name: &str) -> String {
    service_name.to_ascii_uppercase().replace('-', "_")
}

fn read_credentials_file(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "credentials file not readable");
            None
        }
    }
}

/// `KEY=value` pairs; blank lines and `#` comments are skipped, values may
/// be wrapped in double quotes.
fn parse_credentials(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| {
            let v = v.trim();
            let v = v
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(v);
            (k.trim().to_string(), v.to_string())
        })
        .collect()
}
