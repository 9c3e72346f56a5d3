//! Connection-string parsing
//!
//! A DSN names the backend through its scheme, the target database through
//! its host and path, and carries driver options as query parameters:
//!
//! ```text
//! duckdb:///var/lib/app/app.duckdb?x-multi-statement=true&x-migrations-table=versions
//! ```
//!
//! Driver options (and any other `x-` parameter) are consumed here; whatever
//! remains is left on the URL for the backend.

use crate::config::DriverConfig;
use crate::error::{CoreError, CoreResult};
use url::Url;

/// A parsed connection string with driver options split out.
#[derive(Debug, Clone)]
pub struct ConnectionString {
    url: Url,
    config: DriverConfig,
}

impl ConnectionString {
    /// Parse a DSN on top of the default configuration.
    pub fn parse(dsn: &str) -> CoreResult<Self> {
        Self::parse_with(dsn, DriverConfig::default())
    }

    /// Parse a DSN, letting its query parameters override `base`.
    pub fn parse_with(dsn: &str, base: DriverConfig) -> CoreResult<Self> {
        let mut url = Url::parse(dsn).map_err(|e| CoreError::InvalidDsn {
            message: format!("{e}: {dsn}"),
        })?;

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let mut config = base;
        let mut passthrough = Vec::with_capacity(pairs.len());

        for (key, value) in pairs {
            if config.apply_option(&key, &value)? {
                continue;
            }
            if key.starts_with("x-") {
                log::debug!("Ignoring unrecognized driver option '{key}'");
                continue;
            }
            passthrough.push((key, value));
        }

        if passthrough.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(&passthrough);
        }

        Ok(Self { url, config })
    }

    /// Backend scheme, e.g. `duckdb`.
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// The URL with all driver options removed.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Host and path joined, which is how file-backed engines locate the database.
    ///
    /// `duckdb:///data/app.duckdb` gives `/data/app.duckdb`; `duckdb://memory`
    /// gives `memory`; `duckdb://` gives an empty string. Paths are used as
    /// written, without percent-decoding.
    pub fn location(&self) -> String {
        let host = self.url.host_str().unwrap_or("");
        format!("{}{}", host, self.url.path())
    }

    /// Driver configuration collected from the query string (not normalized).
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Consume the connection string, keeping only its configuration.
    pub fn into_config(self) -> DriverConfig {
        self.config
    }

    /// The URL with any password masked, for log output.
    pub fn redacted(&self) -> String {
        let mut url = self.url.clone();
        if url.password().is_some() {
            let _ = url.set_password(Some("xxxxx"));
        }
        url.to_string()
    }
}

#[cfg(test)]
#[path = "dsn_test.rs"]
mod tests;
