// crates/server/src/config.rs
//! Server configuration.
//!
//! Precedence, lowest to highest: built-in defaults, environment variables,
//! command-line flags (applied by the binary through [`Config::with_overrides`]).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default port for the server.
pub const DEFAULT_PORT: u16 = 47900;

/// Default upload limit in MiB.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// Built frontend to serve for non-API paths. `None` is API-only mode.
    pub static_dir: Option<PathBuf>,
    /// Request body limit for uploads, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            static_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns.
    ///
    /// - `CHAT_ANALYTICS_PORT`, then `PORT`
    /// - `CHAT_ANALYTICS_HOST`
    /// - `STATIC_DIR`, else `./dist` if it exists
    /// - `CHAT_ANALYTICS_MAX_UPLOAD_MB`
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("CHAT_ANALYTICS_PORT")
            .or_else(|| lookup("PORT"))
            .and_then(|p| parse_or_warn::<u16>("port", &p))
            .unwrap_or(defaults.port);

        let host = lookup("CHAT_ANALYTICS_HOST")
            .and_then(|h| parse_or_warn::<IpAddr>("host", &h))
            .unwrap_or(defaults.host);

        let static_dir = lookup("STATIC_DIR").map(PathBuf::from).or_else(|| {
            let dist = PathBuf::from("dist");
            dist.exists().then_some(dist)
        });

        let max_upload_bytes = lookup("CHAT_ANALYTICS_MAX_UPLOAD_MB")
            .and_then(|mb| parse_or_warn::<usize>("upload limit", &mb))
            .filter(|mb| *mb > 0)
            .map(|mb| mb.saturating_mul(1024 * 1024))
            .unwrap_or(defaults.max_upload_bytes);

        Self {
            host,
            port,
            static_dir,
            max_upload_bytes,
        }
    }

    /// Apply command-line overrides on top of this config.
    pub fn with_overrides(
        mut self,
        host: Option<IpAddr>,
        port: Option<u16>,
        static_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if static_dir.is_some() {
            self.static_dir = static_dir;
        }
        self
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or_warn<T: std::str::FromStr>(what: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(value = raw, "Ignoring invalid {} from environment", what);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 47900);
        assert_eq!(config.addr().to_string(), "127.0.0.1:47900");
        assert_eq!(config.max_upload_bytes, 256 * 1024 * 1024);
    }

    #[test]
    fn test_env_port_precedence() {
        let config = Config::from_lookup(lookup(&[("PORT", "8080"), ("CHAT_ANALYTICS_PORT", "9000")]));
        assert_eq!(config.port, 9000);

        let config = Config::from_lookup(lookup(&[("PORT", "8080")]));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_env_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("CHAT_ANALYTICS_PORT", "not-a-port"),
            ("CHAT_ANALYTICS_HOST", "localhost:80"),
            ("CHAT_ANALYTICS_MAX_UPLOAD_MB", "0"),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_MB * 1024 * 1024);
    }

    #[test]
    fn test_env_host_static_dir_and_limit() {
        let config = Config::from_lookup(lookup(&[
            ("CHAT_ANALYTICS_HOST", "0.0.0.0"),
            ("STATIC_DIR", "/srv/web"),
            ("CHAT_ANALYTICS_MAX_UPLOAD_MB", "16"),
        ]));
        assert_eq!(config.host.to_string(), "0.0.0.0");
        assert_eq!(config.static_dir, Some(PathBuf::from("/srv/web")));
        assert_eq!(config.max_upload_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = Config::from_lookup(lookup(&[("CHAT_ANALYTICS_PORT", "9000")]))
            .with_overrides(None, Some(3000), Some(PathBuf::from("web")));
        assert_eq!(config.port, 3000);
        assert_eq!(config.static_dir, Some(PathBuf::from("web")));
    }
}
