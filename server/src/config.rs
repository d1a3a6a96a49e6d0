//! Server configuration.

use std::net::{IpAddr, SocketAddr};

use fxquote_fx::{PricerConfig, UpstreamConfig};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Log output format.
    pub log_format: LogFormat,
    /// Pricing configuration.
    pub pricer: PricerConfig,
    /// Upstream rate source configuration.
    pub upstream: UpstreamConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 3000,
            log_format: LogFormat::Text,
            pricer: PricerConfig::default(),
            upstream: UpstreamConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self {
            pricer: PricerConfig::from_env(),
            upstream: UpstreamConfig::from_env(),
            ..Self::default()
        };

        if let Ok(addr) = std::env::var("FXQUOTE_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Ok(port) = std::env::var("FXQUOTE_LISTEN_PORT") {
            if let Ok(port) = port.parse() {
                config.listen_port = port;
            }
        }

        if let Ok(format) = std::env::var("FXQUOTE_LOG_FORMAT") {
            if format.eq_ignore_ascii_case("json") {
                config.log_format = LogFormat::Json;
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }

        if self.listen_addr.parse::<IpAddr>().is_err() {
            return Err(format!("Listen address '{}' is not an IP address", self.listen_addr));
        }

        self.pricer.validate()?;
        self.upstream.validate()?;

        Ok(())
    }

    /// Socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        let ip: IpAddr = self
            .listen_addr
            .parse()
            .map_err(|_| format!("Listen address '{}' is not an IP address", self.listen_addr))?;
        Ok(SocketAddr::new(ip, self.listen_port))
    }
}
