pub mod analytics;
pub mod client;
pub mod domain;

pub mod config {
    use anyhow::Context;
    use std::net::{IpAddr, SocketAddr};
    use std::time::Duration;

    pub const DEFAULT_ANALYTICS_HOST: &str = "127.0.0.1";
    pub const DEFAULT_ANALYTICS_PORT: u16 = 5001;
    pub const DEFAULT_GATEWAY_HOST: &str = "127.0.0.1";
    pub const DEFAULT_GATEWAY_PORT: u16 = 5000;
    pub const DEFAULT_ANALYTICS_BASE_URL: &str = "http://127.0.0.1:5001";
    pub const DEFAULT_ANALYTICS_TIMEOUT_SECS: u64 = 10;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub analytics_host: Option<String>,
        pub analytics_port: Option<String>,
        pub gateway_host: Option<String>,
        pub gateway_port: Option<String>,
        pub analytics_base_url: Option<String>,
        pub analytics_timeout_secs: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                analytics_host: std::env::var("ANALYTICS_HOST").ok(),
                analytics_port: std::env::var("ANALYTICS_PORT").ok(),
                gateway_host: std::env::var("GATEWAY_HOST").ok(),
                gateway_port: std::env::var("PORT").ok(),
                analytics_base_url: std::env::var("ANALYTICS_BASE_URL").ok(),
                analytics_timeout_secs: std::env::var("ANALYTICS_TIMEOUT_SECS").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn analytics_addr(&self) -> anyhow::Result<SocketAddr> {
            socket_addr(
                self.analytics_host.as_deref(),
                DEFAULT_ANALYTICS_HOST,
                self.analytics_port.as_deref(),
                DEFAULT_ANALYTICS_PORT,
            )
            .context("invalid ANALYTICS_HOST/ANALYTICS_PORT")
        }

        pub fn gateway_addr(&self) -> anyhow::Result<SocketAddr> {
            socket_addr(
                self.gateway_host.as_deref(),
                DEFAULT_GATEWAY_HOST,
                self.gateway_port.as_deref(),
                DEFAULT_GATEWAY_PORT,
            )
            .context("invalid GATEWAY_HOST/PORT")
        }

        pub fn analytics_base_url(&self) -> &str {
            self.analytics_base_url
                .as_deref()
                .unwrap_or(DEFAULT_ANALYTICS_BASE_URL)
        }

        pub fn analytics_timeout(&self) -> anyhow::Result<Duration> {
            let secs = match self.analytics_timeout_secs.as_deref().map(str::trim) {
                Some(s) => s
                    .parse::<u64>()
                    .with_context(|| format!("invalid ANALYTICS_TIMEOUT_SECS: {s}"))?,
                None => DEFAULT_ANALYTICS_TIMEOUT_SECS,
            };
            anyhow::ensure!(secs > 0, "ANALYTICS_TIMEOUT_SECS must be positive");
            Ok(Duration::from_secs(secs))
        }
    }

    fn socket_addr(
        host: Option<&str>,
        default_host: &str,
        port: Option<&str>,
        default_port: u16,
    ) -> anyhow::Result<SocketAddr> {
        let host = host.map(str::trim).unwrap_or(default_host);
        let ip: IpAddr = host
            .parse()
            .with_context(|| format!("host is not an IP address: {host}"))?;
        let port = match port.map(str::trim) {
            Some(p) => p
                .parse::<u16>()
                .with_context(|| format!("port is not a valid u16: {p}"))?,
            None => default_port,
        };
        Ok(SocketAddr::new(ip, port))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn defaults_to_loopback_ports() {
            let settings = Settings::default();
            assert_eq!(
                settings.analytics_addr().unwrap(),
                "127.0.0.1:5001".parse::<SocketAddr>().unwrap()
            );
            assert_eq!(
                settings.gateway_addr().unwrap(),
                "127.0.0.1:5000".parse::<SocketAddr>().unwrap()
            );
            assert_eq!(settings.analytics_base_url(), "http://127.0.0.1:5001");
            assert_eq!(settings.analytics_timeout().unwrap(), Duration::from_secs(10));
        }

        #[test]
        fn timeout_override_is_validated() {
            let settings = Settings {
                analytics_timeout_secs: Some("30".into()),
                ..Default::default()
            };
            assert_eq!(settings.analytics_timeout().unwrap(), Duration::from_secs(30));

            for bad in ["soon", "-1", "0"] {
                let settings = Settings {
                    analytics_timeout_secs: Some(bad.into()),
                    ..Default::default()
                };
                assert!(settings.analytics_timeout().is_err(), "value={bad}");
            }
        }

        #[test]
        fn overrides_are_applied() {
            let settings = Settings {
                analytics_host: Some("0.0.0.0".into()),
                analytics_port: Some(" 8081 ".into()),
                analytics_base_url: Some("http://analytics:8081".into()),
                ..Default::default()
            };
            assert_eq!(
                settings.analytics_addr().unwrap(),
                "0.0.0.0:8081".parse::<SocketAddr>().unwrap()
            );
            assert_eq!(settings.analytics_base_url(), "http://analytics:8081");
        }

        #[test]
        fn rejects_bad_port() {
            let settings = Settings {
                gateway_port: Some("http".into()),
                ..Default::default()
            };
            assert!(settings.gateway_addr().is_err());
        }

        #[test]
        fn rejects_hostname() {
            let settings = Settings {
                analytics_host: Some("localhost".into()),
                ..Default::default()
            };
            assert!(settings.analytics_addr().is_err());
        }
    }
}
