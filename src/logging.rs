use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// HTTP client internals are chatty at `info`; quote fetches log their own summary.
const QUIET_DEPENDENCIES: &str = "hyper=warn,reqwest=warn,rustls=warn";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            loki_enabled: std::env::var("LOKI_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            loki_url: std::env::var("LOKI_URL").ok(),
            service_name: std::env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "eiatrack".to_string()),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// `RUST_LOG` plus quieted dependency targets. An unparsable level falls back to `info`.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(format!("{},{}", self.log_level, QUIET_DEPENDENCIES))
            .unwrap_or_else(|_| EnvFilter::new(format!("info,{}", QUIET_DEPENDENCIES)))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.loki_enabled && self.loki_url.is_none() {
            return Err("LOKI_ENABLED is true but LOKI_URL is not set".to_string());
        }
        Ok(())
    }
}

pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    #[cfg(feature = "loki")]
    {
        if config.loki_enabled {
            if let Some(loki_url) = config.loki_url.clone() {
                return init_with_loki(config, &loki_url);
            }
        }
    }

    init_console_only(config)
}

fn init_console_only(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()?;

    tracing::info!(
        "{} ({}) logging to console at level {}",
        config.service_name, config.environment, config.log_level
    );
    Ok(())
}

#[cfg(feature = "loki")]
fn init_with_loki(config: LoggingConfig, loki_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let url = url::Url::parse(loki_url)?;

    let (loki_layer, task) = tracing_loki::builder()
        .label("service", &config.service_name)?
        .label("environment", &config.environment)?
        .build_url(url)?;

    // Ships buffered log lines to Loki; must run on the tokio runtime.
    tokio::spawn(task);

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(loki_layer)
        .try_init()?;

    tracing::info!(
        "{} ({}) shipping logs to Loki at {} with labels service={} environment={}",
        config.service_name, config.environment, loki_url, config.service_name, config.environment
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_url_when_loki_enabled() {
        let config = LoggingConfig {
            loki_enabled: true,
            loki_url: None,
            service_name: "eiatrack".into(),
            environment: "test".into(),
            log_level: "info".into(),
        };
        assert!(config.validate().is_err());

        let config = LoggingConfig { loki_url: Some("http://localhost:3100".into()), ..config };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_filter_quiets_http_client_targets() {
        let config = LoggingConfig {
            loki_enabled: false,
            loki_url: None,
            service_name: "eiatrack".into(),
            environment: "test".into(),
            log_level: "debug".into(),
        };
        let filter = config.env_filter().to_string();
        assert!(filter.contains("debug"));
        assert!(filter.contains("reqwest=warn"));

        let config = LoggingConfig { log_level: "eiatrack=loud".into(), ..config };
        assert!(config.env_filter().to_string().contains("info"));
    }
}
