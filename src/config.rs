use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::models::ReportBranding;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Yahoo,
    Fixture,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(ProviderKind::Yahoo),
            "fixture" => Ok(ProviderKind::Fixture),
            other => Err(format!(
                "Invalid PRICE_PROVIDER: {}. Must be 'yahoo' or 'fixture'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub provider: ProviderKind,
    pub fixture_dir: PathBuf,
    pub provider_timeout: Duration,
    pub catalog_path: Option<PathBuf>,
    pub branding: ReportBranding,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            host: env_or("HOST", "127.0.0.1"),
            port: env_parse("PORT", 5050),
            provider: env_or("PRICE_PROVIDER", "yahoo").parse()?,
            fixture_dir: PathBuf::from(env_or("PRICE_FIXTURE_DIR", "fixtures/prices")),
            provider_timeout: Duration::from_secs(env_parse("PROVIDER_TIMEOUT_SECS", 15)),
            catalog_path: std::env::var("PRODUCT_CATALOG_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            branding: ReportBranding {
                firm_name: env_or("FIRM_NAME", "Georgia Financial Advisors"),
                firm_address: env_or(
                    "FIRM_ADDRESS",
                    "6001 Chatham Center Dr, Suite 140, Savannah, GA 31405",
                ),
                file_prefix: env_or("REPORT_FILE_PREFIX", "GFA_Annuity_Report"),
            },
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid HOST/PORT {}:{}: {}", self.host, self.port, e))
    }
}
