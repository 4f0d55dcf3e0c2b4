use clap::Parser;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:6465";

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\n\nSupported weather providers:\n",
    "- OpenWeatherMap (WEX_OW_COORDS, WEX_OW_APIKEY)\n",
    "- Open-Meteo (WEX_OMET_COORDS, no API key required)\n",
    "- Tomorrow.io (WEX_TIO_COORDS, WEX_TIO_APIKEY)\n",
    "- WeatherAPI.com (WEX_WAPI_COORDS, WEX_WAPI_APIKEY)\n"
);

/// Exporter configuration. Every option can also be given through its
/// `WEX_*` environment variable. Coordinate lists are `lat,lon` pairs
/// separated by `;`.
#[derive(Parser, Debug, Clone)]
#[command(version, long_version = LONG_VERSION, about = "Prometheus exporter for current weather conditions", long_about = None)]
pub struct Config {
    #[arg(long, env = "WEX_BIND_ADDR", default_value = DEFAULT_BIND_ADDR, help = "Address to serve /metrics on")]
    pub bind_addr: String,

    #[arg(
        long,
        env = "WEX_CACHE_TTL",
        default_value = "5m",
        value_parser = humantime::parse_duration,
        help = "How long upstream responses are reused (0s disables caching)"
    )]
    pub cache_ttl: Duration,

    #[arg(
        long,
        env = "WEX_HTTP_TIMEOUT",
        default_value = "10s",
        value_parser = humantime::parse_duration,
        help = "Timeout for a single upstream request"
    )]
    pub request_timeout: Duration,

    #[arg(
        long,
        env = "WEX_FETCH_CONCURRENCY",
        default_value_t = 1,
        value_parser = clap::value_parser!(u16).range(1..),
        help = "Number of providers queried at once during a scrape"
    )]
    pub fetch_concurrency: u16,

    #[arg(
        long,
        env = "WEX_LOG_LEVEL",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        help = "Log level, overridden by RUST_LOG"
    )]
    pub log_level: String,

    #[arg(long, env = "WEX_JSON_LOGS", help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, env = "WEX_OW_COORDS", default_value = "", hide_default_value = true)]
    pub ow_coords: String,

    #[arg(long, env = "WEX_OW_APIKEY", default_value = "", hide_env_values = true, hide_default_value = true)]
    pub ow_apikey: String,

    #[arg(long, env = "WEX_OMET_COORDS", default_value = "", hide_default_value = true)]
    pub omet_coords: String,

    #[arg(long, env = "WEX_TIO_COORDS", default_value = "", hide_default_value = true)]
    pub tio_coords: String,

    #[arg(long, env = "WEX_TIO_APIKEY", default_value = "", hide_env_values = true, hide_default_value = true)]
    pub tio_apikey: String,

    #[arg(long, env = "WEX_WAPI_COORDS", default_value = "", hide_default_value = true)]
    pub wapi_coords: String,

    #[arg(long, env = "WEX_WAPI_APIKEY", default_value = "", hide_env_values = true, hide_default_value = true)]
    pub wapi_apikey: String,
}

/// Raw settings handed to a single provider factory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub coords: String,
    pub api_key: String,
}

impl Config {
    pub fn openweathermap(&self) -> ProviderSettings {
        ProviderSettings {
            coords: self.ow_coords.clone(),
            api_key: self.ow_apikey.clone(),
        }
    }

    pub fn open_meteo(&self) -> ProviderSettings {
        ProviderSettings {
            coords: self.omet_coords.clone(),
            api_key: String::new(),
        }
    }

    pub fn tomorrow_io(&self) -> ProviderSettings {
        ProviderSettings {
            coords: self.tio_coords.clone(),
            api_key: self.tio_apikey.clone(),
        }
    }

    pub fn weatherapi(&self) -> ProviderSettings {
        ProviderSettings {
            coords: self.wapi_coords.clone(),
            api_key: self.wapi_apikey.clone(),
        }
    }
}
