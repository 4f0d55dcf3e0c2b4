use crate::config::{Config, ProviderSettings};
use crate::error::WeatherError;
use crate::weather::client::HttpGet;
use crate::weather::open_meteo::OpenMeteoProvider;
use crate::weather::openweathermap::OpenWeatherMapProvider;
use crate::weather::provider::WeatherProvider;
use crate::weather::tomorrow_io::TomorrowIoProvider;
use crate::weather::types::Coordinate;
use crate::weather::weatherapi::WeatherApiProvider;
use std::collections::HashSet;
use std::sync::Arc;

/// Turns one provider's settings into zero or more adapters, one per
/// configured coordinate.
pub trait ProviderFactory: Send + Sync {
    fn name(&self) -> &'static str;

    fn build(&self, http: Arc<dyn HttpGet>) -> Vec<Arc<dyn WeatherProvider>>;
}

/// Ordered list of factories. Adapters are built, and later scraped, in
/// registration order.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: Vec<Box<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        registry.register(OpenWeatherMapFactory::new(config.openweathermap()));
        registry.register(OpenMeteoFactory::new(config.open_meteo()));
        registry.register(TomorrowIoFactory::new(config.tomorrow_io()));
        registry.register(WeatherApiFactory::new(config.weatherapi()));
        registry
    }

    pub fn register(&mut self, factory: impl ProviderFactory + 'static) -> &mut Self {
        self.factories.push(Box::new(factory));
        self
    }

    pub fn build_all(&self, http: Arc<dyn HttpGet>) -> Vec<Arc<dyn WeatherProvider>> {
        self.factories
            .iter()
            .flat_map(|factory| factory.build(http.clone()))
            .collect()
    }
}

/// Parses `"lat,lon;lat,lon"`. Malformed pairs are logged and skipped, as are
/// pairs that render to a coordinates label already seen (`1.0,2` and `1,2`).
pub fn parse_coordinates(raw: &str) -> Vec<Coordinate> {
    let mut seen = HashSet::new();

    raw.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| match parse_coordinate(pair) {
            Ok(coordinate) => Some((pair, coordinate)),
            Err(e) => {
                tracing::warn!(pair, error = %e, "skipping malformed coordinate pair");
                None
            }
        })
        .filter_map(|(pair, coordinate)| {
            if seen.insert(coordinate.to_string()) {
                Some(coordinate)
            } else {
                tracing::warn!(pair, coordinates = %coordinate, "skipping duplicate coordinate pair");
                None
            }
        })
        .collect()
}

fn parse_coordinate(pair: &str) -> Result<Coordinate, WeatherError> {
    let tokens: Vec<&str> = pair.split(',').map(str::trim).collect();
    if tokens.len() != 2 {
        return Err(WeatherError::Configuration(format!(
            "coordinate pair '{pair}' does not contain exactly two values"
        )));
    }

    let lat = tokens[0]
        .parse::<f64>()
        .map_err(|e| WeatherError::Configuration(format!("invalid latitude '{}': {e}", tokens[0])))?;
    let lon = tokens[1]
        .parse::<f64>()
        .map_err(|e| WeatherError::Configuration(format!("invalid longitude '{}': {e}", tokens[1])))?;

    Ok(Coordinate::new(lat, lon))
}

fn build_each(
    provider: &'static str,
    settings: &ProviderSettings,
    make: impl Fn(Coordinate) -> Arc<dyn WeatherProvider>,
) -> Vec<Arc<dyn WeatherProvider>> {
    parse_coordinates(&settings.coords)
        .into_iter()
        .map(|coordinate| {
            tracing::info!(provider, coordinates = %coordinate, "creating weather provider");
            make(coordinate)
        })
        .collect()
}

pub struct OpenWeatherMapFactory {
    settings: ProviderSettings,
}

impl OpenWeatherMapFactory {
    pub fn new(settings: ProviderSettings) -> Self {
        Self { settings }
    }
}

impl ProviderFactory for OpenWeatherMapFactory {
    fn name(&self) -> &'static str {
        crate::weather::openweathermap::PROVIDER_NAME
    }

    fn build(&self, http: Arc<dyn HttpGet>) -> Vec<Arc<dyn WeatherProvider>> {
        build_each(self.name(), &self.settings, |coordinate| {
            Arc::new(OpenWeatherMapProvider::new(
                http.clone(),
                self.settings.api_key.clone(),
                coordinate,
            ))
        })
    }
}

pub struct OpenMeteoFactory {
    settings: ProviderSettings,
}

impl OpenMeteoFactory {
    pub fn new(settings: ProviderSettings) -> Self {
        Self { settings }
    }
}

impl ProviderFactory for OpenMeteoFactory {
    fn name(&self) -> &'static str {
        crate::weather::open_meteo::PROVIDER_NAME
    }

    fn build(&self, http: Arc<dyn HttpGet>) -> Vec<Arc<dyn WeatherProvider>> {
        build_each(self.name(), &self.settings, |coordinate| {
            Arc::new(OpenMeteoProvider::new(http.clone(), coordinate))
        })
    }
}

pub struct TomorrowIoFactory {
    settings: ProviderSettings,
}

impl TomorrowIoFactory {
    pub fn new(settings: ProviderSettings) -> Self {
        Self { settings }
    }
}

impl ProviderFactory for TomorrowIoFactory {
    fn name(&self) -> &'static str {
        crate::weather::tomorrow_io::PROVIDER_NAME
    }

    fn build(&self, http: Arc<dyn HttpGet>) -> Vec<Arc<dyn WeatherProvider>> {
        build_each(self.name(), &self.settings, |coordinate| {
            Arc::new(TomorrowIoProvider::new(
                http.clone(),
                self.settings.api_key.clone(),
                coordinate,
            ))
        })
    }
}

pub struct WeatherApiFactory {
    settings: ProviderSettings,
}

impl WeatherApiFactory {
    pub fn new(settings: ProviderSettings) -> Self {
        Self { settings }
    }
}

impl ProviderFactory for WeatherApiFactory {
    fn name(&self) -> &'static str {
        crate::weather::weatherapi::PROVIDER_NAME
    }

    fn build(&self, http: Arc<dyn HttpGet>) -> Vec<Arc<dyn WeatherProvider>> {
        build_each(self.name(), &self.settings, |coordinate| {
            Arc::new(WeatherApiProvider::new(
                http.clone(),
                self.settings.api_key.clone(),
                coordinate,
            ))
        })
    }
}
