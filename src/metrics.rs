use crate::error::WeatherError;
use crate::weather::{Conditions, WeatherProvider};
use futures::stream::{self, StreamExt};
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

pub const NAMESPACE: &str = "weather";

const LABEL_PROVIDER: &str = "provider";
const LABEL_LOCATION: &str = "location";
const LABEL_COORDINATES: &str = "coordinates";
const LABEL_DESCRIPTION: &str = "desc";

type Reading = fn(&Conditions) -> f64;

/// Numeric gauges in emission order: name, help, field accessor.
const READINGS: &[(&str, &str, Reading)] = &[
    ("temperature", "The temperature at ground level, in Celsius", |c: &Conditions| c.temp),
    ("feelslike", "The apparent (feels like) temperature at ground level, in Celsius", |c: &Conditions| c.feels_like),
    ("humidity", "The current relative humidity percentage", |c: &Conditions| c.humidity),
    ("pressure_msl", "The mean atmospheric pressure at sea level (MSL), in hPa", |c: &Conditions| c.pressure_sea),
    ("pressure_surface", "The atmospheric pressure at the ground/surface level, in hPa", |c: &Conditions| c.pressure_gnd),
    ("visibility", "The visibility, in meters", |c: &Conditions| c.visibility),
    ("wind_speed", "The wind speed, in meters/second", |c: &Conditions| c.wind_speed),
    ("wind_dir", "The wind direction, in degrees", |c: &Conditions| c.wind_direction),
    ("wind_gust", "The maximum wind gust speed, in meters/second", |c: &Conditions| c.wind_gust),
    ("cloud_pct", "The cloud cover percentage", |c: &Conditions| c.clouds),
    ("rain", "The current hourly rainfall rate, in mm", |c: &Conditions| c.rain),
    ("snow", "The current hourly snowfall rate, in mm", |c: &Conditions| c.snow),
    ("uv_index", "The ultraviolet index", |c: &Conditions| c.uv_index),
    ("aq_index", "The air quality index", |c: &Conditions| c.aq_index),
    ("co_conc", "The carbon monoxide (CO) concentration, in μg/m^3", |c: &Conditions| c.co),
    ("no_conc", "The nitrogen monoxide (NO) concentration, in μg/m^3", |c: &Conditions| c.no),
    ("no2_conc", "The nitrogen dioxide (NO2) concentration, in μg/m^3", |c: &Conditions| c.no2),
    ("o3_conc", "The ozone (O3) concentration, in μg/m^3", |c: &Conditions| c.o3),
    ("so2_conc", "The sulfur dioxide (SO2) concentration, in μg/m^3", |c: &Conditions| c.so2),
    ("nh3_conc", "The ammonia (NH3) concentration, in μg/m^3", |c: &Conditions| c.nh3),
    ("pm2p5_conc", "The fine particulate (<2.5μm) concentration, in μg/m^3", |c: &Conditions| c.pm2p5),
    ("pm10_conc", "The coarse particulate (<10μm) concentration, in μg/m^3", |c: &Conditions| c.pm10),
];

/// Gauges for one scrape's worth of [`Conditions`].
///
/// Every family is named `weather_<field>` and labelled by provider, location
/// and coordinates. `weather_description` additionally carries the free-text
/// description as the `desc` label and is always `1`.
pub struct ConditionsMetrics {
    description: GaugeVec,
    readings: Vec<(GaugeVec, Reading)>,
}

impl ConditionsMetrics {
    pub fn new() -> Result<Self, WeatherError> {
        let description = GaugeVec::new(
            Opts::new("description", "Human-readable description of the current conditions").namespace(NAMESPACE),
            &[LABEL_PROVIDER, LABEL_LOCATION, LABEL_COORDINATES, LABEL_DESCRIPTION],
        )?;

        let readings = READINGS
            .iter()
            .map(|(name, help, reading)| -> Result<(GaugeVec, Reading), WeatherError> {
                let gauge = GaugeVec::new(
                    Opts::new(*name, *help).namespace(NAMESPACE),
                    &[LABEL_PROVIDER, LABEL_LOCATION, LABEL_COORDINATES],
                )?;
                Ok((gauge, *reading))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { description, readings })
    }

    pub fn observe(&self, c: &Conditions) {
        let labels = [c.provider.as_str(), c.location_name.as_str(), c.coordinates.as_str()];

        self.description
            .with_label_values(&[labels[0], labels[1], labels[2], c.description.as_str()])
            .set(1.0);

        for (gauge, reading) in &self.readings {
            gauge.with_label_values(&labels).set(reading(c));
        }
    }
}

impl Collector for ConditionsMetrics {
    fn desc(&self) -> Vec<&Desc> {
        let mut descs = self.description.desc();
        for (gauge, _) in &self.readings {
            descs.extend(gauge.desc());
        }
        descs
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut families = self.description.collect();
        for (gauge, _) in &self.readings {
            families.extend(gauge.collect());
        }
        families
    }
}

/// Queries every configured provider on each scrape and turns the successful
/// results into metric families. A failing provider is logged and skipped.
pub struct WeatherCollector {
    providers: Vec<Arc<dyn WeatherProvider>>,
    concurrency: usize,
}

impl WeatherCollector {
    pub fn new(providers: Vec<Arc<dyn WeatherProvider>>, concurrency: usize) -> Self {
        Self {
            providers,
            concurrency: concurrency.max(1),
        }
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// All descriptors this collector can emit, independent of any data.
    pub fn describe(&self) -> Result<Vec<Desc>, WeatherError> {
        let metrics = ConditionsMetrics::new()?;
        Ok(metrics.desc().into_iter().cloned().collect())
    }

    /// Fetches from every provider in registration order. Results keep that
    /// order even when fetches overlap.
    pub async fn fetch_all(&self) -> Vec<Conditions> {
        let fetches: Vec<_> = self.providers.iter().cloned().map(fetch_one).collect();

        stream::iter(fetches)
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    pub async fn collect(&self) -> Result<Vec<MetricFamily>, WeatherError> {
        let records = self.fetch_all().await;

        let metrics = ConditionsMetrics::new()?;
        for record in &records {
            metrics.observe(record);
        }

        let registry = Registry::new();
        registry.register(Box::new(metrics))?;

        Ok(registry
            .gather()
            .into_iter()
            .filter(|family| !family.get_metric().is_empty())
            .collect())
    }

    /// Renders the current scrape in the Prometheus text format.
    pub async fn render(&self) -> Result<String, WeatherError> {
        let families = self.collect().await?;
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| WeatherError::Metrics(prometheus::Error::Msg(e.to_string())))
    }
}

async fn fetch_one(provider: Arc<dyn WeatherProvider>) -> Option<Conditions> {
    match provider.fetch_current_conditions().await {
        Ok(conditions) => {
            tracing::debug!(
                provider = provider.get_name(),
                coordinates = %provider.coordinate(),
                location = %conditions.location_name,
                "fetched current conditions"
            );
            Some(conditions)
        }
        Err(e) => {
            tracing::warn!(
                provider = provider.get_name(),
                coordinates = %provider.coordinate(),
                error = %e,
                "failed to fetch current conditions"
            );
            None
        }
    }
}
