use crate::error::WeatherError;
use crate::weather::client::HttpGet;
use crate::weather::provider::{WeatherProvider, describe_code, get_json, null_as_default};
use crate::weather::types::{Conditions, Coordinate};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

pub const PROVIDER_NAME: &str = "Open-Meteo";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";

const FORECAST_FIELDS: &[&str] = &[
    "apparent_temperature",
    "cloud_cover",
    "precipitation",
    "pressure_msl",
    "rain",
    "relative_humidity_2m",
    "showers",
    "surface_pressure",
    "temperature_2m",
    "weather_code",
    "visibility",
    "wind_direction_10m",
    "wind_gusts_10m",
    "wind_speed_10m",
];

const AIR_QUALITY_FIELDS: &[&str] = &[
    "ammonia",
    "carbon_monoxide",
    "nitrogen_dioxide",
    "ozone",
    "pm10",
    "pm2_5",
    "sulphur_dioxide",
    "us_aqi",
    "uv_index",
];

/// WMO weather interpretation codes.
const WMO_CODES: &[(i32, &str)] = &[
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
    (45, "Fog"),
    (48, "Depositing rime fog"),
    (51, "Light drizzle"),
    (53, "Moderate drizzle"),
    (55, "Dense drizzle"),
    (56, "Light freezing drizzle"),
    (57, "Dense freezing drizzle"),
    (61, "Slight rain"),
    (63, "Moderate rain"),
    (65, "Heavy rain"),
    (66, "Light freezing rain"),
    (67, "Heavy freezing rain"),
    (71, "Slight snowfall"),
    (73, "Moderate snowfall"),
    (75, "Heavy snowfall"),
    (77, "Snow grains"),
    (80, "Slight rain showers"),
    (81, "Moderate rain showers"),
    (82, "Violent rain showers"),
    (85, "Slight snow showers"),
    (86, "Heavy snow showers"),
    (95, "Thunderstorm"),
    (96, "Thunderstorm with slight hail"),
    (99, "Thunderstorm with heavy hail"),
];

pub struct OpenMeteoProvider {
    http: Arc<dyn HttpGet>,
    coordinate: Coordinate,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    // Water equivalent in mm, snow included. `snowfall` is depth in cm.
    precipitation: Option<f64>,
    rain: Option<f64>,
    showers: Option<f64>,
    cloud_cover: Option<f64>,
    pressure_msl: Option<f64>,
    surface_pressure: Option<f64>,
    visibility: Option<f64>,
    wind_speed_10m: Option<f64>,
    wind_direction_10m: Option<f64>,
    wind_gusts_10m: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    weather_code: i32,
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    current: CurrentAirQuality,
}

#[derive(Debug, Deserialize)]
struct CurrentAirQuality {
    uv_index: Option<f64>,
    us_aqi: Option<f64>,
    carbon_monoxide: Option<f64>,
    nitrogen_dioxide: Option<f64>,
    ozone: Option<f64>,
    sulphur_dioxide: Option<f64>,
    ammonia: Option<f64>,
    pm2_5: Option<f64>,
    pm10: Option<f64>,
}

impl OpenMeteoProvider {
    pub fn new(http: Arc<dyn HttpGet>, coordinate: Coordinate) -> Self {
        Self { http, coordinate }
    }

    fn forecast_url(&self) -> String {
        format!(
            "{}?latitude={}&longitude={}&current={}&wind_speed_unit=ms",
            FORECAST_URL,
            self.coordinate.lat,
            self.coordinate.lon,
            FORECAST_FIELDS.join(",")
        )
    }

    fn air_quality_url(&self) -> String {
        format!(
            "{}?latitude={}&longitude={}&current={}",
            AIR_QUALITY_URL,
            self.coordinate.lat,
            self.coordinate.lon,
            AIR_QUALITY_FIELDS.join(",")
        )
    }

    fn code_to_description(code: i32) -> String {
        describe_code(WMO_CODES, code)
    }

    fn to_conditions(&self, forecast: ForecastResponse, air: AirQualityResponse) -> Conditions {
        let current = forecast.current;
        let air = air.current;

        let rain = current.rain.unwrap_or_default() + current.showers.unwrap_or_default();
        let snow = (current.precipitation.unwrap_or_default() - rain).max(0.0);

        Conditions {
            description: Self::code_to_description(current.weather_code),
            temp: current.temperature_2m.unwrap_or_default(),
            feels_like: current.apparent_temperature.unwrap_or_default(),
            humidity: current.relative_humidity_2m.unwrap_or_default(),
            pressure_gnd: current.surface_pressure.unwrap_or_default(),
            pressure_sea: current.pressure_msl.unwrap_or_default(),
            visibility: current.visibility.unwrap_or_default(),
            wind_speed: current.wind_speed_10m.unwrap_or_default(),
            wind_direction: current.wind_direction_10m.unwrap_or_default(),
            wind_gust: current.wind_gusts_10m.unwrap_or_default(),
            clouds: current.cloud_cover.unwrap_or_default(),
            rain,
            snow,
            uv_index: air.uv_index.unwrap_or_default(),
            aq_index: air.us_aqi.unwrap_or_default(),
            co: air.carbon_monoxide.unwrap_or_default(),
            no2: air.nitrogen_dioxide.unwrap_or_default(),
            o3: air.ozone.unwrap_or_default(),
            so2: air.sulphur_dioxide.unwrap_or_default(),
            nh3: air.ammonia.unwrap_or_default(),
            pm2p5: air.pm2_5.unwrap_or_default(),
            pm10: air.pm10.unwrap_or_default(),
            // Open-Meteo has no reverse geocoding and no NO reading.
            ..Conditions::new(PROVIDER_NAME, &self.coordinate)
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn fetch_current_conditions(&self) -> Result<Conditions, WeatherError> {
        let (forecast_url, air_url) = (self.forecast_url(), self.air_quality_url());

        let (forecast, air) = tokio::try_join!(
            get_json::<ForecastResponse>(self.http.as_ref(), &forecast_url),
            get_json::<AirQualityResponse>(self.http.as_ref(), &air_url),
        )?;

        Ok(self.to_conditions(forecast, air))
    }

    fn get_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}
