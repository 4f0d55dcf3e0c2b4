use crate::error::WeatherError;
use crate::weather::client::HttpGet;
use crate::weather::provider::{WeatherProvider, describe_code, get_json, km_to_m, null_as_default};
use crate::weather::types::{Conditions, Coordinate};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

pub const PROVIDER_NAME: &str = "Tomorrow.io";
const TOMORROW_IO_REALTIME_URL: &str = "https://api.tomorrow.io/v4/weather/realtime";

const WEATHER_CODES: &[(i32, &str)] = &[
    (0, "Unknown"),
    (1000, "Clear, Sunny"),
    (1100, "Mostly Clear"),
    (1101, "Partly Cloudy"),
    (1102, "Mostly Cloudy"),
    (1001, "Cloudy"),
    (2000, "Fog"),
    (2100, "Light Fog"),
    (4000, "Drizzle"),
    (4001, "Rain"),
    (4200, "Light Rain"),
    (4201, "Heavy Rain"),
    (5000, "Snow"),
    (5001, "Flurries"),
    (5100, "Light Snow"),
    (5101, "Heavy Snow"),
    (6000, "Freezing Drizzle"),
    (6001, "Freezing Rain"),
    (6200, "Light Freezing Rain"),
    (6201, "Heavy Freezing Rain"),
    (7000, "Ice Pellets"),
    (7101, "Heavy Ice Pellets"),
    (7102, "Light Ice Pellets"),
    (8000, "Thunderstorm"),
];

pub struct TomorrowIoProvider {
    http: Arc<dyn HttpGet>,
    api_key: String,
    coordinate: Coordinate,
}

#[derive(Debug, Deserialize)]
struct RealtimeResponse {
    data: RealtimeData,
    #[serde(default, deserialize_with = "null_as_default")]
    location: Location,
}

#[derive(Debug, Deserialize)]
struct RealtimeData {
    values: Values,
}

#[derive(Debug, Default, Deserialize)]
struct Location {
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Values {
    temperature: Option<f64>,
    temperature_apparent: Option<f64>,
    cloud_cover: Option<f64>,
    humidity: Option<f64>,
    pressure_surface_level: Option<f64>,
    // Not part of the realtime payload in most plans.
    pressure_sea_level: Option<f64>,
    rain_intensity: Option<f64>,
    freezing_rain_intensity: Option<f64>,
    sleet_intensity: Option<f64>,
    snow_intensity: Option<f64>,
    wind_speed: Option<f64>,
    wind_direction: Option<f64>,
    wind_gust: Option<f64>,
    visibility: Option<f64>,
    uv_index: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    weather_code: i32,
}

impl TomorrowIoProvider {
    pub fn new(http: Arc<dyn HttpGet>, api_key: String, coordinate: Coordinate) -> Self {
        Self {
            http,
            api_key,
            coordinate,
        }
    }

    fn build_url(&self) -> String {
        format!(
            "{}?location={}%2C{}&apikey={}&units=metric",
            TOMORROW_IO_REALTIME_URL, self.coordinate.lat, self.coordinate.lon, self.api_key
        )
    }

    fn code_to_description(code: i32) -> String {
        describe_code(WEATHER_CODES, code)
    }

    fn to_conditions(&self, realtime: RealtimeResponse) -> Conditions {
        let v = realtime.data.values;

        // Air quality is a premium endpoint and is left unset.
        Conditions {
            location_name: realtime.location.name,
            description: Self::code_to_description(v.weather_code),
            temp: v.temperature.unwrap_or_default(),
            feels_like: v.temperature_apparent.unwrap_or_default(),
            humidity: v.humidity.unwrap_or_default(),
            pressure_gnd: v.pressure_surface_level.unwrap_or_default(),
            pressure_sea: v.pressure_sea_level.unwrap_or_default(),
            visibility: km_to_m(v.visibility.unwrap_or_default()),
            wind_speed: v.wind_speed.unwrap_or_default(),
            wind_direction: v.wind_direction.unwrap_or_default(),
            wind_gust: v.wind_gust.unwrap_or_default(),
            clouds: v.cloud_cover.unwrap_or_default(),
            rain: v.rain_intensity.unwrap_or_default() + v.freezing_rain_intensity.unwrap_or_default(),
            snow: v.snow_intensity.unwrap_or_default() + v.sleet_intensity.unwrap_or_default(),
            uv_index: v.uv_index.unwrap_or_default(),
            ..Conditions::new(PROVIDER_NAME, &self.coordinate)
        }
    }
}

#[async_trait]
impl WeatherProvider for TomorrowIoProvider {
    async fn fetch_current_conditions(&self) -> Result<Conditions, WeatherError> {
        let realtime: RealtimeResponse = get_json(self.http.as_ref(), &self.build_url()).await?;
        Ok(self.to_conditions(realtime))
    }

    fn get_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}
