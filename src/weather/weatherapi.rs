use crate::error::WeatherError;
use crate::weather::client::HttpGet;
use crate::weather::provider::{
    WeatherProvider, get_json, km_to_m, kmh_to_ms, null_as_default, split_precipitation,
};
use crate::weather::types::{Conditions, Coordinate};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

pub const PROVIDER_NAME: &str = "WeatherAPI";
const WEATHERAPI_BASE_URL: &str = "https://api.weatherapi.com/v1/current.json";

pub struct WeatherApiProvider {
    http: Arc<dyn HttpGet>,
    api_key: String,
    coordinate: Coordinate,
}

#[derive(Debug, Deserialize)]
struct WeatherApiResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    location: Location,
    current: CurrentWeather,
}

#[derive(Debug, Default, Deserialize)]
struct Location {
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temp_c: Option<f64>,
    feelslike_c: Option<f64>,
    humidity: Option<f64>,
    wind_kph: Option<f64>,
    wind_degree: Option<f64>,
    gust_kph: Option<f64>,
    vis_km: Option<f64>,
    pressure_mb: Option<f64>,
    precip_mm: Option<f64>,
    cloud: Option<f64>,
    uv: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    condition: Condition,
    #[serde(default, deserialize_with = "null_as_default")]
    air_quality: AirQuality,
}

#[derive(Debug, Default, Deserialize)]
struct Condition {
    #[serde(default, deserialize_with = "null_as_default")]
    text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    code: i32,
}

#[derive(Debug, Default, Deserialize)]
struct AirQuality {
    co: Option<f64>,
    no2: Option<f64>,
    o3: Option<f64>,
    so2: Option<f64>,
    pm2_5: Option<f64>,
    pm10: Option<f64>,
    #[serde(rename = "us-epa-index")]
    us_epa_index: Option<f64>,
}

impl WeatherApiProvider {
    pub fn new(http: Arc<dyn HttpGet>, api_key: String, coordinate: Coordinate) -> Self {
        Self {
            http,
            api_key,
            coordinate,
        }
    }

    fn build_url(&self) -> String {
        format!(
            "{}?key={}&q={}%2C{}&aqi=yes",
            WEATHERAPI_BASE_URL, self.api_key, self.coordinate.lat, self.coordinate.lon
        )
    }

    fn to_conditions(&self, data: WeatherApiResponse) -> Conditions {
        let current = data.current;
        let temp = current.temp_c.unwrap_or_default();

        // Only a combined precipitation figure is reported.
        let (rain, snow) = split_precipitation(temp, current.precip_mm.unwrap_or_default());

        let description = if current.condition.text.is_empty() {
            format!("Unknown ({})", current.condition.code)
        } else {
            current.condition.text
        };

        let aq = current.air_quality;
        Conditions {
            location_name: data.location.name,
            description,
            temp,
            feels_like: current.feelslike_c.unwrap_or_default(),
            humidity: current.humidity.unwrap_or_default(),
            // No ground-level pressure in this API.
            pressure_sea: current.pressure_mb.unwrap_or_default(),
            visibility: km_to_m(current.vis_km.unwrap_or_default()),
            wind_speed: kmh_to_ms(current.wind_kph.unwrap_or_default()),
            wind_direction: current.wind_degree.unwrap_or_default(),
            wind_gust: kmh_to_ms(current.gust_kph.unwrap_or_default()),
            clouds: current.cloud.unwrap_or_default(),
            rain,
            snow,
            uv_index: current.uv.unwrap_or_default(),
            aq_index: aq.us_epa_index.unwrap_or_default(),
            co: aq.co.unwrap_or_default(),
            no2: aq.no2.unwrap_or_default(),
            o3: aq.o3.unwrap_or_default(),
            so2: aq.so2.unwrap_or_default(),
            pm2p5: aq.pm2_5.unwrap_or_default(),
            pm10: aq.pm10.unwrap_or_default(),
            ..Conditions::new(PROVIDER_NAME, &self.coordinate)
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn fetch_current_conditions(&self) -> Result<Conditions, WeatherError> {
        let data: WeatherApiResponse = get_json(self.http.as_ref(), &self.build_url()).await?;
        Ok(self.to_conditions(data))
    }

    fn get_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}
