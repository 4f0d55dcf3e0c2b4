use crate::error::WeatherError;
use crate::weather::client::HttpGet;
use crate::weather::provider::{WeatherProvider, get_json, null_as_default};
use crate::weather::types::{Conditions, Coordinate};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

pub const PROVIDER_NAME: &str = "OpenWeatherMap";
const OPENWEATHERMAP_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

pub struct OpenWeatherMapProvider {
    http: Arc<dyn HttpGet>,
    api_key: String,
    coordinate: Coordinate,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    weather: Vec<WeatherDescription>,
    main: MainWeather,
    visibility: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    wind: Wind,
    #[serde(default, deserialize_with = "null_as_default")]
    clouds: Clouds,
    #[serde(default, deserialize_with = "null_as_default")]
    rain: Precipitation,
    #[serde(default, deserialize_with = "null_as_default")]
    snow: Precipitation,
}

#[derive(Debug, Deserialize)]
struct WeatherDescription {
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainWeather {
    temp: Option<f64>,
    feels_like: Option<f64>,
    // Sea-level pressure; always present.
    pressure: Option<f64>,
    humidity: Option<f64>,
    // Omitted in some regions (e.g. the US).
    grnd_level: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Wind {
    speed: Option<f64>,
    deg: Option<f64>,
    gust: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Clouds {
    all: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Precipitation {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct UvIndexResponse {
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AirPollutionResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    list: Vec<AirPollutionEntry>,
}

#[derive(Debug, Deserialize)]
struct AirPollutionEntry {
    main: AirQualityMain,
    #[serde(default, deserialize_with = "null_as_default")]
    components: Components,
}

#[derive(Debug, Deserialize)]
struct AirQualityMain {
    aqi: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Components {
    co: Option<f64>,
    no: Option<f64>,
    no2: Option<f64>,
    o3: Option<f64>,
    so2: Option<f64>,
    pm2_5: Option<f64>,
    pm10: Option<f64>,
    nh3: Option<f64>,
}

impl OpenWeatherMapProvider {
    pub fn new(http: Arc<dyn HttpGet>, api_key: String, coordinate: Coordinate) -> Self {
        Self {
            http,
            api_key,
            coordinate,
        }
    }

    fn current_url(&self) -> String {
        format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            OPENWEATHERMAP_BASE_URL, self.coordinate.lat, self.coordinate.lon, self.api_key
        )
    }

    fn uv_index_url(&self) -> String {
        format!(
            "{}/uvi?lat={}&lon={}&appid={}",
            OPENWEATHERMAP_BASE_URL, self.coordinate.lat, self.coordinate.lon, self.api_key
        )
    }

    fn air_pollution_url(&self) -> String {
        format!(
            "{}/air_pollution?lat={}&lon={}&appid={}",
            OPENWEATHERMAP_BASE_URL, self.coordinate.lat, self.coordinate.lon, self.api_key
        )
    }

    fn to_conditions(
        &self,
        current: CurrentResponse,
        uv: UvIndexResponse,
        air: AirPollutionResponse,
    ) -> Result<Conditions, WeatherError> {
        let air = air.list.into_iter().next().ok_or_else(|| {
            WeatherError::MissingData("OpenWeatherMap air pollution list is empty".to_string())
        })?;

        let description = current
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(Conditions {
            location_name: current.name,
            description,
            temp: current.main.temp.unwrap_or_default(),
            feels_like: current.main.feels_like.unwrap_or_default(),
            humidity: current.main.humidity.unwrap_or_default(),
            pressure_gnd: current.main.grnd_level.unwrap_or_default(),
            pressure_sea: current.main.pressure.unwrap_or_default(),
            visibility: current.visibility.unwrap_or_default(),
            wind_speed: current.wind.speed.unwrap_or_default(),
            wind_direction: current.wind.deg.unwrap_or_default(),
            wind_gust: current.wind.gust.unwrap_or_default(),
            clouds: current.clouds.all.unwrap_or_default(),
            rain: current.rain.one_hour.unwrap_or_default(),
            snow: current.snow.one_hour.unwrap_or_default(),
            uv_index: uv.value.unwrap_or_default(),
            aq_index: air.main.aqi.unwrap_or_default(),
            co: air.components.co.unwrap_or_default(),
            no: air.components.no.unwrap_or_default(),
            no2: air.components.no2.unwrap_or_default(),
            o3: air.components.o3.unwrap_or_default(),
            so2: air.components.so2.unwrap_or_default(),
            nh3: air.components.nh3.unwrap_or_default(),
            pm2p5: air.components.pm2_5.unwrap_or_default(),
            pm10: air.components.pm10.unwrap_or_default(),
            ..Conditions::new(PROVIDER_NAME, &self.coordinate)
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapProvider {
    async fn fetch_current_conditions(&self) -> Result<Conditions, WeatherError> {
        let (current_url, uv_url, air_url) =
            (self.current_url(), self.uv_index_url(), self.air_pollution_url());

        let (current, uv, air) = tokio::try_join!(
            get_json::<CurrentResponse>(self.http.as_ref(), &current_url),
            get_json::<UvIndexResponse>(self.http.as_ref(), &uv_url),
            get_json::<AirPollutionResponse>(self.http.as_ref(), &air_url),
        )?;

        self.to_conditions(current, uv, air)
    }

    fn get_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::provider::testing::FakeHttp;
    use pretty_assertions::assert_eq;

    const CURRENT: &str = r#"{
        "coord": {"lon": -105.08, "lat": 39.8},
        "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
        "main": {"temp": 12.5, "feels_like": 11.2, "temp_min": 10.0, "temp_max": 14.0,
                 "pressure": 1016, "humidity": 71, "sea_level": 1016, "grnd_level": 834},
        "visibility": 10000,
        "wind": {"speed": 3.6, "deg": 220, "gust": 7.2},
        "clouds": {"all": 75},
        "rain": {"1h": 0.42},
        "name": "Arvada"
    }"#;

    const UVI: &str = r#"{"lat": 39.8, "lon": -105.08, "value": 5.1}"#;

    const AIR: &str = r#"{
        "list": [{
            "main": {"aqi": 2},
            "components": {"co": 201.94, "no": 0.02, "no2": 0.77, "o3": 68.66,
                           "so2": 0.64, "pm2_5": 0.5, "pm10": 0.54, "nh3": 0.12}
        }]
    }"#;

    fn provider(http: FakeHttp) -> OpenWeatherMapProvider {
        OpenWeatherMapProvider::new(Arc::new(http), "KEY".to_string(), Coordinate::new(39.8, -105.08))
    }

    fn healthy() -> FakeHttp {
        FakeHttp::new()
            .route("/weather?", 200, CURRENT)
            .route("/uvi?", 200, UVI)
            .route("/air_pollution?", 200, AIR)
    }

    #[tokio::test]
    async fn test_fetch_maps_all_three_endpoints() {
        let conditions = provider(healthy()).fetch_current_conditions().await.expect("fetch");

        assert_eq!(
            conditions,
            Conditions {
                provider: "OpenWeatherMap".to_string(),
                location_name: "Arvada".to_string(),
                coordinates: "39.8,-105.08".to_string(),
                description: "light rain".to_string(),
                temp: 12.5,
                feels_like: 11.2,
                humidity: 71.0,
                pressure_gnd: 834.0,
                pressure_sea: 1016.0,
                visibility: 10000.0,
                wind_speed: 3.6,
                wind_direction: 220.0,
                wind_gust: 7.2,
                clouds: 75.0,
                rain: 0.42,
                snow: 0.0,
                uv_index: 5.1,
                aq_index: 2.0,
                co: 201.94,
                no: 0.02,
                no2: 0.77,
                o3: 68.66,
                so2: 0.64,
                nh3: 0.12,
                pm2p5: 0.5,
                pm10: 0.54,
            }
        );
    }

    #[tokio::test]
    async fn test_request_urls_carry_coordinate_and_key() {
        let http = Arc::new(healthy());
        let provider = OpenWeatherMapProvider::new(http.clone(), "KEY".to_string(), Coordinate::new(39.8, -105.08));
        provider.fetch_current_conditions().await.expect("fetch");

        let mut requested = http.requested();
        requested.sort();
        assert_eq!(
            requested,
            vec![
                "https://api.openweathermap.org/data/2.5/air_pollution?lat=39.8&lon=-105.08&appid=KEY",
                "https://api.openweathermap.org/data/2.5/uvi?lat=39.8&lon=-105.08&appid=KEY",
                "https://api.openweathermap.org/data/2.5/weather?lat=39.8&lon=-105.08&appid=KEY&units=metric",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_ground_pressure_stays_zero() {
        let current = r#"{"weather": [], "main": {"temp": 20.0, "pressure": 1012, "humidity": 40}, "name": ""}"#;
        let http = FakeHttp::new()
            .route("/weather?", 200, current)
            .route("/uvi?", 200, UVI)
            .route("/air_pollution?", 200, AIR);

        let conditions = provider(http).fetch_current_conditions().await.expect("fetch");
        assert_eq!(conditions.pressure_gnd, 0.0);
        assert_eq!(conditions.pressure_sea, 1012.0);
        assert_eq!(conditions.description, "Unknown");
        assert_eq!(conditions.location_name, "");
        assert_eq!(conditions.coordinates, "39.8,-105.08");
    }

    #[tokio::test]
    async fn test_null_fields_decode_as_defaults() {
        let current = r#"{
            "weather": [{"id": 800, "description": null}],
            "main": {"temp": 9.0, "pressure": 1020, "humidity": null},
            "wind": null, "clouds": null, "rain": null,
            "name": null
        }"#;
        let air = r#"{"list": [{"main": {"aqi": 1}, "components": null}]}"#;
        let http = FakeHttp::new()
            .route("/weather?", 200, current)
            .route("/uvi?", 200, UVI)
            .route("/air_pollution?", 200, air);

        let c = provider(http).fetch_current_conditions().await.expect("fetch");
        assert_eq!(c.location_name, "");
        assert_eq!(c.description, "");
        assert_eq!(c.temp, 9.0);
        assert_eq!(c.humidity, 0.0);
        assert_eq!(c.wind_speed, 0.0);
        assert_eq!(c.rain, 0.0);
        assert_eq!(c.aq_index, 1.0);
        assert_eq!(c.co, 0.0);
    }

    #[tokio::test]
    async fn test_failed_sub_request_fails_whole_fetch() {
        let http = FakeHttp::new()
            .route("/weather?", 200, CURRENT)
            .route("/uvi?", 200, UVI)
            .route("/air_pollution?", 500, "internal error");

        let err = provider(http).fetch_current_conditions().await.unwrap_err();
        assert!(matches!(err, WeatherError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_empty_air_pollution_list_fails_fetch() {
        let http = FakeHttp::new()
            .route("/weather?", 200, CURRENT)
            .route("/uvi?", 200, UVI)
            .route("/air_pollution?", 200, r#"{"list": []}"#);

        let err = provider(http).fetch_current_conditions().await.unwrap_err();
        assert!(matches!(err, WeatherError::MissingData(_)));
    }
}
