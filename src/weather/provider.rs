use crate::error::WeatherError;
use crate::weather::client::HttpGet;
use crate::weather::types::{Conditions, Coordinate};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// One upstream weather service bound to one coordinate.
///
/// A fetch either returns a complete [`Conditions`] record or an error; any
/// failed sub-request fails the whole fetch.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch_current_conditions(&self) -> Result<Conditions, WeatherError>;

    fn get_name(&self) -> &'static str;

    fn coordinate(&self) -> Coordinate;
}

/// GETs `url`, rejects non-2xx statuses and decodes the body as `T`.
pub async fn get_json<T: DeserializeOwned>(http: &dyn HttpGet, url: &str) -> Result<T, WeatherError> {
    let response = http.get(url).await?;
    if !response.is_success() {
        return Err(WeatherError::status(url, response.status, &response.body));
    }
    serde_json::from_str(&response.body).map_err(|e| WeatherError::decode(url, e))
}

pub fn kmh_to_ms(kmh: f64) -> f64 {
    kmh * 5.0 / 18.0
}

pub fn km_to_m(km: f64) -> f64 {
    km * 1000.0
}

/// Splits an undifferentiated precipitation amount into `(rain, snow)`:
/// everything counts as snow below freezing, as rain otherwise.
pub fn split_precipitation(temp_c: f64, precipitation: f64) -> (f64, f64) {
    if temp_c < 0.0 {
        (0.0, precipitation)
    } else {
        (precipitation, 0.0)
    }
}

/// Looks `code` up in a provider's code table, falling back to
/// `Unknown (<code>)`.
pub fn describe_code(table: &[(i32, &str)], code: i32) -> String {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, text)| (*text).to_string())
        .unwrap_or_else(|| format!("Unknown ({code})"))
}

/// Decodes an explicit JSON `null` as `T::default()`. Pair with
/// `#[serde(default)]` so an absent key behaves the same way.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::weather::client::HttpResponse;
    use std::sync::Mutex;

    /// Serves canned bodies keyed by URL substring and records every request.
    #[derive(Default)]
    pub struct FakeHttp {
        routes: Vec<(String, HttpResponse)>,
        pub requests: Mutex<Vec<String>>,
    }

    impl FakeHttp {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn route(mut self, fragment: &str, status: u16, body: &str) -> Self {
            self.routes.push((
                fragment.to_string(),
                HttpResponse {
                    status,
                    body: body.to_string(),
                },
            ));
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requests.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl HttpGet for FakeHttp {
        async fn get(&self, url: &str) -> Result<HttpResponse, WeatherError> {
            self.requests.lock().expect("lock").push(url.to_string());
            self.routes
                .iter()
                .find(|(fragment, _)| url.contains(fragment.as_str()))
                .map(|(_, response)| response.clone())
                .ok_or_else(|| WeatherError::MissingData(format!("no route for {url}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeHttp;
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Reading {
        value: f64,
    }

    #[derive(Debug, Deserialize)]
    struct Labelled {
        #[serde(default, deserialize_with = "null_as_default")]
        name: String,
        #[serde(default, deserialize_with = "null_as_default")]
        code: i32,
    }

    #[test]
    fn test_unit_conversions_are_exact() {
        assert_eq!(kmh_to_ms(36.0), 10.0);
        assert_eq!(kmh_to_ms(0.0), 0.0);
        assert_eq!(km_to_m(1.5), 1500.0);
    }

    #[test]
    fn test_split_precipitation() {
        assert_eq!(split_precipitation(-1.0, 5.0), (0.0, 5.0));
        assert_eq!(split_precipitation(5.0, 5.0), (5.0, 0.0));
        assert_eq!(split_precipitation(0.0, 2.0), (2.0, 0.0));
    }

    #[test]
    fn test_describe_code() {
        let table = [(0, "Clear"), (3, "Overcast")];
        assert_eq!(describe_code(&table, 3), "Overcast");
        assert_eq!(describe_code(&table, 42), "Unknown (42)");
        assert_eq!(describe_code(&table, -7), "Unknown (-7)");
    }

    #[test]
    fn test_null_and_absent_decode_as_default() {
        let nulls: Labelled = serde_json::from_str(r#"{"name": null, "code": null}"#).expect("decode");
        assert_eq!((nulls.name.as_str(), nulls.code), ("", 0));

        let absent: Labelled = serde_json::from_str("{}").expect("decode");
        assert_eq!((absent.name.as_str(), absent.code), ("", 0));

        let present: Labelled = serde_json::from_str(r#"{"name": "Oslo", "code": 3}"#).expect("decode");
        assert_eq!((present.name.as_str(), present.code), ("Oslo", 3));
    }

    #[tokio::test]
    async fn test_get_json_decodes_body() {
        let http = FakeHttp::new().route("/uvi", 200, r#"{"value": 4.5}"#);
        let reading: Reading = get_json(&http, "https://x/uvi?lat=1").await.expect("decode");
        assert_eq!(reading.value, 4.5);
    }

    #[tokio::test]
    async fn test_get_json_rejects_error_status() {
        let http = FakeHttp::new().route("/uvi", 401, r#"{"cod":401,"message":"Invalid API key"}"#);
        let err = get_json::<Reading>(&http, "https://x/uvi?appid=k").await.unwrap_err();
        assert!(matches!(err, WeatherError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_get_json_reports_decode_errors() {
        let http = FakeHttp::new().route("/uvi", 200, "<html>oops</html>");
        let err = get_json::<Reading>(&http, "https://x/uvi").await.unwrap_err();
        assert!(matches!(err, WeatherError::Decode { .. }));
    }
}
