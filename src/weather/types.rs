use std::fmt;

/// Normalized snapshot of current weather and air quality for one coordinate
/// from one provider.
///
/// Units: temperatures in Celsius, pressures in hPa, visibility in meters,
/// wind in m/s and degrees, rain/snow as mm per hour, pollutants in μg/m³.
/// Readings an upstream does not supply stay at `0.0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    pub provider: String,
    pub location_name: String,
    pub coordinates: String,

    pub description: String,
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure_gnd: f64,
    pub pressure_sea: f64,
    pub visibility: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub wind_gust: f64,
    pub clouds: f64,
    pub rain: f64,
    pub snow: f64,
    pub uv_index: f64,
    pub aq_index: f64,
    pub co: f64,
    pub no: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub nh3: f64,
    pub pm2p5: f64,
    pub pm10: f64,
}

impl Conditions {
    pub fn new(provider: &str, coordinate: &Coordinate) -> Self {
        Self {
            provider: provider.to_string(),
            coordinates: coordinate.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}
