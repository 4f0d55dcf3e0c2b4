pub mod client;
pub mod factory;
pub mod open_meteo;
pub mod openweathermap;
pub mod provider;
pub mod tomorrow_io;
pub mod types;
pub mod weatherapi;

pub use client::{CachedHttpClient, HttpGet};
pub use factory::ProviderRegistry;
pub use provider::WeatherProvider;
pub use types::{Conditions, Coordinate};
