// 🌦️ Weather Day - One entry of the global (farm-independent) forecast

use crate::dates::parse_record_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
    Snowy,
}

impl WeatherCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "sunny",
            WeatherCondition::Cloudy => "cloudy",
            WeatherCondition::Rainy => "rainy",
            WeatherCondition::Stormy => "stormy",
            WeatherCondition::Snowy => "snowy",
        }
    }
}

/// Temperatures in °F, wind in mph, humidity and precipitation in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDay {
    pub date: String,
    pub temperature: f64,
    pub condition: WeatherCondition,
    pub humidity: f64,
    pub wind_speed: f64,
    pub precipitation: f64,

    /// Only present for days after the first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
}

impl WeatherDay {
    pub fn new(date: &str, temperature: f64, condition: WeatherCondition) -> Self {
        WeatherDay {
            date: date.to_string(),
            temperature,
            condition,
            humidity: 0.0,
            wind_speed: 0.0,
            precipitation: 0.0,
            high: None,
            low: None,
        }
    }

    pub fn forecast_on(&self) -> Option<NaiveDate> {
        parse_record_date(&self.date)
    }
}
