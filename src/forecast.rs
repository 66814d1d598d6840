// 🌤️ Forecast Views - Current day, outlook, averages and field advice

use crate::entities::WeatherDay;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FORECAST_DAYS: usize = 5;

/// The first forecast entry is "today".
pub fn current_day(forecast: &[WeatherDay]) -> Option<&WeatherDay> {
    forecast.first()
}

/// The `days` entries after the current day.
pub fn outlook(forecast: &[WeatherDay], days: usize) -> &[WeatherDay] {
    let rest = forecast.get(1..).unwrap_or(&[]);
    &rest[..days.min(rest.len())]
}

// ============================================================================
// AVERAGES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAverages {
    pub temperature: f64,
    pub precipitation: f64,
    pub wind_speed: f64,
    pub humidity: f64,
    pub days: usize,
}

/// Means over the whole forecast; `None` for an empty forecast.
pub fn forecast_averages(forecast: &[WeatherDay]) -> Option<ForecastAverages> {
    if forecast.is_empty() {
        return None;
    }

    let n = forecast.len() as f64;
    let mean = |read: fn(&WeatherDay) -> f64| forecast.iter().map(read).sum::<f64>() / n;

    Some(ForecastAverages {
        temperature: mean(|d: &WeatherDay| d.temperature),
        precipitation: mean(|d: &WeatherDay| d.precipitation),
        wind_speed: mean(|d: &WeatherDay| d.wind_speed),
        humidity: mean(|d: &WeatherDay| d.humidity),
        days: forecast.len(),
    })
}

// ============================================================================
// FIELD ADVISORIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    Irrigation,
    Planting,
    Harvesting,
}

impl AdvisoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisoryKind::Irrigation => "irrigation",
            AdvisoryKind::Planting => "planting",
            AdvisoryKind::Harvesting => "harvesting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAdvisory {
    pub kind: AdvisoryKind,
    /// True when conditions favour the activity
    pub favorable: bool,
    pub message: String,
}

/// Irrigation, planting and harvesting advice for one day, in that order.
pub fn field_advisories(day: &WeatherDay) -> Vec<FieldAdvisory> {
    let wet = day.precipitation > 50.0;
    let mild = (50.0..=80.0).contains(&day.temperature);
    let dry = day.precipitation < 30.0;

    vec![
        FieldAdvisory {
            kind: AdvisoryKind::Irrigation,
            favorable: !wet,
            message: if wet {
                "Reduce watering due to expected rainfall"
            } else {
                "Monitor soil moisture levels regularly"
            }
            .to_string(),
        },
        FieldAdvisory {
            kind: AdvisoryKind::Planting,
            favorable: mild,
            message: if mild {
                "Good conditions for planting most crops"
            } else {
                "Consider temperature requirements for your crops"
            }
            .to_string(),
        },
        FieldAdvisory {
            kind: AdvisoryKind::Harvesting,
            favorable: dry,
            message: if dry {
                "Good conditions for harvesting activities"
            } else {
                "Delay harvesting until drier conditions"
            }
            .to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::WeatherCondition;

    fn create_test_forecast(days: usize) -> Vec<WeatherDay> {
        (0..days)
            .map(|i| {
                let mut day = WeatherDay::new(&format!("2024-03-{:02}", 15 + i), 60.0 + i as f64, WeatherCondition::Sunny);
                day.precipitation = 10.0 * i as f64;
                day.humidity = 50.0;
                day.wind_speed = 4.0;
                day
            })
            .collect()
    }

    #[test]
    fn test_current_and_outlook() {
        let forecast = create_test_forecast(7);

        assert_eq!(current_day(&forecast).map(|d| d.date.as_str()), Some("2024-03-15"));

        let next = outlook(&forecast, DEFAULT_FORECAST_DAYS);
        assert_eq!(next.len(), 5);
        assert_eq!(next[0].date, "2024-03-16");
        assert_eq!(next[4].date, "2024-03-20");

        assert_eq!(outlook(&forecast[..3], 5).len(), 2);
        assert!(outlook(&[], 5).is_empty());
        assert!(current_day(&[]).is_none());
    }

    #[test]
    fn test_averages() {
        let forecast = create_test_forecast(3);
        let avg = forecast_averages(&forecast).unwrap();

        assert_eq!(avg.temperature, 61.0);
        assert_eq!(avg.precipitation, 10.0);
        assert_eq!(avg.humidity, 50.0);
        assert_eq!(avg.wind_speed, 4.0);
        assert_eq!(avg.days, 3);

        assert!(forecast_averages(&[]).is_none());
    }

    #[test]
    fn test_advisories() {
        let mut day = WeatherDay::new("2024-03-15", 80.0, WeatherCondition::Rainy);
        day.precipitation = 60.0;

        let advice = field_advisories(&day);
        assert_eq!(advice.len(), 3);
        assert_eq!(advice[0].message, "Reduce watering due to expected rainfall");
        assert!(advice[1].favorable);
        assert_eq!(advice[2].message, "Delay harvesting until drier conditions");

        day.precipitation = 29.0;
        day.temperature = 81.0;
        let advice = field_advisories(&day);
        assert_eq!(advice[0].message, "Monitor soil moisture levels regularly");
        assert_eq!(advice[1].message, "Consider temperature requirements for your crops");
        assert!(advice[2].favorable);
    }
}
