//! Umbrella recommendation rules over weatherapi.com forecast payloads

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::models::Umbrella;
use crate::{HaikuError, Result};

/// Number of upcoming forecast hours inspected by the onboard report
pub const LOOKAHEAD_HOURS: usize = 6;

/// Chance of rain (percent) above which an umbrella is advised
pub const RAIN_THRESHOLD: f64 = 50.0;

const HOUR_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Rain outlook for the next few hours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RainOutlook {
    /// Highest chance of rain among the inspected hours, in percent
    pub rain_probability: u32,
    pub umbrella: Umbrella,
}

/// Reads a numeric field that the provider may send as a number or a
/// numeric string.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Reads a day summary field. Only JSON numbers and booleans count; text
/// such as `"0.4"` is malformed and yields `None`.
fn day_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn first_forecast_day(forecast: &Value) -> Option<&Value> {
    forecast.get("forecast")?.get("forecastday")?.get(0)
}

fn hour_instant(hour: &Value) -> Option<DateTime<Utc>> {
    if let Some(epoch) = hour.get("time_epoch").and_then(Value::as_i64) {
        return DateTime::from_timestamp(epoch, 0);
    }
    let time = hour.get("time")?.as_str()?;
    NaiveDateTime::parse_from_str(time, HOUR_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Looks at the forecast hours at or after `now`, at most six of them.
///
/// The forecast payload must contain `forecast.forecastday[0].hour` and every
/// hour must carry a readable time; anything else is reported as a malformed
/// upstream payload.
pub fn next_hours_outlook(forecast: &Value, now: DateTime<Utc>) -> Result<RainOutlook> {
    let hours = first_forecast_day(forecast)
        .and_then(|day| day.get("hour"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            HaikuError::upstream("Malformed forecast payload: missing forecast.forecastday[0].hour")
        })?;

    let mut upcoming = Vec::with_capacity(LOOKAHEAD_HOURS);
    for hour in hours {
        let instant = hour_instant(hour).ok_or_else(|| {
            HaikuError::upstream("Malformed forecast payload: hour without a valid time")
        })?;
        if instant >= now {
            upcoming.push(hour);
            if upcoming.len() == LOOKAHEAD_HOURS {
                break;
            }
        }
    }

    let max_chance = upcoming
        .iter()
        .filter_map(|hour| hour.get("chance_of_rain").and_then(number))
        .fold(0.0_f64, f64::max);

    let will_rain = upcoming.iter().any(|hour| {
        hour.get("will_it_rain")
            .and_then(number)
            .is_some_and(|flag| flag != 0.0)
    });

    Ok(RainOutlook {
        rain_probability: max_chance.round().clamp(0.0, 100.0) as u32,
        umbrella: Umbrella::from(max_chance > RAIN_THRESHOLD || will_rain),
    })
}

/// Daily recommendation from `forecast.forecastday[0].day`.
///
/// Missing or malformed fields, including numbers sent as text, count as
/// "no rain"; this never fails.
#[must_use]
pub fn daily_umbrella(forecast: &Value) -> Umbrella {
    let Some(day) = first_forecast_day(forecast).and_then(|d| d.get("day")) else {
        return Umbrella::No;
    };
    let field = |name: &str| day.get(name).and_then(day_number);

    let will_rain = field("daily_will_it_rain").is_some_and(|flag| flag == 1.0);
    let precipitation = field("totalprecip_mm").is_some_and(|mm| mm > 0.0);
    let likely = field("daily_chance_of_rain").is_some_and(|chance| chance > RAIN_THRESHOLD);

    Umbrella::from(will_rain || precipitation || likely)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap()
    }

    /// Full day of hourly entries starting at midnight
    fn forecast_with(chances: &[u32], will_rain: &[u8]) -> Value {
        let hours: Vec<Value> = (0..24)
            .map(|h| {
                json!({
                    "time_epoch": at(h).timestamp(),
                    "time": format!("2025-06-01 {h:02}:00"),
                    "chance_of_rain": chances.get(h as usize).copied().unwrap_or(0),
                    "will_it_rain": will_rain.get(h as usize).copied().unwrap_or(0),
                })
            })
            .collect();
        json!({ "forecast": { "forecastday": [ { "day": {}, "hour": hours } ] } })
    }

    #[test]
    fn test_max_chance_over_next_six_hours() {
        let mut chances = vec![0; 24];
        chances[8..14].copy_from_slice(&[10, 60, 5, 0, 0, 0]);
        let outlook = next_hours_outlook(&forecast_with(&chances, &[]), at(8)).unwrap();
        assert_eq!(outlook.rain_probability, 60);
        assert_eq!(outlook.umbrella, Umbrella::Yes);
    }

    #[test]
    fn test_dry_hours() {
        let outlook = next_hours_outlook(&forecast_with(&[], &[]), at(8)).unwrap();
        assert_eq!(outlook.rain_probability, 0);
        assert_eq!(outlook.umbrella, Umbrella::No);
    }

    #[test]
    fn test_only_six_hours_are_inspected() {
        let mut chances = vec![0; 24];
        chances[14] = 90;
        let outlook = next_hours_outlook(&forecast_with(&chances, &[]), at(8)).unwrap();
        assert_eq!(outlook.rain_probability, 0);
        assert_eq!(outlook.umbrella, Umbrella::No);
    }

    #[test]
    fn test_past_hours_are_ignored() {
        let mut chances = vec![0; 24];
        chances[7] = 95;
        let outlook = next_hours_outlook(&forecast_with(&chances, &[]), at(8)).unwrap();
        assert_eq!(outlook.rain_probability, 0);
    }

    #[test]
    fn test_will_it_rain_flag_forces_umbrella() {
        let mut flags = vec![0; 24];
        flags[10] = 1;
        let mut chances = vec![0; 24];
        chances[10] = 30;
        let outlook = next_hours_outlook(&forecast_with(&chances, &flags), at(8)).unwrap();
        assert_eq!(outlook.rain_probability, 30);
        assert_eq!(outlook.umbrella, Umbrella::Yes);
    }

    #[test]
    fn test_exactly_fifty_percent_is_not_enough() {
        let mut chances = vec![0; 24];
        chances[9] = 50;
        let outlook = next_hours_outlook(&forecast_with(&chances, &[]), at(8)).unwrap();
        assert_eq!(outlook.umbrella, Umbrella::No);
    }

    #[test]
    fn test_no_remaining_hours_defaults_to_zero() {
        let late = Utc.with_ymd_and_hms(2025, 6, 2, 1, 0, 0).unwrap();
        let outlook = next_hours_outlook(&forecast_with(&[100; 24], &[1; 24]), late).unwrap();
        assert_eq!(outlook.rain_probability, 0);
        assert_eq!(outlook.umbrella, Umbrella::No);
    }

    #[test]
    fn test_time_string_fallback_and_string_numbers() {
        let forecast = json!({ "forecast": { "forecastday": [ { "hour": [
            { "time": "2025-06-01 09:00", "chance_of_rain": "72", "will_it_rain": 0 },
        ] } ] } });
        let outlook = next_hours_outlook(&forecast, at(8)).unwrap();
        assert_eq!(outlook.rain_probability, 72);
        assert_eq!(outlook.umbrella, Umbrella::Yes);
    }

    #[test]
    fn test_missing_hours_is_an_upstream_error() {
        let err = next_hours_outlook(&json!({ "forecast": {} }), at(8)).unwrap_err();
        assert!(err.is_payload_error());
        assert!(err.to_string().contains("Malformed forecast payload"));
    }

    #[test]
    fn test_hour_without_time_is_an_upstream_error() {
        let forecast = json!({ "forecast": { "forecastday": [ { "hour": [ { "chance_of_rain": 10 } ] } ] } });
        assert!(next_hours_outlook(&forecast, at(8)).is_err());
    }

    fn day(fields: Value) -> Value {
        json!({ "forecast": { "forecastday": [ { "day": fields, "hour": [] } ] } })
    }

    #[rstest]
    #[case(json!({ "daily_chance_of_rain": 80, "daily_will_it_rain": 0, "totalprecip_mm": 0.0 }), Umbrella::Yes)]
    #[case(json!({ "daily_chance_of_rain": 80 }), Umbrella::Yes)]
    #[case(json!({ "daily_will_it_rain": 1 }), Umbrella::Yes)]
    #[case(json!({ "totalprecip_mm": 0.3 }), Umbrella::Yes)]
    #[case(json!({ "daily_chance_of_rain": 50, "daily_will_it_rain": 0, "totalprecip_mm": 0.0 }), Umbrella::No)]
    #[case(json!({}), Umbrella::No)]
    #[case(json!({ "daily_chance_of_rain": null, "totalprecip_mm": [1] }), Umbrella::No)]
    #[case(json!({ "totalprecip_mm": "0.4" }), Umbrella::No)]
    #[case(json!({ "daily_will_it_rain": "1", "daily_chance_of_rain": "90" }), Umbrella::No)]
    #[case(json!({ "daily_will_it_rain": true }), Umbrella::Yes)]
    fn test_daily_umbrella(#[case] fields: Value, #[case] expected: Umbrella) {
        assert_eq!(daily_umbrella(&day(fields)), expected);
    }

    #[test]
    fn test_daily_umbrella_tolerates_missing_forecast() {
        assert_eq!(daily_umbrella(&json!({})), Umbrella::No);
        assert_eq!(daily_umbrella(&json!({ "forecast": { "forecastday": [] } })), Umbrella::No);
        assert_eq!(daily_umbrella(&json!("garbage")), Umbrella::No);
    }
}
