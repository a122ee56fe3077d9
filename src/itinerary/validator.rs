//! Structural validation of a parsed model reply.

use serde_json::{Map, Value};

use crate::domain::itinerary::{DayPlan, ItineraryDocument, ItineraryPlan, MISSING_DETAILS};
use crate::error::SchemaViolation;

/// Interpret a parsed reply as an itinerary or an out-of-region rejection.
///
/// A `valid: false` document is a normal outcome, not a violation. Only the
/// shape is checked; place names are never looked up.
pub fn validate(value: &Value) -> Result<ItineraryDocument, SchemaViolation> {
    let obj = value
        .as_object()
        .ok_or_else(|| SchemaViolation::new("reply is not an object"))?;

    match obj.get("valid") {
        Some(Value::Bool(false)) => {
            let error = obj
                .get("error")
                .and_then(Value::as_str)
                .ok_or_else(|| SchemaViolation::new("rejection without an error message"))?;
            Ok(ItineraryDocument::Rejected {
                error: error.to_string(),
            })
        }
        None | Some(Value::Bool(true)) => validate_plan(obj).map(ItineraryDocument::Plan),
        Some(other) => Err(SchemaViolation::new(format!(
            "`valid` must be a boolean, got {}",
            other
        ))),
    }
}

fn validate_plan(obj: &Map<String, Value>) -> Result<ItineraryPlan, SchemaViolation> {
    let days = obj
        .get("itinerary")
        .and_then(Value::as_array)
        .ok_or_else(|| SchemaViolation::new("`itinerary` is missing or not a list"))?;

    let itinerary = days
        .iter()
        .enumerate()
        .map(|(i, day)| day_plan(i, day))
        .collect::<Result<Vec<_>, _>>()?;

    let location_names = match obj.get("location_names") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(names)) => names
            .iter()
            .map(|name| {
                name.as_str()
                    .map(|s| s.trim().to_string())
                    .ok_or_else(|| SchemaViolation::new("`location_names` must hold strings"))
            })
            .filter(|name| !matches!(name, Ok(s) if s.is_empty()))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(SchemaViolation::new("`location_names` is not a list")),
    };

    let city_name = obj
        .get("city_name")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(ItineraryPlan {
        city_name,
        itinerary,
        location_names,
    })
}

fn day_plan(index: usize, value: &Value) -> Result<DayPlan, SchemaViolation> {
    let entry = value
        .as_object()
        .ok_or_else(|| SchemaViolation::new(format!("itinerary[{}] is not an object", index)))?;

    let day = entry
        .get("day")
        .and_then(day_number)
        .filter(|d| *d > 0)
        .and_then(|d| u32::try_from(d).ok())
        .ok_or_else(|| {
            SchemaViolation::new(format!("itinerary[{}] has no positive `day`", index))
        })?;

    let details = match entry.get("details") {
        None | Some(Value::Null) => MISSING_DETAILS.to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => MISSING_DETAILS.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) if parts.iter().all(Value::is_string) => parts
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
        Some(_) => {
            return Err(SchemaViolation::new(format!(
                "itinerary[{}].details is not text",
                index
            )))
        }
    };

    Ok(DayPlan { day, details })
}

/// Whole day number from `1`, `1.0`, `"1"` or `"Day 1"`.
fn day_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 1.0 && f.fract() == 0.0 && *f <= u32::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| {
                let digits: String = s
                    .trim_start_matches(|c: char| !c.is_ascii_digit())
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect();
                digits.parse().ok()
            })
        }
        _ => None,
    }
}
