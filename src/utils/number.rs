use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Round to `places` decimals on the exact value of `value`, ties to even.
/// Non-finite and out-of-range values pass through unchanged.
pub fn round_to(value: f64, places: u32) -> f64 {
    let Some(exact) = Decimal::from_f64_retain(value) else {
        return value;
    };
    // Parse the decimal text so the result is the nearest f64 to the rounded value.
    exact
        .round_dp(places)
        .to_string()
        .parse::<f64>()
        .unwrap_or(value)
}

/// Read a JSON number or numeric string. Anything else, including null, is `None`.
pub fn lenient_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// `deserialize_with` adapter for optional rate fields submitted by the browser form,
/// which may arrive as numbers, strings or nulls.
pub fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_f64(&value))
}

/// Like [`deserialize_lenient_f64`] but missing or unusable values become `0.0`.
pub fn deserialize_lenient_f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_f64(&value).unwrap_or(0.0))
}

/// Strings pass through, null becomes empty, numbers are stringified.
pub fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Same as [`deserialize_lenient_f64`] for flags: accepts booleans, 0/1 and "true"/"false".
pub fn deserialize_lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(6.123456, 4), 6.1235);
        assert_eq!(round_to(106000.004, 2), 106000.0);
        assert_eq!(round_to(-1.005001, 2), -1.01);
        assert!(round_to(f64::NAN, 2).is_nan());
        assert_eq!(round_to(f64::INFINITY, 2), f64::INFINITY);
    }

    #[test]
    fn test_round_to_exact_ties_go_to_even() {
        assert_eq!(round_to(500.125, 2), 500.12);
        assert_eq!(round_to(500.375, 2), 500.38);
        assert_eq!(round_to(0.5, 0), 0.0);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(-2.5, 0), -2.0);
        // 2.675 is stored just below the tie
        assert_eq!(round_to(2.675, 2), 2.67);
    }

    #[test]
    fn test_lenient_f64() {
        assert_eq!(lenient_f64(&json!(8.5)), Some(8.5));
        assert_eq!(lenient_f64(&json!(" 6 ")), Some(6.0));
        assert_eq!(lenient_f64(&json!("")), None);
        assert_eq!(lenient_f64(&json!("abc")), None);
        assert_eq!(lenient_f64(&json!(null)), None);
        assert_eq!(lenient_f64(&json!("NaN")), None);
        assert_eq!(lenient_f64(&json!([1])), None);
    }
}
