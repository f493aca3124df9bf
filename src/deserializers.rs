//! Custom deserializers for the intake form payload.
//!
//! The form submits everything as strings and arrays built from checkboxes, so the
//! profile accepts a few equivalent encodings. Model output is decoded strictly
//! elsewhere; nothing here is used for it.

use serde::{Deserialize, Deserializer};

/// Deserializes the age field from a JSON number or a numeric string.
///
/// # Accepted Formats
///
/// * **Integer**: `20`
/// * **Integral float**: `20.0`
/// * **String numeric**: `"20"`, `" 20 "`
///
/// # Errors
///
/// Returns an error for negative or fractional values, empty strings and anything
/// that does not parse as a whole number. Range checks (15-100) belong to the form.
pub fn de_age<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let v = serde_json::Value::deserialize(deserializer)?;
    match v {
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u32::try_from(u).map_err(|_| D::Error::custom("age out of range"))
            } else if let Some(f) = n.as_f64() {
                if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
                    Ok(f as u32)
                } else {
                    Err(D::Error::custom(format!("invalid age: {f}")))
                }
            } else {
                Err(D::Error::custom("invalid age: negative"))
            }
        }
        serde_json::Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Err(D::Error::custom("age is empty"));
            }
            s.parse::<u32>()
                .map_err(|_| D::Error::custom(format!("invalid age value: '{}'", s)))
        }
        other => Err(D::Error::custom(format!("invalid type for age: {}", other))),
    }
}

/// Deserializes a set of labels (interests, skills, hobbies).
///
/// `null` or a missing field becomes an empty list, a single string becomes a
/// one-element list. Entries are trimmed, blanks dropped and duplicates removed
/// keeping first-seen order.
pub fn de_label_set<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let opt = Option::<serde_json::Value>::deserialize(deserializer)?;
    let raw = match opt {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::String(s)) => vec![s],
        Some(serde_json::Value::Array(arr)) => {
            let mut out = Vec::with_capacity(arr.len());
            for el in arr {
                match el {
                    serde_json::Value::String(s) => out.push(s),
                    other => {
                        return Err(D::Error::custom(format!(
                            "invalid label entry: {}",
                            other
                        )));
                    }
                }
            }
            out
        }
        Some(other) => {
            return Err(D::Error::custom(format!(
                "invalid type for label set: {}",
                other
            )));
        }
    };

    let mut labels: Vec<String> = Vec::with_capacity(raw.len());
    for label in raw {
        let label = label.trim();
        if !label.is_empty() && !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }
    Ok(labels)
}

/// Deserializes optional free text; `null` becomes an empty string.
pub fn de_optional_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}
