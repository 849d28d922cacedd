//! Deserializers for API and config fields that arrive as either JSON numbers
//! or strings.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberOrString {
    fn into_string(self) -> String {
        match self {
            NumberOrString::Int(n) => n.to_string(),
            NumberOrString::Float(f) => f.to_string(),
            NumberOrString::Text(s) => s,
        }
    }
}

/// Accepts `110001` or `"110001"` and yields `"110001"`.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrString::deserialize(deserializer).map(NumberOrString::into_string)
}

/// Same as [`string`], element-wise.
pub fn string_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<NumberOrString>::deserialize(deserializer)?;
    Ok(values.into_iter().map(NumberOrString::into_string).collect())
}

/// Accepts integers, floats (truncated) and numeric strings.
pub fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(n) => Ok(n),
        NumberOrString::Float(f) => Ok(f.trunc() as i64),
        NumberOrString::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("expected an integer, got {s:?}"))),
    }
}
