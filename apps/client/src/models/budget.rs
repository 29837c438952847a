use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// A number-like budget amount, kept in the form the service or user gave it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Amount {
    Number(Number),
    Text(String),
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Text(String::new())
    }
}

impl Amount {
    /// Numeric value used for display and totals; anything unparseable is 0.
    pub fn value(&self) -> f64 {
        let parsed = match self {
            Amount::Number(n) => n.as_f64(),
            Amount::Text(s) => parse_float_prefix(s),
        };
        parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

impl From<Value> for Amount {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => Amount::Number(n),
            Value::String(s) => Amount::Text(s),
            Value::Null => Amount::default(),
            other => Amount::Text(other.to_string()),
        }
    }
}

impl From<&str> for Amount {
    fn from(raw: &str) -> Self {
        Amount::Text(raw.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Amount::from)
    }
}

/// One line of the cost budget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub item: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default)]
    pub amount: Amount,
    /// Any other keys the service attached; sent back unchanged on export.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Leading-number parse: skips leading whitespace, then reads the longest
/// prefix that forms a decimal number ("12.5 USD" is 12.5, "abc" is None).
pub fn parse_float_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}
