//! Score coercion and display helpers.

/// Raw cell value as it arrives from a table or an embedded literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawScore<'a> {
    Missing,
    Number(f64),
    Text(&'a str),
}

impl<'a> From<Option<&'a str>> for RawScore<'a> {
    fn from(cell: Option<&'a str>) -> Self {
        match cell {
            Some(text) => RawScore::Text(text),
            None => RawScore::Missing,
        }
    }
}

impl From<f64> for RawScore<'_> {
    fn from(value: f64) -> Self {
        RawScore::Number(value)
    }
}

/// Coerces a raw cell into a score. Total: anything unparseable yields `0.0`.
pub fn normalize<'a>(raw: impl Into<RawScore<'a>>) -> f64 {
    match raw.into() {
        RawScore::Missing => 0.0,
        RawScore::Number(value) if value.is_finite() => value,
        RawScore::Number(_) => 0.0,
        RawScore::Text(text) => parse_text(text),
    }
}

fn parse_text(text: &str) -> f64 {
    let trimmed = text.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    if digits.is_empty() {
        return 0.0;
    }
    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Formats a score as a percentage: integers without decimals, everything
/// else with exactly two.
pub fn format_percent(value: f64) -> String {
    let value = normalize(value);
    if value.fract() == 0.0 {
        format!("{value:.0}%")
    } else {
        format!("{value:.2}%")
    }
}
