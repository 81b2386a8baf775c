use std::borrow::Cow;

/// Escapes text for use inside HTML/SVG element content or quoted attributes.
pub fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(|c| matches!(c, '&' | '<' | '>' | '"' | '\'')) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Formats a coordinate or tick value with at most `decimals` places,
/// dropping trailing zeros (`12.50` -> `12.5`, `3.00` -> `3`).
pub fn trim_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };
    match trimmed {
        "-0" => "0".to_owned(),
        other => other.to_owned(),
    }
}
