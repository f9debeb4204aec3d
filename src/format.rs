//! Number rounding and thousands-separator formatting for titles,
//! tooltips and color-bar ticks

/// Round `value` to `digits` decimal places; negative digits round to
/// tens, hundreds, ... (`round_to(149_962.0, -2) == 150_000.0`).
///
/// Halves round away from zero.
pub fn round_to(value: f64, digits: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    if digits >= 0 {
        let scale = 10f64.powi(digits);
        (value * scale).round() / scale
    } else {
        let scale = 10f64.powi(-digits);
        (value / scale).round() * scale
    }
}

/// Insert `,` between every group of three integer digits
pub fn group_thousands(digits: &str) -> String {
    let (sign, body) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (body, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Round and render a value the way panel titles show it:
/// `format_rounded(149_962.0, -2) == "150,000"`, `format_rounded(23.46, 1) == "23.5"`.
///
/// Trailing fractional zeros are dropped, so 23.0 renders as "23".
pub fn format_rounded(value: f64, digits: i32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let rounded = round_to(value, digits);
    let mut text = format!("{:.*}", digits.max(0) as usize, rounded);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    group_thousands(&text)
}

/// Whole number with separators, the `0,0` numeral format
pub fn format_numeral(value: f64) -> String {
    format_rounded(value, 0)
}
