//! Number formatting for labels and axis ticks.

/// Thousands-separated, e.g. `1234567.5` → `1,234,567.5`.
pub fn thousands(v: f64) -> String {
    if !v.is_finite() {
        return "NaN".to_string();
    }
    let rounded = (v * 100.0).round() / 100.0;
    let negative = rounded < 0.0;
    let abs = rounded.abs();
    let int = abs.trunc() as u64;
    let frac = abs - abs.trunc();

    let digits = int.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if frac > 0.0 {
        let decimals = format!("{:.2}", frac);
        out.push_str(decimals.trim_start_matches('0').trim_end_matches('0'));
    }
    out
}

/// A 0..1 fraction as a whole percentage.
pub fn percent(fraction: f64) -> String {
    format!("{}%", (fraction * 100.0).round() as i64)
}

/// Shortest plain form: integers without decimals, others with up to three.
pub fn general(v: f64) -> String {
    crate::path::num(v)
}

/// Percentage with one decimal, as the stream labels show it.
pub fn percent_one_decimal(p: f64) -> String {
    let rounded = (p * 10.0).round() / 10.0;
    format!("{}%", general(rounded))
}
