//! Number formatting for the results view.

use crate::messages::Locale;

/// Group digits by thousands with the locale's separator
/// (`fr`: narrow no-break space, `en`: comma).
pub fn format_thousands(n: u64, locale: Locale) -> String {
    let separator = match locale {
        Locale::Fr => '\u{202f}',
        Locale::En => ',',
    };
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(separator);
        }
        result.push(ch);
    }
    result
}

/// Elapsed time with a unit suffix: `12.3` → `12.3s`.
pub fn format_seconds(seconds: f64) -> String {
    format!("{seconds}s")
}

/// Shortest representation of a backend number (`17.0` → `17`).
pub fn format_number(value: f64) -> String {
    value.to_string()
}
