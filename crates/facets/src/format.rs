//! Currency formatting for badge labels.

/// Formats a price for display.
pub trait PriceFormatter {
    fn format_price(&self, amount: f64) -> String;
}

/// Indonesian rupiah: `Rp 20.000`, `Rp 1.250,5`.
///
/// `.` groups thousands, `,` separates decimals, at most three fraction digits
/// with trailing zeros dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RupiahFormatter {
    prefix: String,
}

impl RupiahFormatter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for RupiahFormatter {
    fn default() -> Self {
        Self::new("Rp")
    }
}

impl PriceFormatter for RupiahFormatter {
    fn format_price(&self, amount: f64) -> String {
        let millis = (amount.max(0.0) * 1000.0).round() as u64;
        let whole = group_thousands(millis / 1000);
        let fraction = millis % 1000;

        let number = if fraction == 0 {
            whole
        } else {
            let digits = format!("{fraction:03}");
            format!("{whole},{}", digits.trim_end_matches('0'))
        };

        if self.prefix.is_empty() {
            number
        } else {
            format!("{} {number}", self.prefix)
        }
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
