//! Naira amount formatting for notification copy.

/// The naira sign.
pub const NAIRA: char = '₦';

/// Format an amount as naira with thousands separators.
///
/// Whole amounts print without decimals (`₦15,000`); fractional amounts are
/// rounded to kobo (`₦1,250.50`). Negative amounts keep their sign in front
/// of the currency symbol.
pub fn format_naira(amount: f64) -> String {
    let kobo_total = (amount.abs() * 100.0).round() as u64;
    let naira = kobo_total / 100;
    let kobo = kobo_total % 100;

    let digits = naira.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && kobo_total > 0 { "-" } else { "" };
    if kobo == 0 {
        format!("{sign}{NAIRA}{grouped}")
    } else {
        format!("{sign}{NAIRA}{grouped}.{kobo:02}")
    }
}
