//! Dollar formatting shared by the reference-table context strings and the
//! CLI report.

/// Inserts `,` between every group of three digits, e.g. `1,234,567`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Whole dollars as Canadian currency, e.g. `-$1,234`.
pub fn format_cad(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(amount.unsigned_abs()))
}

/// Dollars and cents as Canadian currency, e.g. `$2,778.12`.
pub fn format_cad_cents(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}${}.{:02}",
        group_thousands(cents / 100),
        cents % 100
    )
}
