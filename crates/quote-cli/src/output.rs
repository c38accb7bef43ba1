//! Output helpers shared by all commands.

use quote_engine::Money;
use serde::Serialize;

use crate::OutputFormat;

/// Print a result as pretty JSON. Text output is written by each command.
pub fn print<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    if let OutputFormat::Json = format {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize output: {}", e),
        }
    }
}

/// Format an amount for display.
///
/// Chilean pesos have no minor unit and use `.` as the thousands separator
/// (`$64.990`); anything else is printed with two decimals and its code.
pub fn format_money(amount: Money, currency: &str) -> String {
    if currency.eq_ignore_ascii_case("CLP") {
        format!("${}", group_thousands(amount.amount().round() as u64, '.'))
    } else {
        format!("{:.2} {}", amount.amount(), currency)
    }
}

fn group_thousands(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}
