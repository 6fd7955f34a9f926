//! Display formatting for amounts and ratings

/// Format a budget in en-US style with a `$` prefix: grouped thousands and
/// up to three fraction digits, trailing zeros dropped.
pub fn format_budget(value: f64) -> String {
    let fixed = format!("{:.3}", value);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    format!("${}", group_thousands(trimmed))
}

/// Format a price with exactly two decimals, e.g. `$1,299.00`
pub fn format_price(value: f64) -> String {
    format!("${}", group_thousands(&format!("{:.2}", value)))
}

pub fn format_rating(rating: Option<f64>) -> String {
    match rating {
        Some(r) => format!("{:.2}", r),
        None => "-".to_string(),
    }
}

/// Insert `,` separators into the integer part of a plain decimal string
fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
