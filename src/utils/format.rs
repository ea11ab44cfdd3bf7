/// `$1,234.56` style currency. Negative amounts render as `-$1,234.56`.
pub fn currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}", sign, grouped(amount.abs(), 2))
}

/// Thousands-grouped fixed-point number.
pub fn grouped(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (fixed.clone(), None),
    };
    let (neg, digits) = match int_part.strip_prefix('-') {
        Some(d) => (true, d.to_string()),
        None => (false, int_part),
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if neg {
        out.insert(0, '-');
    }
    match frac_part {
        Some(f) => format!("{}.{}", out, f),
        None => out,
    }
}

/// Percentage with an explicit sign, e.g. `+6.00%` / `-1.25%`.
pub fn signed_pct(value: f64) -> String {
    format!("{:+.2}%", value)
}
