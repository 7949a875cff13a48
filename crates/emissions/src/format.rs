/// Formats with two decimals and `,` thousands separators: `1234567.891` → `"1,234,567.89"`.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::format_thousands;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_thousands(0.0), "0.00");
        assert_eq!(format_thousands(999.994), "999.99");
        assert_eq!(format_thousands(999.999), "1,000.00");
        assert_eq!(format_thousands(1234567.891), "1,234,567.89");
        assert_eq!(format_thousands(100000.0), "100,000.00");
    }

    #[test]
    fn keeps_sign_only_when_visible() {
        assert_eq!(format_thousands(-4321.5), "-4,321.50");
        assert_eq!(format_thousands(-0.001), "0.00");
    }
}
