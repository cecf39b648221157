const CRORE: f64 = 10_000_000.0;
const LAKH: f64 = 100_000.0;
const THOUSAND: f64 = 1_000.0;

/// Whole rupees with Indian digit grouping, e.g. `₹1,00,00,000`.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    format!("{sign}₹{}", group_indian(&digits))
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}

pub fn format_number_with_units(value: f64) -> String {
    let (scale, suffix) = if value >= CRORE {
        (CRORE, "Cr")
    } else if value >= LAKH {
        (LAKH, "L")
    } else {
        (THOUSAND, "K")
    };

    let fixed = format!("{:.2}", value / scale);
    match fixed.parse::<f64>() {
        Ok(parsed) if parsed.fract() == 0.0 => format!("{parsed:.0}{suffix}"),
        _ => format!("{fixed}{suffix}"),
    }
}

/// Parses user-typed or previously formatted input (`"1,50,000"`,
/// `"₹ 2.5L"` stripped to `2.5`) back into a plain number.
pub fn parse_formatted_value(input: &str) -> Option<f64> {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn format_years_fraction(year_fraction: f64) -> String {
    let mut years = year_fraction.max(0.0).floor() as u64;
    let mut months = ((year_fraction.max(0.0) - years as f64) * 12.0).round() as u64;
    if months == 12 {
        years += 1;
        months = 0;
    }

    match (years, months) {
        (years, 0) => format!("{years} years"),
        (0, months) => format!("{months} months"),
        (years, months) => format!("{years} years, {months} months"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_uses_indian_grouping() {
        assert_eq!(format_currency(0.0), "₹0");
        assert_eq!(format_currency(999.4), "₹999");
        assert_eq!(format_currency(1_000.0), "₹1,000");
        assert_eq!(format_currency(150_000.0), "₹1,50,000");
        assert_eq!(format_currency(10_000_000.0), "₹1,00,00,000");
        assert_eq!(format_currency(123_456_789.6), "₹12,34,56,790");
        assert_eq!(format_currency(-25_000.0), "-₹25,000");
    }

    #[test]
    fn units_pick_largest_scale_and_trim_whole_values() {
        assert_eq!(format_number_with_units(50_000_000.0), "5Cr");
        assert_eq!(format_number_with_units(15_000_000.0), "1.50Cr");
        assert_eq!(format_number_with_units(250_000.0), "2.50L");
        assert_eq!(format_number_with_units(100_000.0), "1L");
        assert_eq!(format_number_with_units(15_000.0), "15K");
        assert_eq!(format_number_with_units(1_234.0), "1.23K");
    }

    #[test]
    fn parse_strips_grouping_units_and_symbols() {
        assert_eq!(parse_formatted_value("1,50,000"), Some(150_000.0));
        assert_eq!(parse_formatted_value("₹ 12,000"), Some(12_000.0));
        assert_eq!(parse_formatted_value("2.5 L"), Some(2.5));
        assert_eq!(parse_formatted_value("12%"), Some(12.0));
        assert_eq!(parse_formatted_value("abc"), None);
        assert_eq!(parse_formatted_value(""), None);
    }

    #[test]
    fn years_fraction_renders_years_and_months() {
        assert_eq!(format_years_fraction(3.0), "3 years");
        assert_eq!(format_years_fraction(0.5), "6 months");
        assert_eq!(format_years_fraction(2.25), "2 years, 3 months");
        assert_eq!(format_years_fraction(4.99), "5 years");
        assert_eq!(format_years_fraction(0.0), "0 years");
    }
}
