use bigdecimal::{BigDecimal, RoundingMode, Zero};

/// Derive the unit price of a custom-request product from the admin-entered
/// total. A zero quantity falls back to the total itself rather than
/// dividing by zero.
///
/// Full precision is kept; rounding happens only in [`format_price`].
pub fn per_unit_price(total: &BigDecimal, quantity: u32) -> BigDecimal {
    if quantity > 0 {
        total.clone() / BigDecimal::from(quantity)
    } else {
        total.clone()
    }
}

/// Render a price with two decimal places (half-up) and thousands
/// separators, e.g. `1234567.8912` → `"1,234,567.89"`.
pub fn format_price(price: &BigDecimal) -> String {
    let rounded = price.with_scale_round(2, RoundingMode::HalfUp).to_string();
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (rounded, "00".to_string()),
    };
    let negative = int_part.starts_with('-');
    let digits = int_part.trim_start_matches('-');

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// True when a price is usable as a product price or transaction amount.
pub fn is_valid_price(price: &BigDecimal) -> bool {
    price > &BigDecimal::zero()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    // ── per_unit_price ────────────────────────────────────────────────────────

    #[test]
    fn divides_total_by_quantity() {
        assert_eq!(per_unit_price(&dec("150.00"), 3), dec("50.00"));
    }

    #[test]
    fn zero_quantity_returns_total_unchanged() {
        assert_eq!(per_unit_price(&dec("150.00"), 0), dec("150.00"));
    }

    #[test]
    fn quantity_one_is_identity() {
        assert_eq!(per_unit_price(&dec("9.99"), 1), dec("9.99"));
    }

    #[test]
    fn non_terminating_division_keeps_precision() {
        // 100 / 3 is periodic; the derived price must not collapse to 33.33
        let per_unit = per_unit_price(&dec("100"), 3);
        assert!(per_unit > dec("33.33"));
        assert!(per_unit < dec("33.34"));
    }

    // ── format_price ──────────────────────────────────────────────────────────

    #[test]
    fn formats_two_decimal_places() {
        assert_eq!(format_price(&dec("50")), "50.00");
        assert_eq!(format_price(&dec("0.005")), "0.01");
    }

    #[test]
    fn groups_thousands_with_commas() {
        assert_eq!(format_price(&dec("1234567.8912")), "1,234,567.89");
        assert_eq!(format_price(&dec("1000")), "1,000.00");
        assert_eq!(format_price(&dec("999.99")), "999.99");
    }

    #[test]
    fn keeps_sign_out_of_the_grouping() {
        assert_eq!(format_price(&dec("-1234.5")), "-1,234.50");
    }

    // ── is_valid_price ────────────────────────────────────────────────────────

    #[test]
    fn rejects_zero_and_negative_prices() {
        assert!(is_valid_price(&dec("0.01")));
        assert!(!is_valid_price(&dec("0")));
        assert!(!is_valid_price(&dec("-5")));
    }
}
