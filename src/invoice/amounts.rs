//! Numeric derivation for rent bills.
//!
//! All money is whole rupees (`i64`). The derivation chain is:
//! rent = round(area x rate), each GST half = round(rent x pct / 100),
//! grand total = rent + SGST + CGST. Rounding happens exactly once per
//! figure, so repeated recomputation is drift-free.

/// Parse an operator-entered decimal field.
///
/// Empty, malformed, and negative input all count as zero; the billing
/// form never rejects keystrokes, it just derives nothing from them.
pub fn parse_decimal(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

/// Round a computed value to the nearest whole currency unit.
pub fn round_currency(value: f64) -> i64 {
    value.round() as i64
}

/// The derived figures of a rent bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillFigures {
    pub rent_amount: i64,
    pub sgst_amount: i64,
    pub cgst_amount: i64,
    pub grand_total: i64,
}

impl BillFigures {
    /// Full cascade: area and rate give the rent amount, the rent amount
    /// gives both tax amounts, everything sums into the total.
    pub fn derive(rented_area: f64, rent_rate: f64, sgst_rate: f64, cgst_rate: f64) -> Self {
        let rent_amount = round_currency(rented_area * rent_rate);
        Self::from_rent_amount(rent_amount, sgst_rate, cgst_rate)
    }

    /// Partial cascade for a directly edited rent amount: only the tax
    /// amounts and the total are recomputed.
    pub fn from_rent_amount(rent_amount: i64, sgst_rate: f64, cgst_rate: f64) -> Self {
        let sgst_amount = round_currency(rent_amount as f64 * sgst_rate / 100.0);
        let cgst_amount = round_currency(rent_amount as f64 * cgst_rate / 100.0);
        Self {
            rent_amount,
            sgst_amount,
            cgst_amount,
            grand_total: rent_amount + sgst_amount + cgst_amount,
        }
    }
}

/// Format a whole-rupee amount with Indian digit grouping.
///
/// The last three digits stand alone, every group above them is two
/// digits: 531000 renders as "5,31,000".
pub fn format_amount(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (front, back) = rest.split_at(rest.len() - 2);
            groups.push(back);
            rest = front;
        }
        groups.push(rest);
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_scenario() {
        let figures = BillFigures::derive(25000.0, 18.0, 9.0, 9.0);
        assert_eq!(figures.rent_amount, 450000);
        assert_eq!(figures.sgst_amount, 40500);
        assert_eq!(figures.cgst_amount, 40500);
        assert_eq!(figures.grand_total, 531000);
    }

    #[test]
    fn test_fractional_inputs_round_per_figure() {
        // 100.5 x 10.3 = 1035.15 -> 1035; 9% of 1035 = 93.15 -> 93
        let figures = BillFigures::derive(100.5, 10.3, 9.0, 9.0);
        assert_eq!(figures.rent_amount, 1035);
        assert_eq!(figures.sgst_amount, 93);
        assert_eq!(figures.cgst_amount, 93);
        assert_eq!(figures.grand_total, 1221);
    }

    #[test]
    fn test_recomputation_is_stable() {
        let first = BillFigures::derive(17320.0, 21.5, 9.0, 9.0);
        for _ in 0..100 {
            let again = BillFigures::derive(17320.0, 21.5, 9.0, 9.0);
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_direct_rent_edit_cascades_taxes_only() {
        let figures = BillFigures::from_rent_amount(500000, 9.0, 9.0);
        assert_eq!(figures.rent_amount, 500000);
        assert_eq!(figures.sgst_amount, 45000);
        assert_eq!(figures.grand_total, 590000);
    }

    #[test]
    fn test_asymmetric_tax_rates() {
        let figures = BillFigures::from_rent_amount(10000, 6.0, 9.0);
        assert_eq!(figures.sgst_amount, 600);
        assert_eq!(figures.cgst_amount, 900);
        assert_eq!(figures.grand_total, 11500);
    }

    #[test]
    fn test_zero_inputs() {
        let figures = BillFigures::derive(0.0, 0.0, 9.0, 9.0);
        assert_eq!(figures.grand_total, 0);
    }

    #[test]
    fn test_parse_decimal_lenient() {
        assert_eq!(parse_decimal("25000"), 25000.0);
        assert_eq!(parse_decimal(" 18.5 "), 18.5);
        assert_eq!(parse_decimal(""), 0.0);
        assert_eq!(parse_decimal("abc"), 0.0);
        assert_eq!(parse_decimal("-40"), 0.0);
        assert_eq!(parse_decimal("NaN"), 0.0);
    }

    #[test]
    fn test_format_amount_indian_grouping() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(1000), "1,000");
        assert_eq!(format_amount(531000), "5,31,000");
        assert_eq!(format_amount(12345678), "1,23,45,678");
        assert_eq!(format_amount(1000000000), "1,00,00,00,000");
    }
}
