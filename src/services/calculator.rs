//! Pure sale arithmetic. No I/O, no async, `Decimal` end to end; currency
//! never touches binary floating point.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::errors::ServiceError;

/// Totals for one basket line at the given tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Sale-level totals across all lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaleTotals {
    pub subtotal: Decimal,
    pub tax_total: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

const HUNDRED: Decimal = dec!(100);

/// Computes `subtotal = price * quantity`, `tax = subtotal * rate / 100`.
///
/// `tax_rate` is a percentage (17.0 means 17%). Quantity must be a positive
/// integer; zero or negative quantity is a caller error.
pub fn line_totals(
    unit_price: Decimal,
    quantity: i32,
    tax_rate: Decimal,
) -> Result<LineTotals, ServiceError> {
    if quantity <= 0 {
        return Err(ServiceError::InvalidQuantity(format!(
            "line quantity must be positive, got {}",
            quantity
        )));
    }

    let subtotal = unit_price * Decimal::from(quantity);
    let tax = subtotal * tax_rate / HUNDRED;
    Ok(LineTotals {
        subtotal,
        tax,
        total: subtotal + tax,
    })
}

/// Folds line totals into sale totals and applies an absolute discount.
///
/// The discount must be non-negative but is otherwise passed through: a
/// discount larger than subtotal + tax yields a negative grand total, and
/// rejecting that is a policy question for the caller, not for arithmetic.
pub fn sale_totals(lines: &[LineTotals], discount: Decimal) -> Result<SaleTotals, ServiceError> {
    if discount < Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "discount_amount must not be negative, got {}",
            discount
        )));
    }

    let subtotal: Decimal = lines.iter().map(|l| l.subtotal).sum();
    let tax_total: Decimal = lines.iter().map(|l| l.tax).sum();
    Ok(SaleTotals {
        subtotal,
        tax_total,
        discount,
        total: subtotal + tax_total - discount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn computes_line_totals_at_seventeen_percent() {
        let line = line_totals(dec!(450.00), 2, dec!(17.0)).unwrap();
        assert_eq!(line.subtotal, dec!(900.00));
        assert_eq!(line.tax, dec!(153.000));
        assert_eq!(line.total, dec!(1053.000));
    }

    #[test]
    fn rejects_non_positive_quantities() {
        assert!(matches!(
            line_totals(dec!(10), 0, dec!(17.0)),
            Err(ServiceError::InvalidQuantity(_))
        ));
        assert!(matches!(
            line_totals(dec!(10), -3, dec!(17.0)),
            Err(ServiceError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn rejects_negative_discount() {
        let lines = [line_totals(dec!(10), 1, dec!(17.0)).unwrap()];
        assert!(matches!(
            sale_totals(&lines, dec!(-1)),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn discount_may_exceed_total() {
        let lines = [line_totals(dec!(10.00), 1, dec!(0)).unwrap()];
        let totals = sale_totals(&lines, dec!(25.00)).unwrap();
        assert_eq!(totals.total, dec!(-15.00));
    }

    #[test]
    fn zero_tax_rate_yields_zero_tax() {
        let line = line_totals(dec!(123.45), 3, Decimal::ZERO).unwrap();
        assert_eq!(line.tax, Decimal::ZERO);
        assert_eq!(line.total, line.subtotal);
    }

    fn money() -> impl Strategy<Value = Decimal> {
        // up to 99_999.99 with two decimal places
        (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    proptest! {
        #[test]
        fn total_is_subtotal_plus_tax_minus_discount(
            prices in prop::collection::vec(money(), 1..8),
            quantities in prop::collection::vec(1i32..50, 1..8),
            discount in money(),
        ) {
            let lines: Vec<LineTotals> = prices
                .iter()
                .zip(quantities.iter())
                .map(|(p, q)| line_totals(*p, *q, dec!(17.0)).unwrap())
                .collect();
            let totals = sale_totals(&lines, discount).unwrap();

            let expected_subtotal: Decimal = prices
                .iter()
                .zip(quantities.iter())
                .map(|(p, q)| *p * Decimal::from(*q))
                .sum();

            prop_assert_eq!(totals.subtotal, expected_subtotal);
            prop_assert_eq!(totals.total, totals.subtotal + totals.tax_total - totals.discount);
        }

        #[test]
        fn recomputation_is_exact(
            price in money(),
            quantity in 1i32..100,
        ) {
            // Decimal arithmetic must not drift across repeated aggregation.
            let first = line_totals(price, quantity, dec!(17.0)).unwrap();
            let mut sum = Decimal::ZERO;
            for _ in 0..quantity {
                sum += price;
            }
            prop_assert_eq!(first.subtotal, sum);
            for _ in 0..10 {
                let again = line_totals(price, quantity, dec!(17.0)).unwrap();
                prop_assert_eq!(first, again);
            }
        }
    }
}
