//! Numeric coercion for user-entered amounts.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use std::str::FromStr;

/// Coerces any input to an amount. Never fails.
///
/// Absent values, `null`, blank or non-numeric strings, arrays and objects
/// become zero. Booleans become one or zero. Finite numbers beyond the
/// `Decimal` range clamp to [`Decimal::MAX`] or [`Decimal::MIN`].
pub fn num<'a>(v: impl Into<Option<&'a Value>>) -> Decimal {
    match v.into() {
        None | Some(Value::Null) => Decimal::ZERO,
        Some(Value::Bool(b)) => {
            if *b {
                Decimal::ONE
            } else {
                Decimal::ZERO
            }
        }
        Some(Value::Number(n)) => from_number(n),
        Some(Value::String(s)) => parse_amount(s),
        Some(Value::Array(_)) | Some(Value::Object(_)) => Decimal::ZERO,
    }
}

/// Parses a text amount, accepting plain and scientific notation.
pub fn parse_amount(s: &str) -> Decimal {
    let t = s.trim();
    if t.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(t)
        .or_else(|_| Decimal::from_scientific(t))
        .ok()
        .or_else(|| t.parse::<f64>().ok().map(from_float))
        .unwrap_or(Decimal::ZERO)
}

fn from_number(n: &Number) -> Decimal {
    if let Some(i) = n.as_i64() {
        return Decimal::from(i);
    }
    if let Some(u) = n.as_u64() {
        return Decimal::from(u);
    }
    n.as_f64().map(from_float).unwrap_or(Decimal::ZERO)
}

fn from_float(f: f64) -> Decimal {
    if !f.is_finite() {
        return Decimal::ZERO;
    }
    match Decimal::from_f64(f) {
        Some(d) => d,
        None if f.abs() < 1.0 => Decimal::ZERO,
        None if f > 0.0 => Decimal::MAX,
        None => Decimal::MIN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn blanks_and_garbage_are_zero() {
        assert_eq!(num(&json!("")), Decimal::ZERO);
        assert_eq!(num(&Value::Null), Decimal::ZERO);
        assert_eq!(num(None::<&Value>), Decimal::ZERO);
        assert_eq!(num(&json!("abc")), Decimal::ZERO);
        assert_eq!(num(&json!("   ")), Decimal::ZERO);
        assert_eq!(num(&json!({"a": 1})), Decimal::ZERO);
    }

    #[test]
    fn numbers_pass_through() {
        assert_eq!(num(&json!("3.5")), Decimal::new(35, 1));
        assert_eq!(num(&json!(-2)), Decimal::new(-2, 0));
        assert_eq!(num(&json!(0.25)), Decimal::new(25, 2));
        assert_eq!(num(&json!(" 42 ")), Decimal::new(42, 0));
        assert_eq!(num(&json!("1e3")), Decimal::new(1000, 0));
        assert_eq!(num(&json!(true)), Decimal::ONE);
    }

    #[test]
    fn out_of_range_numbers_clamp() {
        assert_eq!(num(&json!(1e30)), Decimal::MAX);
        assert_eq!(num(&json!(-1e30)), Decimal::MIN);
        assert_eq!(num(&json!("1e29")), Decimal::MAX);
        assert_eq!(num(&json!("-4e40")), Decimal::MIN);
        assert_eq!(num(&json!("inf")), Decimal::ZERO);
        assert_eq!(num(&json!("NaN")), Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn integers_round_trip_through_text(i in -1_000_000_000i64..1_000_000_000) {
            prop_assert_eq!(num(&json!(i.to_string())), Decimal::from(i));
            prop_assert_eq!(num(&json!(i)), Decimal::from(i));
        }

        #[test]
        fn never_panics_on_text(s in "[0-9a-z .eE+-]{0,12}") {
            let _ = parse_amount(&s);
        }
    }
}
