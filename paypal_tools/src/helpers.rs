use bzr_common::MinorUnits;

use crate::PayPalApiError;

/// Parses a processor decimal amount string ("300.50") into minor currency units.
pub fn parse_processor_price(price: &str) -> Result<MinorUnits, PayPalApiError> {
    let invalid = || PayPalApiError::JsonError(format!("Invalid currency amount: {price}"));
    let (whole, frac) = match price.split_once('.') {
        Some((w, f)) => (w, f),
        None => (price, "0"),
    };
    if frac.len() > 2 {
        return Err(invalid());
    }
    let whole = whole.parse::<i64>().map_err(|_| invalid())?;
    let frac = format!("{frac:0<2}").parse::<i64>().map_err(|_| invalid())?;
    let sign = if whole < 0 { -1 } else { 1 };
    Ok(MinorUnits::from(whole * 100 + sign * frac))
}

#[cfg(test)]
mod test {
    use bzr_common::MinorUnits;

    use super::parse_processor_price;

    #[test]
    fn parses_decimal_strings() {
        assert_eq!(parse_processor_price("300.50").unwrap(), MinorUnits::from(30_050));
        assert_eq!(parse_processor_price("100").unwrap(), MinorUnits::from(10_000));
        assert_eq!(parse_processor_price("0.05").unwrap(), MinorUnits::from(5));
        assert_eq!(parse_processor_price("0.5").unwrap(), MinorUnits::from(50));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_processor_price("12.345").is_err());
        assert!(parse_processor_price("abc").is_err());
        assert!(parse_processor_price("10.x").is_err());
    }
}
