/// Hash rate value with an explicit unit
///
/// Upstream pools report hash rate as raw H/s numbers, compact suffixed strings
/// ("1.35T") or numbers in an implicit unit. Every one of those funnels through
/// the constructors here, and the stored value is always display-rounded.
use super::unit::{HashRateUnit, UNIT_STEP};
use serde::{Serialize, Serializer};
use std::fmt;

/// Sub-1 values with more leading zero decimals than this are kept unrounded
const MAX_ROUNDED_LEADING_ZEROS: usize = 2;

/// Decimal places kept by the display rounding pass
const DISPLAY_DECIMALS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HashRateValue {
    pub value: f64,
    #[serde(serialize_with = "serialize_suffix")]
    pub unit: HashRateUnit,
}

fn serialize_suffix<S: Serializer>(unit: &HashRateUnit, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(unit.suffix())
}

impl HashRateValue {
    pub fn new(value: f64, unit: HashRateUnit) -> Self {
        Self {
            value: format_value(value),
            unit,
        }
    }

    /// Zero in the base unit
    pub fn zero() -> Self {
        Self::new(0.0, HashRateUnit::H)
    }

    /// Value in an explicitly named unit ("G", "TH", ...)
    pub fn from_raw_number(value: f64, unit_alias: &str) -> Self {
        Self::new(value, HashRateUnit::from_alias(unit_alias))
    }

    /// Pick the most readable unit for a raw H/s number
    ///
    /// Units are scanned from H upward; the first unit whose successor's
    /// magnitude exceeds `value` wins. Values beyond every threshold land in ZH.
    pub fn from_magnitude(value: f64) -> Self {
        let unit = HashRateUnit::ALL
            .iter()
            .copied()
            .find(|unit| match unit.next() {
                Some(next) => value < next.magnitude(),
                None => true,
            })
            .unwrap_or_else(HashRateUnit::largest);

        Self::new(value / unit.magnitude(), unit)
    }

    /// Parse a compact string such as "1.35T", "950" or "12.5KH"
    ///
    /// The text is split after the last digit or decimal point. Malformed input
    /// yields zero H/s instead of an error so one bad field cannot abort a poll.
    pub fn from_compact_string(text: &str) -> Self {
        if text.is_empty() || text == "0" {
            return Self::zero();
        }

        let split_at = text
            .char_indices()
            .rev()
            .find(|(_, ch)| ch.is_ascii_digit() || *ch == '.')
            .map(|(idx, ch)| idx + ch.len_utf8())
            .unwrap_or(0);

        let (number_part, alias_part) = text.split_at(split_at);

        match number_part.trim().parse::<f64>() {
            Ok(value) => Self::from_raw_number(value, alias_part),
            Err(_) => Self::zero(),
        }
    }

    /// Convert to another unit, one x1000 step at a time
    pub fn convert_to(&self, unit: HashRateUnit) -> Self {
        if self.unit == unit {
            return *self;
        }

        let (low, high) = if self.unit < unit {
            (self.unit, unit)
        } else {
            (unit, self.unit)
        };

        let factor = HashRateUnit::ALL
            .iter()
            .filter(|step| **step > low && **step <= high)
            .fold(1.0, |acc, _| acc * UNIT_STEP);

        let converted = if self.unit < unit {
            self.value / factor
        } else {
            self.value * factor
        };

        Self::new(converted, unit)
    }

    /// Shorthand for the canonical GH/s figure every adapter reports
    pub fn to_gigahashes(&self) -> f64 {
        self.convert_to(HashRateUnit::GH).value
    }
}

impl Default for HashRateValue {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for HashRateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Round to the smallest readable number
///
/// Two decimals, except values below 1 with more than two leading zero
/// decimals, which are returned untouched so tiny rates don't collapse to 0.
pub fn format_value(value: f64) -> f64 {
    if value < 1.0 && count_leading_zero_decimals(value) > MAX_ROUNDED_LEADING_ZEROS {
        return value;
    }

    // Whole numbers (including every huge raw H/s figure) are already rounded
    if value.fract() == 0.0 {
        return value;
    }

    // Rounds the exact stored binary value
    format!("{:.*}", DISPLAY_DECIMALS, value)
        .parse()
        .unwrap_or(value)
}

/// Count zero digits between the decimal point and the first non-zero digit
fn count_leading_zero_decimals(value: f64) -> usize {
    let text = format!("{:.16}", value);
    let text = text.trim_end_matches('0');

    match text.split_once('.') {
        Some((_, decimals)) => decimals.chars().take_while(|ch| *ch == '0').count(),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_string_with_suffix() {
        let rate = HashRateValue::from_compact_string("1.35T");
        assert_eq!(rate.value, 1.35);
        assert_eq!(rate.unit, HashRateUnit::TH);

        let rate = HashRateValue::from_compact_string("12.5KH");
        assert_eq!(rate.value, 12.5);
        assert_eq!(rate.unit, HashRateUnit::KH);
    }

    #[test]
    fn test_compact_string_without_suffix() {
        let rate = HashRateValue::from_compact_string("950");
        assert_eq!(rate.value, 950.0);
        assert_eq!(rate.unit, HashRateUnit::H);
    }

    #[test]
    fn test_compact_string_zero_and_malformed() {
        for text in ["", "0", "abc", "G", ".T"] {
            let rate = HashRateValue::from_compact_string(text);
            assert_eq!(rate.value, 0.0, "input {:?}", text);
            assert_eq!(rate.unit, HashRateUnit::H, "input {:?}", text);
        }
    }

    #[test]
    fn test_from_magnitude_selects_unit() {
        let rate = HashRateValue::from_magnitude(2_500_000_000.0);
        assert_eq!(rate.unit, HashRateUnit::GH);
        assert_eq!(rate.value, 2.5);

        let rate = HashRateValue::from_magnitude(999.0);
        assert_eq!(rate.unit, HashRateUnit::H);
        assert_eq!(rate.value, 999.0);

        let rate = HashRateValue::from_magnitude(1000.0);
        assert_eq!(rate.unit, HashRateUnit::KH);
        assert_eq!(rate.value, 1.0);

        let rate = HashRateValue::from_magnitude(0.0);
        assert_eq!(rate.unit, HashRateUnit::H);
    }

    #[test]
    fn test_from_magnitude_beyond_largest_threshold() {
        let rate = HashRateValue::from_magnitude(5e24);
        assert_eq!(rate.unit, HashRateUnit::ZH);
        assert_eq!(rate.value, 5000.0);
    }

    #[test]
    fn test_convert_round_trips() {
        let rate = HashRateValue::new(1000.0, HashRateUnit::H);
        let up = rate.convert_to(HashRateUnit::KH);
        assert_eq!(up.value, 1.0);
        assert_eq!(up.unit, HashRateUnit::KH);
        assert_eq!(up.convert_to(HashRateUnit::H).value, 1000.0);

        let rate = HashRateValue::new(1.5, HashRateUnit::TH);
        let down = rate.convert_to(HashRateUnit::MH);
        assert_eq!(down.value, 1_500_000.0);
        assert_eq!(down.convert_to(HashRateUnit::TH).value, 1.5);

        let rate = HashRateValue::new(3.0, HashRateUnit::ZH);
        assert_eq!(rate.convert_to(HashRateUnit::H).value, 3e21);
        assert_eq!(rate.convert_to(HashRateUnit::H).convert_to(HashRateUnit::ZH).value, 3.0);
    }

    #[test]
    fn test_convert_same_unit_is_identity() {
        let rate = HashRateValue::new(42.42, HashRateUnit::GH);
        assert_eq!(rate.convert_to(HashRateUnit::GH), rate);
    }

    #[test]
    fn test_small_conversions_keep_precision() {
        // 0.12 MH in GH is 0.00012: three leading zeros, kept raw
        let rate = HashRateValue::new(0.12, HashRateUnit::MH).convert_to(HashRateUnit::GH);
        assert!((rate.value - 0.00012).abs() < 1e-15);

        // 1.2 MH in GH is 0.0012: only two leading zeros, so it rounds away
        let rate = HashRateValue::new(1.2, HashRateUnit::MH).convert_to(HashRateUnit::GH);
        assert_eq!(rate.value, 0.0);
    }

    #[test]
    fn test_display_rounding() {
        assert_eq!(format_value(0.00001234), 0.00001234);
        assert_eq!(format_value(1.23456), 1.23);
        assert_eq!(format_value(0.5678), 0.57);
        // one or two leading zeros fall through to plain rounding
        assert_eq!(format_value(0.0123), 0.01);
        assert_eq!(format_value(0.001234), 0.0);
        assert_eq!(format_value(0.0001234), 0.0001234);
        assert_eq!(format_value(0.0), 0.0);
    }

    #[test]
    fn test_display_rounding_below_boundary() {
        // Stored just under the .xx5 boundary, so these round down
        assert_eq!(format_value(2.675), 2.67);
        assert_eq!(format_value(8.345), 8.34);
        assert_eq!(format_value(1.115), 1.11);
        assert_eq!(format_value(0.015), 0.01);
        assert_eq!(format_value(1.005), 1.0);
    }

    #[test]
    fn test_display() {
        let rate = HashRateValue::from_raw_number(1.35, "T");
        assert_eq!(rate.to_string(), "1.35 TH/s");
        assert_eq!(HashRateValue::from_raw_number(950.5, "").to_string(), "950.5 H/s");
    }

    #[test]
    fn test_serialize_uses_suffix() {
        let json = serde_json::to_value(HashRateValue::from_raw_number(2.5, "T")).unwrap();
        assert_eq!(json, serde_json::json!({"value": 2.5, "unit": "TH/s"}));
    }

    #[test]
    fn test_to_gigahashes() {
        assert_eq!(HashRateValue::from_magnitude(150_000_000_000.0).to_gigahashes(), 150.0);
        assert_eq!(HashRateValue::from_compact_string("2.5T").to_gigahashes(), 2500.0);
    }
}
