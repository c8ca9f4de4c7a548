//! Hash rate units and values
//!
//! - [`HashRateUnit`]: ordered magnitudes from H/s to ZH/s
//! - [`HashRateValue`]: a number tagged with its unit, display-rounded on construction
//!
//! Adapters normalize everything to GH/s through [`HashRateValue::to_gigahashes`].

pub mod unit;
pub mod value;

pub use unit::HashRateUnit;
pub use value::{format_value, HashRateValue};
