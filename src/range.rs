use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::RangeInclusive;

/// Inclusive, ascending port interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRange {
    pub low: u16,
    pub high: u16,
}

impl PortRange {
    /// Build a range from two bounds given in any order.
    pub fn new(a: u16, b: u16) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// Validate a loosely-typed range such as `[80, 22]`.
    ///
    /// Only an array of exactly two JSON integers that fit in a `u16` is
    /// accepted. Floats, numeric strings, other arities and non-arrays are
    /// rejected. The result is sorted ascending.
    pub fn validate(input: &Value) -> Option<Self> {
        let items = input.as_array()?;
        if items.len() != 2 {
            return None;
        }

        let first = as_port(&items[0])?;
        let second = as_port(&items[1])?;
        Some(Self::new(first, second))
    }

    pub fn ports(&self) -> RangeInclusive<u16> {
        self.low..=self.high
    }

    /// Number of ports covered, bounds included.
    pub fn port_count(&self) -> usize {
        usize::from(self.high - self.low) + 1
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

// `is_u64`/`is_i64` are false for floats, so `1.0` is rejected along with `1.5`.
fn as_port(value: &Value) -> Option<u16> {
    if value.is_u64() {
        value.as_u64().and_then(|n| u16::try_from(n).ok())
    } else if value.is_i64() {
        value.as_i64().and_then(|n| u16::try_from(n).ok())
    } else {
        None
    }
}
