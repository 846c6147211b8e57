//! How a field is chosen when every font has a value for it

use crate::{MergeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The base font's value.
    First,
    Min,
    Max,
    /// All values must agree.
    Equal { table: &'static str, field: &'static str },
}

impl Strategy {
    pub fn apply<T: Ord + Copy>(self, values: &[T]) -> Result<T> {
        let (&first, rest) = values.split_first().ok_or(MergeError::NoFonts)?;
        Ok(match self {
            Strategy::First => first,
            Strategy::Min => rest.iter().fold(first, |a, &b| a.min(b)),
            Strategy::Max => rest.iter().fold(first, |a, &b| a.max(b)),
            Strategy::Equal { table, field } => {
                if rest.iter().any(|&v| v != first) {
                    return Err(MergeError::NotEqual { table, field });
                }
                first
            }
        })
    }
}

/// How one bit of a flags field is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bit {
    /// Set when any font sets it.
    Any,
    /// Set when every font sets it.
    All,
    /// Copied from the base font.
    First,
}

pub fn merge_bits(values: &[u16], bits: &[Bit; 16]) -> Result<u16> {
    let &first = values.first().ok_or(MergeError::NoFonts)?;
    let merged = bits.iter().enumerate().fold(0u16, |acc, (i, bit)| {
        let mask = 1 << i;
        let set = match bit {
            Bit::Any => values.iter().any(|v| v & mask != 0),
            Bit::All => values.iter().all(|v| v & mask != 0),
            Bit::First => first & mask != 0,
        };
        if set { acc | mask } else { acc }
    });
    Ok(merged)
}
