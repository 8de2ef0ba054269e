//! The immutable bounded-integer sequence consumed by every test.

use serde::Serialize;

use crate::error::{Error, Result};

/// Largest accepted range `N`. Frequency and gap tables hold one slot per
/// value, so `N` bounds their memory.
pub const MAX_RANGE: u32 = 1 << 24;

/// Reject `N == 0` and `N > MAX_RANGE`.
pub(crate) fn check_range(range: u32) -> Result<()> {
    if range == 0 || range > MAX_RANGE {
        return Err(Error::InvalidRange(range));
    }
    Ok(())
}

/// An ordered list of integers, each in `[0, range)`.
///
/// Built once (by the generator or from external values) and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sequence {
    range: u32,
    values: Vec<u32>,
}

impl Sequence {
    /// Wrap externally supplied values, checking every one against `range`.
    pub fn new(values: Vec<u32>, range: u32) -> Result<Self> {
        check_range(range)?;
        if let Some((index, &value)) = values.iter().enumerate().find(|&(_, &v)| v >= range) {
            return Err(Error::ValueOutOfRange {
                index,
                value: value as u64,
                range,
            });
        }
        Ok(Self { range, values })
    }

    /// Build from wider integers (e.g. parsed text input).
    pub fn from_u64s(values: &[u64], range: u32) -> Result<Self> {
        check_range(range)?;
        let mut out = Vec::with_capacity(values.len());
        for (index, &value) in values.iter().enumerate() {
            if value >= range as u64 {
                return Err(Error::ValueOutOfRange {
                    index,
                    value,
                    range,
                });
            }
            out.push(value as u32);
        }
        Ok(Self { range, values: out })
    }

    /// Interpret a raw byte dump as one value per byte.
    pub fn from_bytes(bytes: &[u8], range: u32) -> Result<Self> {
        Self::new(bytes.iter().map(|&b| b as u32).collect(), range)
    }

    /// Generator output is clamped into range already.
    pub(crate) fn from_clamped(values: Vec<u32>, range: u32) -> Self {
        debug_assert!(values.iter().all(|&v| v < range));
        Self { range, values }
    }

    /// Declared exclusive upper bound `N`.
    pub fn range(&self) -> u32 {
        self.range
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.values.iter().copied()
    }

    /// Values as a numeric time series.
    pub fn to_f64(&self) -> Vec<f64> {
        self.values.iter().map(|&v| v as f64).collect()
    }

    /// One byte per value, the raw dump format. `None` when `range > 256`.
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        if self.range > 256 {
            return None;
        }
        Some(self.values.iter().map(|&v| v as u8).collect())
    }

    pub fn into_values(self) -> Vec<u32> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_in_range() {
        let seq = Sequence::new(vec![0, 1, 9], 10).unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.range(), 10);
        assert_eq!(seq.values(), &[0, 1, 9]);
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        let err = Sequence::new(vec![0, 10, 3], 10).unwrap_err();
        assert_eq!(
            err,
            Error::ValueOutOfRange {
                index: 1,
                value: 10,
                range: 10
            }
        );
    }

    #[test]
    fn test_new_rejects_zero_range() {
        assert_eq!(Sequence::new(vec![], 0), Err(Error::InvalidRange(0)));
        assert!(Sequence::from_u64s(&[], 0).is_err());
    }

    #[test]
    fn test_oversized_range_rejected() {
        assert_eq!(
            Sequence::new(vec![1, 2, 3], 4_000_000_000),
            Err(Error::InvalidRange(4_000_000_000))
        );
        assert_eq!(
            Sequence::from_u64s(&[1, 2, 3], MAX_RANGE + 1),
            Err(Error::InvalidRange(MAX_RANGE + 1))
        );
        assert!(Sequence::new(vec![MAX_RANGE - 1], MAX_RANGE).is_ok());
    }

    #[test]
    fn test_empty_is_allowed() {
        let seq = Sequence::new(Vec::new(), 5).unwrap();
        assert!(seq.is_empty());
    }

    #[test]
    fn test_from_u64s_checks_wide_values() {
        let err = Sequence::from_u64s(&[1, u64::MAX], 4).unwrap_err();
        assert!(matches!(err, Error::ValueOutOfRange { index: 1, .. }));
        let seq = Sequence::from_u64s(&[3, 2, 1], 4).unwrap();
        assert_eq!(seq.values(), &[3, 2, 1]);
    }

    #[test]
    fn test_byte_round_trip() {
        let seq = Sequence::from_bytes(&[0, 255, 17], 256).unwrap();
        assert_eq!(seq.to_bytes().unwrap(), vec![0, 255, 17]);
        let wide = Sequence::new(vec![300], 1000).unwrap();
        assert!(wide.to_bytes().is_none());
    }
}
