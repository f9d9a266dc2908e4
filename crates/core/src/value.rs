//! Value classification tags
//!
//! Two related classifications exist:
//! - `FieldKind` is the permanent per-field classifier recorded by the
//!   Field table on first creation of a field.
//! - `DuckType` is the per-value classification computed at write time; it
//!   decides which projection tables a value lands in and doubles as the
//!   replay sort key on the read path (sequence rows sort first).

use serde::{Deserialize, Serialize};

/// Permanent per-field value-kind classifier
///
/// Assigned when a field is first created and never changed afterwards.
/// Later writers are trusted to agree with the stored kind; this layer does
/// not re-validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FieldKind {
    /// Opaque string, only the text projection applies
    Opaque = 0,
    /// Values parse as numbers (text projection still always written)
    Numeric = 1,
    /// Values parse as calendar dates (text projection still always written)
    Date = 2,
    /// Excluded from the typed projections entirely
    Unindexed = 3,
}

impl FieldKind {
    /// The kind a field should be created with for a value of the given
    /// duck type. Numeric takes precedence over date when both parses
    /// succeed.
    pub fn for_duck(duck: DuckType) -> Self {
        match duck {
            DuckType::Numeric | DuckType::NumericAndDate => FieldKind::Numeric,
            DuckType::Date => FieldKind::Date,
            DuckType::Sequence | DuckType::Opaque => FieldKind::Opaque,
        }
    }
}

/// Per-value classification and replay sort key
///
/// The byte values are part of the persisted layout: attribute rows are
/// replayed in ascending tag order, which is what puts sequence rows ahead
/// of every scalar row during reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DuckType {
    /// A sub-collection order marker (zero-padded index with terminator)
    Sequence = 0,
    /// Plain string, text projection only
    Opaque = 1,
    /// Parses as a number; text + numeric projections
    Numeric = 2,
    /// Parses as a date; text + datetime projections
    Date = 3,
    /// Parses as both; all three projections
    NumericAndDate = 4,
}

impl DuckType {
    /// Byte representation (stable, part of the persisted layout)
    pub fn as_byte(&self) -> u8 {
        *self as u8
    }

    /// Whether the numeric projection is written for this tag
    pub fn is_numeric(&self) -> bool {
        matches!(self, DuckType::Numeric | DuckType::NumericAndDate)
    }

    /// Whether the datetime projection is written for this tag
    pub fn is_date(&self) -> bool {
        matches!(self, DuckType::Date | DuckType::NumericAndDate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_sorts_before_scalars() {
        assert!(DuckType::Sequence < DuckType::Opaque);
        assert!(DuckType::Opaque < DuckType::Numeric);
        assert!(DuckType::Numeric < DuckType::Date);
        assert!(DuckType::Date < DuckType::NumericAndDate);
    }

    #[test]
    fn test_numeric_takes_precedence_for_field_kind() {
        assert_eq!(FieldKind::for_duck(DuckType::NumericAndDate), FieldKind::Numeric);
        assert_eq!(FieldKind::for_duck(DuckType::Numeric), FieldKind::Numeric);
        assert_eq!(FieldKind::for_duck(DuckType::Date), FieldKind::Date);
        assert_eq!(FieldKind::for_duck(DuckType::Opaque), FieldKind::Opaque);
    }

    #[test]
    fn test_projection_flags() {
        assert!(DuckType::NumericAndDate.is_numeric());
        assert!(DuckType::NumericAndDate.is_date());
        assert!(!DuckType::Opaque.is_numeric());
        assert!(!DuckType::Sequence.is_date());
    }
}
