//! Well-known name and field catalogs
//!
//! Seeded into the backend at schema creation. Catalog order fixes the
//! assigned ids, so released entries must never be reordered or removed;
//! evolution is append-only.

use crate::value::FieldKind;

/// The empty string, id 1: a valid name meaning "no value"
pub const EMPTY_NAME: &str = "";

/// Reserved attribute key carrying a sub-collection sequence value
pub const SEQ_KEY: &str = "_sequence";

/// Section kind holding the document body text
pub const TEXT_KIND: &str = "TEXT";

/// Attribute key of the body text inside `TEXT_KIND`
pub const TEXT_KEY: &str = "text";

/// Section kind holding preference entries (access rules among them)
pub const PREFERENCE_KIND: &str = "PREFERENCE";

/// Attribute key of a preference entry's value
pub const VALUE_KEY: &str = "value";

/// Section kind holding revision metadata mirrored into content
pub const DOCINFO_KIND: &str = "DOCINFO";

/// The implicit group every principal belongs to
pub const EVERYONE: &str = "Everyone";

/// Default container of the site-wide preferences document
pub const SITE_PREFS_CONTAINER: &str = "Site";

/// Default name of the site-wide preferences document
pub const SITE_PREFS_DOC: &str = "Defaults";

/// Default per-container preferences document name
pub const CONTAINER_PREFS_DOC: &str = "Preferences";

/// Names pre-registered at schema creation, in id order starting at 1
///
/// The empty string comes first so that `NameId::EMPTY` is always id 1.
pub const WELL_KNOWN_NAMES: &[&str] = &[
    EMPTY_NAME,
    SEQ_KEY,
    TEXT_KIND,
    TEXT_KEY,
    PREFERENCE_KIND,
    VALUE_KEY,
    DOCINFO_KIND,
    "name",
    "author",
    "date",
    "version",
    "comment",
    EVERYONE,
    SITE_PREFS_CONTAINER,
    SITE_PREFS_DOC,
    CONTAINER_PREFS_DOC,
];

/// A well-known field: (kind, named flag, instance, key, value kind)
pub type CatalogField = (&'static str, bool, &'static str, &'static str, FieldKind);

/// Fields pre-registered at schema creation, in id order starting at 1
///
/// The value kinds recorded here are permanent; first assignment wins for
/// everything created later at runtime too.
pub const WELL_KNOWN_FIELDS: &[CatalogField] = &[
    (TEXT_KIND, false, "", TEXT_KEY, FieldKind::Opaque),
    (DOCINFO_KIND, false, "", "author", FieldKind::Opaque),
    (DOCINFO_KIND, false, "", "date", FieldKind::Date),
    (DOCINFO_KIND, false, "", "version", FieldKind::Numeric),
    (DOCINFO_KIND, false, "", "comment", FieldKind::Opaque),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_is_first() {
        assert_eq!(WELL_KNOWN_NAMES[0], "");
    }

    #[test]
    fn test_no_duplicate_names() {
        let mut seen = std::collections::HashSet::new();
        for name in WELL_KNOWN_NAMES {
            assert!(seen.insert(*name), "duplicate catalog name: {:?}", name);
        }
    }

    #[test]
    fn test_catalog_fields_use_catalog_names() {
        for (kind, _, instance, key, _) in WELL_KNOWN_FIELDS {
            assert!(WELL_KNOWN_NAMES.contains(kind));
            assert!(WELL_KNOWN_NAMES.contains(instance));
            assert!(WELL_KNOWN_NAMES.contains(key));
        }
    }
}
