//! Rule extraction, normalization and capture
//!
//! At save time the document's own `PREFERENCE` section is scanned for
//! entries named `(ALLOW|DENY)(ROOT|SPACE|DOC)<MODE>`, the value being a
//! comma/space separated principal list. The grouped rules are
//! normalized with two deliberate quirks and written to the Access table
//! wholesale (old rows for the revision are discarded first).
//!
//! The quirks, reproduced exactly:
//! - an empty DENY list at document scope means "allow everyone" at that
//!   scope and is stored as an explicit allow-everyone rule;
//! - a non-empty ALLOW list at root or container scope implicitly denies
//!   everyone not in the list, stored as a synthesized remainder-deny
//!   rule rather than left implicit.

use folio_backend::{AccessRow, WriteTxn};
use folio_core::{catalog, AccessScope, DocContent, NameId, Permission, Result, RevisionId};
use folio_dictionary::NameDictionary;
use tracing::debug;

/// One extracted preference entry, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRule {
    /// Scope the entry names
    pub scope: AccessScope,
    /// True for ALLOW entries, false for DENY
    pub allow: bool,
    /// Access mode, upper-case (VIEW, EDIT, ...)
    pub mode: String,
    /// The listed principals, possibly empty
    pub principals: Vec<String>,
}

/// One normalized rule, ready for the Access table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRule {
    /// Scope the rule applies at
    pub scope: AccessScope,
    /// Deny, allow, or the synthesized remainder-deny
    pub permission: Permission,
    /// Access mode, upper-case
    pub mode: String,
    /// Principal the rule names
    pub principal: String,
}

fn parse_key(key: &str) -> Option<(bool, AccessScope, &str)> {
    let (allow, rest) = if let Some(rest) = key.strip_prefix("ALLOW") {
        (true, rest)
    } else if let Some(rest) = key.strip_prefix("DENY") {
        (false, rest)
    } else {
        return None;
    };
    let (scope, mode) = if let Some(mode) = rest.strip_prefix("ROOT") {
        (AccessScope::Root, mode)
    } else if let Some(mode) = rest.strip_prefix("SPACE") {
        (AccessScope::Container, mode)
    } else if let Some(mode) = rest.strip_prefix("DOC") {
        (AccessScope::Document, mode)
    } else {
        return None;
    };
    if mode.is_empty() || !mode.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    Some((allow, scope, mode))
}

fn parse_principals(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extract the raw access entries from a document's preferences
pub fn extract(content: &DocContent) -> Vec<RawRule> {
    let Some(section) = content.section(catalog::PREFERENCE_KIND) else {
        return Vec::new();
    };
    section
        .records
        .iter()
        .filter_map(|record| {
            let (allow, scope, mode) = parse_key(&record.name)?;
            let value = record.get(catalog::VALUE_KEY).unwrap_or_default();
            Some(RawRule {
                scope,
                allow,
                mode: mode.to_string(),
                principals: parse_principals(value),
            })
        })
        .collect()
}

/// Apply the normalization quirks
pub fn normalize(raw: Vec<RawRule>) -> Vec<NormalizedRule> {
    let mut out = Vec::new();
    for rule in raw {
        if rule.allow {
            let synthesize = rule.scope != AccessScope::Document && !rule.principals.is_empty();
            for principal in &rule.principals {
                out.push(NormalizedRule {
                    scope: rule.scope,
                    permission: Permission::Allow,
                    mode: rule.mode.clone(),
                    principal: principal.clone(),
                });
            }
            if synthesize {
                out.push(NormalizedRule {
                    scope: rule.scope,
                    permission: Permission::DenyRemainder,
                    mode: rule.mode.clone(),
                    principal: catalog::EVERYONE.to_string(),
                });
            }
        } else if rule.principals.is_empty() {
            // An empty deny list at document scope reads as "everyone may".
            if rule.scope == AccessScope::Document {
                out.push(NormalizedRule {
                    scope: rule.scope,
                    permission: Permission::Allow,
                    mode: rule.mode,
                    principal: catalog::EVERYONE.to_string(),
                });
            }
        } else {
            for principal in &rule.principals {
                out.push(NormalizedRule {
                    scope: rule.scope,
                    permission: Permission::Deny,
                    mode: rule.mode.clone(),
                    principal: principal.clone(),
                });
            }
        }
    }
    out
}

/// Capture a document's rules for a just-saved revision
///
/// Extracts, normalizes, interns the modes and principals, and replaces
/// every Access row of the revision in one statement.
pub fn capture(
    txn: &mut WriteTxn<'_>,
    names: &NameDictionary,
    revision: RevisionId,
    container: NameId,
    content: &DocContent,
) -> Result<()> {
    let rules = normalize(extract(content));
    let mut wanted: Vec<&str> = Vec::with_capacity(rules.len() * 2);
    for rule in &rules {
        wanted.push(&rule.mode);
        wanted.push(&rule.principal);
    }
    let ids = names.resolve(txn, &wanted)?;
    let rows: Vec<AccessRow> = rules
        .iter()
        .map(|rule| AccessRow {
            revision,
            container,
            scope: rule.scope,
            permission: rule.permission,
            mode: ids[&rule.mode],
            principal: ids[&rule.principal],
        })
        .collect();
    debug!(%revision, rules = rows.len(), "capture access rules");
    txn.replace_access_rules(revision, rows);
    Ok(())
}
