//! Principal membership, supplied by the host

use std::collections::{HashMap, HashSet};

/// Host-supplied view of principals, groups and administrators
///
/// Only direct memberships are reported here; the resolver computes the
/// transitive closure itself and adds the implicit everyone-group.
pub trait Directory: Send + Sync {
    /// Groups the principal is directly a member of
    fn groups_of(&self, principal: &str) -> Vec<String>;

    /// Whether the principal bypasses every rule
    fn is_admin(&self, principal: &str) -> bool;
}

/// A fixed in-memory directory
///
/// Configured up front with the builder methods; hosts with a live user
/// base implement [`Directory`] themselves.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    members: HashMap<String, HashSet<String>>,
    admins: HashSet<String>,
}

impl StaticDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member to a group
    pub fn with_member(mut self, group: &str, member: &str) -> Self {
        self.members
            .entry(member.to_string())
            .or_default()
            .insert(group.to_string());
        self
    }

    /// Mark a principal as an administrator
    pub fn with_admin(mut self, principal: &str) -> Self {
        self.admins.insert(principal.to_string());
        self
    }
}

impl Directory for StaticDirectory {
    fn groups_of(&self, principal: &str) -> Vec<String> {
        self.members
            .get(principal)
            .map(|groups| groups.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn is_admin(&self, principal: &str) -> bool {
        self.admins.contains(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_directory_memberships() {
        let dir = StaticDirectory::new()
            .with_member("Editors", "alice")
            .with_member("Staff", "alice")
            .with_admin("root");
        let mut groups = dir.groups_of("alice");
        groups.sort();
        assert_eq!(groups, vec!["Editors", "Staff"]);
        assert!(dir.groups_of("bob").is_empty());
        assert!(dir.is_admin("root"));
        assert!(!dir.is_admin("alice"));
    }
}
