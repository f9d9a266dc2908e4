//! Scope-cascading access evaluation
//!
//! Evaluation order, first decisive match wins:
//! administrator bypass, then root-scope deny/allow, container-scope
//! deny/allow (memoized per container and principal), document-scope
//! deny/allow (bulk-loaded per container, memoized per document and
//! principal), then the default permit.
//!
//! Root-scope rules are read from the configured site preferences
//! document, container-scope rules from the configured per-container
//! preferences document, document-scope rules from the document itself.
//!
//! Evaluation is strictly read-only: principals and modes that were
//! never interned cannot match any rule, so nothing is created here.

use crate::directory::Directory;
use dashmap::DashMap;
use folio_backend::{AccessRow, Backend, ReadTxn, Statements};
use folio_core::{
    catalog, AccessDecision, AccessScope, AccessTarget, DocKey, DocPath, NameId, Permission,
    Result,
};
use folio_dictionary::NameDictionary;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Where the resolver finds the broader-scope preference documents
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// The document whose rules apply at root scope
    pub site_prefs: DocPath,
    /// Per-container preferences document name (container scope)
    pub container_prefs_doc: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            site_prefs: DocPath::new(catalog::SITE_PREFS_CONTAINER, catalog::SITE_PREFS_DOC),
            container_prefs_doc: catalog::CONTAINER_PREFS_DOC.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the site preferences document
    pub fn site_prefs(mut self, path: DocPath) -> Self {
        self.site_prefs = path;
        self
    }

    /// Override the per-container preferences document name
    pub fn container_prefs_doc(mut self, name: impl Into<String>) -> Self {
        self.container_prefs_doc = name.into();
        self
    }
}

type Verdict = Option<AccessDecision>;

/// Evaluates scope-cascading permission rules
///
/// Membership sets are cached for the resolver's lifetime; rule verdict
/// memos are valid until [`AccessResolver::invalidate`] is called (the
/// engine calls it after every mutation that can change captured rules).
pub struct AccessResolver {
    backend: Arc<Backend>,
    names: Arc<NameDictionary>,
    directory: Arc<dyn Directory>,
    config: ResolverConfig,
    memberships: DashMap<String, Arc<HashSet<NameId>>>,
    root_memo: DashMap<(String, String), Verdict>,
    container_memo: DashMap<(String, String, String), Verdict>,
    doc_rules: DashMap<NameId, Arc<Vec<AccessRow>>>,
    doc_memo: DashMap<(DocKey, String, String), Verdict>,
}

impl AccessResolver {
    /// Create a resolver over a backend and a host directory
    pub fn new(
        backend: Arc<Backend>,
        names: Arc<NameDictionary>,
        directory: Arc<dyn Directory>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            backend,
            names,
            directory,
            config,
            memberships: DashMap::new(),
            root_memo: DashMap::new(),
            container_memo: DashMap::new(),
            doc_rules: DashMap::new(),
            doc_memo: DashMap::new(),
        }
    }

    /// Drop every rule memo (membership caches stay)
    ///
    /// Called after any save, rollback, rename or purge; captured rules
    /// may have changed.
    pub fn invalidate(&self) {
        self.root_memo.clear();
        self.container_memo.clear();
        self.doc_rules.clear();
        self.doc_memo.clear();
    }

    /// Check whether `principal` may perform `mode` on `target`
    pub fn evaluate(
        &self,
        principal: &str,
        mode: &str,
        target: &AccessTarget,
    ) -> Result<AccessDecision> {
        if self.directory.is_admin(principal) {
            debug!(principal, mode, "admin bypass");
            return Ok(AccessDecision::permit());
        }
        let mode = mode.to_ascii_uppercase();
        let txn = self.backend.read();
        let members = self.membership(&txn, principal);
        let mode_id = self
            .names
            .lookup_existing(&txn, &[mode.as_str()])
            .get(&mode)
            .copied();

        if let Some(decision) = self.root_verdict(&txn, principal, &mode, mode_id, &members) {
            return Ok(decision);
        }
        let container = match target {
            AccessTarget::Root => return Ok(AccessDecision::permit()),
            AccessTarget::Container(container) => container,
            AccessTarget::Document(path) => &path.container,
        };
        if let Some(decision) =
            self.container_verdict(&txn, container, principal, &mode, mode_id, &members)
        {
            return Ok(decision);
        }
        if let AccessTarget::Document(path) = target {
            if let Some(decision) =
                self.document_verdict(&txn, path, principal, &mode, mode_id, &members)
            {
                return Ok(decision);
            }
        }
        Ok(AccessDecision::permit())
    }

    /// Effective identity set: the principal, its transitive groups, and
    /// the implicit everyone-group
    fn membership(&self, txn: &ReadTxn<'_>, principal: &str) -> Arc<HashSet<NameId>> {
        if let Some(cached) = self.memberships.get(principal) {
            return cached.clone();
        }
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(principal.to_string());
        seen.insert(catalog::EVERYONE.to_string());
        let mut queue: Vec<String> = self.directory.groups_of(principal);
        while let Some(group) = queue.pop() {
            if seen.insert(group.clone()) {
                queue.extend(self.directory.groups_of(&group));
            }
        }
        // Never-interned identities cannot appear in any rule row, so
        // dropping them from the id set loses nothing.
        let wanted: Vec<&str> = seen.iter().map(String::as_str).collect();
        let ids: HashSet<NameId> = self
            .names
            .lookup_existing(txn, &wanted)
            .into_values()
            .collect();
        let ids = Arc::new(ids);
        self.memberships.insert(principal.to_string(), ids.clone());
        ids
    }

    fn root_verdict(
        &self,
        txn: &ReadTxn<'_>,
        principal: &str,
        mode: &str,
        mode_id: Option<NameId>,
        members: &HashSet<NameId>,
    ) -> Verdict {
        let memo_key = (principal.to_string(), mode.to_string());
        if let Some(cached) = self.root_memo.get(&memo_key) {
            return cached.clone();
        }
        let rules = self.prefs_rules(txn, &self.config.site_prefs, AccessScope::Root);
        let verdict = eval_scope(&rules, AccessScope::Root, mode, mode_id, members, "the site");
        self.root_memo.insert(memo_key, verdict.clone());
        verdict
    }

    fn container_verdict(
        &self,
        txn: &ReadTxn<'_>,
        container: &str,
        principal: &str,
        mode: &str,
        mode_id: Option<NameId>,
        members: &HashSet<NameId>,
    ) -> Verdict {
        let memo_key = (
            container.to_string(),
            principal.to_string(),
            mode.to_string(),
        );
        if let Some(cached) = self.container_memo.get(&memo_key) {
            return cached.clone();
        }
        let prefs = DocPath::new(container, self.config.container_prefs_doc.clone());
        let rules = self.prefs_rules(txn, &prefs, AccessScope::Container);
        let place = format!("'{}'", container);
        let verdict = eval_scope(&rules, AccessScope::Container, mode, mode_id, members, &place);
        self.container_memo.insert(memo_key, verdict.clone());
        verdict
    }

    fn document_verdict(
        &self,
        txn: &ReadTxn<'_>,
        path: &DocPath,
        principal: &str,
        mode: &str,
        mode_id: Option<NameId>,
        members: &HashSet<NameId>,
    ) -> Verdict {
        let ids = self
            .names
            .lookup_existing(txn, &[path.container.as_str(), path.name.as_str()]);
        let (Some(container_id), Some(name_id)) =
            (ids.get(&path.container).copied(), ids.get(&path.name).copied())
        else {
            return None;
        };
        let key = DocKey::new(container_id, name_id);
        let memo_key = (key, principal.to_string(), mode.to_string());
        if let Some(cached) = self.doc_memo.get(&memo_key) {
            return cached.clone();
        }

        // One bulk statement brings in the document-scope rules of every
        // visible document in the container.
        let bulk = self
            .doc_rules
            .entry(container_id)
            .or_insert_with(|| Arc::new(txn.document_rules_in_container(container_id)))
            .clone();
        let verdict = match txn.latest(key) {
            Some(revision) => {
                let rules: Vec<AccessRow> = bulk
                    .iter()
                    .filter(|r| r.revision == revision.id)
                    .copied()
                    .collect();
                let place = format!("'{}'", path);
                eval_scope(&rules, AccessScope::Document, mode, mode_id, members, &place)
            }
            None => None,
        };
        self.doc_memo.insert(memo_key, verdict.clone());
        verdict
    }

    /// Rules of a preferences document, filtered to one scope
    fn prefs_rules(
        &self,
        txn: &ReadTxn<'_>,
        path: &DocPath,
        scope: AccessScope,
    ) -> Vec<AccessRow> {
        let ids = self
            .names
            .lookup_existing(txn, &[path.container.as_str(), path.name.as_str()]);
        let (Some(container), Some(name)) =
            (ids.get(&path.container).copied(), ids.get(&path.name).copied())
        else {
            return Vec::new();
        };
        match txn.latest(DocKey::new(container, name)) {
            Some(revision) => txn
                .access_rules_for(revision.id)
                .into_iter()
                .filter(|r| r.scope == scope)
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Evaluate one scope's rules: deny first, then allow
///
/// A matching allow is a decisive permit. A non-empty allow list without
/// a match denies: directly at document scope, through the synthesized
/// remainder row at broader scopes.
fn eval_scope(
    rules: &[AccessRow],
    scope: AccessScope,
    mode: &str,
    mode_id: Option<NameId>,
    members: &HashSet<NameId>,
    place: &str,
) -> Verdict {
    let mode_id = mode_id?;
    let matching =
        |permission: Permission| rules.iter().filter(move |r| r.permission == permission && r.mode == mode_id);

    if matching(Permission::Deny).any(|r| members.contains(&r.principal)) {
        return Some(AccessDecision::deny(format!(
            "denied by a {}-scope DENY {} rule in {}",
            scope, mode, place
        )));
    }
    let mut allows = matching(Permission::Allow).peekable();
    if allows.peek().is_some() {
        if allows.any(|r| members.contains(&r.principal)) {
            return Some(AccessDecision::permit());
        }
        let remainder_applies = scope == AccessScope::Document
            || matching(Permission::DenyRemainder).any(|r| r.mode == mode_id);
        if remainder_applies {
            return Some(AccessDecision::deny(format!(
                "not in the {}-scope ALLOW {} list of {}",
                scope, mode, place
            )));
        }
    }
    None
}
