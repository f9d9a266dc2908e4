//! The `Folio` facade

use crate::config::FolioConfig;
use folio_access::{AccessResolver, Directory};
use folio_backend::{Backend, LeaseRow, Statements};
use folio_concurrency as concurrency;
use folio_core::{
    AccessDecision, AccessTarget, DocContent, DocKey, DocPath, Error, Result, RevTag, Timestamp,
};
use folio_dictionary::{FieldDictionary, NameDictionary};
use folio_revision as revision;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Options for a save request
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Use this timestamp instead of the current time
    pub force_timestamp: Option<Timestamp>,
    /// Overwrite the current revision instead of creating a new one
    pub amend_in_place: bool,
    /// Use this version number instead of the computed one (import/sync)
    pub explicit_version: Option<u32>,
    /// Revision comment
    pub comment: String,
}

impl SaveOptions {
    /// Default options: new revision, current time, no comment
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this timestamp instead of the current time
    pub fn force_timestamp(mut self, at: Timestamp) -> Self {
        self.force_timestamp = Some(at);
        self
    }

    /// Overwrite the current revision instead of creating a new one
    pub fn amend_in_place(mut self) -> Self {
        self.amend_in_place = true;
        self
    }

    /// Use this version number instead of the computed one
    pub fn explicit_version(mut self, version: u32) -> Self {
        self.explicit_version = Some(version);
        self
    }

    /// Set the revision comment
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Which revision a read asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadVersion {
    /// The current visible revision
    Latest,
    /// An explicit version; serves the closest revision at or above it
    Number(u32),
}

/// Revision metadata, names resolved back to strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionInfo {
    /// Version number
    pub version: u32,
    /// Author principal
    pub author: String,
    /// Modification timestamp
    pub modified: Timestamp,
    /// Revision comment (empty for none)
    pub comment: String,
    /// Whether this is the current visible revision
    pub is_latest: bool,
}

/// Advisory lock outcome with the holder resolved to a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockStatus {
    /// The lock is now held by the requester
    Acquired,
    /// Somebody else holds it; retry or report, never wait here
    Held {
        /// Current holder
        holder: String,
        /// When they took it
        since: Timestamp,
    },
}

/// Advisory editing reservation with the holder resolved to a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    /// Holder principal
    pub holder: String,
    /// When the lease was taken
    pub taken: Timestamp,
    /// When the sweep may reclaim it
    pub expires: Timestamp,
}

/// The storage core facade
///
/// Stateless beyond the shared backend, the dictionary caches and the
/// resolver memos; cheap to share behind `Arc` and safe across threads.
pub struct Folio {
    backend: Arc<Backend>,
    names: Arc<NameDictionary>,
    fields: Arc<FieldDictionary>,
    resolver: AccessResolver,
}

impl Folio {
    /// Open a fresh store with default configuration
    pub fn open(directory: Arc<dyn Directory>) -> Self {
        Self::with_config(directory, FolioConfig::default())
    }

    /// Open a fresh store
    pub fn with_config(directory: Arc<dyn Directory>, config: FolioConfig) -> Self {
        let backend = Backend::open();
        let names = NameDictionary::new();
        let resolver = AccessResolver::new(
            backend.clone(),
            names.clone(),
            directory,
            config.resolver,
        );
        Self {
            backend,
            names,
            fields: FieldDictionary::new(),
            resolver,
        }
    }

    pub(crate) fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }

    pub(crate) fn names(&self) -> &Arc<NameDictionary> {
        &self.names
    }

    pub(crate) fn fields(&self) -> &Arc<FieldDictionary> {
        &self.fields
    }

    /// Interned key for an existing document, read-only
    fn existing_key(&self, txn: &impl Statements, path: &DocPath) -> Result<DocKey> {
        let ids = self
            .names
            .lookup_existing(txn, &[path.container.as_str(), path.name.as_str()]);
        match (ids.get(&path.container), ids.get(&path.name)) {
            (Some(container), Some(name)) => Ok(DocKey::new(*container, *name)),
            _ => Err(Error::DocumentNotFound {
                container: path.container.clone(),
                name: path.name.clone(),
            }),
        }
    }

    // ======================== Save / read / history ========================

    /// Save a revision of a document, returning its version number
    ///
    /// One transaction: dictionary resolution, the revision protocol,
    /// content decomposition and access-rule capture all commit together.
    pub fn save(
        &self,
        path: &DocPath,
        content: &DocContent,
        author: &str,
        options: &SaveOptions,
    ) -> Result<u32> {
        if !path.is_valid() {
            // The original quietly dropped these; surfaced as a typed
            // error the host can match to keep that behavior.
            return Err(Error::IdentityMissing { legacy_noop: true });
        }
        let at = options.force_timestamp.unwrap_or_else(Timestamp::now);
        let mut txn = self.backend.write();
        let ids = self.names.resolve(
            &mut txn,
            &[
                path.container.as_str(),
                path.name.as_str(),
                author,
                options.comment.as_str(),
            ],
        )?;
        let key = DocKey::new(ids[&path.container], ids[&path.name]);
        let author_id = ids[author];
        let comment_id = ids[&options.comment];

        let current = txn.latest(key);
        let outcome = match current {
            Some(row) if options.amend_in_place => {
                revision::amend(&mut txn, row, author_id, comment_id, at)
            }
            _ => revision::save_new(
                &mut txn,
                key,
                author_id,
                comment_id,
                at,
                options.explicit_version,
            ),
        };
        folio_attribute::decompose(
            &mut txn,
            &self.names,
            &self.fields,
            outcome.revision,
            RevTag::Latest,
            content,
        )?;
        folio_access::capture(&mut txn, &self.names, outcome.revision, key.container, content)?;
        txn.commit();
        self.resolver.invalidate();
        info!(%path, version = outcome.version, "saved");
        Ok(outcome.version)
    }

    /// Read a document, returning its content and whether the served
    /// revision is the latest
    pub fn read(&self, path: &DocPath, version: ReadVersion) -> Result<(DocContent, bool)> {
        let txn = self.backend.read();
        let key = self.existing_key(&txn, path)?;
        let row = match version {
            ReadVersion::Latest => txn.latest(key),
            ReadVersion::Number(wanted) => revision::lookup_version(&txn, key, wanted),
        };
        let Some(row) = row else {
            return Err(Error::DocumentNotFound {
                container: path.container.clone(),
                name: path.name.clone(),
            });
        };
        let content = folio_attribute::reconstruct(&txn, &self.names, &self.fields, row.id)?;
        Ok((content, row.tag == RevTag::Latest))
    }

    /// Revision metadata without the content
    pub fn info(&self, path: &DocPath, version: ReadVersion) -> Result<RevisionInfo> {
        let txn = self.backend.read();
        let key = self.existing_key(&txn, path)?;
        let row = match version {
            ReadVersion::Latest => txn.latest(key),
            ReadVersion::Number(wanted) => revision::lookup_version(&txn, key, wanted),
        };
        let Some(row) = row else {
            return Err(Error::DocumentNotFound {
                container: path.container.clone(),
                name: path.name.clone(),
            });
        };
        Ok(RevisionInfo {
            version: row.version,
            author: self.names.name_of(&txn, row.author)?,
            modified: row.modified,
            comment: self.names.name_of(&txn, row.comment)?,
            is_latest: row.tag == RevTag::Latest,
        })
    }

    /// Whether a document currently exists
    pub fn exists(&self, path: &DocPath) -> bool {
        let txn = self.backend.read();
        match self.existing_key(&txn, path) {
            Ok(key) => revision::exists(&txn, key),
            Err(_) => false,
        }
    }

    /// Roll back to the previous revision, returning the restored
    /// version; fatal without a prior revision
    pub fn rollback(&self, path: &DocPath, author: &str) -> Result<u32> {
        let mut txn = self.backend.write();
        let key = self.existing_key(&txn, path)?;
        let restored = revision::rollback(&mut txn, key)?;
        txn.commit();
        self.resolver.invalidate();
        info!(%path, author, restored, "rolled back");
        Ok(restored)
    }

    /// Rename or move a document; history keeps the old identity
    ///
    /// An active lease on the document is deliberately not consulted; a
    /// host wanting to warn calls [`Folio::lease`] first.
    pub fn rename(&self, old: &DocPath, new: &DocPath) -> Result<()> {
        if !old.is_valid() || !new.is_valid() {
            return Err(Error::IdentityMissing { legacy_noop: false });
        }
        let mut txn = self.backend.write();
        let old_key = self.existing_key(&txn, old)?;
        let ids = self
            .names
            .resolve(&mut txn, &[new.container.as_str(), new.name.as_str()])?;
        let new_key = DocKey::new(ids[&new.container], ids[&new.name]);
        revision::rename(&mut txn, old_key, new_key)?;
        txn.commit();
        self.resolver.invalidate();
        info!(%old, %new, "renamed");
        Ok(())
    }

    /// Reserve an identity before its first save; true when a
    /// placeholder was created
    pub fn reserve(&self, path: &DocPath) -> Result<bool> {
        if !path.is_valid() {
            return Err(Error::IdentityMissing { legacy_noop: false });
        }
        let mut txn = self.backend.write();
        let ids = self
            .names
            .resolve(&mut txn, &[path.container.as_str(), path.name.as_str()])?;
        let key = DocKey::new(ids[&path.container], ids[&path.name]);
        let created = revision::reserve(&mut txn, key, Timestamp::now()).is_some();
        txn.commit();
        Ok(created)
    }

    /// Erase a document entirely, returning the number of revisions
    /// removed
    pub fn purge(&self, path: &DocPath) -> Result<usize> {
        let mut txn = self.backend.write();
        let key = match self.existing_key(&txn, path) {
            Ok(key) => key,
            // Names never interned: nothing can exist to purge.
            Err(_) => return Ok(0),
        };
        let removed = revision::purge(&mut txn, key);
        txn.commit();
        self.resolver.invalidate();
        Ok(removed)
    }

    // ======================== Access ========================

    /// Check whether `principal` may perform `mode` on `target`
    ///
    /// Denials carry a human-readable reason on the decision.
    pub fn check_access(
        &self,
        principal: &str,
        mode: &str,
        target: &AccessTarget,
    ) -> Result<AccessDecision> {
        self.resolver.evaluate(principal, mode, target)
    }

    // ======================== Locks / leases ========================

    /// Try to take the advisory lock on a document
    pub fn try_lock(&self, path: &DocPath, holder: &str) -> Result<LockStatus> {
        let mut txn = self.backend.write();
        let ids = self.names.resolve(
            &mut txn,
            &[path.container.as_str(), path.name.as_str(), holder],
        )?;
        let key = DocKey::new(ids[&path.container], ids[&path.name]);
        let outcome = concurrency::try_lock(&mut txn, key, ids[holder], Timestamp::now());
        let status = match outcome {
            concurrency::LockOutcome::Acquired => LockStatus::Acquired,
            concurrency::LockOutcome::Held { holder, since } => LockStatus::Held {
                holder: self.names.name_of(&txn, holder)?,
                since,
            },
        };
        txn.commit();
        Ok(status)
    }

    /// Release the advisory lock; true when `holder` held it
    pub fn unlock(&self, path: &DocPath, holder: &str) -> Result<bool> {
        let mut txn = self.backend.write();
        let released = match self.existing_key(&txn, path) {
            Ok(key) => {
                let ids = self.names.lookup_existing(&txn, &[holder]);
                match ids.get(holder).copied() {
                    Some(holder_id) => concurrency::unlock(&mut txn, key, holder_id),
                    None => false,
                }
            }
            Err(_) => false,
        };
        txn.commit();
        Ok(released)
    }

    /// Current lease on a document, if any
    pub fn lease(&self, path: &DocPath) -> Result<Option<Lease>> {
        let txn = self.backend.read();
        let key = match self.existing_key(&txn, path) {
            Ok(key) => key,
            Err(_) => return Ok(None),
        };
        match concurrency::lease(&txn, key) {
            Some(row) => Ok(Some(Lease {
                holder: self.names.name_of(&txn, row.holder)?,
                taken: row.taken,
                expires: row.expires,
            })),
            None => Ok(None),
        }
    }

    /// Set or clear a document's lease
    pub fn set_lease(&self, path: &DocPath, lease: Option<Lease>) -> Result<()> {
        let mut txn = self.backend.write();
        match lease {
            Some(lease) => {
                let ids = self.names.resolve(
                    &mut txn,
                    &[
                        path.container.as_str(),
                        path.name.as_str(),
                        lease.holder.as_str(),
                    ],
                )?;
                let key = DocKey::new(ids[&path.container], ids[&path.name]);
                concurrency::set_lease(
                    &mut txn,
                    key,
                    Some(LeaseRow {
                        holder: ids[&lease.holder],
                        taken: lease.taken,
                        expires: lease.expires,
                    }),
                );
            }
            None => {
                if let Ok(key) = self.existing_key(&txn, path) {
                    concurrency::set_lease(&mut txn, key, None);
                }
            }
        }
        txn.commit();
        Ok(())
    }

    /// Expiry sweep: reclaim every lease past its expiry at `now`
    pub fn sweep_leases(&self, now: Timestamp) -> Result<usize> {
        let mut txn = self.backend.write();
        let reclaimed = concurrency::sweep_expired(&mut txn, now);
        txn.commit();
        Ok(reclaimed)
    }

    // ======================== Enumeration ========================

    /// Names of the visible documents in a container, sorted
    pub fn documents(&self, container: &str) -> Result<Vec<String>> {
        let txn = self.backend.read();
        let ids = self.names.lookup_existing(&txn, &[container]);
        let Some(container_id) = ids.get(container).copied() else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for row in txn.latest_in_container(container_id) {
            out.push(self.names.name_of(&txn, row.name)?);
        }
        out.sort();
        Ok(out)
    }

    /// Container names under `parent`, sorted
    ///
    /// Containers form a hierarchy through `/`-separated names. With
    /// `recursive` every descendant is returned, otherwise only direct
    /// children; an empty `parent` enumerates from the top. A container
    /// exists while it holds at least one visible document.
    pub fn containers(&self, parent: &str, recursive: bool) -> Result<Vec<String>> {
        let txn = self.backend.read();
        let mut out = BTreeSet::new();
        for id in txn.containers() {
            let name = self.names.name_of(&txn, id)?;
            let relative = if parent.is_empty() {
                Some(name.as_str())
            } else {
                name.strip_prefix(parent)
                    .and_then(|rest| rest.strip_prefix('/'))
            };
            let Some(relative) = relative else { continue };
            if relative.is_empty() {
                continue;
            }
            if recursive {
                // Every ancestor of a populated container is visible too.
                let mut end = 0;
                for segment in relative.split('/') {
                    end += segment.len();
                    out.insert(name[..name.len() - relative.len() + end].to_string());
                    end += 1;
                }
            } else if let Some(first) = relative.split('/').next() {
                let prefix_len = name.len() - relative.len();
                out.insert(name[..prefix_len + first.len()].to_string());
            }
        }
        Ok(out.into_iter().collect())
    }

}

impl std::fmt::Debug for Folio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Folio").finish_non_exhaustive()
    }
}
