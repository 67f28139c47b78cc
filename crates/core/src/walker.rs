//! Resource graph walker.
//!
//! Applies a [`CommandFilter`] to a surface's content, stores the result,
//! then descends depth-first into every Form XObject named in the surface's
//! resources.
//!
//! Forms can be shared between pages and between other forms, and nothing
//! in the file format prevents a form from (indirectly) naming itself. The
//! walker always tracks the forms currently being descended into and skips
//! a form that is its own ancestor. With [`VisitPolicy::Once`] it also
//! remembers every surface it has edited and edits each one only once.

use rustc_hash::FxHashSet;

use crate::codec::{self, Compression};
use crate::document::{SurfaceId, SurfaceStore};
use crate::error::Result;
use crate::filter::CommandFilter;

/// How often a shared form is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitPolicy {
    /// Edit each surface once per walker.
    #[default]
    Once,
    /// Edit a form every time a resource table names it. Filtering is
    /// idempotent, so repeated edits give the same content.
    PerReference,
}

/// Counters collected while walking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Page edits.
    pub pages: usize,
    /// Form edits, counting repeated edits of shared forms.
    pub forms: usize,
    pub operators_removed: usize,
    /// References to already edited forms that were not followed.
    pub revisits_skipped: usize,
    /// References to a form from inside itself.
    pub cycles_skipped: usize,
}

/// Walks drawing surfaces and their forms, editing each content stream.
pub struct ResourceWalker<S: SurfaceStore> {
    store: S,
    filter: CommandFilter,
    compression: Compression,
    policy: VisitPolicy,
    visited: FxHashSet<SurfaceId>,
    /// Surfaces whose forms are being walked.
    path: Vec<SurfaceId>,
    stats: WalkStats,
}

impl<S: SurfaceStore> ResourceWalker<S> {
    pub fn new(store: S, filter: CommandFilter) -> Self {
        Self {
            store,
            filter,
            compression: Compression::default(),
            policy: VisitPolicy::default(),
            visited: FxHashSet::default(),
            path: Vec::new(),
            stats: WalkStats::default(),
        }
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_policy(mut self, policy: VisitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Edit `surface`, then every form reachable from its resources.
    ///
    /// Errors carry the identity of the surface that failed. Surfaces edited
    /// before the failure keep their new content in the store.
    pub fn process(&mut self, surface: &SurfaceId) -> Result<()> {
        if self.path.contains(surface) {
            tracing::warn!(%surface, "skipping form that draws itself");
            self.stats.cycles_skipped += 1;
            return Ok(());
        }
        if self.policy == VisitPolicy::Once && !self.visited.insert(*surface) {
            tracing::trace!(%surface, "already edited");
            self.stats.revisits_skipped += 1;
            return Ok(());
        }

        let removed = self.edit(surface).map_err(|e| e.in_surface(surface))?;
        self.stats.operators_removed += removed;
        if surface.is_page() {
            self.stats.pages += 1;
        } else {
            self.stats.forms += 1;
        }

        let resources = self
            .store
            .resources(surface)
            .map_err(|e| e.in_surface(surface))?;

        self.path.push(*surface);
        let mut result = Ok(());
        for (name, form) in resources.form_entries() {
            tracing::trace!(%surface, name, %form, "descending into form");
            result = self.process(&form);
            if result.is_err() {
                break;
            }
        }
        self.path.pop();
        result
    }

    /// Read, filter and replace one surface's content.
    fn edit(&mut self, surface: &SurfaceId) -> Result<usize> {
        let data = self.store.content(surface)?;
        let tokens = codec::lex(&data)?;
        let total = tokens.len();
        let (tokens, removed) = self.filter.filter_counted(tokens)?;
        tracing::debug!(%surface, tokens = total, kept = tokens.len(), removed, "filtered content");
        let content = codec::serialize(&tokens, self.compression)?;
        self.store.set_content(surface, content)?;
        Ok(removed)
    }
}
