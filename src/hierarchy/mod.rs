//! Data contract between call hierarchy providers and the panel.
//!
//! A provider resolves one level of the call graph at a time and hands it
//! over as a [`HierarchyNode`]. Each entry in a level is a [`CallSite`]
//! describing a caller or callee. Deeper levels are fetched on demand via
//! `item_at`, so the panel never walks the graph eagerly.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::types::Range;

/// One caller or callee entry in a resolved hierarchy level.
///
/// `range` covers the whole referenced symbol; `selection_range` is the
/// sub-span a navigation should select, typically the symbol name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSite {
    pub name: String,
    pub path: PathBuf,
    pub range: Range,
    pub selection_range: Range,
    /// Symbol kind as reported by the provider, e.g. `"function"`.
    /// Takes precedence over `icon` when resolving a glyph.
    pub kind: Option<String>,
    /// Free-form icon hint for providers that do not report a kind.
    pub icon: Option<String>,
    /// Secondary text shown next to the name, e.g. a container or signature.
    pub detail: Option<String>,
    pub tags: Vec<String>,
}

impl CallSite {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        range: Range,
        selection_range: Range,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            range,
            selection_range,
            kind: None,
            icon: None,
            detail: None,
            tags: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// One resolved level of the call graph.
///
/// Implementations are owned by providers. `entries` must be stable for the
/// lifetime of the node; the panel indexes into it when expanding rows.
#[async_trait]
pub trait HierarchyNode: Send + Sync {
    /// Call sites at this level, in provider order.
    fn entries(&self) -> &[CallSite];

    /// Resolve the next level for the entry at `index`.
    ///
    /// Returns `Ok(None)` when there is no deeper data for the entry. The
    /// panel asks at most once per row and caches the mounted result, so
    /// implementations do not need their own memoization.
    async fn item_at(&self, index: usize) -> Result<Option<Arc<dyn HierarchyNode>>>;
}
