//! Call hierarchy providers and their registry.
//!
//! A provider is one language integration (usually a language server
//! adapter) that can answer "who calls this" and "what does this call" for
//! a document position. Hosts register providers against grammar scopes;
//! the panel looks one up per refresh through [`ProviderLookup`] and never
//! caches the answer across refreshes.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::hierarchy::HierarchyNode;
use crate::types::Position;
use crate::workspace::EditorHandle;

/// One language integration answering hierarchy queries.
///
/// Both calls resolve the symbol at `position` and return the first level
/// of the hierarchy, or `None` when the position has no resolvable symbol.
#[async_trait]
pub trait CallHierarchyProvider: Send + Sync {
    async fn incoming_calls(
        &self,
        editor: &EditorHandle,
        position: Position,
    ) -> Result<Option<Arc<dyn HierarchyNode>>>;

    async fn outgoing_calls(
        &self,
        editor: &EditorHandle,
        position: Position,
    ) -> Result<Option<Arc<dyn HierarchyNode>>>;
}

/// Read-only provider lookup used by the panel.
///
/// Split from [`ProviderRegistry`] so tests and embedders can supply a
/// fixed provider without registry bookkeeping.
pub trait ProviderLookup: Send + Sync {
    fn provider_for_editor(&self, editor: &EditorHandle) -> Option<Arc<dyn CallHierarchyProvider>>;
}

struct RegisteredProvider {
    id: u64,
    grammars: Vec<String>,
    priority: i32,
    provider: Arc<dyn CallHierarchyProvider>,
}

impl RegisteredProvider {
    fn matches(&self, editor: &EditorHandle) -> bool {
        if self.grammars.is_empty() {
            return true;
        }
        match editor.grammar.as_deref() {
            Some(grammar) => self.grammars.iter().any(|g| g == grammar),
            None => false,
        }
    }
}

struct RegistryInner {
    entries: RwLock<Vec<RegisteredProvider>>,
    next_id: AtomicU64,
}

/// Keeps the set of registered providers and matches them to editors.
///
/// Clones share one underlying registry, so a host can hand the panel a
/// clone while continuing to register integrations as they load.
#[derive(Clone)]
pub struct ProviderRegistry {
    inner: Arc<RegistryInner>,
}

/// Keeps one registration alive. Dropping it removes the provider.
pub struct ProviderRegistration {
    registry: Weak<RegistryInner>,
    id: u64,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                entries: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register a provider for a set of grammar scopes.
    ///
    /// An empty `grammars` list matches every editor. Higher `priority`
    /// wins when several providers match; ties go to the earliest
    /// registration.
    pub fn register(
        &self,
        provider: Arc<dyn CallHierarchyProvider>,
        grammars: Vec<String>,
        priority: i32,
    ) -> ProviderRegistration {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.entries.write().push(RegisteredProvider {
            id,
            grammars,
            priority,
            provider,
        });
        ProviderRegistration {
            registry: Arc::downgrade(&self.inner),
            id,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderLookup for ProviderRegistry {
    fn provider_for_editor(&self, editor: &EditorHandle) -> Option<Arc<dyn CallHierarchyProvider>> {
        let entries = self.inner.entries.read();
        let mut best: Option<&RegisteredProvider> = None;
        for entry in entries.iter().filter(|e| e.matches(editor)) {
            let better = match best {
                Some(current) => entry.priority > current.priority,
                None => true,
            };
            if better {
                best = Some(entry);
            }
        }
        best.map(|e| e.provider.clone())
    }
}

impl Drop for ProviderRegistration {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            inner.entries.write().retain(|e| e.id != self.id);
        }
    }
}
