//! Lazily expanded hierarchy levels.
//!
//! A [`TreeItem`] wraps one resolved [`HierarchyNode`] level. Child levels
//! are fetched on first expand, one fetch per row for the lifetime of the
//! item, and collapses only hide the mounted subtree. Expansion state is
//! held here as explicit per-row slots; rendering is a projection of those
//! slots and never feeds back into them.

use futures::future::join_all;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::{Duration, Instant};

use crate::hierarchy::{CallSite, HierarchyNode};
use crate::panel::icons::resolve_icon;
use crate::panel::render::{RowRender, TreeRender};
use crate::workspace::WorkspaceClient;

/// How one row activation was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowActivation {
    /// The activation toggled the row's child subtree.
    Toggled,
    /// The activation navigated to the row's call site.
    Navigated,
    /// The index was out of range.
    Ignored,
}

/// Per-row expansion slot.
///
/// `Loading` doubles as the fetch-in-progress marker: a row enters it at
/// most once, so concurrent toggles cannot mount two subtrees.
enum ChildSlot {
    Unloaded,
    Loading,
    Mounted { item: Arc<TreeItem>, visible: bool },
}

struct Row {
    site: CallSite,
    child: Mutex<ChildSlot>,
}

struct PendingActivation {
    row: usize,
    armed_at: Instant,
}

/// One level of the rendered hierarchy, owning its expanded children.
pub struct TreeItem {
    node: Option<Arc<dyn HierarchyNode>>,
    rows: Vec<Row>,
    pending_activation: Mutex<Option<PendingActivation>>,
    activation_window: Duration,
    workspace: Arc<dyn WorkspaceClient>,
}

impl TreeItem {
    /// Wrap one resolved level. `None` produces a terminally empty item
    /// that renders the no-data placeholder.
    pub fn new(
        node: Option<Arc<dyn HierarchyNode>>,
        workspace: Arc<dyn WorkspaceClient>,
        activation_window: Duration,
    ) -> Self {
        let rows = node
            .as_ref()
            .map(|n| {
                n.entries()
                    .iter()
                    .cloned()
                    .map(|site| Row {
                        site,
                        child: Mutex::new(ChildSlot::Unloaded),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            node,
            rows,
            pending_activation: Mutex::new(None),
            activation_window,
            workspace,
        }
    }

    /// True when there is nothing to expand or navigate to.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// The call site backing row `index`.
    pub fn entry(&self, index: usize) -> Option<&CallSite> {
        self.rows.get(index).map(|row| &row.site)
    }

    /// The mounted child level for row `index`, visible or not.
    ///
    /// Hosts use this to drive toggles on nested levels.
    pub fn child_item(&self, index: usize) -> Option<Arc<TreeItem>> {
        match &*self.rows.get(index)?.child.lock() {
            ChildSlot::Mounted { item, .. } => Some(item.clone()),
            _ => None,
        }
    }

    /// Expand or collapse row `index`.
    ///
    /// The first toggle fetches the child level and mounts it expanded;
    /// later toggles only flip visibility. A toggle that lands while the
    /// first fetch is still in flight is dropped, the in-flight mount
    /// already covers it.
    pub async fn toggle(&self, index: usize) {
        let Some(node) = self.node.as_ref() else {
            return;
        };
        let Some(row) = self.rows.get(index) else {
            return;
        };

        {
            let mut slot = row.child.lock();
            match &mut *slot {
                ChildSlot::Mounted { visible, .. } => {
                    *visible = !*visible;
                    return;
                }
                ChildSlot::Loading => {
                    crate::debug_event!("tree", "toggle dropped", "row {index} fetch in flight");
                    return;
                }
                ChildSlot::Unloaded => *slot = ChildSlot::Loading,
            }
        }

        let child = match node.item_at(index).await {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!("[tree] child fetch failed for row {index}: {e:#}");
                None
            }
        };

        // A failed or empty fetch still mounts, as an empty level, so the
        // row settles instead of staying in Loading.
        let item = Arc::new(TreeItem::new(
            child,
            self.workspace.clone(),
            self.activation_window,
        ));
        *row.child.lock() = ChildSlot::Mounted {
            item,
            visible: true,
        };
    }

    /// Toggle every row concurrently, completing once all rows settle.
    ///
    /// Used to auto-expand the first level of a freshly shown hierarchy.
    pub async fn toggle_all(&self) {
        join_all((0..self.rows.len()).map(|index| self.toggle(index))).await;
    }

    /// Interpret a row activation.
    ///
    /// A single activation toggles. A second activation on the same row
    /// within the activation window navigates instead, and the window
    /// re-arms. Hosts with native double-click detection can pass
    /// `is_confirmed` to navigate immediately.
    pub async fn activate_row(&self, index: usize, is_confirmed: bool) -> RowActivation {
        if index >= self.rows.len() {
            return RowActivation::Ignored;
        }

        let navigate = if is_confirmed {
            *self.pending_activation.lock() = None;
            true
        } else {
            let mut pending = self.pending_activation.lock();
            match pending.take() {
                Some(p) if p.row == index && p.armed_at.elapsed() <= self.activation_window => true,
                _ => {
                    *pending = Some(PendingActivation {
                        row: index,
                        armed_at: Instant::now(),
                    });
                    false
                }
            }
        };

        if navigate {
            self.navigate(index).await;
            RowActivation::Navigated
        } else {
            self.toggle(index).await;
            RowActivation::Toggled
        }
    }

    /// Open the row's document and select its call site.
    ///
    /// Reuses the focused editor when it already shows the target path.
    /// Failures are logged and swallowed; navigation is best-effort.
    async fn navigate(&self, index: usize) {
        let Some(site) = self.entry(index) else {
            return;
        };

        let target = site.range.start;
        let outcome = async {
            match self.workspace.active_editor() {
                Some(editor) if editor.shows(&site.path) => {
                    self.workspace.reveal(&editor, target).await?;
                    self.workspace
                        .set_selection(&editor, site.selection_range)
                        .await
                }
                _ => {
                    let editor = self.workspace.open_document(&site.path, target).await?;
                    self.workspace
                        .set_selection(&editor, site.selection_range)
                        .await
                }
            }
        }
        .await;

        match outcome {
            Ok(()) => {
                crate::debug_event!("tree", "navigated", "{}:{target}", site.path.display());
            }
            Err(e) => {
                tracing::warn!("[tree] navigation to {} failed: {e:#}", site.path.display());
            }
        }
    }

    /// Project the current expansion state into a render.
    pub fn render(&self) -> TreeRender {
        if self.rows.is_empty() {
            return TreeRender::no_data();
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let (expanded, loading, child) = match &*row.child.lock() {
                    ChildSlot::Unloaded => (false, false, None),
                    ChildSlot::Loading => (false, true, None),
                    ChildSlot::Mounted { item, visible } => {
                        (*visible, false, visible.then(|| item.render()))
                    }
                };
                let site = &row.site;
                RowRender {
                    name: site.name.clone(),
                    path: site.path.clone(),
                    detail: site.detail.clone(),
                    tags: site.tags.clone(),
                    icon: resolve_icon(site.kind.as_deref().or(site.icon.as_deref())),
                    expanded,
                    loading,
                    child,
                }
            })
            .collect();

        TreeRender::with_rows(rows)
    }
}
