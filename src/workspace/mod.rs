//! Host workspace contract.
//!
//! The panel never talks to a concrete editor widget. Hosts implement
//! [`WorkspaceClient`] over whatever pane system they have; the panel
//! consumes focus and cursor events from it and sends navigation back
//! through it. Event streams are tokio broadcast channels, so dropping a
//! receiver is how a subscription ends.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;

use crate::types::{EditorId, Position, Range};

/// A lightweight reference to one open editor pane.
///
/// Cheap to clone and safe to hold across awaits; all live state stays on
/// the host side behind the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorHandle {
    pub id: EditorId,
    /// Absent for buffers that have never been saved.
    pub path: Option<PathBuf>,
    /// Grammar identifier used for provider matching, e.g. `"source.rust"`.
    pub grammar: Option<String>,
}

impl EditorHandle {
    pub fn new(id: EditorId) -> Self {
        Self {
            id,
            path: None,
            grammar: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_grammar(mut self, grammar: impl Into<String>) -> Self {
        self.grammar = Some(grammar.into());
        self
    }

    /// True when this editor is showing the document at `path`.
    pub fn shows(&self, path: &Path) -> bool {
        self.path.as_deref() == Some(path)
    }
}

/// Cursor movement notification for one editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorMoved {
    pub editor: EditorId,
    pub position: Position,
}

/// Connects the panel to its host editor environment.
///
/// The panel holds at most one cursor receiver at a time, re-subscribing
/// whenever focus moves to a different editor. Navigation calls are
/// best-effort: failures are logged by the caller, never retried.
#[async_trait]
pub trait WorkspaceClient: Send + Sync {
    /// The currently focused editor, if any.
    fn active_editor(&self) -> Option<EditorHandle>;

    /// Focus changes. `None` means no editor has focus.
    fn subscribe_active_editor(&self) -> broadcast::Receiver<Option<EditorHandle>>;

    /// Cursor movements inside `editor`.
    fn subscribe_cursor(&self, editor: &EditorHandle) -> broadcast::Receiver<CursorMoved>;

    /// Current caret position in `editor`.
    fn cursor_position(&self, editor: &EditorHandle) -> Position;

    /// Open the document at `path` with the caret at `position`, returning
    /// the editor now showing it. Reuses an existing pane when the host
    /// already has one for `path`.
    async fn open_document(&self, path: &Path, position: Position) -> Result<EditorHandle>;

    /// Move the caret of an already-open editor to `position` and scroll
    /// it into the vertical center of the view.
    async fn reveal(&self, editor: &EditorHandle, position: Position) -> Result<()>;

    /// Replace the selection in `editor` with `range`.
    async fn set_selection(&self, editor: &EditorHandle, range: Range) -> Result<()>;
}
