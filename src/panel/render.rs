//! Pure view projections of panel state.
//!
//! Nothing here is interactive or retained: hosts call
//! [`HierarchyPanel::render`](crate::panel::HierarchyPanel::render) after a
//! change and repaint from the returned value. Expansion state lives in the
//! tree itself, never in what was previously painted.

use serde::Serialize;
use std::path::PathBuf;

use crate::panel::icons::IconGlyph;
use crate::panel::status::Status;
use crate::types::Direction;

/// Label rendered in place of rows for an empty hierarchy level.
pub const NO_DATA_LABEL: &str = "No data";

/// Snapshot of the whole panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    /// Tab title, constant for the lifetime of the panel.
    pub title: &'static str,
    /// Host icon name for the tab, e.g. an octicon key.
    pub icon_name: &'static str,
    pub direction: Direction,
    /// Bumped once per applied content change. Equal revisions mean the
    /// content area was not touched between two snapshots.
    pub revision: u64,
    pub content: ContentView,
}

/// The content area below the panel header.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContentView {
    /// No refresh has been applied yet.
    Empty,
    /// A non-valid status with its placeholder copy.
    Placeholder {
        status: Status,
        title: &'static str,
        description: &'static str,
    },
    /// A resolved hierarchy.
    Tree(TreeRender),
}

impl ContentView {
    pub fn placeholder_title(&self) -> Option<&str> {
        match self {
            Self::Placeholder { title, .. } => Some(title),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&TreeRender> {
        match self {
            Self::Tree(tree) => Some(tree),
            _ => None,
        }
    }
}

/// One rendered hierarchy level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeRender {
    pub rows: Vec<RowRender>,
    /// Present exactly when the level has no rows to show.
    pub placeholder: Option<&'static str>,
}

impl TreeRender {
    pub(crate) fn no_data() -> Self {
        Self {
            rows: Vec::new(),
            placeholder: Some(NO_DATA_LABEL),
        }
    }

    pub(crate) fn with_rows(rows: Vec<RowRender>) -> Self {
        Self {
            rows,
            placeholder: None,
        }
    }

    /// True when this level renders the placeholder instead of rows.
    pub fn is_empty(&self) -> bool {
        self.placeholder.is_some()
    }
}

/// One interactive row of a rendered level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowRender {
    pub name: String,
    pub path: PathBuf,
    pub detail: Option<String>,
    pub tags: Vec<String>,
    pub icon: IconGlyph,
    /// Chevron state: a mounted, visible child subtree.
    pub expanded: bool,
    /// A child fetch is in flight for this row.
    pub loading: bool,
    /// The child level, present only while `expanded` is true.
    pub child: Option<TreeRender>,
}
