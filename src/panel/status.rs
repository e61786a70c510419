//! Classification of refresh outcomes.
//!
//! Every hierarchy refresh funnels through [`classify`] before any view
//! state changes, so the panel can compare the new status against the last
//! rendered one and skip redundant placeholder swaps.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::hierarchy::HierarchyNode;

/// What a single hierarchy refresh produced, before classification.
pub enum FetchOutcome {
    /// No editor was active when the refresh ran.
    NoEditor,
    /// An editor was active but no provider matched it.
    NoProvider,
    /// A provider answered; `None` means it resolved to nothing.
    Resolved(Option<Arc<dyn HierarchyNode>>),
}

/// Classification of a refresh, driving placeholder vs. tree rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    NoEditor,
    NoProvider,
    NoResult,
    Valid,
}

/// Human-readable placeholder copy for one non-valid status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub title: &'static str,
    pub description: &'static str,
}

const NO_EDITOR: StatusMessage = StatusMessage {
    title: "No editor is open",
    description: "Open a file and place the cursor on a symbol to see its call hierarchy.",
};

const NO_PROVIDER: StatusMessage = StatusMessage {
    title: "No call hierarchy provider",
    description: "No registered provider supports the current editor.",
};

const NO_RESULT: StatusMessage = StatusMessage {
    title: "No call hierarchy found",
    description: "The symbol under the cursor has no incoming or outgoing calls.",
};

impl Status {
    /// Placeholder copy for this status. `Valid` renders a tree instead of
    /// a placeholder and has no message.
    pub fn message(self) -> Option<&'static StatusMessage> {
        match self {
            Self::NoEditor => Some(&NO_EDITOR),
            Self::NoProvider => Some(&NO_PROVIDER),
            Self::NoResult => Some(&NO_RESULT),
            Self::Valid => None,
        }
    }

    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }
}

/// Classify a refresh outcome. Pure: no view state is touched here.
///
/// A provider that resolves to nothing and a node with zero entries both
/// classify as `NoResult`; callers cannot tell them apart and should not
/// need to.
pub fn classify(outcome: &FetchOutcome) -> Status {
    match outcome {
        FetchOutcome::NoEditor => Status::NoEditor,
        FetchOutcome::NoProvider => Status::NoProvider,
        FetchOutcome::Resolved(None) => Status::NoResult,
        FetchOutcome::Resolved(Some(node)) if node.entries().is_empty() => Status::NoResult,
        FetchOutcome::Resolved(Some(_)) => Status::Valid,
    }
}
