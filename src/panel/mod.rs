//! The call hierarchy panel.
//!
//! This module provides one panel session that follows the host's focused
//! editor, fetches call hierarchies through registered providers, and
//! exposes the result as a lazily expanded tree.
//!
//! # Architecture
//!
//! ```text
//! HierarchyPanel
//!   - Subscription task (focus + debounced cursor events)
//!   - Sequence-numbered refreshes -> Status
//!   - Owns the root TreeItem
//!         |
//!      TreeItem (one per expanded level)
//!   - Per-row child slots: Unloaded -> Loading -> Mounted
//!   - Double-activation navigation
//!         |
//!      render() -> PanelView / TreeRender  (pure projection)
//! ```

mod debounce;
pub mod icons;
pub mod render;
pub mod status;
pub mod tree;
mod view;

pub use icons::{DEFAULT_GLYPH, IconGlyph, resolve_icon};
pub use render::{ContentView, NO_DATA_LABEL, PanelView, RowRender, TreeRender};
pub use status::{FetchOutcome, Status, StatusMessage, classify};
pub use tree::{RowActivation, TreeItem};
pub use view::{HierarchyPanel, PANEL_ICON, PANEL_TITLE};
