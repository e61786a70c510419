pub mod config;
pub mod hierarchy;
pub mod logging;
pub mod panel;
pub mod provider;
pub mod types;
pub mod workspace;

pub use types::*;
pub use config::{ConfigError, PanelConfig, Settings};
pub use hierarchy::{CallSite, HierarchyNode};
pub use panel::{HierarchyPanel, PanelView, RowActivation, Status, TreeItem};
pub use provider::{CallHierarchyProvider, ProviderLookup, ProviderRegistration, ProviderRegistry};
pub use workspace::{CursorMoved, EditorHandle, WorkspaceClient};
