//! The panel session: editor subscriptions, refreshes, and view state.
//!
//! A [`HierarchyPanel`] owns one root [`TreeItem`] at a time plus the
//! subscription task that tracks the host's focused editor. Sessions are
//! plain values; embedders and tests can run several side by side.
//!
//! Refreshes are sequence-numbered. A refresh that resolves after a newer
//! one has been issued is dropped instead of applied, so late provider
//! responses can never overwrite a newer render.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::config::{PanelConfig, Settings};
use crate::panel::debounce::RefreshDebouncer;
use crate::panel::render::{ContentView, PanelView};
use crate::panel::status::{FetchOutcome, Status, classify};
use crate::panel::tree::TreeItem;
use crate::provider::ProviderLookup;
use crate::types::{Direction, Position};
use crate::workspace::{CursorMoved, EditorHandle, WorkspaceClient};

/// Tab title reported to hosts.
pub const PANEL_TITLE: &str = "Call Hierarchy";

/// Tab icon name reported to hosts.
pub const PANEL_ICON: &str = "link";

/// Parking deadline for the debounce arm while nothing is pending.
const IDLE_PARK: Duration = Duration::from_secs(3600);

enum PanelContent {
    /// No refresh applied yet.
    Empty,
    Placeholder(Status),
    Tree(Arc<TreeItem>),
}

struct ViewState {
    content: PanelContent,
    last_status: Option<Status>,
    revision: u64,
}

struct SubscriptionTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

struct PanelInner {
    providers: Arc<dyn ProviderLookup>,
    workspace: Arc<dyn WorkspaceClient>,
    config: PanelConfig,
    direction: Mutex<Direction>,
    active: AtomicBool,
    /// Issue counter for refreshes; only the latest may apply.
    refresh_seq: AtomicU64,
    view: Mutex<ViewState>,
    /// Editor and position of the last resolved refresh target, reused
    /// when the direction flips.
    last_target: Mutex<Option<(EditorHandle, Position)>>,
    task: Mutex<Option<SubscriptionTask>>,
}

/// One call hierarchy panel session.
///
/// Clones share the session. Hosts render from [`HierarchyPanel::render`]
/// and drive row interaction through the [`TreeItem`] returned by
/// [`HierarchyPanel::tree`].
#[derive(Clone)]
pub struct HierarchyPanel {
    inner: Arc<PanelInner>,
}

impl HierarchyPanel {
    pub fn new(
        providers: Arc<dyn ProviderLookup>,
        workspace: Arc<dyn WorkspaceClient>,
        settings: &Settings,
    ) -> Self {
        Self {
            inner: Arc::new(PanelInner {
                providers,
                workspace,
                config: settings.panel.clone(),
                direction: Mutex::new(Direction::default()),
                active: AtomicBool::new(false),
                refresh_seq: AtomicU64::new(0),
                view: Mutex::new(ViewState {
                    content: PanelContent::Empty,
                    last_status: None,
                    revision: 0,
                }),
                last_target: Mutex::new(None),
                task: Mutex::new(None),
            }),
        }
    }

    /// Mark the panel active and start tracking the focused editor.
    ///
    /// Spawns the subscription task, so the caller must be inside a tokio
    /// runtime. Idempotent while already active.
    pub fn activate(&self) {
        if self.inner.active.swap(true, Ordering::SeqCst) {
            return;
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(run_subscriptions(self.inner.clone(), token.clone()));
        *self.inner.task.lock() = Some(SubscriptionTask { token, handle });
        crate::log_event!("panel", "activated");
    }

    /// Mark the panel inactive and stop the subscription task.
    ///
    /// A debounced refresh that has not fired yet dies with the task;
    /// an already in-flight fetch may finish but its result is dropped.
    pub fn deactivate(&self) {
        if !self.inner.active.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Some(task) = self.inner.task.lock().take() {
            task.token.cancel();
            task.handle.abort();
        }
        crate::log_event!("panel", "deactivated");
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    pub fn title(&self) -> &'static str {
        PANEL_TITLE
    }

    pub fn icon_name(&self) -> &'static str {
        PANEL_ICON
    }

    pub fn direction(&self) -> Direction {
        *self.inner.direction.lock()
    }

    /// Switch hierarchy direction and refresh the last known target.
    ///
    /// No-op when `direction` equals the current one.
    pub async fn set_direction(&self, direction: Direction) {
        {
            let mut current = self.inner.direction.lock();
            if *current == direction {
                return;
            }
            *current = direction;
        }
        crate::log_event!("panel", "direction", "{direction}");

        let target = self.inner.last_target.lock().clone();
        match target {
            Some((editor, position)) => self.inner.refresh(Some(editor), Some(position)).await,
            None => self.inner.refresh(None, None).await,
        }
    }

    /// Resolve and show the hierarchy for an editor position.
    ///
    /// Both arguments default to the host's current state: the focused
    /// editor and its caret. Does nothing while the panel is inactive.
    pub async fn show_call_hierarchy(
        &self,
        editor: Option<&EditorHandle>,
        position: Option<Position>,
    ) {
        if !self.is_active() {
            return;
        }
        self.inner.refresh(editor.cloned(), position).await;
    }

    /// Snapshot the current panel state for painting.
    pub fn render(&self) -> PanelView {
        let direction = self.direction();
        let view = self.inner.view.lock();
        let content = match &view.content {
            PanelContent::Empty => ContentView::Empty,
            PanelContent::Placeholder(status) => match status.message() {
                Some(message) => ContentView::Placeholder {
                    status: *status,
                    title: message.title,
                    description: message.description,
                },
                // Valid is never stored as a placeholder.
                None => ContentView::Empty,
            },
            PanelContent::Tree(tree) => ContentView::Tree(tree.render()),
        };

        PanelView {
            title: PANEL_TITLE,
            icon_name: PANEL_ICON,
            direction,
            revision: view.revision,
            content,
        }
    }

    /// The mounted root tree, when the last refresh was valid.
    pub fn tree(&self) -> Option<Arc<TreeItem>> {
        match &self.inner.view.lock().content {
            PanelContent::Tree(tree) => Some(tree.clone()),
            _ => None,
        }
    }

    /// Status of the last applied refresh.
    pub fn status(&self) -> Option<Status> {
        self.inner.view.lock().last_status
    }
}

impl PanelInner {
    /// Run one sequence-numbered refresh and apply its outcome.
    async fn refresh(&self, editor: Option<EditorHandle>, position: Option<Position>) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        let seq = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(editor) = editor.or_else(|| self.workspace.active_editor()) else {
            self.apply(seq, FetchOutcome::NoEditor).await;
            return;
        };
        let position = position.unwrap_or_else(|| self.workspace.cursor_position(&editor));
        *self.last_target.lock() = Some((editor.clone(), position));

        let Some(provider) = self.providers.provider_for_editor(&editor) else {
            self.apply(seq, FetchOutcome::NoProvider).await;
            return;
        };

        let direction = *self.direction.lock();
        crate::debug_event!(
            "panel",
            "refresh",
            "seq {seq} {direction} at {position} in {}",
            editor_label(&editor)
        );

        let result = match direction {
            Direction::Incoming => provider.incoming_calls(&editor, position).await,
            Direction::Outgoing => provider.outgoing_calls(&editor, position).await,
        };
        let outcome = match result {
            Ok(node) => FetchOutcome::Resolved(node),
            Err(e) => {
                tracing::warn!("[panel] {direction} fetch failed: {e:#}");
                FetchOutcome::Resolved(None)
            }
        };

        self.apply(seq, outcome).await;
    }

    /// Apply a classified outcome to the view unless it went stale.
    async fn apply(&self, seq: u64, outcome: FetchOutcome) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        let status = classify(&outcome);

        let mounted = {
            let mut view = self.view.lock();
            if seq != self.refresh_seq.load(Ordering::SeqCst) {
                crate::debug_event!("panel", "stale refresh dropped", "seq {seq}");
                return;
            }
            if !status.is_valid() && view.last_status == Some(status) {
                // Same placeholder again; leave the content untouched.
                crate::debug_event!("panel", "status unchanged", "{status:?}");
                return;
            }

            view.last_status = Some(status);
            view.revision += 1;

            match outcome {
                FetchOutcome::Resolved(Some(node)) if status.is_valid() => {
                    let tree = Arc::new(TreeItem::new(
                        Some(node),
                        self.workspace.clone(),
                        self.config.double_activation(),
                    ));
                    view.content = PanelContent::Tree(tree.clone());
                    Some(tree)
                }
                _ => {
                    view.content = PanelContent::Placeholder(status);
                    None
                }
            }
        };
        crate::debug_event!("panel", "status", "{status:?} (seq {seq})");

        if let Some(tree) = mounted {
            if self.config.auto_expand {
                tree.toggle_all().await;
            }
        }
    }
}

/// What woke the subscription loop.
enum Wake {
    Shutdown,
    /// Focus moved; `None` means no editor has focus now.
    EditorChanged(Option<EditorHandle>),
    EditorStreamClosed,
    CursorMoved(CursorMoved),
    CursorLagged,
    CursorStreamClosed,
    DebounceDue,
}

/// Event loop owned by one activation of the panel.
///
/// Tracks exactly one cursor subscription at a time, re-subscribing on
/// every focus change, and debounces cursor movement into refreshes.
async fn run_subscriptions(inner: Arc<PanelInner>, token: CancellationToken) {
    let workspace = inner.workspace.clone();
    let mut editor_rx = workspace.subscribe_active_editor();
    let mut current = workspace.active_editor();
    let mut cursor_rx = current.as_ref().map(|e| workspace.subscribe_cursor(e));
    let mut debouncer = RefreshDebouncer::new(inner.config.debounce());

    if let Some(editor) = current.clone() {
        inner.refresh(Some(editor), None).await;
    }

    loop {
        let deadline = debouncer.deadline();

        let wake = tokio::select! {
            // Panel deactivated
            _ = token.cancelled() => Wake::Shutdown,

            // Focus moved to a different editor (or to none)
            changed = editor_rx.recv() => match changed {
                Ok(change) => Wake::EditorChanged(change),
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("[panel] editor stream lagged by {n}, resyncing");
                    Wake::EditorChanged(workspace.active_editor())
                }
                Err(RecvError::Closed) => Wake::EditorStreamClosed,
            },

            // Cursor moved within the tracked editor
            moved = next_cursor_event(&mut cursor_rx) => match moved {
                Ok(event) => Wake::CursorMoved(event),
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("[panel] cursor stream lagged by {n} events");
                    Wake::CursorLagged
                }
                Err(RecvError::Closed) => Wake::CursorStreamClosed,
            },

            // Debounce quiet window elapsed
            _ = sleep_until(deadline.unwrap_or_else(|| Instant::now() + IDLE_PARK)),
                if deadline.is_some() => Wake::DebounceDue,
        };

        match wake {
            Wake::Shutdown | Wake::EditorStreamClosed => break,

            Wake::EditorChanged(change) => {
                debouncer.cancel();
                cursor_rx = change.as_ref().map(|e| workspace.subscribe_cursor(e));
                current = change;
                match &current {
                    Some(editor) => {
                        crate::debug_event!("panel", "editor changed", "{}", editor_label(editor));
                        inner.refresh(Some(editor.clone()), None).await;
                    }
                    // Keep the last content; a placeholder swap here would
                    // drop the tree every time focus moves to the panel.
                    None => crate::debug_event!("panel", "editor changed", "none"),
                }
            }

            Wake::CursorMoved(event) => {
                if let Some(editor) = current.clone().filter(|e| e.id == event.editor) {
                    debouncer.record(editor, event.position);
                }
            }

            Wake::CursorLagged => {
                // Missed movements; fall back to the editor's own caret.
                if let Some(editor) = current.clone() {
                    let position = workspace.cursor_position(&editor);
                    debouncer.record(editor, position);
                }
            }

            Wake::CursorStreamClosed => cursor_rx = None,

            Wake::DebounceDue => {
                if let Some((editor, position)) = debouncer.take_due() {
                    inner.refresh(Some(editor), Some(position)).await;
                }
            }
        }
    }

    crate::debug_event!("panel", "subscription loop ended");
}

async fn next_cursor_event(
    rx: &mut Option<tokio::sync::broadcast::Receiver<CursorMoved>>,
) -> Result<CursorMoved, RecvError> {
    match rx.as_mut() {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn editor_label(editor: &EditorHandle) -> String {
    match &editor.path {
        Some(path) => path.display().to_string(),
        None => format!("editor #{}", editor.id.value()),
    }
}
