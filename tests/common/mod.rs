//! Shared fixtures: an in-memory workspace and canned hierarchy providers.

#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use tokio::sync::{Notify, broadcast};
use tokio::time::Duration;

use calltree::hierarchy::{CallSite, HierarchyNode};
use calltree::provider::CallHierarchyProvider;
use calltree::types::{EditorId, Position, Range};
use calltree::workspace::{CursorMoved, EditorHandle, WorkspaceClient};

pub fn span(line: u32) -> Range {
    Range::new(Position::new(line, 0), Position::new(line, 8))
}

pub fn site(name: &str) -> CallSite {
    let line = 1;
    CallSite::new(
        name,
        format!("/ws/src/{name}.rs"),
        span(line),
        Range::new(Position::new(line, 3), Position::new(line, 3 + name.len() as u32)),
    )
    .with_kind("function")
}

pub fn rust_editor(id: u32) -> EditorHandle {
    EditorHandle::new(EditorId::new(id).unwrap())
        .with_path("/ws/src/main.rs")
        .with_grammar("source.rust")
}

/// In-memory workspace double. Broadcasts focus and cursor events and
/// records every navigation call for assertions.
pub struct MockWorkspace {
    active: Mutex<Option<EditorHandle>>,
    caret: Mutex<Position>,
    editor_tx: broadcast::Sender<Option<EditorHandle>>,
    cursor_tx: broadcast::Sender<CursorMoved>,
    opened: Mutex<Vec<(PathBuf, Position)>>,
    revealed: Mutex<Vec<(EditorId, Position)>>,
    selections: Mutex<Vec<(EditorId, Range)>>,
    next_editor_id: AtomicU32,
    refuse_navigation: AtomicBool,
}

impl MockWorkspace {
    pub fn new() -> Arc<Self> {
        let (editor_tx, _) = broadcast::channel(64);
        let (cursor_tx, _) = broadcast::channel(64);
        Arc::new(Self {
            active: Mutex::new(None),
            caret: Mutex::new(Position::zero()),
            editor_tx,
            cursor_tx,
            opened: Mutex::new(Vec::new()),
            revealed: Mutex::new(Vec::new()),
            selections: Mutex::new(Vec::new()),
            next_editor_id: AtomicU32::new(100),
            refuse_navigation: AtomicBool::new(false),
        })
    }

    /// Make every subsequent navigation call fail.
    pub fn refuse_navigation(&self) {
        self.refuse_navigation.store(true, Ordering::SeqCst);
    }

    /// Move focus to `editor` and broadcast the change.
    pub fn focus(&self, editor: Option<EditorHandle>) {
        *self.active.lock() = editor.clone();
        let _ = self.editor_tx.send(editor);
    }

    /// Set the caret and broadcast a cursor movement for `editor`.
    pub fn move_cursor(&self, editor: &EditorHandle, position: Position) {
        *self.caret.lock() = position;
        let _ = self.cursor_tx.send(CursorMoved {
            editor: editor.id,
            position,
        });
    }

    pub fn set_caret(&self, position: Position) {
        *self.caret.lock() = position;
    }

    pub fn opened(&self) -> Vec<(PathBuf, Position)> {
        self.opened.lock().clone()
    }

    pub fn revealed(&self) -> Vec<(EditorId, Position)> {
        self.revealed.lock().clone()
    }

    pub fn selections(&self) -> Vec<(EditorId, Range)> {
        self.selections.lock().clone()
    }

    pub fn navigation_count(&self) -> usize {
        self.opened.lock().len() + self.revealed.lock().len()
    }
}

#[async_trait]
impl WorkspaceClient for MockWorkspace {
    fn active_editor(&self) -> Option<EditorHandle> {
        self.active.lock().clone()
    }

    fn subscribe_active_editor(&self) -> broadcast::Receiver<Option<EditorHandle>> {
        self.editor_tx.subscribe()
    }

    fn subscribe_cursor(&self, _editor: &EditorHandle) -> broadcast::Receiver<CursorMoved> {
        self.cursor_tx.subscribe()
    }

    fn cursor_position(&self, _editor: &EditorHandle) -> Position {
        *self.caret.lock()
    }

    async fn open_document(&self, path: &Path, position: Position) -> Result<EditorHandle> {
        if self.refuse_navigation.load(Ordering::SeqCst) {
            return Err(anyhow!("cannot open {}", path.display()));
        }
        self.opened.lock().push((path.to_path_buf(), position));
        let id = self.next_editor_id.fetch_add(1, Ordering::SeqCst);
        Ok(EditorHandle::new(EditorId::new(id).unwrap()).with_path(path))
    }

    async fn reveal(&self, editor: &EditorHandle, position: Position) -> Result<()> {
        if self.refuse_navigation.load(Ordering::SeqCst) {
            return Err(anyhow!("reveal refused for editor #{}", editor.id.value()));
        }
        self.revealed.lock().push((editor.id, position));
        Ok(())
    }

    async fn set_selection(&self, editor: &EditorHandle, range: Range) -> Result<()> {
        if self.refuse_navigation.load(Ordering::SeqCst) {
            return Err(anyhow!("selection refused"));
        }
        self.selections.lock().push((editor.id, range));
        Ok(())
    }
}

/// Self-similar hierarchy node: every entry expands into a level with the
/// same names. Counts `item_at` calls across the whole family.
pub struct FixtureNode {
    entries: Vec<CallSite>,
    fetches: Arc<AtomicUsize>,
}

impl FixtureNode {
    pub fn with_names(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            entries: names.iter().map(|name| site(name)).collect(),
            fetches: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HierarchyNode for FixtureNode {
    fn entries(&self) -> &[CallSite] {
        &self.entries
    }

    async fn item_at(&self, _index: usize) -> Result<Option<Arc<dyn HierarchyNode>>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Arc::new(Self {
            entries: self.entries.clone(),
            fetches: self.fetches.clone(),
        })))
    }
}

/// Node whose child fetches block until released, for racing toggles
/// against an in-flight fetch.
pub struct GatedNode {
    entries: Vec<CallSite>,
    gate: Arc<Notify>,
    fetches: Arc<AtomicUsize>,
}

impl GatedNode {
    pub fn with_names(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            entries: names.iter().map(|name| site(name)).collect(),
            gate: Arc::new(Notify::new()),
            fetches: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Release one blocked `item_at` call.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HierarchyNode for GatedNode {
    fn entries(&self) -> &[CallSite] {
        &self.entries
    }

    async fn item_at(&self, _index: usize) -> Result<Option<Arc<dyn HierarchyNode>>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(Some(FixtureNode::with_names(&["leaf"])))
    }
}

/// Node whose child fetches always fail.
pub struct FailingNode {
    entries: Vec<CallSite>,
}

impl FailingNode {
    pub fn with_names(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            entries: names.iter().map(|name| site(name)).collect(),
        })
    }
}

#[async_trait]
impl HierarchyNode for FailingNode {
    fn entries(&self) -> &[CallSite] {
        &self.entries
    }

    async fn item_at(&self, index: usize) -> Result<Option<Arc<dyn HierarchyNode>>> {
        Err(anyhow!("child fetch {index} refused"))
    }
}

/// Provider whose lookups always fail.
pub struct FailingProvider;

impl FailingProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

#[async_trait]
impl CallHierarchyProvider for FailingProvider {
    async fn incoming_calls(
        &self,
        _editor: &EditorHandle,
        position: Position,
    ) -> Result<Option<Arc<dyn HierarchyNode>>> {
        Err(anyhow!("incoming lookup refused at {position}"))
    }

    async fn outgoing_calls(
        &self,
        _editor: &EditorHandle,
        position: Position,
    ) -> Result<Option<Arc<dyn HierarchyNode>>> {
        Err(anyhow!("outgoing lookup refused at {position}"))
    }
}

/// Provider with fixed per-direction answers, call counters, and an
/// optional artificial delay.
pub struct StaticProvider {
    incoming: Mutex<Option<Arc<dyn HierarchyNode>>>,
    outgoing: Mutex<Option<Arc<dyn HierarchyNode>>>,
    delay: Mutex<Option<Duration>>,
    incoming_count: AtomicUsize,
    outgoing_count: AtomicUsize,
    last_position: Mutex<Option<Position>>,
}

impl StaticProvider {
    pub fn returning(
        incoming: Option<Arc<dyn HierarchyNode>>,
        outgoing: Option<Arc<dyn HierarchyNode>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            incoming: Mutex::new(incoming),
            outgoing: Mutex::new(outgoing),
            delay: Mutex::new(None),
            incoming_count: AtomicUsize::new(0),
            outgoing_count: AtomicUsize::new(0),
            last_position: Mutex::new(None),
        })
    }

    /// Provider that resolves to nothing in both directions.
    pub fn empty() -> Arc<Self> {
        Self::returning(None, None)
    }

    pub fn set_incoming(&self, node: Option<Arc<dyn HierarchyNode>>) {
        *self.incoming.lock() = node;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn incoming_count(&self) -> usize {
        self.incoming_count.load(Ordering::SeqCst)
    }

    pub fn outgoing_count(&self) -> usize {
        self.outgoing_count.load(Ordering::SeqCst)
    }

    pub fn call_count(&self) -> usize {
        self.incoming_count() + self.outgoing_count()
    }

    pub fn last_position(&self) -> Option<Position> {
        *self.last_position.lock()
    }

    async fn apply_delay(&self) {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl CallHierarchyProvider for StaticProvider {
    async fn incoming_calls(
        &self,
        _editor: &EditorHandle,
        position: Position,
    ) -> Result<Option<Arc<dyn HierarchyNode>>> {
        self.incoming_count.fetch_add(1, Ordering::SeqCst);
        *self.last_position.lock() = Some(position);
        self.apply_delay().await;
        Ok(self.incoming.lock().clone())
    }

    async fn outgoing_calls(
        &self,
        _editor: &EditorHandle,
        position: Position,
    ) -> Result<Option<Arc<dyn HierarchyNode>>> {
        self.outgoing_count.fetch_add(1, Ordering::SeqCst);
        *self.last_position.lock() = Some(position);
        self.apply_delay().await;
        Ok(self.outgoing.lock().clone())
    }
}

/// Provider that answers incoming calls from a scripted queue of
/// `(delay, node)` pairs, for racing refreshes of different latencies.
pub struct SequencedProvider {
    responses: Mutex<VecDeque<(Duration, Option<Arc<dyn HierarchyNode>>)>>,
}

impl SequencedProvider {
    pub fn with_responses(
        responses: Vec<(Duration, Option<Arc<dyn HierarchyNode>>)>,
    ) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }
}

#[async_trait]
impl CallHierarchyProvider for SequencedProvider {
    async fn incoming_calls(
        &self,
        _editor: &EditorHandle,
        _position: Position,
    ) -> Result<Option<Arc<dyn HierarchyNode>>> {
        let next = self.responses.lock().pop_front();
        match next {
            Some((delay, node)) => {
                tokio::time::sleep(delay).await;
                Ok(node)
            }
            None => Ok(None),
        }
    }

    async fn outgoing_calls(
        &self,
        _editor: &EditorHandle,
        _position: Position,
    ) -> Result<Option<Arc<dyn HierarchyNode>>> {
        Ok(None)
    }
}

/// Let spawned tasks and subscription loops catch up, advancing the
/// paused clock by one millisecond.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
