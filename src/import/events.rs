use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ImportError;
use crate::types::SheetSelector;

use super::report::ImportReport;

/// Lifecycle points at which the importer emits events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    BeforeImport,
    AfterImport,
    BeforeSheet,
    AfterSheet,
    ImportFailed,
}

/// Event payloads.
///
/// `BeforeImport`/`AfterImport` bracket a whole run; `BeforeSheet`/`AfterSheet` bracket each sheet
/// of a multi-sheet run; `ImportFailed` is emitted when a sheet failure is contained instead of
/// propagated.
#[derive(Debug, Clone, Copy)]
pub enum ImportEvent<'a> {
    BeforeImport,
    AfterImport { report: &'a ImportReport },
    BeforeSheet { sheet: &'a SheetSelector },
    AfterSheet { sheet: &'a SheetSelector, succeeded: bool },
    ImportFailed { sheet: &'a SheetSelector, error: &'a ImportError },
}

impl ImportEvent<'_> {
    /// The kind used to look up this event's listener.
    pub fn kind(&self) -> EventKind {
        match self {
            ImportEvent::BeforeImport => EventKind::BeforeImport,
            ImportEvent::AfterImport { .. } => EventKind::AfterImport,
            ImportEvent::BeforeSheet { .. } => EventKind::BeforeSheet,
            ImportEvent::AfterSheet { .. } => EventKind::AfterSheet,
            ImportEvent::ImportFailed { .. } => EventKind::ImportFailed,
        }
    }

    /// The sheet this event refers to, if any.
    pub fn sheet(&self) -> Option<&SheetSelector> {
        match self {
            ImportEvent::BeforeSheet { sheet }
            | ImportEvent::AfterSheet { sheet, .. }
            | ImportEvent::ImportFailed { sheet, .. } => Some(sheet),
            ImportEvent::BeforeImport | ImportEvent::AfterImport { .. } => None,
        }
    }
}

/// A listener invoked synchronously with the event payload.
pub type EventListener = Arc<dyn Fn(&ImportEvent<'_>) + Send + Sync>;

/// Maps each [`EventKind`] to at most one listener.
///
/// Registering a second listener for the same kind replaces the first.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: HashMap<EventKind, EventListener>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<EventKind> = self.listeners.keys().copied().collect();
        kinds.sort_unstable();
        f.debug_struct("EventBus").field("listening", &kinds).finish()
    }
}

impl EventBus {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `kind`, replacing any previous one.
    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> &mut Self
    where
        F: Fn(&ImportEvent<'_>) + Send + Sync + 'static,
    {
        self.listeners.insert(kind, Arc::new(listener));
        self
    }

    /// Builder form of [`Self::on`].
    pub fn with<F>(mut self, kind: EventKind, listener: F) -> Self
    where
        F: Fn(&ImportEvent<'_>) + Send + Sync + 'static,
    {
        self.on(kind, listener);
        self
    }

    /// Invoke the listener for `event.kind()`, if one is registered.
    pub fn emit(&self, event: &ImportEvent<'_>) {
        if let Some(listener) = self.listeners.get(&event.kind()) {
            listener(event);
        }
    }

    /// Whether a listener is registered for `kind`.
    pub fn listens_to(&self, kind: EventKind) -> bool {
        self.listeners.contains_key(&kind)
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
