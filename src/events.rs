use std::collections::HashMap;

use log::trace;
use strum::{Display, EnumDiscriminants};

use crate::bulk::BulkAction;

/// Everything a user can do to an admin listing page.
#[derive(Debug, Clone, PartialEq, Eq, EnumDiscriminants)]
#[strum_discriminants(name(EventKind), derive(Hash, Display))]
pub enum AdminEvent {
    /// A keystroke in the search box. Debounced before it touches the state.
    SearchInput(String),
    /// The search box has been quiet long enough.
    SearchSettled(String),
    SearchSubmitted(String),
    FilterChanged { name: String, value: String },
    FiltersCleared,
    SortClicked(String),
    PageSizeChanged(u32),
    PageRequested(u32),
    DeleteRequested {
        id: String,
        name: Option<String>,
        url: String,
    },
    StatusRequested {
        id: String,
        status: String,
        url: String,
    },
    /// A click on a listing row that links somewhere. Clicks that landed
    /// on a button or link inside the row are flagged `on_control`.
    RowClicked { href: String, on_control: bool },
    /// The ids of the rows now on screen. Replaces any selection.
    RowsShown(Vec<String>),
    SelectAll(bool),
    ItemToggled(String),
    BulkActionChosen(Option<BulkAction>),
    BulkApply,
    ExportRequested(String),
    PageLoaded,
    Tick,
}

impl AdminEvent {
    pub fn kind(&self) -> EventKind {
        EventKind::from(self)
    }
}

/// A handler reads the event it was registered for, updates the state it is
/// handed and optionally asks for a follow-up effect.
pub type Handler<S, E> = fn(&mut S, &AdminEvent) -> Option<E>;

/// Routes events to the handlers registered for their kind.
///
/// Each registered handler sees a given event exactly once, in registration
/// order. Events with no handler are dropped.
pub struct Dispatcher<S, E> {
    handlers: HashMap<EventKind, Vec<Handler<S, E>>>,
}

impl<S, E> Default for Dispatcher<S, E> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<S, E> Dispatcher<S, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: EventKind, handler: Handler<S, E>) -> &mut Self {
        self.handlers.entry(kind).or_default().push(handler);
        self
    }

    pub fn handles(&self, kind: EventKind) -> bool {
        self.handlers.get(&kind).is_some_and(|h| !h.is_empty())
    }

    pub fn dispatch(&self, state: &mut S, event: &AdminEvent) -> Vec<E> {
        let kind = event.kind();
        match self.handlers.get(&kind) {
            Some(handlers) => handlers
                .iter()
                .filter_map(|handler| handler(&mut *state, event))
                .collect(),
            None => {
                trace!("No handler registered for {}", kind);
                Vec::new()
            }
        }
    }
}
