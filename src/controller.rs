use std::time::{Duration, Instant};

use log::{debug, info, warn};
use reqwest::Url;
use tokio::sync::mpsc;

use crate::address::{apply_state, Address};
use crate::admin_client::AdminClient;
use crate::bulk::{BulkAction, BulkRequest, BulkSelection};
use crate::confirm::{delete_prompt, status_prompt, Confirmer};
use crate::debounce::Debouncer;
use crate::error::BookDeskError;
use crate::events::{AdminEvent, Dispatcher, EventKind};
use crate::notices::{NoticeBoard, NoticeKind};
use crate::query_state::QueryState;

pub const STATUS_UPDATED: &str = "Status updated successfully.";
pub const STATUS_FAILED: &str = "The status could not be updated.";
pub const BULK_PROCESSING: &str = "Processing...";
pub const BULK_DONE: &str = "The action completed successfully.";
pub const BULK_FAILED: &str = "The action could not be completed.";

/// Everything the handlers are allowed to change.
#[derive(Debug, Clone)]
pub struct ListingView {
    pub query: QueryState,
    pub selection: BulkSelection,
    pub bulk_action: Option<BulkAction>,
}

impl ListingView {
    pub fn new(query: QueryState) -> Self {
        Self {
            query,
            selection: BulkSelection::default(),
            bulk_action: None,
        }
    }
}

/// Follow-up work a handler asks the controller to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Debounce(String),
    ApplyState,
    ConfirmDelete { name: Option<String>, url: String },
    ChangeStatus { status: String, url: String },
    Navigate(String),
    Bulk(BulkRequest),
    Notify(NoticeKind, String),
    Export(String),
    HideTransient,
    ExpireNotices,
}

fn on_search_input(_view: &mut ListingView, event: &AdminEvent) -> Option<Effect> {
    let AdminEvent::SearchInput(text) = event else {
        return None;
    };
    Some(Effect::Debounce(text.clone()))
}

fn on_search(view: &mut ListingView, event: &AdminEvent) -> Option<Effect> {
    match event {
        AdminEvent::SearchSettled(text) | AdminEvent::SearchSubmitted(text) => {
            view.query.set_search(text);
            Some(Effect::ApplyState)
        }
        _ => None,
    }
}

fn on_filter_changed(view: &mut ListingView, event: &AdminEvent) -> Option<Effect> {
    let AdminEvent::FilterChanged { name, value } = event else {
        return None;
    };
    view.query.set_filter(name, value);
    Some(Effect::ApplyState)
}

fn on_filters_cleared(view: &mut ListingView, _event: &AdminEvent) -> Option<Effect> {
    view.query.clear_filters();
    Some(Effect::ApplyState)
}

fn on_sort_clicked(view: &mut ListingView, event: &AdminEvent) -> Option<Effect> {
    let AdminEvent::SortClicked(field) = event else {
        return None;
    };
    view.query.toggle_sort(field);
    Some(Effect::ApplyState)
}

fn on_page_size_changed(view: &mut ListingView, event: &AdminEvent) -> Option<Effect> {
    let AdminEvent::PageSizeChanged(size) = event else {
        return None;
    };
    view.query.set_page_size(*size);
    Some(Effect::ApplyState)
}

fn on_page_requested(view: &mut ListingView, event: &AdminEvent) -> Option<Effect> {
    let AdminEvent::PageRequested(page) = event else {
        return None;
    };
    view.query.set_page(*page);
    Some(Effect::ApplyState)
}

fn on_delete_requested(_view: &mut ListingView, event: &AdminEvent) -> Option<Effect> {
    let AdminEvent::DeleteRequested { name, url, .. } = event else {
        return None;
    };
    Some(Effect::ConfirmDelete {
        name: name.clone(),
        url: url.clone(),
    })
}

fn on_status_requested(_view: &mut ListingView, event: &AdminEvent) -> Option<Effect> {
    let AdminEvent::StatusRequested { status, url, .. } = event else {
        return None;
    };
    Some(Effect::ChangeStatus {
        status: status.clone(),
        url: url.clone(),
    })
}

fn on_row_clicked(_view: &mut ListingView, event: &AdminEvent) -> Option<Effect> {
    match event {
        AdminEvent::RowClicked { href, on_control: false } => Some(Effect::Navigate(href.clone())),
        _ => None,
    }
}

fn on_rows_shown(view: &mut ListingView, event: &AdminEvent) -> Option<Effect> {
    let AdminEvent::RowsShown(ids) = event else {
        return None;
    };
    view.selection = BulkSelection::new(ids.iter().cloned());
    None
}

fn on_select_all(view: &mut ListingView, event: &AdminEvent) -> Option<Effect> {
    let AdminEvent::SelectAll(checked) = event else {
        return None;
    };
    view.selection.set_all(*checked);
    None
}

fn on_item_toggled(view: &mut ListingView, event: &AdminEvent) -> Option<Effect> {
    let AdminEvent::ItemToggled(id) = event else {
        return None;
    };
    if !view.selection.toggle(id) {
        debug!("Ignoring toggle of unknown item '{}'", id);
    }
    None
}

fn on_bulk_action_chosen(view: &mut ListingView, event: &AdminEvent) -> Option<Effect> {
    let AdminEvent::BulkActionChosen(action) = event else {
        return None;
    };
    view.bulk_action = *action;
    None
}

fn on_bulk_apply(view: &mut ListingView, _event: &AdminEvent) -> Option<Effect> {
    match view.selection.prepare(view.bulk_action) {
        Ok(request) => Some(Effect::Bulk(request)),
        Err(rejection) => Some(Effect::Notify(
            NoticeKind::Warning,
            rejection.message().to_string(),
        )),
    }
}

fn on_export_requested(_view: &mut ListingView, event: &AdminEvent) -> Option<Effect> {
    let AdminEvent::ExportRequested(format) = event else {
        return None;
    };
    Some(Effect::Export(format.clone()))
}

fn on_page_loaded(_view: &mut ListingView, _event: &AdminEvent) -> Option<Effect> {
    Some(Effect::HideTransient)
}

fn on_tick(_view: &mut ListingView, _event: &AdminEvent) -> Option<Effect> {
    Some(Effect::ExpireNotices)
}

/// The handler table for an admin listing page
pub fn listing_dispatcher() -> Dispatcher<ListingView, Effect> {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .register(EventKind::SearchInput, on_search_input)
        .register(EventKind::SearchSettled, on_search)
        .register(EventKind::SearchSubmitted, on_search)
        .register(EventKind::FilterChanged, on_filter_changed)
        .register(EventKind::FiltersCleared, on_filters_cleared)
        .register(EventKind::SortClicked, on_sort_clicked)
        .register(EventKind::PageSizeChanged, on_page_size_changed)
        .register(EventKind::PageRequested, on_page_requested)
        .register(EventKind::DeleteRequested, on_delete_requested)
        .register(EventKind::StatusRequested, on_status_requested)
        .register(EventKind::RowClicked, on_row_clicked)
        .register(EventKind::RowsShown, on_rows_shown)
        .register(EventKind::SelectAll, on_select_all)
        .register(EventKind::ItemToggled, on_item_toggled)
        .register(EventKind::BulkActionChosen, on_bulk_action_chosen)
        .register(EventKind::BulkApply, on_bulk_apply)
        .register(EventKind::ExportRequested, on_export_requested)
        .register(EventKind::PageLoaded, on_page_loaded)
        .register(EventKind::Tick, on_tick);
    dispatcher
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub search_debounce: Duration,
    pub reload_delay: Duration,
    pub alert_timeout: Duration,
    pub toast_timeout: Duration,
    pub dev_hosts: Vec<String>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            search_debounce: Duration::from_millis(300),
            reload_delay: Duration::from_millis(1000),
            alert_timeout: Duration::from_millis(5000),
            toast_timeout: Duration::from_millis(3000),
            dev_hosts: vec!["localhost".to_string()],
        }
    }
}

/// Owns the state of one admin listing page and reacts to its events.
///
/// Events are handled one at a time. Handlers only touch the
/// [`ListingView`]; anything involving time, the network, the address or
/// the user is carried out here as an [`Effect`].
pub struct AdminController<A: Address, C: Confirmer> {
    view: ListingView,
    address: A,
    confirmer: C,
    client: AdminClient,
    notices: NoticeBoard,
    settings: ControllerSettings,
    dispatcher: Dispatcher<ListingView, Effect>,
    search: Debouncer<String>,
    settled_rx: mpsc::UnboundedReceiver<String>,
    exports: Vec<Url>,
}

impl<A: Address, C: Confirmer> AdminController<A, C> {
    pub fn new(
        view: ListingView,
        address: A,
        confirmer: C,
        client: AdminClient,
        settings: ControllerSettings,
    ) -> Self {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let search = Debouncer::new(settings.search_debounce, move |text: String| {
            // The receiver only goes away with the controller
            let _ = settled_tx.send(text);
        });

        Self {
            view,
            address,
            confirmer,
            client,
            notices: NoticeBoard::new(settings.alert_timeout, settings.toast_timeout),
            settings,
            dispatcher: listing_dispatcher(),
            search,
            settled_rx,
            exports: Vec::new(),
        }
    }

    pub fn view(&self) -> &ListingView {
        &self.view
    }

    pub fn address(&self) -> &A {
        &self.address
    }

    pub fn confirmer(&self) -> &C {
        &self.confirmer
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Export addresses produced so far, oldest first
    pub fn exports(&self) -> &[Url] {
        &self.exports
    }

    fn dev_context(&self) -> bool {
        self.address
            .host()
            .is_some_and(|host| self.settings.dev_hosts.iter().any(|h| h == host))
    }

    /// Handles events from `events` until the sender side closes. Debounced
    /// search input is fed back in as `SearchSettled`.
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<AdminEvent>) {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },
                Some(text) = self.settled_rx.recv() => {
                    self.handle(AdminEvent::SearchSettled(text)).await;
                }
            }
        }
        debug!("Event source closed; controller stopping");
    }

    pub async fn handle(&mut self, event: AdminEvent) {
        debug!("Handling {:?}", event);
        let effects = self.dispatcher.dispatch(&mut self.view, &event);
        for effect in effects {
            if let Err(err) = self.execute(effect).await {
                let dev_context = self.dev_context();
                self.notices
                    .report_unexpected(&err, dev_context, Instant::now());
            }
        }
    }

    async fn execute(&mut self, effect: Effect) -> Result<(), BookDeskError> {
        match effect {
            Effect::Debounce(text) => {
                self.search.call(text);
                Ok(())
            }
            Effect::ApplyState => apply_state(&mut self.address, &self.view.query).await,
            Effect::ConfirmDelete { name, url } => self.confirm_delete(name.as_deref(), &url).await,
            Effect::ChangeStatus { status, url } => {
                self.change_status(&status, &url).await;
                Ok(())
            }
            Effect::Navigate(href) => {
                let target = self.resolve_link(&href)?;
                self.address.navigate(target).await
            }
            Effect::Bulk(request) => {
                self.bulk_action(request).await;
                Ok(())
            }
            Effect::Notify(kind, message) => {
                self.notices.alert(kind, &message, Instant::now());
                Ok(())
            }
            Effect::Export(format) => self.export(&format),
            Effect::HideTransient => {
                let deadline = Instant::now() + self.settings.alert_timeout;
                self.notices.hide_transient_after(deadline);
                Ok(())
            }
            Effect::ExpireNotices => {
                self.notices.expire(Instant::now());
                Ok(())
            }
        }
    }

    async fn confirm_delete(&mut self, name: Option<&str>, url: &str) -> Result<(), BookDeskError> {
        if !self.confirmer.confirm(&delete_prompt(name)) {
            debug!("Delete of {} declined", url);
            return Ok(());
        }
        let target = self.resolve_link(url)?;
        self.address.navigate(target).await
    }

    /// Links are relative to the page they sit on
    fn resolve_link(&self, href: &str) -> Result<Url, BookDeskError> {
        self.address
            .current()
            .join(href)
            .map_err(|e| BookDeskError::InvalidUrl(format!("{}: {}", href, e)))
    }

    async fn change_status(&mut self, status: &str, url: &str) {
        if !self.confirmer.confirm(&status_prompt(status)) {
            debug!("Status change of {} declined", url);
            return;
        }

        match self.client.change_status(url, status).await {
            Ok(()) => {
                self.notices
                    .alert(NoticeKind::Success, STATUS_UPDATED, Instant::now());
                self.delayed_reload().await;
            }
            Err(err) => {
                warn!("Status change failed: {}", err);
                self.notices
                    .alert(NoticeKind::Danger, STATUS_FAILED, Instant::now());
            }
        }
    }

    async fn bulk_action(&mut self, request: BulkRequest) {
        let prompt = request.action.confirm_text(request.items.len());
        if !self.confirmer.confirm(&prompt) {
            debug!("Bulk {} declined", request.action);
            return;
        }

        self.notices
            .alert(NoticeKind::Info, BULK_PROCESSING, Instant::now());

        match self.client.bulk_action(request.action, &request.items).await {
            Ok(()) => {
                self.notices.alert(NoticeKind::Success, BULK_DONE, Instant::now());
                self.delayed_reload().await;
            }
            Err(err) => {
                warn!("Bulk {} failed: {}", request.action, err);
                self.notices.alert(NoticeKind::Danger, BULK_FAILED, Instant::now());
            }
        }
    }

    /// Success notices stay readable for a moment before the view reloads
    async fn delayed_reload(&mut self) {
        tokio::time::sleep(self.settings.reload_delay).await;
        if let Err(err) = self.address.reload().await {
            warn!("Reload after update failed: {}", err);
            self.notices
                .alert(NoticeKind::Danger, &err.user_message(), Instant::now());
        }
    }

    fn export(&mut self, format: &str) -> Result<(), BookDeskError> {
        let mut url = self.address.current().clone();
        url.set_query(Some(&self.view.query.export_query_string(format)));
        info!("Export available at {}", url);
        self.exports.push(url);
        Ok(())
    }
}
