//! Application state.
//!
//! [`App`] composes a fresh [`Page`] (collection plus form controller) on
//! every navigation. Gateway round trips live here; the event loop in
//! `main.rs` draws, reads keys and spawns validator tasks.

use crate::config::TuiConfig;
use crate::error::TuiError;
use crate::keys::{Action, InputMode};
use crate::nav::View;
use crate::notifications::{Notification, NotificationLevel, NotificationQueue};
use crate::persistence::PersistedState;
use crate::theme::Theme;
use chrono::Utc;
use registrar_core::{
    default_fields, default_validators, CatalogError, Collection, Debounced, FieldCatalog,
    FormController, PageRegistry, RecordCollection, RecordGateway, TableIntent, TableView,
    ValidationTicket, ValidatorSet, Verdict,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// One routed table page: the collection and its form controller.
#[derive(Debug, Clone)]
pub struct Page {
    pub view: View,
    /// Navigation count at composition; validator results carry it back.
    pub generation: u64,
    pub collection: RecordCollection,
    pub form: FormController,
    /// Index into the visible columns, used for sorting.
    pub column_cursor: usize,
}

impl Page {
    pub fn cursor_field(&self) -> Option<&str> {
        self.collection
            .profile
            .columns
            .visible()
            .nth(self.column_cursor)
            .map(|(field, _)| field)
    }
}

/// Search box being edited. The table query follows it after the debounce.
#[derive(Debug, Clone, Default)]
pub struct SearchBox {
    pub active: bool,
    pub text: String,
}

pub struct App {
    pub config: TuiConfig,
    pub theme: Theme,
    pub gateway: Arc<dyn RecordGateway>,
    pub registry: PageRegistry,
    pub fields: Arc<FieldCatalog>,
    pub validators: Arc<ValidatorSet>,
    pub page: Page,
    /// Views whose deleted toggle is on, kept across navigations.
    pub show_deleted: Vec<View>,
    pub search: SearchBox,
    pub search_debounce: Debounced<String>,
    pub help_visible: bool,
    pub notifications: NotificationQueue,
    pub should_quit: bool,
    generation: u64,
}

impl App {
    pub fn new(config: TuiConfig, gateway: Arc<dyn RecordGateway>) -> Result<Self, TuiError> {
        Self::with_registry(config, gateway, PageRegistry::standard())
    }

    pub fn with_registry(
        config: TuiConfig,
        gateway: Arc<dyn RecordGateway>,
        registry: PageRegistry,
    ) -> Result<Self, TuiError> {
        let fields = Arc::new(default_fields());
        let validators = Arc::new(default_validators());
        let page = compose_page(&config, &registry, &fields, &validators, config.start_view, 0)?;
        let theme = Theme::named(&config.theme.name);
        let search_debounce = Debounced::new(Duration::from_millis(config.search_debounce_ms));

        Ok(Self {
            config,
            theme,
            gateway,
            registry,
            fields,
            validators,
            page,
            show_deleted: Vec::new(),
            search: SearchBox::default(),
            search_debounce,
            help_visible: false,
            notifications: NotificationQueue::default(),
            should_quit: false,
            generation: 0,
        })
    }

    pub fn active_view(&self) -> View {
        self.page.view
    }

    pub fn active_page(&self) -> &Page {
        &self.page
    }

    /// Apply state saved by a previous session. Nothing is fetched.
    pub fn restore(&mut self, state: &PersistedState) -> Result<(), TuiError> {
        self.show_deleted = state.show_deleted.clone();
        self.page = self.compose(state.active_view)?;
        Ok(())
    }

    pub fn persisted(&self) -> PersistedState {
        let mut state = PersistedState::new(self.page.view);
        state.show_deleted = self.deleted_flags();
        state
    }

    pub fn input_mode(&self) -> InputMode {
        let form = &self.page.form;
        if form.confirmation().is_some() {
            InputMode::Confirm
        } else if form.is_open() {
            InputMode::Form
        } else if self.help_visible {
            InputMode::Help
        } else if self.search.active {
            InputMode::Search
        } else {
            InputMode::Table
        }
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
    }

    fn compose(&mut self, view: View) -> Result<Page, CatalogError> {
        self.generation += 1;
        let mut page = compose_page(
            &self.config,
            &self.registry,
            &self.fields,
            &self.validators,
            view,
            self.generation,
        )?;
        page.collection
            .view
            .set_show_deleted(self.show_deleted.contains(&view));
        Ok(page)
    }

    /// Saved flags with the current page's toggle folded in.
    fn deleted_flags(&self) -> Vec<View> {
        let mut flags: Vec<View> = self
            .show_deleted
            .iter()
            .copied()
            .filter(|view| *view != self.page.view)
            .collect();
        if self.page.collection.view.show_deleted() {
            flags.push(self.page.view);
        }
        flags.sort();
        flags
    }

    // ========================================================================
    // Table
    // ========================================================================

    /// Reload the current page from the gateway.
    pub async fn refresh(&mut self) {
        if let Err(err) = self.page.collection.reload(self.gateway.as_ref()).await {
            self.notifications
                .push(Notification::error(err.user_message()));
        }
    }

    /// Compose a fresh page for `view` and load it.
    pub async fn navigate(&mut self, view: View) {
        self.close_search();
        self.show_deleted = self.deleted_flags();
        match self.compose(view) {
            Ok(page) => self.page = page,
            Err(err) => {
                self.notifications.push(Notification::error(err.to_string()));
                return;
            }
        }
        info!(view = view.title(), generation = self.generation, "Navigated");
        self.refresh().await;
    }

    pub fn open_search(&mut self) {
        self.search.active = true;
        self.search.text = self.page.collection.view.query().to_string();
    }

    /// Leave the search box. A pending query is applied immediately.
    pub fn close_search(&mut self) {
        if self.search.active && self.search_debounce.is_pending() {
            self.search_debounce.cancel();
            self.page.collection.view.set_search_query(&self.search.text);
        }
        self.search.active = false;
    }

    pub fn search_input(&mut self, c: char, now: Instant) {
        self.search.text.push(c);
        self.search_debounce.push(self.search.text.clone(), now);
    }

    pub fn search_backspace(&mut self, now: Instant) {
        self.search.text.pop();
        self.search_debounce.push(self.search.text.clone(), now);
    }

    /// Apply a settled search query and drop expired notifications.
    pub fn on_tick(&mut self, now: Instant) {
        if let Some(query) = self.search_debounce.take_ready(now) {
            debug!(%query, "Search query applied");
            self.page.collection.view.set_search_query(&query);
        }
        self.notifications.expire(Utc::now());
    }

    pub fn toggle_deleted(&mut self) {
        let view = &mut self.page.collection.view;
        let flag = !view.show_deleted();
        view.set_show_deleted(flag);
    }

    pub fn move_column(&mut self, forward: bool) {
        let page = &mut self.page;
        let count = page.collection.profile.columns.visible_len();
        if count == 0 {
            return;
        }
        page.column_cursor = if forward {
            (page.column_cursor + 1) % count
        } else {
            (page.column_cursor + count - 1) % count
        };
    }

    pub fn sort_cursor_column(&mut self) {
        let page = &mut self.page;
        if let Some(field) = page.cursor_field().map(str::to_string) {
            page.collection.view.sort_by(&field);
        }
    }

    // ========================================================================
    // Form
    // ========================================================================

    /// Open the modal for `intent`. Returns the validator runs to start.
    pub async fn open_form(&mut self, intent: TableIntent) -> Vec<ValidationTicket> {
        self.close_search();
        let page = &mut self.page;
        let gateway = self.gateway.as_ref();
        let opened = match intent {
            TableIntent::Create => page.form.open_create(&page.collection, gateway).await,
            TableIntent::Edit(id) => page.form.open_edit(&page.collection, &id, gateway).await,
        };
        // A failed load keeps the modal open with its notice.
        opened.unwrap_or_default()
    }

    /// Apply a validator result unless its page has been replaced.
    pub fn apply_verdict(&mut self, generation: u64, ticket: &ValidationTicket, verdict: Verdict) {
        if generation != self.page.generation {
            debug!(field = %ticket.field, "Dropping verdict for a replaced page");
            return;
        }
        self.page.form.apply_verdict(ticket, verdict);
    }

    /// Submit the form. Disabled submits are ignored.
    pub async fn submit_form(&mut self) {
        let page = &mut self.page;
        if !page.form.can_submit() {
            return;
        }
        let result = page
            .form
            .submit(self.gateway.as_ref(), &mut page.collection)
            .await;
        if let Ok(outcome) = result {
            self.notifications
                .push(Notification::success(outcome.message()));
        }
    }

    pub fn request_delete(&mut self) {
        // Refusals are reported through the form notice.
        let _ = self.page.form.request_delete();
    }

    pub async fn confirm(&mut self) {
        let page = &mut self.page;
        let result = page
            .form
            .confirm(self.gateway.as_ref(), &mut page.collection)
            .await;
        if let Ok(outcome) = result {
            self.notifications
                .push(Notification::success(outcome.message()));
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Apply one key action. Returns validator runs the caller must start.
    pub async fn handle_action(&mut self, action: Action, now: Instant) -> Vec<ValidationTicket> {
        let mode = self.input_mode();
        match (mode, action) {
            (_, Action::Quit) => self.should_quit = true,

            (InputMode::Confirm, Action::Confirm) => self.confirm().await,
            (InputMode::Confirm, Action::Cancel) => self.page.form.cancel_confirmation(),

            (InputMode::Form, Action::Cancel) => self.page.form.close(),
            (InputMode::Form, Action::Submit) => self.submit_form().await,
            (InputMode::Form, Action::DeleteItem) => self.request_delete(),
            (InputMode::Form, Action::NextField) => self.page.form.focus_next(),
            (InputMode::Form, Action::PrevField) => self.page.form.focus_previous(),
            (InputMode::Form, Action::Input(c)) => {
                return self.page.form.type_char(c).into_iter().collect()
            }
            (InputMode::Form, Action::Backspace) => {
                return self.page.form.backspace().into_iter().collect()
            }

            (InputMode::Help, Action::Cancel) => self.help_visible = false,

            (InputMode::Search, Action::Cancel) => self.close_search(),
            (InputMode::Search, Action::Input(c)) => self.search_input(c, now),
            (InputMode::Search, Action::Backspace) => self.search_backspace(now),

            (InputMode::Table, action) => return self.handle_table_action(action).await,
            _ => {}
        }
        Vec::new()
    }

    async fn handle_table_action(&mut self, action: Action) -> Vec<ValidationTicket> {
        match action {
            Action::MoveDown => self.table_view().select_next(),
            Action::MoveUp => self.table_view().select_previous(),
            Action::NextPage => {
                self.table_view().next_page();
            }
            Action::PrevPage => {
                self.table_view().previous_page();
            }
            Action::FirstPage => {
                self.table_view().set_page(1);
            }
            Action::LastPage => {
                let view = self.table_view();
                let last = view.page_count();
                view.set_page(last);
            }
            Action::GoToPage(page) => {
                self.table_view().set_page(page);
            }
            Action::ColumnLeft => self.move_column(false),
            Action::ColumnRight => self.move_column(true),
            Action::SortColumn => self.sort_cursor_column(),
            Action::ToggleDeleted => self.toggle_deleted(),
            Action::OpenSearch => self.open_search(),
            Action::OpenHelp => self.help_visible = true,
            Action::Refresh => self.refresh().await,
            Action::NextView => self.navigate(self.page.view.next()).await,
            Action::PrevView => self.navigate(self.page.view.previous()).await,
            Action::SwitchView(idx) => {
                if let Some(view) = View::from_index(idx) {
                    self.navigate(view).await;
                }
            }
            Action::NewItem => return self.open_form(TableIntent::Create).await,
            Action::Activate => {
                if let Some(intent) = self.page.collection.view.activate() {
                    return self.open_form(intent).await;
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn table_view(&mut self) -> &mut TableView {
        &mut self.page.collection.view
    }
}

fn compose_page(
    config: &TuiConfig,
    registry: &PageRegistry,
    fields: &Arc<FieldCatalog>,
    validators: &Arc<ValidatorSet>,
    view: View,
    generation: u64,
) -> Result<Page, CatalogError> {
    let profile = registry.resolve(view.route())?;
    Ok(Page {
        view,
        generation,
        collection: RecordCollection::new(profile, config.page_size)
            .with_reset_page_on_sort(config.reset_page_on_sort),
        form: FormController::new(Arc::clone(fields), Arc::clone(validators)),
        column_cursor: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrar_core::catalog;

    #[test]
    fn test_page_cursor_field_follows_visible_columns() {
        let mut page = Page {
            view: View::Nomenclature,
            generation: 0,
            collection: RecordCollection::new(catalog::nomenclature(), 10),
            form: FormController::new(
                Arc::new(catalog::default_fields()),
                Arc::new(catalog::default_validators()),
            ),
            column_cursor: 0,
        };
        assert_eq!(page.cursor_field(), Some("id"));
        page.column_cursor = 1;
        assert_eq!(page.cursor_field(), Some("code"));
        page.column_cursor = 7;
        assert_eq!(page.cursor_field(), None);
    }
}
