use ratatui::widgets::ListState;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::action::Action;
use crate::api::client::{load_briefing_items, load_categories};
use crate::api::types::{default_categories, Category, Item};
use crate::api::Backend;
use crate::dispatch::{ActionController, ActionKind, ControlHandle, Location, Navigator, Notifier};
use crate::state::history::History;
use crate::state::persistence::AppConfig;
use crate::ui::category_picker::CategoryPickerState;

const SKIP: &str = "skip";

/// Switches views by feeding a `Navigate` action back into the update loop.
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<Action>,
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, location: &Location) -> anyhow::Result<()> {
        self.tx
            .send(Action::Navigate(location.clone()))
            .map_err(|_| anyhow::anyhow!("application is shutting down"))
    }
}

pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub action_tx: mpsc::UnboundedSender<Action>,
    pub tick_count: u32,

    // Dispatch
    backend: Arc<dyn Backend>,
    navigator: Arc<dyn Navigator>,
    pub notifier: Notifier,
    pub poll_action: ActionController,
    pub briefing_action: ActionController,
    pub reclassify_controls: HashMap<String, ControlHandle>,

    // Briefing view
    pub briefing_id: Option<String>,
    pub items: Vec<Item>,
    /// `skip` items hidden from `items`.
    pub skipped: usize,
    pub item_list_state: ListState,
    pub loading: bool,
    pub filter: Option<String>,
    pub categories: Vec<Category>,
    pub picker: Option<CategoryPickerState>,

    // Persistence
    pub config: AppConfig,
    pub history: History,
    history_path: Option<PathBuf>,
}

impl App {
    pub fn new(
        action_tx: mpsc::UnboundedSender<Action>,
        config: AppConfig,
        backend: Arc<dyn Backend>,
    ) -> Self {
        let notifier = Notifier::new(config.ui.notification_delay());
        let navigator: Arc<dyn Navigator> = Arc::new(ChannelNavigator {
            tx: action_tx.clone(),
        });

        let controller = |kind: ActionKind, id: &str| {
            ActionController::new(
                kind,
                ControlHandle::new(id, kind.idle_label().unwrap_or_default()),
                Arc::clone(&backend),
                notifier.clone(),
                Arc::clone(&navigator),
            )
        };
        let poll_action = controller(ActionKind::Poll, "btn-poll");
        let briefing_action = controller(ActionKind::GenerateBriefing, "btn-briefing");

        Self {
            running: true,
            show_help: false,
            action_tx,
            tick_count: 0,
            backend,
            navigator,
            notifier,
            poll_action,
            briefing_action,
            reclassify_controls: HashMap::new(),
            briefing_id: None,
            items: Vec::new(),
            skipped: 0,
            item_list_state: ListState::default(),
            loading: false,
            filter: None,
            categories: default_categories(),
            picker: None,
            config,
            history: History::default(),
            history_path: None,
        }
    }

    /// Use `history` and write it back to `path` whenever a briefing opens.
    pub fn with_history(mut self, history: History, path: PathBuf) -> Self {
        self.history = history;
        self.history_path = Some(path);
        self
    }

    pub fn update(&mut self, action: Action) {
        match action {
            Action::Quit => {
                if self.picker.is_some() {
                    self.picker = None;
                } else if self.show_help {
                    self.show_help = false;
                } else {
                    self.running = false;
                }
            }
            Action::Tick => {
                self.tick_count = self.tick_count.wrapping_add(1);
            }
            Action::Render => {}
            Action::NavigateUp => self.navigate(-1),
            Action::NavigateDown => self.navigate(1),
            Action::ShowHelp => {
                self.show_help = !self.show_help;
            }

            // Backend actions
            Action::PollNow => {
                tokio::spawn(self.poll_action.trigger());
            }
            Action::GenerateBriefing => {
                tokio::spawn(self.briefing_action.trigger());
            }
            Action::OpenCategoryPicker => {
                if let Some(item_id) = self.selected_item().map(|i| i.id.clone()) {
                    // A disabled selector cannot be opened.
                    if !self.is_item_busy(&item_id) {
                        self.picker =
                            Some(CategoryPickerState::new(item_id, self.categories.clone()));
                    }
                }
            }
            Action::PickerUp => {
                if let Some(ref mut picker) = self.picker {
                    picker.up();
                }
            }
            Action::PickerDown => {
                if let Some(ref mut picker) = self.picker {
                    picker.down();
                }
            }
            Action::PickerSubmit => {
                if let Some(picker) = self.picker.take() {
                    self.reclassify(&picker.item_id, picker.choice().map(str::to_string));
                }
            }
            Action::Reclassified { item_id, category } => {
                if let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) {
                    item.category = Some(category);
                    item.category_reason = Some("Manual override".to_string());
                    item.confidence = Some(1.0);
                }
            }

            // Briefing view
            Action::Navigate(location) => match location {
                Location::BriefingDetail(id) => self.open_briefing(id),
            },
            Action::Reload => self.load_items(),
            Action::CycleFilter => {
                if self.briefing_id.is_some() {
                    self.filter = self.next_filter();
                    self.load_items();
                }
            }
            Action::ItemsLoaded {
                briefing_id,
                filter,
                items,
            } => {
                if self.is_current_load(&briefing_id, filter.as_deref()) {
                    self.loading = false;
                    self.arrange_items(items);
                    self.sync_reclassify_controls();
                    self.fix_item_selection();
                }
            }
            Action::ItemsFailed {
                briefing_id,
                filter,
                error,
            } => {
                if self.is_current_load(&briefing_id, filter.as_deref()) {
                    self.loading = false;
                    warn!(%briefing_id, %error, "failed to load briefing items");
                    self.notifier
                        .error(format!("Failed to load briefing {briefing_id}"));
                }
            }
            Action::CategoriesLoaded(categories) => {
                if !categories.is_empty() {
                    self.categories = categories;
                }
            }
        }
    }

    /// Fetch the category list from the server settings in the background.
    pub fn request_categories(&self) {
        let backend = Arc::clone(&self.backend);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match load_categories(backend.as_ref()).await {
                Ok(settings) => {
                    let _ = tx.send(Action::CategoriesLoaded(settings.categories));
                }
                Err(e) => warn!(error = %e, "using default categories"),
            }
        });
    }

    fn reclassify(&mut self, item_id: &str, category: Option<String>) {
        let control = self.reclassify_control(item_id);
        let controller = ActionController::new(
            ActionKind::Reclassify,
            control,
            Arc::clone(&self.backend),
            self.notifier.clone(),
            Arc::clone(&self.navigator),
        );
        let pending = controller.reclassify(item_id, category.as_deref());
        let tx = self.action_tx.clone();
        let item_id = item_id.to_string();

        tokio::spawn(async move {
            let succeeded = pending.await.is_some_and(|outcome| outcome.is_success());
            if let (true, Some(category)) = (succeeded, category) {
                let _ = tx.send(Action::Reclassified { item_id, category });
            }
        });
    }

    fn reclassify_control(&mut self, item_id: &str) -> ControlHandle {
        self.reclassify_controls
            .entry(item_id.to_string())
            .or_insert_with(|| ControlHandle::new(format!("reclassify-{item_id}"), "Category"))
            .clone()
    }

    // Drop controls of items no longer listed, unless still in flight.
    fn sync_reclassify_controls(&mut self) {
        let listed: HashSet<&str> = self.items.iter().map(|i| i.id.as_str()).collect();
        self.reclassify_controls
            .retain(|id, control| listed.contains(id.as_str()) || !control.is_enabled());
        let ids: Vec<String> = self.items.iter().map(|i| i.id.clone()).collect();
        for id in ids {
            self.reclassify_control(&id);
        }
    }

    fn open_briefing(&mut self, id: String) {
        info!(briefing_id = %id, "opening briefing");
        self.history.record_open(&id);
        if let Some(ref path) = self.history_path {
            let _ = self.history.save_to(path);
        }
        self.briefing_id = Some(id);
        self.items.clear();
        self.skipped = 0;
        self.item_list_state.select(None);
        self.filter = None;
        self.picker = None;
        self.load_items();
    }

    fn load_items(&mut self) {
        let Some(briefing_id) = self.briefing_id.clone() else {
            return;
        };
        self.loading = true;

        let backend = Arc::clone(&self.backend);
        let filter = self.filter.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result =
                load_briefing_items(backend.as_ref(), &briefing_id, filter.as_deref()).await;
            let action = match result {
                Ok(items) => Action::ItemsLoaded {
                    briefing_id,
                    filter,
                    items,
                },
                Err(e) => Action::ItemsFailed {
                    briefing_id,
                    filter,
                    error: e.to_string(),
                },
            };
            let _ = tx.send(action);
        });
    }

    // Replies for another briefing or an older filter are stale.
    fn is_current_load(&self, briefing_id: &str, filter: Option<&str>) -> bool {
        self.briefing_id.as_deref() == Some(briefing_id) && self.filter.as_deref() == filter
    }

    // Category order, unknown last, newest first within a category. `skip`
    // items are only listed when filtering on them.
    fn arrange_items(&mut self, mut items: Vec<Item>) {
        if self.filter.as_deref() != Some(SKIP) {
            let before = items.len();
            items.retain(|i| i.category.as_deref() != Some(SKIP));
            self.skipped = before - items.len();
        } else {
            self.skipped = 0;
        }

        let rank = |item: &Item| {
            item.category
                .as_deref()
                .and_then(|key| self.categories.iter().position(|c| c.key == key))
                .unwrap_or(self.categories.len())
        };
        items.sort_by(|a, b| {
            rank(a)
                .cmp(&rank(b))
                .then_with(|| b.published_at.cmp(&a.published_at))
        });
        self.items = items;
    }

    // None -> first category -> ... -> last category -> None
    fn next_filter(&self) -> Option<String> {
        let next_idx = match &self.filter {
            None => 0,
            Some(current) => match self.categories.iter().position(|c| &c.key == current) {
                Some(idx) => idx + 1,
                None => self.categories.len(),
            },
        };
        self.categories.get(next_idx).map(|c| c.key.clone())
    }

    fn navigate(&mut self, delta: i32) {
        let max = self.items.len();
        if max == 0 {
            return;
        }
        let current = self.item_list_state.selected().unwrap_or(0);
        let next = if delta > 0 {
            (current + 1).min(max - 1)
        } else {
            current.saturating_sub(1)
        };
        self.item_list_state.select(Some(next));
    }

    fn fix_item_selection(&mut self) {
        if self.items.is_empty() {
            self.item_list_state.select(None);
        } else {
            match self.item_list_state.selected() {
                Some(selected) if selected < self.items.len() => {}
                Some(_) => self.item_list_state.select(Some(self.items.len() - 1)),
                None => self.item_list_state.select(Some(0)),
            }
        }
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.items.get(self.item_list_state.selected()?)
    }

    pub fn category(&self, key: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn is_item_busy(&self, item_id: &str) -> bool {
        self.reclassify_controls
            .get(item_id)
            .is_some_and(|c| !c.is_enabled())
    }

    /// True while any action is in flight, for the busy spinner.
    pub fn any_busy(&self) -> bool {
        !self.poll_action.control().is_enabled()
            || !self.briefing_action.control().is_enabled()
            || self.reclassify_controls.values().any(|c| !c.is_enabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeBackend;
    use crate::dispatch::Severity;

    const ITEMS: &str = r#"[
        {"id": "abc 123", "author": "@a", "content_text": "first", "category": "viral"},
        {"id": "2", "author": "@b", "content_text": "second", "category": "skip"}
    ]"#;

    fn app_with(backend: FakeBackend) -> (App, mpsc::UnboundedReceiver<Action>, Arc<FakeBackend>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let backend = Arc::new(backend);
        let app = App::new(tx, AppConfig::default(), backend.clone());
        (app, rx, backend)
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    // Feed every queued action back into the app until the channel is idle.
    async fn drain(app: &mut App, rx: &mut mpsc::UnboundedReceiver<Action>) {
        loop {
            settle().await;
            match rx.try_recv() {
                Ok(action) => app.update(action),
                Err(_) => break,
            }
        }
    }

    fn loaded(app: &mut App) {
        app.briefing_id = Some("4".to_string());
        app.update(Action::ItemsLoaded {
            briefing_id: "4".to_string(),
            filter: None,
            items: serde_json::from_str(ITEMS).unwrap(),
        });
    }

    fn item(id: &str, category: Option<&str>, published_at: &str) -> Item {
        Item {
            id: id.to_string(),
            author: "@x".to_string(),
            text: None,
            url: None,
            published_at: Some(published_at.to_string()),
            category: category.map(str::to_string),
            category_reason: None,
            confidence: None,
            media_urls: Vec::new(),
        }
    }

    fn ids(app: &App) -> Vec<&str> {
        app.items.iter().map(|i| i.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_poll_disables_button_until_done() {
        let (mut app, mut rx, _) = app_with(FakeBackend::new().reply(
            "/api/poll-now",
            200,
            r#"{"message":"3 new items"}"#,
        ));

        app.update(Action::PollNow);
        let busy = app.poll_action.control().snapshot();
        assert!(!busy.enabled);
        assert_eq!(busy.label, "Polling...");
        assert!(app.any_busy());

        drain(&mut app, &mut rx).await;
        let idle = app.poll_action.control().snapshot();
        assert!(idle.enabled);
        assert_eq!(idle.label, "Poll Now");
        assert_eq!(app.notifier.visible().unwrap().text, "3 new items");
    }

    #[tokio::test]
    async fn test_generated_briefing_opens_detail_view() {
        let (mut app, mut rx, backend) = app_with(
            FakeBackend::new()
                .reply("/api/generate-briefing", 200, r#"{"status":"ok","briefing_id":4}"#)
                .reply("/api/briefings/4/tweets", 200, ITEMS),
        );

        app.update(Action::GenerateBriefing);
        assert!(!app.briefing_action.control().is_enabled());
        drain(&mut app, &mut rx).await;

        assert!(app.briefing_action.control().is_enabled());
        assert_eq!(app.briefing_id.as_deref(), Some("4"));
        assert_eq!(app.items.len(), 1);
        assert_eq!(app.skipped, 1);
        assert_eq!(app.item_list_state.selected(), Some(0));
        assert_eq!(app.history.last_opened(), Some("4"));
        assert_eq!(app.notifier.last().unwrap().text, "Briefing generated");
        assert_eq!(backend.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_briefing_stays_put() {
        let (mut app, mut rx, _) =
            app_with(FakeBackend::new().reply("/api/generate-briefing", 200, "{}"));

        app.update(Action::GenerateBriefing);
        drain(&mut app, &mut rx).await;

        assert!(app.briefing_id.is_none());
        assert_eq!(app.notifier.visible().unwrap().text, "No items for briefing");
    }

    #[tokio::test]
    async fn test_reclassify_through_picker() {
        let (mut app, mut rx, backend) =
            app_with(FakeBackend::new().reply("/api/reclassify/abc 123", 200, r#"{"status":"ok"}"#));
        loaded(&mut app);

        app.update(Action::OpenCategoryPicker);
        app.update(Action::PickerDown);
        app.update(Action::PickerSubmit);
        assert!(app.picker.is_none());
        assert!(app.is_item_busy("abc 123"));

        drain(&mut app, &mut rx).await;
        assert!(!app.is_item_busy("abc 123"));
        assert_eq!(app.items[0].category.as_deref(), Some("must_read"));
        assert_eq!(app.notifier.visible().unwrap().text, "Reclassified");
        assert_eq!(
            backend.requests(),
            vec![crate::api::ApiRequest::reclassify("abc 123", "must_read")]
        );
    }

    #[tokio::test]
    async fn test_reclassify_failure_keeps_category() {
        let (mut app, mut rx, _) =
            app_with(FakeBackend::new().reply("/api/reclassify/abc 123", 500, "{}"));
        loaded(&mut app);

        app.update(Action::OpenCategoryPicker);
        app.update(Action::PickerDown);
        app.update(Action::PickerSubmit);
        drain(&mut app, &mut rx).await;

        assert_eq!(app.items[0].category.as_deref(), Some("viral"));
        let shown = app.notifier.visible().unwrap();
        assert_eq!(shown.text, "Failed to reclassify");
        assert_eq!(shown.severity, Severity::Error);
        assert!(!app.is_item_busy("abc 123"));
    }

    #[tokio::test]
    async fn test_placeholder_choice_sends_nothing() {
        let (mut app, mut rx, backend) = app_with(FakeBackend::new());
        loaded(&mut app);

        app.update(Action::OpenCategoryPicker);
        app.update(Action::PickerSubmit);
        drain(&mut app, &mut rx).await;

        assert!(backend.requests().is_empty());
        assert!(app.notifier.last().is_none());
    }

    #[tokio::test]
    async fn test_quit_closes_overlays_first() {
        let (mut app, _rx, _) = app_with(FakeBackend::new());
        loaded(&mut app);

        app.update(Action::OpenCategoryPicker);
        app.update(Action::Quit);
        assert!(app.picker.is_none());
        assert!(app.running);

        app.update(Action::ShowHelp);
        app.update(Action::Quit);
        assert!(!app.show_help);
        assert!(app.running);

        app.update(Action::Quit);
        assert!(!app.running);
    }

    #[tokio::test]
    async fn test_filter_cycles_and_reloads() {
        let (mut app, mut rx, backend) = app_with(FakeBackend::new().reply(
            "/api/briefings/4/tweets",
            200,
            "[]",
        ));
        loaded(&mut app);

        app.update(Action::CycleFilter);
        assert_eq!(app.filter.as_deref(), Some("must_read"));
        drain(&mut app, &mut rx).await;
        assert!(app.items.is_empty());
        assert_eq!(app.item_list_state.selected(), None);
        assert_eq!(
            backend.requests(),
            vec![crate::api::ApiRequest::briefing_items("4", Some("must_read"))]
        );

        app.filter = Some("skip".to_string());
        app.update(Action::CycleFilter);
        assert_eq!(app.filter, None);
    }

    #[tokio::test]
    async fn test_items_failure_notifies() {
        let (mut app, mut rx, _) =
            app_with(FakeBackend::new().unreachable("/api/briefings/8/tweets"));

        app.update(Action::Navigate(Location::BriefingDetail("8".to_string())));
        assert!(app.loading);
        drain(&mut app, &mut rx).await;

        assert!(!app.loading);
        let shown = app.notifier.visible().unwrap();
        assert_eq!(shown.text, "Failed to load briefing 8");
        assert_eq!(shown.severity, Severity::Error);
    }

    #[tokio::test]
    async fn test_stale_items_ignored() {
        let (mut app, _rx, _) = app_with(FakeBackend::new());
        app.briefing_id = Some("5".to_string());
        app.update(Action::ItemsLoaded {
            briefing_id: "4".to_string(),
            filter: None,
            items: serde_json::from_str(ITEMS).unwrap(),
        });
        assert!(app.items.is_empty());
    }

    #[tokio::test]
    async fn test_reply_for_older_filter_ignored() {
        let (mut app, _rx, _) = app_with(FakeBackend::new());
        app.briefing_id = Some("4".to_string());
        app.filter = Some("stock_ideas".to_string());
        app.loading = true;

        app.update(Action::ItemsLoaded {
            briefing_id: "4".to_string(),
            filter: Some("must_read".to_string()),
            items: vec![item("1", Some("must_read"), "2024-01-01T00:00:00")],
        });
        app.update(Action::ItemsFailed {
            briefing_id: "4".to_string(),
            filter: None,
            error: "connection refused".to_string(),
        });
        assert!(app.items.is_empty());
        assert!(app.loading);
        assert!(app.notifier.last().is_none());

        app.update(Action::ItemsLoaded {
            briefing_id: "4".to_string(),
            filter: Some("stock_ideas".to_string()),
            items: vec![item("2", Some("stock_ideas"), "2024-01-01T00:00:00")],
        });
        assert_eq!(ids(&app), vec!["2"]);
        assert!(!app.loading);
    }

    #[tokio::test]
    async fn test_filter_pressed_twice_keeps_latest() {
        let (mut app, mut rx, backend) = app_with(FakeBackend::new().reply(
            "/api/briefings/4/tweets",
            200,
            r#"[{"id": "9", "author": "@a", "category": "stock_ideas"}]"#,
        ));
        loaded(&mut app);

        app.update(Action::CycleFilter);
        app.update(Action::CycleFilter);
        assert_eq!(app.filter.as_deref(), Some("stock_ideas"));
        drain(&mut app, &mut rx).await;

        assert_eq!(backend.requests().len(), 2);
        assert_eq!(ids(&app), vec!["9"]);
    }

    #[tokio::test]
    async fn test_items_sorted_by_category_then_newest() {
        let (mut app, _rx, _) = app_with(FakeBackend::new());
        app.briefing_id = Some("4".to_string());

        app.update(Action::ItemsLoaded {
            briefing_id: "4".to_string(),
            filter: None,
            items: vec![
                item("funny", Some("funny"), "2024-01-03T00:00:00"),
                item("unknown", Some("memes"), "2024-01-05T00:00:00"),
                item("none", None, "2024-01-05T00:00:00"),
                item("old-must", Some("must_read"), "2024-01-01T00:00:00"),
                item("new-must", Some("must_read"), "2024-01-02T00:00:00"),
                item("viral", Some("viral"), "2024-01-04T00:00:00"),
            ],
        });

        assert_eq!(
            ids(&app),
            vec!["new-must", "old-must", "viral", "funny", "unknown", "none"]
        );
    }

    #[tokio::test]
    async fn test_skip_items_hidden_unless_filtered() {
        let (mut app, _rx, _) = app_with(FakeBackend::new());
        app.briefing_id = Some("4".to_string());
        let rows = || {
            vec![
                item("a", Some("skip"), "2024-01-01T00:00:00"),
                item("b", Some("charts"), "2024-01-01T00:00:00"),
                item("c", Some("skip"), "2024-01-02T00:00:00"),
            ]
        };

        app.update(Action::ItemsLoaded {
            briefing_id: "4".to_string(),
            filter: None,
            items: rows(),
        });
        assert_eq!(ids(&app), vec!["b"]);
        assert_eq!(app.skipped, 2);

        app.filter = Some("skip".to_string());
        app.update(Action::ItemsLoaded {
            briefing_id: "4".to_string(),
            filter: Some("skip".to_string()),
            items: rows(),
        });
        assert_eq!(ids(&app), vec!["b", "c", "a"]);
        assert_eq!(app.skipped, 0);
    }

    #[tokio::test]
    async fn test_categories_loaded() {
        let (mut app, mut rx, _) = app_with(FakeBackend::new().reply(
            "/api/settings",
            200,
            r#"{"categories": [{"key": "news", "label": "News"}]}"#,
        ));

        app.request_categories();
        drain(&mut app, &mut rx).await;
        assert_eq!(app.categories.len(), 1);
        assert_eq!(app.category("news").unwrap().label, "News");
    }

    #[tokio::test]
    async fn test_categories_fallback_on_error() {
        let (mut app, mut rx, _) = app_with(FakeBackend::new());
        app.request_categories();
        drain(&mut app, &mut rx).await;
        assert_eq!(app.categories, default_categories());
    }
}
