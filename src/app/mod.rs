//! Application state and main event loop
//!
//! The `App` owns the log store and the scheduler. Everything that mutates the
//! store runs on the event loop, so store operations never interleave.

mod input_mode;
mod state;

pub use input_mode::InputMode;
pub use state::{AppState, FilterField, FilterInputs};

use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::event::{self, Event};
use tokio::sync::oneshot;

use crate::capture::{self, CaptureReceiver, CapturedRequest, ServerHandle};
use crate::config::{self, Config};
use crate::scheduler::Scheduler;
use crate::store::{self, Backend, FileBackend, LogEntry, LogStore, NewEntry, StoreLimits};
use crate::tui::views::{render_log_viewer, render_notifications, LogViewContext};
use crate::tui::Tui;
use crate::visitor::{
    self, HttpVisitorInfoProvider, OfflineVisitorInfoProvider, VisitorInfo, VisitorInfoProvider,
};

/// How long the loop waits for terminal input before doing housekeeping
const TICK_RATE: Duration = Duration::from_millis(50);

/// Main application struct
pub struct App {
    /// Application configuration
    pub(crate) config: Config,
    /// Application state
    pub(crate) state: AppState,
    /// The recorded entries
    pub(crate) store: LogStore<Box<dyn Backend>>,
    /// Cleanup and refresh timers
    pub(crate) scheduler: Scheduler,
    /// Requests seen by the capture endpoint
    capture_rx: Option<CaptureReceiver>,
    /// Capture server handle (kept alive while the app runs)
    capture_server: Option<ServerHandle>,
    /// Pending visitor lookup for the session-start entry
    visitor_rx: Option<oneshot::Receiver<VisitorInfo>>,
}

impl App {
    /// Create an application around an existing store
    ///
    /// Starts the cleanup timer, and the refresh timer if configured. No
    /// background work is started; see [`App::start`].
    pub fn new(config: Config, store: LogStore<Box<dyn Backend>>) -> Self {
        let now = Instant::now();
        let mut scheduler = Scheduler::new(config.retention(), now);
        if config.auto_refresh_on_start {
            scheduler.enable_refresh(config.default_refresh_interval(), now);
        }

        let state = AppState::new(
            config.default_refresh_interval(),
            config.notification_duration(),
        );

        Self {
            config,
            state,
            store,
            scheduler,
            capture_rx: None,
            capture_server: None,
            visitor_rx: None,
        }
    }

    /// Load persisted logs and start background work
    ///
    /// Only failures that make the program unusable are returned; a corrupt
    /// store, an unavailable port or an offline network are reported to the
    /// user and the session continues.
    pub async fn start(config: Config) -> Result<Self> {
        let backend: Box<dyn Backend> = Box::new(FileBackend::new(config::store_file_path()));
        let (store, load_error) = LogStore::load(backend, StoreLimits::from_config(&config));
        tracing::info!("Loaded {} log entries", store.len());

        let mut app = Self::new(config, store);
        if let Some(e) = load_error {
            app.state
                .notify_error(format!("Failed to load logs: {}", e.user_message()));
        }

        app.run_cleanup(Utc::now());

        if app.config.capture_enabled {
            app.start_capture().await;
        }
        app.start_visitor_lookup();

        Ok(app)
    }

    async fn start_capture(&mut self) {
        let (tx, rx) = capture::server::create_channel(capture::DEFAULT_CHANNEL_BUFFER);
        match capture::server::start(self.config.capture_port, tx).await {
            Ok(handle) => {
                self.state.payload_url = Some(handle.payload_url());
                self.capture_rx = Some(rx);
                self.capture_server = Some(handle);
            }
            Err(e) => {
                tracing::warn!("Capture endpoint unavailable: {:#}", e);
                self.state
                    .notify_error(format!("Capture endpoint unavailable: {}", e));
            }
        }
    }

    fn start_visitor_lookup(&mut self) {
        let provider: Box<dyn VisitorInfoProvider> = if self.config.visitor_lookup_enabled {
            match HttpVisitorInfoProvider::from_config(&self.config) {
                Ok(provider) => Box::new(provider),
                Err(e) => {
                    tracing::warn!("Visitor lookup disabled: {:#}", e);
                    Box::new(OfflineVisitorInfoProvider)
                }
            }
        } else {
            Box::new(OfflineVisitorInfoProvider)
        };

        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let info = provider.visitor_info().await;
            // The app may have quit before the lookup finished
            let _ = tx.send(info);
        });

        self.visitor_rx = Some(rx);
        self.state.loading = true;
    }

    /// Run the main application loop
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        tracing::info!("seclog started");

        let result = self.event_loop(&mut tui);

        if let Some(server) = self.capture_server.take() {
            server.shutdown();
        }

        tui.exit()?;
        result
    }

    fn event_loop(&mut self, tui: &mut Tui) -> Result<()> {
        self.state.needs_render = true;

        loop {
            if self.state.needs_render {
                self.render(tui)?;
                self.state.needs_render = false;
            }

            if event::poll(TICK_RATE)? {
                match event::read()? {
                    Event::Key(key) => {
                        crate::input::handle_key_event(self, key)?;
                        self.state.needs_render = true;
                    }
                    Event::Paste(text) => {
                        crate::input::handle_paste(self, &text);
                        self.state.needs_render = true;
                    }
                    Event::Resize(_, _) => self.state.needs_render = true,
                    _ => {}
                }
            }

            self.housekeeping(Instant::now(), Utc::now());

            if self.state.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Timers, background results and notification expiry
    pub(crate) fn housekeeping(&mut self, now: Instant, wall_now: DateTime<Utc>) {
        let due = self.scheduler.poll(now);
        if due.cleanup {
            self.run_cleanup(wall_now);
        }
        if due.refresh {
            self.refresh_tick();
        }

        self.drain_captured();
        self.poll_visitor_info();

        if let Some(server) = &self.capture_server {
            let dropped = server.take_dropped_events();
            if dropped > 0 {
                self.state.dropped_events_count += dropped;
                tracing::warn!(
                    "Dropped {} captured requests due to channel overflow (total: {})",
                    dropped,
                    self.state.dropped_events_count
                );
            }
        }

        if self.state.notifications.tick() {
            self.state.needs_render = true;
        }

        // Keep the refresh countdown in the header current
        if self.scheduler.refresh_enabled() {
            self.state.needs_render = true;
        }
    }

    fn drain_captured(&mut self) {
        let mut captured = Vec::new();
        if let Some(rx) = self.capture_rx.as_mut() {
            while let Ok(request) = rx.try_recv() {
                captured.push(request);
            }
        }
        for request in captured {
            self.record_captured(request);
        }
    }

    fn poll_visitor_info(&mut self) {
        let Some(rx) = self.visitor_rx.as_mut() else {
            return;
        };
        let info = match rx.try_recv() {
            Ok(info) => info,
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => {
                tracing::warn!("Visitor lookup task ended without a result");
                VisitorInfo::fallback()
            }
        };

        self.visitor_rx = None;
        self.state.loading = false;
        // The entry carries the time the visitor info was gathered
        self.record_at(visitor::session_start_entry(&info), info.timestamp);
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        let entries = self.filtered_entries();
        let now = Instant::now();
        let refresh = self
            .scheduler
            .refresh_interval()
            .zip(self.scheduler.refresh_remaining(now));

        let refresh_prompt = (self.state.input_mode == InputMode::EditingRefreshInterval)
            .then_some(self.state.refresh_input.as_str());

        let ctx = LogViewContext {
            entries: &entries,
            total: self.store.len(),
            filters: &self.state.filters,
            editing: self.state.input_mode.editing_filter(),
            refresh_prompt,
            refresh,
            payload_url: self.state.payload_url.as_deref(),
            loading: self.state.loading,
            scroll: self.state.scroll,
        };
        let notifications = self.state.notifications.visible();

        tui.draw(|frame| {
            let area = frame.size();
            render_log_viewer(frame, area, &ctx);
            render_notifications(frame, area, &notifications);
        })
    }

    // ========================================================================
    // Operations (called by input handlers and timers)
    // ========================================================================

    /// Entries matching the current filter inputs
    pub fn filtered_entries(&self) -> Vec<LogEntry> {
        self.store.filter(&self.state.filters.criteria())
    }

    /// Append an entry stamped now
    pub(crate) fn record(&mut self, entry: NewEntry) {
        self.record_at(entry, Utc::now());
    }

    /// Append an entry stamped with the time the capture endpoint saw it
    pub(crate) fn record_captured(&mut self, request: CapturedRequest) {
        self.record_at(request.entry, request.received_at);
    }

    fn record_at(&mut self, entry: NewEntry, timestamp: DateTime<Utc>) {
        if let Err(e) = self.store.append_at(entry, timestamp).map(|_| ()) {
            self.report_save_error(&e);
        }
        self.state.needs_render = true;
    }

    pub(crate) fn clear_logs(&mut self) {
        match self.store.clear() {
            Ok(()) => self.state.notify("Logs cleared successfully"),
            Err(e) => self.report_save_error(&e),
        }
        self.state.scroll = 0;
        self.state.needs_render = true;
    }

    pub(crate) fn download_logs(&mut self) {
        match store::export_to(&self.config.export_dir, self.store.entries(), Utc::now()) {
            Ok(path) => {
                tracing::info!("Exported {} entries to {}", self.store.len(), path.display());
                self.state.notify("Logs downloaded successfully");
            }
            Err(e) => {
                tracing::error!("Failed to export logs: {:#}", e);
                self.state.notify_error("Failed to download logs");
            }
        }
    }

    /// Drop expired entries
    pub(crate) fn run_cleanup(&mut self, now: DateTime<Utc>) {
        match self.store.prune(now) {
            Ok(removed) if removed > 0 => self.state.needs_render = true,
            Ok(_) => {}
            Err(e) => {
                self.report_save_error(&e);
                self.state.needs_render = true;
            }
        }
    }

    /// Re-apply the filter and redraw
    pub(crate) fn refresh_tick(&mut self) {
        self.state.notify("Logs refreshed");
    }

    pub(crate) fn toggle_auto_refresh(&mut self, now: Instant) {
        if self.scheduler.refresh_enabled() {
            self.scheduler.disable_refresh();
            self.state.notify("Auto-refresh disabled");
        } else {
            self.scheduler.enable_refresh(self.state.refresh_interval, now);
            self.state.notify(format!(
                "Auto-refresh every {}ms",
                self.state.refresh_interval.as_millis()
            ));
        }
    }

    /// Apply a refresh interval typed in milliseconds
    ///
    /// A running refresh timer is replaced; a stopped one stays stopped.
    pub(crate) fn apply_refresh_interval(&mut self, input: &str, now: Instant) {
        match input.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => {
                self.state.refresh_interval = Duration::from_millis(ms);
                self.scheduler
                    .set_refresh_interval(self.state.refresh_interval, now);
                self.state
                    .notify(format!("Refresh interval set to {}ms", ms));
            }
            _ => self
                .state
                .notify_error(format!("Invalid refresh interval: {:?}", input.trim())),
        }
    }

    pub(crate) fn show_payload_url(&mut self) {
        match self.state.payload_url.clone() {
            Some(url) => self.state.notify(format!("Payload URL: {}", url)),
            None => self.state.notify_error("Capture endpoint is not running"),
        }
    }

    fn report_save_error(&mut self, e: &store::StoreError) {
        tracing::debug!("Persistence failure detail: {}", e.user_message());
        self.state.notify_error("Failed to save logs");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use chrono::Duration as ChronoDuration;
    use tempfile::TempDir;

    fn test_app(config: Config) -> App {
        let backend: Box<dyn Backend> = Box::new(MemoryBackend::new());
        let store = LogStore::new(backend, StoreLimits::from_config(&config));
        App::new(config, store)
    }

    fn failing_app() -> App {
        let backend = MemoryBackend::new();
        backend.set_fail_writes(true);
        let backend: Box<dyn Backend> = Box::new(backend);
        let config = Config::default();
        let store = LogStore::new(backend, StoreLimits::from_config(&config));
        App::new(config, store)
    }

    #[test]
    fn test_record_and_filter() {
        let mut app = test_app(Config::default());
        app.record(NewEntry::new("10.0.0.5").with_status(404));
        app.record(NewEntry::new("192.168.1.1").with_status(200));

        app.state.filters.status = "404".to_string();
        let filtered = app.filtered_entries();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].ip, "10.0.0.5");
    }

    #[test]
    fn test_save_failure_notifies_and_keeps_entry() {
        let mut app = failing_app();
        app.record(NewEntry::new("10.0.0.5"));

        assert_eq!(app.store.len(), 1);
        let visible = app.state.notifications.visible();
        assert_eq!(visible[0].notification_type.message(), "Failed to save logs");
        assert!(visible[0].notification_type.is_error());
    }

    #[test]
    fn test_clear_logs_notifies() {
        let mut app = test_app(Config::default());
        app.record(NewEntry::new("10.0.0.5"));
        app.state.scroll = 3;

        app.clear_logs();

        assert!(app.store.is_empty());
        assert_eq!(app.state.scroll, 0);
        assert_eq!(
            app.state.notifications.visible()[0].notification_type.message(),
            "Logs cleared successfully"
        );
    }

    #[test]
    fn test_download_logs_writes_export() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            export_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };
        let mut app = test_app(config);
        app.record(NewEntry::new("10.0.0.5"));

        app.download_logs();

        let files: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        assert_eq!(
            app.state.notifications.visible()[0].notification_type.message(),
            "Logs downloaded successfully"
        );
    }

    #[test]
    fn test_cleanup_timer_prunes_expired_entries() {
        let config = Config {
            auto_cleanup_interval_ms: 1000,
            ..Config::default()
        };
        let mut app = test_app(config);
        let wall_now = Utc::now();
        app.store
            .append_at(NewEntry::new("old"), wall_now - ChronoDuration::seconds(5))
            .unwrap();
        app.store.append_at(NewEntry::new("new"), wall_now).unwrap();

        app.housekeeping(Instant::now() + Duration::from_secs(2), wall_now);

        assert_eq!(app.store.len(), 1);
        assert_eq!(app.store.entries()[0].ip, "new");
    }

    #[test]
    fn test_toggle_and_replace_refresh() {
        let mut app = test_app(Config::default());
        let now = Instant::now();
        assert!(!app.scheduler.refresh_enabled());

        app.toggle_auto_refresh(now);
        assert_eq!(
            app.scheduler.refresh_interval(),
            Some(Duration::from_millis(5000))
        );

        app.apply_refresh_interval("750", now);
        assert_eq!(
            app.scheduler.refresh_interval(),
            Some(Duration::from_millis(750))
        );

        app.housekeeping(now + Duration::from_millis(800), Utc::now());
        let messages: Vec<_> = app
            .state
            .notifications
            .visible()
            .iter()
            .map(|n| n.notification_type.message().to_string())
            .collect();
        assert!(messages.contains(&"Logs refreshed".to_string()));

        app.toggle_auto_refresh(now);
        assert!(!app.scheduler.refresh_enabled());
    }

    #[test]
    fn test_interval_change_while_disabled_only_updates_state() {
        let mut app = test_app(Config::default());
        app.apply_refresh_interval("1200", Instant::now());
        assert_eq!(app.state.refresh_interval, Duration::from_millis(1200));
        assert!(!app.scheduler.refresh_enabled());

        app.apply_refresh_interval("soon", Instant::now());
        assert_eq!(app.state.refresh_interval, Duration::from_millis(1200));
        assert!(app.state.notifications.visible()[0]
            .notification_type
            .is_error());
    }

    #[test]
    fn test_visitor_result_is_recorded() {
        let mut app = test_app(Config::default());
        let (tx, rx) = oneshot::channel();
        app.visitor_rx = Some(rx);
        app.state.loading = true;

        app.housekeeping(Instant::now(), Utc::now());
        assert!(app.store.is_empty());
        assert!(app.state.loading);

        let info = VisitorInfo {
            timestamp: Utc::now() - ChronoDuration::seconds(30),
            ..VisitorInfo::fallback()
        };
        let looked_up_at = info.timestamp;
        tx.send(info).unwrap();
        app.housekeeping(Instant::now(), Utc::now());

        assert!(!app.state.loading);
        assert_eq!(app.store.len(), 1);
        let entry = &app.store.entries()[0];
        assert_eq!(entry.ip, store::UNKNOWN_IP);
        assert_eq!(entry.method.as_deref(), Some(visitor::SESSION_START_METHOD));
        assert_eq!(entry.timestamp, looked_up_at);
    }

    #[test]
    fn test_zero_cap_records_without_error() {
        let config = Config {
            max_logs: 0,
            ..Config::default()
        };
        let mut app = test_app(config);
        app.record(NewEntry::new("10.0.0.5"));
        app.record(NewEntry::new("10.0.0.6"));

        assert_eq!(app.store.len(), 1);
        assert_eq!(app.store.entries()[0].ip, "10.0.0.6");
        assert!(app.state.notifications.is_empty());
    }

    #[test]
    fn test_captured_requests_are_drained() {
        let mut app = test_app(Config::default());
        let (tx, rx) = capture::server::create_channel(4);
        app.capture_rx = Some(rx);

        let received_at = Utc::now() - ChronoDuration::seconds(1);
        for ip in ["10.0.0.1", "10.0.0.2"] {
            tx.try_send(CapturedRequest {
                entry: NewEntry::new(ip).with_method("GET"),
                received_at,
            })
            .unwrap();
        }

        app.housekeeping(Instant::now(), Utc::now());

        assert_eq!(app.store.len(), 2);
        assert_eq!(app.store.entries()[0].ip, "10.0.0.2");
        assert_eq!(app.store.entries()[0].timestamp, received_at);
    }
}
