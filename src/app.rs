use crate::monitor::system_info::SystemInfo;
use crate::presenter::Presenter;
use crate::settings::{Settings, SettingsField};
use crate::speedtest::coordinator::Coordinator;
use crate::speedtest::download::DownloadProbe;
use crate::error::ProbeError;
use crate::speedtest::{Page, SpeedProbe, TestPhase};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    Main,
    Settings,
}

pub struct App {
    pub presenter: Presenter,
    pub coordinator: Coordinator,
    pub system: SystemInfo,
    pub should_quit: bool,

    // UI state
    pub view: AppView,
    pub spinner_frame: usize,

    // Settings
    pub settings: Settings,
    pub selected_setting: SettingsField,
}

impl App {
    pub fn new(settings: Settings, system: SystemInfo) -> Self {
        Self {
            presenter: Presenter::new(),
            coordinator: Coordinator::new(),
            system,
            should_quit: false,
            view: AppView::Main,
            spinner_frame: 0,
            settings,
            selected_setting: SettingsField::SampleInterval,
        }
    }

    pub fn page(&self) -> Page {
        self.coordinator.page()
    }

    /// The home page with its gauges is on screen; sampling only happens then.
    pub fn monitor_visible(&self) -> bool {
        self.view == AppView::Main && self.page() == Page::Home
    }

    pub fn on_tick(&mut self) {
        self.coordinator.pump();
        if self.coordinator.phase() == TestPhase::Running {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }

    pub fn handle_key_event(&mut self, key: event::KeyEvent) -> Option<AppAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match self.view {
            AppView::Main => self.handle_main_key(key),
            AppView::Settings => self.handle_settings_key(key),
        }
    }

    fn handle_main_key(&mut self, key: event::KeyEvent) -> Option<AppAction> {
        if key.code == KeyCode::Char('q') {
            self.should_quit = true;
            return Some(AppAction::Quit);
        }

        match self.page() {
            Page::Home => match key.code {
                KeyCode::Enter | KeyCode::Char('t') => Some(AppAction::StartTest),
                KeyCode::Char('s') => {
                    self.view = AppView::Settings;
                    None
                }
                _ => None,
            },
            Page::Success | Page::Failed => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                    if let Err(e) = self.coordinator.return_to_idle() {
                        debug!(error = %e, "return home ignored");
                    }
                }
                None
            }
            Page::InProgress => None,
        }
    }

    fn handle_settings_key(&mut self, key: event::KeyEvent) -> Option<AppAction> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => {
                self.view = AppView::Main;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_setting = self.selected_setting.prev();
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                self.selected_setting = self.selected_setting.next();
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.settings.decrease(self.selected_setting);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.settings.increase(self.selected_setting);
            }
            _ => {}
        }
        None
    }

    /// Spawns a download probe from the current settings. Needs a tokio runtime.
    pub fn start_test(&mut self) {
        let probe = DownloadProbe::new(
            self.settings.probe_url.clone(),
            self.settings.download_size_bytes(),
        )
        .map(|probe| Arc::new(probe) as Arc<dyn SpeedProbe>);
        self.launch(probe);
    }

    fn launch(&mut self, probe: Result<Arc<dyn SpeedProbe>, ProbeError>) {
        self.spinner_frame = 0;
        let started = match probe {
            Ok(probe) => self
                .coordinator
                .start_test(probe, self.settings.probe_timeout()),
            Err(e) => {
                warn!(error = %e, "could not build speed probe");
                self.coordinator.fail_to_start(e)
            }
        };
        if let Err(e) = started {
            debug!(error = %e, "start request ignored");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    StartTest,
}

pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn app() -> App {
        let system = SystemInfo {
            platform: "x86_64".into(),
            distribution: "Linux".into(),
            boot_time: "2024-01-01 00:00:00".into(),
            kernel: "6.1".into(),
            processor: "Test CPU x 4".into(),
        };
        App::new(Settings::default(), system)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn home_keys() {
        let mut app = app();
        assert!(app.monitor_visible());
        assert_eq!(app.handle_key_event(press(KeyCode::Enter)), Some(AppAction::StartTest));
        assert_eq!(app.handle_key_event(press(KeyCode::Char('t'))), Some(AppAction::StartTest));

        assert_eq!(app.handle_key_event(press(KeyCode::Char('q'))), Some(AppAction::Quit));
        assert!(app.should_quit);
    }

    #[test]
    fn settings_view_hides_the_monitor() {
        let mut app = app();
        app.handle_key_event(press(KeyCode::Char('s')));
        assert_eq!(app.view, AppView::Settings);
        assert!(!app.monitor_visible());

        app.handle_key_event(press(KeyCode::Right));
        assert_eq!(app.settings.sample_interval_ms, 1250);
        app.handle_key_event(press(KeyCode::Down));
        assert_eq!(app.selected_setting, SettingsField::DownloadSize);
        app.handle_key_event(press(KeyCode::Left));
        assert_eq!(app.settings.download_size_mb, 20);

        app.handle_key_event(press(KeyCode::Esc));
        assert_eq!(app.view, AppView::Main);
        assert!(app.monitor_visible());
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = app();
        let mut key = press(KeyCode::Enter);
        key.kind = KeyEventKind::Release;
        assert_eq!(app.handle_key_event(key), None);
    }

    #[tokio::test]
    async fn unbuildable_download_shows_the_failed_page() {
        let mut app = app();
        app.launch(Err(ProbeError::Aborted));
        assert_eq!(app.page(), Page::Failed);
        assert!(!app.monitor_visible());

        app.handle_key_event(press(KeyCode::Enter));
        assert_eq!(app.page(), Page::Home);
    }

    #[tokio::test]
    async fn failed_test_returns_home_on_enter() {
        let mut app = app();
        app.settings.probe_url = "http://127.0.0.1:9/__down".into();
        app.settings.probe_timeout_secs = 5;
        app.start_test();
        assert!(!app.monitor_visible());
        assert_eq!(app.page(), Page::InProgress);
        assert_eq!(app.handle_key_event(press(KeyCode::Enter)), None);

        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while app.page() == Page::InProgress && std::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
            app.on_tick();
        }
        assert_eq!(app.page(), Page::Failed);

        app.handle_key_event(press(KeyCode::Enter));
        assert_eq!(app.page(), Page::Home);
        assert!(app.monitor_visible());
    }
}
