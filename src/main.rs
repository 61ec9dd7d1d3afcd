mod app;
mod cli;
mod error;
mod logging;
mod monitor;
mod presenter;
mod settings;
mod speedtest;
mod ui;

use anyhow::Result;
use app::{poll_event, App, AppAction};
use clap::Parser;
use cli::Cli;
use crossterm::event::Event;
use monitor::provider::SysinfoProvider;
use monitor::sampler::Sampler;
use monitor::system_info::SystemInfo;
use ratatui::DefaultTerminal;
use settings::Settings;
use std::time::Duration;
use tracing::info;
use ui::draw_ui;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings()?;

    let log_path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    logging::init(&log_path, &cli.log_level)?;
    info!(log = %log_path.display(), "sysbro starting");

    let mut terminal = ratatui::init();
    terminal.clear()?;

    let result = run_app(&mut terminal, settings).await;

    ratatui::restore();
    info!("sysbro exiting");
    result
}

async fn run_app(terminal: &mut DefaultTerminal, settings: Settings) -> Result<()> {
    let mut sampler = Sampler::new(SysinfoProvider::new(), settings.sample_interval());
    let mut app = App::new(settings, SystemInfo::gather());

    loop {
        // Sample only while the home page is on screen.
        if app.monitor_visible() {
            if !sampler.is_running() {
                sampler.set_interval(app.settings.sample_interval());
                sampler.start();
            }
        } else if sampler.is_running() {
            sampler.stop();
        }

        while let Some(event) = sampler.try_next() {
            app.presenter.apply(event);
        }
        app.on_tick();

        terminal.draw(|frame| draw_ui(frame, &app))?;

        if let Some(Event::Key(key)) = poll_event(Duration::from_millis(30))? {
            match app.handle_key_event(key) {
                Some(AppAction::Quit) => break,
                Some(AppAction::StartTest) => app.start_test(),
                None => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    sampler.stop();
    Ok(())
}
