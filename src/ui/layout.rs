use crate::app::{App, AppView};
use crate::settings::SettingsField;
use crate::speedtest::Page;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const ACCENT: Color = Color::Rgb(100, 149, 237);
const CPU: Color = Color::Rgb(44, 167, 248);
const CPU_DIM: Color = Color::Rgb(30, 80, 115);
const MEMORY: Color = Color::Rgb(24, 189, 155);
const MEMORY_DIM: Color = Color::Rgb(20, 90, 75);
const DISK: Color = Color::Rgb(111, 91, 236);
const DISK_DIM: Color = Color::Rgb(60, 50, 115);
const SUCCESS: Color = Color::Rgb(134, 194, 156);
const FAILURE: Color = Color::Rgb(220, 120, 120);
const TEXT_PRIMARY: Color = Color::Rgb(230, 230, 230);
const TEXT_SECONDARY: Color = Color::Rgb(160, 160, 160);
const TEXT_MUTED: Color = Color::Rgb(100, 100, 100);
const BORDER: Color = Color::Rgb(60, 60, 65);

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw_ui(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(8),
        Constraint::Length(1),
    ])
    .split(area);

    draw_header(frame, chunks[0], app);

    match app.view {
        AppView::Settings => draw_settings_view(frame, chunks[1], app),
        AppView::Main => match app.page() {
            Page::Home => draw_home(frame, chunks[1], app),
            Page::InProgress => draw_in_progress(frame, chunks[1], app),
            Page::Success => draw_success(frame, chunks[1], app),
            Page::Failed => draw_failed(frame, chunks[1], app),
        },
    }

    draw_help(frame, chunks[2], app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(BORDER));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::horizontal([
        Constraint::Length(12),
        Constraint::Min(10),
    ])
    .split(inner);

    let title = Paragraph::new("sysbro")
        .style(Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD));
    frame.render_widget(title, chunks[0]);

    let (status, color) = match (app.view, app.page()) {
        (AppView::Settings, _) => ("Settings", TEXT_SECONDARY),
        (_, Page::Home) => ("Monitoring", TEXT_MUTED),
        (_, Page::InProgress) => ("Testing network speed...", ACCENT),
        (_, Page::Success) => ("Speed test complete", SUCCESS),
        (_, Page::Failed) => ("Speed test failed", FAILURE),
    };

    frame.render_widget(
        Paragraph::new(status)
            .style(Style::default().fg(color))
            .alignment(Alignment::Right),
        chunks[1],
    );
}

// Home
fn draw_home(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(5),
        Constraint::Min(9),
    ])
    .split(area);

    let gauges = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .split(chunks[0]);

    let state = app.presenter.state();
    draw_gauge(frame, gauges[0], "CPU", CPU, CPU_DIM, state.cpu_percent, &state.cpu_status);
    draw_gauge(frame, gauges[1], "Memory", MEMORY, MEMORY_DIM, state.memory_percent, &state.memory_text);
    draw_gauge(frame, gauges[2], "Disk", DISK, DISK_DIM, state.disk_percent, &state.disk_text);

    draw_system_info(frame, chunks[1], app);
}

fn draw_gauge(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    color: Color,
    dim_color: Color,
    percent: f32,
    tips: &str,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER))
        .title(Span::styled(format!(" {} ", title), Style::default().fg(color)));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(inner);

    frame.render_widget(
        Paragraph::new(format!("{:.1}%", percent))
            .style(Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        chunks[0],
    );

    draw_progress_bar(frame, chunks[1], f64::from(percent) / 100.0, color, dim_color);

    frame.render_widget(
        Paragraph::new(tips.to_string())
            .style(Style::default().fg(TEXT_SECONDARY))
            .alignment(Alignment::Center),
        chunks[2],
    );
}

/// One-row usage bar, padded by a cell on each side.
fn draw_progress_bar(frame: &mut Frame, area: Rect, ratio: f64, color: Color, dim_color: Color) {
    let Some(cells) = area.width.checked_sub(2).filter(|w| *w >= 2) else {
        return;
    };
    let cells = usize::from(cells);
    let lit = ((ratio.clamp(0.0, 1.0) * cells as f64).round() as usize).min(cells);

    let bar = Line::from(vec![
        Span::styled("━".repeat(lit), Style::default().fg(color)),
        Span::styled("━".repeat(cells - lit), Style::default().fg(dim_color)),
    ]);
    let padded = Rect {
        x: area.x + 1,
        width: area.width - 2,
        ..area
    };
    frame.render_widget(Paragraph::new(bar), padded);
}

fn draw_system_info(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER))
        .title(Span::styled(" System info ", Style::default().fg(TEXT_SECONDARY)));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let state = app.presenter.state();
    let info = &app.system;
    let rows = [
        ("Platform", info.platform.clone()),
        ("Distribution", info.distribution.clone()),
        ("Startup time", info.boot_time.clone()),
        ("Kernel release", info.kernel.clone()),
        ("Processor", info.processor.clone()),
        ("Upload", format!("{:<14}{}", state.upload_rate, state.upload_total)),
        ("Download", format!("{:<14}{}", state.download_rate, state.download_total)),
    ];

    let lines: Vec<Line> = rows
        .into_iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!(" {:<16}", label), Style::default().fg(TEXT_MUTED)),
                Span::styled(value, Style::default().fg(TEXT_PRIMARY)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

// Speed test pages
fn draw_in_progress(frame: &mut Frame, area: Rect, app: &App) {
    let spinner = SPINNER[app.spinner_frame % SPINNER.len()];
    let lines = vec![
        Line::from(Span::styled(spinner, Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))),
        Line::raw(""),
        Line::from(Span::styled(
            app.coordinator.status().to_string(),
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];
    draw_centered(frame, area, lines);
}

fn draw_success(frame: &mut Frame, area: Rect, app: &App) {
    let speed = app
        .coordinator
        .result()
        .map(|r| r.speed_text.clone())
        .unwrap_or_default();
    let lines = vec![
        Line::from(Span::styled("✔", Style::default().fg(SUCCESS).add_modifier(Modifier::BOLD))),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Your internet speed is ", Style::default().fg(TEXT_SECONDARY)),
            Span::styled(speed, Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD)),
        ]),
    ];
    draw_centered(frame, area, lines);
}

fn draw_failed(frame: &mut Frame, area: Rect, app: &App) {
    let cause = app.coordinator.failure().unwrap_or_default();
    let lines = vec![
        Line::from(Span::styled("✘", Style::default().fg(FAILURE).add_modifier(Modifier::BOLD))),
        Line::raw(""),
        Line::from(Span::styled(cause, Style::default().fg(TEXT_SECONDARY))),
    ];
    draw_centered(frame, area, lines);
}

fn draw_centered(frame: &mut Frame, area: Rect, lines: Vec<Line>) {
    let height = lines.len() as u16;
    let top = area.height.saturating_sub(height) / 2;
    let body = Rect {
        y: area.y + top,
        height: height.min(area.height),
        ..area
    };
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), body);
}

// Settings
fn draw_settings_view(frame: &mut Frame, area: Rect, app: &App) {
    let content_area = Layout::horizontal([
        Constraint::Length(2),
        Constraint::Min(30),
        Constraint::Length(2),
    ])
    .split(area)[1];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER));
    let inner = block.inner(content_area);
    frame.render_widget(block, content_area);

    let rows = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .split(inner);

    draw_setting_row(
        frame,
        rows[0],
        "Sample interval",
        &format!("{} ms", app.settings.sample_interval_ms),
        app.selected_setting == SettingsField::SampleInterval,
    );

    draw_setting_row(
        frame,
        rows[1],
        "Download size",
        &format!("{} MB", app.settings.download_size_mb),
        app.selected_setting == SettingsField::DownloadSize,
    );

    draw_setting_row(
        frame,
        rows[2],
        "Test timeout",
        &format!("{} s", app.settings.probe_timeout_secs),
        app.selected_setting == SettingsField::ProbeTimeout,
    );
}

fn draw_setting_row(frame: &mut Frame, area: Rect, label: &str, value: &str, selected: bool) {
    let (label_color, value_color, value) = if selected {
        (ACCENT, TEXT_PRIMARY, format!("< {value} >"))
    } else {
        (TEXT_SECONDARY, TEXT_MUTED, value.to_string())
    };

    let row = Line::from(vec![
        Span::styled(format!(" {label:<17}"), Style::default().fg(label_color)),
        Span::styled(value, Style::default().fg(value_color)),
    ]);
    frame.render_widget(Paragraph::new(row), area);
}

fn draw_help(frame: &mut Frame, area: Rect, app: &App) {
    let help = match (app.view, app.page()) {
        (AppView::Settings, _) => "↑↓ select · ←→ adjust · enter done",
        (_, Page::Home) => "enter start test · s settings · q quit",
        (_, Page::InProgress) => "q quit",
        (_, Page::Success | Page::Failed) => "enter back to home · q quit",
    };

    frame.render_widget(
        Paragraph::new(help)
            .style(Style::default().fg(TEXT_MUTED))
            .alignment(Alignment::Center),
        area,
    );
}
