//! Common UI components shared across pages.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::App;
use crate::data::PageKind;

/// Render the header bar with an overview of the loaded file.
///
/// Displays: client role, snapshot count, broker and topic counts.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    if app.history.is_none() {
        let line = Line::from(vec![
            Span::styled(" STATWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("│ "),
            Span::raw(app.stats_path.display().to_string()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let summary = &app.summary;
    let client = match &summary.client_name {
        Some(name) => format!("{name} ({})", summary.client_role.as_str()),
        None => summary.client_role.as_str().to_string(),
    };

    let mut spans = vec![
        Span::styled(" STATWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(client, Style::default().fg(app.theme.highlight)),
        Span::raw(" │ "),
        Span::styled(
            summary.snapshots.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" snapshots │ "),
        Span::styled(
            summary.brokers.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" brokers │ "),
        Span::styled(
            summary.topics.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" topics"),
    ];
    if summary.truncated {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            "truncated input",
            Style::default().fg(app.theme.warning),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar, one tab per page.
///
/// Highlights the current page.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = app
        .pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let title = match &page.kind {
                PageKind::Brokers => "Brokers".to_string(),
                PageKind::Topic(name) => name.clone(),
            };
            Line::from(format!(" {}:{} ", i + 1, title))
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_page)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: breadcrumb trail and available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit r:retry", err)
    } else if app.history.is_some() {
        let controls = if app.show_detail_overlay {
            "↑↓:chart Esc:close q:close"
        } else {
            "↑↓:select Tab:page Enter:series e:export r:reload ?:help q:quit"
        };
        format!(" {} | {}", app.breadcrumb(), controls)
    } else {
        " Loading... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current page.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch pages"),
        Line::from("  1-9         Jump to page"),
        Line::from("  ↑/↓ j/k     Select chart"),
        Line::from("  PgUp/PgDn   Jump 5 charts"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Series diagnostics"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Reload file"),
        Line::from("  e         Save charts"),
        Line::from("  d         Save charts and debug data"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 23u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
