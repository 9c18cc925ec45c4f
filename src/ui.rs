use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::{App, AppState};
use crate::version::Mode;

/// Main render function
pub fn render(frame: &mut Frame,
              app: &mut App)
{
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header: target name + live mtime
        Constraint::Length(1), // Mode selector
        Constraint::Min(5),    // Version list
        Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_mode_line(frame, app, chunks[1]);
    render_versions(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render restore confirmation
    if app.state == AppState::ConfirmRestore
    {
        render_confirm_overlay(frame, app);
    }

    // Render help overlay if in help state
    if app.state == AppState::Help
    {
        render_help_overlay(frame);
    }
}

/// Render the target name and its current last-modified time
fn render_header(frame: &mut Frame,
                 app: &App,
                 area: Rect)
{
    let lines = vec![
        Line::from(Span::styled(app.target_name(),
                                Style::default().fg(Color::White).add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(format!("Last Modified: {}", app.live_modified_label()),
                                Style::default().fg(Color::Gray))),
        Line::from(""),
    ];

    let paragraph = Paragraph::new(lines).alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render the unique/all mode selector
fn render_mode_line(frame: &mut Frame,
                    app: &App,
                    area: Rect)
{
    let selected = Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD);
    let unselected = Style::default().fg(Color::DarkGray);

    let (unique_style, all_style) = match app.mode
    {
        Mode::Unique => (selected, unselected),
        Mode::All => (unselected, selected),
    };

    let line = Line::from(vec![
        Span::styled(" Unique Versions ", unique_style),
        Span::raw("  "),
        Span::styled(" All Snapshots ", all_style),
    ]);

    let paragraph = Paragraph::new(line).alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render the version list
fn render_versions(frame: &mut Frame,
                   app: &mut App,
                   area: Rect)
{
    // Calculate visible height (area height minus borders and the
    // column header line)
    let visible_height = area.height.saturating_sub(3) as usize;

    // Save visible height for movement calculations
    app.visible_height = visible_height;

    // Adjust scroll to keep cursor visible
    app.adjust_scroll(visible_height);

    let title = match app.mode
    {
        Mode::Unique => format!(" Versions ({}) ", app.versions.len()),
        Mode::All => format!(" Snapshots ({}) ", app.versions.len()),
    };

    let block = Block::default().title(title)
                                .borders(Borders::ALL)
                                .border_style(Style::default().fg(Color::Cyan));

    if app.versions.is_empty()
    {
        let message = match &app.state
        {
            AppState::Error(e) => e.as_str(),
            _ => "No different versions found",
        };
        let paragraph = Paragraph::new(message).block(block)
                                               .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Line::from(Span::styled(format!("  {:<22}{}", "Snapshot Date", "Modified"),
                                         Style::default().add_modifier(Modifier::BOLD)));

    let mut items: Vec<ListItem> = vec![ListItem::new(header)];

    items.extend(app.versions
                    .iter()
                    .enumerate()
                    .skip(app.scroll)
                    .take(visible_height)
                    .map(|(i, version)| {
                        let is_selected = i == app.cursor;
                        let is_highlighted = app.highlight.get(i).copied().unwrap_or(false);
                        let prefix = if is_selected { ">" } else { " " };

                        let line = format!("{} {:<22}{}",
                                           prefix,
                                           version.formatted_snapshot_time(),
                                           version.formatted_modified_time());

                        let style = if is_selected
                        {
                            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                        }
                        else if is_highlighted
                        {
                            // First occurrence of a content change
                            Style::default().fg(Color::Cyan)
                        }
                        else
                        {
                            Style::default().fg(Color::Gray)
                        };

                        ListItem::new(line).style(style)
                    }));

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame,
                     app: &App,
                     area: Rect)
{
    let status_text = if let Some(ref msg) = app.status_message
    {
        msg.clone()
    }
    else
    {
        match &app.state
        {
            AppState::ConfirmRestore => "[y/Enter]restore  [n/Esc]cancel".to_string(),
            AppState::Error(e) => format!("Error: {}", e),
            AppState::Help => "Press q or ? to close help".to_string(),
            AppState::Ready =>
            {
                "[↑↓/jk]move  [Tab/m]mode  [r]estore  [?]help  [q]uit".to_string()
            }
        }
    };

    let style = match &app.state
    {
        AppState::Error(_) => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::DarkGray),
    };

    let paragraph = Paragraph::new(status_text).style(style);
    frame.render_widget(paragraph, area);
}

/// Render restore confirmation overlay
fn render_confirm_overlay(frame: &mut Frame,
                          app: &App)
{
    let area = centered_rect(60, 25, frame.area());

    frame.render_widget(Clear, area);

    let label = app.selected_version()
                   .map(|v| v.display_label())
                   .unwrap_or_default();

    let block = Block::default().title(" Restore ")
                                .borders(Borders::ALL)
                                .border_style(Style::default().fg(Color::Yellow));

    let text = vec![
        Line::from(""),
        Line::from(Span::raw(format!("Restore {} from:", app.target_name()))),
        Line::from(Span::styled(label, Style::default().fg(Color::Cyan))),
        Line::from(""),
        Line::from(Span::raw("The current version is kept as a timestamped backup.")),
        Line::from(""),
        Line::from(Span::styled("[y] Restore    [n] Cancel",
                                Style::default().add_modifier(Modifier::BOLD))),
    ];

    let paragraph = Paragraph::new(text).block(block)
                                        .alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame)
{
    let area = centered_rect(60, 60, frame.area());

    // Clear the area first
    frame.render_widget(Clear, area);

    let help_text = vec![
        Line::from(vec![
            Span::styled("Keyboard Controls", Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  ↑ / k    ", Style::default().fg(Color::Cyan)),
            Span::raw("Move cursor up"),
        ]),
        Line::from(vec![
            Span::styled("  ↓ / j    ", Style::default().fg(Color::Cyan)),
            Span::raw("Move cursor down"),
        ]),
        Line::from(vec![
            Span::styled("  Ctrl-F   ", Style::default().fg(Color::Cyan)),
            Span::raw("Page down (full screen)"),
        ]),
        Line::from(vec![
            Span::styled("  Ctrl-B   ", Style::default().fg(Color::Cyan)),
            Span::raw("Page up (full screen)"),
        ]),
        Line::from(vec![
            Span::styled("  Ctrl-D   ", Style::default().fg(Color::Cyan)),
            Span::raw("Scroll down (half screen)"),
        ]),
        Line::from(vec![
            Span::styled("  Ctrl-U   ", Style::default().fg(Color::Cyan)),
            Span::raw("Scroll up (half screen)"),
        ]),
        Line::from(vec![
            Span::styled("  g / Home ", Style::default().fg(Color::Cyan)),
            Span::raw("Go to first version"),
        ]),
        Line::from(vec![
            Span::styled("  G / End  ", Style::default().fg(Color::Cyan)),
            Span::raw("Go to last version"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Tab / m  ", Style::default().fg(Color::Cyan)),
            Span::raw("Toggle unique / all snapshots"),
        ]),
        Line::from(vec![
            Span::styled("  r        ", Style::default().fg(Color::Cyan)),
            Span::raw("Restore the selected version"),
        ]),
        Line::from(vec![
            Span::styled("  ?        ", Style::default().fg(Color::Cyan)),
            Span::raw("Toggle this help"),
        ]),
        Line::from(vec![
            Span::styled("  q / Esc  ", Style::default().fg(Color::Cyan)),
            Span::raw("Quit"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Highlighted rows", Style::default().fg(Color::Yellow)),
        ]),
        Line::from("  In all-snapshots mode, the first snapshot showing"),
        Line::from("  each distinct modification time is highlighted."),
    ];

    let block = Block::default().title(" Help ")
                                .borders(Borders::ALL)
                                .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, area);
}

/// Create a centered rect with percentage of parent
fn centered_rect(percent_x: u16,
                 percent_y: u16,
                 area: Rect)
                 -> Rect
{
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
