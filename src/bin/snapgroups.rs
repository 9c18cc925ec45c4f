use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self as ct_event, Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use snapver::groups::PackageGroups;

/// Checklist state for the group selector
struct Selector
{
    names: Vec<String>,
    checked: Vec<bool>,
    cursor: usize,
    confirmed: bool,
    should_quit: bool,
}

impl Selector
{
    fn new(groups: &PackageGroups) -> Self
    {
        let names: Vec<String> = groups.names().iter().map(|n| n.to_string()).collect();
        let checked = vec![false; names.len()];
        Self {
            names,
            checked,
            cursor: 0,
            confirmed: false,
            should_quit: false,
        }
    }

    fn handle_key(&mut self,
                  code: KeyCode)
    {
        match code
        {
            KeyCode::Up | KeyCode::Char('k') =>
            {
                if self.cursor > 0
                {
                    self.cursor -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') =>
            {
                if !self.names.is_empty() && self.cursor < self.names.len() - 1
                {
                    self.cursor += 1;
                }
            }
            KeyCode::Char(' ') =>
            {
                if let Some(checked) = self.checked.get_mut(self.cursor)
                {
                    *checked = !*checked;
                }
            }
            KeyCode::Char('a') =>
            {
                // Toggle all: check everything unless everything is
                // already checked
                let all_checked = self.checked.iter().all(|c| *c);
                for checked in &mut self.checked
                {
                    *checked = !all_checked;
                }
            }
            KeyCode::Enter =>
            {
                self.confirmed = true;
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Esc =>
            {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn selected_names(&self) -> Vec<&str>
    {
        self.names
            .iter()
            .zip(&self.checked)
            .filter(|(_, checked)| **checked)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

fn main() -> Result<()>
{
    let path = match std::env::args().nth(1)
    {
        Some(arg) => PathBuf::from(arg),
        None => match PackageGroups::default_path()
        {
            Some(p) => p,
            None =>
            {
                eprintln!("Error: no groups file given and no user config directory found.");
                eprintln!();
                eprintln!("Usage: snapgroups [groups.toml]");
                std::process::exit(1);
            }
        },
    };

    let groups = match PackageGroups::load(&path)
    {
        Ok(g) => g,
        Err(e) =>
        {
            eprintln!("Error: {:#}", e);
            eprintln!();
            eprintln!("The groups file maps group names to package identifiers:");
            eprintln!();
            eprintln!("  [groups]");
            eprintln!("  \"Video Capture\" = [\"com.obsproject.Studio\"]");
            std::process::exit(1);
        }
    };

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    let mut selector = Selector::new(&groups);
    let result = run_event_loop(&mut terminal, &mut selector);

    // Restore terminal before printing anything
    ratatui::restore();
    result?;

    if selector.confirmed
    {
        for package in groups.selected_packages(&selector.selected_names())
        {
            println!("{}", package);
        }
    }

    Ok(())
}

fn run_event_loop(terminal: &mut ratatui::DefaultTerminal,
                  selector: &mut Selector)
                  -> Result<()>
{
    loop
    {
        terminal.draw(|frame| render(frame, selector))?;

        if ct_event::poll(Duration::from_millis(250))?
        {
            if let Event::Key(key) = ct_event::read()?
            {
                selector.handle_key(key.code);
            }
        }

        if selector.should_quit
        {
            break;
        }
    }

    Ok(())
}

/// Render the checklist
fn render(frame: &mut Frame,
          selector: &Selector)
{
    let chunks = Layout::vertical([
        Constraint::Min(3),    // Group list
        Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

    let block = Block::default().title(" Select package groups ")
                                .borders(Borders::ALL)
                                .border_style(Style::default().fg(Color::Cyan));

    if selector.names.is_empty()
    {
        let paragraph = Paragraph::new("No groups defined").block(block)
                                                           .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, chunks[0]);
    }
    else
    {
        let items: Vec<ListItem> =
            selector.names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| {
                        let is_selected = i == selector.cursor;
                        let prefix = if is_selected { ">" } else { " " };
                        let mark = if selector.checked[i] { "[x]" } else { "[ ]" };

                        let line = format!("{} {} {}", prefix, mark, name);

                        let style = if is_selected
                        {
                            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                        }
                        else if selector.checked[i]
                        {
                            Style::default().fg(Color::Cyan)
                        }
                        else
                        {
                            Style::default().fg(Color::Gray)
                        };

                        ListItem::new(line).style(style)
                    })
                    .collect();

        let list = List::new(items).block(block);
        frame.render_widget(list, chunks[0]);
    }

    let status = Paragraph::new("[↑↓/jk]move  [Space]toggle  [a]ll  [Enter]confirm  [q]uit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, chunks[1]);
}
