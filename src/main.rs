use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self as ct_event, Event};

use snapver::app::App;
use snapver::config::Config;
use snapver::event::Command;
use snapver::resolver;
use snapver::restore;
use snapver::ui;
use snapver::version::Mode;

fn main() -> Result<()>
{
    let Some(arg) = std::env::args().nth(1)
    else
    {
        eprintln!("Usage: snapver <path>");
        eprintln!();
        eprintln!("Browse the snapshot versions of a file or directory and");
        eprintln!("restore a chosen one. Snapshot layout and naming are read");
        eprintln!("from the config file (snapver/config.toml in the user");
        eprintln!("config directory) and default to /home/.snapshots.");
        std::process::exit(1);
    };

    let target = absolute_target(arg)?;
    let config = Config::load()?;

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Create app and load initial versions
    let mut app = App::new(target);
    reload_versions(&mut app, &config);

    // Run event loop
    let result = run_event_loop(&mut terminal, &mut app, &config);

    // Restore terminal
    ratatui::restore();

    result
}

/// Make a relative command-line path absolute against the current
/// directory
fn absolute_target(arg: String) -> Result<PathBuf>
{
    let path = PathBuf::from(arg);
    if path.is_absolute()
    {
        return Ok(path);
    }

    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    Ok(cwd.join(path))
}

fn run_event_loop(terminal: &mut ratatui::DefaultTerminal,
                  app: &mut App,
                  config: &Config)
                  -> Result<()>
{
    loop
    {
        // Draw UI
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events with a timeout so quit stays responsive
        if ct_event::poll(Duration::from_millis(250))?
        {
            if let Event::Key(key) = ct_event::read()?
            {
                // Handle key and get optional command
                if let Some(cmd) = app.handle_key(key)
                {
                    execute_command(app, config, cmd);
                }
            }
        }

        if app.should_quit
        {
            break;
        }
    }

    Ok(())
}

/// Execute a command returned by the state machine. All filesystem
/// work happens here, synchronously.
fn execute_command(app: &mut App,
                   config: &Config,
                   cmd: Command)
{
    match cmd
    {
        Command::Reload => reload_versions(app, config),
        Command::Restore { source } =>
        {
            let target = app.target.clone();
            match restore::restore(&source, &target)
            {
                Ok(backup) =>
                {
                    app.set_status(format!("Restored from snapshot. Previous version saved as: {}",
                                           backup.display()));
                    // The live mtime just changed; recompute the list
                    reload_versions(app, config);
                }
                Err(e) =>
                {
                    app.set_error(e.to_string());
                }
            }
        }
        Command::Quit =>
        {
            // Already handled by should_quit flag
        }
    }
}

/// Resolve versions for the current mode and hand them to the app.
///
/// The unique set is always computed: in unique mode it is the list
/// itself, in all mode it drives the first-occurrence highlighting.
fn reload_versions(app: &mut App,
                   config: &Config)
{
    let unique = match resolver::resolve(&app.target, config, Mode::Unique)
    {
        Ok(v) => v,
        Err(e) =>
        {
            app.set_error(format!("Failed to resolve versions: {}", e));
            return;
        }
    };

    let live_modified = fs::metadata(&app.target).and_then(|m| m.modified()).ok();

    match app.mode
    {
        Mode::Unique =>
        {
            let highlight = vec![true; unique.len()];
            app.set_versions(unique, highlight, live_modified);
        }
        Mode::All =>
        {
            match resolver::resolve(&app.target, config, Mode::All)
            {
                Ok(all) =>
                {
                    let highlight = resolver::first_unique_flags(&all, &unique);
                    app.set_versions(all, highlight, live_modified);
                }
                Err(e) =>
                {
                    app.set_error(format!("Failed to resolve versions: {}", e));
                }
            }
        }
    }
}
