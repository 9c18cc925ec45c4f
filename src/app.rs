use std::path::PathBuf;
use std::time::SystemTime;

use crossterm::event::{KeyCode, KeyEvent};

use crate::event::{self, Command, Movement, is_help, is_mode_toggle, is_quit, is_restore};
use crate::version::{Mode, VersionView, format_system_time};

/// Application state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState
{
    Ready,
    ConfirmRestore,
    Error(String),
    Help,
}

/// State machine for the version browser.
///
/// Holds the resolved versions and the selection/mode/dialog state;
/// never reads the filesystem itself. Anything that needs filesystem
/// access is returned as a Command for the entry point to execute.
pub struct App
{
    pub state: AppState,
    pub target: PathBuf,
    pub mode: Mode,

    /// Rows for the current mode
    pub versions: Vec<VersionView>,
    /// Per-row flag: first occurrence of a content change
    pub highlight: Vec<bool>,
    /// Live target mtime at last reload, for the header
    pub live_modified: Option<SystemTime>,

    pub cursor: usize,
    pub scroll: usize,
    /// Visible list height for scroll calculations (updated by UI)
    pub visible_height: usize,

    pub status_message: Option<String>,
    pub should_quit: bool,
}

impl App
{
    pub fn new(target: PathBuf) -> Self
    {
        Self {
            state: AppState::Ready,
            target,
            mode: Mode::Unique,
            versions: Vec::new(),
            highlight: Vec::new(),
            live_modified: None,
            cursor: 0,
            scroll: 0,
            visible_height: 20,
            status_message: None,
            should_quit: false,
        }
    }

    /// File name of the target for the header
    pub fn target_name(&self) -> String
    {
        self.target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.target.display().to_string())
    }

    /// Header line for the live target's last-modified time
    pub fn live_modified_label(&self) -> String
    {
        match self.live_modified
        {
            Some(time) => format_system_time(time),
            None => "Unknown".to_string(),
        }
    }

    /// Version under the cursor, if any
    pub fn selected_version(&self) -> Option<&VersionView>
    {
        self.versions.get(self.cursor)
    }

    /// Replace the version list after a resolve
    pub fn set_versions(&mut self,
                        versions: Vec<VersionView>,
                        highlight: Vec<bool>,
                        live_modified: Option<SystemTime>)
    {
        self.versions = versions;
        self.highlight = highlight;
        self.live_modified = live_modified;
        self.cursor = 0;
        self.scroll = 0;
    }

    /// Set error state
    pub fn set_error(&mut self,
                     message: String)
    {
        self.state = AppState::Error(message);
    }

    /// Set status message
    pub fn set_status(&mut self,
                      message: String)
    {
        self.status_message = Some(message);
    }

    /// Handle a key event and return an optional command to execute
    pub fn handle_key(&mut self,
                      key: KeyEvent)
                      -> Option<Command>
    {
        let code = key.code;

        // The confirmation dialog swallows everything
        if self.state == AppState::ConfirmRestore
        {
            return self.handle_confirm_key(code);
        }

        if is_quit(code)
        {
            if self.state == AppState::Help
            {
                self.state = AppState::Ready;
                return None;
            }
            self.should_quit = true;
            return Some(Command::Quit);
        }

        if is_help(code)
        {
            self.state = if self.state == AppState::Help
            {
                AppState::Ready
            }
            else
            {
                AppState::Help
            };
            return None;
        }

        if self.state == AppState::Help
        {
            return None;
        }

        // Clear error state on any key
        if let AppState::Error(_) = &self.state
        {
            self.state = AppState::Ready;
        }

        if let Some(movement) = event::key_to_movement(&key)
        {
            self.apply_movement(movement);
            return None;
        }

        if is_mode_toggle(code)
        {
            return self.toggle_mode();
        }

        if is_restore(code)
        {
            // Restore only makes sense with a selection
            if self.selected_version().is_some()
            {
                self.state = AppState::ConfirmRestore;
            }
            return None;
        }

        None
    }

    /// Handle keys while the restore confirmation is showing
    fn handle_confirm_key(&mut self,
                          code: KeyCode)
                          -> Option<Command>
    {
        match code
        {
            KeyCode::Char('y') | KeyCode::Enter =>
            {
                self.state = AppState::Ready;
                self.selected_version()
                    .map(|v| Command::Restore { source: v.path.clone() })
            }
            KeyCode::Char('n') | KeyCode::Esc | KeyCode::Char('q') =>
            {
                self.state = AppState::Ready;
                None
            }
            _ => None,
        }
    }

    /// Switch between unique and all mode; the list must be reloaded
    fn toggle_mode(&mut self) -> Option<Command>
    {
        self.mode = match self.mode
        {
            Mode::Unique => Mode::All,
            Mode::All => Mode::Unique,
        };
        self.cursor = 0;
        self.scroll = 0;
        Some(Command::Reload)
    }

    /// Apply a movement to the version list
    fn apply_movement(&mut self,
                      movement: Movement)
    {
        if self.versions.is_empty()
        {
            return;
        }

        let max = self.versions.len() - 1;
        let visible_height = self.visible_height;
        let delta: i32 = match movement
        {
            Movement::Up(n) => -n,
            Movement::Down(n) => n,
            Movement::PageUp => -(visible_height as i32),
            Movement::PageDown => visible_height as i32,
            Movement::HalfPageUp => -(visible_height as i32 / 2).max(1),
            Movement::HalfPageDown => (visible_height as i32 / 2).max(1),
            Movement::Top => i32::MIN,
            Movement::Bottom => i32::MAX,
        };

        self.cursor = Self::clamp_cursor(self.cursor, delta, max);
    }

    /// Adjust scroll offset to keep cursor visible
    pub fn adjust_scroll(&mut self,
                         visible_height: usize)
    {
        if visible_height == 0
        {
            return;
        }

        if self.cursor < self.scroll
        {
            self.scroll = self.cursor;
        }
        else if self.cursor >= self.scroll + visible_height
        {
            self.scroll = self.cursor - visible_height + 1;
        }
    }

    fn clamp_cursor(current: usize,
                    delta: i32,
                    max: usize)
                    -> usize
    {
        if delta == i32::MIN
        {
            return 0;
        }
        if delta == i32::MAX
        {
            return max;
        }

        let new_pos = current as i32 + delta;
        new_pos.clamp(0, max as i32) as usize
    }
}

#[cfg(test)]
mod tests
{
    use chrono::NaiveDate;

    use super::*;

    fn view(id: &str) -> VersionView
    {
        VersionView {
            snapshot_id: id.to_string(),
            snapshot_time: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(12, 30, 0)
                .unwrap(),
            modified: SystemTime::UNIX_EPOCH,
            path: PathBuf::from("/home/.snapshots").join(id).join("notes.txt"),
            is_unique: true,
        }
    }

    fn key(code: KeyCode) -> KeyEvent
    {
        KeyEvent::from(code)
    }

    #[test]
    fn mode_toggle_flips_mode_and_requests_reload()
    {
        let mut app = App::new(PathBuf::from("/home/user/notes.txt"));
        assert_eq!(app.mode, Mode::Unique);

        let cmd = app.handle_key(key(KeyCode::Tab));
        assert!(matches!(cmd, Some(Command::Reload)));
        assert_eq!(app.mode, Mode::All);

        app.handle_key(key(KeyCode::Char('m')));
        assert_eq!(app.mode, Mode::Unique);
    }

    #[test]
    fn restore_needs_a_selection()
    {
        let mut app = App::new(PathBuf::from("/home/user/notes.txt"));

        // Empty list: the restore key does nothing
        assert!(app.handle_key(key(KeyCode::Char('r'))).is_none());
        assert_eq!(app.state, AppState::Ready);

        app.set_versions(vec![view("home.20240115T1230")], vec![true], None);
        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.state, AppState::ConfirmRestore);
    }

    #[test]
    fn confirming_restore_yields_the_selected_source()
    {
        let mut app = App::new(PathBuf::from("/home/user/notes.txt"));
        app.set_versions(vec![view("home.20240115T1230")], vec![true], None);
        app.handle_key(key(KeyCode::Char('r')));

        let cmd = app.handle_key(key(KeyCode::Char('y')));
        match cmd
        {
            Some(Command::Restore { source }) =>
            {
                assert_eq!(source,
                           PathBuf::from("/home/.snapshots/home.20240115T1230/notes.txt"));
            }
            other => panic!("expected Restore, got {other:?}"),
        }
        assert_eq!(app.state, AppState::Ready);
    }

    #[test]
    fn declining_restore_returns_to_ready_without_command()
    {
        let mut app = App::new(PathBuf::from("/home/user/notes.txt"));
        app.set_versions(vec![view("home.20240115T1230")], vec![true], None);
        app.handle_key(key(KeyCode::Char('r')));

        assert!(app.handle_key(key(KeyCode::Char('n'))).is_none());
        assert_eq!(app.state, AppState::Ready);
    }

    #[test]
    fn cursor_stays_within_the_list()
    {
        let mut app = App::new(PathBuf::from("/home/user/notes.txt"));
        app.set_versions(vec![view("a.20240115T1230"), view("b.20240112T0900")],
                         vec![true, true],
                         None);

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.cursor, 1);

        app.handle_key(key(KeyCode::End));
        assert_eq!(app.cursor, 1);
        app.handle_key(key(KeyCode::Home));
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn any_key_clears_an_error()
    {
        let mut app = App::new(PathBuf::from("/home/user/notes.txt"));
        app.set_error("boom".to_string());

        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.state, AppState::Ready);
    }
}
