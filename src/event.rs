use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Commands that result from user input. The state machine never
/// touches the filesystem itself; the entry point executes these.
#[derive(Debug, Clone)]
pub enum Command
{
    /// Re-resolve versions (mode changed or filesystem state changed)
    Reload,
    /// Restore the selected version over the live target
    Restore
    {
        source: PathBuf
    },
    /// Quit the application
    Quit,
}

/// Movement amount for vi-style navigation
#[derive(Debug, Clone, Copy)]
pub enum Movement
{
    Up(i32),
    Down(i32),
    PageUp,      // Full page up (Ctrl-B)
    PageDown,    // Full page down (Ctrl-F)
    HalfPageUp,  // Half page up (Ctrl-U)
    HalfPageDown,// Half page down (Ctrl-D)
    Top,         // Go to top (Home, gg)
    Bottom,      // Go to bottom (End, G)
}

/// Convert a key event to movement
pub fn key_to_movement(key: &KeyEvent) -> Option<Movement>
{
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match (key.code, ctrl)
    {
        // Vi-style Ctrl navigation
        (KeyCode::Char('f'), true) => Some(Movement::PageDown),
        (KeyCode::Char('b'), true) => Some(Movement::PageUp),
        (KeyCode::Char('d'), true) => Some(Movement::HalfPageDown),
        (KeyCode::Char('u'), true) => Some(Movement::HalfPageUp),

        // Standard navigation
        (KeyCode::Up, _) | (KeyCode::Char('k'), false) => Some(Movement::Up(1)),
        (KeyCode::Down, _) | (KeyCode::Char('j'), false) => Some(Movement::Down(1)),
        (KeyCode::PageUp, _) => Some(Movement::PageUp),
        (KeyCode::PageDown, _) => Some(Movement::PageDown),
        (KeyCode::Home, _) | (KeyCode::Char('g'), false) => Some(Movement::Top),
        (KeyCode::End, _) | (KeyCode::Char('G'), false) => Some(Movement::Bottom),

        _ => None,
    }
}

/// Check if key toggles between unique and all mode
pub fn is_mode_toggle(key: KeyCode) -> bool
{
    matches!(key, KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('m'))
}

/// Check if key requests a restore of the selected version
pub fn is_restore(key: KeyCode) -> bool
{
    matches!(key, KeyCode::Char('r'))
}

/// Check if key is quit
pub fn is_quit(key: KeyCode) -> bool
{
    matches!(key, KeyCode::Char('q') | KeyCode::Esc)
}

/// Check if key is help
pub fn is_help(key: KeyCode) -> bool
{
    matches!(key, KeyCode::Char('?'))
}
