use std::path::PathBuf;

use crossterm::event::Event as CrossTermEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;

use crate::ScreenOffset;
use crate::events::Event;

/// Canvas pixels per terminal column
pub const DOTS_PER_COLUMN: ScreenOffset = 2;

/// Canvas pixels per terminal row
pub const DOTS_PER_ROW: ScreenOffset = 4;

/// Whether clicking on terminal cells can reach every cell of a field drawn with
/// `cell_size` pixel cells. Smaller cells leave rows or columns that no terminal cell maps to.
pub fn reaches_every_cell(cell_size: u16) -> bool {
    let size = ScreenOffset::from(cell_size);

    size >= DOTS_PER_COLUMN && size >= DOTS_PER_ROW
}

/// Turns terminal input into session [`Event`]s.
///
/// Importing needs a file name, so `i` opens a one line prompt that swallows keys until it's
/// submitted with Enter or dismissed with Esc.
#[derive(Debug, Default)]
pub struct InputState {
    prompt: Option<String>,
}

impl InputState {
    /// The text typed into the import prompt, if it's open
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Converts a crossterm event into a lifefield event
    pub fn convert(&mut self, event: CrossTermEvent) -> Option<Event> {
        match event {
            CrossTermEvent::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                if self.prompt.is_some() {
                    self.prompt_key(key_event)
                } else {
                    self.key(key_event)
                }
            }
            CrossTermEvent::Mouse(mouse_event) => convert_mouse(mouse_event),
            _ => None,
        }
    }

    fn key(&mut self, key_event: KeyEvent) -> Option<Event> {
        match key_event {
            KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('q'),
                ..
            } => Some(Event::Exit),
            KeyEvent {
                code: KeyCode::Char('r'),
                ..
            } => Some(Event::StartRandom),
            KeyEvent {
                code: KeyCode::Char('c'),
                ..
            } => Some(Event::StartCustom),
            KeyEvent {
                code: KeyCode::Char('i'),
                ..
            } => {
                self.prompt = Some(String::new());
                None
            }
            KeyEvent {
                code: KeyCode::Enter,
                ..
            } => Some(Event::ContinueToRun),
            KeyEvent {
                code: KeyCode::Char(' ' | 'p'),
                ..
            } => Some(Event::TogglePause),
            KeyEvent {
                code: KeyCode::Char('e'),
                ..
            } => Some(Event::Export),
            KeyEvent {
                code: KeyCode::Char('n'),
                ..
            } => Some(Event::Restart),
            _ => None,
        }
    }

    fn prompt_key(&mut self, key_event: KeyEvent) -> Option<Event> {
        let prompt = self.prompt.as_mut()?;

        match key_event.code {
            KeyCode::Esc => {
                self.prompt = None;
                None
            }
            KeyCode::Enter => {
                let path = self.prompt.take()?;
                let path = path.trim();

                if path.is_empty() {
                    None
                } else {
                    Some(Event::Import(PathBuf::from(path)))
                }
            }
            KeyCode::Backspace => {
                prompt.pop();
                None
            }
            KeyCode::Char(c) => {
                prompt.push(c);
                None
            }
            _ => None,
        }
    }
}

/// Left button presses, drags and releases become pointer events at the top left pixel of the
/// terminal cell under the mouse.
fn convert_mouse(mouse_event: MouseEvent) -> Option<Event> {
    let x = ScreenOffset::from(mouse_event.column) * DOTS_PER_COLUMN;
    let y = ScreenOffset::from(mouse_event.row) * DOTS_PER_ROW;

    match mouse_event.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Event::PointerDown { x, y }),
        MouseEventKind::Drag(MouseButton::Left) => Some(Event::PointerMove { x, y }),
        MouseEventKind::Up(MouseButton::Left) => Some(Event::PointerUp),
        _ => None,
    }
}
