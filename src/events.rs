use std::path::PathBuf;

use crate::ScreenOffset;

/// Everything a front end can ask of a [`Session`](crate::session::Session).
///
/// Pointer positions are in surface pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Fill the field at random
    StartRandom,

    /// Start drawing a field by hand
    StartCustom,

    /// Load a previously exported field
    Import(PathBuf),

    /// Leave editing and start the simulation
    ContinueToRun,

    /// Pause a running simulation, or resume a paused one
    TogglePause,

    /// Write the current field to the next numbered file
    Export,

    /// Back to generation selection with an empty field
    Restart,

    /// Exit the application
    Exit,

    PointerDown { x: ScreenOffset, y: ScreenOffset },
    PointerMove { x: ScreenOffset, y: ScreenOffset },
    PointerUp,
}
