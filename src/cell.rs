/// State of a single grid cell.
///
/// Stored on disk as `0` (dead) or `1` (alive).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Dead,
    Alive,
}

impl Cell {
    pub const fn is_alive(self) -> bool {
        matches!(self, Cell::Alive)
    }

    /// The opposite state. Used to pick the paint color of a stroke.
    pub const fn inverse(self) -> Self {
        match self {
            Cell::Dead => Cell::Alive,
            Cell::Alive => Cell::Dead,
        }
    }

    pub const fn as_u8(self) -> u8 {
        match self {
            Cell::Dead => 0,
            Cell::Alive => 1,
        }
    }

    /// Returns `None` for anything but `0` or `1`
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Cell::Dead),
            1 => Some(Cell::Alive),
            _ => None,
        }
    }
}

impl From<bool> for Cell {
    fn from(alive: bool) -> Self {
        if alive { Cell::Alive } else { Cell::Dead }
    }
}
