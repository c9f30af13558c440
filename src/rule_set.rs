use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::cell::Cell;

/// Rules of Conway's Game of Life.
pub const B3S23: RuleSet = RuleSet::new(0b1000, 0b1100);

/// # Representation
/// Life rules are represented as
/// ```notrust
/// |------birth------|
/// 0000_0000_0000_0000_0000_0000_0000_0000
///                     |----survival-----|
/// ```
///
/// # Examples
/// ```notrust
/// b3s23:                0000_0000_0000_1000_0000_0000_0000_1100
///
/// b0s0:                 0000_0000_0000_0000_0000_0000_0000_0000
/// b012345678s012345678: 0000_0001_1111_1111_0000_0001_1111_1111
/// ```
///
/// See: https://conwaylife.com/wiki/Rulestring
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleSet {
    rule: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        B3S23
    }
}

impl RuleSet {
    /// Create a new `RuleSet` for the given births and survivals. For both `b` and
    /// `s`, numbers are set on a bit basis. For instance if bit `i` in `b` is on, it
    /// means `i` is included in the set of births. Any bit past the 8th is ignored.
    pub const fn new(b: u16, s: u16) -> Self {
        let b = b & 0x1FF;
        let s = s & 0x1FF;

        Self {
            rule: (b as u32) << 16 | s as u32,
        }
    }

    pub fn births(&self) -> u16 {
        ((self.rule & 0x1FF0000) >> 0x10) as u16
    }

    pub fn survivals(&self) -> u16 {
        (self.rule & 0x1FF) as u16
    }

    /// The state of a cell in the next generation, given its current state and its number of
    /// live neighbours.
    pub fn next_state(&self, cell: Cell, live_neighbors: u8) -> Cell {
        let Some(bit) = 1u16.checked_shl(live_neighbors as u32) else {
            return Cell::Dead;
        };

        let set = if cell.is_alive() {
            self.survivals()
        } else {
            self.births()
        };

        Cell::from(set & bit != 0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleSetError {
    #[error("Unexpected character '{got}' in rule")]
    InvalidChar { got: char },

    #[error("Neighbour count {got} is out of range, expected 0 to 8")]
    OutOfRange { got: u32 },
}

impl FromStr for RuleSet {
    type Err = RuleSetError;

    /// Parses rules that look like `B3/S23`, `b3s23` or `B36/S23`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        enum State {
            Birth,
            Survival,
        }

        let mut state = State::Birth;
        let (mut b, mut s_bits) = (0u16, 0u16);

        for c in s.trim().chars() {
            match c {
                'b' | 'B' => {
                    state = State::Birth;
                }
                's' | 'S' => {
                    state = State::Survival;
                }
                '/' => {}
                n => {
                    let n = n.to_digit(10).ok_or(RuleSetError::InvalidChar { got: n })?;

                    if n > 8 {
                        return Err(RuleSetError::OutOfRange { got: n });
                    }

                    match state {
                        State::Survival => s_bits |= 1 << n,
                        State::Birth => b |= 1 << n,
                    }
                }
            }
        }

        Ok(RuleSet::new(b, s_bits))
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = |bits: u16| -> String {
            (0..=8)
                .filter(|&n| bits & (1u16 << n) != 0)
                .map(|n| char::from(b'0' + n as u8))
                .collect()
        };

        write!(f, "B{}/S{}", digits(self.births()), digits(self.survivals()))
    }
}

impl TryFrom<String> for RuleSet {
    type Error = RuleSetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RuleSet> for String {
    fn from(rule: RuleSet) -> Self {
        rule.to_string()
    }
}
