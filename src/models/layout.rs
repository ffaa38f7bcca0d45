// src/models/layout.rs
use serde::{Deserialize, Serialize};

/// Where the player numbers sit in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerColumns {
    /// One `current/max` cell.
    Combined(usize),
    /// Two integer cells.
    Split { current: usize, max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub players: PlayerColumns,
    pub password: usize,
    pub host: usize,
    pub name: usize,
    pub terrain: usize,
    pub ping: Option<usize>,
}

/// The row shapes the master server renders.
///
/// `PasswordProtected` rows (full or password protected servers) carry their
/// player numbers in one `current/max` cell, one column fewer than the
/// fully available `Full` rows, which split them over two cells.
/// `PingCapable` is `Full` plus a trailing ping cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    PasswordProtected,
    Full,
    PingCapable,
}

impl Layout {
    pub fn width(self) -> usize {
        match self {
            Self::PasswordProtected => 5,
            Self::Full => 6,
            Self::PingCapable => 7,
        }
    }

    pub fn from_width(width: usize) -> Option<Self> {
        match width {
            5 => Some(Self::PasswordProtected),
            6 => Some(Self::Full),
            7 => Some(Self::PingCapable),
            _ => None,
        }
    }

    pub fn columns(self) -> Columns {
        match self {
            Self::PasswordProtected => Columns {
                players: PlayerColumns::Combined(0),
                password: 1,
                host: 2,
                name: 3,
                terrain: 4,
                ping: None,
            },
            Self::Full => Columns {
                players: PlayerColumns::Split { current: 0, max: 1 },
                password: 2,
                host: 3,
                name: 4,
                terrain: 5,
                ping: None,
            },
            Self::PingCapable => Columns {
                players: PlayerColumns::Split { current: 0, max: 1 },
                password: 2,
                host: 3,
                name: 4,
                terrain: 5,
                ping: Some(6),
            },
        }
    }
}

/// Which layout each token stream of a listing uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingFormat {
    /// Rows before the "Full server" marker.
    pub primary: Layout,
    /// Rows after it.
    pub secondary: Layout,
}

impl Default for ListingFormat {
    fn default() -> Self {
        Self {
            primary: Layout::PasswordProtected,
            secondary: Layout::PasswordProtected,
        }
    }
}
