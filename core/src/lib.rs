#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core vocabulary shared across the Sokoban engine.
//!
//! This crate defines the value types that connect the authoritative engine
//! to any front-end: directions, grid positions, tile and occupant kinds,
//! crate identifiers, and the outcome of a keeper move. Everything here is a
//! small, copyable value with no mutable state; the engine crate owns the
//! grid and drives the state transitions.

use serde::{Deserialize, Serialize};

/// Cardinal movement directions available to the keeper and to crates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Returns the fixed opposite of this direction.
    ///
    /// North pairs with South and East pairs with West; undoing a move walks
    /// the opposite direction of the recorded one.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }
}

/// Zero-based, grid-relative cell coordinates.
///
/// Positions are plain values passed by copy. They may name cells outside
/// the grid; the grid treats such positions as absent rather than faulting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new position from column and row indices.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the adjacent position one cell away in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        match direction {
            Direction::North => Self::new(self.x, self.y - 1),
            Direction::East => Self::new(self.x + 1, self.y),
            Direction::South => Self::new(self.x, self.y + 1),
            Direction::West => Self::new(self.x - 1, self.y),
        }
    }
}

/// Fixed identity of a grid tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Ordinary walkable floor.
    Floor,
    /// Solid wall; never walkable.
    Wall,
    /// Walkable floor that marks a crate destination.
    Target,
}

impl TileKind {
    /// Reports whether the tile kind can be walked on at all.
    ///
    /// Walkability is a property of the kind alone; whether the tile is
    /// currently vacant is the mover's concern.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        match self {
            Self::Floor | Self::Target => true,
            Self::Wall => false,
        }
    }
}

/// Kind of movable object occupying a tile, as seen by a front-end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccupantKind {
    /// The single player-controlled warehouse keeper.
    Keeper,
    /// A pushable crate.
    Crate,
}

/// Unique identifier assigned to a crate within the active level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CrateId(u32);

impl CrateId {
    /// Creates a new crate identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Outcome of asking the keeper to move, possibly pushing a crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveResult {
    /// Nothing moved: the destination was blocked, off the grid, or a crate
    /// in the way could not itself move.
    Failed,
    /// The keeper moved into an empty cell; no crate was involved.
    MovedOnly,
    /// The keeper moved and pushed a crate whose on-target status did not
    /// change.
    MovedAndPushed,
    /// The keeper moved and the pushed crate landed on a target tile.
    MovedAndPushedOntoTarget,
    /// The keeper moved and the pushed crate left a target tile.
    MovedAndPushedOffTarget,
}

impl MoveResult {
    /// Reports whether the keeper changed cells.
    #[must_use]
    pub const fn moved(self) -> bool {
        !matches!(self, Self::Failed)
    }

    /// Reports whether a crate was pushed along with the keeper.
    #[must_use]
    pub const fn pushed(self) -> bool {
        matches!(
            self,
            Self::MovedAndPushed | Self::MovedAndPushedOntoTarget | Self::MovedAndPushedOffTarget
        )
    }
}
