//! Dense tile storage with bounds-checked access and occupancy links.

use sokoban_core::{CrateId, OccupantKind, Position, TileKind};

/// A movable object recorded on a tile.
///
/// Crates carry their identifier so the engine-owned crate set and the grid
/// occupancy can be kept consistent without parent pointers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Occupant {
    /// The player-controlled keeper.
    Keeper,
    /// The crate with the given identifier.
    Crate(CrateId),
}

impl Occupant {
    /// The front-end facing kind of this occupant.
    #[must_use]
    pub const fn kind(self) -> OccupantKind {
        match self {
            Self::Keeper => OccupantKind::Keeper,
            Self::Crate(_) => OccupantKind::Crate,
        }
    }
}

/// A single grid cell: fixed tile identity plus the occupant link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    kind: TileKind,
    occupant: Option<Occupant>,
}

impl Tile {
    const fn floor() -> Self {
        Self {
            kind: TileKind::Floor,
            occupant: None,
        }
    }

    /// Fixed identity of the tile.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Movable object currently standing on the tile, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<Occupant> {
        self.occupant
    }
}

/// Row-major grid of tiles sized at level load.
///
/// Every in-bounds cell holds exactly one tile. Out-of-bounds queries return
/// an absent value rather than faulting; the direct mutation primitives, by
/// contrast, treat an out-of-range position as caller misuse and panic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid of the given dimensions populated with empty floor.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is negative.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        assert!(
            width >= 0 && height >= 0,
            "grid dimensions must be non-negative, got {width}x{height}"
        );
        let capacity = width as usize * height as usize;
        Self {
            width,
            height,
            tiles: vec![Tile::floor(); capacity],
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Returns the tile at `position`, or `None` outside the grid.
    #[must_use]
    pub fn tile_at(&self, position: Position) -> Option<&Tile> {
        self.index(position).map(|index| &self.tiles[index])
    }

    /// Returns the movable object at `position`, or `None` if the position
    /// is outside the grid or the tile is empty.
    #[must_use]
    pub fn object_at(&self, position: Position) -> Option<Occupant> {
        self.tile_at(position).and_then(Tile::occupant)
    }

    /// Reports whether the tile at `position` can be walked on.
    ///
    /// False outside the grid and false on non-walkable tile kinds. Vacancy
    /// is deliberately not consulted here; the movement primitives check it.
    #[must_use]
    pub fn is_walkable(&self, position: Position) -> bool {
        self.tile_at(position)
            .map_or(false, |tile| tile.kind().is_walkable())
    }

    /// Replaces the tile at `position` with an empty tile of `kind`.
    ///
    /// A load-time primitive: any existing occupant link is discarded.
    ///
    /// # Panics
    ///
    /// Panics if `position` is outside the grid.
    pub fn place_tile(&mut self, position: Position, kind: TileKind) {
        *self.slot(position) = Tile {
            kind,
            occupant: None,
        };
    }

    /// Sets or clears the occupant link at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is outside the grid, or when placing an occupant
    /// on a non-walkable tile.
    pub fn set_occupant(&mut self, position: Position, occupant: Option<Occupant>) {
        let tile = self.slot(position);
        assert!(
            occupant.is_none() || tile.kind.is_walkable(),
            "occupant placed on a non-walkable tile at ({}, {})",
            position.x(),
            position.y()
        );
        tile.occupant = occupant;
    }

    /// Iterates every tile in row-major order, x varying fastest.
    ///
    /// The save format emits a newline after the last column of each row, so
    /// this exact order is load-bearing for serialization.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Tile)> {
        let width = self.width;
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let index = index as i32;
            (Position::new(index % width, index / width), tile)
        })
    }

    fn index(&self, position: Position) -> Option<usize> {
        if position.x() >= 0
            && position.x() < self.width
            && position.y() >= 0
            && position.y() < self.height
        {
            Some((position.y() * self.width + position.x()) as usize)
        } else {
            None
        }
    }

    fn slot(&mut self, position: Position) -> &mut Tile {
        let Some(index) = self.index(position) else {
            panic!(
                "position ({}, {}) outside the {}x{} grid",
                position.x(),
                position.y(),
                self.width,
                self.height
            );
        };
        &mut self.tiles[index]
    }
}

#[cfg(test)]
mod tests {
    use super::{Grid, Occupant, Tile};
    use sokoban_core::{CrateId, Position, TileKind};

    #[test]
    fn out_of_bounds_queries_are_absent() {
        let grid = Grid::new(3, 2);
        for position in [
            Position::new(-1, 0),
            Position::new(0, -1),
            Position::new(3, 0),
            Position::new(0, 2),
            Position::new(7, 7),
        ] {
            assert!(grid.tile_at(position).is_none());
            assert!(grid.object_at(position).is_none());
            assert!(!grid.is_walkable(position));
        }
    }

    #[test]
    fn new_grid_is_empty_walkable_floor() {
        let grid = Grid::new(2, 2);
        for (_, tile) in grid.iter() {
            assert_eq!(tile.kind(), TileKind::Floor);
            assert!(tile.occupant().is_none());
        }
        assert!(grid.is_walkable(Position::new(1, 1)));
    }

    #[test]
    fn iteration_is_row_major_x_fastest() {
        let grid = Grid::new(3, 2);
        let order: Vec<Position> = grid.iter().map(|(position, _)| position).collect();
        assert_eq!(
            order,
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(2, 0),
                Position::new(0, 1),
                Position::new(1, 1),
                Position::new(2, 1),
            ]
        );
    }

    #[test]
    fn occupant_link_round_trips_through_the_tile() {
        let mut grid = Grid::new(2, 2);
        let cell = Position::new(1, 0);
        assert!(grid.object_at(cell).is_none());

        grid.set_occupant(cell, Some(Occupant::Crate(CrateId::new(0))));
        assert_eq!(grid.object_at(cell), Some(Occupant::Crate(CrateId::new(0))));
        assert_eq!(
            grid.tile_at(cell).and_then(Tile::occupant),
            Some(Occupant::Crate(CrateId::new(0)))
        );

        grid.set_occupant(cell, None);
        assert!(grid.object_at(cell).is_none());
    }

    #[test]
    fn walls_are_not_walkable_but_bounds_still_checked_first() {
        let mut grid = Grid::new(2, 1);
        grid.place_tile(Position::new(0, 0), TileKind::Wall);
        assert!(!grid.is_walkable(Position::new(0, 0)));
        assert!(grid.is_walkable(Position::new(1, 0)));
    }

    #[test]
    fn place_tile_discards_the_occupant_link() {
        let mut grid = Grid::new(1, 1);
        let cell = Position::new(0, 0);
        grid.set_occupant(cell, Some(Occupant::Keeper));
        grid.place_tile(cell, TileKind::Target);
        assert_eq!(grid.tile_at(cell).map(Tile::kind), Some(TileKind::Target));
        assert!(grid.object_at(cell).is_none());
    }

    #[test]
    #[should_panic(expected = "non-walkable")]
    fn occupant_on_a_wall_panics() {
        let mut grid = Grid::new(1, 1);
        grid.place_tile(Position::new(0, 0), TileKind::Wall);
        grid.set_occupant(Position::new(0, 0), Some(Occupant::Keeper));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn mutating_out_of_bounds_panics() {
        let mut grid = Grid::new(1, 1);
        grid.place_tile(Position::new(4, 4), TileKind::Floor);
    }
}
