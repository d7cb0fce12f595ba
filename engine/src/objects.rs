//! Movable objects and push resolution.
//!
//! The keeper and the crates own nothing but their positions; the grid owns
//! the occupancy links. Every mutation funnels through one move primitive so
//! the two can never disagree.

use sokoban_core::{CrateId, Direction, MoveResult, Position, TileKind};

use crate::grid::{Grid, Occupant, Tile};

/// The single player-controlled movable object.
#[derive(Clone, Copy, Debug)]
struct Keeper {
    position: Position,
}

/// A pushable crate; its identifier is its index in the level's crate set.
#[derive(Clone, Copy, Debug)]
struct Crate {
    position: Position,
}

/// The movable-object set of the active level.
#[derive(Clone, Debug)]
pub(crate) struct Movables {
    keeper: Keeper,
    crates: Vec<Crate>,
}

impl Movables {
    /// Builds the set from the keeper position and the crate positions in
    /// identifier order. The grid occupancy for these cells is installed by
    /// the level loader, not here.
    pub(crate) fn new(keeper: Position, crates: Vec<Position>) -> Self {
        Self {
            keeper: Keeper { position: keeper },
            crates: crates
                .into_iter()
                .map(|position| Crate { position })
                .collect(),
        }
    }

    pub(crate) fn keeper_position(&self) -> Position {
        self.keeper.position
    }

    pub(crate) fn crate_count(&self) -> usize {
        self.crates.len()
    }

    pub(crate) fn crate_position(&self, id: CrateId) -> Position {
        self.crates[id.get() as usize].position
    }

    /// True iff the tile under the crate is a target.
    pub(crate) fn crate_on_target(&self, grid: &Grid, id: CrateId) -> bool {
        grid.tile_at(self.crate_position(id)).map(Tile::kind) == Some(TileKind::Target)
    }

    /// Returns the crate adjacent to the keeper in `direction`, if any.
    pub(crate) fn pushable_crate_in(&self, grid: &Grid, direction: Direction) -> Option<CrateId> {
        match grid.object_at(self.keeper.position.step(direction)) {
            Some(Occupant::Crate(id)) => Some(id),
            _ => None,
        }
    }

    /// Moves the keeper one cell via the shared primitive.
    pub(crate) fn move_keeper(&mut self, grid: &mut Grid, direction: Direction) -> bool {
        match advance(grid, self.keeper.position, direction, Occupant::Keeper) {
            Some(destination) => {
                self.keeper.position = destination;
                true
            }
            None => false,
        }
    }

    /// Moves one crate one cell via the shared primitive.
    pub(crate) fn move_crate(&mut self, grid: &mut Grid, id: CrateId, direction: Direction) -> bool {
        let from = self.crate_position(id);
        match advance(grid, from, direction, Occupant::Crate(id)) {
            Some(destination) => {
                self.crates[id.get() as usize].position = destination;
                true
            }
            None => false,
        }
    }

    /// Moves the keeper in `direction`, pushing the adjacent crate if one is
    /// there, and classifies the outcome.
    ///
    /// A crate blocked by a wall, the grid edge, or another crate aborts the
    /// whole operation; crates are never chain-pushed and the keeper stays
    /// put on failure.
    pub(crate) fn move_pushing(&mut self, grid: &mut Grid, direction: Direction) -> MoveResult {
        let mut push = None;
        if let Some(id) = self.pushable_crate_in(grid, direction) {
            let was_on_target = self.crate_on_target(grid, id);
            if !self.move_crate(grid, id, direction) {
                return MoveResult::Failed;
            }
            push = Some((id, was_on_target));
        }

        if !self.move_keeper(grid, direction) {
            // A pushed crate vacated the keeper's destination, so this arm
            // is only reachable when no crate was involved.
            return MoveResult::Failed;
        }

        match push {
            None => MoveResult::MovedOnly,
            Some((id, was_on_target)) => {
                let on_target = self.crate_on_target(grid, id);
                if was_on_target == on_target {
                    MoveResult::MovedAndPushed
                } else if on_target {
                    MoveResult::MovedAndPushedOntoTarget
                } else {
                    MoveResult::MovedAndPushedOffTarget
                }
            }
        }
    }
}

/// The shared move primitive.
///
/// Fails without mutating anything when the destination tile is absent,
/// non-walkable, or occupied. Otherwise clears the source link, sets the
/// destination link, and reports the destination; the caller records it as
/// the object's new position. No partial state is observable outside this
/// function.
fn advance(
    grid: &mut Grid,
    from: Position,
    direction: Direction,
    occupant: Occupant,
) -> Option<Position> {
    let destination = from.step(direction);
    if !grid.is_walkable(destination) || grid.object_at(destination).is_some() {
        return None;
    }
    grid.set_occupant(from, None);
    grid.set_occupant(destination, Some(occupant));
    Some(destination)
}

#[cfg(test)]
mod tests {
    use super::Movables;
    use crate::grid::{Grid, Occupant};
    use sokoban_core::{CrateId, Direction, MoveResult, Position, TileKind};

    /// Open 5x5 grid, crates at (0, 0) and (0, 2), keeper at (0, 1).
    fn open_grid_scenario() -> (Grid, Movables) {
        let mut grid = Grid::new(5, 5);
        let crates = vec![Position::new(0, 0), Position::new(0, 2)];
        for (index, position) in crates.iter().enumerate() {
            grid.set_occupant(*position, Some(Occupant::Crate(CrateId::new(index as u32))));
        }
        grid.set_occupant(Position::new(0, 1), Some(Occupant::Keeper));
        (grid, Movables::new(Position::new(0, 1), crates))
    }

    #[test]
    fn push_against_the_grid_edge_fails() {
        let (mut grid, mut movables) = open_grid_scenario();
        // The crate at (0, 0) has nowhere to go north of the grid.
        assert_eq!(
            movables.move_pushing(&mut grid, Direction::North),
            MoveResult::Failed
        );
        assert_eq!(movables.keeper_position(), Position::new(0, 1));
        assert_eq!(movables.crate_position(CrateId::new(0)), Position::new(0, 0));
    }

    #[test]
    fn push_into_open_floor_moves_crate_and_keeper() {
        let (mut grid, mut movables) = open_grid_scenario();
        assert_eq!(
            movables.move_pushing(&mut grid, Direction::South),
            MoveResult::MovedAndPushed
        );
        assert_eq!(movables.keeper_position(), Position::new(0, 2));
        assert_eq!(movables.crate_position(CrateId::new(1)), Position::new(0, 3));
    }

    #[test]
    fn walking_off_the_grid_fails() {
        let (mut grid, mut movables) = open_grid_scenario();
        assert_eq!(
            movables.move_pushing(&mut grid, Direction::West),
            MoveResult::Failed
        );
        assert_eq!(movables.keeper_position(), Position::new(0, 1));
    }

    #[test]
    fn moving_with_nothing_adjacent_is_moved_only() {
        let (mut grid, mut movables) = open_grid_scenario();
        assert_eq!(
            movables.move_pushing(&mut grid, Direction::East),
            MoveResult::MovedOnly
        );
        assert_eq!(movables.keeper_position(), Position::new(1, 1));
    }

    #[test]
    fn adjacent_crates_never_chain_push() {
        let mut grid = Grid::new(5, 1);
        let crates = vec![Position::new(1, 0), Position::new(2, 0)];
        grid.set_occupant(Position::new(1, 0), Some(Occupant::Crate(CrateId::new(0))));
        grid.set_occupant(Position::new(2, 0), Some(Occupant::Crate(CrateId::new(1))));
        grid.set_occupant(Position::new(0, 0), Some(Occupant::Keeper));
        let mut movables = Movables::new(Position::new(0, 0), crates);

        assert_eq!(
            movables.move_pushing(&mut grid, Direction::East),
            MoveResult::Failed
        );
        assert_eq!(movables.keeper_position(), Position::new(0, 0));
        assert_eq!(movables.crate_position(CrateId::new(0)), Position::new(1, 0));
        assert_eq!(movables.crate_position(CrateId::new(1)), Position::new(2, 0));
    }

    #[test]
    fn push_onto_and_off_a_target_is_classified() {
        let mut grid = Grid::new(4, 1);
        grid.place_tile(Position::new(2, 0), TileKind::Target);
        grid.set_occupant(Position::new(1, 0), Some(Occupant::Crate(CrateId::new(0))));
        grid.set_occupant(Position::new(0, 0), Some(Occupant::Keeper));
        let mut movables = Movables::new(Position::new(0, 0), vec![Position::new(1, 0)]);

        assert_eq!(
            movables.move_pushing(&mut grid, Direction::East),
            MoveResult::MovedAndPushedOntoTarget
        );
        assert!(movables.crate_on_target(&grid, CrateId::new(0)));

        assert_eq!(
            movables.move_pushing(&mut grid, Direction::East),
            MoveResult::MovedAndPushedOffTarget
        );
        assert!(!movables.crate_on_target(&grid, CrateId::new(0)));
    }

    #[test]
    fn push_into_a_wall_fails_without_moving_anything() {
        let mut grid = Grid::new(3, 1);
        grid.place_tile(Position::new(2, 0), TileKind::Wall);
        grid.set_occupant(Position::new(1, 0), Some(Occupant::Crate(CrateId::new(0))));
        grid.set_occupant(Position::new(0, 0), Some(Occupant::Keeper));
        let mut movables = Movables::new(Position::new(0, 0), vec![Position::new(1, 0)]);

        assert_eq!(
            movables.move_pushing(&mut grid, Direction::East),
            MoveResult::Failed
        );
        assert_eq!(grid.object_at(Position::new(0, 0)), Some(Occupant::Keeper));
        assert_eq!(
            grid.object_at(Position::new(1, 0)),
            Some(Occupant::Crate(CrateId::new(0)))
        );
    }

    #[test]
    fn successful_moves_keep_positions_and_occupancy_consistent() {
        let (mut grid, mut movables) = open_grid_scenario();
        assert!(movables.move_pushing(&mut grid, Direction::East).moved());

        // Exactly the destination tile reports the keeper, and the stored
        // position agrees with it.
        assert!(grid.object_at(Position::new(0, 1)).is_none());
        assert_eq!(grid.object_at(Position::new(1, 1)), Some(Occupant::Keeper));
        assert_eq!(movables.keeper_position(), Position::new(1, 1));
    }
}
