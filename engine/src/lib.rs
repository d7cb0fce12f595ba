#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state for a Sokoban-style puzzle engine.
//!
//! The [`Engine`] owns the active grid, the movable objects, the counters,
//! and a bounded undo history. Front-ends drive it through a handful of
//! synchronous operations: [`Engine::move_player`], [`Engine::undo`],
//! [`Engine::load_level`], and [`Engine::save_game`]; everything else is a
//! read-only query. Blocked moves are ordinary results, not errors, and the
//! only fallible operation is loading a map from text.

mod grid;
mod history;
mod map;
mod objects;

pub use crate::grid::{Grid, Occupant, Tile};
pub use crate::map::{parse, Level, Map, MapError};

use sokoban_core::{CrateId, Direction, MoveResult, OccupantKind, Position, TileKind};

use crate::history::{HistoryEntry, HistoryStack};
use crate::map::InProgress;
use crate::objects::Movables;

/// Bundled default map set, compiled into the crate so an engine can start
/// without touching a filesystem.
pub const DEFAULT_MAP: &str = include_str!("../assets/default.skb");

/// The running game: active grid, movables, counters, level list, history.
///
/// An engine is an owned value with no global state; embeddings that share
/// one instance across threads must serialize access externally.
#[derive(Clone, Debug)]
pub struct Engine {
    map_name: String,
    levels: Vec<Level>,
    level_index: usize,
    grid: Grid,
    movables: Movables,
    crates_on_target: usize,
    moves: usize,
    pushes: usize,
    history: HistoryStack,
}

impl Engine {
    /// Creates an engine running the bundled default map.
    #[must_use]
    pub fn new() -> Self {
        Self::load_game(DEFAULT_MAP).expect("bundled default map is well-formed")
    }

    /// Loads a game from a complete map text payload.
    ///
    /// Starts at the in-progress snapshot when the map carries one,
    /// otherwise at level 0. Reading the text from a file (and telling a
    /// missing file apart from malformed content) is the caller's concern.
    pub fn load_game(text: &str) -> Result<Self, MapError> {
        let map = map::parse(text)?;
        let (map_name, levels, in_progress) = map.into_parts();

        let (level_index, state) = match in_progress {
            Some(InProgress { level_index, rows }) => (level_index, build_state(&rows)),
            None => (0, build_state(levels[0].rows())),
        };

        Ok(Self {
            map_name,
            levels,
            level_index,
            grid: state.grid,
            movables: state.movables,
            crates_on_target: state.crates_on_target,
            moves: 0,
            pushes: 0,
            history: HistoryStack::new(),
        })
    }

    /// Restarts the engine on the stored level at `index`.
    ///
    /// The grid, movables, counters, and history are rebuilt from scratch;
    /// any in-progress state on the previous level is discarded.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid level index. Callers are expected to
    /// stay within `[0, level_count)`.
    pub fn load_level(&mut self, index: usize) {
        assert!(
            index < self.levels.len(),
            "level index {index} out of range for {} levels",
            self.levels.len()
        );
        let state = build_state(self.levels[index].rows());
        self.level_index = index;
        self.grid = state.grid;
        self.movables = state.movables;
        self.crates_on_target = state.crates_on_target;
        self.moves = 0;
        self.pushes = 0;
        self.history.clear();
    }

    /// Moves the keeper one cell in `direction`, pushing an adjacent crate
    /// when one is there.
    ///
    /// On any non-`Failed` result the move counter grows and the move is
    /// recorded for undo; pushes additionally bump the push counter and the
    /// crates-on-target count when the crate crossed a target boundary.
    /// `Failed` is an expected outcome for blocked moves and leaves every
    /// counter untouched.
    pub fn move_player(&mut self, direction: Direction) -> MoveResult {
        let result = self.movables.move_pushing(&mut self.grid, direction);
        if !result.moved() {
            return result;
        }

        self.moves += 1;
        if result.pushed() {
            self.pushes += 1;
        }
        match result {
            MoveResult::MovedAndPushedOntoTarget => self.crates_on_target += 1,
            MoveResult::MovedAndPushedOffTarget => self.crates_on_target -= 1,
            _ => {}
        }
        self.history.push(HistoryEntry {
            direction,
            pushed: result.pushed(),
        });
        result
    }

    /// Takes back the most recent recorded move, if any.
    ///
    /// Reverses the keeper (and the pushed crate, when the record says one
    /// moved) and rolls the counters back. With an empty history this is a
    /// no-op, not an error.
    pub fn undo(&mut self) {
        let Some(entry) = self.history.pop() else {
            return;
        };

        // Locate the pushed crate before the keeper steps away from it.
        let pushed_crate = if entry.pushed {
            self.movables.pushable_crate_in(&self.grid, entry.direction)
        } else {
            None
        };
        debug_assert_eq!(
            entry.pushed,
            pushed_crate.is_some(),
            "a push record implies an adjacent crate"
        );

        let reverse = entry.direction.opposite();
        let keeper_moved = self.movables.move_keeper(&mut self.grid, reverse);
        debug_assert!(keeper_moved, "undo retraces a recorded keeper move");

        if let Some(id) = pushed_crate {
            let was_on_target = self.movables.crate_on_target(&self.grid, id);
            let crate_moved = self.movables.move_crate(&mut self.grid, id, reverse);
            debug_assert!(crate_moved, "undo pulls the pushed crate back");
            let on_target = self.movables.crate_on_target(&self.grid, id);
            if was_on_target && !on_target {
                self.crates_on_target -= 1;
            } else if !was_on_target && on_target {
                self.crates_on_target += 1;
            }
            self.pushes -= 1;
        }
        self.moves -= 1;
    }

    /// Serializes the running game to the map text format, stored levels
    /// plus a `CurrentLevel:` dump of the live grid.
    #[must_use]
    pub fn save_game(&self) -> String {
        map::serialize_game(&self.map_name, &self.levels, self.level_index, &self.grid)
    }

    /// True iff every crate stands on a target tile.
    ///
    /// Answered from live counters in O(1); the grid is never re-scanned.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.crates_on_target == self.movables.crate_count()
    }

    /// Read-only access to the active grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Name declared by the map set.
    #[must_use]
    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    /// Index of the active level.
    #[must_use]
    pub fn level_index(&self) -> usize {
        self.level_index
    }

    /// Number of levels in the loaded map.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// The stored level the engine is currently playing.
    #[must_use]
    pub fn current_level(&self) -> &Level {
        &self.levels[self.level_index]
    }

    /// Number of crates on the active level.
    #[must_use]
    pub fn crate_count(&self) -> usize {
        self.movables.crate_count()
    }

    /// Number of crates currently standing on target tiles.
    #[must_use]
    pub fn crates_on_target(&self) -> usize {
        self.crates_on_target
    }

    /// Successful moves since the level was (re)loaded.
    #[must_use]
    pub fn moves(&self) -> usize {
        self.moves
    }

    /// Successful pushes since the level was (re)loaded.
    #[must_use]
    pub fn pushes(&self) -> usize {
        self.pushes
    }

    /// Number of moves currently available to [`Engine::undo`].
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Current cell of the keeper.
    #[must_use]
    pub fn keeper_position(&self) -> Position {
        self.movables.keeper_position()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

struct LevelState {
    grid: Grid,
    movables: Movables,
    crates_on_target: usize,
}

/// Builds the live grid and movable set from validated level rows.
fn build_state(rows: &[String]) -> LevelState {
    let width = rows.first().map_or(0, |row| row.chars().count()) as i32;
    let height = rows.len() as i32;
    let mut grid = Grid::new(width, height);
    let mut keeper = None;
    let mut crates = Vec::new();
    let mut crates_on_target = 0;

    for (y, row) in rows.iter().enumerate() {
        for (x, code) in row.chars().enumerate() {
            let position = Position::new(x as i32, y as i32);
            let (kind, occupant) =
                map::decode_cell(code).expect("level rows are validated at parse time");
            grid.place_tile(position, kind);
            match occupant {
                Some(OccupantKind::Keeper) => {
                    keeper = Some(position);
                    grid.set_occupant(position, Some(Occupant::Keeper));
                }
                Some(OccupantKind::Crate) => {
                    if kind == TileKind::Target {
                        crates_on_target += 1;
                    }
                    let id = CrateId::new(crates.len() as u32);
                    crates.push(position);
                    grid.set_occupant(position, Some(Occupant::Crate(id)));
                }
                None => {}
            }
        }
    }

    let keeper = keeper.expect("levels hold exactly one keeper after parsing");
    LevelState {
        grid,
        movables: Movables::new(keeper, crates),
        crates_on_target,
    }
}

#[cfg(test)]
mod tests {
    use super::{Engine, Occupant};
    use sokoban_core::{Position, TileKind};

    #[test]
    fn default_map_loads_and_places_the_keeper() {
        let engine = Engine::new();
        assert!(engine.level_count() > 1);
        assert_eq!(engine.level_index(), 0);
        assert_eq!(
            engine.grid().object_at(engine.keeper_position()),
            Some(Occupant::Keeper)
        );
        assert_eq!(engine.moves(), 0);
        assert_eq!(engine.pushes(), 0);
    }

    #[test]
    fn loaded_grid_mirrors_the_level_rows() {
        let text = "MapSetName: Mirror\n\
                    LevelName: Tiny\n\
                    wwww\n\
                    wsdw\n\
                    wwww\n";
        let engine = Engine::load_game(text).expect("map parses");
        let grid = engine.grid();
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(
            grid.tile_at(Position::new(0, 0)).map(|tile| tile.kind()),
            Some(TileKind::Wall)
        );
        assert_eq!(
            grid.tile_at(Position::new(2, 1)).map(|tile| tile.kind()),
            Some(TileKind::Target)
        );
        assert_eq!(grid.object_at(Position::new(1, 1)), Some(Occupant::Keeper));
        assert_eq!(engine.keeper_position(), Position::new(1, 1));
        assert_eq!(engine.crate_count(), 0);
    }
}
