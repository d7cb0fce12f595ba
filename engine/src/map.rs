//! Parsing and serialization of the line-oriented map text format.
//!
//! A map file starts with a `MapSetName:` declaration, then carries one or
//! more `LevelName:` sections of raw map rows, and optionally a
//! `CurrentLevel:` section holding the live-grid dump of a game saved in
//! progress. Rows use a fixed character table, read case-insensitively and
//! written in lower case:
//!
//! | code | meaning          |
//! |------|------------------|
//! | `w`  | wall             |
//! | ` `  | empty floor      |
//! | `c`  | crate on floor   |
//! | `s`  | keeper on floor  |
//! | `d`  | empty target     |
//! | `p`  | crate on target  |
//! | `r`  | keeper on target |

use sokoban_core::{OccupantKind, TileKind};
use thiserror::Error;

use crate::grid::{Grid, Occupant};

const MAP_SET_NAME_KEY: &str = "MapSetName: ";
const LEVEL_NAME_KEY: &str = "LevelName: ";
const CURRENT_LEVEL_KEY: &str = "CurrentLevel: ";

const WALL_CODE: char = 'w';
const FLOOR_CODE: char = ' ';
const CRATE_CODE: char = 'c';
const KEEPER_CODE: char = 's';
const TARGET_CODE: char = 'd';
const CRATE_ON_TARGET_CODE: char = 'p';
const KEEPER_ON_TARGET_CODE: char = 'r';

/// Reasons a map text fails to parse.
///
/// Every variant names the offending line (1-based) or level so a front-end
/// can show an actionable message. The engine never substitutes a default
/// level for malformed input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    /// The first line was not a `MapSetName: <name>` declaration.
    #[error("line 1: expected a `MapSetName: <name>` declaration")]
    MissingMapName,
    /// The map declares no levels at all.
    #[error("map declares no levels")]
    NoLevels,
    /// A map row appeared before any `LevelName:` declaration.
    #[error("line {line}: map row appears before any level is declared")]
    RowBeforeLevel {
        /// Line carrying the stray row.
        line: usize,
    },
    /// A character outside the tile code table.
    #[error("line {line}, column {column}: unknown tile code {found:?}")]
    UnknownCode {
        /// Line carrying the unknown code.
        line: usize,
        /// 1-based column of the unknown code.
        column: usize,
        /// The character that failed to decode.
        found: char,
    },
    /// A row whose first or last character is not the wall code.
    #[error("line {line}: rows must start and end with the wall code 'w'")]
    UnwalledRow {
        /// Line carrying the unenclosed row.
        line: usize,
    },
    /// A row whose width differs from the first row of its level.
    #[error("line {line}: row is {found} cells wide, expected {expected}")]
    RaggedRow {
        /// Line carrying the mismatched row.
        line: usize,
        /// Width of the offending row.
        found: usize,
        /// Width established by the level's first row.
        expected: usize,
    },
    /// A `LevelName:` section with no rows.
    #[error("level {name:?} declares no rows")]
    EmptyLevel {
        /// Name of the empty level.
        name: String,
    },
    /// A level holding zero keepers, or more than one.
    #[error("level {name:?} must contain exactly one keeper, found {found}")]
    KeeperCount {
        /// Name of the offending level.
        name: String,
        /// Number of keeper cells encountered.
        found: usize,
    },
    /// A `CurrentLevel:` value that is not an integer.
    #[error("line {line}: `CurrentLevel:` expects an integer level index")]
    BadCurrentLevel {
        /// Line carrying the declaration.
        line: usize,
    },
    /// A second `CurrentLevel:` declaration.
    #[error("line {line}: `CurrentLevel:` declared more than once")]
    DuplicateCurrentLevel {
        /// Line carrying the second declaration.
        line: usize,
    },
    /// A `CurrentLevel:` index naming no existing level.
    #[error("`CurrentLevel: {index}` is out of range for {levels} levels")]
    CurrentLevelOutOfRange {
        /// The declared index.
        index: usize,
        /// Number of levels the map declares.
        levels: usize,
    },
}

/// A named level as stored in a map file: raw, validated rows.
///
/// The loader guarantees equal-width rows, wall-enclosed edges, known codes
/// only (normalized to lower case), and exactly one keeper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    name: String,
    rows: Vec<String>,
}

impl Level {
    /// Name declared by the `LevelName:` line.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid width: the length of the first row.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.rows
            .first()
            .map_or(0, |row| row.chars().count() as i32)
    }

    /// Grid height: the number of rows.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.rows.len() as i32
    }

    pub(crate) fn rows(&self) -> &[String] {
        &self.rows
    }
}

/// Saved live-state rows for the level a player was midway through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct InProgress {
    pub(crate) level_index: usize,
    pub(crate) rows: Vec<String>,
}

/// A parsed map set: named levels in file order plus an optional
/// in-progress snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Map {
    name: String,
    levels: Vec<Level>,
    in_progress: Option<InProgress>,
}

impl Map {
    /// Name declared by the `MapSetName:` line.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stored levels, in file order; the file order is the level index.
    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Index of the level saved in progress, if the map carries a snapshot.
    #[must_use]
    pub fn in_progress_level(&self) -> Option<usize> {
        self.in_progress
            .as_ref()
            .map(|snapshot| snapshot.level_index)
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Level>, Option<InProgress>) {
        (self.name, self.levels, self.in_progress)
    }
}

/// Parse-time accumulator for the `CurrentLevel:` section. Rows stream into
/// it only while it is the most recently opened section.
struct Snapshot {
    level_index: usize,
    rows: Vec<String>,
    active: bool,
}

/// Parses a complete map text into a [`Map`].
///
/// The input is the full file payload; reading it from wherever it lives is
/// the caller's concern. Blank lines separate sections and are ignored.
pub fn parse(text: &str) -> Result<Map, MapError> {
    let mut name: Option<String> = None;
    let mut levels: Vec<Level> = Vec::new();
    let mut snapshot: Option<Snapshot> = None;

    for (index, line) in text.lines().enumerate() {
        let number = index + 1;

        if number == 1 {
            match line.strip_prefix(MAP_SET_NAME_KEY) {
                Some(value) => name = Some(value.trim().to_owned()),
                None => return Err(MapError::MissingMapName),
            }
            continue;
        }
        if line.is_empty() {
            continue;
        }
        if let Some(value) = line.strip_prefix(LEVEL_NAME_KEY) {
            if let Some(snapshot) = snapshot.as_mut() {
                snapshot.active = false;
            }
            levels.push(Level {
                name: value.trim().to_owned(),
                rows: Vec::new(),
            });
            continue;
        }
        if let Some(value) = line.strip_prefix(CURRENT_LEVEL_KEY) {
            if snapshot.is_some() {
                return Err(MapError::DuplicateCurrentLevel { line: number });
            }
            let level_index = value
                .trim()
                .parse::<usize>()
                .map_err(|_| MapError::BadCurrentLevel { line: number })?;
            snapshot = Some(Snapshot {
                level_index,
                rows: Vec::new(),
                active: true,
            });
            continue;
        }

        let row = validate_row(line, number)?;
        let rows = match snapshot.as_mut() {
            Some(snapshot) if snapshot.active => &mut snapshot.rows,
            _ => match levels.last_mut() {
                Some(level) => &mut level.rows,
                None => return Err(MapError::RowBeforeLevel { line: number }),
            },
        };
        if let Some(first) = rows.first() {
            let expected = first.chars().count();
            let found = row.chars().count();
            if found != expected {
                return Err(MapError::RaggedRow {
                    line: number,
                    found,
                    expected,
                });
            }
        }
        rows.push(row);
    }

    let Some(name) = name else {
        return Err(MapError::MissingMapName);
    };
    if levels.is_empty() {
        return Err(MapError::NoLevels);
    }
    for level in &levels {
        validate_level(&level.name, &level.rows)?;
    }

    let in_progress = match snapshot {
        None => None,
        Some(snapshot) => {
            if snapshot.level_index >= levels.len() {
                return Err(MapError::CurrentLevelOutOfRange {
                    index: snapshot.level_index,
                    levels: levels.len(),
                });
            }
            validate_level(&levels[snapshot.level_index].name, &snapshot.rows)?;
            Some(InProgress {
                level_index: snapshot.level_index,
                rows: snapshot.rows,
            })
        }
    };

    Ok(Map {
        name,
        levels,
        in_progress,
    })
}

/// Serializes a running game back to the map text format.
///
/// Stored levels are emitted verbatim; the `CurrentLevel:` section dumps the
/// live grid row-major, x fastest, with a newline after the last column of
/// each row. This is the exact inverse of [`parse`]'s row reconstruction.
pub(crate) fn serialize_game(
    name: &str,
    levels: &[Level],
    level_index: usize,
    grid: &Grid,
) -> String {
    let mut out = String::new();
    out.push_str(MAP_SET_NAME_KEY);
    out.push_str(name);
    out.push('\n');
    for level in levels {
        out.push_str(LEVEL_NAME_KEY);
        out.push_str(&level.name);
        out.push('\n');
        for row in &level.rows {
            out.push_str(row);
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str(CURRENT_LEVEL_KEY);
    out.push_str(&level_index.to_string());
    out.push('\n');
    for (position, tile) in grid.iter() {
        out.push(encode_cell(tile.kind(), tile.occupant().map(Occupant::kind)));
        if position.x() + 1 == grid.width() {
            out.push('\n');
        }
    }
    out
}

/// Decodes one character of the code table, case-insensitively.
pub(crate) fn decode_cell(code: char) -> Option<(TileKind, Option<OccupantKind>)> {
    match code.to_ascii_lowercase() {
        WALL_CODE => Some((TileKind::Wall, None)),
        FLOOR_CODE => Some((TileKind::Floor, None)),
        CRATE_CODE => Some((TileKind::Floor, Some(OccupantKind::Crate))),
        KEEPER_CODE => Some((TileKind::Floor, Some(OccupantKind::Keeper))),
        TARGET_CODE => Some((TileKind::Target, None)),
        CRATE_ON_TARGET_CODE => Some((TileKind::Target, Some(OccupantKind::Crate))),
        KEEPER_ON_TARGET_CODE => Some((TileKind::Target, Some(OccupantKind::Keeper))),
        _ => None,
    }
}

/// Encodes one cell in the fixed lower-case write form.
fn encode_cell(kind: TileKind, occupant: Option<OccupantKind>) -> char {
    match (kind, occupant) {
        (TileKind::Wall, _) => WALL_CODE,
        (TileKind::Floor, None) => FLOOR_CODE,
        (TileKind::Floor, Some(OccupantKind::Crate)) => CRATE_CODE,
        (TileKind::Floor, Some(OccupantKind::Keeper)) => KEEPER_CODE,
        (TileKind::Target, None) => TARGET_CODE,
        (TileKind::Target, Some(OccupantKind::Crate)) => CRATE_ON_TARGET_CODE,
        (TileKind::Target, Some(OccupantKind::Keeper)) => KEEPER_ON_TARGET_CODE,
    }
}

fn validate_row(line: &str, number: usize) -> Result<String, MapError> {
    let mut row = String::with_capacity(line.len());
    for (index, code) in line.chars().enumerate() {
        if decode_cell(code).is_none() {
            return Err(MapError::UnknownCode {
                line: number,
                column: index + 1,
                found: code,
            });
        }
        row.push(code.to_ascii_lowercase());
    }
    if row.chars().next() != Some(WALL_CODE) || row.chars().last() != Some(WALL_CODE) {
        return Err(MapError::UnwalledRow { line: number });
    }
    Ok(row)
}

fn validate_level(name: &str, rows: &[String]) -> Result<(), MapError> {
    if rows.is_empty() {
        return Err(MapError::EmptyLevel {
            name: name.to_owned(),
        });
    }
    let keepers = rows
        .iter()
        .flat_map(|row| row.chars())
        .filter(|&code| code == KEEPER_CODE || code == KEEPER_ON_TARGET_CODE)
        .count();
    if keepers != 1 {
        return Err(MapError::KeeperCount {
            name: name.to_owned(),
            found: keepers,
        });
    }
    Ok(())
}
