#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the snake tester.
//!
//! This crate defines the board snapshots that every other crate consumes.
//! A [`TestCase`] bundles the game settings with an ordered list of
//! [`Frame`] values, each frame holding the [`Snake`] bodies, food and
//! hazards for one turn. Renderers derive their geometry from these snapshots
//! without mutating them, and the move evaluator turns them into requests for
//! the snake server under test.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Head or tail style applied when a snake does not declare one.
pub const DEFAULT_STYLE_KEY: &str = "default";

/// Cardinal movement directions a snake can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing row indices.
    Up,
    /// Movement toward decreasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Directions ordered clockwise starting at [`Direction::Up`].
    pub const CLOCKWISE: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Direction assumed when no movement can be inferred from the body.
    pub const DEFAULT: Direction = Direction::Up;

    /// Direction of travel when moving from `from` into `to`.
    ///
    /// Horizontal displacement takes priority over vertical displacement.
    /// Identical cells yield [`Direction::DEFAULT`].
    #[must_use]
    pub fn of_travel(from: Coordinate, to: Coordinate) -> Self {
        if to.x > from.x {
            Self::Right
        } else if to.x < from.x {
            Self::Left
        } else if to.y > from.y {
            Self::Up
        } else if to.y < from.y {
            Self::Down
        } else {
            Self::DEFAULT
        }
    }

    /// Position of the direction within [`Direction::CLOCKWISE`].
    #[must_use]
    pub const fn clockwise_index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }

    /// Reports whether the two directions form a 90 degree turn.
    ///
    /// Identical and opposite directions are not perpendicular.
    #[must_use]
    pub const fn is_perpendicular_to(self, other: Direction) -> bool {
        self.clockwise_index().abs_diff(other.clockwise_index()) % 2 == 1
    }

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Lower-case name used by the snake server protocol.
    #[must_use]
    pub const fn as_move_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Parses a move answered by a snake server.
    ///
    /// Only the exact lower-case protocol names are accepted.
    #[must_use]
    pub fn from_move_str(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Location of a single board cell; `x` is the column and `y` the row.
///
/// The origin sits in the bottom-left corner of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    x: u32,
    y: u32,
}

impl Coordinate {
    /// Creates a new board coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell, counted from the bottom.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: Coordinate) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Neighbouring cell one step toward `direction`.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Coordinate> {
        match direction {
            Direction::Up => self.y.checked_add(1).map(|y| Self::new(self.x, y)),
            Direction::Down => self.y.checked_sub(1).map(|y| Self::new(self.x, y)),
            Direction::Left => self.x.checked_sub(1).map(|x| Self::new(x, self.y)),
            Direction::Right => self.x.checked_add(1).map(|x| Self::new(x, self.y)),
        }
    }
}

/// Width and height of a board measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoardDimensions {
    width: u32,
    height: u32,
}

impl BoardDimensions {
    /// Creates a new dimensions descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns on the board.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows on the board.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the coordinate lies on the board.
    #[must_use]
    pub const fn contains(&self, cell: Coordinate) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Dense row-major index of the cell, or `None` when it is off the board.
    #[must_use]
    pub fn index_of(&self, cell: Coordinate) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.y).ok()?;
        let column = usize::try_from(cell.x).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }

    /// Total number of cells on the board.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        usize::try_from(u64::from(self.width) * u64::from(self.height)).unwrap_or(usize::MAX)
    }
}

/// Record describing how and when a snake was eliminated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Elimination {
    /// Engine-provided elimination cause, e.g. `snake-collision`.
    pub cause: String,
    /// Turn on which the snake was eliminated.
    #[serde(default)]
    pub turn: u32,
    /// Identifier of the snake responsible, empty when not applicable.
    #[serde(default)]
    pub eliminated_by: String,
}

/// Visual customisation of a snake.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnakeStyle {
    /// Fill colour as a `#rrggbb` string.
    pub color: String,
    /// Key of the head artwork.
    #[serde(default = "default_style_key")]
    pub head_type: String,
    /// Key of the tail artwork.
    #[serde(default = "default_style_key")]
    pub tail_type: String,
}

impl SnakeStyle {
    /// Creates a style with the default head and tail artwork.
    #[must_use]
    pub fn with_color<T>(color: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            color: color.into(),
            head_type: default_style_key(),
            tail_type: default_style_key(),
        }
    }
}

fn default_style_key() -> String {
    DEFAULT_STYLE_KEY.to_owned()
}

/// A snake as captured in one frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snake {
    /// Engine identifier of the snake.
    pub id: String,
    /// Display name of the snake.
    pub name: String,
    /// Server URL registered for the snake.
    #[serde(default)]
    pub url: String,
    /// Body cells, head first and tail last.
    pub body: Vec<Coordinate>,
    /// Remaining health in the range 0..=100.
    pub health: u32,
    /// Elimination record, present once the snake is out of the game.
    #[serde(rename = "death", default, skip_serializing_if = "Option::is_none")]
    pub elimination: Option<Elimination>,
    /// Colour and artwork applied when drawing the snake.
    #[serde(flatten)]
    pub style: SnakeStyle,
    /// Response latency reported by the engine, as text.
    #[serde(default)]
    pub latency: String,
    /// Last shout sent by the snake.
    #[serde(default)]
    pub shout: String,
    /// Squad the snake belongs to.
    #[serde(default)]
    pub squad: String,
    /// Author of the snake.
    #[serde(default)]
    pub author: String,
}

impl Snake {
    /// Creates a living snake with full health and empty metadata.
    #[must_use]
    pub fn new<I, N>(id: I, name: N, body: Vec<Coordinate>, style: SnakeStyle) -> Self
    where
        I: Into<String>,
        N: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            url: String::new(),
            body,
            health: 100,
            elimination: None,
            style,
            latency: String::new(),
            shout: String::new(),
            squad: String::new(),
            author: String::new(),
        }
    }

    /// Marks the snake as eliminated with the provided record.
    #[must_use]
    pub fn eliminated(mut self, elimination: Elimination) -> Self {
        self.elimination = Some(elimination);
        self
    }

    /// First body cell, if the body is not empty.
    #[must_use]
    pub fn head(&self) -> Option<Coordinate> {
        self.body.first().copied()
    }

    /// Last body cell, if the body is not empty.
    #[must_use]
    pub fn tail(&self) -> Option<Coordinate> {
        self.body.last().copied()
    }

    /// Number of body entries, stacked ones included.
    #[must_use]
    pub fn length(&self) -> usize {
        self.body.len()
    }

    /// Reports whether the snake has been eliminated.
    #[must_use]
    pub const fn is_eliminated(&self) -> bool {
        self.elimination.is_some()
    }
}

/// Immutable board snapshot for a single turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Turn number of the snapshot.
    pub turn: u32,
    /// Snakes present on the board, eliminated ones included.
    #[serde(default)]
    pub snakes: Vec<Snake>,
    /// Cells holding food.
    #[serde(default)]
    pub food: Vec<Coordinate>,
    /// Cells holding hazards, without duplicates.
    #[serde(default, deserialize_with = "deserialize_unique_coordinates")]
    pub hazards: Vec<Coordinate>,
}

impl Frame {
    /// Creates a frame, dropping repeated hazard cells.
    #[must_use]
    pub fn new(
        turn: u32,
        snakes: Vec<Snake>,
        food: Vec<Coordinate>,
        hazards: Vec<Coordinate>,
    ) -> Self {
        Self {
            turn,
            snakes,
            food,
            hazards: unique_coordinates(hazards),
        }
    }
}

fn unique_coordinates(cells: Vec<Coordinate>) -> Vec<Coordinate> {
    let mut seen = HashSet::with_capacity(cells.len());
    cells.into_iter().filter(|cell| seen.insert(*cell)).collect()
}

fn deserialize_unique_coordinates<'de, D>(deserializer: D) -> Result<Vec<Coordinate>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Coordinate>::deserialize(deserializer).map(unique_coordinates)
}

/// Ruleset advertised to the snake server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Ruleset name, e.g. `standard`.
    pub name: String,
    /// Ruleset version string.
    pub version: String,
}

/// Game-level settings shared by every frame of a test.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    /// Engine identifier of the game the frames were taken from.
    pub id: String,
    /// Ruleset the game was played with.
    pub ruleset: Ruleset,
    /// Move timeout in milliseconds.
    pub timeout: u32,
    /// Board width in cells.
    pub width: u32,
    /// Board height in cells.
    pub height: u32,
}

impl GameInfo {
    /// Board dimensions declared by the game.
    #[must_use]
    pub const fn dimensions(&self) -> BoardDimensions {
        BoardDimensions::new(self.width, self.height)
    }
}

/// A recorded position together with the moves considered correct.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// Unique identifier of the test.
    pub id: String,
    /// Free-form description shown next to results.
    #[serde(default)]
    pub description: String,
    /// Creation time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: u64,
    /// Game settings.
    pub game: GameInfo,
    /// Frames ordered by increasing turn.
    pub frames: Vec<Frame>,
    /// Turn of the frame sent to the snake server.
    pub frame_to_test: u32,
    /// Index of the tested snake within the tested frame.
    pub snake_to_test: usize,
    /// Moves accepted as correct.
    pub expected_result: Vec<Direction>,
}

/// Result of evaluating a [`TestCase`] against a snake server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TestOutcome {
    /// The server answered one of the expected moves.
    Passed {
        /// Move answered by the server.
        #[serde(rename = "move")]
        direction: Direction,
    },
    /// The test could not be run or the answer was not expected.
    Failed {
        /// Move answered by the server, when one was received.
        #[serde(rename = "move", default, skip_serializing_if = "Option::is_none")]
        direction: Option<Direction>,
        /// Human-readable reason for the failure.
        #[serde(rename = "msg")]
        message: String,
    },
}

impl TestOutcome {
    /// Creates a failed outcome without an answered move.
    #[must_use]
    pub fn failed<T>(message: T) -> Self
    where
        T: Into<String>,
    {
        Self::Failed {
            direction: None,
            message: message.into(),
        }
    }

    /// Reports whether the outcome is a pass.
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }

    /// Move answered by the server, if any.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        match self {
            Self::Passed { direction } => Some(*direction),
            Self::Failed { direction, .. } => *direction,
        }
    }

    /// Failure message, `None` for passed outcomes.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Passed { .. } => None,
            Self::Failed { message, .. } => Some(message),
        }
    }
}
