#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Test suites exported by the snake tester, loaded and validated.
//!
//! The export format is `{ "version": "1", "tests": [...] }`. Loading checks
//! the invariants the rendering engine and the evaluator rely on, so that a
//! corrupt export is rejected up front instead of failing mid-run.

use std::{collections::HashSet, fs, path::Path};

use serde::{Deserialize, Serialize};
use snake_tester_core::{Coordinate, TestCase};

/// Export format version understood by the loader.
pub const SUPPORTED_VERSION: &str = "1";

/// Ordered collection of validated test cases.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestSuite {
    tests: Vec<TestCase>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ExportedData {
    version: String,
    tests: Vec<TestCase>,
}

impl TestSuite {
    /// Creates a suite from already constructed tests after validating them.
    pub fn new(tests: Vec<TestCase>) -> Result<Self, SuiteError> {
        let mut seen = HashSet::with_capacity(tests.len());
        for test in &tests {
            if !seen.insert(test.id.as_str()) {
                return Err(SuiteError::DuplicateTestId(test.id.clone()));
            }
            validate(test).map_err(|defect| SuiteError::InvalidTest {
                id: test.id.clone(),
                defect,
            })?;
        }
        Ok(Self { tests })
    }

    /// Parses an exported suite from its JSON text.
    pub fn from_json_str(contents: &str) -> Result<Self, SuiteError> {
        let exported: ExportedData = serde_json::from_str(contents)?;
        if exported.version != SUPPORTED_VERSION {
            return Err(SuiteError::UnsupportedVersion(exported.version));
        }
        Self::new(exported.tests)
    }

    /// Reads and parses an exported suite from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SuiteError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| SuiteError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Serialises the suite back into the export format.
    pub fn to_json_string(&self) -> Result<String, SuiteError> {
        let exported = ExportedData {
            version: SUPPORTED_VERSION.to_owned(),
            tests: self.tests.clone(),
        };
        Ok(serde_json::to_string_pretty(&exported)?)
    }

    /// Iterator over the tests in export order.
    pub fn iter(&self) -> impl Iterator<Item = &TestCase> {
        self.tests.iter()
    }

    /// Number of tests in the suite.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Reports whether the suite holds no tests.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

fn validate(test: &TestCase) -> Result<(), TestDefect> {
    let board = test.game.dimensions();
    if board.width() == 0 || board.height() == 0 {
        return Err(TestDefect::EmptyBoard {
            width: board.width(),
            height: board.height(),
        });
    }

    let mut previous_turn: Option<u32> = None;
    for frame in &test.frames {
        if let Some(previous) = previous_turn {
            if frame.turn <= previous {
                return Err(TestDefect::TurnsNotIncreasing {
                    previous,
                    turn: frame.turn,
                });
            }
        }
        previous_turn = Some(frame.turn);

        for snake in &frame.snakes {
            if snake.body.is_empty() {
                return Err(TestDefect::EmptyBody {
                    turn: frame.turn,
                    snake: snake.id.clone(),
                });
            }
            // Neighbours either touch or share a cell while stacked.
            if let Some(pair) = snake
                .body
                .windows(2)
                .find(|pair| pair[0].manhattan_distance(pair[1]) > 1)
            {
                return Err(TestDefect::NonAdjacentBody {
                    turn: frame.turn,
                    snake: snake.id.clone(),
                    from: pair[0],
                    to: pair[1],
                });
            }
        }

        let cells = frame
            .snakes
            .iter()
            .flat_map(|snake| snake.body.iter())
            .chain(frame.food.iter())
            .chain(frame.hazards.iter());
        for &cell in cells {
            if !board.contains(cell) {
                return Err(TestDefect::OutOfBounds {
                    turn: frame.turn,
                    cell,
                });
            }
        }
    }

    Ok(())
}

/// Errors raised while loading a suite.
#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    /// The export declares a version this loader does not understand.
    #[error("unsupported suite version `{0}`; expected `1`")]
    UnsupportedVersion(String),
    /// The JSON text could not be parsed into the export format.
    #[error("could not parse suite: {0}")]
    Parse(#[from] serde_json::Error),
    /// The suite file could not be read.
    #[error("could not read suite at {path}")]
    Io {
        /// Path that failed to load.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Two tests share the same identifier.
    #[error("test id `{0}` appears more than once")]
    DuplicateTestId(String),
    /// A test violates a board invariant.
    #[error("test `{id}` is invalid: {defect}")]
    InvalidTest {
        /// Identifier of the offending test.
        id: String,
        /// Broken invariant.
        defect: TestDefect,
    },
}

/// Board invariants a test case can violate.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TestDefect {
    /// The game declares a board without cells.
    #[error("board {width}x{height} has no cells")]
    EmptyBoard {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
    /// A frame does not follow its predecessor in time.
    #[error("frame turn {turn} does not follow turn {previous}")]
    TurnsNotIncreasing {
        /// Turn of the preceding frame.
        previous: u32,
        /// Turn of the offending frame.
        turn: u32,
    },
    /// A snake has no body cells.
    #[error("snake `{snake}` has an empty body on turn {turn}")]
    EmptyBody {
        /// Turn of the offending frame.
        turn: u32,
        /// Identifier of the snake.
        snake: String,
    },
    /// Two consecutive body cells are neither identical nor orthogonal neighbours.
    #[error(
        "snake `{snake}` jumps from ({}, {}) to ({}, {}) on turn {turn}",
        .from.x(), .from.y(), .to.x(), .to.y()
    )]
    NonAdjacentBody {
        /// Turn of the offending frame.
        turn: u32,
        /// Identifier of the snake.
        snake: String,
        /// Head-ward cell of the gap.
        from: Coordinate,
        /// Tail-ward cell of the gap.
        to: Coordinate,
    },
    /// A cell lies outside the board.
    #[error("cell ({}, {}) on turn {turn} lies outside the board", .cell.x(), .cell.y())]
    OutOfBounds {
        /// Turn of the offending frame.
        turn: u32,
        /// Offending cell.
        cell: Coordinate,
    },
}

/// Read-only lookups over tests.
pub mod query {
    use super::TestSuite;
    use snake_tester_core::{Frame, Snake, TestCase};

    /// Finds a test by identifier.
    #[must_use]
    pub fn test_by_id<'a>(suite: &'a TestSuite, id: &str) -> Option<&'a TestCase> {
        suite.tests.iter().find(|test| test.id == id)
    }

    /// Finds the frame captured on the provided turn.
    #[must_use]
    pub fn frame_at_turn(test: &TestCase, turn: u32) -> Option<&Frame> {
        test.frames.iter().find(|frame| frame.turn == turn)
    }

    /// Frame whose position is sent to the snake server.
    #[must_use]
    pub fn tested_frame(test: &TestCase) -> Option<&Frame> {
        frame_at_turn(test, test.frame_to_test)
    }

    /// Snake under test within the provided frame.
    #[must_use]
    pub fn tested_snake<'a>(test: &TestCase, frame: &'a Frame) -> Option<&'a Snake> {
        frame.snakes.get(test.snake_to_test)
    }
}
