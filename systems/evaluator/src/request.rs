//! Payloads exchanged with a snake server.

use serde::{Deserialize, Serialize};
use snake_tester_core::{Coordinate, Ruleset, Snake, TestCase};
use snake_tester_suite::query;

use crate::EvaluationError;

/// Body posted to the `/move` endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MoveRequest {
    /// Board state of the tested turn.
    pub board: BoardRequest,
    /// Game settings.
    pub game: GameRequest,
    /// Turn number of the tested frame.
    pub turn: u32,
    /// The snake asked to move.
    pub you: SnakeRequest,
}

/// Board section of a [`MoveRequest`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoardRequest {
    /// Cells holding food.
    pub food: Vec<Coordinate>,
    /// Snakes still in the game.
    pub snakes: Vec<SnakeRequest>,
    /// Board width in cells.
    pub width: u32,
    /// Board height in cells.
    pub height: u32,
    /// Cells holding hazards.
    pub hazards: Vec<Coordinate>,
}

/// Game section of a [`MoveRequest`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameRequest {
    /// Engine identifier of the game.
    pub id: String,
    /// Ruleset the game is played with.
    pub ruleset: Ruleset,
    /// Move timeout in milliseconds.
    pub timeout: u32,
}

/// Snake as seen by the snake server.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SnakeRequest {
    /// Engine identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Remaining health.
    pub health: u32,
    /// Body cells, head first.
    pub body: Vec<Coordinate>,
    /// Last response latency in milliseconds.
    pub latency: u64,
    /// First body cell.
    pub head: Coordinate,
    /// Number of body entries.
    pub length: usize,
    /// Last shout.
    pub shout: String,
    /// Squad name.
    pub squad: String,
}

impl SnakeRequest {
    /// Converts a recorded snake; its body must not be empty.
    pub fn from_snake(snake: &Snake) -> Result<Self, EvaluationError> {
        let head = snake.head().ok_or_else(|| EvaluationError::EmptyBody {
            snake: snake.id.clone(),
        })?;

        Ok(Self {
            id: snake.id.clone(),
            name: snake.name.clone(),
            health: snake.health,
            body: snake.body.clone(),
            latency: parse_latency(&snake.latency),
            head,
            length: snake.length(),
            shout: snake.shout.clone(),
            squad: snake.squad.clone(),
        })
    }
}

/// Answer returned by the `/move` endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MoveResponse {
    /// Chosen move in lower case, e.g. `up`.
    #[serde(rename = "move")]
    pub direction: String,
    /// Optional message shouted by the snake.
    #[serde(default)]
    pub shout: Option<String>,
}

/// Builds the request asking the tested snake for its move.
///
/// Eliminated snakes are left off the board, and an eliminated tested snake
/// is reported as [`EvaluationError::Eliminated`] so no request is sent.
pub fn build_request(test: &TestCase) -> Result<MoveRequest, EvaluationError> {
    let frame = query::tested_frame(test).ok_or(EvaluationError::FrameNotFound {
        turn: test.frame_to_test,
    })?;
    let tested = query::tested_snake(test, frame).ok_or(EvaluationError::SnakeNotFound {
        index: test.snake_to_test,
    })?;
    if tested.is_eliminated() {
        return Err(EvaluationError::Eliminated {
            snake: tested.id.clone(),
        });
    }

    let snakes = frame
        .snakes
        .iter()
        .filter(|snake| !snake.is_eliminated())
        .map(SnakeRequest::from_snake)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MoveRequest {
        board: BoardRequest {
            food: frame.food.clone(),
            snakes,
            width: test.game.width,
            height: test.game.height,
            hazards: frame.hazards.clone(),
        },
        game: GameRequest {
            id: test.game.id.clone(),
            ruleset: test.game.ruleset.clone(),
            timeout: test.game.timeout,
        },
        turn: frame.turn,
        you: SnakeRequest::from_snake(tested)?,
    })
}

/// Engine latencies are recorded as text; anything non-numeric counts as 0.
fn parse_latency(latency: &str) -> u64 {
    latency.trim().parse().unwrap_or(0)
}
