#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Move evaluator that replays recorded positions against a snake server.
//!
//! Each test sends exactly one `POST <server>/move` request and compares the
//! answered move with the expected set. Evaluation never fails: missing data
//! and server misbehaviour become [`TestOutcome::Failed`] values.

use std::time::Duration;

use futures_util::future::join_all;
use snake_tester_core::{Direction, TestCase, TestOutcome};
use tracing::{debug, info, warn};

pub mod request;

pub use request::{build_request, MoveRequest, MoveResponse, SnakeRequest};

/// Failure message reported when the server misbehaves.
pub const INVALID_MOVE: &str = "invalid move";

/// Failure message reported when the answered move is not expected.
pub const INCORRECT_MOVE: &str = "incorrect move";

/// Request timeout used when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(1000);

/// Where and how to reach the snake server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluatorConfig {
    server: String,
    request_timeout: Duration,
}

impl EvaluatorConfig {
    /// Configuration for the server at the provided base URL.
    #[must_use]
    pub fn new<T>(server: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            server: server.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Replaces the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Time allowed for a single request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// URL of the move endpoint.
    #[must_use]
    pub fn move_url(&self) -> String {
        format!("{}/move", self.server.trim_end_matches('/'))
    }
}

/// Evaluates test cases against one snake server.
#[derive(Clone, Debug)]
pub struct Evaluator {
    client: reqwest::Client,
    move_url: String,
}

impl Evaluator {
    /// Creates an evaluator with its own HTTP client.
    pub fn new(config: &EvaluatorConfig) -> Result<Self, EvaluationError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(EvaluationError::Client)?;

        Ok(Self {
            client,
            move_url: config.move_url(),
        })
    }

    /// URL requests are posted to.
    #[must_use]
    pub fn move_url(&self) -> &str {
        &self.move_url
    }

    /// Runs a single test.
    pub async fn evaluate(&self, test: &TestCase) -> TestOutcome {
        let request = match build_request(test) {
            Ok(request) => request,
            Err(error) => {
                debug!(test = %test.id, %error, "test cannot be sent");
                return TestOutcome::failed(error.outcome_message());
            }
        };

        debug!(test = %test.id, url = %self.move_url, turn = request.turn, "requesting move");
        match self.request_move(&request).await {
            Ok(direction) => classify(direction, &test.expected_result),
            Err(error) => {
                warn!(test = %test.id, %error, "move request failed");
                TestOutcome::failed(error.outcome_message())
            }
        }
    }

    /// Runs every test concurrently; outcomes keep the input order.
    pub async fn evaluate_all<'a, I>(&self, tests: I) -> Vec<TestOutcome>
    where
        I: IntoIterator<Item = &'a TestCase>,
    {
        let tests: Vec<&TestCase> = tests.into_iter().collect();
        let outcomes = join_all(tests.iter().map(|test| self.evaluate(test))).await;

        for (test, outcome) in tests.iter().zip(&outcomes) {
            match outcome {
                TestOutcome::Passed { direction } => {
                    info!(test = %test.id, answer = ?direction, "passed");
                }
                TestOutcome::Failed { direction, message } => {
                    info!(test = %test.id, answer = ?direction, %message, "failed");
                }
            }
        }
        outcomes
    }

    /// Posts the request and decodes the answered direction.
    pub async fn request_move(&self, request: &MoveRequest) -> Result<Direction, EvaluationError> {
        let response = self
            .client
            .post(&self.move_url)
            .json(request)
            .send()
            .await
            .map_err(EvaluationError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EvaluationError::Status(status.as_u16()));
        }

        let answer: MoveResponse = response.json().await.map_err(EvaluationError::Transport)?;
        debug!(answer = %answer.direction, shout = ?answer.shout, "move answered");
        Direction::from_move_str(&answer.direction)
            .ok_or(EvaluationError::UnknownMove(answer.direction))
    }
}

/// Compares an answered move with the accepted ones.
#[must_use]
pub fn classify(answer: Direction, expected: &[Direction]) -> TestOutcome {
    if expected.contains(&answer) {
        TestOutcome::Passed { direction: answer }
    } else {
        TestOutcome::Failed {
            direction: Some(answer),
            message: INCORRECT_MOVE.to_owned(),
        }
    }
}

/// Reasons a test could not produce an answered move.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    /// No frame was recorded on the tested turn.
    #[error("frame to test not found")]
    FrameNotFound {
        /// Tested turn.
        turn: u32,
    },
    /// The tested frame has no snake at the tested index.
    #[error("snake to test not found")]
    SnakeNotFound {
        /// Tested index.
        index: usize,
    },
    /// The tested snake is already out of the game.
    #[error("Omae Wa Mou Shindeiru")]
    Eliminated {
        /// Identifier of the tested snake.
        snake: String,
    },
    /// A snake on the tested frame has no body cells.
    #[error("snake `{snake}` has an empty body")]
    EmptyBody {
        /// Identifier of the snake.
        snake: String,
    },
    /// The HTTP client could not be constructed.
    #[error("could not build http client: {0}")]
    Client(#[source] reqwest::Error),
    /// The request failed or the body could not be decoded.
    #[error("move request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("server answered with status {0}")]
    Status(u16),
    /// The server answered a move outside the protocol.
    #[error("server answered unknown move `{0}`")]
    UnknownMove(String),
}

impl EvaluationError {
    /// Message recorded in the failed outcome.
    #[must_use]
    pub fn outcome_message(&self) -> String {
        match self {
            Self::FrameNotFound { .. }
            | Self::SnakeNotFound { .. }
            | Self::Eliminated { .. }
            | Self::EmptyBody { .. } => self.to_string(),
            Self::Client(_) | Self::Transport(_) | Self::Status(_) | Self::UnknownMove(_) => {
                INVALID_MOVE.to_owned()
            }
        }
    }
}
