use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use snake_tester_core::{
    Coordinate, Direction, Elimination, Frame, GameInfo, Ruleset, Snake, SnakeStyle, TestCase,
    TestOutcome,
};
use snake_tester_system_evaluator::{Evaluator, EvaluatorConfig};

/// Snake server stand-in answering every move request the same way.
struct FakeServer {
    status: StatusCode,
    answer: Value,
    hits: AtomicUsize,
    last_request: Mutex<Option<Value>>,
}

async fn answer_move(
    State(server): State<Arc<FakeServer>>,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let _ = server.hits.fetch_add(1, Ordering::SeqCst);
    *server.last_request.lock().expect("request lock") = Some(request);
    (server.status, Json(server.answer.clone()))
}

async fn spawn_server(status: StatusCode, answer: Value) -> (Arc<FakeServer>, SocketAddr) {
    let server = Arc::new(FakeServer {
        status,
        answer,
        hits: AtomicUsize::new(0),
        last_request: Mutex::new(None),
    });
    let app = Router::new()
        .route("/move", post(answer_move))
        .with_state(Arc::clone(&server));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let address = listener.local_addr().expect("listener address");
    let _server_task = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake server runs");
    });
    (server, address)
}

fn evaluator(address: SocketAddr) -> Evaluator {
    let config = EvaluatorConfig::new(format!("http://{address}/"))
        .with_request_timeout(Duration::from_secs(5));
    Evaluator::new(&config).expect("client builds")
}

fn snake(id: &str, body: &[(u32, u32)]) -> Snake {
    Snake::new(
        id,
        id,
        body.iter().map(|&(x, y)| Coordinate::new(x, y)).collect(),
        SnakeStyle::with_color("#3366ff"),
    )
}

fn test_case(id: &str, snakes: Vec<Snake>, snake_to_test: usize) -> TestCase {
    TestCase {
        id: id.to_owned(),
        description: String::new(),
        timestamp: 0,
        game: GameInfo {
            id: "game-1".to_owned(),
            ruleset: Ruleset {
                name: "standard".to_owned(),
                version: "v1.2.3".to_owned(),
            },
            timeout: 500,
            width: 11,
            height: 11,
        },
        frames: vec![
            Frame::new(4, snakes.clone(), Vec::new(), Vec::new()),
            Frame::new(5, snakes, vec![Coordinate::new(2, 2)], Vec::new()),
        ],
        frame_to_test: 5,
        snake_to_test,
        expected_result: vec![Direction::Up, Direction::Down],
    }
}

fn living_test(id: &str) -> TestCase {
    test_case(
        id,
        vec![snake("a", &[(1, 1), (1, 0)]), snake("b", &[(5, 5), (5, 4)])],
        1,
    )
}

#[tokio::test]
async fn eliminated_snake_fails_without_a_request() {
    let (server, address) = spawn_server(StatusCode::OK, json!({ "move": "up" })).await;
    let dead = snake("b", &[(5, 5), (5, 4)]).eliminated(Elimination {
        cause: "head-collision".to_owned(),
        turn: 5,
        eliminated_by: "a".to_owned(),
    });
    let test = test_case("dead", vec![snake("a", &[(1, 1), (1, 0)]), dead], 1);

    let outcome = evaluator(address).evaluate(&test).await;

    assert_eq!(outcome, TestOutcome::failed("Omae Wa Mou Shindeiru"));
    assert_eq!(server.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn expected_answer_passes() {
    let (server, address) = spawn_server(StatusCode::OK, json!({ "move": "up" })).await;

    let outcome = evaluator(address).evaluate(&living_test("up")).await;

    assert_eq!(
        outcome,
        TestOutcome::Passed {
            direction: Direction::Up
        }
    );
    assert_eq!(server.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unexpected_answer_fails_with_the_move() {
    let (_server, address) = spawn_server(StatusCode::OK, json!({ "move": "left" })).await;

    let outcome = evaluator(address).evaluate(&living_test("left")).await;

    assert_eq!(
        outcome,
        TestOutcome::Failed {
            direction: Some(Direction::Left),
            message: "incorrect move".to_owned()
        }
    );
}

#[tokio::test]
async fn request_carries_the_tested_position() {
    let (server, address) = spawn_server(StatusCode::OK, json!({ "move": "down" })).await;

    let outcome = evaluator(address).evaluate(&living_test("payload")).await;
    assert!(outcome.is_passed());

    let request = server
        .last_request
        .lock()
        .expect("request lock")
        .clone()
        .expect("server saw a request");
    assert_eq!(request["turn"], 5);
    assert_eq!(request["you"]["id"], "b");
    assert_eq!(request["you"]["length"], 2);
    assert_eq!(request["board"]["food"], json!([{ "x": 2, "y": 2 }]));
    assert_eq!(request["board"]["snakes"].as_array().map(Vec::len), Some(2));
    assert_eq!(request["game"]["ruleset"]["version"], "v1.2.3");
}

#[tokio::test]
async fn unknown_moves_and_server_errors_are_invalid() {
    let (_server, address) = spawn_server(StatusCode::OK, json!({ "move": "sideways" })).await;
    let outcome = evaluator(address).evaluate(&living_test("sideways")).await;
    assert_eq!(outcome, TestOutcome::failed("invalid move"));

    let (_server, address) = spawn_server(StatusCode::OK, json!({ "shout": "hi" })).await;
    let outcome = evaluator(address).evaluate(&living_test("no-move")).await;
    assert_eq!(outcome, TestOutcome::failed("invalid move"));

    let (_server, address) =
        spawn_server(StatusCode::INTERNAL_SERVER_ERROR, json!({ "move": "up" })).await;
    let outcome = evaluator(address).evaluate(&living_test("status")).await;
    assert_eq!(outcome, TestOutcome::failed("invalid move"));
}

#[tokio::test]
async fn unreachable_server_is_invalid() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let address = listener.local_addr().expect("listener address");
    drop(listener);

    let outcome = evaluator(address).evaluate(&living_test("closed")).await;

    assert_eq!(outcome, TestOutcome::failed("invalid move"));
}

#[tokio::test]
async fn missing_positions_fail_without_a_request() {
    let (server, address) = spawn_server(StatusCode::OK, json!({ "move": "up" })).await;
    let evaluator = evaluator(address);

    let mut missing_frame = living_test("missing-frame");
    missing_frame.frame_to_test = 6;
    let mut missing_snake = living_test("missing-snake");
    missing_snake.snake_to_test = 2;

    assert_eq!(
        evaluator.evaluate(&missing_frame).await,
        TestOutcome::failed("frame to test not found")
    );
    assert_eq!(
        evaluator.evaluate(&missing_snake).await,
        TestOutcome::failed("snake to test not found")
    );
    assert_eq!(server.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn batch_outcomes_keep_input_order() {
    let (server, address) = spawn_server(StatusCode::OK, json!({ "move": "up" })).await;
    let mut unreachable = living_test("second");
    unreachable.frame_to_test = 1;
    let tests = vec![living_test("first"), unreachable, living_test("third")];

    let outcomes = evaluator(address).evaluate_all(&tests).await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_passed());
    assert_eq!(outcomes[1].message(), Some("frame to test not found"));
    assert!(outcomes[2].is_passed());
    assert_eq!(server.hits.load(Ordering::SeqCst), 2);
}
