use glam::Vec2;
use snake_tester_core::{BoardDimensions, Coordinate, Elimination, Frame, Snake, SnakeStyle};
use snake_tester_rendering::{
    ArtworkHandle, ArtworkKind, ArtworkResolver, ArtworkTransform, Color, Palette, Primitive,
};
use snake_tester_system_board_render::{
    render, BoardScene, RenderError, OVERLAPPED_OPACITY, SHADED_OPACITY,
};
use snake_tester_system_layering::{DIMMED_OPACITY, ELIMINATED_OPACITY, HIDDEN_OPACITY};

struct KnownKeys;

impl ArtworkResolver for KnownKeys {
    fn resolve(&self, kind: ArtworkKind, key: &str) -> ArtworkHandle {
        if key == "bendr" {
            ArtworkHandle::new(kind, key)
        } else {
            ArtworkHandle::new(kind, "default")
        }
    }
}

const BOARD: BoardDimensions = BoardDimensions::new(11, 11);

fn snake(id: &str, color: &str, body: &[(u32, u32)]) -> Snake {
    Snake::new(
        id,
        id,
        body.iter().map(|&(x, y)| Coordinate::new(x, y)).collect(),
        SnakeStyle::with_color(color),
    )
}

fn frame(snakes: Vec<Snake>) -> Frame {
    Frame::new(1, snakes, Vec::new(), Vec::new())
}

fn draw(frame: &Frame, highlighted: Option<&str>) -> BoardScene {
    render(frame, BOARD, highlighted, &Palette::default(), &KnownKeys).expect("frame renders")
}

fn assert_close(actual: Vec2, expected: Vec2) {
    assert!(
        actual.abs_diff_eq(expected, 1e-4),
        "expected {expected:?}, got {actual:?}"
    );
}

#[test]
fn vertical_snake_draws_tail_body_filler_and_head() {
    let scene = draw(&frame(vec![snake("s", "#3366ff", &[(5, 5), (5, 4), (5, 3)])]), None);
    let layer = &scene.snakes()[0];
    let primitives = layer.primitives();

    assert_eq!(primitives.len(), 4);
    match &primitives[0] {
        Primitive::Artwork {
            handle,
            rect,
            transform,
            ..
        } => {
            assert_eq!(handle.kind(), ArtworkKind::Tail);
            assert_eq!(*transform, ArtworkTransform::MirrorRotate(90.0));
            assert_close(rect.position, Vec2::new(124.0, 171.8));
        }
        other => panic!("expected tail artwork, got {other:?}"),
    }
    match &primitives[1] {
        Primitive::Rect { rect, .. } => {
            assert_close(rect.position, Vec2::new(124.0, 144.0));
            assert_close(rect.size, Vec2::new(20.0, 28.0));
        }
        other => panic!("expected straight body, got {other:?}"),
    }
    match &primitives[3] {
        Primitive::Rect { rect, .. } => {
            assert_close(rect.position, Vec2::new(124.0, 143.8));
            assert_close(rect.size, Vec2::new(20.0, 4.4));
        }
        other => panic!("expected head filler over the head, got {other:?}"),
    }
    match &primitives[2] {
        Primitive::Artwork {
            handle,
            rect,
            transform,
            fill,
            opacity,
        } => {
            assert_eq!(handle.kind(), ArtworkKind::Head);
            assert_eq!(handle.key(), "default");
            assert_eq!(*transform, ArtworkTransform::Rotate(-90.0));
            assert_close(rect.position, Vec2::new(124.0, 124.2));
            assert_eq!(*fill, Color::from_rgb_u8(0x33, 0x66, 0xff));
            assert_eq!(*opacity, 1.0);
        }
        other => panic!("expected head artwork, got {other:?}"),
    }
}

#[test]
fn turning_snake_draws_a_rotated_corner() {
    let scene = draw(&frame(vec![snake("s", "#3366ff", &[(2, 2), (2, 1), (3, 1)])]), None);
    let corner = scene.snakes()[0]
        .primitives()
        .iter()
        .find_map(|primitive| match primitive {
            Primitive::Corner { rect, rotation, .. } => Some((*rect, *rotation)),
            _ => None,
        })
        .expect("middle segment is a corner");

    assert_eq!(corner.1, 180.0);
    assert_close(corner.0.position, Vec2::new(48.0, 216.0));
    assert_close(corner.0.size, Vec2::splat(28.0));
}

#[test]
fn second_snake_on_a_shared_cell_is_shaded() {
    let scene = draw(
        &frame(vec![
            snake("x", "#3366ff", &[(4, 4), (3, 4)]),
            snake("y", "#22aa88", &[(4, 5), (4, 4), (4, 3)]),
        ]),
        None,
    );
    let palette = Palette::default();
    let [x, y] = scene.snakes() else {
        panic!("expected two snake layers");
    };

    assert_eq!(x.id(), "x");
    assert!(x
        .primitives()
        .iter()
        .all(|primitive| primitive.fill() != palette.overlap && primitive.opacity() == 1.0));

    let shaded: Vec<_> = y
        .primitives()
        .iter()
        .filter(|primitive| primitive.fill() == palette.overlap)
        .collect();
    assert_eq!(shaded.len(), 1);
    assert_eq!(shaded[0].opacity(), SHADED_OPACITY);
    match shaded[0] {
        Primitive::Rect { rect, .. } => assert_close(rect.position, Vec2::new(100.0, 144.0)),
        other => panic!("expected straight body, got {other:?}"),
    }
}

#[test]
fn freshly_spawned_snake_draws_only_its_head() {
    let scene = draw(&frame(vec![snake("s", "#3366ff", &[(1, 1), (1, 1), (1, 1)])]), None);
    let primitives = scene.snakes()[0].primitives();

    assert_eq!(primitives.len(), 1);
    assert!(matches!(
        &primitives[0],
        Primitive::Artwork { handle, .. } if handle.kind() == ArtworkKind::Head
    ));
}

#[test]
fn stacked_growth_draws_the_tail_once() {
    let scene = draw(&frame(vec![snake("s", "#3366ff", &[(3, 4), (3, 3), (3, 2), (3, 2)])]), None);
    let primitives = scene.snakes()[0].primitives();

    assert_eq!(primitives.len(), 4);
    assert!(primitives.iter().all(|primitive| primitive.opacity() == 1.0));
}

#[test]
fn segment_stacked_on_the_head_is_drawn_faintly() {
    let scene = draw(&frame(vec![snake("s", "#3366ff", &[(5, 5), (5, 5), (5, 4)])]), None);
    let primitives = scene.snakes()[0].primitives();

    let opacities: Vec<f32> = primitives.iter().map(Primitive::opacity).collect();
    assert_eq!(opacities, vec![1.0, OVERLAPPED_OPACITY, 1.0, 1.0]);
    match &primitives[1] {
        Primitive::Rect { rect, fill, .. } => {
            assert_close(rect.position, Vec2::new(124.0, 120.0));
            assert_eq!(*fill, Color::from_rgb_u8(0x33, 0x66, 0xff));
        }
        other => panic!("expected straight body, got {other:?}"),
    }
}

#[test]
fn faint_segments_are_dimmed_further_under_a_highlight() {
    let frame = frame(vec![
        snake("s", "#3366ff", &[(5, 5), (5, 5), (5, 4)]),
        snake("other", "#22aa88", &[(1, 1), (1, 0)]),
    ]);

    let scene = draw(&frame, Some("other"));
    let primitives = scene.primitives();
    let faint = &primitives[scene.cells().len() + 1];

    assert!(matches!(faint, Primitive::Rect { .. }));
    assert!((faint.opacity() - OVERLAPPED_OPACITY * DIMMED_OPACITY).abs() < 1e-6);
}

#[test]
fn eliminated_snakes_fade_and_highlight_hides_them() {
    let dead = snake("dead", "#999999", &[(0, 1), (0, 0)]).eliminated(Elimination {
        cause: "wall-collision".to_owned(),
        turn: 1,
        eliminated_by: String::new(),
    });
    let frame = frame(vec![snake("alive", "#3366ff", &[(6, 6), (6, 5)]), dead]);

    let plain = draw(&frame, None);
    assert_eq!(plain.snakes()[0].id(), "dead");
    assert_eq!(plain.snakes()[0].opacity(), ELIMINATED_OPACITY);

    let highlighted = draw(&frame, Some("alive"));
    assert_eq!(highlighted.snakes()[0].opacity(), HIDDEN_OPACITY);
    assert_eq!(highlighted.snakes()[1].id(), "alive");
    assert_eq!(highlighted.snakes()[1].opacity(), 1.0);
}

#[test]
fn board_layers_are_painted_in_order() {
    let mut frame = frame(vec![snake("s", "#3366ff", &[(5, 5), (5, 4)])]);
    frame.food.push(Coordinate::new(0, 0));
    frame.hazards.push(Coordinate::new(10, 10));

    let scene = draw(&frame, None);
    let primitives = scene.primitives();

    assert_eq!(scene.cells().len(), 121);
    assert_eq!(scene.food().len(), 1);
    assert_eq!(scene.hazards().len(), 1);
    assert_eq!(primitives.len(), 121 + 3 + 1 + 1);
    match &primitives[primitives.len() - 2] {
        Primitive::Circle { center, radius, .. } => {
            assert_close(*center, Vec2::new(14.0, 254.0));
            assert!((radius - 20.0 / 3.25).abs() < 1e-4);
        }
        other => panic!("expected food circle, got {other:?}"),
    }
    match &primitives[primitives.len() - 1] {
        Primitive::Rect { rect, opacity, .. } => {
            assert_close(rect.position, Vec2::new(244.0, 4.0));
            assert_eq!(*opacity, Palette::default().hazard_opacity);
        }
        other => panic!("expected hazard cell, got {other:?}"),
    }
    assert_close(scene.to_presentation().view_box, Vec2::splat(268.0));
}

#[test]
fn rendering_is_idempotent() {
    let frame = frame(vec![
        snake("x", "#3366ff", &[(4, 4), (3, 4), (3, 3)]),
        snake("y", "#22aa88", &[(4, 5), (4, 4), (4, 3)]),
    ]);

    assert_eq!(draw(&frame, Some("y")), draw(&frame, Some("y")));
}

#[test]
fn invalid_colors_abort_the_render() {
    let frame = frame(vec![snake("s", "blue", &[(1, 1)])]);
    let error = render(&frame, BOARD, None, &Palette::default(), &KnownKeys)
        .expect_err("named colors are not supported");

    assert!(matches!(error, RenderError::Color { snake, .. } if snake == "s"));
}

#[test]
fn cells_off_the_board_abort_the_render() {
    let frame = frame(vec![snake("s", "#3366ff", &[(11, 3), (10, 3)])]);
    let error = render(&frame, BOARD, None, &Palette::default(), &KnownKeys)
        .expect_err("cells off the board must be rejected");

    assert!(matches!(error, RenderError::Layering(_)));
}
