#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure layering system that orders snakes for drawing and resolves overlaps.
//!
//! Snakes are painted bottom to top: eliminated snakes first, living snakes
//! after them and an optional highlighted snake last. Walking the snakes in
//! that order, every segment that lands on a cell already claimed by a
//! different snake is flagged for overlap shading.

use snake_tester_core::{BoardDimensions, Coordinate, Snake};
use snake_tester_system_segmentation::SegmentedSnake;

/// Opacity of a snake drawn without dimming.
pub const FULL_OPACITY: f32 = 1.0;

/// Opacity of eliminated snakes while no snake is highlighted.
pub const ELIMINATED_OPACITY: f32 = 0.1;

/// Opacity of living snakes other than the highlighted one.
pub const DIMMED_OPACITY: f32 = 0.15;

/// Opacity of eliminated snakes while another snake is highlighted.
pub const HIDDEN_OPACITY: f32 = 0.0;

/// Layer a snake is painted in; lower layers are painted first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DrawLayer {
    /// Eliminated snakes.
    Eliminated,
    /// Snakes still in the game.
    Living,
    /// The highlighted snake.
    Highlighted,
}

/// Layer the snake is painted in.
#[must_use]
pub fn draw_layer(snake: &Snake, highlighted: Option<&str>) -> DrawLayer {
    if highlighted == Some(snake.id.as_str()) {
        DrawLayer::Highlighted
    } else if snake.is_eliminated() {
        DrawLayer::Eliminated
    } else {
        DrawLayer::Living
    }
}

/// Indices of `snakes` in painting order.
///
/// The sort is stable, so snakes sharing a layer keep their frame order.
#[must_use]
pub fn draw_order(snakes: &[Snake], highlighted: Option<&str>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..snakes.len()).collect();
    order.sort_by_key(|&index| draw_layer(&snakes[index], highlighted));
    order
}

/// Opacity applied to every primitive of the snake.
#[must_use]
pub fn snake_opacity(snake: &Snake, highlighted: Option<&str>) -> f32 {
    match (highlighted, draw_layer(snake, highlighted)) {
        (_, DrawLayer::Highlighted) => FULL_OPACITY,
        (None, DrawLayer::Living) => FULL_OPACITY,
        (None, DrawLayer::Eliminated) => ELIMINATED_OPACITY,
        (Some(_), DrawLayer::Living) => DIMMED_OPACITY,
        (Some(_), DrawLayer::Eliminated) => HIDDEN_OPACITY,
    }
}

/// Flags segments covering cells already claimed by another snake.
///
/// `snakes` must be in painting order. Eliminated snakes neither claim cells
/// nor get shaded, and segments suppressed onto their own tail are ignored.
/// A snake re-entering a cell it already claimed is left untouched.
pub fn resolve_overlaps(
    dimensions: BoardDimensions,
    snakes: &mut [SegmentedSnake<'_>],
) -> Result<(), LayeringError> {
    let mut owners: Vec<Option<usize>> = vec![None; dimensions.cell_count()];

    for (owner, snake) in snakes.iter_mut().enumerate() {
        if snake.snake().is_eliminated() {
            continue;
        }

        let id = &snake.snake().id;
        let tail = snake.tail_cell();
        for segment in snake.segments_mut() {
            if segment.is_overlapped && segment.cell == tail {
                continue;
            }

            let index = dimensions
                .index_of(segment.cell)
                .ok_or_else(|| LayeringError::OutOfBounds {
                    snake: id.clone(),
                    cell: segment.cell,
                })?;
            match owners[index] {
                None => owners[index] = Some(owner),
                Some(claimed) if claimed != owner => segment.shade_for_overlap = true,
                Some(_) => {}
            }
        }
    }

    Ok(())
}

/// Contract violations detected while layering snakes.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayeringError {
    /// A segment lies outside the board.
    #[error("snake `{snake}` occupies ({}, {}) outside the board", .cell.x(), .cell.y())]
    OutOfBounds {
        /// Identifier of the snake.
        snake: String,
        /// Offending cell.
        cell: Coordinate,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use snake_tester_core::{Elimination, SnakeStyle};

    fn snake(id: &str, eliminated: bool) -> Snake {
        let snake = Snake::new(
            id,
            id,
            vec![Coordinate::new(0, 0)],
            SnakeStyle::with_color("#000000"),
        );
        if eliminated {
            snake.eliminated(Elimination {
                cause: "wall-collision".to_owned(),
                turn: 3,
                eliminated_by: String::new(),
            })
        } else {
            snake
        }
    }

    #[test]
    fn eliminated_snakes_are_painted_first() {
        let snakes = [
            snake("a", false),
            snake("b", true),
            snake("c", false),
            snake("d", true),
        ];

        assert_eq!(draw_order(&snakes, None), vec![1, 3, 0, 2]);
    }

    #[test]
    fn highlighted_snake_is_painted_last() {
        let snakes = [snake("a", false), snake("b", false), snake("c", true)];

        assert_eq!(draw_order(&snakes, Some("a")), vec![2, 1, 0]);
        assert_eq!(draw_order(&snakes, Some("c")), vec![0, 1, 2]);
    }

    #[test]
    fn opacity_depends_on_highlight() {
        let living = snake("a", false);
        let eliminated = snake("b", true);

        assert_eq!(snake_opacity(&living, None), FULL_OPACITY);
        assert_eq!(snake_opacity(&eliminated, None), ELIMINATED_OPACITY);
        assert_eq!(snake_opacity(&living, Some("a")), FULL_OPACITY);
        assert_eq!(snake_opacity(&living, Some("x")), DIMMED_OPACITY);
        assert_eq!(snake_opacity(&eliminated, Some("a")), HIDDEN_OPACITY);
        assert_eq!(snake_opacity(&eliminated, Some("b")), FULL_OPACITY);
    }
}
