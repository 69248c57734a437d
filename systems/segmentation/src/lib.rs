#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure segmentation system that turns snake bodies into classified segments.
//!
//! Bodies carry no direction field, so every segment's direction of travel is
//! inferred from its head-ward neighbour. Each segment is then classified
//! exactly once into a [`SegmentShape`], which renderers match on without
//! re-deriving any geometry.

use snake_tester_core::{Coordinate, Direction, Snake};

/// Position of a segment within its body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// First body entry.
    Head,
    /// Last body entry of a body longer than one cell.
    Tail,
    /// Any entry between head and tail.
    Body,
}

/// Rounded corner a turning body segment is drawn with, named by the two
/// cell edges it connects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CornerOrientation {
    /// Connects the top and left edges.
    TopLeft,
    /// Connects the top and right edges.
    TopRight,
    /// Connects the bottom and right edges.
    BottomRight,
    /// Connects the bottom and left edges.
    BottomLeft,
}

/// Final drawable shape of a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentShape {
    /// Head artwork.
    Head,
    /// Tail artwork.
    Tail,
    /// Straight body piece along the segment's direction.
    Straight,
    /// Quarter-round body piece.
    Corner(CornerOrientation),
}

/// One classified body cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Board cell of the segment.
    pub cell: Coordinate,
    /// Inferred direction of travel through the cell.
    pub direction: Direction,
    /// Shape the segment is drawn with.
    pub shape: SegmentShape,
    /// The cell is already covered by another segment of the same snake.
    pub is_overlapped: bool,
    /// The cell is already covered by a different snake drawn earlier.
    pub shade_for_overlap: bool,
}

/// A snake together with its classified segments, head first.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentedSnake<'a> {
    snake: &'a Snake,
    segments: Vec<Segment>,
    effective_length: usize,
}

impl<'a> SegmentedSnake<'a> {
    /// Snake the segments were derived from.
    #[must_use]
    pub const fn snake(&self) -> &'a Snake {
        self.snake
    }

    /// Segments in storage order, head first.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Mutable access used by the overlap pass.
    pub fn segments_mut(&mut self) -> &mut [Segment] {
        &mut self.segments
    }

    /// Number of segments that render on their own.
    #[must_use]
    pub const fn effective_length(&self) -> usize {
        self.effective_length
    }

    /// Cell of the last segment.
    #[must_use]
    pub fn tail_cell(&self) -> Coordinate {
        self.segments[self.segments.len() - 1].cell
    }

    /// Reports whether the segment collapsed onto the tail and must not be drawn.
    #[must_use]
    pub fn is_suppressed(&self, segment: &Segment) -> bool {
        segment.is_overlapped && segment.cell == self.tail_cell()
    }

    /// Segments in draw order: tail first, so head-ward pieces cover their neighbours.
    pub fn render_order(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().rev()
    }
}

/// Infers the direction of travel of the segment at `index`.
///
/// The head travels from its neck into its own cell. Every other segment
/// travels into its head-ward neighbour, skipping neighbours stacked on the
/// same cell until a distinct cell or the head is reached. Bodies of length
/// one and fully stacked runs fall back to [`Direction::DEFAULT`].
///
/// # Panics
///
/// Panics when `index` is outside `body`.
#[must_use]
pub fn infer_direction(body: &[Coordinate], index: usize) -> Direction {
    let cell = body[index];
    if index == 0 {
        return body
            .get(1)
            .map_or(Direction::DEFAULT, |&neck| Direction::of_travel(neck, cell));
    }

    let mut reference = index - 1;
    while reference > 0 && body[reference] == cell {
        reference -= 1;
    }
    Direction::of_travel(cell, body[reference])
}

/// Position of the entry at `index` in a body of `length` entries.
#[must_use]
pub const fn segment_kind(index: usize, length: usize) -> SegmentKind {
    if index == 0 {
        SegmentKind::Head
    } else if index + 1 == length {
        SegmentKind::Tail
    } else {
        SegmentKind::Body
    }
}

/// Corner drawn for a body segment travelling `current` whose tail-ward
/// neighbour travels `behind`.
pub fn corner_orientation(
    kind: SegmentKind,
    current: Direction,
    behind: Direction,
) -> Result<CornerOrientation, CornerError> {
    if kind != SegmentKind::Body {
        return Err(CornerError::NotBody(kind));
    }

    match (current, behind) {
        (Direction::Up, Direction::Right) | (Direction::Left, Direction::Down) => {
            Ok(CornerOrientation::TopLeft)
        }
        (Direction::Up, Direction::Left) | (Direction::Right, Direction::Down) => {
            Ok(CornerOrientation::TopRight)
        }
        (Direction::Down, Direction::Left) | (Direction::Right, Direction::Up) => {
            Ok(CornerOrientation::BottomRight)
        }
        (Direction::Down, Direction::Right) | (Direction::Left, Direction::Up) => {
            Ok(CornerOrientation::BottomLeft)
        }
        _ => Err(CornerError::NotATurn { current, behind }),
    }
}

/// Reports whether the entry at `index` draws on its own.
///
/// The head always draws. The tail draws unless it sits under the head. A
/// body entry draws unless it shares its cell with the head, the tail or its
/// head-ward neighbour.
///
/// # Panics
///
/// Panics when `index` is outside `body`.
#[must_use]
pub fn is_rendered(body: &[Coordinate], index: usize) -> bool {
    let cell = body[index];
    let head = body[0];
    let tail = body[body.len() - 1];

    match segment_kind(index, body.len()) {
        SegmentKind::Head => true,
        SegmentKind::Tail => cell != head,
        SegmentKind::Body => cell != head && cell != tail && cell != body[index - 1],
    }
}

/// Classifies every segment of the snake.
pub fn segment(snake: &Snake) -> Result<SegmentedSnake<'_>, SegmentationError> {
    let body = snake.body.as_slice();
    if body.is_empty() {
        return Err(SegmentationError::EmptyBody {
            snake: snake.id.clone(),
        });
    }

    let directions: Vec<Direction> = (0..body.len())
        .map(|index| infer_direction(body, index))
        .collect();

    let mut segments = Vec::with_capacity(body.len());
    let mut effective_length = 0;
    for (index, (&cell, &direction)) in body.iter().zip(&directions).enumerate() {
        let kind = segment_kind(index, body.len());
        let shape = match kind {
            SegmentKind::Head => SegmentShape::Head,
            SegmentKind::Tail => SegmentShape::Tail,
            SegmentKind::Body => {
                let behind = directions[index + 1];
                if body[index + 1] == cell || !direction.is_perpendicular_to(behind) {
                    SegmentShape::Straight
                } else {
                    let orientation = corner_orientation(kind, direction, behind).map_err(
                        |source| SegmentationError::Corner {
                            snake: snake.id.clone(),
                            index,
                            source,
                        },
                    )?;
                    SegmentShape::Corner(orientation)
                }
            }
        };

        let rendered = is_rendered(body, index);
        if rendered {
            effective_length += 1;
        }
        segments.push(Segment {
            cell,
            direction,
            shape,
            is_overlapped: !rendered,
            shade_for_overlap: false,
        });
    }

    Ok(SegmentedSnake {
        snake,
        segments,
        effective_length,
    })
}

/// Misuse of corner classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CornerError {
    /// Only body segments can be corners.
    #[error("corner requested for a {0:?} segment")]
    NotBody(SegmentKind),
    /// The two directions do not form a 90 degree turn.
    #[error("{current:?} after {behind:?} is not a turn")]
    NotATurn {
        /// Direction of the segment.
        current: Direction,
        /// Direction of its tail-ward neighbour.
        behind: Direction,
    },
}

/// Contract violations detected while segmenting a snake.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SegmentationError {
    /// The snake has no body cells.
    #[error("snake `{snake}` has an empty body")]
    EmptyBody {
        /// Identifier of the snake.
        snake: String,
    },
    /// Corner classification failed for a segment.
    #[error("snake `{snake}` segment {index}: {source}")]
    Corner {
        /// Identifier of the snake.
        snake: String,
        /// Index of the segment within the body.
        index: usize,
        /// Underlying classification failure.
        source: CornerError,
    },
}
