#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure rendering system that turns a frame into positioned primitives.
//!
//! [`render`] runs the whole pipeline from scratch on every call: segment
//! every snake, order the snakes, resolve overlaps and finally map each
//! segment onto the board geometry. Nothing is cached between calls.

use glam::Vec2;
use snake_tester_core::{BoardDimensions, Coordinate, Direction, Frame};
use snake_tester_rendering::{
    ArtworkKind, ArtworkResolver, ArtworkTransform, BoardGeometry, Color, Palette, Presentation,
    Primitive, Rect, RenderingError, END_OVERLAP,
};
use snake_tester_system_layering::{draw_order, resolve_overlaps, snake_opacity, LayeringError};
use snake_tester_system_segmentation::{
    segment, CornerOrientation, Segment, SegmentShape, SegmentationError, SegmentedSnake,
};

/// Opacity of segments shaded for covering another snake.
pub const SHADED_OPACITY: f32 = 0.8;

/// Opacity of segments stacked onto another segment of the same snake.
pub const OVERLAPPED_OPACITY: f32 = 0.3;

/// Ratio between the cell size and the radius of a food circle.
pub const FOOD_RADIUS_DIVISOR: f32 = 3.25;

/// Primitives of one snake together with the opacity applied to all of them.
#[derive(Clone, Debug, PartialEq)]
pub struct SnakeLayer {
    id: String,
    opacity: f32,
    primitives: Vec<Primitive>,
}

impl SnakeLayer {
    /// Identifier of the snake.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Opacity applied on top of each primitive's own opacity.
    #[must_use]
    pub const fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Primitives in painting order, tail first.
    #[must_use]
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }
}

/// Layered drawing of one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardScene {
    geometry: BoardGeometry,
    cells: Vec<Primitive>,
    snakes: Vec<SnakeLayer>,
    food: Vec<Primitive>,
    hazards: Vec<Primitive>,
}

impl BoardScene {
    /// Empty cell backgrounds.
    #[must_use]
    pub fn cells(&self) -> &[Primitive] {
        &self.cells
    }

    /// Snake layers in painting order.
    #[must_use]
    pub fn snakes(&self) -> &[SnakeLayer] {
        &self.snakes
    }

    /// Food circles.
    #[must_use]
    pub fn food(&self) -> &[Primitive] {
        &self.food
    }

    /// Hazard cells.
    #[must_use]
    pub fn hazards(&self) -> &[Primitive] {
        &self.hazards
    }

    /// Every primitive in painting order with snake opacity folded in.
    #[must_use]
    pub fn primitives(&self) -> Vec<Primitive> {
        let snakes = self.snakes.iter().flat_map(|layer| {
            layer
                .primitives
                .iter()
                .cloned()
                .map(|primitive| primitive.scale_opacity(layer.opacity))
        });

        self.cells
            .iter()
            .cloned()
            .chain(snakes)
            .chain(self.food.iter().cloned())
            .chain(self.hazards.iter().cloned())
            .collect()
    }

    /// Presentation descriptor for a rendering backend.
    #[must_use]
    pub fn to_presentation(&self) -> Presentation {
        Presentation::new(self.geometry.view_box(), self.primitives())
    }
}

/// Renders the frame on a board of the given dimensions.
///
/// `highlighted` names a snake to paint on top while every other snake is
/// dimmed. Any contract violation in the frame fails the whole render.
pub fn render<R>(
    frame: &Frame,
    dimensions: BoardDimensions,
    highlighted: Option<&str>,
    palette: &Palette,
    resolver: &R,
) -> Result<BoardScene, RenderError>
where
    R: ArtworkResolver + ?Sized,
{
    let geometry = BoardGeometry::new(dimensions);

    let mut layered = draw_order(&frame.snakes, highlighted)
        .into_iter()
        .map(|index| segment(&frame.snakes[index]))
        .collect::<Result<Vec<_>, _>>()?;
    resolve_overlaps(dimensions, &mut layered)?;

    let snakes = layered
        .iter()
        .map(|segmented| snake_layer(&geometry, segmented, highlighted, palette, resolver))
        .collect::<Result<Vec<_>, _>>()?;

    let cells = (0..dimensions.height())
        .flat_map(|y| (0..dimensions.width()).map(move |x| Coordinate::new(x, y)))
        .map(|cell| Primitive::Rect {
            rect: geometry.cell_rect(cell),
            fill: palette.cell_background,
            opacity: 1.0,
        })
        .collect();

    let food = frame
        .food
        .iter()
        .map(|&cell| Primitive::Circle {
            center: geometry.cell_rect(cell).center(),
            radius: geometry.cell_size() / FOOD_RADIUS_DIVISOR,
            fill: palette.food,
            opacity: 1.0,
        })
        .collect();

    let hazards = frame
        .hazards
        .iter()
        .map(|&cell| Primitive::Rect {
            rect: geometry.cell_rect(cell),
            fill: palette.hazard,
            opacity: palette.hazard_opacity,
        })
        .collect();

    Ok(BoardScene {
        geometry,
        cells,
        snakes,
        food,
        hazards,
    })
}

fn snake_layer<R>(
    geometry: &BoardGeometry,
    segmented: &SegmentedSnake<'_>,
    highlighted: Option<&str>,
    palette: &Palette,
    resolver: &R,
) -> Result<SnakeLayer, RenderError>
where
    R: ArtworkResolver + ?Sized,
{
    let snake = segmented.snake();
    let color = Color::from_hex(&snake.style.color).map_err(|source| RenderError::Color {
        snake: snake.id.clone(),
        source,
    })?;

    let mut primitives = Vec::with_capacity(segmented.segments().len() + 1);
    for segment in segmented.render_order() {
        if segmented.is_suppressed(segment) {
            continue;
        }

        let (fill, opacity) = if segment.shade_for_overlap {
            (palette.overlap, SHADED_OPACITY)
        } else if segment.is_overlapped {
            (color, OVERLAPPED_OPACITY)
        } else {
            (color, 1.0)
        };

        match segment.shape {
            SegmentShape::Head => {
                primitives.push(Primitive::Artwork {
                    handle: resolver.resolve(ArtworkKind::Head, &snake.style.head_type),
                    rect: nudged(geometry, segment.cell, segment.direction.opposite()),
                    transform: head_transform(segment.direction),
                    fill,
                    opacity,
                });
                if segmented.effective_length() > 1 {
                    primitives.push(Primitive::Rect {
                        rect: head_filler(geometry, segment),
                        fill,
                        opacity,
                    });
                }
            }
            SegmentShape::Tail => primitives.push(Primitive::Artwork {
                handle: resolver.resolve(ArtworkKind::Tail, &snake.style.tail_type),
                rect: nudged(geometry, segment.cell, segment.direction),
                transform: tail_transform(segment.direction),
                fill,
                opacity,
            }),
            SegmentShape::Straight => primitives.push(Primitive::Rect {
                rect: straight_rect(geometry, segment),
                fill,
                opacity,
            }),
            SegmentShape::Corner(orientation) => primitives.push(Primitive::Corner {
                rect: corner_rect(geometry, segment.cell),
                rotation: corner_rotation(orientation),
                fill,
                opacity,
            }),
        }
    }

    Ok(SnakeLayer {
        id: snake.id.clone(),
        opacity: snake_opacity(snake, highlighted),
        primitives,
    })
}

const fn is_horizontal(direction: Direction) -> bool {
    matches!(direction, Direction::Left | Direction::Right)
}

/// Cell rectangle shifted by [`END_OVERLAP`] toward `toward` on screen.
fn nudged(geometry: &BoardGeometry, cell: Coordinate, toward: Direction) -> Rect {
    let offset = match toward {
        Direction::Left => Vec2::new(-END_OVERLAP, 0.0),
        Direction::Right => Vec2::new(END_OVERLAP, 0.0),
        Direction::Up => Vec2::new(0.0, -END_OVERLAP),
        Direction::Down => Vec2::new(0.0, END_OVERLAP),
    };
    let rect = geometry.cell_rect(cell);
    Rect::new(rect.position + offset, rect.size)
}

/// Bridges the spacing between the head and its neck.
fn head_filler(geometry: &BoardGeometry, segment: &Segment) -> Rect {
    let x = i64::from(segment.cell.x());
    let y = i64::from(segment.cell.y());
    let spacing = geometry.spacing();
    let gap_start = spacing + END_OVERLAP;

    let left = match segment.direction {
        Direction::Left => geometry.to_pixel_x(x + 1) - gap_start,
        Direction::Right => geometry.to_pixel_x(x) - gap_start,
        Direction::Up | Direction::Down => geometry.to_pixel_x(x),
    };
    let top = match segment.direction {
        Direction::Up => geometry.to_pixel_y(y - 1) - gap_start,
        Direction::Down => geometry.to_pixel_y(y) - gap_start,
        Direction::Left | Direction::Right => geometry.to_pixel_y(y),
    };

    let thickness = spacing + 2.0 * END_OVERLAP;
    let size = if is_horizontal(segment.direction) {
        Vec2::new(thickness, geometry.cell_size())
    } else {
        Vec2::new(geometry.cell_size(), thickness)
    };
    Rect::new(Vec2::new(left, top), size)
}

/// Cell extended by the spacing on both ends along the direction of travel.
fn straight_rect(geometry: &BoardGeometry, segment: &Segment) -> Rect {
    let rect = geometry.cell_rect(segment.cell);
    let spacing = geometry.spacing();
    if is_horizontal(segment.direction) {
        Rect::new(
            rect.position - Vec2::new(spacing, 0.0),
            rect.size + Vec2::new(2.0 * spacing, 0.0),
        )
    } else {
        Rect::new(
            rect.position - Vec2::new(0.0, spacing),
            rect.size + Vec2::new(0.0, 2.0 * spacing),
        )
    }
}

fn corner_rect(geometry: &BoardGeometry, cell: Coordinate) -> Rect {
    let spacing = geometry.spacing();
    Rect::new(
        geometry.cell_origin(cell) - Vec2::splat(spacing),
        Vec2::splat(geometry.cell_size() + 2.0 * spacing),
    )
}

/// Clockwise rotation turning the bottom-left corner path into `orientation`.
#[must_use]
pub const fn corner_rotation(orientation: CornerOrientation) -> f32 {
    match orientation {
        CornerOrientation::BottomLeft => 0.0,
        CornerOrientation::TopLeft => 90.0,
        CornerOrientation::TopRight => 180.0,
        CornerOrientation::BottomRight => 270.0,
    }
}

/// Orientation of head artwork, authored facing right.
#[must_use]
pub const fn head_transform(direction: Direction) -> ArtworkTransform {
    match direction {
        Direction::Right => ArtworkTransform::Identity,
        Direction::Left => ArtworkTransform::Mirror,
        Direction::Up => ArtworkTransform::Rotate(-90.0),
        Direction::Down => ArtworkTransform::Rotate(90.0),
    }
}

/// Orientation of tail artwork, authored trailing to the left.
#[must_use]
pub const fn tail_transform(direction: Direction) -> ArtworkTransform {
    match direction {
        Direction::Left => ArtworkTransform::Identity,
        Direction::Right => ArtworkTransform::Mirror,
        Direction::Down => ArtworkTransform::MirrorRotate(-90.0),
        Direction::Up => ArtworkTransform::MirrorRotate(90.0),
    }
}

/// Errors that abort a render.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A snake could not be segmented.
    #[error(transparent)]
    Segmentation(#[from] SegmentationError),
    /// Snakes could not be layered.
    #[error(transparent)]
    Layering(#[from] LayeringError),
    /// A snake declares a color that cannot be parsed.
    #[error("snake `{snake}` has an invalid color")]
    Color {
        /// Identifier of the snake.
        snake: String,
        /// Parsing failure.
        #[source]
        source: RenderingError,
    },
}
