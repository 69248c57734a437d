#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for snake tester adapters.
//!
//! Systems produce [`Primitive`] lists positioned through a [`BoardGeometry`];
//! backends turn a [`Presentation`] into concrete output. Head and tail
//! artwork is referenced through opaque [`ArtworkHandle`] values obtained from
//! an [`ArtworkResolver`], so nothing in this crate depends on a particular
//! drawing technology.

use anyhow::Result as AnyResult;
use glam::Vec2;
use snake_tester_core::{BoardDimensions, Coordinate};

/// Default side length of a board cell in presentation units.
pub const CELL_SIZE: f32 = 20.0;

/// Default gap between neighbouring cells and around the board edge.
pub const CELL_SPACING: f32 = 4.0;

/// Distance head and tail artwork is nudged to hide seams with the body.
pub const END_OVERLAP: f32 = 0.2;

/// Side length of the square view box head and tail artwork is authored in.
pub const ARTWORK_VIEW_BOX: f32 = 100.0;

/// Side length of the square view box the corner path is authored in.
pub const CORNER_VIEW_BOX: f32 = 140.0;

/// Path of the quarter-round corner piece in its unrotated (bottom-left) pose.
pub const CORNER_PATH: &str = "M0,20 h60 a60,60 0 0 1 60,60 v60 h-100 v-20 h-20 z";

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Parses an opaque color written as `#rrggbb` or `#rgb`.
    pub fn from_hex(value: &str) -> Result<Self, RenderingError> {
        let invalid = || RenderingError::InvalidColor {
            value: value.to_owned(),
        };
        let digits = value.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|digit| digit.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
        };
        match digits.len() {
            6 => Ok(Self::from_rgb_u8(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            3 => {
                let short = |index: usize| channel(index..index + 1).map(|nibble| nibble * 17);
                Ok(Self::from_rgb_u8(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(invalid()),
        }
    }

    /// Formats the RGB channels as `#rrggbb`, ignoring alpha.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            channel_to_u8(self.red),
            channel_to_u8(self.green),
            channel_to_u8(self.blue)
        )
    }
}

fn channel_to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Axis-aligned rectangle in presentation units; `position` is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// Top-left corner.
    pub position: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// Centre point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }
}

/// Maps board cells to presentation units.
///
/// Row 0 is the bottom row of the board, so rows are flipped when mapped onto
/// the downward-growing presentation axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardGeometry {
    columns: u32,
    rows: u32,
    cell_size: f32,
    spacing: f32,
}

impl BoardGeometry {
    /// Geometry for the board using [`CELL_SIZE`] and [`CELL_SPACING`].
    #[must_use]
    pub const fn new(dimensions: BoardDimensions) -> Self {
        Self {
            columns: dimensions.width(),
            rows: dimensions.height(),
            cell_size: CELL_SIZE,
            spacing: CELL_SPACING,
        }
    }

    /// Side length of a cell.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Gap between cells.
    #[must_use]
    pub const fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Distance between the left edges of neighbouring cells.
    #[must_use]
    pub fn pitch(&self) -> f32 {
        self.cell_size + self.spacing
    }

    /// Left edge of the column.
    ///
    /// Columns outside the board are accepted so that fillers bridging toward
    /// a neighbour can be placed relative to cells past the edge.
    #[must_use]
    pub fn to_pixel_x(&self, column: i64) -> f32 {
        self.pitch() * column as f32 + self.spacing
    }

    /// Top edge of the row, flipped so that row 0 is drawn lowest.
    #[must_use]
    pub fn to_pixel_y(&self, row: i64) -> f32 {
        self.pitch() * (i64::from(self.rows) - 1 - row) as f32 + self.spacing
    }

    /// Top-left corner of the cell.
    #[must_use]
    pub fn cell_origin(&self, cell: Coordinate) -> Vec2 {
        Vec2::new(
            self.to_pixel_x(i64::from(cell.x())),
            self.to_pixel_y(i64::from(cell.y())),
        )
    }

    /// Rectangle covered by the cell.
    #[must_use]
    pub fn cell_rect(&self, cell: Coordinate) -> Rect {
        Rect::new(self.cell_origin(cell), Vec2::splat(self.cell_size))
    }

    /// Size of the whole board including the outer margin.
    #[must_use]
    pub fn view_box(&self) -> Vec2 {
        Vec2::new(
            self.pitch() * self.columns as f32 + self.spacing,
            self.pitch() * self.rows as f32 + self.spacing,
        )
    }
}

/// Family of artwork a handle refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtworkKind {
    /// Snake heads.
    Head,
    /// Snake tails.
    Tail,
}

/// Opaque reference to a piece of head or tail artwork.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtworkHandle {
    kind: ArtworkKind,
    key: String,
}

impl ArtworkHandle {
    /// Creates a handle for the resolved key.
    #[must_use]
    pub fn new<T>(kind: ArtworkKind, key: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            kind,
            key: key.into(),
        }
    }

    /// Family of the artwork.
    #[must_use]
    pub const fn kind(&self) -> ArtworkKind {
        self.kind
    }

    /// Resolved key, after any fallback.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Collaborator mapping style keys to artwork handles.
pub trait ArtworkResolver {
    /// Resolves the key, falling back to the default artwork of the kind when
    /// the key is unknown.
    fn resolve(&self, kind: ArtworkKind, key: &str) -> ArtworkHandle;
}

/// Orientation applied to artwork about the centre of its view box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArtworkTransform {
    /// Drawn as authored.
    Identity,
    /// Mirrored horizontally.
    Mirror,
    /// Rotated by the given degrees, clockwise positive.
    Rotate(f32),
    /// Mirrored horizontally, then rotated by the given degrees.
    MirrorRotate(f32),
}

/// Drawable element positioned in presentation units.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// Filled rectangle.
    Rect {
        /// Covered area.
        rect: Rect,
        /// Fill color.
        fill: Color,
        /// Opacity in the range 0.0..=1.0.
        opacity: f32,
    },
    /// Filled circle.
    Circle {
        /// Centre point.
        center: Vec2,
        /// Radius.
        radius: f32,
        /// Fill color.
        fill: Color,
        /// Opacity in the range 0.0..=1.0.
        opacity: f32,
    },
    /// Quarter-round body piece drawn from [`CORNER_PATH`].
    Corner {
        /// Area the [`CORNER_VIEW_BOX`] is scaled into.
        rect: Rect,
        /// Clockwise rotation about the centre, in degrees.
        rotation: f32,
        /// Fill color.
        fill: Color,
        /// Opacity in the range 0.0..=1.0.
        opacity: f32,
    },
    /// Head or tail artwork.
    Artwork {
        /// Artwork to draw.
        handle: ArtworkHandle,
        /// Area the [`ARTWORK_VIEW_BOX`] is scaled into.
        rect: Rect,
        /// Orientation of the artwork.
        transform: ArtworkTransform,
        /// Fill color.
        fill: Color,
        /// Opacity in the range 0.0..=1.0.
        opacity: f32,
    },
}

impl Primitive {
    /// Opacity of the primitive.
    #[must_use]
    pub const fn opacity(&self) -> f32 {
        match self {
            Self::Rect { opacity, .. }
            | Self::Circle { opacity, .. }
            | Self::Corner { opacity, .. }
            | Self::Artwork { opacity, .. } => *opacity,
        }
    }

    /// Fill color of the primitive.
    #[must_use]
    pub const fn fill(&self) -> Color {
        match self {
            Self::Rect { fill, .. }
            | Self::Circle { fill, .. }
            | Self::Corner { fill, .. }
            | Self::Artwork { fill, .. } => *fill,
        }
    }

    /// Returns the primitive with its opacity multiplied by `factor`.
    #[must_use]
    pub fn scale_opacity(mut self, factor: f32) -> Self {
        match &mut self {
            Self::Rect { opacity, .. }
            | Self::Circle { opacity, .. }
            | Self::Corner { opacity, .. }
            | Self::Artwork { opacity, .. } => *opacity *= factor,
        }
        self
    }
}

/// Colors shared by every board rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Fill of segments covering a cell already claimed by another snake.
    pub overlap: Color,
    /// Fill of food circles.
    pub food: Color,
    /// Fill of hazard cells.
    pub hazard: Color,
    /// Opacity of hazard cells.
    pub hazard_opacity: f32,
    /// Fill of empty cells.
    pub cell_background: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            overlap: Color::from_rgb_u8(0xff, 0x4f, 0x4f),
            food: Color::from_rgb_u8(0xff, 0x5c, 0x75),
            hazard: Color::from_rgb_u8(0x00, 0x00, 0x00),
            hazard_opacity: 0.3,
            cell_background: Color::from_rgb_u8(0xf1, 0xf1, 0xf1),
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Size of the drawing surface.
    pub view_box: Vec2,
    /// Primitives in painting order, later ones on top.
    pub primitives: Vec<Primitive>,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub const fn new(view_box: Vec2, primitives: Vec<Primitive>) -> Self {
        Self {
            view_box,
            primitives,
        }
    }
}

/// Rendering backend capable of presenting board scenes.
pub trait RenderingBackend {
    /// Product of presenting a scene, such as a document or a file path.
    type Output;

    /// Draws the presentation, painting primitives in order.
    fn present(&mut self, presentation: &Presentation) -> AnyResult<Self::Output>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RenderingError {
    /// A color string is not `#rrggbb` or `#rgb`.
    #[error("invalid color `{value}`")]
    InvalidColor {
        /// Provided text that failed validation.
        value: String,
    },
}
