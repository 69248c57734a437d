#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! SVG rendering backend for snake tester scenes.

mod artwork;

use std::fmt::Write as _;

use anyhow::Result;
use glam::Vec2;
use snake_tester_rendering::{
    ArtworkTransform, Color, Presentation, Primitive, Rect, RenderingBackend, ARTWORK_VIEW_BOX,
    CORNER_PATH, CORNER_VIEW_BOX,
};

pub use artwork::ArtworkLibrary;

/// Rendering backend that writes presentations as standalone SVG documents.
#[derive(Debug)]
pub struct SvgBackend<'a> {
    artwork: &'a ArtworkLibrary,
}

impl<'a> SvgBackend<'a> {
    /// Creates a backend drawing head and tail artwork from the library.
    #[must_use]
    pub const fn new(artwork: &'a ArtworkLibrary) -> Self {
        Self { artwork }
    }

    fn write_primitive(&self, document: &mut String, primitive: &Primitive) -> Result<()> {
        match primitive {
            Primitive::Rect {
                rect,
                fill,
                opacity,
            } => {
                writeln!(
                    document,
                    r#"  <rect x="{}" y="{}" width="{}" height="{}"{}/>"#,
                    number(rect.position.x),
                    number(rect.position.y),
                    number(rect.size.x),
                    number(rect.size.y),
                    paint(*fill, *opacity)
                )?;
            }
            Primitive::Circle {
                center,
                radius,
                fill,
                opacity,
            } => {
                writeln!(
                    document,
                    r#"  <circle cx="{}" cy="{}" r="{}"{}/>"#,
                    number(center.x),
                    number(center.y),
                    number(*radius),
                    paint(*fill, *opacity)
                )?;
            }
            Primitive::Corner {
                rect,
                rotation,
                fill,
                opacity,
            } => {
                let half = number(CORNER_VIEW_BOX / 2.0);
                writeln!(
                    document,
                    r#"  <svg {}><path d="{CORNER_PATH}" transform="rotate({} {half} {half})"{}/></svg>"#,
                    viewport(rect, CORNER_VIEW_BOX),
                    number(*rotation),
                    paint(*fill, *opacity)
                )?;
            }
            Primitive::Artwork {
                handle,
                rect,
                transform,
                fill,
                opacity,
            } => {
                let markup = self.artwork.markup(handle)?;
                let transform = transform_attribute(*transform);
                writeln!(
                    document,
                    r#"  <svg {}{}><g{transform}>{}</g></svg>"#,
                    viewport(rect, ARTWORK_VIEW_BOX),
                    paint(*fill, *opacity),
                    inner_svg(&markup).trim()
                )?;
            }
        }
        Ok(())
    }
}

impl RenderingBackend for SvgBackend<'_> {
    type Output = String;

    fn present(&mut self, presentation: &Presentation) -> Result<Self::Output> {
        let Vec2 {
            x: width,
            y: height,
        } = presentation.view_box;
        let mut document = String::new();
        writeln!(
            document,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {0} {1}" width="{0}" height="{1}">"#,
            number(width),
            number(height)
        )?;
        for primitive in &presentation.primitives {
            self.write_primitive(&mut document, primitive)?;
        }
        document.push_str("</svg>\n");
        Ok(document)
    }
}

/// Attributes placing a nested square view box over `rect`.
fn viewport(rect: &Rect, view_box: f32) -> String {
    format!(
        r#"x="{}" y="{}" width="{}" height="{}" viewBox="0 0 {size} {size}""#,
        number(rect.position.x),
        number(rect.position.y),
        number(rect.size.x),
        number(rect.size.y),
        size = number(view_box)
    )
}

fn paint(fill: Color, opacity: f32) -> String {
    if opacity >= 1.0 {
        format!(r#" fill="{}""#, fill.to_hex())
    } else {
        format!(r#" fill="{}" opacity="{}""#, fill.to_hex(), number(opacity))
    }
}

fn transform_attribute(transform: ArtworkTransform) -> String {
    let mirror = format!("scale(-1,1) translate(-{},0)", number(ARTWORK_VIEW_BOX));
    let half = number(ARTWORK_VIEW_BOX / 2.0);
    match transform {
        ArtworkTransform::Identity => String::new(),
        ArtworkTransform::Mirror => format!(r#" transform="{mirror}""#),
        ArtworkTransform::Rotate(degrees) => {
            format!(r#" transform="rotate({} {half} {half})""#, number(degrees))
        }
        ArtworkTransform::MirrorRotate(degrees) => format!(
            r#" transform="{mirror} rotate({} {half} {half})""#,
            number(degrees)
        ),
    }
}

/// Content of the outermost `<svg>` element, or the whole text when there is none.
fn inner_svg(markup: &str) -> &str {
    let Some(open) = markup.find("<svg") else {
        return markup;
    };
    let Some(start) = markup[open..].find('>').map(|end| open + end + 1) else {
        return markup;
    };
    if markup[..start].ends_with("/>") {
        return "";
    }
    let end = markup.rfind("</svg>").filter(|&end| end >= start);
    end.map_or(&markup[start..], |end| &markup[start..end])
}

/// Formats a coordinate with at most two decimals.
fn number(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_owned()
    } else {
        text.to_owned()
    }
}
