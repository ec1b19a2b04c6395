//! Drawing a [`SkyFrame`] onto a surface.
//!
//! [`render`] walks the frame's primitives in order and hands each one to a
//! [`SkyRenderer`]. [`SvgRenderer`] draws through `plotters`' SVG backend;
//! [`render_svg`] wraps it for the common case.

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::Color as _;
use sky_core::{Point, SkyError, SkyResult, Size};

use crate::primitives::{CirclePrimitive, LinePrimitive, Primitive, StarMarker, Stroke};
use crate::scene::SkyFrame;
use crate::style::Color;

/// Share of a star's opacity given to its glow halo.
const GLOW_ALPHA: f64 = 0.3;

/// A drawing surface fed one primitive at a time.
pub trait SkyRenderer {
    type Output;

    /// Prepares a surface of `size` cleared to `background`.
    fn begin(&mut self, size: Size, background: Color) -> SkyResult<()>;

    fn draw(&mut self, primitive: &Primitive) -> SkyResult<()>;

    fn finish(&mut self) -> SkyResult<Self::Output>;
}

/// Draws every primitive of `frame`, back to front.
pub fn render<R: SkyRenderer + ?Sized>(frame: &SkyFrame, renderer: &mut R) -> SkyResult<R::Output> {
    renderer.begin(frame.size, frame.background)?;
    for primitive in frame.primitives() {
        renderer.draw(primitive)?;
    }
    renderer.finish()
}

/// Renders `frame` to an SVG document.
pub fn render_svg(frame: &SkyFrame) -> SkyResult<String> {
    let mut svg = String::new();
    {
        let mut renderer = SvgRenderer::new(&mut svg);
        render(frame, &mut renderer)?;
    }
    Ok(svg)
}

fn draw_error(err: impl std::fmt::Display) -> SkyError {
    SkyError::render_failed(err.to_string())
}

fn rgb(color: Color) -> RGBColor {
    let (r, g, b) = color.to_rgb8();
    RGBColor(r, g, b)
}

fn pixels(length: f64) -> i32 {
    length.round().max(1.0) as i32
}

fn stroke_style(stroke: &Stroke, extra_width: f64, alpha: f64) -> ShapeStyle {
    ShapeStyle {
        color: rgb(stroke.color).mix(alpha * stroke.color.a),
        filled: false,
        stroke_width: pixels(stroke.width + extra_width) as u32,
    }
}

/// Writes SVG into a caller-owned string. The document is complete once
/// [`finish`](SkyRenderer::finish) returns and the renderer is dropped.
pub struct SvgRenderer<'a> {
    target: Option<&'a mut String>,
    area: Option<DrawingArea<SVGBackend<'a>, Shift>>,
    height: f64,
}

impl<'a> SvgRenderer<'a> {
    pub fn new(target: &'a mut String) -> Self {
        Self {
            target: Some(target),
            area: None,
            height: 0.0,
        }
    }

    fn area(&self) -> SkyResult<&DrawingArea<SVGBackend<'a>, Shift>> {
        self.area
            .as_ref()
            .ok_or_else(|| SkyError::render_failed("draw called outside begin/finish"))
    }

    /// Chart coordinates are y-up; SVG is y-down.
    fn to_svg(&self, p: Point) -> (i32, i32) {
        (p.x.round() as i32, (self.height - p.y).round() as i32)
    }

    fn draw_circle(&self, circle: &CirclePrimitive) -> SkyResult<()> {
        let area = self.area()?;
        let center = self.to_svg(circle.center);
        let radius = circle.radius.round() as i32;
        if radius <= 0 {
            return Ok(());
        }
        if let Some(fill) = circle.fill {
            area.draw(&Circle::new(center, radius, rgb(fill).mix(fill.a).filled()))
                .map_err(draw_error)?;
        }
        if let Some(stroke) = &circle.stroke {
            if circle.glow_width > 0.0 {
                let glow = stroke_style(stroke, circle.glow_width * 2.0, stroke.alpha * GLOW_ALPHA);
                area.draw(&Circle::new(center, radius, glow))
                    .map_err(draw_error)?;
            }
            area.draw(&Circle::new(center, radius, stroke_style(stroke, 0.0, stroke.alpha)))
                .map_err(draw_error)?;
        }
        Ok(())
    }

    fn draw_line(&self, line: &LinePrimitive) -> SkyResult<()> {
        let style = stroke_style(&line.stroke, 0.0, line.stroke.alpha);
        self.area()?
            .draw(&PathElement::new(
                vec![self.to_svg(line.from), self.to_svg(line.to)],
                style,
            ))
            .map_err(draw_error)?;
        Ok(())
    }

    fn draw_star(&self, star: &StarMarker) -> SkyResult<()> {
        if star.opacity <= 0.0 {
            return Ok(());
        }
        let area = self.area()?;
        let center = self.to_svg(star.center);
        let color = rgb(star.color);
        if let Some(glow) = star.glow_width {
            let halo = color.mix(star.opacity * GLOW_ALPHA).filled();
            area.draw(&Circle::new(center, pixels(star.radius + glow), halo))
                .map_err(draw_error)?;
        }
        area.draw(&Circle::new(center, pixels(star.radius), color.mix(star.opacity).filled()))
            .map_err(draw_error)?;
        Ok(())
    }
}

impl SkyRenderer for SvgRenderer<'_> {
    type Output = ();

    fn begin(&mut self, size: Size, background: Color) -> SkyResult<()> {
        let target = self
            .target
            .take()
            .ok_or_else(|| SkyError::render_failed("SVG renderer already used"))?;
        let dims = (pixels(size.width) as u32, pixels(size.height) as u32);
        let area = SVGBackend::with_string(target, dims).into_drawing_area();
        area.fill(&rgb(background)).map_err(draw_error)?;
        self.height = size.height;
        self.area = Some(area);
        Ok(())
    }

    fn draw(&mut self, primitive: &Primitive) -> SkyResult<()> {
        match primitive {
            Primitive::Circle(c) => self.draw_circle(c),
            Primitive::Line(l) => self.draw_line(l),
            Primitive::Star(s) => self.draw_star(s),
        }
    }

    fn finish(&mut self) -> SkyResult<()> {
        let area = self
            .area
            .take()
            .ok_or_else(|| SkyError::render_failed("finish called before begin"))?;
        area.present().map_err(draw_error)?;
        Ok(())
    }
}
