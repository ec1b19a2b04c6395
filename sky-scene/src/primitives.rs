//! Screen-space drawables produced for each frame.
//!
//! Coordinates are chart coordinates (y up) after the view transform has been
//! applied. Renderers flip y themselves when their surface needs it.

use serde::Serialize;
use sky_core::Point;

use crate::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub alpha: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CircleRole {
    SkyDisk,
    /// `fraction` of the sky radius: 1 on the equator, 0 at the pole.
    Parallel { fraction: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CirclePrimitive {
    pub role: CircleRole,
    pub center: Point,
    pub radius: f64,
    pub fill: Option<Color>,
    pub stroke: Option<Stroke>,
    pub glow_width: f64,
}

/// A meridian, from the pole at the disk center to the rim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinePrimitive {
    /// Right ascension of the meridian, radians.
    pub right_ascension: f64,
    pub from: Point,
    pub to: Point,
    pub stroke: Stroke,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StarMarker {
    pub id: i64,
    pub magnitude: f64,
    pub center: Point,
    pub radius: f64,
    pub color: Color,
    pub opacity: f64,
    pub glow_width: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Circle(CirclePrimitive),
    Line(LinePrimitive),
    Star(StarMarker),
}

impl Primitive {
    pub fn as_circle(&self) -> Option<&CirclePrimitive> {
        match self {
            Primitive::Circle(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&LinePrimitive> {
        match self {
            Primitive::Line(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_star(&self) -> Option<&StarMarker> {
        match self {
            Primitive::Star(s) => Some(s),
            _ => None,
        }
    }
}
