use crate::foundation::core::{Point, Rect, Vec2};
use crate::foundation::error::{KinetexError, KinetexResult};
use crate::typeset::{layout_tokens, word_tokens};

/// Stable identity of a payload fragment, used to correlate two payloads.
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct FragmentKey(pub String);

/// A keyed, positioned piece of a text or formula payload.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Fragment {
    /// Correlation key.
    pub key: FragmentKey,
    /// Display text of the fragment.
    pub text: String,
    /// Centre of the fragment relative to the payload centre (unscaled).
    pub offset: Vec2,
    /// Fragment width in scene units.
    pub width: f64,
    /// Fragment height in scene units.
    pub height: f64,
}

/// Plain text broken into word fragments.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextPayload {
    pub content: String,
    pub font_size: f64,
    pub fragments: Vec<Fragment>,
}

/// Typeset formula broken into token fragments.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FormulaPayload {
    pub source: String,
    pub font_size: f64,
    pub fragments: Vec<Fragment>,
}

/// Coordinate axes with a linear data-to-scene mapping.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AxesPayload {
    /// Data range shown on the x axis.
    pub x_range: [f64; 2],
    /// Data range shown on the y axis.
    pub y_range: [f64; 2],
    /// Tick spacing in data units on x.
    pub x_step: f64,
    /// Tick spacing in data units on y.
    pub y_step: f64,
    /// Drawn length of the x axis in scene units.
    pub x_length: f64,
    /// Drawn length of the y axis in scene units.
    pub y_length: f64,
}

impl AxesPayload {
    /// Validate ranges and lengths.
    pub fn validate(&self) -> KinetexResult<()> {
        let ok_range = |r: [f64; 2]| r[0].is_finite() && r[1].is_finite() && r[1] > r[0];
        if !ok_range(self.x_range) || !ok_range(self.y_range) {
            return Err(KinetexError::validation(
                "axes ranges must be finite with max > min",
            ));
        }
        if !(self.x_length > 0.0 && self.y_length > 0.0) {
            return Err(KinetexError::validation("axes lengths must be > 0"));
        }
        if !(self.x_step > 0.0 && self.y_step > 0.0) {
            return Err(KinetexError::validation("axes tick steps must be > 0"));
        }
        Ok(())
    }

    /// Map data coordinates to local (unscaled, centre-relative) coordinates.
    pub fn coords_to_local(&self, x: f64, y: f64) -> Point {
        let fx = (x - self.x_range[0]) / (self.x_range[1] - self.x_range[0]);
        let fy = (y - self.y_range[0]) / (self.y_range[1] - self.y_range[0]);
        Point::new((fx - 0.5) * self.x_length, (fy - 0.5) * self.y_length)
    }
}

/// A polyline in local coordinates (centred on its bounding box).
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CurvePayload {
    pub points: Vec<Point>,
}

/// A curly brace opening towards `direction`'s opposite, spanning `span` units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct BracePayload {
    /// Unit vector the brace tip points to.
    pub direction: Vec2,
    /// Length covered on the axis perpendicular to `direction`.
    pub span: f64,
}

/// Depth of a brace along its pointing direction.
pub const BRACE_DEPTH: f64 = 0.25;

/// Visual payload of a scene element. Opaque to the timeline apart from its extent and,
/// for text and formulas, its keyed fragments.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum Payload {
    Text(TextPayload),
    Formula(FormulaPayload),
    Axes(AxesPayload),
    Curve(CurvePayload),
    Marker { radius: f64 },
    Brace(BracePayload),
}

impl Payload {
    /// Text payload laid out word by word.
    pub fn text(content: impl Into<String>, font_size: f64) -> KinetexResult<Self> {
        crate::typeset::validate_font_size(font_size)?;
        let content = content.into();
        let fragments = layout_tokens(&word_tokens(&content), font_size);
        Ok(Self::Text(TextPayload {
            content,
            font_size,
            fragments,
        }))
    }

    pub(crate) fn formula_from_parts(
        source: &str,
        font_size: f64,
        fragments: Vec<Fragment>,
    ) -> Self {
        Self::Formula(FormulaPayload {
            source: source.to_string(),
            font_size,
            fragments,
        })
    }

    /// Polyline payload; points are re-centred on their bounding box.
    ///
    /// Returns the payload and the original bounding-box centre so callers can position the
    /// element where the points were.
    pub fn curve(points: Vec<Point>) -> KinetexResult<(Self, Point)> {
        if points.len() < 2 {
            return Err(KinetexError::validation("curve needs at least two points"));
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(KinetexError::validation("curve points must be finite"));
        }
        let bbox = points_bbox(&points);
        let centre = bbox.center();
        let local = points.iter().map(|p| *p - centre.to_vec2()).collect();
        Ok((Self::Curve(CurvePayload { points: local }), centre))
    }

    /// Short kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Formula(_) => "formula",
            Self::Axes(_) => "axes",
            Self::Curve(_) => "curve",
            Self::Marker { .. } => "marker",
            Self::Brace(_) => "brace",
        }
    }

    /// Keyed fragments, for payloads that have substructure.
    pub fn fragments(&self) -> Option<&[Fragment]> {
        match self {
            Self::Text(t) => Some(&t.fragments),
            Self::Formula(f) => Some(&f.fragments),
            _ => None,
        }
    }

    /// Unscaled width and height, centred on the element position.
    pub fn extent(&self) -> Vec2 {
        match self {
            Self::Text(TextPayload { fragments, .. })
            | Self::Formula(FormulaPayload { fragments, .. }) => {
                let Some(first) = fragments.first() else {
                    return Vec2::ZERO;
                };
                let mut r = fragment_rect(first);
                for f in &fragments[1..] {
                    r = r.union(fragment_rect(f));
                }
                Vec2::new(
                    2.0 * r.x0.abs().max(r.x1.abs()),
                    2.0 * r.y0.abs().max(r.y1.abs()),
                )
            }
            Self::Axes(a) => Vec2::new(a.x_length, a.y_length),
            Self::Curve(c) => {
                let r = points_bbox(&c.points);
                Vec2::new(
                    2.0 * r.x0.abs().max(r.x1.abs()),
                    2.0 * r.y0.abs().max(r.y1.abs()),
                )
            }
            Self::Marker { radius } => Vec2::new(2.0 * radius, 2.0 * radius),
            Self::Brace(b) => {
                if b.direction.x.abs() > b.direction.y.abs() {
                    Vec2::new(BRACE_DEPTH, b.span)
                } else {
                    Vec2::new(b.span, BRACE_DEPTH)
                }
            }
        }
    }

    /// Single-fragment formula used to draw one moving piece of a morph.
    pub(crate) fn fragment_piece(&self, fragment: &Fragment) -> Self {
        let font_size = match self {
            Self::Text(t) => t.font_size,
            Self::Formula(f) => f.font_size,
            _ => 0.0,
        };
        Self::Formula(FormulaPayload {
            source: fragment.text.clone(),
            font_size,
            fragments: vec![Fragment {
                offset: Vec2::ZERO,
                ..fragment.clone()
            }],
        })
    }
}

fn fragment_rect(f: &Fragment) -> Rect {
    Rect::from_center_size(f.offset.to_point(), (f.width, f.height))
}

fn points_bbox(points: &[Point]) -> Rect {
    let mut r = Rect::from_points(points[0], points[0]);
    for p in &points[1..] {
        r = r.union_pt(*p);
    }
    r
}

#[cfg(test)]
#[path = "../../tests/unit/scene/payload.rs"]
mod tests;
