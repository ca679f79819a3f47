/// Easing functions used to map normalized animation progress.
///
/// Every variant is monotonic on `[0, 1]` with `apply(0) == 0` and `apply(1) == 1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// Linear interpolation.
    Linear,
    /// Smootherstep; the default for scripted steps.
    #[default]
    Smooth,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Quadratic ease-in/out.
    InOutQuad,
    /// Cubic ease-in.
    InCubic,
    /// Cubic ease-out.
    OutCubic,
    /// Cubic ease-in/out.
    InOutCubic,
}

impl Ease {
    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Smooth => t * t * t * (t * (6.0 * t - 15.0) + 10.0),
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }
}

/// Envelope rising 0 -> 1 -> 0 over `[0, 1]`; used by transient emphasis.
pub(crate) fn there_and_back(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let folded = if t < 0.5 { 2.0 * t } else { 2.0 * (1.0 - t) };
    Ease::Smooth.apply(folded)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
