//! Five-point tone curve
//!
//! The control points are joined by a monotone cubic Hermite spline
//! (Fritsch–Carlson). This passes through every point, never overshoots, and
//! keeps a non-decreasing set of points non-decreasing. Inputs outside
//! `[x0, x4]` clamp to the end points. The curve is applied to R, G and B
//! independently.
//!
//! Failure: points outside `[0, 1]`, x not strictly increasing, or y
//! decreasing.

use super::parallel::map_rgb;
use super::{ToneCurveParams, TransformKind};
use crate::error::{EngineError, Result};
use crate::raster::WorkingImage;

const POINTS: usize = 5;

/// Prepared monotone spline through five control points.
#[derive(Debug, Clone, PartialEq)]
pub struct MonotoneCurve {
    xs: [f32; POINTS],
    ys: [f32; POINTS],
    tangents: [f32; POINTS],
}

impl MonotoneCurve {
    /// Validate the control points and compute spline tangents.
    pub fn new(points: &[(f32, f32); POINTS]) -> Result<Self> {
        let kind = TransformKind::ToneCurve;
        for (i, &(x, y)) in points.iter().enumerate() {
            if !(x.is_finite() && y.is_finite()) || !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y)
            {
                return Err(EngineError::invalid_params(
                    kind,
                    format!("point {} ({}, {}) must lie within [0, 1]", i, x, y),
                ));
            }
        }
        for i in 1..POINTS {
            if points[i].0 <= points[i - 1].0 {
                return Err(EngineError::invalid_params(
                    kind,
                    format!("x must be strictly increasing at point {}", i),
                ));
            }
            if points[i].1 < points[i - 1].1 {
                return Err(EngineError::invalid_params(
                    kind,
                    format!("y must not decrease at point {}", i),
                ));
            }
        }

        let xs = points.map(|p| p.0);
        let ys = points.map(|p| p.1);

        let mut secants = [0.0f32; POINTS - 1];
        for k in 0..POINTS - 1 {
            secants[k] = (ys[k + 1] - ys[k]) / (xs[k + 1] - xs[k]);
        }

        let mut tangents = [0.0f32; POINTS];
        tangents[0] = secants[0];
        tangents[POINTS - 1] = secants[POINTS - 2];
        for k in 1..POINTS - 1 {
            tangents[k] = if secants[k - 1] * secants[k] <= 0.0 {
                0.0
            } else {
                (secants[k - 1] + secants[k]) / 2.0
            };
        }

        // Fritsch–Carlson: limit tangents so each segment stays monotone
        for k in 0..POINTS - 1 {
            if secants[k] == 0.0 {
                tangents[k] = 0.0;
                tangents[k + 1] = 0.0;
                continue;
            }
            let a = tangents[k] / secants[k];
            let b = tangents[k + 1] / secants[k];
            let s = a * a + b * b;
            if s > 9.0 {
                let tau = 3.0 / s.sqrt();
                tangents[k] = tau * a * secants[k];
                tangents[k + 1] = tau * b * secants[k];
            }
        }

        Ok(Self { xs, ys, tangents })
    }

    /// Evaluate the curve at `x`.
    pub fn eval(&self, x: f32) -> f32 {
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[POINTS - 1] {
            return self.ys[POINTS - 1];
        }

        let k = (0..POINTS - 1)
            .find(|&k| x < self.xs[k + 1])
            .unwrap_or(POINTS - 2);

        let h = self.xs[k + 1] - self.xs[k];
        let t = (x - self.xs[k]) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * self.ys[k]
            + h10 * h * self.tangents[k]
            + h01 * self.ys[k + 1]
            + h11 * h * self.tangents[k + 1]
    }
}

pub(crate) fn tone_curve(
    input: &WorkingImage,
    params: &ToneCurveParams,
    threshold: usize,
) -> Result<WorkingImage> {
    let curve = MonotoneCurve::new(&params.points)?;
    Ok(map_rgb(input, threshold, |[r, g, b]| {
        [curve.eval(r), curve.eval(g), curve.eval(b)]
    }))
}
