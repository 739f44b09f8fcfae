//! Transform library
//!
//! Pure image-to-image operations with parameters fixed when a recipe is
//! built. Every transform:
//! - works on gamma-encoded RGB in `[0, 1]` and clamps its output to that range
//! - leaves alpha untouched, except `NoiseGrain` which composites over it
//! - returns an image with the same dimensions as its input
//!
//! A transform fails when its parameters are invalid or its output contains a
//! non-finite value. The composer treats a failure as "pass the stage input
//! through", see [`crate::pipeline::apply_recipe`].

mod color_controls;
mod grain;
mod invert;
mod mono;
mod parallel;
mod sepia;
mod temperature;
mod tone_curve;
mod vignette;


pub use grain::noise_value;
pub use tone_curve::MonotoneCurve;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::{KELVIN_MAX, KELVIN_MIN};
use crate::error::{EngineError, Result};
use crate::pipeline::RenderContext;
use crate::raster::{Image, WorkingImage};

/// Discriminant of a [`TransformStep`], used in logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    SepiaTone,
    Vignette,
    TemperatureShift,
    ColorControls,
    ToneCurve,
    GrayscaleMono,
    Invert,
    NoiseGrain,
}

impl TransformKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SepiaTone => "SepiaTone",
            Self::Vignette => "Vignette",
            Self::TemperatureShift => "TemperatureShift",
            Self::ColorControls => "ColorControls",
            Self::ToneCurve => "ToneCurve",
            Self::GrayscaleMono => "GrayscaleMono",
            Self::Invert => "Invert",
            Self::NoiseGrain => "NoiseGrain",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Monochrome warm tint mixed in at a fixed strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SepiaParams {
    /// Mix between input (0.0) and full sepia (1.0)
    pub intensity: f32,
}

/// Edge darkening around the image centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VignetteParams {
    /// Darkening at full falloff (0.0 to 1.0)
    pub intensity: f32,
    /// Falloff radius relative to the half-diagonal; larger is gentler
    pub radius: f32,
}

/// White-balance remap between two color temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureParams {
    /// Reference neutral in Kelvin
    #[serde(default = "default_neutral_kelvin")]
    pub from_kelvin: f32,
    /// Target neutral in Kelvin; below the reference warms, above cools
    pub to_kelvin: f32,
}

fn default_neutral_kelvin() -> f32 {
    6500.0
}

/// Independent saturation, brightness and contrast adjustments.
///
/// Unspecified fields default to identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorControlsParams {
    #[serde(default = "default_gain")]
    pub saturation: f32,
    #[serde(default)]
    pub brightness: f32,
    #[serde(default = "default_gain")]
    pub contrast: f32,
}

fn default_gain() -> f32 {
    1.0
}

impl Default for ColorControlsParams {
    fn default() -> Self {
        Self {
            saturation: 1.0,
            brightness: 0.0,
            contrast: 1.0,
        }
    }
}

/// Five `(x, y)` control points of a monotone tone curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneCurveParams {
    pub points: [(f32, f32); 5],
}

impl ToneCurveParams {
    pub const IDENTITY: Self = Self {
        points: [(0.0, 0.0), (0.25, 0.25), (0.5, 0.5), (0.75, 0.75), (1.0, 1.0)],
    };
}

impl Default for ToneCurveParams {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Gray noise composited over the input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrainParams {
    /// Opacity of the noise layer (0.0 to 1.0)
    pub amount: f32,
}

/// One stage of a filter recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformStep {
    SepiaTone(SepiaParams),
    Vignette(VignetteParams),
    TemperatureShift(TemperatureParams),
    ColorControls(ColorControlsParams),
    ToneCurve(ToneCurveParams),
    GrayscaleMono,
    Invert,
    NoiseGrain(GrainParams),
}

impl TransformStep {
    pub fn sepia(intensity: f32) -> Self {
        Self::SepiaTone(SepiaParams { intensity })
    }

    pub fn vignette(intensity: f32, radius: f32) -> Self {
        Self::Vignette(VignetteParams { intensity, radius })
    }

    pub fn temperature(from_kelvin: f32, to_kelvin: f32) -> Self {
        Self::TemperatureShift(TemperatureParams {
            from_kelvin,
            to_kelvin,
        })
    }

    pub fn color_controls(saturation: f32, brightness: f32, contrast: f32) -> Self {
        Self::ColorControls(ColorControlsParams {
            saturation,
            brightness,
            contrast,
        })
    }

    pub fn tone_curve(points: [(f32, f32); 5]) -> Self {
        Self::ToneCurve(ToneCurveParams { points })
    }

    pub fn grain(amount: f32) -> Self {
        Self::NoiseGrain(GrainParams { amount })
    }

    pub fn kind(&self) -> TransformKind {
        match self {
            Self::SepiaTone(_) => TransformKind::SepiaTone,
            Self::Vignette(_) => TransformKind::Vignette,
            Self::TemperatureShift(_) => TransformKind::TemperatureShift,
            Self::ColorControls(_) => TransformKind::ColorControls,
            Self::ToneCurve(_) => TransformKind::ToneCurve,
            Self::GrayscaleMono => TransformKind::GrayscaleMono,
            Self::Invert => TransformKind::Invert,
            Self::NoiseGrain(_) => TransformKind::NoiseGrain,
        }
    }

    /// Check parameters against each transform's valid ranges.
    pub fn validate(&self) -> Result<()> {
        let kind = self.kind();
        match self {
            Self::SepiaTone(p) => check_unit(kind, "intensity", p.intensity),
            Self::Vignette(p) => {
                check_unit(kind, "intensity", p.intensity)?;
                if !(p.radius.is_finite() && p.radius > 0.0) {
                    return Err(EngineError::invalid_params(
                        kind,
                        format!("radius must be positive, got {}", p.radius),
                    ));
                }
                Ok(())
            }
            Self::TemperatureShift(p) => {
                check_kelvin(kind, "from_kelvin", p.from_kelvin)?;
                check_kelvin(kind, "to_kelvin", p.to_kelvin)
            }
            Self::ColorControls(p) => {
                check_non_negative(kind, "saturation", p.saturation)?;
                check_non_negative(kind, "contrast", p.contrast)?;
                if !(p.brightness.is_finite() && (-1.0..=1.0).contains(&p.brightness)) {
                    return Err(EngineError::invalid_params(
                        kind,
                        format!("brightness must be within [-1, 1], got {}", p.brightness),
                    ));
                }
                Ok(())
            }
            Self::ToneCurve(p) => MonotoneCurve::new(&p.points).map(|_| ()),
            Self::GrayscaleMono | Self::Invert => Ok(()),
            Self::NoiseGrain(p) => check_unit(kind, "amount", p.amount),
        }
    }

    /// Run this stage on a working image.
    pub(crate) fn render(&self, input: &WorkingImage, ctx: &RenderContext) -> Result<WorkingImage> {
        let kind = self.kind();
        self.validate().map_err(|e| match e {
            EngineError::InvalidParameters { reason, .. } => EngineError::transform_failed(kind, reason),
            other => other,
        })?;

        let threshold = ctx.parallel_threshold();
        let output = match self {
            Self::SepiaTone(p) => sepia::sepia_tone(input, p, threshold),
            Self::Vignette(p) => vignette::vignette(input, p, threshold),
            Self::TemperatureShift(p) => temperature::temperature_shift(input, p, threshold),
            Self::ColorControls(p) => color_controls::color_controls(input, p, threshold),
            Self::ToneCurve(p) => tone_curve::tone_curve(input, p, threshold)?,
            Self::GrayscaleMono => mono::grayscale_mono(input, threshold),
            Self::Invert => invert::invert(input, threshold),
            Self::NoiseGrain(p) => grain::noise_grain(input, p, ctx.grain_seed(), threshold),
        };

        if !output.is_finite() {
            return Err(EngineError::transform_failed(
                kind,
                "produced non-finite pixel values",
            ));
        }
        Ok(output)
    }

    /// Apply this single stage to an 8-bit image.
    pub fn apply(&self, input: &Image, ctx: &RenderContext) -> Result<Image> {
        let working = WorkingImage::from_image(input);
        Ok(self.render(&working, ctx)?.to_image())
    }
}

fn check_unit(kind: TransformKind, field: &str, value: f32) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::invalid_params(
            kind,
            format!("{} must be within [0, 1], got {}", field, value),
        ))
    }
}

fn check_non_negative(kind: TransformKind, field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::invalid_params(
            kind,
            format!("{} must be non-negative, got {}", field, value),
        ))
    }
}

fn check_kelvin(kind: TransformKind, field: &str, value: f32) -> Result<()> {
    if value.is_finite() && (KELVIN_MIN..=KELVIN_MAX).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::invalid_params(
            kind,
            format!(
                "{} must be within [{}, {}] K, got {}",
                field, KELVIN_MIN, KELVIN_MAX, value
            ),
        ))
    }
}
