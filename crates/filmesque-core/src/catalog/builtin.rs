//! Built-in film looks.

use super::FilterDefinition;
use crate::transforms::TransformStep as T;

/// Ids of the built-in filters.
pub mod ids {
    pub const ORIGINAL: &str = "original";
    pub const VINTAGE: &str = "vintage";
    pub const BLACK_AND_WHITE: &str = "black_and_white";
    pub const WARM: &str = "warm";
    pub const COOL: &str = "cool";
    pub const FADE: &str = "fade";
    pub const GRAIN: &str = "grain";
    pub const NEGATIVE: &str = "negative";
    pub const POSITIVE: &str = "positive";
    pub const POLAROID: &str = "polaroid";
    pub const SEPIA: &str = "sepia";
    pub const CINEMATIC: &str = "cinematic";
    pub const LOMOGRAPHY: &str = "lomography";
    pub const PORTRA_400: &str = "portra_400";
    pub const PORTRA_800: &str = "portra_800";
    pub const KODACHROME: &str = "kodachrome";
    pub const EKTACHROME: &str = "ektachrome";
    pub const FUJI_SUPERIOR: &str = "fuji_superior";
    pub const FUJI_ACROS: &str = "fuji_acros";
}

const NEUTRAL: f32 = 6500.0;

/// Crushed shadows and rolled highlights.
const CINEMATIC_CURVE: [(f32, f32); 5] = [(0.0, 0.0), (0.25, 0.2), (0.5, 0.5), (0.75, 0.8), (1.0, 1.0)];

fn free(id: &str, name: &str, recipe: Vec<T>) -> FilterDefinition {
    FilterDefinition::new(id, name, false, recipe)
}

fn premium(id: &str, name: &str, recipe: Vec<T>) -> FilterDefinition {
    FilterDefinition::new(id, name, true, recipe)
}

pub(super) fn builtin_filters() -> Vec<FilterDefinition> {
    vec![
        FilterDefinition::identity(ids::ORIGINAL, "Original"),
        free(ids::VINTAGE, "Vintage", vec![T::sepia(0.7), T::vignette(0.5, 1.5)]),
        free(ids::BLACK_AND_WHITE, "B&W", vec![T::GrayscaleMono]),
        free(ids::WARM, "Warm", vec![T::temperature(NEUTRAL, 5000.0)]),
        free(ids::COOL, "Cool", vec![T::temperature(NEUTRAL, 8000.0)]),
        free(ids::FADE, "Fade", vec![T::color_controls(0.6, 0.05, 0.9)]),
        free(ids::GRAIN, "Grain", vec![T::grain(0.1)]),
        free(ids::NEGATIVE, "Negative", vec![T::Invert]),
        free(
            ids::POSITIVE,
            "Positive",
            vec![T::color_controls(1.2, 0.0, 1.1), T::vignette(0.3, 1.5)],
        ),
        free(
            ids::POLAROID,
            "Polaroid",
            vec![
                T::temperature(NEUTRAL, 6000.0),
                T::color_controls(1.15, 0.0, 1.1),
                T::vignette(0.2, 1.5),
            ],
        ),
        free(ids::SEPIA, "Sepia", vec![T::sepia(1.0)]),
        premium(
            ids::CINEMATIC,
            "Cinematic",
            vec![
                T::color_controls(0.8, 0.0, 1.2),
                T::tone_curve(CINEMATIC_CURVE),
                T::vignette(0.4, 1.0),
            ],
        ),
        premium(
            ids::LOMOGRAPHY,
            "Lomography",
            vec![T::color_controls(1.3, 0.0, 1.2), T::vignette(0.6, 0.9)],
        ),
        premium(
            ids::PORTRA_400,
            "Portra 400",
            vec![T::temperature(NEUTRAL, 5500.0), T::color_controls(0.85, 0.0, 1.05)],
        ),
        premium(
            ids::PORTRA_800,
            "Portra 800",
            vec![T::temperature(NEUTRAL, 5200.0), T::color_controls(0.9, 0.0, 1.1)],
        ),
        premium(
            ids::KODACHROME,
            "Kodachrome",
            vec![T::color_controls(1.2, 0.0, 1.15), T::temperature(NEUTRAL, 5800.0)],
        ),
        premium(
            ids::EKTACHROME,
            "Ektachrome",
            vec![T::color_controls(1.1, 0.0, 1.2), T::temperature(NEUTRAL, 7000.0)],
        ),
        premium(
            ids::FUJI_SUPERIOR,
            "Fuji Superior",
            vec![T::color_controls(0.95, 0.0, 1.05), T::temperature(NEUTRAL, 6700.0)],
        ),
        premium(
            ids::FUJI_ACROS,
            "Fuji Acros",
            vec![T::GrayscaleMono, T::color_controls(1.0, 0.0, 1.1), T::grain(0.1)],
        ),
    ]
}
