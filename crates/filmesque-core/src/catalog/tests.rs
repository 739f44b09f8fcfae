use super::*;

use std::collections::HashSet;

use tempfile::tempdir;

use crate::transforms::TransformStep;

fn tiny_catalog() -> Vec<FilterDefinition> {
    vec![
        FilterDefinition::identity("none", "None"),
        FilterDefinition::new("flip", "Flip", false, vec![TransformStep::Invert]),
    ]
}

// ============================================================================
// Built-in catalog
// ============================================================================

#[test]
fn test_builtin_shape() {
    let catalog = Catalog::builtin();
    assert_eq!(catalog.len(), 19);
    assert!(catalog.identity().is_identity());
    assert_eq!(catalog.identity().id().as_str(), ids::ORIGINAL);
    assert_eq!(catalog.iter().filter(|f| f.is_premium_only()).count(), 8);

    let unique: HashSet<_> = catalog.iter().map(|f| f.id().clone()).collect();
    assert_eq!(unique.len(), catalog.len());
}

#[test]
fn test_builtin_passes_validation() {
    let catalog = Catalog::new(Catalog::standard().entries().to_vec());
    assert!(catalog.is_ok(), "{:?}", catalog.err());
}

#[test]
fn test_builtin_order_and_names() {
    let names: Vec<&str> = Catalog::builtin().iter().map(|f| f.display_name()).collect();
    assert_eq!(
        names,
        [
            "Original",
            "Vintage",
            "B&W",
            "Warm",
            "Cool",
            "Fade",
            "Grain",
            "Negative",
            "Positive",
            "Polaroid",
            "Sepia",
            "Cinematic",
            "Lomography",
            "Portra 400",
            "Portra 800",
            "Kodachrome",
            "Ektachrome",
            "Fuji Superior",
            "Fuji Acros",
        ]
    );
}

#[test]
fn test_builtin_recipes() {
    let catalog = Catalog::builtin();
    assert_eq!(
        catalog.get(ids::VINTAGE).unwrap().recipe(),
        [TransformStep::sepia(0.7), TransformStep::vignette(0.5, 1.5)]
    );
    assert_eq!(
        catalog.get(ids::FUJI_ACROS).unwrap().recipe(),
        [
            TransformStep::GrayscaleMono,
            TransformStep::color_controls(1.0, 0.0, 1.1),
            TransformStep::grain(0.1),
        ]
    );
    assert_eq!(
        catalog.get(ids::KODACHROME).unwrap().recipe(),
        [
            TransformStep::color_controls(1.2, 0.0, 1.15),
            TransformStep::temperature(6500.0, 5800.0),
        ]
    );
}

#[test]
fn test_lookups() {
    let catalog = Catalog::builtin();
    let portra = catalog.get(ids::PORTRA_400).unwrap();

    assert_eq!(catalog.by_display_name("Portra 400"), Some(portra));
    assert_eq!(catalog.index_of(ids::PORTRA_400), Some(13));
    assert_eq!(catalog.by_index(13), Some(portra));
    assert!(catalog.get("missing").is_none());
    assert!(matches!(
        catalog.require("missing"),
        Err(EngineError::UnknownFilter(id)) if id == "missing"
    ));
}

#[test]
fn test_description() {
    let sepia = Catalog::builtin().get(ids::SEPIA).unwrap();
    assert_eq!(sepia.description(), "Apply Sepia film effect");
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_rejects_empty_catalog() {
    assert!(matches!(Catalog::new(Vec::new()), Err(EngineError::InvalidCatalog(_))));
}

#[test]
fn test_rejects_non_identity_first_entry() {
    let mut entries = tiny_catalog();
    entries.swap(0, 1);
    assert!(matches!(Catalog::new(entries), Err(EngineError::InvalidCatalog(_))));
}

#[test]
fn test_rejects_second_identity() {
    let mut entries = tiny_catalog();
    entries.push(FilterDefinition::identity("again", "Again"));
    assert!(Catalog::new(entries).is_err());
}

#[test]
fn test_rejects_duplicate_ids() {
    let mut entries = tiny_catalog();
    entries.push(FilterDefinition::new("flip", "Flip 2", false, vec![TransformStep::Invert]));
    assert!(Catalog::new(entries).is_err());
}

#[test]
fn test_rejects_invalid_step() {
    let mut entries = tiny_catalog();
    entries.push(FilterDefinition::new(
        "broken",
        "Broken",
        false,
        vec![TransformStep::vignette(0.5, -1.0)],
    ));
    let err = Catalog::new(entries).unwrap_err();
    assert!(err.to_string().contains("broken"), "{}", err);
}

#[test]
fn test_rejects_blank_display_name() {
    let mut entries = tiny_catalog();
    entries.push(FilterDefinition::new("blank", "  ", false, vec![TransformStep::Invert]));
    assert!(Catalog::new(entries).is_err());
}

#[test]
fn test_validate_filter_id() {
    assert!(validate_filter_id("portra_400").is_ok());
    assert!(validate_filter_id("").is_err());
    assert!(validate_filter_id("a/b").is_err());
    assert!(validate_filter_id("a\\b").is_err());
    assert!(validate_filter_id("..").is_err());
    assert!(validate_filter_id(".hidden").is_err());
    assert!(validate_filter_id("nul\0").is_err());
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn test_yaml_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.yml");

    save_catalog(Catalog::builtin(), &path).unwrap();
    let loaded = load_catalog(&path).unwrap();
    assert_eq!(&loaded, Catalog::builtin());
}

#[test]
fn test_load_hand_written_catalog() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.yaml");
    std::fs::write(
        &path,
        "filters:\n\
         \x20 - id: original\n\
         \x20   display_name: Original\n\
         \x20 - id: moody\n\
         \x20   display_name: Moody\n\
         \x20   is_premium_only: true\n\
         \x20   recipe:\n\
         \x20     - kind: color_controls\n\
         \x20       saturation: 0.7\n\
         \x20     - kind: vignette\n\
         \x20       intensity: 0.4\n\
         \x20       radius: 1.2\n",
    )
    .unwrap();

    let catalog = load_catalog(&path).unwrap();
    let moody = catalog.get("moody").unwrap();
    assert!(moody.is_premium_only());
    assert_eq!(
        moody.recipe(),
        [
            TransformStep::color_controls(0.7, 0.0, 1.0),
            TransformStep::vignette(0.4, 1.2),
        ]
    );
}

#[test]
fn test_load_rejects_invalid_catalog_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.yml");
    std::fs::write(
        &path,
        "filters:\n  - id: vintage\n    display_name: Vintage\n    recipe:\n      - kind: invert\n",
    )
    .unwrap();
    assert!(matches!(load_catalog(&path), Err(EngineError::InvalidCatalog(_))));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        load_catalog(dir.path().join("absent.yml")),
        Err(EngineError::Io(_))
    ));
}
