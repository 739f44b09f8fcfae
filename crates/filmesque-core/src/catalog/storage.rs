//! Catalog files
//!
//! A catalog file is YAML with a single `filters` list, in catalog order:
//!
//! ```yaml
//! filters:
//!   - id: original
//!     display_name: Original
//!   - id: vintage
//!     display_name: Vintage
//!     recipe:
//!       - kind: sepia_tone
//!         intensity: 0.7
//!       - kind: vignette
//!         intensity: 0.5
//!         radius: 1.5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Catalog, FilterDefinition};
use crate::error::{EngineError, Result};

#[derive(Serialize, Deserialize)]
struct CatalogFile {
    filters: Vec<FilterDefinition>,
}

/// Check that a filter id is a plain slug that is safe to use as a file stem.
pub fn validate_filter_id(id: &str) -> Result<()> {
    let problem = if id.is_empty() {
        "cannot be empty"
    } else if id.contains('/') || id.contains('\\') {
        "cannot contain path separators"
    } else if id.contains("..") {
        "cannot contain '..'"
    } else if id.starts_with('.') {
        "cannot start with '.'"
    } else if id.contains('\0') {
        "cannot contain null bytes"
    } else {
        return Ok(());
    };

    Err(EngineError::InvalidCatalog(format!(
        "filter id '{}' {}",
        id.escape_debug(),
        problem
    )))
}

/// Load and validate a catalog from a YAML file.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let file: CatalogFile = serde_yaml::from_str(&contents)?;
    Catalog::new(file.filters)
}

/// Write a catalog to a YAML file.
pub fn save_catalog<P: AsRef<Path>>(catalog: &Catalog, path: P) -> Result<()> {
    let file = CatalogFile {
        filters: catalog.entries().to_vec(),
    };
    let yaml = serde_yaml::to_string(&file)?;
    std::fs::write(path.as_ref(), yaml)?;
    log::debug!(
        "saved catalog with {} filters to {}",
        catalog.len(),
        path.as_ref().display()
    );
    Ok(())
}
