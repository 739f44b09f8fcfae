//! Filmesque Core Library
//!
//! Film-look filter engine: an ordered transform pipeline, a global intensity
//! blend, and a concurrent preview generator for every filter in the catalog.

pub mod catalog;
pub mod color;
pub mod config;
pub mod entitlement;
pub mod error;
pub mod events;
pub mod export;
pub mod pipeline;
pub mod preview;
pub mod raster;
pub mod session;
pub mod transforms;

// Re-export commonly used types
pub use catalog::{load_catalog, save_catalog, Catalog, FilterDefinition, FilterId};
pub use config::{global_engine_config, load_engine_config, EngineConfig};
pub use entitlement::{is_unlocked, EntitlementSource, FilterAvailability};
pub use error::{EngineError, Result};
pub use events::{CallbackSink, EngineEvent, EventSink, NullSink};
pub use export::{ExportError, ImageSink};
pub use pipeline::{
    apply, apply_recipe, apply_steps, blend, blend_with_context, CancelToken, RenderContext,
};
pub use preview::{PreviewJob, PreviewScheduler, PreviewSet, PreviewSummary};
pub use raster::{Image, WorkingImage};
pub use session::{EditSession, SessionSnapshot};
pub use transforms::{TransformKind, TransformStep};
