//! Application-facing API
//!
//! The overlay session ties a point catalog, the location of the observer
//! and the projector together; scenario replay drives the full pipeline from
//! recorded input.

pub mod scenario;
pub mod session;
pub mod types;

// Re-export commonly used API types
pub use scenario::{Frame, Scenario, ScenarioReport};
pub use session::{InMemoryCatalog, OverlaySession, PointCatalog};
pub use types::{ApiError, ApiResult, LocationFix, LocationUpdate, ProjectedPoint};
