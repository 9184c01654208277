//! Common types shared across the eos-plot workspace.

pub mod bbox;
pub mod error;
pub mod field;
pub mod grid;
pub mod swath;
pub mod units;

pub use bbox::BoundingBox;
pub use error::{PlotError, PlotResult};
pub use field::DataField;
pub use grid::GeoGrid;
pub use swath::Swath;
pub use units::UnitConversion;
