//! Map projections and raster resampling.
//!
//! Implements the projections the product gallery needs from scratch:
//! equirectangular, polar stereographic (both hemispheres), and sinusoidal
//! (including the MODIS sinusoidal grid geometry). Output map rasters are
//! produced by inverse-projecting each output pixel and sampling the
//! source grid or swath.

pub mod geographic;
pub mod resample;
pub mod sinusoidal;
pub mod stereographic;
pub mod transform;

pub use geographic::PlateCarree;
pub use resample::{resample_grid, resample_swath, SwathIndex};
pub use sinusoidal::{Sinusoidal, SinusoidalGrid};
pub use stereographic::PolarStereographic;
pub use transform::{MapRegion, Projection};

/// Mean Earth radius used by the spherical projections (meters).
pub const EARTH_RADIUS_M: f64 = 6_370_997.0;

/// Sphere radius of the MODIS sinusoidal grid (meters).
pub const MODIS_SPHERE_RADIUS_M: f64 = 6_371_007.181;
