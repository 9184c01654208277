//! Scientific data file access for the eos-plot pipeline.
//!
//! One product input file is opened through the `netcdf` crate (libnetcdf
//! wraps HDF5, so netCDF-4 and HDF-EOS5 come for free; an HDF4-enabled
//! libnetcdf reads HDF4 SD data sets through the same API). This crate
//! detects the container format, resolves group-qualified dataset paths,
//! collects CF and HDF-EOS attributes, and decodes raw arrays into
//! physical-unit fields where NaN is the only missing-data marker.

pub mod decode;
pub mod error;
pub mod fields;
pub mod file;
pub mod format;
pub mod geolocation;
pub mod shape;

pub use decode::{DecodeRules, ScaleConvention, VarAttrs};
pub use error::{ReadError, ReadResult};
pub use fields::{extract_field, FieldRequest, RawField};
pub use file::{silence_hdf5_errors, ScienceFile};
pub use format::{detect_format, FileFormat};
pub use geolocation::{read_coordinate_axes, read_swath_geolocation, CoordinateGrid};
