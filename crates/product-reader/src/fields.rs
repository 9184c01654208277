//! Reading and decoding named fields.

use eos_common::DataField;
use tracing::debug;

use crate::decode::{decode, DecodeRules, VarAttrs};
use crate::error::{ReadError, ReadResult};
use crate::file::ScienceFile;
use crate::shape::{slice_axis, transpose2d};

/// A raw array read from a file, before decoding.
#[derive(Debug, Clone)]
pub struct RawField {
    pub name: String,
    pub values: Vec<f64>,
    pub dims: Vec<usize>,
    pub attrs: VarAttrs,
}

/// Everything needed to extract one decoded field from an open file.
#[derive(Debug, Clone, Default)]
pub struct FieldRequest {
    /// `/`-separated dataset path.
    pub path: String,
    /// `(axis, index)` selections applied in order after reading.
    pub slices: Vec<(usize, usize)>,
    /// Swap rows and columns after slicing (for `[x, y]`-ordered storage).
    pub transpose: bool,
    /// Fill/scale/offset handling.
    pub rules: DecodeRules,
}

/// Read a variable's full array as f64 along with its decode attributes.
pub fn read_raw(file: &ScienceFile, path: &str) -> ReadResult<RawField> {
    let (dims, values, attrs) = file
        .with_variable(path, |var| {
            let dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
            let values: Result<Vec<f64>, _> = var.get_values(..);
            let attrs = VarAttrs::collect(var);
            (dims, values, attrs)
        })
        .ok_or_else(|| ReadError::MissingVariable(path.to_string()))?;

    let values = values.map_err(|e| ReadError::VariableRead {
        variable: path.to_string(),
        message: e.to_string(),
    })?;
    debug!(
        variable = path,
        ?dims,
        fill = ?attrs.fill_value,
        scale = ?attrs.scale_factor,
        offset = ?attrs.add_offset,
        "Read raw field"
    );

    Ok(RawField {
        name: dataset_name(path).to_string(),
        values,
        dims,
        attrs,
    })
}

/// Read, slice, and decode a field down to 2-D (or 1-D for profiles).
pub fn extract_field(file: &ScienceFile, request: &FieldRequest) -> ReadResult<DataField> {
    let raw = read_raw(file, &request.path)?;

    let mut values = raw.values;
    let mut dims = raw.dims;
    for &(axis, index) in &request.slices {
        let (v, d) = slice_axis(&values, &dims, axis, index, &request.path)?;
        values = v;
        dims = d;
    }

    let (width, height) = match dims.as_slice() {
        [n] => (*n, 1),
        [h, w] => (*w, *h),
        other => {
            return Err(ReadError::Shape {
                variable: request.path.clone(),
                message: format!(
                    "expected 1-D or 2-D after slicing, got {} dims {:?}",
                    other.len(),
                    other
                ),
            })
        }
    };

    let (values, width, height) = if request.transpose {
        if height == 1 {
            return Err(ReadError::Shape {
                variable: request.path.clone(),
                message: "transpose requested for a 1-D field".to_string(),
            });
        }
        (transpose2d(&values, width, height), height, width)
    } else {
        (values, width, height)
    };

    let decoded = decode(&values, &raw.attrs, &request.rules);

    let mut field = DataField::new(raw.name, decoded, width, height);
    field.units = raw.attrs.units.clone();
    field.long_name = raw.attrs.long_name.clone();
    Ok(field)
}

/// Last path segment: the dataset's own name.
fn dataset_name(path: &str) -> &str {
    path.rsplit('/').find(|p| !p.is_empty()).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_name() {
        assert_eq!(dataset_name("CMI"), "CMI");
        assert_eq!(
            dataset_name("/HDFEOS/SWATHS/O3/Data Fields/O3"),
            "O3"
        );
        assert_eq!(dataset_name("Grid/precipitation"), "precipitation");
    }
}
