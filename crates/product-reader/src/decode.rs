//! Fill masking and scale/offset decoding.
//!
//! Raw arrays are read as `f64` (the C library converts integer storage
//! types losslessly) and decoded to `f32` physical values. Masking always
//! precedes scaling: a fill sentinel is never scaled.

use num_traits::Float;

/// Attributes collected from a variable that drive decoding.
#[derive(Debug, Clone, Default)]
pub struct VarAttrs {
    pub fill_value: Option<f64>,
    pub scale_factor: Option<f64>,
    pub add_offset: Option<f64>,
    pub valid_range: Option<(f64, f64)>,
    pub units: Option<String>,
    pub long_name: Option<String>,
}

impl VarAttrs {
    /// Collect decode-relevant attributes from a variable.
    pub fn collect(var: &netcdf::Variable) -> Self {
        let valid_range = pair_attr(var, "valid_range").or_else(|| {
            match (numeric_attr(var, "valid_min"), numeric_attr(var, "valid_max")) {
                (Some(lo), Some(hi)) => Some((lo, hi)),
                _ => None,
            }
        });

        Self {
            fill_value: numeric_attr(var, "_FillValue"),
            scale_factor: numeric_attr(var, "scale_factor"),
            add_offset: numeric_attr(var, "add_offset"),
            valid_range,
            units: string_attr(var, "units"),
            long_name: string_attr(var, "long_name"),
        }
    }
}

/// Which packing convention recovers physical units from stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleConvention {
    /// CF packing: `physical = raw * scale + offset`.
    /// Used by netCDF-4 products (GPM, MERRA-2, GOES, ...).
    #[default]
    CfPacked,
    /// HDF-EOS packing: `physical = (raw - offset) * scale`.
    /// Used by MODIS and AIRS HDF4 products.
    HdfEos,
}

impl ScaleConvention {
    /// Recover a physical value from a raw stored value.
    pub fn apply(&self, raw: f64, scale: f64, offset: f64) -> f64 {
        match self {
            Self::CfPacked => raw * scale + offset,
            Self::HdfEos => (raw - offset) * scale,
        }
    }
}

/// Per-product overrides and the packing convention.
///
/// Any `Some` field takes precedence over the corresponding file attribute;
/// some products carry wrong or missing attributes and the product table is
/// the place to patch them.
#[derive(Debug, Clone, Default)]
pub struct DecodeRules {
    pub convention: ScaleConvention,
    pub fill_value: Option<f64>,
    pub scale_factor: Option<f64>,
    pub add_offset: Option<f64>,
    pub valid_range: Option<(f64, f64)>,
}

/// Decode raw values to physical `f32`s.
///
/// Order of operations, matching what every product expects:
/// 1. non-finite raw values become NaN
/// 2. values equal to the fill sentinel become NaN
/// 3. values outside the valid range become NaN
/// 4. surviving values get the scale/offset convention applied
pub fn decode(raw: &[f64], attrs: &VarAttrs, rules: &DecodeRules) -> Vec<f32> {
    let fill = rules.fill_value.or(attrs.fill_value);
    let valid_range = rules.valid_range.or(attrs.valid_range);
    let scale = rules.scale_factor.or(attrs.scale_factor).unwrap_or(1.0);
    let offset = rules.add_offset.or(attrs.add_offset).unwrap_or(0.0);

    raw.iter()
        .map(|&v| {
            if !v.is_finite() {
                return f32::NAN;
            }
            if let Some(fill) = fill {
                if v == fill {
                    return f32::NAN;
                }
            }
            if let Some((lo, hi)) = valid_range {
                if v < lo || v > hi {
                    return f32::NAN;
                }
            }
            rules.convention.apply(v, scale, offset) as f32
        })
        .collect()
}

/// Relative closeness for floating point comparisons where exactness is
/// not meaningful (e.g. coordinate spacing uniformity).
pub fn is_close<T: Float>(a: T, b: T, rel_tol: T) -> bool {
    let diff = (a - b).abs();
    let scale = a.abs().max(b.abs()).max(T::one());
    diff <= rel_tol * scale
}

// =============================================================================
// Attribute helpers
// =============================================================================

/// Check if a variable has an attribute with the given name.
/// This avoids probing the C library for attributes that don't exist.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Read a numeric attribute as f64. One-element arrays count as scalars;
/// some producers write `_FillValue` that way.
pub fn numeric_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let value = var.attribute_value(name)?.ok()?;
    attr_to_f64(&value)
}

/// Read a two-element numeric attribute (e.g. `valid_range`).
pub fn pair_attr(var: &netcdf::Variable, name: &str) -> Option<(f64, f64)> {
    if !has_attr(var, name) {
        return None;
    }
    let value = var.attribute_value(name)?.ok()?;
    let values = attr_to_vec(&value)?;
    if values.len() == 2 {
        Some((values[0], values[1]))
    } else {
        None
    }
}

/// Read a string attribute.
pub fn string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        netcdf::AttributeValue::Strs(v) => v.into_iter().next(),
        _ => None,
    }
}

fn attr_to_f64(value: &netcdf::AttributeValue) -> Option<f64> {
    attr_to_vec(value).and_then(|v| v.first().copied())
}

fn attr_to_vec(value: &netcdf::AttributeValue) -> Option<Vec<f64>> {
    use netcdf::AttributeValue::*;
    match value {
        Uchar(v) => Some(vec![*v as f64]),
        Schar(v) => Some(vec![*v as f64]),
        Ushort(v) => Some(vec![*v as f64]),
        Short(v) => Some(vec![*v as f64]),
        Uint(v) => Some(vec![*v as f64]),
        Int(v) => Some(vec![*v as f64]),
        Ulonglong(v) => Some(vec![*v as f64]),
        Longlong(v) => Some(vec![*v as f64]),
        Float(v) => Some(vec![*v as f64]),
        Double(v) => Some(vec![*v]),
        Uchars(v) => Some(v.iter().map(|&x| x as f64).collect()),
        Schars(v) => Some(v.iter().map(|&x| x as f64).collect()),
        Ushorts(v) => Some(v.iter().map(|&x| x as f64).collect()),
        Shorts(v) => Some(v.iter().map(|&x| x as f64).collect()),
        Uints(v) => Some(v.iter().map(|&x| x as f64).collect()),
        Ints(v) => Some(v.iter().map(|&x| x as f64).collect()),
        Ulonglongs(v) => Some(v.iter().map(|&x| x as f64).collect()),
        Longlongs(v) => Some(v.iter().map(|&x| x as f64).collect()),
        Floats(v) => Some(v.iter().map(|&x| x as f64).collect()),
        Doubles(v) => Some(v.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cf_packed_decoding() {
        // GOES-style: i16 storage, scale + offset, -1 fill
        let attrs = VarAttrs {
            fill_value: Some(-1.0),
            scale_factor: Some(0.5),
            add_offset: Some(10.0),
            ..Default::default()
        };
        let out = decode(&[-1.0, 0.0, 4.0], &attrs, &DecodeRules::default());
        assert!(out[0].is_nan());
        assert_eq!(out[1], 10.0);
        assert_eq!(out[2], 12.0);
    }

    #[test]
    fn test_hdf_eos_decoding() {
        // MODIS-style: physical = (raw - offset) * scale
        let attrs = VarAttrs {
            fill_value: Some(-9999.0),
            scale_factor: Some(0.001),
            add_offset: Some(0.0),
            ..Default::default()
        };
        let rules = DecodeRules {
            convention: ScaleConvention::HdfEos,
            ..Default::default()
        };
        let out = decode(&[-9999.0, 1500.0], &attrs, &rules);
        assert!(out[0].is_nan());
        assert!((out[1] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_fill_is_masked_before_scaling() {
        // If the sentinel were scaled first it would land inside the valid
        // range and leak through.
        let attrs = VarAttrs {
            fill_value: Some(-9999.0),
            scale_factor: Some(-1.0),
            add_offset: Some(0.0),
            valid_range: Some((-10000.0, 10000.0)),
            ..Default::default()
        };
        let out = decode(&[-9999.0], &attrs, &DecodeRules::default());
        assert!(out[0].is_nan());
    }

    #[test]
    fn test_valid_range_masking() {
        let attrs = VarAttrs {
            valid_range: Some((0.0, 100.0)),
            ..Default::default()
        };
        let out = decode(&[-5.0, 50.0, 105.0], &attrs, &DecodeRules::default());
        assert!(out[0].is_nan());
        assert_eq!(out[1], 50.0);
        assert!(out[2].is_nan());
    }

    #[test]
    fn test_rules_override_attributes() {
        let attrs = VarAttrs {
            fill_value: Some(-1.0),
            scale_factor: Some(2.0),
            ..Default::default()
        };
        let rules = DecodeRules {
            fill_value: Some(255.0),
            scale_factor: Some(1.0),
            ..Default::default()
        };
        let out = decode(&[-1.0, 255.0, 3.0], &attrs, &rules);
        // -1 is data under the override, 255 is the fill
        assert_eq!(out[0], -1.0);
        assert!(out[1].is_nan());
        assert_eq!(out[2], 3.0);
    }

    #[test]
    fn test_nan_raw_stays_nan() {
        let out = decode(&[f64::NAN, 1.0], &VarAttrs::default(), &DecodeRules::default());
        assert!(out[0].is_nan());
        assert_eq!(out[1], 1.0);
    }

    #[test]
    fn test_is_close() {
        assert!(is_close(1.0_f64, 1.0 + 1e-12, 1e-9));
        assert!(!is_close(1.0_f64, 1.1, 1e-9));
    }
}
