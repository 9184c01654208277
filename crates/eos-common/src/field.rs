//! Decoded physical field values.

/// A decoded 2-D (or 1-D, with height 1) field in physical units.
///
/// NaN is the only missing-data marker; fill sentinels never survive
/// decoding.
#[derive(Debug, Clone)]
pub struct DataField {
    /// Dataset name the values came from.
    pub name: String,
    /// Physical units, from the `units` attribute or product config.
    pub units: Option<String>,
    /// Descriptive name, from the `long_name` attribute when present.
    pub long_name: Option<String>,
    /// Row-major values, NaN for missing.
    pub values: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl DataField {
    pub fn new(name: impl Into<String>, values: Vec<f32>, width: usize, height: usize) -> Self {
        debug_assert_eq!(values.len(), width * height);
        Self {
            name: name.into(),
            units: None,
            long_name: None,
            values,
            width,
            height,
        }
    }

    /// Minimum and maximum of the finite values, or None if every value is
    /// missing.
    pub fn finite_range(&self) -> Option<(f32, f32)> {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in &self.values {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }
        if min <= max {
            Some((min, max))
        } else {
            None
        }
    }

    /// Fraction of values that are finite, in [0, 1].
    pub fn valid_fraction(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let valid = self.values.iter().filter(|v| v.is_finite()).count();
        valid as f64 / self.values.len() as f64
    }

    /// Apply a scalar transform to every finite value in place.
    pub fn map_values(&mut self, f: impl Fn(f32) -> f32) {
        for v in self.values.iter_mut() {
            if v.is_finite() {
                *v = f(*v);
            }
        }
    }

    /// Label used on colorbars and axes: long name when known, else the
    /// dataset name, with units appended.
    pub fn display_label(&self) -> String {
        let base = self.long_name.as_deref().unwrap_or(&self.name);
        match self.units.as_deref() {
            Some(u) if !u.is_empty() => format!("{} ({})", base, u),
            _ => base.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_range_ignores_nan() {
        let field = DataField::new("t", vec![1.0, f32::NAN, 3.0, 2.0], 2, 2);
        assert_eq!(field.finite_range(), Some((1.0, 3.0)));
    }

    #[test]
    fn test_finite_range_all_missing() {
        let field = DataField::new("t", vec![f32::NAN; 4], 2, 2);
        assert_eq!(field.finite_range(), None);
        assert_eq!(field.valid_fraction(), 0.0);
    }

    #[test]
    fn test_map_values_preserves_nan() {
        let mut field = DataField::new("t", vec![273.15, f32::NAN], 2, 1);
        field.map_values(|v| v - 273.15);
        assert_eq!(field.values[0], 0.0);
        assert!(field.values[1].is_nan());
    }

    #[test]
    fn test_display_label() {
        let mut field = DataField::new("TAirStd", vec![0.0], 1, 1);
        assert_eq!(field.display_label(), "TAirStd");
        field.long_name = Some("Air Temperature".to_string());
        field.units = Some("K".to_string());
        assert_eq!(field.display_label(), "Air Temperature (K)");
    }
}
