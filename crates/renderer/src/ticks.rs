//! Nice tick placement and label formatting for colorbars and axes.

/// Generate tick values covering [min, max] at a round step, aiming for
/// roughly `target` ticks. Steps are 1/2/5 times a power of ten.
pub fn nice_ticks(min: f32, max: f32, target: usize) -> Vec<f32> {
    if !min.is_finite() || !max.is_finite() || max <= min || target == 0 {
        return Vec::new();
    }

    let raw_step = (max - min) / target as f32;
    let magnitude = 10f32.powf(raw_step.log10().floor());
    let residual = raw_step / magnitude;

    let step = if residual <= 1.5 {
        magnitude
    } else if residual <= 3.5 {
        2.0 * magnitude
    } else if residual <= 7.5 {
        5.0 * magnitude
    } else {
        10.0 * magnitude
    };

    let first = (min / step).ceil() * step;
    let mut ticks = Vec::new();
    let mut v = first;
    // Half-step tolerance keeps the last tick despite rounding error
    while v <= max + step * 0.001 {
        ticks.push(v);
        v += step;
    }
    ticks
}

/// Format a tick value with precision appropriate to its magnitude.
pub fn format_tick(v: f32) -> String {
    let a = v.abs();
    if v == 0.0 {
        "0".to_string()
    } else if a >= 10_000.0 || a < 0.01 {
        format!("{:.1e}", v)
    } else if a >= 100.0 {
        format!("{:.0}", v)
    } else if a >= 1.0 {
        trim_zeros(format!("{:.1}", v))
    } else {
        trim_zeros(format!("{:.2}", v))
    }
}

fn trim_zeros(s: String) -> String {
    if !s.contains('.') {
        return s;
    }
    let s = s.trim_end_matches('0');
    s.trim_end_matches('.').to_string()
}

/// A round graticule spacing (degrees) giving a handful of lines over the
/// given extent.
pub fn graticule_spacing(extent_deg: f64) -> f64 {
    const CANDIDATES: [f64; 9] = [0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 45.0, 60.0];
    for c in CANDIDATES {
        if extent_deg / c <= 8.0 {
            return c;
        }
    }
    90.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_ticks_round_steps() {
        let ticks = nice_ticks(0.0, 100.0, 5);
        assert_eq!(ticks, vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
    }

    #[test]
    fn test_nice_ticks_negative_range() {
        let ticks = nice_ticks(-30.0, 30.0, 6);
        assert!(ticks.contains(&0.0));
        assert_eq!(ticks.first().copied(), Some(-30.0));
        assert_eq!(ticks.last().copied(), Some(30.0));
    }

    #[test]
    fn test_nice_ticks_degenerate() {
        assert!(nice_ticks(5.0, 5.0, 4).is_empty());
        assert!(nice_ticks(f32::NAN, 1.0, 4).is_empty());
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(250.0), "250");
        assert_eq!(format_tick(2.5), "2.5");
        assert_eq!(format_tick(3.0), "3");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(123456.0), "1.2e5");
    }

    #[test]
    fn test_graticule_spacing() {
        assert_eq!(graticule_spacing(360.0), 60.0);
        assert_eq!(graticule_spacing(60.0), 10.0);
        assert_eq!(graticule_spacing(3.0), 0.5);
    }
}
