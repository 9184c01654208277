//! Array shape operations: axis slicing and 2-D transpose.

use crate::error::{ReadError, ReadResult};

/// Select one index along one axis of a row-major N-D array.
///
/// Returns the reduced array and its dimensions. Applied repeatedly this
/// takes a 3-D retrieval down to a 2-D layer or a 1-D profile column.
pub fn slice_axis(
    values: &[f64],
    dims: &[usize],
    axis: usize,
    index: usize,
    variable: &str,
) -> ReadResult<(Vec<f64>, Vec<usize>)> {
    if axis >= dims.len() {
        return Err(ReadError::Shape {
            variable: variable.to_string(),
            message: format!("slice axis {} out of range for {} dims", axis, dims.len()),
        });
    }
    if index >= dims[axis] {
        return Err(ReadError::Shape {
            variable: variable.to_string(),
            message: format!(
                "slice index {} out of range for axis {} of length {}",
                index, axis, dims[axis]
            ),
        });
    }

    // Row-major strides: outer = product of dims before the axis,
    // inner = product of dims after it.
    let inner: usize = dims[axis + 1..].iter().product();
    let outer: usize = dims[..axis].iter().product();
    let axis_len = dims[axis];

    let mut out = Vec::with_capacity(outer * inner);
    for o in 0..outer {
        let base = (o * axis_len + index) * inner;
        out.extend_from_slice(&values[base..base + inner]);
    }

    let mut out_dims = dims.to_vec();
    out_dims.remove(axis);
    Ok((out, out_dims))
}

/// Transpose a row-major 2-D array (swap rows and columns).
///
/// Some products store arrays as `[x, y]` (IMERG stores `[lon, lat]`);
/// the pipeline works in `[row=y, col=x]` order.
pub fn transpose2d(values: &[f64], width: usize, height: usize) -> Vec<f64> {
    debug_assert_eq!(values.len(), width * height);
    let mut out = vec![0.0; values.len()];
    for y in 0..height {
        for x in 0..width {
            out[x * height + y] = values[y * width + x];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2x3x2 array: values encode their (i, j, k) position as i*100 + j*10 + k
    fn cube() -> (Vec<f64>, Vec<usize>) {
        let mut v = Vec::new();
        for i in 0..2 {
            for j in 0..3 {
                for k in 0..2 {
                    v.push((i * 100 + j * 10 + k) as f64);
                }
            }
        }
        (v, vec![2, 3, 2])
    }

    #[test]
    fn test_slice_first_axis() {
        let (v, dims) = cube();
        let (out, out_dims) = slice_axis(&v, &dims, 0, 1, "t").unwrap();
        assert_eq!(out_dims, vec![3, 2]);
        assert_eq!(out, vec![100.0, 101.0, 110.0, 111.0, 120.0, 121.0]);
    }

    #[test]
    fn test_slice_middle_axis() {
        let (v, dims) = cube();
        let (out, out_dims) = slice_axis(&v, &dims, 1, 2, "t").unwrap();
        assert_eq!(out_dims, vec![2, 2]);
        assert_eq!(out, vec![20.0, 21.0, 120.0, 121.0]);
    }

    #[test]
    fn test_slice_last_axis() {
        let (v, dims) = cube();
        let (out, out_dims) = slice_axis(&v, &dims, 2, 0, "t").unwrap();
        assert_eq!(out_dims, vec![2, 3]);
        assert_eq!(out, vec![0.0, 10.0, 20.0, 100.0, 110.0, 120.0]);
    }

    #[test]
    fn test_slice_to_profile() {
        // Slicing twice extracts a 1-D column
        let (v, dims) = cube();
        let (out, dims) = slice_axis(&v, &dims, 0, 0, "t").unwrap();
        let (out, dims) = slice_axis(&out, &dims, 1, 1, "t").unwrap();
        assert_eq!(dims, vec![3]);
        assert_eq!(out, vec![1.0, 11.0, 21.0]);
    }

    #[test]
    fn test_slice_errors() {
        let (v, dims) = cube();
        assert!(slice_axis(&v, &dims, 3, 0, "t").is_err());
        assert!(slice_axis(&v, &dims, 1, 3, "t").is_err());
    }

    #[test]
    fn test_transpose() {
        // 3 wide, 2 tall
        let v = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let t = transpose2d(&v, 3, 2);
        // now 2 wide, 3 tall
        assert_eq!(t, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }
}
