//! Scan Input Normalization
//!
//! Every filter flattens its input to a row-major `Vec<f64>` before doing
//! anything else. Nested input must be rectangular; the caller's data is
//! always copied, never aliased.

use crate::error::FilterError;
use ndarray::{ArrayBase, Data, Dimension};
use serde_json::Value;

/// Element of a scan: a number, or a nested row of numbers
pub trait ScanValue {
    /// Append this element's values to `out` in row-major order.
    ///
    /// Returns the element's shape: empty for a number, one extent per
    /// nesting level for a row.
    fn append_to(&self, out: &mut Vec<f64>) -> Result<Vec<usize>, FilterError>;
}

/// Anything that can be flattened into a scan
pub trait ScanSource {
    /// Flatten into a fresh row-major sequence of `f64`
    fn to_scan(&self) -> Result<Vec<f64>, FilterError>;
}

macro_rules! impl_scan_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ScanValue for $ty {
                #[inline]
                fn append_to(&self, out: &mut Vec<f64>) -> Result<Vec<usize>, FilterError> {
                    out.push(*self as f64);
                    Ok(Vec::new())
                }
            }
        )*
    };
}

impl_scan_value!(f64, f32, i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

// Booleans are valid scan data, coerced to 0/1.
impl ScanValue for bool {
    #[inline]
    fn append_to(&self, out: &mut Vec<f64>) -> Result<Vec<usize>, FilterError> {
        out.push(if *self { 1.0 } else { 0.0 });
        Ok(Vec::new())
    }
}

/// Append each item, requiring every item to have the same shape.
///
/// Returns the shape of the whole sequence.
fn append_rows<'a, T, I>(items: I, out: &mut Vec<f64>) -> Result<Vec<usize>, FilterError>
where
    T: ScanValue + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut count = 0;
    let mut item_shape: Option<Vec<usize>> = None;
    for item in items {
        let shape = item.append_to(out)?;
        match item_shape.as_deref() {
            None => item_shape = Some(shape),
            Some(expected) if expected != shape.as_slice() => {
                return Err(FilterError::InvalidScan(format!(
                    "ragged rows: expected element shape {:?}, got {:?}",
                    expected, shape
                )));
            }
            Some(_) => {}
        }
        count += 1;
    }

    let mut shape = vec![count];
    shape.extend(item_shape.unwrap_or_default());
    Ok(shape)
}

impl<T: ScanValue> ScanValue for [T] {
    fn append_to(&self, out: &mut Vec<f64>) -> Result<Vec<usize>, FilterError> {
        append_rows(self, out)
    }
}

impl<T: ScanValue> ScanValue for Vec<T> {
    fn append_to(&self, out: &mut Vec<f64>) -> Result<Vec<usize>, FilterError> {
        append_rows(self, out)
    }
}

impl<T: ScanValue, const N: usize> ScanValue for [T; N] {
    fn append_to(&self, out: &mut Vec<f64>) -> Result<Vec<usize>, FilterError> {
        append_rows(self, out)
    }
}

impl ScanValue for Value {
    fn append_to(&self, out: &mut Vec<f64>) -> Result<Vec<usize>, FilterError> {
        match self {
            Value::Number(n) => {
                let value = n.as_f64().ok_or_else(|| {
                    FilterError::InvalidScan(format!("number {} is not representable as f64", n))
                })?;
                out.push(value);
                Ok(Vec::new())
            }
            Value::Bool(b) => b.append_to(out),
            Value::Array(items) => append_rows(items, out),
            other => Err(FilterError::InvalidScan(format!(
                "expected a number, but given: {}",
                json_type_name(other)
            ))),
        }
    }
}

impl<T: ScanValue> ScanSource for [T] {
    fn to_scan(&self) -> Result<Vec<f64>, FilterError> {
        let mut out = Vec::with_capacity(self.len());
        append_rows(self, &mut out)?;
        Ok(out)
    }
}

impl<T: ScanValue> ScanSource for Vec<T> {
    fn to_scan(&self) -> Result<Vec<f64>, FilterError> {
        self.as_slice().to_scan()
    }
}

impl<T: ScanValue, const N: usize> ScanSource for [T; N] {
    fn to_scan(&self) -> Result<Vec<f64>, FilterError> {
        self.as_slice().to_scan()
    }
}

impl<S: ScanSource + ?Sized> ScanSource for &S {
    fn to_scan(&self) -> Result<Vec<f64>, FilterError> {
        (**self).to_scan()
    }
}

/// Arrays of any dimension flatten in logical (row-major) order,
/// regardless of memory layout.
impl<A, S, D> ScanSource for ArrayBase<S, D>
where
    A: ScanValue,
    S: Data<Elem = A>,
    D: Dimension,
{
    fn to_scan(&self) -> Result<Vec<f64>, FilterError> {
        let mut out = Vec::with_capacity(self.len());
        append_rows(self.iter(), &mut out)?;
        Ok(out)
    }
}

/// Dynamic documents must be arrays at the top level.
impl ScanSource for Value {
    fn to_scan(&self) -> Result<Vec<f64>, FilterError> {
        match self {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                append_rows(items, &mut out)?;
                Ok(out)
            }
            other => Err(FilterError::InvalidScan(format!(
                "expected an array of numbers, but given: {}",
                json_type_name(other)
            ))),
        }
    }
}

/// Name of a JSON value's type, for error messages
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use ndarray::{arr2, Array3, ShapeBuilder};
    use serde_json::json;

    #[test]
    fn test_flat_slices() {
        assert_eq!([1.0, 2.5, 3.0].to_scan().unwrap(), vec![1.0, 2.5, 3.0]);
        assert_eq!(vec![1_i32, -2, 3].to_scan().unwrap(), vec![1.0, -2.0, 3.0]);
        assert_eq!([0.5_f32, 0.25].to_scan().unwrap(), vec![0.5, 0.25]);

        let empty: [f64; 0] = [];
        assert!(empty.to_scan().unwrap().is_empty());
    }

    #[test]
    fn test_bools_are_coerced() {
        assert_eq!([true, false, true].to_scan().unwrap(), vec![1.0, 0.0, 1.0]);
        assert_eq!(json!([true, 2]).to_scan().unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_nested_rows_flatten_row_major() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        assert_eq!(rows.to_scan().unwrap(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let cube = [[[1, 2], [3, 4]], [[5, 6], [7, 8]]];
        assert_eq!(
            cube.to_scan().unwrap(),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
        );
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        let err = rows.to_scan().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);

        let err = json!([[1, 2], [3]]).to_scan().unwrap_err();
        assert!(matches!(err, FilterError::InvalidScan(_)));
    }

    #[test]
    fn test_mixed_numbers_and_rows_rejected() {
        let err = json!([1, [2]]).to_scan().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);

        let err = json!([[1, 2], 3, 4]).to_scan().unwrap_err();
        assert!(matches!(err, FilterError::InvalidScan(_)));
    }

    #[test]
    fn test_same_count_different_shape_rejected() {
        let err = json!([[[1, 2], [3, 4]], [[5, 6, 7, 8]]])
            .to_scan()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert!(err.to_string().contains("[2, 2]"));

        let blocks = vec![
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            vec![vec![5.0, 6.0, 7.0, 8.0]],
        ];
        assert!(blocks.to_scan().is_err());
    }

    #[test]
    fn test_empty_rows_are_rectangular() {
        let rows: Vec<Vec<f64>> = vec![vec![], vec![]];
        assert!(rows.to_scan().unwrap().is_empty());
        assert!(json!([[], [1]]).to_scan().is_err());
    }

    #[test]
    fn test_ndarray_row_major_order() {
        let array = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(array.to_scan().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);

        // Column-major memory still flattens in logical order
        let fortran =
            Array3::<f64>::from_shape_vec((2, 2, 1).f(), vec![1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!(fortran.to_scan().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);

        assert_eq!(array.view().to_scan().unwrap().len(), 4);
    }

    #[test]
    fn test_flatten_copies_input() {
        let scan = vec![1.0, 2.0];
        let mut flat = scan.to_scan().unwrap();
        flat[0] = 99.0;
        assert_eq!(scan, vec![1.0, 2.0]);
    }

    #[test]
    fn test_non_array_json_rejected() {
        for value in [json!(null), json!("1,2,3"), json!({"a": 1}), json!(4.0)] {
            let err = value.to_scan().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Type, "{:?}", value);
        }

        let err = json!([1, "two", 3]).to_scan().unwrap_err();
        assert!(err.to_string().contains("string"));
        assert!(json!([1, null]).to_scan().is_err());
    }

    #[test]
    fn test_json_nested() {
        let value = json!([[0.0, 1.0, 2.0], [3, 4, 5]]);
        assert_eq!(
            value.to_scan().unwrap(),
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]
        );
        assert!(json!([]).to_scan().unwrap().is_empty());
    }
}
