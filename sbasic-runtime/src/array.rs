//! Array storage (spec.md §3 Array, §4.3): one `(lower, upper)` bound pair
//! per dimension, backed by a single row-major `Vec<Value>` rather than
//! nested vectors — this is what makes `REDIM PRESERVE` on the last
//! dimension a straightforward element-by-element copy instead of a
//! recursive structural walk.

use sbasic_par::ValueKind;
use sbasic_util::{BasicError, BasicResult, Span};

use crate::value::Value;

#[derive(Clone, Debug)]
pub struct Array {
    pub kind: ValueKind,
    pub bounds: Vec<(i32, i32)>,
    data: Vec<Value>,
}

impl Array {
    pub fn new(kind: ValueKind, bounds: Vec<(i32, i32)>) -> Self {
        let len = Self::total_len(&bounds);
        let data = vec![Value::default_for(kind); len];
        Array { kind, bounds, data }
    }

    fn total_len(bounds: &[(i32, i32)]) -> usize {
        bounds
            .iter()
            .map(|(lo, hi)| (hi - lo + 1).max(0) as usize)
            .product()
    }

    pub fn dims(&self) -> usize {
        self.bounds.len()
    }

    pub fn lbound(&self, dim: usize, span: Span) -> BasicResult<i32> {
        self.bounds
            .get(dim)
            .map(|(lo, _)| *lo)
            .ok_or_else(|| BasicError::range_error("dimension out of range".into(), span))
    }

    pub fn ubound(&self, dim: usize, span: Span) -> BasicResult<i32> {
        self.bounds
            .get(dim)
            .map(|(_, hi)| *hi)
            .ok_or_else(|| BasicError::range_error("dimension out of range".into(), span))
    }

    /// Row-major linear index for a subscript tuple.
    fn linear_index(&self, indices: &[i32], span: Span) -> BasicResult<usize> {
        if indices.len() != self.bounds.len() {
            return Err(BasicError::range_error(
                format!(
                    "expected {} subscript(s), found {}",
                    self.bounds.len(),
                    indices.len()
                ),
                span,
            ));
        }
        let mut index = 0usize;
        for (i, ((lo, hi), value)) in self.bounds.iter().zip(indices.iter()).enumerate() {
            if *value < *lo || *value > *hi {
                return Err(BasicError::range_error(
                    format!("subscript {value} out of range for dimension {i}"),
                    span,
                ));
            }
            let extent = (hi - lo + 1) as usize;
            index = index * extent + (value - lo) as usize;
        }
        Ok(index)
    }

    pub fn get(&self, indices: &[i32], span: Span) -> BasicResult<Value> {
        let idx = self.linear_index(indices, span)?;
        Ok(self.data[idx].clone())
    }

    pub fn set(&mut self, indices: &[i32], value: Value, span: Span) -> BasicResult<()> {
        let idx = self.linear_index(indices, span)?;
        self.data[idx] = value;
        Ok(())
    }

    /// `REDIM PRESERVE`: resizes, copying old elements into the new
    /// layout by shared leading dimensions. Spec.md only requires this for
    /// growing/shrinking the last dimension, matching classic BASIC.
    pub fn redim_preserve(&mut self, new_bounds: Vec<(i32, i32)>) {
        let old = self.clone();
        let new_len = Self::total_len(&new_bounds);
        self.data = vec![Value::default_for(self.kind); new_len];
        self.bounds = new_bounds;
        if old.bounds.len() != self.bounds.len() {
            return;
        }
        copy_overlap(&old, self);
    }
}

fn copy_overlap(old: &Array, new: &mut Array) {
    let dims = old.bounds.len();
    let mut indices = vec![0i32; dims];
    for d in 0..dims {
        indices[d] = old.bounds[d].0;
    }
    loop {
        let in_new = indices
            .iter()
            .zip(new.bounds.iter())
            .all(|(v, (lo, hi))| *v >= *lo && *v <= *hi);
        if in_new {
            if let Ok(value) = old.get(&indices, Span::DUMMY) {
                let _ = new.set(&indices, value, Span::DUMMY);
            }
        }
        if !advance(&mut indices, &old.bounds) {
            break;
        }
    }
}

fn advance(indices: &mut [i32], bounds: &[(i32, i32)]) -> bool {
    for d in (0..indices.len()).rev() {
        indices[d] += 1;
        if indices[d] <= bounds[d].1 {
            return true;
        }
        indices[d] = bounds[d].0;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_round_trip_two_dims() {
        let mut arr = Array::new(ValueKind::Integer, vec![(0, 2), (0, 2)]);
        arr.set(&[1, 2], Value::Integer(42), Span::DUMMY).unwrap();
        assert_eq!(arr.get(&[1, 2], Span::DUMMY).unwrap(), Value::Integer(42));
        assert_eq!(arr.get(&[0, 0], Span::DUMMY).unwrap(), Value::Integer(0));
    }

    #[test]
    fn out_of_range_subscript_errors() {
        let arr = Array::new(ValueKind::Integer, vec![(0, 2)]);
        assert!(arr.get(&[5], Span::DUMMY).is_err());
    }

    #[test]
    fn redim_preserve_keeps_overlapping_elements() {
        let mut arr = Array::new(ValueKind::Integer, vec![(0, 2)]);
        arr.set(&[0], Value::Integer(1), Span::DUMMY).unwrap();
        arr.set(&[1], Value::Integer(2), Span::DUMMY).unwrap();
        arr.set(&[2], Value::Integer(3), Span::DUMMY).unwrap();
        arr.redim_preserve(vec![(0, 4)]);
        assert_eq!(arr.get(&[1], Span::DUMMY).unwrap(), Value::Integer(2));
        assert_eq!(arr.get(&[4], Span::DUMMY).unwrap(), Value::Integer(0));
    }
}
