//! Range-checked numeric casts
//!
//! Narrowing never truncates. A value that does not fit is reported with the
//! name of the field it came from, so escalation can pick a wider format.

use crate::error::{BspError, Result};
use std::any::type_name;
use std::fmt::Display;

/// Integer narrowing
pub fn narrow<T, S>(value: S, field: impl FnOnce() -> String) -> Result<T>
where
    T: TryFrom<S>,
    S: Copy + Display,
{
    T::try_from(value).map_err(|_| BspError::NumericOverflow {
        field: field(),
        value: value.to_string(),
        target: type_name::<T>(),
    })
}

/// Element-wise [`narrow`]; `field` receives the element index
pub fn narrow_array<T, S, const N: usize>(values: [S; N], field: impl Fn(usize) -> String) -> Result<[T; N]>
where
    T: TryFrom<S> + Copy + Default,
    S: Copy + Display,
{
    let mut out = [T::default(); N];
    for (i, (slot, value)) in out.iter_mut().zip(values).enumerate() {
        *slot = narrow(value, || field(i))?;
    }
    Ok(out)
}

fn float_to_i16(value: f32, rounded: f32, field: impl FnOnce() -> String) -> Result<i16> {
    if rounded.is_finite() && rounded >= f32::from(i16::MIN) && rounded <= f32::from(i16::MAX) {
        Ok(rounded as i16)
    } else {
        Err(BspError::NumericOverflow {
            field: field(),
            value: value.to_string(),
            target: "i16",
        })
    }
}

/// Lower bounds round down so the narrowed box still contains the original
pub fn mins_to_i16(mins: [f32; 3], field: impl Fn(usize) -> String) -> Result<[i16; 3]> {
    let mut out = [0; 3];
    for (i, (slot, value)) in out.iter_mut().zip(mins).enumerate() {
        *slot = float_to_i16(value, value.floor(), || field(i))?;
    }
    Ok(out)
}

/// Upper bounds round up so the narrowed box still contains the original
pub fn maxs_to_i16(maxs: [f32; 3], field: impl Fn(usize) -> String) -> Result<[i16; 3]> {
    let mut out = [0; 3];
    for (i, (slot, value)) in out.iter_mut().zip(maxs).enumerate() {
        *slot = float_to_i16(value, value.ceil(), || field(i))?;
    }
    Ok(out)
}

/// Exact widening of short bounds
pub fn bounds_to_f32(bounds: [i16; 3]) -> [f32; 3] {
    bounds.map(f32::from)
}
