//! The `Datum` word and the `XGetDatum` / `DatumGetX` macro family.
//!
//! A `Datum` carries no type information. Which of these functions is the
//! right one to call is decided entirely by the SQL type of the slot the
//! value came from (or is headed to).

use crate::Oid;
use core::ffi::c_void;

/// Postgres' pointer-sized boxed value.
#[repr(transparent)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, bytemuck::Zeroable, bytemuck::Pod,
)]
pub struct Datum(usize);

/// A `Datum` together with its null flag, as stored in
/// `FunctionCallInfoBaseData::args`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullableDatum {
    pub value: Datum,
    pub isnull: bool,
}

impl Datum {
    /// The datum returned by `PG_RETURN_VOID()`.
    #[inline]
    pub const fn null() -> Datum {
        Datum(0)
    }

    #[inline]
    pub const fn from_raw(word: usize) -> Datum {
        Datum(word)
    }

    #[inline]
    pub const fn value(self) -> usize {
        self.0
    }

    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Interpret the word as a pointer, picking up whatever provenance was
    /// exposed when the pointer was turned into a `Datum`.
    #[inline]
    pub fn cast_mut_ptr<T>(self) -> *mut T {
        sptr::from_exposed_addr_mut(self.0)
    }
}

impl<T> From<*mut T> for Datum {
    #[inline]
    fn from(ptr: *mut T) -> Datum {
        Datum(sptr::Strict::expose_addr(ptr))
    }
}

impl<T> From<*const T> for Datum {
    #[inline]
    fn from(ptr: *const T) -> Datum {
        Datum(sptr::Strict::expose_addr(ptr))
    }
}

impl NullableDatum {
    #[inline]
    pub const fn new(value: Datum) -> NullableDatum {
        NullableDatum { value, isnull: false }
    }

    #[inline]
    pub const fn null() -> NullableDatum {
        NullableDatum { value: Datum::null(), isnull: true }
    }
}

#[inline]
pub fn BoolGetDatum(x: bool) -> Datum {
    Datum(x as usize)
}

#[inline]
pub fn DatumGetBool(x: Datum) -> bool {
    x.0 != 0
}

#[inline]
pub fn Int16GetDatum(x: i16) -> Datum {
    Datum(x as usize)
}

#[inline]
pub fn DatumGetInt16(x: Datum) -> i16 {
    x.0 as i16
}

#[inline]
pub fn UInt16GetDatum(x: u16) -> Datum {
    Datum(x as usize)
}

#[inline]
pub fn DatumGetUInt16(x: Datum) -> u16 {
    x.0 as u16
}

#[inline]
pub fn Int32GetDatum(x: i32) -> Datum {
    Datum(x as usize)
}

#[inline]
pub fn DatumGetInt32(x: Datum) -> i32 {
    x.0 as i32
}

#[inline]
pub fn UInt32GetDatum(x: u32) -> Datum {
    Datum(x as usize)
}

#[inline]
pub fn DatumGetUInt32(x: Datum) -> u32 {
    x.0 as u32
}

#[inline]
pub fn Int64GetDatum(x: i64) -> Datum {
    Datum(x as usize)
}

#[inline]
pub fn DatumGetInt64(x: Datum) -> i64 {
    x.0 as i64
}

#[inline]
pub fn ObjectIdGetDatum(x: Oid) -> Datum {
    Datum(x as usize)
}

#[inline]
pub fn DatumGetObjectId(x: Datum) -> Oid {
    x.0 as Oid
}

/// The float's bits go through `Int32GetDatum`, so they are sign-extended
/// into the upper half of the word just like they are in C.
#[inline]
pub fn Float4GetDatum(x: f32) -> Datum {
    Int32GetDatum(x.to_bits() as i32)
}

#[inline]
pub fn DatumGetFloat4(x: Datum) -> f32 {
    f32::from_bits(DatumGetInt32(x) as u32)
}

#[inline]
pub fn Float8GetDatum(x: f64) -> Datum {
    Int64GetDatum(x.to_bits() as i64)
}

#[inline]
pub fn DatumGetFloat8(x: Datum) -> f64 {
    f64::from_bits(DatumGetInt64(x) as u64)
}

/// `date`: days since 2000-01-01.
pub type DateADT = i32;
/// `time`: microseconds since midnight.
pub type TimeADT = i64;
/// `timestamp`: microseconds since 2000-01-01 00:00.
pub type Timestamp = i64;
/// `timestamptz`: microseconds since 2000-01-01 00:00 UTC.
pub type TimestampTz = i64;

#[inline]
pub fn DateADTGetDatum(x: DateADT) -> Datum {
    Int32GetDatum(x)
}

#[inline]
pub fn DatumGetDateADT(x: Datum) -> DateADT {
    DatumGetInt32(x)
}

#[inline]
pub fn TimeADTGetDatum(x: TimeADT) -> Datum {
    Int64GetDatum(x)
}

#[inline]
pub fn DatumGetTimeADT(x: Datum) -> TimeADT {
    DatumGetInt64(x)
}

#[inline]
pub fn TimestampGetDatum(x: Timestamp) -> Datum {
    Int64GetDatum(x)
}

#[inline]
pub fn DatumGetTimestamp(x: Datum) -> Timestamp {
    DatumGetInt64(x)
}

#[inline]
pub fn TimestampTzGetDatum(x: TimestampTz) -> Datum {
    Int64GetDatum(x)
}

#[inline]
pub fn DatumGetTimestampTz(x: Datum) -> TimestampTz {
    DatumGetInt64(x)
}

#[inline]
pub fn PointerGetDatum<T>(x: *const T) -> Datum {
    Datum::from(x)
}

#[inline]
pub fn DatumGetPointer(x: Datum) -> *mut c_void {
    x.cast_mut_ptr()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_values_sign_extend() {
        assert_eq!(Int16GetDatum(-1).value(), usize::MAX);
        assert_eq!(Int32GetDatum(-1).value(), usize::MAX);
        assert_eq!(UInt16GetDatum(u16::MAX).value(), 0xFFFF);
        assert_eq!(UInt32GetDatum(u32::MAX).value(), 0xFFFF_FFFF);
    }

    #[test]
    fn decode_truncates_to_width() {
        let d = Int64GetDatum(0x1_0000_002A);
        assert_eq!(DatumGetInt32(d), 42);
        assert_eq!(DatumGetInt16(d), 42);
        assert_eq!(DatumGetUInt16(Int32GetDatum(-2)), 0xFFFE);
    }

    #[test]
    fn int32_example() {
        let d = Int32GetDatum(-12345);
        assert_eq!(DatumGetInt32(d), -12345);
    }

    #[test]
    fn fixed_width_values_survive_the_word() {
        for v in [i16::MIN, -1, 0, 1, i16::MAX] {
            assert_eq!(DatumGetInt16(Int16GetDatum(v)), v);
        }
        for v in [u16::MIN, 1, u16::MAX] {
            assert_eq!(DatumGetUInt16(UInt16GetDatum(v)), v);
        }
        for v in [i32::MIN, -12345, 0, i32::MAX] {
            assert_eq!(DatumGetInt32(Int32GetDatum(v)), v);
        }
        for v in [u32::MIN, 7, u32::MAX] {
            assert_eq!(DatumGetUInt32(UInt32GetDatum(v)), v);
        }
        for v in [i64::MIN, -1, 0, i64::MAX] {
            assert_eq!(DatumGetInt64(Int64GetDatum(v)), v);
        }
    }

    #[test]
    fn floats_keep_their_bits() {
        assert_eq!(DatumGetFloat4(Float4GetDatum(-1.5)), -1.5);
        assert!(DatumGetFloat4(Float4GetDatum(f32::NAN)).is_nan());
        assert_eq!(DatumGetFloat8(Float8GetDatum(f64::MIN_POSITIVE)), f64::MIN_POSITIVE);
        // negative float4 bit patterns land in the upper half too
        assert_eq!(Float4GetDatum(-0.0).value() >> 32, 0xFFFF_FFFF);
    }

    #[test]
    fn bools_are_zero_or_one() {
        assert_eq!(BoolGetDatum(true).value(), 1);
        assert!(!DatumGetBool(BoolGetDatum(false)));
        assert!(DatumGetBool(Datum::from_raw(2)));
    }

    #[test]
    fn dates_before_the_epoch_sign_extend() {
        // 1999-12-31
        assert_eq!(DateADTGetDatum(-1).value(), usize::MAX);
        assert_eq!(DatumGetDateADT(DateADTGetDatum(-1)), -1);
        let noon = 12 * 3_600_000_000i64;
        assert_eq!(DatumGetTimeADT(TimeADTGetDatum(noon)), noon);
        assert_eq!(DatumGetTimestampTz(TimestampTzGetDatum(i64::MIN)), i64::MIN);
    }

    #[test]
    fn pointers_round_trip() {
        let mut x = 5u32;
        let p: *mut u32 = &mut x;
        let d = PointerGetDatum(p);
        assert_eq!(DatumGetPointer(d).cast::<u32>(), p);
        assert_eq!(unsafe { *d.cast_mut_ptr::<u32>() }, 5);
    }
}
