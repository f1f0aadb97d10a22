#[cfg(test)]
mod tests {
    use crate::{varlena_payload, SimBackend};
    use plshim::datum::{
        cstring_to_datum, datum_to_bytes, datum_to_cstring, datum_to_string, str_to_datum,
        void_datum,
    };
    use plshim::mem::current_context;
    use plshim::pg_sys::{self, Datum};
    use plshim::{AdapterError, FromDatum, IntoDatum};
    use std::ffi::CStr;

    #[test]
    fn test_int32_example() {
        let datum = pg_sys::Int32GetDatum(-12345);
        assert_eq!(pg_sys::DatumGetInt32(datum), -12345);
    }

    #[test]
    fn test_by_value_into_from() {
        let sim = SimBackend::new();
        sim.enter(|| {
            current_context(|mcx| unsafe {
                let d = 7i16.into_datum(mcx).unwrap();
                assert_eq!(i16::from_datum(d, false), Some(7));
                let d = u16::MAX.into_datum(mcx).unwrap();
                assert_eq!(u16::from_datum(d, false), Some(u16::MAX));
                let d = i32::MIN.into_datum(mcx).unwrap();
                assert_eq!(i32::from_datum(d, false), Some(i32::MIN));
                let d = u32::MAX.into_datum(mcx).unwrap();
                assert_eq!(u32::from_datum(d, false), Some(u32::MAX));
                let d = (-1i64).into_datum(mcx).unwrap();
                assert_eq!(i64::from_datum(d, false), Some(-1));
                let d = false.into_datum(mcx).unwrap();
                assert_eq!(bool::from_datum(d, false), Some(false));
                let d = f32::NEG_INFINITY.into_datum(mcx).unwrap();
                assert_eq!(f32::from_datum(d, false), Some(f32::NEG_INFINITY));
                let d = 0.1f64.into_datum(mcx).unwrap();
                assert_eq!(f64::from_datum(d, false), Some(0.1));
            });
            // nothing by-value allocates
            assert_eq!(sim.allocations(sim.current()), 0);
        })
    }

    #[test]
    fn test_null_flag_wins() {
        unsafe {
            assert_eq!(i32::from_datum(pg_sys::Int32GetDatum(5), true), None);
            assert_eq!(String::from_datum(Datum::null(), true), None);
            assert_eq!(Vec::<u8>::from_datum(Datum::null(), true), None);
        }
    }

    #[test]
    fn test_unsigned_widen_into_signed() {
        // u16 travels as int4 and u32 as int8, zero-extended
        assert_eq!(u16::type_oid(), pg_sys::INT4OID);
        assert_eq!(u32::type_oid(), pg_sys::INT8OID);
        assert_eq!(pg_sys::DatumGetInt32(pg_sys::UInt16GetDatum(65_535)), 65_535);
        assert_eq!(pg_sys::DatumGetInt64(pg_sys::UInt32GetDatum(u32::MAX)), u32::MAX as i64);
    }

    #[test]
    fn test_type_oids() {
        assert_eq!(bool::type_oid(), pg_sys::BOOLOID);
        assert_eq!(i16::type_oid(), pg_sys::INT2OID);
        assert_eq!(i32::type_oid(), pg_sys::INT4OID);
        assert_eq!(i64::type_oid(), pg_sys::INT8OID);
        assert_eq!(f32::type_oid(), pg_sys::FLOAT4OID);
        assert_eq!(f64::type_oid(), pg_sys::FLOAT8OID);
        assert_eq!(<&str>::type_oid(), pg_sys::TEXTOID);
        assert_eq!(String::type_oid(), pg_sys::TEXTOID);
        assert_eq!(<&[u8]>::type_oid(), pg_sys::BYTEAOID);
        assert_eq!(Vec::<u8>::type_oid(), pg_sys::BYTEAOID);
        assert_eq!(<()>::type_oid(), pg_sys::VOIDOID);
        assert_eq!(Option::<i64>::type_oid(), pg_sys::INT8OID);
        assert_eq!(AdapterError::type_oid(), pg_sys::TEXTOID);
    }

    #[test]
    fn test_void_datum() {
        assert!(void_datum().is_null());
        let sim = SimBackend::new();
        sim.enter(|| current_context(|mcx| assert_eq!(().into_datum(mcx), Some(void_datum()))));
    }

    #[test]
    fn test_option_none_is_sql_null() {
        let sim = SimBackend::new();
        sim.enter(|| {
            current_context(|mcx| {
                assert_eq!(None::<String>.into_datum(mcx), None);
                assert!(Some("x").into_datum(mcx).is_some());
            })
        });
    }

    #[test]
    fn test_text_is_allocated_in_context() {
        let sim = SimBackend::new();
        sim.enter(|| {
            let cx = sim.current();
            let datum = current_context(|mcx| str_to_datum(mcx, "abc"));
            let ptr = datum.cast_mut_ptr::<u8>();
            assert!(sim.owns(cx, ptr, pg_sys::VARHDRSZ + 3));
            assert_eq!(unsafe { varlena_payload(datum) }, b"abc");
        })
    }

    #[test]
    fn test_cstring_round_trip() -> eyre::Result<()> {
        let sim = SimBackend::new();
        sim.enter(|| {
            current_context(|mcx| -> eyre::Result<()> {
                let datum = cstring_to_datum(mcx, c"plshim");
                unsafe {
                    assert_eq!(pg_sys::VARSIZE(datum.cast_mut_ptr()), pg_sys::VARHDRSZ + 6);
                    let back = datum_to_cstring(mcx, datum);
                    assert_eq!(CStr::from_ptr(back.as_ptr()), c"plshim");
                    assert_eq!(datum_to_string(datum)?, "plshim");
                }
                Ok(())
            })
        })
    }

    #[test]
    fn test_empty_text() -> eyre::Result<()> {
        let sim = SimBackend::new();
        sim.enter(|| {
            current_context(|mcx| -> eyre::Result<()> {
                let datum = cstring_to_datum(mcx, c"");
                unsafe {
                    assert_eq!(pg_sys::VARSIZE(datum.cast_mut_ptr()), pg_sys::VARHDRSZ);
                    assert_eq!(CStr::from_ptr(datum_to_cstring(mcx, datum).as_ptr()), c"");
                    assert_eq!(datum_to_string(datum)?, "");
                }
                Ok(())
            })
        })
    }

    #[test]
    fn test_bytes_keep_interior_nuls() {
        let sim = SimBackend::new();
        sim.enter(|| {
            current_context(|mcx| unsafe {
                let payload = b"a\0b\0".to_vec();
                let datum = payload.clone().into_datum(mcx).unwrap();
                assert_eq!(datum_to_bytes(datum), payload);
                assert_eq!(Vec::<u8>::from_datum(datum, false), Some(payload));
            })
        })
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let sim = SimBackend::new();
        sim.enter(|| {
            current_context(|mcx| unsafe {
                let datum = plshim::datum::bytes_to_datum(mcx, &[b'o', b'k', 0xC3]);
                let err = datum_to_string(datum).unwrap_err();
                assert!(matches!(err, AdapterError::InvalidUtf8(_)));
                assert_eq!(err.to_string(), "text value is not valid UTF-8");
            })
        })
    }

    #[test]
    fn test_error_as_text() {
        let sim = SimBackend::new();
        sim.enter(|| {
            current_context(|mcx| unsafe {
                let datum = AdapterError::NullArgument(3).into_datum(mcx).unwrap();
                assert_eq!(datum_to_string(datum).unwrap(), "argument 3 is NULL");
            })
        })
    }
}
