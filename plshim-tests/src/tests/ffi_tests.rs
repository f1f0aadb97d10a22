#[cfg(test)]
mod tests {
    use crate::{
        short_varlena, short_varlena_datum, SimBackend, SimFcInfo, SimNode, SimTriggerData,
        SimTupleTable,
    };
    use plshim::ffi;
    use plshim::pg_sys::{self, Datum, ElogLevel, HeapTuple};
    use std::ffi::{c_int, c_void, CStr};

    #[test]
    fn test_by_value_exports() {
        assert_eq!(ffi::datum_to_int16(ffi::int16_to_datum(i16::MIN)), i16::MIN);
        assert_eq!(ffi::datum_to_uint16(ffi::uint16_to_datum(u16::MAX)), u16::MAX);
        assert_eq!(ffi::datum_to_int32(ffi::int32_to_datum(-12345)), -12345);
        assert_eq!(ffi::datum_to_uint32(ffi::uint32_to_datum(3_000_000_000)), 3_000_000_000);
        assert_eq!(ffi::datum_to_int64(ffi::int64_to_datum(-1)), -1);
        assert!(ffi::datum_to_bool(ffi::bool_to_datum(true)));
        assert_eq!(ffi::datum_to_float4(ffi::float4_to_datum(2.5)), 2.5);
        assert_eq!(ffi::datum_to_float8(ffi::float8_to_datum(-0.125)), -0.125);
        assert_eq!(ffi::void_datum(), Datum::null());
    }

    #[test]
    fn test_int16_sign_extends() {
        assert_eq!(ffi::int16_to_datum(-1).value(), usize::MAX);
        assert_eq!(ffi::int32_to_datum(-1), pg_sys::Int64GetDatum(-1));
        assert_eq!(ffi::uint16_to_datum(u16::MAX).value(), 0xFFFF);
    }

    #[test]
    fn test_get_arg_exports() {
        let mut call = SimFcInfo::new([
            Some(pg_sys::Int16GetDatum(-2)),
            Some(pg_sys::Int32GetDatum(70_000)),
            Some(pg_sys::Int32GetDatum(-5)),
            Some(pg_sys::UInt32GetDatum(4_000_000_000)),
            Some(pg_sys::Int64GetDatum(1 << 40)),
        ]);
        let fcinfo = call.as_ptr();
        unsafe {
            assert_eq!(ffi::get_arg_int16(fcinfo, 0), -2);
            assert_eq!(ffi::get_arg_uint16(fcinfo, 1), 70_000u32 as u16);
            assert_eq!(ffi::get_arg_int32(fcinfo, 2), -5);
            assert_eq!(ffi::get_arg_uint32(fcinfo, 3), 4_000_000_000);
            assert_eq!(ffi::get_arg_int64(fcinfo, 4), 1 << 40);
        }
    }

    #[test]
    fn test_text_and_bytea_exports() {
        let sim = SimBackend::new();
        let mut short = short_varlena(b"\x01\x02");
        let bytea = short_varlena_datum(&mut short);
        sim.enter(|| unsafe {
            let text = ffi::cstring_to_datum(c"some text".as_ptr());
            let mut call = SimFcInfo::new([Some(text), Some(bytea)]);
            let fcinfo = call.as_ptr();

            let t = ffi::get_arg_text_p(fcinfo, 0);
            assert_eq!(t, text.cast_mut_ptr());
            assert_eq!(ffi::varsize(t.cast::<c_void>()), pg_sys::VARHDRSZ as i32 + 9);

            let b = ffi::get_arg_bytea_p(fcinfo, 1);
            assert!(pg_sys::VARATT_IS_4B_U(b));
            assert_eq!(ffi::varsize(b.cast::<c_void>()), pg_sys::VARHDRSZ as i32 + 2);
        })
    }

    #[test]
    fn test_cstring_exports() {
        let sim = SimBackend::new();
        sim.enter(|| unsafe {
            let datum = ffi::cstring_to_datum(c"round trip".as_ptr());
            let back = ffi::datum_to_cstring(datum);
            assert_eq!(libc::strlen(back), 10);
            assert_eq!(CStr::from_ptr(back), c"round trip");
            assert!(sim.owns(sim.current(), back.cast::<u8>(), 11));
        })
    }

    #[test]
    fn test_ret_export() {
        let sim = SimBackend::new();
        sim.enter(|| unsafe {
            let value = 0x0123_4567_89AB_CDEFu64;
            let copy = ffi::ret((&value as *const u64).cast(), 8);
            assert_ne!(copy.cast::<u64>().cast_const(), &value as *const u64);
            assert_eq!(copy.cast::<u64>().read_unaligned(), value);
        })
    }

    #[test]
    fn test_get_col_as_datum() {
        let sim = SimBackend::new();
        let table = SimTupleTable::new(
            2,
            vec![
                vec![Some(pg_sys::Int32GetDatum(1)), Some(pg_sys::Int32GetDatum(-1))],
                vec![None, Some(pg_sys::Int32GetDatum(-2))],
                vec![Some(pg_sys::Int32GetDatum(42)), None],
            ],
        );
        sim.enter(|| unsafe {
            let col = |row, col| ffi::get_col_as_datum(table.vals(), table.tupdesc(), row, col);
            assert_eq!(ffi::datum_to_int32(col(2, 0)), 42);
            assert_eq!(ffi::datum_to_int32(col(0, 1)), -1);
            assert_eq!(ffi::datum_to_int32(col(1, 1)), -2);
            // NULLs come back as the void datum
            assert_eq!(col(1, 0), ffi::void_datum());
            assert_eq!(col(2, 1), ffi::void_datum());
        })
    }

    #[test]
    fn test_get_heap_tuple() {
        let table = SimTupleTable::int4_column([Some(1), Some(2), Some(3)]);
        unsafe {
            for i in 0..3 {
                assert_eq!(ffi::get_heap_tuple(table.vals(), i), *table.vals().add(i as usize));
            }
        }
    }

    #[test]
    fn test_notice_exports() {
        let sim = SimBackend::new();
        sim.enter(|| unsafe {
            ffi::notice(c"%s%s%s%n".as_ptr());
            ffi::notice(std::ptr::null());
            ffi::elog_notice(c"via elog_notice".as_ptr());
        });
        assert_eq!(
            sim.messages(),
            vec![
                (ElogLevel::Notice, "%s%s%s%n".to_owned()),
                (ElogLevel::Notice, String::new()),
                (ElogLevel::Notice, "via elog_notice".to_owned()),
            ]
        );
    }

    #[test]
    fn test_get_arg_is_the_raw_word() {
        let sim = SimBackend::new();
        sim.enter(|| unsafe {
            let text = ffi::cstring_to_datum(c"raw".as_ptr());
            let mut call = SimFcInfo::new([Some(pg_sys::Int64GetDatum(-7)), Some(text), None]);
            let fcinfo = call.as_ptr();
            assert_eq!(ffi::get_arg(fcinfo, 0), pg_sys::Int64GetDatum(-7));
            // pointer arguments are not detoasted or copied
            assert_eq!(ffi::get_arg(fcinfo, 1), text);
            assert_eq!(ffi::get_arg(fcinfo, 2), Datum::null());
        })
    }

    #[test]
    fn test_pointer_exports() {
        let mut value = 99u64;
        let p: *mut c_void = (&mut value as *mut u64).cast();
        let datum = ffi::pointer_get_datum(p);
        assert_eq!(datum, Datum::from(p));
        assert_eq!(ffi::datum_to_pointer(datum), p);
        assert_eq!(unsafe { *ffi::datum_to_pointer(datum).cast::<u64>() }, 99);
        assert_eq!(ffi::datum_to_pointer(Datum::null()), std::ptr::null_mut());

        let cstring = c"unknown literal";
        let unknown = ffi::pointer_get_datum(cstring.as_ptr().cast_mut().cast());
        assert_eq!(unsafe { CStr::from_ptr(ffi::unknown_to_char(unknown)) }, cstring);
    }

    #[test]
    fn test_heap_tuple_datum_exports() {
        let table = SimTupleTable::int4_column([Some(1), Some(2)]);
        let tuple = table.tuple(1);
        let datum = ffi::heap_tuple_to_datum(tuple);
        assert_eq!(datum, Datum::from(tuple));
        assert_eq!(ffi::datum_to_heap_tuple(datum), tuple);
        let none: HeapTuple = std::ptr::null_mut();
        assert_eq!(ffi::heap_tuple_to_datum(none), ffi::void_datum());
    }

    #[test]
    fn test_get_heap_getattr_is_one_based() {
        let sim = SimBackend::new();
        let table = SimTupleTable::new(
            3,
            vec![vec![
                Some(pg_sys::Int32GetDatum(10)),
                None,
                Some(pg_sys::Int32GetDatum(30)),
            ]],
        );
        sim.enter(|| unsafe {
            let attr = |i| ffi::get_heap_getattr(table.tuple(0), i, table.tupdesc());
            assert_eq!(ffi::datum_to_int32(attr(1)), 10);
            assert_eq!(ffi::datum_to_int32(attr(3)), 30);
            assert_eq!(attr(2), ffi::void_datum());
            // attribute 0 does not exist, and neither does one past natts
            assert_eq!(attr(0), ffi::void_datum());
            assert_eq!(attr(4), ffi::void_datum());
            // same cell as the zero-based accessor
            assert_eq!(attr(3), ffi::get_col_as_datum(table.vals(), table.tupdesc(), 0, 2));
        })
    }

    #[test]
    fn test_date_and_time_exports() {
        // 2000-01-01 is day zero
        assert_eq!(ffi::date_to_datum(0), Datum::null());
        assert_eq!(ffi::datum_to_date(ffi::date_to_datum(-36_525)), -36_525);
        assert_eq!(ffi::date_to_datum(-1).value(), usize::MAX);
        let noon = 12 * 3_600_000_000i64;
        assert_eq!(ffi::datum_to_time(ffi::time_to_datum(noon)), noon);
        let ts = 757_382_400_000_000i64;
        assert_eq!(ffi::datum_to_timestamp(ffi::timestamp_to_datum(ts)), ts);
        assert_eq!(ffi::datum_to_timetz(ffi::timetz_to_datum(-ts)), -ts);
        assert_eq!(ffi::timetz_to_datum(ts), ffi::int64_to_datum(ts));
    }

    #[test]
    fn test_array_exports() {
        let sim = SimBackend::new();
        sim.enter(|| unsafe {
            let vals = [3, 1, 2].map(pg_sys::Int32GetDatum);
            let array = ffi::array_to_datum(pg_sys::INT4OID, vals.as_ptr(), vals.len() as c_int);
            assert!(sim.owns(sim.current(), array.cast_mut_ptr::<u8>().cast_const(), 16));

            let mut n: c_int = -1;
            let elems = ffi::datum_to_array(array, &mut n);
            assert_eq!(n, 3);
            let elems = std::slice::from_raw_parts(elems, n as usize);
            let decoded: Vec<i32> = elems.iter().map(|&d| ffi::datum_to_int32(d)).collect();
            assert_eq!(decoded, [3, 1, 2]);

            let empty = ffi::array_to_datum(pg_sys::INT4OID, std::ptr::null(), 0);
            ffi::datum_to_array(empty, &mut n);
            assert_eq!(n, 0);
        })
    }

    #[test]
    fn test_called_as_trigger_export() {
        let sim = SimBackend::new();
        let mut trigger = SimTriggerData::new(
            pg_sys::TRIGGER_EVENT_AFTER | pg_sys::TRIGGER_EVENT_DELETE,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        );
        let mut agg = SimNode::new(SimBackend::TRIGGER_DATA_TAG + 1);
        sim.enter(|| unsafe {
            let mut plain = SimFcInfo::new([]);
            assert!(!ffi::called_as_trigger(plain.as_ptr()));
            let mut fired = SimFcInfo::new([]).with_context(trigger.as_node());
            assert!(ffi::called_as_trigger(fired.as_ptr()));
            let mut aggregate = SimFcInfo::new([]).with_context(agg.as_node());
            assert!(!ffi::called_as_trigger(aggregate.as_ptr()));
        })
    }

    #[test]
    fn test_trigger_fired_exports() {
        let event =
            pg_sys::TRIGGER_EVENT_BEFORE | pg_sys::TRIGGER_EVENT_ROW | pg_sys::TRIGGER_EVENT_UPDATE;
        assert!(ffi::trigger_fired_before(event));
        assert!(!ffi::trigger_fired_after(event));
        assert!(!ffi::trigger_fired_instead(event));
        assert!(ffi::trigger_fired_for_row(event));
        assert!(!ffi::trigger_fired_for_statement(event));
        assert!(ffi::trigger_fired_by_update(event));
        assert!(!ffi::trigger_fired_by_insert(event));
        assert!(!ffi::trigger_fired_by_delete(event));
        assert!(!ffi::trigger_fired_by_truncate(event));

        let truncate = pg_sys::TRIGGER_EVENT_AFTER | pg_sys::TRIGGER_EVENT_TRUNCATE;
        assert!(ffi::trigger_fired_after(truncate));
        assert!(ffi::trigger_fired_for_statement(truncate));
        assert!(ffi::trigger_fired_by_truncate(truncate));
        assert!(!ffi::trigger_fired_by_delete(truncate));
    }
}
