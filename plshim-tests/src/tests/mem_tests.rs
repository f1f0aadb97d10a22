#[cfg(test)]
mod tests {
    use crate::SimBackend;
    use plshim::mem::{self, current_context, MemCx};
    use plshim::pg_sys::RawMemCtx;
    use std::ffi::c_void;

    #[derive(Debug, Clone, Copy, PartialEq, bytemuck::Zeroable, bytemuck::Pod)]
    #[repr(C)]
    struct Point {
        x: f64,
        y: f64,
    }

    #[test]
    fn test_ret_copies_into_current_context() {
        let sim = SimBackend::new();
        sim.enter(|| {
            let value = *b"return me";
            let copy = unsafe { mem::ret(value.as_ptr().cast(), value.len()) };
            assert_ne!(copy.cast_const(), value.as_ptr().cast::<c_void>());
            assert!(sim.owns(sim.current(), copy.cast::<u8>(), value.len()));
            assert_eq!(sim.allocation_size(copy.cast::<u8>()), Some(value.len()));
            let copied = unsafe { std::slice::from_raw_parts(copy.cast::<u8>(), value.len()) };
            assert_eq!(copied, &value);
        })
    }

    #[test]
    fn test_ret_zero_size() {
        let sim = SimBackend::new();
        sim.enter(|| {
            let copy = unsafe { mem::ret(std::ptr::null(), 0) };
            assert!(!copy.is_null());
            assert_eq!(sim.allocations(sim.current()), 1);
        })
    }

    #[test]
    fn test_ret_follows_context_switch() {
        let sim = SimBackend::new();
        let outer = sim.current();
        let inner = sim.create_context("ExprContext");
        sim.enter(|| {
            let previous = sim.switch_to(inner);
            assert_eq!(previous, outer);
            let copy = current_context(|mcx| mcx.ret(b"abc"));
            assert!(sim.owns(inner, copy.as_ptr(), 3));
            assert!(!sim.owns(outer, copy.as_ptr(), 3));
            sim.switch_to(outer);
        });
        assert_eq!(sim.allocations(inner), 1);
        sim.reset(inner);
        assert_eq!(sim.allocations(inner), 0);
    }

    #[test]
    fn test_explicit_context() {
        let sim = SimBackend::new();
        let other = sim.create_context("SPI Proc");
        sim.enter(|| {
            let mcx = unsafe { MemCx::from_raw(RawMemCtx::from_raw(other)) };
            let bytes = mcx.copy_bytes(&[1, 2, 3, 4]);
            assert_eq!(bytes, &[1, 2, 3, 4]);
            assert!(sim.owns(other, bytes.as_ptr(), 4));
            assert_eq!(sim.allocations(sim.current()), 0);
        })
    }

    #[test]
    fn test_ret_value() {
        let sim = SimBackend::new();
        sim.enter(|| {
            let point = Point { x: 1.5, y: -2.0 };
            let copy = current_context(|mcx| mcx.ret_value(&point));
            assert_ne!(copy.as_ptr().cast_const(), &point as *const Point);
            assert_eq!(unsafe { copy.as_ptr().read() }, point);
            assert_eq!(sim.allocation_size(copy.as_ptr().cast::<u8>()), Some(16));
        })
    }

    #[test]
    #[should_panic(expected = "no plshim backend entered")]
    fn test_no_backend_panics() {
        current_context(|mcx| mcx.ret(b"x"));
    }
}
