//! `varlena` headers, as described in Postgres' `varatt.h`.
//!
//! A varlena starts with either a 4-byte header holding the total size
//! (header included) or, for short inline values, a 1-byte header. The bit
//! layout of both depends on the target's endianness.

/// `struct varlena`: the header, then the payload.
#[repr(C)]
pub struct varlena {
    pub vl_len_: [u8; 4],
    pub vl_dat: [u8; 0],
}

pub type text = varlena;
pub type bytea = varlena;

/// Size of the 4-byte header.
pub const VARHDRSZ: usize = 4;
/// Size of the 1-byte header used for short inline values.
pub const VARHDRSZ_SHORT: usize = 1;
/// Header in front of a TOAST pointer: the 1-byte header plus the tag.
pub const VARHDRSZ_EXTERNAL: usize = 2;
/// Largest payload (plus header) that fits a 1-byte header.
pub const VARATT_SHORT_MAX: usize = 0x7F;

pub const VARTAG_INDIRECT: u8 = 1;
pub const VARTAG_EXPANDED_RO: u8 = 2;
pub const VARTAG_EXPANDED_RW: u8 = 3;
pub const VARTAG_ONDISK: u8 = 18;

/// `sizeof(varatt_external)`
const VARATT_EXTERNAL_SIZE: usize = 16;

#[inline]
unsafe fn first_byte(ptr: *const varlena) -> u8 {
    ptr.cast::<u8>().read()
}

#[inline]
unsafe fn header_4b(ptr: *const varlena) -> u32 {
    ptr.cast::<u32>().read_unaligned()
}

#[cfg(target_endian = "little")]
mod bits {
    pub const fn is_4b(b: u8) -> bool {
        (b & 0x01) == 0x00
    }
    pub const fn is_4b_u(b: u8) -> bool {
        (b & 0x03) == 0x00
    }
    pub const fn is_4b_c(b: u8) -> bool {
        (b & 0x03) == 0x02
    }
    pub const fn is_1b(b: u8) -> bool {
        (b & 0x01) == 0x01
    }
    pub const fn is_1b_e(b: u8) -> bool {
        b == 0x01
    }
    pub const fn size_4b(h: u32) -> usize {
        ((h >> 2) & 0x3FFF_FFFF) as usize
    }
    pub const fn size_1b(b: u8) -> usize {
        ((b >> 1) & 0x7F) as usize
    }
    pub const fn header_4b(len: usize) -> u32 {
        (len as u32) << 2
    }
    pub const fn header_1b(len: usize) -> u8 {
        ((len as u8) << 1) | 0x01
    }
}

#[cfg(target_endian = "big")]
mod bits {
    pub const fn is_4b(b: u8) -> bool {
        (b & 0x80) == 0x00
    }
    pub const fn is_4b_u(b: u8) -> bool {
        (b & 0xC0) == 0x00
    }
    pub const fn is_4b_c(b: u8) -> bool {
        (b & 0xC0) == 0x40
    }
    pub const fn is_1b(b: u8) -> bool {
        (b & 0x80) == 0x80
    }
    pub const fn is_1b_e(b: u8) -> bool {
        b == 0x80
    }
    pub const fn size_4b(h: u32) -> usize {
        (h & 0x3FFF_FFFF) as usize
    }
    pub const fn size_1b(b: u8) -> usize {
        (b & 0x7F) as usize
    }
    pub const fn header_4b(len: usize) -> u32 {
        (len as u32) & 0x3FFF_FFFF
    }
    pub const fn header_1b(len: usize) -> u8 {
        (len as u8) | 0x80
    }
}

/// # Safety
/// `ptr` must point to at least one readable byte of a varlena.
#[inline]
pub unsafe fn VARATT_IS_4B(ptr: *const varlena) -> bool {
    bits::is_4b(first_byte(ptr))
}

/// Uncompressed, inline, 4-byte header.
///
/// # Safety
/// `ptr` must point to at least one readable byte of a varlena.
#[inline]
pub unsafe fn VARATT_IS_4B_U(ptr: *const varlena) -> bool {
    bits::is_4b_u(first_byte(ptr))
}

/// Compressed, inline, 4-byte header.
///
/// # Safety
/// `ptr` must point to at least one readable byte of a varlena.
#[inline]
pub unsafe fn VARATT_IS_4B_C(ptr: *const varlena) -> bool {
    bits::is_4b_c(first_byte(ptr))
}

/// # Safety
/// `ptr` must point to at least one readable byte of a varlena.
#[inline]
pub unsafe fn VARATT_IS_1B(ptr: *const varlena) -> bool {
    bits::is_1b(first_byte(ptr))
}

/// TOAST pointer rather than inline data.
///
/// # Safety
/// `ptr` must point to at least one readable byte of a varlena.
#[inline]
pub unsafe fn VARATT_IS_1B_E(ptr: *const varlena) -> bool {
    bits::is_1b_e(first_byte(ptr))
}

/// Anything other than an uncompressed 4-byte-header value. These are the
/// values `pg_detoast_datum` has to copy.
///
/// # Safety
/// `ptr` must point to at least one readable byte of a varlena.
#[inline]
pub unsafe fn VARATT_IS_EXTENDED(ptr: *const varlena) -> bool {
    !VARATT_IS_4B_U(ptr)
}

/// `VARSIZE(ptr)`: total size from a 4-byte header, header included.
///
/// # Safety
/// `ptr` must point to a varlena with a 4-byte header.
#[inline]
pub unsafe fn VARSIZE(ptr: *const varlena) -> usize {
    bits::size_4b(header_4b(ptr))
}

/// # Safety
/// `ptr` must point to a varlena with a 1-byte header.
#[inline]
pub unsafe fn VARSIZE_SHORT(ptr: *const varlena) -> usize {
    bits::size_1b(first_byte(ptr))
}

/// # Safety
/// `ptr` must point to a TOAST pointer.
#[inline]
pub unsafe fn VARTAG_EXTERNAL(ptr: *const varlena) -> u8 {
    ptr.cast::<u8>().add(1).read()
}

/// Size of the payload that follows a TOAST pointer's 2-byte header.
#[inline]
pub const fn VARTAG_SIZE(tag: u8) -> usize {
    match tag {
        VARTAG_INDIRECT | VARTAG_EXPANDED_RO | VARTAG_EXPANDED_RW => {
            core::mem::size_of::<*mut core::ffi::c_void>()
        }
        VARTAG_ONDISK => VARATT_EXTERNAL_SIZE,
        _ => 0,
    }
}

/// `VARSIZE_ANY(ptr)`: total size whatever the header kind.
///
/// # Safety
/// `ptr` must point to a readable varlena header.
#[inline]
pub unsafe fn VARSIZE_ANY(ptr: *const varlena) -> usize {
    if VARATT_IS_1B_E(ptr) {
        VARHDRSZ_EXTERNAL + VARTAG_SIZE(VARTAG_EXTERNAL(ptr))
    } else if VARATT_IS_1B(ptr) {
        VARSIZE_SHORT(ptr)
    } else {
        VARSIZE(ptr)
    }
}

/// `VARSIZE_ANY_EXHDR(ptr)`: payload size whatever the header kind.
///
/// # Safety
/// `ptr` must point to a readable varlena header.
#[inline]
pub unsafe fn VARSIZE_ANY_EXHDR(ptr: *const varlena) -> usize {
    if VARATT_IS_1B_E(ptr) {
        VARTAG_SIZE(VARTAG_EXTERNAL(ptr))
    } else if VARATT_IS_1B(ptr) {
        VARSIZE_SHORT(ptr) - VARHDRSZ_SHORT
    } else {
        VARSIZE(ptr) - VARHDRSZ
    }
}

/// `SET_VARSIZE(ptr, len)`: write a 4-byte header.
///
/// # Safety
/// `ptr` must point to at least four writable bytes.
#[inline]
pub unsafe fn SET_VARSIZE(ptr: *mut varlena, len: usize) {
    debug_assert!(len <= 0x3FFF_FFFF, "varlena too large: {len}");
    ptr.cast::<u32>().write_unaligned(bits::header_4b(len))
}

/// `SET_VARSIZE_SHORT(ptr, len)`: write a 1-byte header.
///
/// # Safety
/// `ptr` must point to at least one writable byte.
#[inline]
pub unsafe fn SET_VARSIZE_SHORT(ptr: *mut varlena, len: usize) {
    debug_assert!(len <= VARATT_SHORT_MAX, "short varlena too large: {len}");
    ptr.cast::<u8>().write(bits::header_1b(len))
}

/// `VARDATA(ptr)`: start of the payload behind a 4-byte header.
///
/// # Safety
/// `ptr` must point to a varlena with a 4-byte header.
#[inline]
pub unsafe fn VARDATA(ptr: *const varlena) -> *const u8 {
    ptr.cast::<u8>().add(VARHDRSZ)
}

/// `VARDATA_ANY(ptr)`: start of the payload for inline values.
///
/// # Safety
/// `ptr` must point to an inline (non-TOAST-pointer) varlena.
#[inline]
pub unsafe fn VARDATA_ANY(ptr: *const varlena) -> *const u8 {
    if VARATT_IS_1B(ptr) {
        ptr.cast::<u8>().add(VARHDRSZ_SHORT)
    } else {
        VARDATA(ptr)
    }
}
