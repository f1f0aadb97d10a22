pub mod mem;

pub use mem::raw::RawMemCtx;
