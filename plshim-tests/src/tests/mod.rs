mod datum_tests;
mod ffi_tests;
mod mem_tests;
mod trigger_tests;
