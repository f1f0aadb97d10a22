//! # Memory contexts at the adapter boundary
//!
//! *Note: the lifetime-carrying wrapper most code wants is `plshim::mem::MemCx`.
//! This module only holds the raw, unchecked layer underneath it.*
//!
//! Postgres does its allocation in "memory contexts": pools that are reset or
//! deleted as a whole when the call, query or transaction that owns them
//! ends. Anything the adapter hands back to Postgres (a `text` result, a
//! buffer produced by `ret`) must come from one of these pools. Memory from
//! Rust's allocator would either leak, or be passed to `pfree` by a server
//! that never allocated it.
//!
//! ## Usage guidelines
//!
//! - Never free. The adapter only ever allocates; the context owning the
//!   allocation reclaims it.
//!
//! - Never cache a pointer past the context that produced it. Once the
//!   context is reset the memory is gone, whether or not Rust still holds a
//!   pointer to it.
//!
//! - Pass the context explicitly. Functions that allocate memory for their
//!   caller take the context as an argument rather than consulting
//!   `CurrentMemoryContext` behind the caller's back:
//!
//!   ```ignore
//!   // Bad: the caller cannot tell where the result lives
//!   let text = make_text(bytes);
//!   // Good
//!   let text = make_text(mcx, bytes);
//!   ```
//!
//! - Inbound values are borrowed. Arguments and SPI results belong to
//!   Postgres for the duration of the call; the adapter reads them in place.
//!
//! The only context the adapter borrows on its own initiative is the current
//! one, and only for the extent of a single exported call.
pub mod raw;
