//! Series backends
//!
//! Both backends evaluate the same formula tables; they differ only in the
//! arithmetic used to accumulate the fractional part.

pub mod double;
pub mod fixed;
