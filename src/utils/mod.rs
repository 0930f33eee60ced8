//! Supporting utilities.

pub mod fs;
