//! Model module.
//!
//! Contains league entities and repositories for data access.

pub mod result;
pub mod season;

pub use result::*;
pub use season::*;
