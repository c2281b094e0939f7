//! Configuration module.

pub mod db;
pub mod env;

pub use db::*;
pub use env::*;
