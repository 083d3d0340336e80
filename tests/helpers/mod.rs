//! Test helpers module
//!
//! Database setup, service wiring and fake data builders shared by the
//! integration tests.

#![allow(dead_code)]

pub mod database_helper;
pub mod test_context;
pub mod test_data;

pub use database_helper::*;
pub use test_context::*;
pub use test_data::*;
