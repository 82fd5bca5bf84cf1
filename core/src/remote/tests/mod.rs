//! Tests for the remote expression core
//!
//! Organized by operator family

mod helpers;

mod numeric_tests;
mod serialization_tests;
mod time_tests;
