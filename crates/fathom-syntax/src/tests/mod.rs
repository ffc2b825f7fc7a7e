//! Crate-level tests for fathom-syntax.

mod unit;
