//! Utility functions for the compiler

pub mod string;
pub mod time;
