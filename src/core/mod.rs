//! Core traits and types used throughout the library.

pub mod ode;
pub mod row;
pub mod solout;
pub mod state;
pub mod status;
pub mod trace;
