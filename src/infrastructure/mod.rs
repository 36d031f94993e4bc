//! Infrastructure layer: concrete implementations of the domain ports.

pub mod ids;
