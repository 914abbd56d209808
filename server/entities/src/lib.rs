//! Database entities of the versions server

pub mod prelude;

pub mod version;
