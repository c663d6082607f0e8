//! Host-side plumbing for the `gbmapper` command-line tool: configuration,
//! save file persistence, scripted bus writes and the mapping report.

pub mod config;
pub mod persist;
pub mod report;
pub mod script;
