pub mod boxes;
pub mod boxfile;
pub mod clip;
pub mod commands;
pub mod config;
pub mod debug;
pub mod error;
pub mod overlaps;
pub mod refinement;
