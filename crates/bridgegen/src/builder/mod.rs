//! Builder API for bridgegen
//!
//! Runs the whole pipeline (load, parse, collect, render, write) from one
//! configured value. Used by the CLI and by build scripts.

mod generator_builder;

pub use generator_builder::{BuildOutput, Generation, GeneratorBuilder};
