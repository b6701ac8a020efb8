#![allow(non_snake_case)]

use types::Float;
pub extern crate nalgebra as na;

pub mod actuation;
pub mod config;
pub mod control;
pub mod integrators;
pub mod plant;
pub mod plot;
pub mod record;
pub mod reference;
pub mod simulate;
pub mod types;
pub mod util;

// Wasm bindings
pub mod interface;

pub const PI: Float = std::f64::consts::PI;
pub const TWO_PI: Float = 2.0 * PI;

/// Number of fixed-size integration sub-steps processed per rendered frame.
pub const SUBSTEPS_PER_FRAME: usize = 10;
