/// Scalar type used throughout the simulation.
pub type Float = f64;
