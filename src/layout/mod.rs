pub mod dataset;
pub mod resolver;
pub mod scales;
