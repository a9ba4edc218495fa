pub mod config;
pub mod datetime;
pub mod logger;
pub mod solver;

pub use raptor;
