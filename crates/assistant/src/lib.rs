pub mod baseline;
pub mod engine;

pub use baseline::Baseline;
pub use engine::{Engine, Response, ResponseKind};
