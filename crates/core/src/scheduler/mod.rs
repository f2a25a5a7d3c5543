pub mod command;
pub mod engine;
pub mod runner;

pub use command::*;
pub use engine::*;
pub use runner::{Startup, run};
