pub mod event;
pub mod lifecycle;
pub mod names;

pub use event::*;
pub use names::is_priority;
