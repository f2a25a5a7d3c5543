pub mod batch_queue;
pub mod debounce;

pub use batch_queue::*;
pub use debounce::{Debounce, TaskHandle};
