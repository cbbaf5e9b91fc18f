//! Embassy tasks

mod persist;

pub use persist::{persist_task, Storage};
