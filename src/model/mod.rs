pub mod config;
pub mod filter;
pub mod task;
pub mod task_list;

pub use config::*;
pub use filter::*;
pub use task::*;
pub use task_list::*;
