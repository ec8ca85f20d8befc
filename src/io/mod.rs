pub mod config_io;
pub mod log;
pub mod taskwarrior;
