pub mod action;
pub mod filter;
pub mod navigate;
pub mod session;
pub mod sort;
