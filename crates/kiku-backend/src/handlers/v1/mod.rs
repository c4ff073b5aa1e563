pub mod questions;
pub mod session;
