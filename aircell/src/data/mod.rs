mod config;
pub mod keys;
mod ran_context;
mod ue_context;

pub use config::*;
pub use ran_context::*;
pub use ue_context::*;
