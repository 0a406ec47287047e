mod aircell;
mod data;
mod procedures;
mod userplane;

use data::*;

pub use aircell::Aircell;
pub use data::{Config, keys};
pub use procedures::HandlerApi;
