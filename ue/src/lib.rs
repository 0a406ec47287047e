mod keys;
mod subscriber;

pub use keys::load_key_file;
pub use subscriber::{Ue, UeConfig, UeState, run_handshake};
