mod fetch;

pub use fetch::{MAX_FETCH_BYTES, fetch};
