mod relay;

pub use relay::{Gnb, GnbConfig};
