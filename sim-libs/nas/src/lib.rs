//! nas - signalling PDU catalogue and wire codec for the aircell control plane
//!
//! Layout rules (WIRE_VERSION 1): multi-byte integers are big-endian;
//! variable-length byte strings and UTF-8 strings carry a u16 length prefix;
//! fixed-size arrays are written raw.  Each message is decoded layer by layer
//! through `codec::Reader`, never by hand-computed offsets.

pub mod codec;
mod messages;
mod secured;

pub use codec::{CodecError, Reader, Writer};
pub use messages::*;
pub use secured::{PduError, SecuredMessage};

pub const WIRE_VERSION: u8 = 1;
