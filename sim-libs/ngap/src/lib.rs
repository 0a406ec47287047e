//! ngap - transport framing and correlation envelopes between RAN and core

mod envelope;
mod frame;

pub use envelope::{
    AmfUeId, EnvelopeType, InitialUeMessage, NasTransport, NgapPdu, SetupRequest, SetupResponse,
};
pub use frame::{FrameError, MAX_FRAME_LEN, recv_frame, send_frame};
