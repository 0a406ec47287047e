use nas::SecurityCapabilities;
use ngap::AmfUeId;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UeState {
    RegistrationInitiated,
    Authentication,
    SecurityMode,
    Registered,
}

/// State for one registration attempt.  Keyed by `amf_ue_id` in the owning
/// RanContext; torn down with the RAN connection.
#[derive(Debug)]
pub struct UeContext {
    pub amf_ue_id: AmfUeId,
    /// RAN-side correlation id.  Echoed on downlink transports, never used
    /// to locate or authorize anything.
    pub ran_ue_id: u32,
    pub requested: SecurityCapabilities,
    /// Algorithms in force once authentication has succeeded.
    pub selected: Option<SecurityCapabilities>,
    pub authenticated: bool,
    /// The one outstanding challenge, matched by exact value.
    pub challenge: [u8; 32],
    /// session id -> session type
    pub sessions: HashMap<u8, u8>,
    pub locations: Vec<String>,
    pub state: UeState,
}

impl UeContext {
    pub fn new(
        amf_ue_id: AmfUeId,
        ran_ue_id: u32,
        requested: SecurityCapabilities,
        challenge: [u8; 32],
    ) -> Self {
        UeContext {
            amf_ue_id,
            ran_ue_id,
            requested,
            selected: None,
            authenticated: false,
            challenge,
            sessions: HashMap::new(),
            locations: vec![],
            state: UeState::RegistrationInitiated,
        }
    }
}
