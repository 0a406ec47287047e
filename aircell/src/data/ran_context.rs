use super::UeContext;
use ngap::{AmfUeId, SetupRequest};
use std::collections::HashMap;

/// State for one RAN connection.  Owned by the connection's handler task and
/// dropped with it - there is deliberately no process-wide registry.
#[derive(Debug)]
pub struct RanContext {
    pub ran_id: u32,
    pub tac: u32,
    pub plmn: u32,
    pub ues: HashMap<AmfUeId, UeContext>,
}

impl RanContext {
    pub fn new(setup: &SetupRequest) -> Self {
        RanContext {
            ran_id: setup.ran_id,
            tac: setup.tac,
            plmn: setup.plmn,
            ues: HashMap::new(),
        }
    }

    /// Mint a subscriber context id not already in use on this connection.
    pub fn mint_ue_id(&self) -> AmfUeId {
        let mut id = AmfUeId(rand::random());
        while self.ues.contains_key(&id) {
            id = AmfUeId(rand::random());
        }
        id
    }
}
