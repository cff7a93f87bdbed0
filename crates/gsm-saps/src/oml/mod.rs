use gsm_core::{AdminState, MoId, NackCause, NmAttributes, NmState};

/// State Changed Event Report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OmlStateChgEvRep {
    pub mo: MoId,
    pub state: NmState,
}

/// SW Activated Report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OmlSwActivatedRep {
    pub mo: MoId,
}

/// The procedure an ACK/NACK answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OmlProcedure {
    SetAttr,
    Opstart,
    ChgAdmState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OmlAck {
    pub mo: MoId,
    pub procedure: OmlProcedure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OmlNack {
    pub mo: MoId,
    pub procedure: OmlProcedure,
    pub cause: NackCause,
}

/// Set BTS/Radio Carrier/Channel Attributes, already decoded
#[derive(Debug, Clone)]
pub struct OmlSetAttrReq {
    pub mo: MoId,
    pub attrs: NmAttributes,
}

/// Opstart
#[derive(Debug, Clone)]
pub struct OmlOpstartReq {
    pub mo: MoId,
}

/// Change Administrative State
#[derive(Debug, Clone)]
pub struct OmlChgAdmStateReq {
    pub mo: MoId,
    pub admin: AdminState,
}
