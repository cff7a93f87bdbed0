//! Network management object state per TS 12.21
use core::fmt;

use crate::chan::Pchan;

/// Administrative state of a managed object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminState {
    Locked,
    Unlocked,
    /// Object is being shut down, traffic is draining
    Shutdown,
}

/// Operational state of a managed object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpState {
    Disabled,
    Enabled,
}

/// Availability status of a managed object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailState {
    NotInstalled,
    OffLine,
    /// Waiting for another object to become enabled
    Dependency,
    /// Object is fully available. Only valid with OpState::Enabled.
    Ok,
}

/// The (operational, availability, administrative) triple reported to the BSC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NmState {
    pub operational: OpState,
    pub availability: AvailState,
    pub administrative: AdminState,
}

impl Default for NmState {
    /// Disabled, not installed, locked
    fn default() -> Self {
        NmState {
            operational: OpState::Disabled,
            availability: AvailState::NotInstalled,
            administrative: AdminState::Locked,
        }
    }
}

impl NmState {
    /// Enabled implies availability Ok, and Dependency implies Disabled.
    pub fn is_consistent(&self) -> bool {
        match (self.operational, self.availability) {
            (OpState::Enabled, AvailState::Ok) => true,
            (OpState::Enabled, _) => false,
            (OpState::Disabled, AvailState::Ok) => false,
            (OpState::Disabled, _) => true,
        }
    }
}

impl fmt::Display for NmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}/{:?}", self.operational, self.availability, self.administrative)
    }
}

/// Identity of a managed object in the NM tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoId {
    SiteManager,
    GprsNse,
    Bts { bts: u8 },
    RadioCarrier { bts: u8, trx: u8 },
    BasebandTransceiver { bts: u8, trx: u8 },
    Channel { bts: u8, trx: u8, ts: u8 },
}

impl MoId {
    pub fn class_name(&self) -> &'static str {
        match self {
            MoId::SiteManager => "SITE-MGR",
            MoId::GprsNse => "GPRS-NSE",
            MoId::Bts { .. } => "BTS",
            MoId::RadioCarrier { .. } => "RADIO-CARRIER",
            MoId::BasebandTransceiver { .. } => "BB-TRANSC",
            MoId::Channel { .. } => "CHANNEL",
        }
    }
}

impl fmt::Display for MoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoId::SiteManager | MoId::GprsNse => write!(f, "{}", self.class_name()),
            MoId::Bts { bts } => write!(f, "{}({})", self.class_name(), bts),
            MoId::RadioCarrier { bts, trx } | MoId::BasebandTransceiver { bts, trx } => {
                write!(f, "{}({},{})", self.class_name(), bts, trx)
            }
            MoId::Channel { bts, trx, ts } => write!(f, "{}({},{},{})", self.class_name(), bts, trx, ts),
        }
    }
}

/// NACK causes, TS 12.21 section 9.4.36
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NackCause {
    IncorrectMsgStructure,
    InvalidMsgType,
    InvalidObjectClass,
    ObjClassNotSupported,
    BtsNrUnknown,
    TrxNrUnknown,
    ObjInstanceUnknown,
    InvalidAttrId,
    AttrIdNotSupported,
    ParamRange,
    AttrListInconsistent,
    SpecImplNotSupported,
    CantPerform,
    ResNotImplemented,
    ResNotAvailable,
    FreqNotAvailable,
}

impl NackCause {
    pub fn into_raw(self) -> u8 {
        match self {
            NackCause::IncorrectMsgStructure => 0x01,
            NackCause::InvalidMsgType => 0x02,
            NackCause::InvalidObjectClass => 0x05,
            NackCause::ObjClassNotSupported => 0x06,
            NackCause::BtsNrUnknown => 0x07,
            NackCause::TrxNrUnknown => 0x08,
            NackCause::ObjInstanceUnknown => 0x09,
            NackCause::InvalidAttrId => 0x0c,
            NackCause::AttrIdNotSupported => 0x0d,
            NackCause::ParamRange => 0x0e,
            NackCause::AttrListInconsistent => 0x0f,
            NackCause::SpecImplNotSupported => 0x10,
            NackCause::CantPerform => 0x11,
            NackCause::ResNotImplemented => 0x19,
            NackCause::ResNotAvailable => 0x1a,
            NackCause::FreqNotAvailable => 0x1b,
        }
    }
}

/// Attributes carried by a Set Attributes request, already decoded.
/// Absent fields are left unchanged by the hardware model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NmAttributes {
    /// Absolute radio frequency channel number (radio carrier)
    pub arfcn: Option<u16>,
    /// Nominal power reduction in 2 dB steps (radio carrier)
    pub max_power_red: Option<u8>,
    /// Channel combination (channel)
    pub pchan: Option<Pchan>,
    /// Training sequence code, 0..7 (channel)
    pub tsc: Option<u8>,
    /// Base station identity code (BTS)
    pub bsic: Option<u8>,
}
