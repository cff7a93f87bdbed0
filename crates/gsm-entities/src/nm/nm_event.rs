use core::fmt;

use gsm_core::{NackCause, NmAttributes};

/// Event kinds understood by the NM object FSMs. The discriminant is the bit
/// position used in the per-state event masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NmEventKind {
    SwAct = 0,
    OmlUp,
    RxSetAttr,
    RxOpstart,
    OpstartAck,
    OpstartNack,
    ShutdownStart,
    ShutdownFinish,
    RslUp,
    RslDown,
    PhyLinkUp,
    PhyLinkDown,
    Disable,
    BbTranscEnabled,
    BbTranscDisabled,
    RcarrierEnabled,
    RcarrierDisabled,
    BtsEnabled,
    BtsDisabled,
}

impl NmEventKind {
    #[inline]
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Builds an event mask from a list of event kinds
#[macro_export]
macro_rules! ev_mask {
    ($($ev:ident)|* ) => {
        0u32 $( | $crate::nm::nm_event::NmEventKind::$ev.bit() )*
    };
}

/// An event dispatched into an NM object FSM, with its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NmEvent {
    /// Software of the object was activated by the hardware layer
    SwAct,
    /// OML link to the BSC came up
    OmlUp,
    /// Set Attributes received from the BSC
    RxSetAttr(NmAttributes),
    /// Opstart received from the BSC
    RxOpstart,
    /// Hardware model acknowledged the opstart
    OpstartAck,
    /// Hardware model refused the opstart
    OpstartNack(NackCause),
    ShutdownStart,
    ShutdownFinish,
    RslUp,
    RslDown,
    PhyLinkUp,
    PhyLinkDown,
    /// Administratively locked by the BSC
    Disable,
    BbTranscEnabled,
    BbTranscDisabled,
    RcarrierEnabled,
    RcarrierDisabled,
    BtsEnabled,
    BtsDisabled,
}

impl NmEvent {
    pub fn kind(&self) -> NmEventKind {
        match self {
            NmEvent::SwAct => NmEventKind::SwAct,
            NmEvent::OmlUp => NmEventKind::OmlUp,
            NmEvent::RxSetAttr(_) => NmEventKind::RxSetAttr,
            NmEvent::RxOpstart => NmEventKind::RxOpstart,
            NmEvent::OpstartAck => NmEventKind::OpstartAck,
            NmEvent::OpstartNack(_) => NmEventKind::OpstartNack,
            NmEvent::ShutdownStart => NmEventKind::ShutdownStart,
            NmEvent::ShutdownFinish => NmEventKind::ShutdownFinish,
            NmEvent::RslUp => NmEventKind::RslUp,
            NmEvent::RslDown => NmEventKind::RslDown,
            NmEvent::PhyLinkUp => NmEventKind::PhyLinkUp,
            NmEvent::PhyLinkDown => NmEventKind::PhyLinkDown,
            NmEvent::Disable => NmEventKind::Disable,
            NmEvent::BbTranscEnabled => NmEventKind::BbTranscEnabled,
            NmEvent::BbTranscDisabled => NmEventKind::BbTranscDisabled,
            NmEvent::RcarrierEnabled => NmEventKind::RcarrierEnabled,
            NmEvent::RcarrierDisabled => NmEventKind::RcarrierDisabled,
            NmEvent::BtsEnabled => NmEventKind::BtsEnabled,
            NmEvent::BtsDisabled => NmEventKind::BtsDisabled,
        }
    }
}

impl fmt::Display for NmEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind())
    }
}
