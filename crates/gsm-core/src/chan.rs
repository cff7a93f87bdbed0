//! Physical and logical channel descriptions
use core::fmt;

use serde::Deserialize;

/// Physical channel configuration of a timeslot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Pchan {
    None,
    Ccch,
    CcchSdcch4,
    CcchSdcch4Cbch,
    Sdcch8,
    Sdcch8Cbch,
    TchF,
    TchH,
    Pdch,
}

impl Pchan {
    /// Length of a measurement period in TDMA frames, or None if this
    /// configuration carries no dedicated channels.
    pub fn meas_period_len(&self) -> Option<u32> {
        match self {
            Pchan::TchF | Pchan::TchH => Some(104),
            Pchan::Sdcch8 | Pchan::Sdcch8Cbch | Pchan::CcchSdcch4 | Pchan::CcchSdcch4Cbch => Some(102),
            _ => None,
        }
    }

    /// Number of dedicated sub-channels on this configuration
    pub fn num_subslots(&self) -> u8 {
        match self {
            Pchan::TchF => 1,
            Pchan::TchH => 2,
            Pchan::CcchSdcch4 | Pchan::CcchSdcch4Cbch => 4,
            Pchan::Sdcch8 | Pchan::Sdcch8Cbch => 8,
            _ => 0,
        }
    }
}

/// Logical channel type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LchanType {
    Sdcch,
    TchF,
    TchH,
}

impl LchanType {
    pub fn is_tch(&self) -> bool {
        matches!(self, LchanType::TchF | LchanType::TchH)
    }
}

/// Traffic mode of a logical channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TchMode {
    Signalling,
    /// Full/half rate speech version 1
    SpeechV1,
    /// Enhanced full rate
    SpeechEfr,
    /// Adaptive multi-rate
    SpeechAmr,
    /// Circuit switched data
    Data,
}

/// Address of a logical channel: transceiver, timeslot, sub-slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChanNr {
    pub trx: u8,
    pub ts: u8,
    pub ss: u8,
}

impl ChanNr {
    pub fn new(trx: u8, ts: u8, ss: u8) -> Self {
        ChanNr { trx, ts, ss }
    }
}

impl fmt::Display for ChanNr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trx={} ts={} ss={}", self.trx, self.ts, self.ss)
    }
}
