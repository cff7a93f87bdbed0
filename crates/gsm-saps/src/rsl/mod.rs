use gsm_core::{ChanNr, LchanType, Pchan, TchMode};
use gsm_pdus::sacch::fields::l1_header::SacchL1Header;

/// Repeated ACCH capabilities granted by the BSC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepAcchCap {
    /// Repeat FACCH for command frames
    pub dl_facch_cmd: bool,
    /// Repeat FACCH for all frames
    pub dl_facch_all: bool,
    /// RXQUAL threshold, 0 means always on
    pub rxqual: u8,
}

/// Temporary ACCH overpower capabilities granted by the BSC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TopAcchCap {
    /// 0 disables overpower
    pub overpower_db: u8,
    /// RXQUAL threshold, 0 means always on
    pub rxqual: u8,
}

/// RSL CHANNEL ACTIVATION, already decoded
#[derive(Debug, Clone)]
pub struct RslChanActiv {
    pub chan: ChanNr,
    pub pchan: Pchan,
    pub lchan_type: LchanType,
    pub tch_mode: TchMode,
    /// Initial MS power control level
    pub ms_power_lvl: u8,
    /// Highest power (lowest level) the MS may be driven to. None keeps the level fixed.
    pub ms_power_max_lvl: Option<u8>,
    /// Initial BS power reduction in dB
    pub bs_power_red_db: u8,
    /// Maximum BS power reduction. None keeps the reduction fixed.
    pub bs_power_max_db: Option<u8>,
    pub ta: u8,
    pub rep_acch_cap: RepAcchCap,
    pub top_acch_cap: TopAcchCap,
}

/// RSL RF CHANNEL RELEASE
#[derive(Debug, Clone)]
pub struct RslRfChanRel {
    pub chan: ChanNr,
}

/// RXLEV / RXQUAL for one set of measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeasRepUnidir {
    pub rx_lev: u8,
    pub rx_qual: u8,
}

/// Uplink measurement result of one period, FULL and SUB sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UlMeasRes {
    pub full: MeasRepUnidir,
    pub sub: MeasRepUnidir,
}

/// Timing offset statistics over one period, in 1/256 bit units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtMeasStats {
    pub toa256_min: i16,
    pub toa256_max: i16,
    pub toa256_mean: i16,
    pub toa256_std_dev: u16,
}

/// RSL MEASUREMENT RESULT
#[derive(Debug, Clone)]
pub struct RslMeasRes {
    pub chan: ChanNr,
    /// Sequence number, wraps at 256
    pub res_nr: u8,
    pub ul: UlMeasRes,
    pub bs_power_red_db: u8,
    /// Present when a full SACCH block was received
    pub l1_info: Option<SacchL1Header>,
    /// Raw L3 measurement report from the MS
    pub l3_info: Option<Vec<u8>>,
    /// MS timing offset, when known
    pub timing_offset: Option<i32>,
    pub ext: Option<ExtMeasStats>,
}
