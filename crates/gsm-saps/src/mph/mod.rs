use gsm_core::ChanNr;

/// New transmit parameters for a logical channel, sent after the control loops ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MphParamChangeReq {
    pub chan: ChanNr,
    /// BS power reduction in dB
    pub bs_power_red_db: u8,
    /// MS power control level to signal on the downlink SACCH
    pub ms_power_lvl: u8,
    /// Timing advance to signal on the downlink SACCH
    pub ta: u8,
    /// Repeat downlink FACCH blocks
    pub rep_facch: bool,
    /// Temporary ACCH overpower
    pub top_acch: bool,
}

/// Deactivate a logical channel in the PHY
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MphDeactivateReq {
    pub chan: ChanNr,
}
