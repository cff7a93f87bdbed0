use gsm_core::ChanNr;

/// One uplink measurement sample, reported by the PHY per received burst/block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UlMeasSample {
    /// Bit error rate in 0.01% steps, 0..=10000
    pub ber10k: u16,
    /// Received signal strength as positive dBm magnitude (-80 dBm -> 80)
    pub inv_rssi: u8,
    /// Carrier-to-interference ratio in centiBel
    pub ci_cb: i16,
    /// Timing offset in 1/256 bit units
    pub ta_offs_256bits: i16,
    /// Sample belongs to the SUB set. False lets the aggregator decide.
    pub is_sub: bool,
}

impl UlMeasSample {
    /// Substituted for each sample missing at the end of a period:
    /// 100% BER, -109 dBm, no C/I, no timing offset
    pub const DUMMY: UlMeasSample = UlMeasSample {
        ber10k: 10000,
        inv_rssi: 109,
        ci_cb: 0,
        ta_offs_256bits: 0,
        is_sub: false,
    };
}

/// PH-DATA measurement indication
#[derive(Debug)]
pub struct PhMeasInd {
    pub chan: ChanNr,
    pub fn_num: u32,
    pub sample: UlMeasSample,
}

/// Uplink SACCH block indication. `block` is None when the block was lost.
#[derive(Debug)]
pub struct PhSacchInd {
    pub chan: ChanNr,
    pub fn_num: u32,
    pub block: Option<Vec<u8>>,
}

/// Downlink DTX was applied on this channel during the current period
#[derive(Debug)]
pub struct PhDtxDlInd {
    pub chan: ChanNr,
}
