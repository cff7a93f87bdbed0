use core::fmt;

use gsm_core::PduParseErr;
use gsm_core::let_byte;

/// Measurement Results IE, TS 44.018 clause 10.5.2.20.
/// Only the serving cell part is decoded, neighbour cell data is left in the raw report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeasResults {
    /// 1 bit, BA list indicator
    pub ba_used: bool,
    /// 1 bit, DTX was used by the MS on the uplink during the period
    pub dtx_used: bool,
    /// 6 bits
    pub rxlev_full: u8,
    /// 1 bit, encoded inverted: true here means MEAS-VALID bit is 0
    pub meas_valid: bool,
    /// 6 bits
    pub rxlev_sub: u8,
    /// 3 bits
    pub rxqual_full: u8,
    /// 3 bits
    pub rxqual_sub: u8,
}

impl MeasResults {
    /// Serving cell part only
    pub const LEN: usize = 3;

    pub fn from_bytes(data: &[u8]) -> Result<Self, PduParseErr> {
        let_byte!(data, 0, b0);
        let_byte!(data, 1, b1);
        let_byte!(data, 2, b2);
        Ok(MeasResults {
            ba_used: b0 & 0x80 != 0,
            dtx_used: b0 & 0x40 != 0,
            rxlev_full: b0 & 0x3f,
            meas_valid: b1 & 0x40 == 0,
            rxlev_sub: b1 & 0x3f,
            rxqual_full: (b2 >> 4) & 0x07,
            rxqual_sub: (b2 >> 1) & 0x07,
        })
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        let mut b0 = self.rxlev_full & 0x3f;
        if self.ba_used {
            b0 |= 0x80;
        }
        if self.dtx_used {
            b0 |= 0x40;
        }
        let mut b1 = self.rxlev_sub & 0x3f;
        if !self.meas_valid {
            b1 |= 0x40;
        }
        let b2 = ((self.rxqual_full & 0x07) << 4) | ((self.rxqual_sub & 0x07) << 1);
        [b0, b1, b2]
    }

    /// A report the MS itself marked as valid
    pub fn is_valid(&self) -> bool {
        self.meas_valid
    }
}

impl fmt::Display for MeasResults {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "MeasResults {{ valid: {} dtx: {} full: {}/{} sub: {}/{} }}",
            self.meas_valid, self.dtx_used, self.rxlev_full, self.rxqual_full, self.rxlev_sub, self.rxqual_sub,
        )
    }
}
