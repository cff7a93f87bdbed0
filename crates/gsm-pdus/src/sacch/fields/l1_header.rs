use gsm_core::PduParseErr;
use gsm_core::let_byte;

/// Uplink SACCH L1 header, TS 44.004 clause 7.2.
/// Reports the power level and timing advance used for the last burst of
/// the previous SACCH period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SacchL1Header {
    /// 5 bits, MS power control level in use
    pub ms_pwr: u8,
    /// 1 bit, fast/enhanced power control in use
    pub fpc_epc: bool,
    /// 1 bit, SACCH repetition requested by the MS
    pub srr_sro: bool,
    /// 8 bits, actual timing advance
    pub ta: u8,
}

impl SacchL1Header {
    pub const LEN: usize = 2;

    pub fn from_bytes(data: &[u8]) -> Result<Self, PduParseErr> {
        let_byte!(data, 0, b0);
        let_byte!(data, 1, ta);
        Ok(SacchL1Header {
            ms_pwr: b0 & 0x1f,
            fpc_epc: b0 & 0x20 != 0,
            srr_sro: b0 & 0x40 != 0,
            ta,
        })
    }

    pub fn to_bytes(&self) -> [u8; 2] {
        let mut b0 = self.ms_pwr & 0x1f;
        if self.fpc_epc {
            b0 |= 0x20;
        }
        if self.srr_sro {
            b0 |= 0x40;
        }
        [b0, self.ta]
    }
}
