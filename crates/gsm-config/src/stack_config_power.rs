use std::collections::HashMap;

use serde::Deserialize;
use toml::Value;

/// Optional pre-processing of measurements before the power control decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerFilter {
    None,
    /// Exponentially weighted moving average, alpha in percent
    Ewma { alpha: u8 },
}

/// Closed loop power control parameters for one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerCtrlParams {
    /// Wanted received level in dBm
    pub target_dbm: i32,
    /// No adjustment while within target +/- hysteresis
    pub hysteresis_db: u8,
    /// Maximum step when raising transmit power
    pub raise_step_max_db: u8,
    /// Maximum step when lowering transmit power
    pub lower_step_max_db: u8,
    pub pf: PowerFilter,
}

impl Default for PowerCtrlParams {
    fn default() -> Self {
        Self {
            target_dbm: -75,
            hysteresis_db: 3,
            raise_step_max_db: 4,
            lower_step_max_db: 8,
            pf: PowerFilter::None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CfgPowerCtrl {
    /// Downlink: BS attenuation driven by the MS measurement reports
    pub dl: PowerCtrlParams,
    /// Uplink: MS power level driven by the BTS measurements
    pub ul: PowerCtrlParams,
}

#[derive(Debug, Clone)]
pub struct CfgTaCtrl {
    /// SACCH blocks to skip after each timing advance change
    pub interval: u8,
}

impl Default for CfgTaCtrl {
    fn default() -> Self {
        Self { interval: 0 }
    }
}

#[derive(Default, Deserialize)]
pub struct PowerCtrlDto {
    pub dl: Option<PowerCtrlParamsDto>,
    pub ul: Option<PowerCtrlParamsDto>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Default, Deserialize)]
pub struct PowerCtrlParamsDto {
    pub target_dbm: Option<i32>,
    pub hysteresis_db: Option<u8>,
    pub raise_step_max_db: Option<u8>,
    pub lower_step_max_db: Option<u8>,
    pub ewma_alpha: Option<u8>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Default, Deserialize)]
pub struct TaCtrlDto {
    pub interval: Option<u8>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

pub fn apply_power_params_patch(dst: &mut PowerCtrlParams, src: &PowerCtrlParamsDto) {
    if let Some(v) = src.target_dbm {
        dst.target_dbm = v;
    }
    if let Some(v) = src.hysteresis_db {
        dst.hysteresis_db = v;
    }
    if let Some(v) = src.raise_step_max_db {
        dst.raise_step_max_db = v;
    }
    if let Some(v) = src.lower_step_max_db {
        dst.lower_step_max_db = v;
    }
    if let Some(alpha) = src.ewma_alpha {
        dst.pf = PowerFilter::Ewma { alpha };
    }
}
