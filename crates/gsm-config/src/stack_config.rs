use serde::Deserialize;
use std::sync::{Arc, RwLock};

use gsm_core::GsmBand;

use crate::stack_config_abis::CfgAbis;
use crate::stack_config_power::{CfgPowerCtrl, CfgTaCtrl, PowerFilter};

/// The PHY layer backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PhyBackend {
    Undefined,
    /// No PHY at all, for testing
    None,
    /// Frame clock without a radio, PHY links are reported up immediately
    Virtual,
}

/// PHY layer I/O configuration
#[derive(Debug, Clone)]
pub struct CfgPhyIo {
    pub backend: PhyBackend,
}

impl Default for CfgPhyIo {
    fn default() -> Self {
        Self {
            backend: PhyBackend::Undefined,
        }
    }
}

/// Site-wide BTS settings
#[derive(Debug, Clone)]
pub struct CfgBts {
    pub band: GsmBand,
    /// Number of transceivers on BTS 0
    pub num_trx: u8,
    /// Channels also wait for their radio carrier, not only the baseband transceiver
    pub nm_rchannel_depends_rcarrier: bool,
    /// Treat the RSL and PHY links as always connected
    pub oml_dummy_links: bool,
}

impl Default for CfgBts {
    fn default() -> Self {
        Self {
            band: GsmBand::Gsm900,
            num_trx: 1,
            nm_rchannel_depends_rcarrier: true,
            oml_dummy_links: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StackConfig {
    pub debug_log: Option<String>,

    pub phy_io: CfgPhyIo,

    pub bts: CfgBts,

    /// Abis link, the list of BSC hosts is REQUIRED
    pub abis: CfgAbis,

    pub power_ctrl: CfgPowerCtrl,
    pub ta_ctrl: CfgTaCtrl,
}

impl StackConfig {
    pub fn new(oml_hosts: Vec<String>) -> Self {
        StackConfig {
            debug_log: None,
            phy_io: CfgPhyIo::default(),
            bts: CfgBts::default(),
            abis: CfgAbis::new(oml_hosts),
            power_ctrl: CfgPowerCtrl::default(),
            ta_ctrl: CfgTaCtrl::default(),
        }
    }

    /// Validate that all required configuration fields are properly set.
    pub fn validate(&self) -> Result<(), &str> {
        if self.phy_io.backend == PhyBackend::Undefined {
            return Err("phy_io backend must be defined");
        }
        if self.bts.num_trx == 0 {
            return Err("bts num_trx must be at least 1");
        }
        if self.abis.oml_hosts.is_empty() {
            return Err("abis oml_hosts must contain at least one host");
        }
        if self.abis.oml_hosts.iter().any(|h| h.trim().is_empty()) {
            return Err("abis oml_hosts contains an empty host");
        }
        for params in [&self.power_ctrl.dl, &self.power_ctrl.ul] {
            if let PowerFilter::Ewma { alpha } = params.pf {
                if alpha == 0 || alpha > 99 {
                    return Err("power_ctrl ewma_alpha must be in 1..=99");
                }
            }
        }
        if self.power_ctrl.dl.target_dbm > -10 || self.power_ctrl.ul.target_dbm > -10 {
            return Err("power_ctrl target_dbm out of range");
        }
        Ok(())
    }
}

/// Mutable, stack-editable state (lock-protected).
#[derive(Debug, Clone, Default)]
pub struct StackState {
    /// OML link to the BSC is established
    pub oml_link_up: bool,
    /// PHY reported its transceivers up
    pub phy_link_up: bool,
    /// Abis link adaptation reached its terminal failure state
    pub link_failed: bool,
}

/// Global shared configuration: immutable config + mutable state.
#[derive(Clone)]
pub struct SharedConfig {
    /// Read-only configuration (immutable after construction).
    cfg: Arc<StackConfig>,
    /// Mutable state guarded with RwLock (write by the stack, read by others).
    state: Arc<RwLock<StackState>>,
}

impl SharedConfig {
    pub fn new(oml_hosts: Vec<String>) -> Self {
        Self::from_config(StackConfig::new(oml_hosts))
    }

    pub fn from_config(cfg: StackConfig) -> Self {
        Self::from_parts(cfg, StackState::default())
    }

    pub fn from_parts(cfg: StackConfig, state: StackState) -> Self {
        // Check config for validity before returning the SharedConfig object
        match cfg.validate() {
            Ok(_) => {}
            Err(e) => panic!("Invalid stack configuration: {}", e),
        }

        Self {
            cfg: Arc::new(cfg),
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Access immutable config.
    pub fn config(&self) -> Arc<StackConfig> {
        Arc::clone(&self.cfg)
    }

    /// Read guard for mutable state.
    pub fn state_read(&self) -> std::sync::RwLockReadGuard<'_, StackState> {
        self.state.read().expect("StackState RwLock blocked")
    }

    /// Write guard for mutable state.
    pub fn state_write(&self) -> std::sync::RwLockWriteGuard<'_, StackState> {
        self.state.write().expect("StackState RwLock blocked")
    }
}
