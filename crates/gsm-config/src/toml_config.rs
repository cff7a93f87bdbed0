use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use gsm_core::GsmBand;
use serde::Deserialize;
use toml::Value;

use super::stack_config::{CfgBts, CfgPhyIo, PhyBackend, SharedConfig, StackConfig, StackState};
use super::stack_config_abis::{CfgAbisDto, apply_abis_patch};
use super::stack_config_power::{CfgPowerCtrl, CfgTaCtrl, PowerCtrlDto, TaCtrlDto, apply_power_params_patch};

/// Build `SharedConfig` from a TOML configuration file
pub fn from_toml_str(toml_str: &str) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    // Various sanity checks
    let expected_config_version = "0.1";
    if !root.config_version.eq(expected_config_version) {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, expected_config_version
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    if let Some(ref phy) = root.phy_io {
        if !phy.extra.is_empty() {
            return Err(format!("Unrecognized fields: phy_io::{:?}", sorted_keys(&phy.extra)).into());
        }
    }
    if let Some(ref bts) = root.bts {
        if !bts.extra.is_empty() {
            return Err(format!("Unrecognized fields in bts: {:?}", sorted_keys(&bts.extra)).into());
        }
    }
    if !root.abis.extra.is_empty() {
        return Err(format!("Unrecognized fields in abis: {:?}", sorted_keys(&root.abis.extra)).into());
    }
    if let Some(ref pc) = root.power_ctrl {
        if !pc.extra.is_empty() {
            return Err(format!("Unrecognized fields in power_ctrl: {:?}", sorted_keys(&pc.extra)).into());
        }
        for (name, params) in [("dl", &pc.dl), ("ul", &pc.ul)] {
            if let Some(p) = params {
                if !p.extra.is_empty() {
                    return Err(format!("Unrecognized fields in power_ctrl.{}: {:?}", name, sorted_keys(&p.extra)).into());
                }
            }
        }
    }
    if let Some(ref ta) = root.ta_ctrl {
        if !ta.extra.is_empty() {
            return Err(format!("Unrecognized fields in ta_ctrl: {:?}", sorted_keys(&ta.extra)).into());
        }
    }

    // Build config from required and optional values
    let mut cfg = StackConfig {
        debug_log: root.debug_log,
        phy_io: CfgPhyIo::default(),
        bts: CfgBts::default(),
        abis: apply_abis_patch(root.abis),
        power_ctrl: CfgPowerCtrl::default(),
        ta_ctrl: CfgTaCtrl::default(),
    };

    if let Some(phy) = root.phy_io {
        cfg.phy_io.backend = phy.backend;
    }
    if let Some(bts) = root.bts {
        apply_bts_patch(&mut cfg.bts, bts);
    }
    if let Some(pc) = root.power_ctrl {
        if let Some(ref dl) = pc.dl {
            apply_power_params_patch(&mut cfg.power_ctrl.dl, dl);
        }
        if let Some(ref ul) = pc.ul {
            apply_power_params_patch(&mut cfg.power_ctrl.ul, ul);
        }
    }
    if let Some(ta) = root.ta_ctrl {
        if let Some(v) = ta.interval {
            cfg.ta_ctrl.interval = v;
        }
    }

    // Report validation problems as errors rather than letting from_parts panic
    cfg.validate().map_err(|e| format!("Invalid configuration: {}", e))?;

    Ok(SharedConfig::from_parts(cfg, StackState::default()))
}

/// Build `SharedConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `SharedConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    let r = BufReader::new(f);
    let cfg = from_reader(r)?;
    Ok(cfg)
}

fn apply_bts_patch(dst: &mut CfgBts, src: BtsDto) {
    if let Some(v) = src.band {
        dst.band = v;
    }
    if let Some(v) = src.num_trx {
        dst.num_trx = v;
    }
    if let Some(v) = src.nm_rchannel_depends_rcarrier {
        dst.nm_rchannel_depends_rcarrier = v;
    }
    if let Some(v) = src.oml_dummy_links {
        dst.oml_dummy_links = v;
    }
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    debug_log: Option<String>,

    #[serde(default)]
    phy_io: Option<PhyIoDto>,

    #[serde(default)]
    bts: Option<BtsDto>,

    abis: CfgAbisDto,

    #[serde(default)]
    power_ctrl: Option<PowerCtrlDto>,

    #[serde(default)]
    ta_ctrl: Option<TaCtrlDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct PhyIoDto {
    pub backend: PhyBackend,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Default, Deserialize)]
struct BtsDto {
    pub band: Option<GsmBand>,
    pub num_trx: Option<u8>,
    pub nm_rchannel_depends_rcarrier: Option<bool>,
    pub oml_dummy_links: Option<bool>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PowerFilter;

    const MINIMAL: &str = r#"
config_version = "0.1"

[phy_io]
backend = "Virtual"

[abis]
oml_hosts = ["192.168.0.10", " 192.168.0.11 "]
"#;

    #[test]
    fn test_minimal_config() {
        let shared = from_toml_str(MINIMAL).unwrap();
        let cfg = shared.config();
        assert_eq!(cfg.phy_io.backend, PhyBackend::Virtual);
        assert_eq!(cfg.abis.oml_hosts, vec!["192.168.0.10", "192.168.0.11"]);
        assert_eq!(cfg.abis.port, 3002);
        assert_eq!(cfg.bts.num_trx, 1);
        assert_eq!(cfg.power_ctrl.dl.pf, PowerFilter::None);
        assert!(!shared.state_read().oml_link_up);
    }

    #[test]
    fn test_power_ctrl_section() {
        let toml = format!(
            "{}\n[bts]\nband = \"Dcs1800\"\nnum_trx = 2\n\n[power_ctrl.dl]\ntarget_dbm = -80\newma_alpha = 50\n\n[ta_ctrl]\ninterval = 2\n",
            MINIMAL
        );
        let shared = from_toml_str(&toml).unwrap();
        let cfg = shared.config();
        assert_eq!(cfg.bts.band, GsmBand::Dcs1800);
        assert_eq!(cfg.bts.num_trx, 2);
        assert_eq!(cfg.power_ctrl.dl.target_dbm, -80);
        assert_eq!(cfg.power_ctrl.dl.pf, PowerFilter::Ewma { alpha: 50 });
        assert_eq!(cfg.power_ctrl.ul.pf, PowerFilter::None);
        assert_eq!(cfg.ta_ctrl.interval, 2);
    }

    #[test]
    fn test_shipped_config() {
        let shared = from_toml_str(include_str!("../../../config/gsm-bts.toml")).unwrap();
        let cfg = shared.config();
        assert_eq!(cfg.abis.oml_hosts, vec!["127.0.0.1"]);
        assert!(cfg.bts.nm_rchannel_depends_rcarrier);
        assert_eq!(cfg.power_ctrl.ul.target_dbm, -75);
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let toml = format!("{}\nfoo = 1\n", MINIMAL.replace("[phy_io]", "bar = 2\n[phy_io]"));
        assert!(from_toml_str(&toml).is_err());

        let toml = format!("{}\n[power_ctrl.ul]\ntarget = -80\n", MINIMAL);
        let err = from_toml_str(&toml).err().unwrap().to_string();
        assert!(err.contains("power_ctrl.ul"));
    }

    #[test]
    fn test_rejects_bad_version_and_values() {
        assert!(from_toml_str(&MINIMAL.replace("0.1", "0.5")).is_err());
        assert!(from_toml_str(&MINIMAL.replace("\"Virtual\"", "\"Undefined\"")).is_err());
        let toml = format!("{}\n[power_ctrl.dl]\newma_alpha = 0\n", MINIMAL);
        assert!(from_toml_str(&toml).is_err());
        let toml = MINIMAL.replace("[\"192.168.0.10\", \" 192.168.0.11 \"]", "[]");
        assert!(from_toml_str(&toml).is_err());
    }
}
