use clap::Parser;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gsm_config::{PhyBackend, SharedConfig, toml_config};
use gsm_core::{GsmTime, debug};
use gsm_entities::MessageRouter;
use gsm_entities::{abis::Abis, l1sap::L1sap, nm::oml_bs::Oml, phy::VirtualPhy};

/// Load configuration file
fn load_config_from_toml(cfg_path: &str) -> SharedConfig {
    match toml_config::from_file(cfg_path) {
        Ok(c) => c,
        Err(e) => {
            println!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

/// Start base station stack
fn build_bs_stack(cfg: &SharedConfig) -> MessageRouter {
    let mut router = MessageRouter::new(cfg.clone());

    // Add suitable Phy component based on PhyIo type
    match cfg.config().phy_io.backend {
        PhyBackend::Virtual => {
            let phy = VirtualPhy::new(cfg.clone(), true);
            router.register_entity(Box::new(phy));
        }
        PhyBackend::None => {
            eprintln!(" -> No PHY configured, transceivers stay down");
        }
        PhyBackend::Undefined => {
            panic!("Unsupported PhyIo type: {:?}", cfg.config().phy_io.backend);
        }
    }

    let abis = match Abis::new(cfg.clone()) {
        Ok(abis) => abis,
        Err(e) => {
            println!("Failed to set up Abis link: {}", e);
            std::process::exit(1);
        }
    };

    // Add remaining components
    let l1sap = L1sap::new(cfg.clone());
    let oml = Oml::new(cfg.clone());
    router.register_entity(Box::new(l1sap));
    router.register_entity(Box::new(oml));
    router.register_entity(Box::new(abis));

    // Init network time
    router.set_dl_time(GsmTime::default());

    router
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "GSM BTS control plane",
    long_about = "Runs the BTS network management, measurement and link control stack using the provided TOML configuration file"
)]
struct Args {
    /// Config file (required)
    #[arg(help = "TOML config with BTS and Abis parameters")]
    config: String,
}

fn main() {
    let args = Args::parse();
    let cfg = load_config_from_toml(&args.config);
    let _log_guard = debug::setup_logging_default(cfg.config().debug_log.clone());

    {
        let c = cfg.config();
        tracing::info!(
            "gsm-bts {}: {} trx on {:?}, BSC {:?} port {}",
            env!("CARGO_PKG_VERSION"),
            c.bts.num_trx,
            c.bts.band,
            c.abis.oml_hosts,
            c.abis.port
        );
    }

    let mut router = build_bs_stack(&cfg);

    // Set up Ctrl+C handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("failed to set Ctrl+C handler");

    router.run_stack(None, Some(running));
    let failed = cfg.state_read().link_failed;
    // Entities drop here, Abis closes its transport
    drop(router);

    if failed {
        tracing::error!("Abis link failed, exiting");
        std::process::exit(1);
    }
}
