//! Abis entity: owns the link adaptation FSM and the BSC transport

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use gsm_config::SharedConfig;
use gsm_core::gsm_entities::BtsEntity;
use gsm_core::{GsmTime, Sap};
use gsm_saps::control::LinkControl;
use gsm_saps::{SapMsg, SapMsgInner};

use crate::abis::link_fsm::{AbisLinkFsm, AbisLinkState, LinkNotify};
use crate::abis::transport::{AbisError, AbisTransport, TcpTransport};
use crate::{BtsEntityTrait, MessageQueue};

/// Counters for traffic handed to the link
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AbisStats {
    pub oml_tx: u64,
    pub rsl_tx: u64,
    pub rsl_dropped: u64,
}

pub struct Abis {
    config: SharedConfig,
    dltime: GsmTime,
    fsm: AbisLinkFsm,
    transport: Box<dyn AbisTransport>,
    started: bool,
    /// OML reports produced before the link came up
    oml_queue: VecDeque<SapMsgInner>,
    stats: AbisStats,
    failed: bool,
}

impl Abis {
    pub fn new(config: SharedConfig) -> Result<Self, AbisError> {
        let timeout = Duration::from_secs(config.config().abis.connect_timeout_secs);
        Self::with_transport(config, Box::new(TcpTransport::new(timeout)))
    }

    pub fn with_transport(config: SharedConfig, transport: Box<dyn AbisTransport>) -> Result<Self, AbisError> {
        let cfg = config.config();
        let fsm = AbisLinkFsm::new(&cfg.abis, cfg.bts.num_trx)?;
        Ok(Self {
            config,
            dltime: GsmTime::default(),
            fsm,
            transport,
            started: false,
            oml_queue: VecDeque::new(),
            stats: AbisStats::default(),
            failed: false,
        })
    }

    pub fn link_state(&self) -> AbisLinkState {
        self.fsm.state()
    }

    pub fn link_fsm_mut(&mut self) -> &mut AbisLinkFsm {
        &mut self.fsm
    }

    pub fn stats(&self) -> AbisStats {
        self.stats
    }

    pub fn num_queued(&self) -> usize {
        self.oml_queue.len()
    }

    fn send_link_control(&self, queue: &mut MessageQueue, ctrl: LinkControl) {
        queue.push_back(SapMsg::new(
            Sap::Control,
            BtsEntity::Abis,
            BtsEntity::Oml,
            self.dltime,
            SapMsgInner::LinkControl(ctrl),
        ));
    }

    fn tx_oml(&mut self, msg: SapMsgInner) {
        self.stats.oml_tx += 1;
        tracing::debug!(ts = self.dltime.fn_num, "-> OML {:?}", msg);
    }

    fn handle_notify(&mut self, queue: &mut MessageQueue, notify: LinkNotify) {
        match notify {
            LinkNotify::SignLinkUp => {
                self.send_link_control(queue, LinkControl::OmlLinkUp);
                for trx in 0..self.config.config().bts.num_trx {
                    self.send_link_control(queue, LinkControl::RslLinkUp { trx });
                }
                if !self.oml_queue.is_empty() {
                    tracing::debug!("Abis: flushing {} queued OML messages", self.oml_queue.len());
                }
                while let Some(msg) = self.oml_queue.pop_front() {
                    self.tx_oml(msg);
                }
            }
            LinkNotify::Failed => {
                tracing::error!("Abis: link failed, shutting down");
                self.config.state_write().link_failed = true;
                self.send_link_control(queue, LinkControl::AbisLinkFailed);
                self.failed = true;
            }
        }
    }

    fn rx_oml(&mut self, msg: SapMsgInner) {
        if self.fsm.oml_up() {
            self.tx_oml(msg);
        } else {
            tracing::debug!("Abis: OML link not up, queueing {}", msg);
            self.oml_queue.push_back(msg);
        }
    }

    fn rx_rsl(&mut self, msg: SapMsgInner) {
        let trx = match &msg {
            SapMsgInner::RslMeasRes(res) => res.chan.trx,
            _ => 0,
        };
        if self.config.config().bts.oml_dummy_links {
            // No RSL on the dummy link variant
            self.stats.rsl_dropped += 1;
            return;
        }
        if self.fsm.rsl_up(trx) {
            self.stats.rsl_tx += 1;
            tracing::debug!(ts = self.dltime.fn_num, "-> RSL {:?}", msg);
        } else {
            self.stats.rsl_dropped += 1;
            tracing::trace!("Abis: RSL link for trx {} down, dropping {}", trx, msg);
        }
    }
}

impl BtsEntityTrait for Abis {
    fn entity(&self) -> BtsEntity {
        BtsEntity::Abis
    }

    fn set_config(&mut self, config: SharedConfig) {
        self.config = config;
    }

    fn tick_start(&mut self, queue: &mut MessageQueue, ts: GsmTime) {
        self.dltime = ts;
        let now = Instant::now();
        if !self.started {
            self.started = true;
            self.fsm.start(now);
        }
        for notify in self.fsm.poll(now, self.transport.as_mut()) {
            self.handle_notify(queue, notify);
        }
    }

    fn rx_prim(&mut self, _queue: &mut MessageQueue, message: SapMsg) {
        tracing::trace!("rx_prim: {:?}", message);
        match message.msg {
            msg @ (SapMsgInner::OmlStateChgEvRep(_)
            | SapMsgInner::OmlSwActivatedRep(_)
            | SapMsgInner::OmlAck(_)
            | SapMsgInner::OmlNack(_)) => self.rx_oml(msg),
            msg @ SapMsgInner::RslMeasRes(_) => self.rx_rsl(msg),
            other => {
                tracing::warn!("Abis: unexpected primitive {}", other);
            }
        }
    }

    fn tick_end(&mut self, _queue: &mut MessageQueue, _ts: GsmTime) -> bool {
        self.failed
    }
}

impl Drop for Abis {
    fn drop(&mut self) {
        tracing::info!("Abis: closing link after {} OML / {} RSL messages", self.stats.oml_tx, self.stats.rsl_tx);
        self.transport.close();
    }
}
