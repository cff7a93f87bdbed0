use gsm_config::SharedConfig;
use gsm_core::gsm_entities::BtsEntity;
use gsm_core::{AdminState, GsmTime, MoId, NackCause, Sap};
use gsm_saps::control::LinkControl;
use gsm_saps::oml::{OmlChgAdmStateReq, OmlNack, OmlOpstartReq, OmlProcedure, OmlSetAttrReq};
use gsm_saps::{SapMsg, SapMsgInner};

use crate::nm::bts_model::{BtsModel, VirtualModel};
use crate::nm::nm_common::{NmCtx, NmTrace, dispatch, dispatch_if_permitted, mo_chg_adm_state, mo_state_chg, run_pending};
use crate::nm::nm_event::NmEvent;
use crate::nm::nm_tree::NmTree;
use crate::{BtsEntityTrait, MessageQueue};

/// Network management entity. Owns the managed object tree and the hardware
/// model, turns BSC requests and link notifications into NM events.
pub struct Oml {
    config: SharedConfig,
    tree: NmTree,
    model: Box<dyn BtsModel>,
    /// When set, every dispatch and state change is recorded here
    trace: Option<Vec<NmTrace>>,
    /// Abis is gone, ask the router to stop
    shutdown_requested: bool,
}

impl Oml {
    pub fn new(config: SharedConfig) -> Self {
        let num_trx = config.config().bts.num_trx;
        Self::with_model(config, Box::new(VirtualModel::new(num_trx)))
    }

    pub fn with_model(config: SharedConfig, model: Box<dyn BtsModel>) -> Self {
        let cfg = config.config();
        let tree = NmTree::new(
            cfg.bts.num_trx,
            cfg.bts.nm_rchannel_depends_rcarrier,
            cfg.bts.oml_dummy_links,
        );
        Self {
            config,
            tree,
            model,
            trace: None,
            shutdown_requested: false,
        }
    }

    pub fn tree(&self) -> &NmTree {
        &self.tree
    }

    pub fn model(&self) -> &dyn BtsModel {
        self.model.as_ref()
    }

    pub fn enable_trace(&mut self) {
        self.trace = Some(Vec::new());
    }

    pub fn take_trace(&mut self) -> Vec<NmTrace> {
        self.trace.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Runs `f` against the tree, then dispatches whatever the model queued
    /// and sends out the resulting reports
    fn run<F>(&mut self, queue: &mut MessageQueue, dltime: GsmTime, f: F)
    where
        F: FnOnce(&mut NmTree, &mut NmCtx),
    {
        let mut ctx = NmCtx::new(self.model.as_mut());
        f(&mut self.tree, &mut ctx);
        run_pending(&mut self.tree, &mut ctx);

        let NmCtx { outputs, trace, .. } = ctx;
        if let Some(t) = self.trace.as_mut() {
            t.extend(trace);
        }
        for msg in outputs {
            let (sap, dest) = match msg {
                SapMsgInner::TsReleaseReq(_) => (Sap::Control, BtsEntity::L1sap),
                _ => (Sap::OmlSap, BtsEntity::Abis),
            };
            queue.push_back(SapMsg::new(sap, BtsEntity::Oml, dest, dltime, msg));
        }
    }

    fn nack_unknown(&self, queue: &mut MessageQueue, dltime: GsmTime, mo: MoId, procedure: OmlProcedure) {
        tracing::warn!("<- {:?} for unknown object {}", procedure, mo);
        let nack = OmlNack {
            mo,
            procedure,
            cause: NackCause::ObjInstanceUnknown,
        };
        queue.push_back(SapMsg::new(
            Sap::OmlSap,
            BtsEntity::Oml,
            BtsEntity::Abis,
            dltime,
            SapMsgInner::OmlNack(nack),
        ));
    }

    fn rx_set_attr(&mut self, queue: &mut MessageQueue, dltime: GsmTime, req: OmlSetAttrReq) {
        tracing::debug!("<- SetAttr {} {:?}", req.mo, req.attrs);
        if !self.tree.contains(req.mo) {
            self.nack_unknown(queue, dltime, req.mo, OmlProcedure::SetAttr);
            return;
        }
        self.run(queue, dltime, |tree, ctx| {
            dispatch(tree, ctx, req.mo, NmEvent::RxSetAttr(req.attrs));
        });
    }

    fn rx_opstart(&mut self, queue: &mut MessageQueue, dltime: GsmTime, req: OmlOpstartReq) {
        tracing::debug!("<- Opstart {}", req.mo);
        if !self.tree.contains(req.mo) {
            self.nack_unknown(queue, dltime, req.mo, OmlProcedure::Opstart);
            return;
        }
        self.run(queue, dltime, |tree, ctx| {
            dispatch(tree, ctx, req.mo, NmEvent::RxOpstart);
        });
    }

    fn rx_chg_adm_state(&mut self, queue: &mut MessageQueue, dltime: GsmTime, req: OmlChgAdmStateReq) {
        tracing::debug!("<- ChgAdmState {} {:?}", req.mo, req.admin);
        if !self.tree.contains(req.mo) {
            self.nack_unknown(queue, dltime, req.mo, OmlProcedure::ChgAdmState);
            return;
        }
        self.run(queue, dltime, |tree, ctx| {
            let rc = ctx.model.chg_adm_state(req.mo, req.admin);
            if rc.is_ok() {
                if req.admin == AdminState::Locked {
                    dispatch_if_permitted(tree, ctx, req.mo, NmEvent::Disable);
                }
                mo_state_chg(tree, ctx, req.mo, None, None, Some(req.admin));
            }
            mo_chg_adm_state(ctx, req.mo, rc);
        });
    }

    fn rx_link_control(&mut self, queue: &mut MessageQueue, dltime: GsmTime, ctrl: LinkControl) {
        tracing::info!("<- {:?}", ctrl);
        let bts = 0;
        match ctrl {
            LinkControl::PhyLinkUp { trx } => {
                let Some(node) = self.tree.trx_mut(bts, trx) else {
                    tracing::warn!("PHY link up for unknown trx {}", trx);
                    return;
                };
                node.phy_connected = true;
                self.config.state_write().phy_link_up = true;
                self.run(queue, dltime, |tree, ctx| {
                    for mo in [MoId::RadioCarrier { bts, trx }, MoId::BasebandTransceiver { bts, trx }] {
                        dispatch_if_permitted(tree, ctx, mo, NmEvent::SwAct);
                        dispatch_if_permitted(tree, ctx, mo, NmEvent::PhyLinkUp);
                    }
                });
            }
            LinkControl::PhyLinkDown { trx } => {
                let Some(node) = self.tree.trx_mut(bts, trx) else {
                    tracing::warn!("PHY link down for unknown trx {}", trx);
                    return;
                };
                node.phy_connected = false;
                self.run(queue, dltime, |tree, ctx| {
                    for mo in [MoId::RadioCarrier { bts, trx }, MoId::BasebandTransceiver { bts, trx }] {
                        dispatch_if_permitted(tree, ctx, mo, NmEvent::PhyLinkDown);
                    }
                });
            }
            LinkControl::OmlLinkUp => {
                self.config.state_write().oml_link_up = true;
                self.run(queue, dltime, |tree, ctx| {
                    dispatch_if_permitted(tree, ctx, MoId::SiteManager, NmEvent::OmlUp);
                });
            }
            LinkControl::RslLinkUp { trx } => {
                let Some(node) = self.tree.trx_mut(bts, trx) else {
                    tracing::warn!("RSL link up for unknown trx {}", trx);
                    return;
                };
                node.rsl_connected = true;
                self.run(queue, dltime, |tree, ctx| {
                    for mo in [MoId::RadioCarrier { bts, trx }, MoId::BasebandTransceiver { bts, trx }] {
                        dispatch_if_permitted(tree, ctx, mo, NmEvent::RslUp);
                    }
                });
            }
            LinkControl::AbisLinkFailed => {
                self.config.state_write().oml_link_up = false;
                for node in self.tree.bts.iter_mut().flat_map(|b| b.trx.iter_mut()) {
                    node.rsl_connected = false;
                }
                self.run(queue, dltime, |tree, ctx| {
                    dispatch(tree, ctx, MoId::SiteManager, NmEvent::ShutdownStart);
                    dispatch(tree, ctx, MoId::SiteManager, NmEvent::ShutdownFinish);
                    ctx.model.abis_close();
                });
                self.shutdown_requested = true;
            }
        }
    }
}

impl BtsEntityTrait for Oml {
    fn entity(&self) -> BtsEntity {
        BtsEntity::Oml
    }

    fn set_config(&mut self, config: SharedConfig) {
        self.config = config;
    }

    fn rx_prim(&mut self, queue: &mut MessageQueue, message: SapMsg) {
        tracing::debug!("rx_prim: {:?}", message);
        let dltime = message.dltime;

        match message.msg {
            SapMsgInner::OmlSetAttrReq(req) => self.rx_set_attr(queue, dltime, req),
            SapMsgInner::OmlOpstartReq(req) => self.rx_opstart(queue, dltime, req),
            SapMsgInner::OmlChgAdmStateReq(req) => self.rx_chg_adm_state(queue, dltime, req),
            SapMsgInner::LinkControl(ctrl) => self.rx_link_control(queue, dltime, ctrl),
            other => {
                tracing::warn!("Oml: unexpected primitive {}", other);
            }
        }
    }

    fn tick_end(&mut self, _queue: &mut MessageQueue, _ts: GsmTime) -> bool {
        self.shutdown_requested
    }
}
