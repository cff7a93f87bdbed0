//! Ownership tree of all managed objects of one site.
//!
//! Site Manager at the root, owning the GPRS NSE and the BTS list. Every BTS
//! owns its TRXs, and every TRX owns a radio carrier, a baseband transceiver
//! and one channel object per timeslot. Parent to child fan-out walks these
//! lists in order.

use gsm_core::{MoId, NUM_TS, NmAttributes, NmState, OpState};

use crate::nm::fsm::{FsmDesc, FsmInstance, NmFsmState};
use crate::nm::nm_bb_transc_fsm::BB_TRANSC_FSM;
use crate::nm::nm_bts_fsm::BTS_FSM;
use crate::nm::nm_bts_sm_fsm::BTS_SM_FSM;
use crate::nm::nm_channel_fsm::CHANNEL_FSM;
use crate::nm::nm_gprs_nse_fsm::GPRS_NSE_FSM;
use crate::nm::nm_rcarrier_fsm::RCARRIER_FSM;

#[derive(Debug)]
pub struct ManagedObject {
    pub id: MoId,
    pub fsm: FsmInstance,
    pub nm_state: NmState,
    /// Last Set Attributes was accepted by the hardware model
    pub setattr_success: bool,
    /// Last Opstart was acknowledged by the hardware model
    pub opstart_success: bool,
    /// Attributes applied so far, dropped when the object is uninstalled
    pub attrs: Option<NmAttributes>,
}

impl ManagedObject {
    fn new(id: MoId, desc: &'static FsmDesc) -> Self {
        ManagedObject {
            id,
            fsm: FsmInstance::new(desc),
            nm_state: NmState::default(),
            setattr_success: false,
            opstart_success: false,
            attrs: None,
        }
    }

    pub fn state(&self) -> NmFsmState {
        self.fsm.state()
    }

    pub fn is_enabled(&self) -> bool {
        self.nm_state.operational == OpState::Enabled
    }

    /// Merges newly applied attributes into the cached set
    pub fn store_attrs(&mut self, new: &NmAttributes) {
        let attrs = self.attrs.get_or_insert_with(NmAttributes::default);
        if new.arfcn.is_some() {
            attrs.arfcn = new.arfcn;
        }
        if new.max_power_red.is_some() {
            attrs.max_power_red = new.max_power_red;
        }
        if new.pchan.is_some() {
            attrs.pchan = new.pchan;
        }
        if new.tsc.is_some() {
            attrs.tsc = new.tsc;
        }
        if new.bsic.is_some() {
            attrs.bsic = new.bsic;
        }
    }
}

#[derive(Debug)]
pub struct TrxNode {
    pub rcarrier: ManagedObject,
    pub bb_transc: ManagedObject,
    pub ts: Vec<ManagedObject>,
    /// RSL link for this TRX is established
    pub rsl_connected: bool,
    /// PHY reported this transceiver up
    pub phy_connected: bool,
}

#[derive(Debug)]
pub struct BtsNode {
    pub mo: ManagedObject,
    pub trx: Vec<TrxNode>,
}

#[derive(Debug)]
pub struct NmTree {
    pub site_mgr: ManagedObject,
    pub nse: ManagedObject,
    pub bts: Vec<BtsNode>,
    /// Channels also wait for their radio carrier
    pub rchannel_depends_rcarrier: bool,
    /// RSL and PHY links are considered always up
    pub dummy_links: bool,
}

impl NmTree {
    /// Builds a site with a single BTS carrying `num_trx` transceivers
    pub fn new(num_trx: u8, rchannel_depends_rcarrier: bool, dummy_links: bool) -> Self {
        let bts = 0;
        let trx = (0..num_trx)
            .map(|trx| TrxNode {
                rcarrier: ManagedObject::new(MoId::RadioCarrier { bts, trx }, &RCARRIER_FSM),
                bb_transc: ManagedObject::new(MoId::BasebandTransceiver { bts, trx }, &BB_TRANSC_FSM),
                ts: (0..NUM_TS as u8)
                    .map(|ts| ManagedObject::new(MoId::Channel { bts, trx, ts }, &CHANNEL_FSM))
                    .collect(),
                rsl_connected: false,
                phy_connected: false,
            })
            .collect();

        NmTree {
            site_mgr: ManagedObject::new(MoId::SiteManager, &BTS_SM_FSM),
            nse: ManagedObject::new(MoId::GprsNse, &GPRS_NSE_FSM),
            bts: vec![BtsNode {
                mo: ManagedObject::new(MoId::Bts { bts }, &BTS_FSM),
                trx,
            }],
            rchannel_depends_rcarrier,
            dummy_links,
        }
    }

    pub fn num_trx(&self, bts: u8) -> usize {
        self.bts.get(bts as usize).map_or(0, |b| b.trx.len())
    }

    pub fn contains(&self, id: MoId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: MoId) -> Option<&ManagedObject> {
        match id {
            MoId::SiteManager => Some(&self.site_mgr),
            MoId::GprsNse => Some(&self.nse),
            MoId::Bts { bts } => self.bts.get(bts as usize).map(|b| &b.mo),
            MoId::RadioCarrier { bts, trx } => self.trx(bts, trx).map(|t| &t.rcarrier),
            MoId::BasebandTransceiver { bts, trx } => self.trx(bts, trx).map(|t| &t.bb_transc),
            MoId::Channel { bts, trx, ts } => self.trx(bts, trx).and_then(|t| t.ts.get(ts as usize)),
        }
    }

    pub fn get_mut(&mut self, id: MoId) -> Option<&mut ManagedObject> {
        match id {
            MoId::SiteManager => Some(&mut self.site_mgr),
            MoId::GprsNse => Some(&mut self.nse),
            MoId::Bts { bts } => self.bts.get_mut(bts as usize).map(|b| &mut b.mo),
            MoId::RadioCarrier { bts, trx } => self.trx_mut(bts, trx).map(|t| &mut t.rcarrier),
            MoId::BasebandTransceiver { bts, trx } => self.trx_mut(bts, trx).map(|t| &mut t.bb_transc),
            MoId::Channel { bts, trx, ts } => self.trx_mut(bts, trx).and_then(|t| t.ts.get_mut(ts as usize)),
        }
    }

    /// Like [`NmTree::get`], for identities produced by the tree itself
    pub fn mo(&self, id: MoId) -> &ManagedObject {
        match self.get(id) {
            Some(mo) => mo,
            None => panic!("unknown managed object {}", id),
        }
    }

    pub fn mo_mut(&mut self, id: MoId) -> &mut ManagedObject {
        match self.get_mut(id) {
            Some(mo) => mo,
            None => panic!("unknown managed object {}", id),
        }
    }

    pub fn trx(&self, bts: u8, trx: u8) -> Option<&TrxNode> {
        self.bts.get(bts as usize).and_then(|b| b.trx.get(trx as usize))
    }

    pub fn trx_mut(&mut self, bts: u8, trx: u8) -> Option<&mut TrxNode> {
        self.bts.get_mut(bts as usize).and_then(|b| b.trx.get_mut(trx as usize))
    }

    /// Channel objects owned by a TRX, in timeslot order
    pub fn ts_ids(&self, bts: u8, trx: u8) -> Vec<MoId> {
        self.trx(bts, trx)
            .map(|t| t.ts.iter().map(|mo| mo.id).collect())
            .unwrap_or_default()
    }

    /// Radio carrier and baseband transceiver of every TRX of a BTS, in that order
    pub fn trx_ids(&self, bts: u8) -> Vec<MoId> {
        self.bts
            .get(bts as usize)
            .map(|b| b.trx.iter().flat_map(|t| [t.rcarrier.id, t.bb_transc.id]).collect())
            .unwrap_or_default()
    }

    /// Children of the Site Manager in fan-out order
    pub fn site_children(&self) -> Vec<MoId> {
        let mut ids = vec![self.nse.id];
        ids.extend(self.bts.iter().map(|b| b.mo.id));
        ids
    }

    /// A channel may leave DEPENDENCY once its baseband transceiver is enabled
    /// and, where required, its radio carrier as well
    pub fn ts_can_be_enabled(&self, bts: u8, trx: u8) -> bool {
        match self.trx(bts, trx) {
            Some(t) => t.bb_transc.is_enabled() && (!self.rchannel_depends_rcarrier || t.rcarrier.is_enabled()),
            None => false,
        }
    }

    /// (rsl, phy) connectivity of a TRX, honouring dummy links
    pub fn trx_links(&self, bts: u8, trx: u8) -> (bool, bool) {
        match self.trx(bts, trx) {
            Some(t) => (t.rsl_connected || self.dummy_links, t.phy_connected || self.dummy_links),
            None => (false, false),
        }
    }
}
