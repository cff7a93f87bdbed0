use core::fmt::Display;

use gsm_core::GsmTime;
use gsm_core::Sap;
use gsm_core::gsm_entities::BtsEntity;

use super::control::*;
use super::mph::*;
use super::oml::*;
use super::ph::*;
use super::rsl::*;

/// Exhaustive list of primitives for use in the SapMsg struct
#[derive(Debug)]
pub enum SapMsgInner {
    // PH-SAP (Phy -> L1sap)
    PhMeasInd(PhMeasInd),
    PhSacchInd(PhSacchInd),
    PhDtxDlInd(PhDtxDlInd),

    // MPH-SAP (L1sap -> Phy)
    MphParamChangeReq(MphParamChangeReq),
    MphDeactivateReq(MphDeactivateReq),

    // RSL (Abis <-> L1sap)
    RslChanActiv(RslChanActiv),
    RslRfChanRel(RslRfChanRel),
    RslMeasRes(RslMeasRes),

    // OML reports (Oml -> Abis)
    OmlStateChgEvRep(OmlStateChgEvRep),
    OmlSwActivatedRep(OmlSwActivatedRep),
    OmlAck(OmlAck),
    OmlNack(OmlNack),

    // OML requests (Abis -> Oml)
    OmlSetAttrReq(OmlSetAttrReq),
    OmlOpstartReq(OmlOpstartReq),
    OmlChgAdmStateReq(OmlChgAdmStateReq),

    // Control
    LinkControl(LinkControl),
    TsReleaseReq(TsReleaseReq),
}

impl Display for SapMsgInner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            // PH-SAP
            SapMsgInner::PhMeasInd(_) => write!(f, "PhMeasInd"),
            SapMsgInner::PhSacchInd(_) => write!(f, "PhSacchInd"),
            SapMsgInner::PhDtxDlInd(_) => write!(f, "PhDtxDlInd"),

            // MPH-SAP
            SapMsgInner::MphParamChangeReq(_) => write!(f, "MphParamChangeReq"),
            SapMsgInner::MphDeactivateReq(_) => write!(f, "MphDeactivateReq"),

            // RSL
            SapMsgInner::RslChanActiv(_) => write!(f, "RslChanActiv"),
            SapMsgInner::RslRfChanRel(_) => write!(f, "RslRfChanRel"),
            SapMsgInner::RslMeasRes(_) => write!(f, "RslMeasRes"),

            // OML
            SapMsgInner::OmlStateChgEvRep(_) => write!(f, "OmlStateChgEvRep"),
            SapMsgInner::OmlSwActivatedRep(_) => write!(f, "OmlSwActivatedRep"),
            SapMsgInner::OmlAck(_) => write!(f, "OmlAck"),
            SapMsgInner::OmlNack(_) => write!(f, "OmlNack"),
            SapMsgInner::OmlSetAttrReq(_) => write!(f, "OmlSetAttrReq"),
            SapMsgInner::OmlOpstartReq(_) => write!(f, "OmlOpstartReq"),
            SapMsgInner::OmlChgAdmStateReq(_) => write!(f, "OmlChgAdmStateReq"),

            // Control
            SapMsgInner::LinkControl(c) => write!(f, "LinkControl({:?})", c),
            SapMsgInner::TsReleaseReq(_) => write!(f, "TsReleaseReq"),
        }
    }
}

#[derive(Debug)]
pub struct SapMsg {
    pub sap: Sap,
    pub src: BtsEntity,
    pub dest: BtsEntity,
    /// Frame number at the time the message was created
    pub dltime: GsmTime,

    pub msg: SapMsgInner,
}

impl SapMsg {
    pub fn new(sap: Sap, src: BtsEntity, dest: BtsEntity, t_submit: GsmTime, msg: SapMsgInner) -> Self {
        Self {
            sap,
            src,
            dest,
            dltime: t_submit,
            msg,
        }
    }

    pub fn get_source(&self) -> &BtsEntity {
        &self.src
    }
    pub fn get_dest(&self) -> &BtsEntity {
        &self.dest
    }
    pub fn get_sap(&self) -> &Sap {
        &self.sap
    }
}
