//! Hardware model callbacks used by the NM object FSMs.
//!
//! A model applies attributes and starts objects on the actual radio platform.
//! Opstart completes asynchronously: the model queues an ack or nack event that
//! is dispatched once the current dispatch has unwound.

use std::collections::{HashMap, VecDeque};

use as_any::AsAny;

use gsm_core::{AdminState, MoId, NackCause, NmAttributes, Pchan};

use crate::nm::nm_event::NmEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEvent {
    pub mo: MoId,
    pub ev: NmEvent,
    /// Skip silently if the target state does not accept the event
    pub if_permitted: bool,
}

/// Events raised by the model while handling a request
#[derive(Debug, Default)]
pub struct ModelEvents {
    queue: VecDeque<PendingEvent>,
}

impl ModelEvents {
    pub fn push(&mut self, mo: MoId, ev: NmEvent) {
        self.queue.push_back(PendingEvent {
            mo,
            ev,
            if_permitted: false,
        });
    }

    pub fn push_if_permitted(&mut self, mo: MoId, ev: NmEvent) {
        self.queue.push_back(PendingEvent {
            mo,
            ev,
            if_permitted: true,
        });
    }

    pub fn pop(&mut self) -> Option<PendingEvent> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

pub trait BtsModel: Send + AsAny {
    /// Applies decoded Set Attributes. An error is sent back to the BSC as the NACK cause.
    fn apply_attributes(&mut self, mo: MoId, attrs: &NmAttributes, events: &mut ModelEvents) -> Result<(), NackCause>;

    /// Starts the object. Must eventually push `OpstartAck` or `OpstartNack` for `mo`.
    fn opstart(&mut self, mo: MoId, events: &mut ModelEvents);

    fn chg_adm_state(&mut self, mo: MoId, admin: AdminState) -> Result<(), NackCause>;

    /// Releases radio resources held by a timeslot
    fn ts_release(&mut self, mo: MoId);

    /// Abis link is gone for good
    fn abis_close(&mut self);
}

/// Model without hardware. Accepts everything unless told otherwise.
#[derive(Debug, Default)]
pub struct VirtualModel {
    num_trx: u8,
    setattr_nack: HashMap<MoId, NackCause>,
    opstart_nack: HashMap<MoId, NackCause>,
    pchan: HashMap<MoId, Pchan>,
    ts_released: usize,
    closed: bool,
}

impl VirtualModel {
    pub fn new(num_trx: u8) -> Self {
        VirtualModel {
            num_trx,
            ..Default::default()
        }
    }

    /// Makes every Set Attributes on `mo` fail with `cause`
    pub fn fail_setattr(&mut self, mo: MoId, cause: NackCause) {
        self.setattr_nack.insert(mo, cause);
    }

    /// Makes every Opstart on `mo` fail with `cause`
    pub fn fail_opstart(&mut self, mo: MoId, cause: NackCause) {
        self.opstart_nack.insert(mo, cause);
    }

    pub fn pchan(&self, mo: MoId) -> Option<Pchan> {
        self.pchan.get(&mo).copied()
    }

    pub fn ts_released(&self) -> usize {
        self.ts_released
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl BtsModel for VirtualModel {
    fn apply_attributes(&mut self, mo: MoId, attrs: &NmAttributes, events: &mut ModelEvents) -> Result<(), NackCause> {
        if let Some(cause) = self.setattr_nack.get(&mo) {
            return Err(*cause);
        }

        match mo {
            MoId::Bts { bts } => {
                // BTS attributes are in place, the transceivers can now report activated software
                for trx in 0..self.num_trx {
                    events.push_if_permitted(MoId::RadioCarrier { bts, trx }, NmEvent::SwAct);
                    events.push_if_permitted(MoId::BasebandTransceiver { bts, trx }, NmEvent::SwAct);
                }
            }
            MoId::Channel { .. } => {
                if attrs.tsc.is_some_and(|tsc| tsc > 7) {
                    return Err(NackCause::ParamRange);
                }
                if let Some(pchan) = attrs.pchan {
                    if pchan == Pchan::None {
                        return Err(NackCause::ResNotAvailable);
                    }
                    self.pchan.insert(mo, pchan);
                }
            }
            MoId::RadioCarrier { .. } => {
                if attrs.arfcn.is_some_and(|arfcn| arfcn > 1023) {
                    return Err(NackCause::FreqNotAvailable);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn opstart(&mut self, mo: MoId, events: &mut ModelEvents) {
        match self.opstart_nack.get(&mo) {
            Some(cause) => events.push(mo, NmEvent::OpstartNack(*cause)),
            None => events.push(mo, NmEvent::OpstartAck),
        }
    }

    fn chg_adm_state(&mut self, mo: MoId, admin: AdminState) -> Result<(), NackCause> {
        tracing::debug!("virtual: {} admin state {:?}", mo, admin);
        Ok(())
    }

    fn ts_release(&mut self, mo: MoId) {
        self.pchan.remove(&mo);
        self.ts_released += 1;
    }

    fn abis_close(&mut self) {
        tracing::info!("virtual: abis link closed");
        self.closed = true;
    }
}
