use gsm_core::gsm_entities::BtsEntity;
use gsm_entities::{BtsEntityTrait, MessageQueue};
use gsm_saps::sapmsg::SapMsg;

/// A BTS component sink for testing purposes
/// Collects all received SapMsg messages for later inspection
pub struct Sink {
    component: BtsEntity,
    msgqueue: Vec<SapMsg>,
}

impl Sink {
    pub fn new(component: BtsEntity) -> Self {
        Self {
            component,
            msgqueue: vec![],
        }
    }

    pub fn take_msgqueue(&mut self) -> Vec<SapMsg> {
        std::mem::take(&mut self.msgqueue)
    }
}

impl BtsEntityTrait for Sink {
    fn entity(&self) -> BtsEntity {
        self.component
    }

    fn rx_prim(&mut self, _queue: &mut MessageQueue, message: SapMsg) {
        tracing::debug!("rx_prim: {:?}", message);
        self.msgqueue.push(message);
    }
}
