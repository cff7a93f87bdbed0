use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gsm_config::SharedConfig;
use gsm_core::{GsmTime, gsm_entities::BtsEntity};
use gsm_saps::SapMsg;

use crate::BtsEntityTrait;

#[derive(Default)]
pub enum MessagePrio {
    Immediate,
    #[default]
    Normal,
}

#[derive(Default)]
pub struct MessageQueue {
    messages: VecDeque<SapMsg>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self {
            messages: VecDeque::new(),
        }
    }

    pub fn push_back(&mut self, message: SapMsg) {
        self.messages.push_back(message);
    }

    pub fn push_prio(&mut self, message: SapMsg, prio: MessagePrio) {
        match prio {
            MessagePrio::Immediate => {
                self.messages.push_front(message);
            }
            MessagePrio::Normal => {
                self.messages.push_back(message);
            }
        }
    }

    pub fn pop_front(&mut self) -> Option<SapMsg> {
        self.messages.pop_front()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

pub struct MessageRouter {
    config: SharedConfig,
    entities: HashMap<BtsEntity, Box<dyn BtsEntityTrait>>,
    /// Registration order, ticks are delivered in this order
    order: Vec<BtsEntity>,
    msg_queue: MessageQueue,

    /// The current TDMA frame number, incremented each tick
    ts: GsmTime,
}

impl MessageRouter {
    pub fn new(config: SharedConfig) -> Self {
        Self {
            entities: HashMap::new(),
            order: Vec::new(),
            msg_queue: MessageQueue::new(),
            config,
            ts: GsmTime::default(),
        }
    }

    /// Sets the global frame number
    /// Incremented each tick and passed to entities in tick() function
    pub fn set_dl_time(&mut self, ts: GsmTime) {
        self.ts = ts;
    }

    pub fn get_dl_time(&self) -> GsmTime {
        self.ts
    }

    pub fn register_entity(&mut self, entity: Box<dyn BtsEntityTrait>) {
        let comp_type = entity.entity();
        tracing::debug!("register_entity {:?}", comp_type);
        if self.entities.insert(comp_type, entity).is_none() {
            self.order.push(comp_type);
        }
    }

    /// Returns a mut ref to a component of the requested type
    pub fn get_entity(&mut self, comp: BtsEntity) -> Option<&mut dyn BtsEntityTrait> {
        self.entities.get_mut(&comp).map(|entity| entity.as_mut())
    }

    pub fn submit_message(&mut self, message: SapMsg) {
        tracing::debug!(
            "submit_message {:?}: {:?} -> {:?}",
            message.get_sap(),
            message.get_source(),
            message.get_dest()
        );
        self.msg_queue.push_back(message);
    }

    pub fn deliver_message(&mut self) {
        if let Some(message) = self.msg_queue.pop_front() {
            tracing::debug!(
                "deliver_message: got {:?} {}: {:?} -> {:?}",
                message.get_sap(),
                message.msg,
                message.get_source(),
                message.get_dest()
            );

            let dest = *message.get_dest();
            if let Some(entity) = self.entities.get_mut(&dest) {
                entity.rx_prim(&mut self.msg_queue, message);
            } else {
                tracing::warn!(
                    "deliver_message: entity {:?} not found for {:?} {}: {:?} -> {:?}",
                    dest,
                    message.get_sap(),
                    message.msg,
                    message.get_source(),
                    message.get_dest()
                );
            }
        }
    }

    pub fn deliver_all_messages(&mut self) {
        while !self.msg_queue.is_empty() {
            self.deliver_message();
        }
    }

    pub fn get_msgqueue_len(&self) -> usize {
        self.msg_queue.len()
    }

    pub fn tick_start(&mut self) {
        tracing::trace!("--- tick fn {} ----------------------------", self.ts);

        for id in &self.order {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.tick_start(&mut self.msg_queue, self.ts);
            }
        }
    }

    /// Executes all end-of-tick functions and advances the frame number.
    /// Returns true if any entity requested the stack to stop.
    pub fn tick_end(&mut self) -> bool {
        let mut stop = false;
        for id in &self.order {
            if let Some(entity) = self.entities.get_mut(id) {
                if entity.tick_end(&mut self.msg_queue, self.ts) {
                    tracing::info!("tick_end: {:?} requested stack shutdown", id);
                    stop = true;
                }
            }
        }
        self.deliver_all_messages();

        self.ts = self.ts.add_frames(1);
        stop
    }

    /// Runs the full stack until one of:
    /// - `num_ticks` frames have been processed
    /// - `running` was cleared (Ctrl+C)
    /// - an entity requested shutdown from tick_end
    pub fn run_stack(&mut self, num_ticks: Option<usize>, running: Option<Arc<AtomicBool>>) {
        let mut ticks: usize = 0;

        loop {
            if let Some(ref running) = running {
                if !running.load(Ordering::SeqCst) {
                    tracing::info!("run_stack: stop requested after {} ticks", ticks);
                    break;
                }
            }

            self.tick_start();
            self.deliver_all_messages();

            let stop = self.tick_end();

            ticks += 1;
            if stop {
                break;
            }
            if let Some(num_ticks) = num_ticks {
                if ticks >= num_ticks {
                    break;
                }
            }
        }
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }
}
