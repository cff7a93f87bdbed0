use crate::MessageQueue;
use as_any::AsAny;
use gsm_config::SharedConfig;
use gsm_core::{GsmTime, gsm_entities::BtsEntity};
use gsm_saps::SapMsg;

/// Trait for BTS entities
/// Used by MessageRouter for passing messages between entities
pub trait BtsEntityTrait: Send + AsAny {
    /// Returns the entity type identifier
    fn entity(&self) -> BtsEntity;

    /// Handle incoming SAP primitive
    fn rx_prim(&mut self, queue: &mut MessageQueue, message: SapMsg);

    /// Update configuration (optional)
    #[allow(dead_code)]
    fn set_config(&mut self, _config: SharedConfig) {}

    /// Called at the start of each TDMA frame
    fn tick_start(&mut self, _queue: &mut MessageQueue, _ts: GsmTime) {}

    /// Called at the end of each TDMA frame. Returning true asks the router to stop the stack.
    fn tick_end(&mut self, _queue: &mut MessageQueue, _ts: GsmTime) -> bool {
        false
    }
}
