use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use gsm_entities::abis::{AbisError, AbisTransport, TransportEvent};

#[derive(Default)]
struct Script {
    opened: Vec<String>,
    events: VecDeque<TransportEvent>,
    fail_open: bool,
    closed: usize,
}

/// Transport driven by the test. Clones share the same script, so the test
/// keeps one handle while the Abis entity owns the other.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_event(&self, ev: TransportEvent) {
        self.script.lock().unwrap().events.push_back(ev);
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.script.lock().unwrap().fail_open = fail;
    }

    pub fn opened(&self) -> Vec<String> {
        self.script.lock().unwrap().opened.clone()
    }

    pub fn closed(&self) -> usize {
        self.script.lock().unwrap().closed
    }
}

impl AbisTransport for ScriptedTransport {
    fn open(&mut self, host: &str, _port: u16) -> Result<(), AbisError> {
        let mut s = self.script.lock().unwrap();
        s.opened.push(host.to_string());
        if s.fail_open {
            return Err(AbisError::Connect(format!("{} refused", host)));
        }
        Ok(())
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.script.lock().unwrap().events.pop_front()
    }

    fn close(&mut self) {
        self.script.lock().unwrap().closed += 1;
    }
}
