//! Table driven validation for the NM object FSMs.
//!
//! All NM objects share one set of states. Each object class provides an
//! [`FsmDesc`] naming the states it uses, which events each state accepts and
//! which states it may move to. Violations are fatal: an unexpected event or
//! transition means the BTS and BSC views of an object have diverged.

use core::fmt;

use gsm_core::MoId;

use crate::nm::nm_event::NmEventKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NmFsmState {
    /// Disabled, not installed
    NotInstalled = 0,
    /// Disabled, waiting for another object
    Dependency,
    /// Disabled, ready to be started
    Offline,
    Enabled,
}

impl NmFsmState {
    #[inline]
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    pub fn name(&self) -> &'static str {
        match self {
            NmFsmState::NotInstalled => "DISABLED_NOTINSTALLED",
            NmFsmState::Dependency => "DISABLED_DEPENDENCY",
            NmFsmState::Offline => "DISABLED_OFFLINE",
            NmFsmState::Enabled => "ENABLED",
        }
    }
}

impl fmt::Display for NmFsmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Builds a state mask from a list of states
#[macro_export]
macro_rules! st_mask {
    ($($st:ident)|* ) => {
        0u32 $( | $crate::nm::fsm::NmFsmState::$st.bit() )*
    };
}

#[derive(Debug, Clone, Copy)]
pub struct FsmStateDesc {
    pub in_event_mask: u32,
    pub out_state_mask: u32,
}

/// Static description of one NM object class FSM
#[derive(Debug)]
pub struct FsmDesc {
    pub name: &'static str,
    /// Indexed by NmFsmState, None for states this class does not use
    pub states: [Option<FsmStateDesc>; 4],
    /// Events accepted in every state
    pub allstate_event_mask: u32,
}

impl FsmDesc {
    fn state(&self, st: NmFsmState) -> &FsmStateDesc {
        match &self.states[st as usize] {
            Some(desc) => desc,
            None => panic!("{}: state {} does not exist", self.name, st),
        }
    }

    /// True if `ev` may be dispatched while in `st`
    pub fn permits(&self, st: NmFsmState, ev: NmEventKind) -> bool {
        (self.state(st).in_event_mask | self.allstate_event_mask) & ev.bit() != 0
    }

    /// True if `ev` is handled by the all-state handler rather than the per-state one
    pub fn is_allstate(&self, ev: NmEventKind) -> bool {
        self.allstate_event_mask & ev.bit() != 0
    }

    pub fn may_transition(&self, from: NmFsmState, to: NmFsmState) -> bool {
        self.states[to as usize].is_some() && self.state(from).out_state_mask & to.bit() != 0
    }
}

/// One FSM instance, owned by its managed object
#[derive(Debug)]
pub struct FsmInstance {
    desc: &'static FsmDesc,
    state: NmFsmState,
}

impl FsmInstance {
    pub fn new(desc: &'static FsmDesc) -> Self {
        FsmInstance {
            desc,
            state: NmFsmState::NotInstalled,
        }
    }

    pub fn state(&self) -> NmFsmState {
        self.state
    }

    pub fn desc(&self) -> &'static FsmDesc {
        self.desc
    }

    pub fn permits(&self, ev: NmEventKind) -> bool {
        self.desc.permits(self.state, ev)
    }

    /// Panics if `ev` is not accepted in the current state
    pub fn check_event(&self, mo: MoId, ev: NmEventKind) {
        if !self.permits(ev) {
            panic!(
                "{}[{}]: event {:?} not permitted in state {}",
                self.desc.name, mo, ev, self.state
            );
        }
    }

    /// Moves to `next` and returns the previous state. Panics if the transition is not allowed.
    pub fn transition(&mut self, mo: MoId, next: NmFsmState) -> NmFsmState {
        if !self.desc.may_transition(self.state, next) {
            panic!(
                "{}[{}]: transition {} -> {} not permitted",
                self.desc.name, mo, self.state, next
            );
        }
        let prev = self.state;
        self.state = next;
        prev
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nm::nm_channel_fsm::CHANNEL_FSM;

    #[test]
    fn test_masks() {
        let fsm = FsmInstance::new(&CHANNEL_FSM);
        assert!(fsm.permits(NmEventKind::SwAct));
        assert!(fsm.permits(NmEventKind::ShutdownFinish));
        assert!(!fsm.permits(NmEventKind::RxOpstart));
        assert!(CHANNEL_FSM.may_transition(NmFsmState::NotInstalled, NmFsmState::NotInstalled));
        assert!(!CHANNEL_FSM.may_transition(NmFsmState::NotInstalled, NmFsmState::Enabled));
    }

    #[test]
    #[should_panic(expected = "not permitted in state")]
    fn test_unexpected_event_is_fatal() {
        let fsm = FsmInstance::new(&CHANNEL_FSM);
        fsm.check_event(MoId::Channel { bts: 0, trx: 0, ts: 0 }, NmEventKind::OpstartAck);
    }

    #[test]
    #[should_panic(expected = "transition")]
    fn test_unexpected_transition_is_fatal() {
        let mut fsm = FsmInstance::new(&CHANNEL_FSM);
        fsm.transition(MoId::Channel { bts: 0, trx: 0, ts: 0 }, NmFsmState::Enabled);
    }
}
