use std::time::{Duration, Instant};

use gsm_config::CfgAbis;

use crate::abis::transport::{AbisError, AbisTransport, TransportEvent};

/// An OML link closing this soon after coming up usually means the BSC
/// rejected us, worth a warning
const OML_CONN_EARLY_DISCONNECT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbisLinkState {
    Connecting,
    Connected,
    Failed,
}

/// What the owner of the FSM needs to act upon
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkNotify {
    /// OML and all RSL links came up
    SignLinkUp,
    /// Terminal state reached
    Failed,
}

pub struct AbisLinkFsm {
    hosts: Vec<String>,
    port: u16,
    reconnect_delay: Duration,
    num_trx: u8,

    state: AbisLinkState,
    /// Index of the host to try on the next CONNECTING entry
    next_host: Option<usize>,
    line_ctr: u32,
    /// Pending CONNECTING entry
    connect_at: Option<Instant>,

    oml_up_at: Option<Instant>,
    rsl_links: Vec<bool>,
}

impl AbisLinkFsm {
    pub fn new(cfg: &CfgAbis, num_trx: u8) -> Result<Self, AbisError> {
        if cfg.oml_hosts.is_empty() {
            return Err(AbisError::NoHosts);
        }
        Ok(Self {
            hosts: cfg.oml_hosts.clone(),
            port: cfg.port,
            reconnect_delay: Duration::from_secs(cfg.reconnect_delay_secs),
            num_trx,
            state: AbisLinkState::Connecting,
            next_host: Some(0),
            line_ctr: 0,
            connect_at: None,
            oml_up_at: None,
            rsl_links: vec![false; num_trx as usize],
        })
    }

    pub fn state(&self) -> AbisLinkState {
        self.state
    }

    pub fn line_ctr(&self) -> u32 {
        self.line_ctr
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn next_host(&self) -> Option<&str> {
        self.next_host.and_then(|i| self.hosts.get(i)).map(String::as_str)
    }

    pub fn oml_up(&self) -> bool {
        self.oml_up_at.is_some()
    }

    pub fn rsl_up(&self, trx: u8) -> bool {
        self.rsl_links.get(trx as usize).copied().unwrap_or(false)
    }

    /// Schedules the first CONNECTING entry
    pub fn start(&mut self, now: Instant) {
        self.connect_at = Some(now);
    }

    fn state_chg(&mut self, next: AbisLinkState) {
        let allowed = match self.state {
            AbisLinkState::Connecting => matches!(next, AbisLinkState::Connected | AbisLinkState::Failed),
            AbisLinkState::Connected => matches!(next, AbisLinkState::Connecting | AbisLinkState::Failed),
            AbisLinkState::Failed => false,
        };
        if !allowed {
            panic!("AbisLinkFsm: transition {:?} -> {:?} not permitted", self.state, next);
        }
        tracing::debug!("AbisLinkFsm: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn enter_failed(&mut self, notify: &mut Vec<LinkNotify>, transport: &mut dyn AbisTransport) {
        self.state_chg(AbisLinkState::Failed);
        self.connect_at = None;
        transport.close();
        notify.push(LinkNotify::Failed);
    }

    /// CONNECTING on-enter: pick the next host and start the transport
    fn enter_connecting(&mut self, notify: &mut Vec<LinkNotify>, transport: &mut dyn AbisTransport) {
        self.connect_at = None;

        let Some(idx) = self.next_host.filter(|&i| i < self.hosts.len()) else {
            tracing::error!("AbisLinkFsm: no BSC host left to connect to");
            self.enter_failed(notify, transport);
            return;
        };
        self.next_host = if idx + 1 < self.hosts.len() { Some(idx + 1) } else { None };
        let host = self.hosts[idx].clone();

        self.line_ctr += 1;
        tracing::info!("AbisLinkFsm: connecting to {}:{} (line {})", host, self.port, self.line_ctr);
        match transport.open(&host, self.port) {
            Ok(()) => self.state_chg(AbisLinkState::Connected),
            Err(e) => {
                tracing::error!("AbisLinkFsm: cannot open link to {}: {}", host, e);
                self.enter_failed(notify, transport);
            }
        }
    }

    fn sign_link_up(&mut self, now: Instant, notify: &mut Vec<LinkNotify>) {
        if self.state != AbisLinkState::Connected {
            tracing::warn!("AbisLinkFsm: link up in state {:?}, ignored", self.state);
            return;
        }
        tracing::info!("AbisLinkFsm: OML link up, {} RSL links", self.num_trx);
        self.oml_up_at = Some(now);
        self.rsl_links.iter_mut().for_each(|l| *l = true);
        notify.push(LinkNotify::SignLinkUp);
    }

    fn sign_link_down(&mut self, now: Instant, reason: &str, notify: &mut Vec<LinkNotify>, transport: &mut dyn AbisTransport) {
        if self.state != AbisLinkState::Connected {
            tracing::debug!("AbisLinkFsm: link down in state {:?}, ignored", self.state);
            return;
        }
        tracing::info!("AbisLinkFsm: link down: {}", reason);

        let mut was_connected = false;
        if let Some(up_at) = self.oml_up_at.take() {
            if now.saturating_duration_since(up_at) < OML_CONN_EARLY_DISCONNECT {
                tracing::warn!(
                    "AbisLinkFsm: OML link closed {:?} after establishment, check the BTS unit id and BSC config",
                    now.saturating_duration_since(up_at)
                );
            }
            was_connected = true;
        }
        for link in self.rsl_links.iter_mut() {
            was_connected |= *link;
            *link = false;
        }
        transport.close();

        if was_connected {
            self.enter_failed(notify, transport);
        } else {
            self.state_chg(AbisLinkState::Connecting);
            self.connect_at = Some(now + self.reconnect_delay);
        }
    }

    /// Runs pending timers and transport events. Called once per tick.
    pub fn poll(&mut self, now: Instant, transport: &mut dyn AbisTransport) -> Vec<LinkNotify> {
        let mut notify = Vec::new();

        if self.connect_at.is_some_and(|at| now >= at) {
            self.enter_connecting(&mut notify, transport);
        }

        while self.state == AbisLinkState::Connected {
            let Some(ev) = transport.poll_event() else {
                break;
            };
            match ev {
                TransportEvent::SignLinkUp => self.sign_link_up(now, &mut notify),
                TransportEvent::SignLinkDown(reason) => self.sign_link_down(now, &reason, &mut notify, transport),
            }
        }
        notify
    }

    /// Removes a configured host. The pointer keeps addressing the host that
    /// would have been tried next.
    pub fn remove_host(&mut self, addr: &str) -> bool {
        let Some(removed) = self.hosts.iter().position(|h| h == addr) else {
            return false;
        };
        self.next_host = match self.next_host {
            Some(p) if p == removed => {
                if self.hosts.len() <= 1 {
                    None
                } else if p + 1 == self.hosts.len() {
                    // Was the last one, fall back to the previous
                    Some(p - 1)
                } else {
                    Some(p)
                }
            }
            Some(p) if p > removed => Some(p - 1),
            other => other,
        };
        self.hosts.remove(removed);
        true
    }
}
