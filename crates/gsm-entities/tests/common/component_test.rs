use gsm_config::{PhyBackend, SharedConfig, StackConfig, StackState};
use gsm_core::GsmTime;
use gsm_core::gsm_entities::BtsEntity;
use gsm_entities::abis::Abis;
use gsm_entities::l1sap::L1sap;
use gsm_entities::nm::oml_bs::Oml;
use gsm_entities::phy::VirtualPhy;
use gsm_entities::{BtsEntityTrait, MessageRouter};
use gsm_saps::sapmsg::SapMsg;

use super::scripted_transport::ScriptedTransport;
use super::sink::Sink;

/// Creates a default config for testing. It can still be modified as needed
/// before passing it to the ComponentTest constructor
pub fn default_test_config() -> StackConfig {
    let mut cfg = StackConfig::new(vec!["192.0.2.1".to_string(), "192.0.2.2".to_string()]);

    // PHY entities are added explicitly by the tests that want one
    cfg.phy_io.backend = PhyBackend::None;
    cfg.bts.num_trx = 1;
    cfg.bts.nm_rchannel_depends_rcarrier = true;
    cfg.bts.oml_dummy_links = false;
    cfg.abis.reconnect_delay_secs = 0;
    cfg
}

/// Infrastructure for testing BTS components
/// Quick setup of the requested entities for end-to-end testing
/// Supports optional sinks for collecting messages for later inspection
pub struct ComponentTest {
    pub config: SharedConfig,
    pub router: MessageRouter,
    pub sinks: Vec<BtsEntity>,
    /// Handle on the transport of the Abis entity, if one was created
    pub transport: Option<ScriptedTransport>,
}

impl ComponentTest {
    pub fn new(config: StackConfig, start_dl_time: Option<GsmTime>) -> Self {
        let shared_config = SharedConfig::from_parts(config, StackState::default());
        let mut mr = MessageRouter::new(shared_config.clone());
        mr.set_dl_time(start_dl_time.unwrap_or_default());

        Self {
            config: shared_config,
            router: mr,
            sinks: vec![],
            transport: None,
        }
    }

    pub fn get_shared_config(&self) -> SharedConfig {
        self.config.clone()
    }

    pub fn populate_entities(&mut self, components: Vec<BtsEntity>, sinks: Vec<BtsEntity>) {
        for component in components.iter() {
            match component {
                BtsEntity::Phy => {
                    let phy = VirtualPhy::new(self.config.clone(), false);
                    self.register_entity(phy);
                }
                BtsEntity::L1sap => {
                    let l1sap = L1sap::new(self.config.clone());
                    self.register_entity(l1sap);
                }
                BtsEntity::Oml => {
                    let mut oml = Oml::new(self.config.clone());
                    oml.enable_trace();
                    self.register_entity(oml);
                }
                BtsEntity::Abis => {
                    let transport = ScriptedTransport::new();
                    let abis = Abis::with_transport(self.config.clone(), Box::new(transport.clone()))
                        .expect("test config has BSC hosts");
                    self.transport = Some(transport);
                    self.register_entity(abis);
                }
            }
        }

        // Create sinks for debugging / message collection
        for sink in sinks.iter() {
            assert!(!self.sinks.contains(sink), "Sink already exists: {:?}", sink);
            assert!(self.router.get_entity(*sink).is_none(), "Sink already registered as entity: {:?}", sink);

            self.sinks.push(*sink);
            self.register_entity(Sink::new(*sink));
        }
    }

    pub fn register_entity<T: 'static + BtsEntityTrait>(&mut self, entity: T) {
        self.router.register_entity(Box::new(entity));
    }

    pub fn run_stack(&mut self, num_ticks: Option<usize>) {
        self.router.run_stack(num_ticks, None);
    }

    pub fn submit_message(&mut self, message: SapMsg) {
        self.router.submit_message(message);
    }

    pub fn deliver_all_messages(&mut self) {
        self.router.deliver_all_messages();
    }

    pub fn transport(&self) -> &ScriptedTransport {
        self.transport.as_ref().expect("no Abis entity in this test")
    }

    pub fn entity_mut<T: 'static>(&mut self, id: BtsEntity) -> &mut T {
        self.router
            .get_entity(id)
            .and_then(|e| e.as_any_mut().downcast_mut::<T>())
            .unwrap_or_else(|| panic!("{:?} not registered or of another type", id))
    }

    pub fn oml(&mut self) -> &mut Oml {
        self.entity_mut::<Oml>(BtsEntity::Oml)
    }

    pub fn l1sap(&mut self) -> &mut L1sap {
        self.entity_mut::<L1sap>(BtsEntity::L1sap)
    }

    pub fn abis(&mut self) -> &mut Abis {
        self.entity_mut::<Abis>(BtsEntity::Abis)
    }

    pub fn dump_sinks(&mut self) -> Vec<SapMsg> {
        let mut msgs = vec![];
        for sink in self.sinks.clone() {
            let mut sink_msgs = self.entity_mut::<Sink>(sink).take_msgqueue();
            msgs.append(&mut sink_msgs);
        }
        msgs
    }

    /// Messages collected by one sink
    pub fn dump_sink(&mut self, sink: BtsEntity) -> Vec<SapMsg> {
        self.entity_mut::<Sink>(sink).take_msgqueue()
    }
}
