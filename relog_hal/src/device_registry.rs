//! Device registry for pneumatics module adapters.
//!
//! Maps module id to its owned [`PneumaticsModule`]. This replaces
//! singleton-per-device global state with constructor-injection: the
//! registry is created at startup with a driver factory and passed by
//! reference through the scheduler context. First access creates the
//! adapter (`get_or_create`), preserving lazy-initialization semantics
//! without hidden global lookup.

use std::collections::BTreeMap;

use relog_common::log::logger::{InputLogger, LogError};
use tracing::info;

use crate::driver::DriverFactory;
use crate::pneumatics::PneumaticsModule;

/// Registry of device adapters, one per physical module id.
pub struct DeviceRegistry {
    factory: DriverFactory,
    modules: BTreeMap<u8, PneumaticsModule>,
}

impl DeviceRegistry {
    /// Create an empty registry using `factory` to construct drivers for
    /// newly seen module ids.
    pub fn new(factory: DriverFactory) -> Self {
        Self {
            factory,
            modules: BTreeMap::new(),
        }
    }

    /// Adapter for `module_id`, created on first access.
    ///
    /// Creation registers the adapter's log name with `logger`; a
    /// collision there is a fatal configuration error.
    pub fn get_or_create(
        &mut self,
        module_id: u8,
        logger: &mut InputLogger,
    ) -> Result<&mut PneumaticsModule, LogError> {
        if !self.modules.contains_key(&module_id) {
            info!("Creating pneumatics adapter for module {module_id}");
            let driver = (self.factory)(module_id);
            let module = PneumaticsModule::new(module_id, driver, logger)?;
            self.modules.insert(module_id, module);
        }
        // Present by construction.
        Ok(self
            .modules
            .get_mut(&module_id)
            .expect("module inserted above"))
    }

    /// Adapter for `module_id`, if it was already created.
    pub fn get(&self, module_id: u8) -> Option<&PneumaticsModule> {
        self.modules.get(&module_id)
    }

    /// Mutable adapter for `module_id`, if it was already created.
    pub fn get_mut(&mut self, module_id: u8) -> Option<&mut PneumaticsModule> {
        self.modules.get_mut(&module_id)
    }

    /// Run every adapter's `periodic` exactly once for the current cycle.
    pub fn periodic_all(&mut self, logger: &mut InputLogger) -> Result<(), LogError> {
        for module in self.modules.values_mut() {
            module.periodic(logger)?;
        }
        Ok(())
    }

    /// Number of created adapters.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// True if no adapter has been created yet.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Ids of all created adapters, in ascending order.
    pub fn module_ids(&self) -> Vec<u8> {
        self.modules.keys().copied().collect()
    }
}
