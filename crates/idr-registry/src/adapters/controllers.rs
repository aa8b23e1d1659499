//! # Program Controller Directories

use crate::ports::outbound::{ControllerDirectory, ControllerValidator};
use idr_types::Address;
use std::collections::HashMap;

/// Directory with no program controllers; every program claim is refused.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgramControllers;

impl ControllerDirectory for NoProgramControllers {
    fn validator_for(&self, _controller: &Address) -> Option<&dyn ControllerValidator> {
        None
    }
}

/// Maps controller addresses to their validation logic.
#[derive(Default)]
pub struct ProgramControllers {
    validators: HashMap<Address, Box<dyn ControllerValidator>>,
}

impl ProgramControllers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the validator for `controller`.
    pub fn register(&mut self, controller: Address, validator: impl ControllerValidator + 'static) {
        self.validators.insert(controller, Box::new(validator));
    }

    pub fn unregister(&mut self, controller: &Address) -> bool {
        self.validators.remove(controller).is_some()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl ControllerDirectory for ProgramControllers {
    fn validator_for(&self, controller: &Address) -> Option<&dyn ControllerValidator> {
        self.validators.get(controller).map(|v| v.as_ref())
    }
}

impl std::fmt::Debug for ProgramControllers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramControllers")
            .field("controllers", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}
