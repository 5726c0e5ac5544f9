//! Platform seam between the interpreter and a front end
//!
//! The interpreter owns its platform and calls it inline during a cycle.
//! Callbacks only ever see the machine state, never the interpreter, so
//! they cannot re-enter it.

use std::any::Any;

use crate::error::PlatformError;
use crate::vm::MachineState;

/// Platform specific calls made by the interpreter.
pub trait Platform {
    /// Called once, before the first cycle.
    fn on_init(&mut self, state: &MachineState);

    /// Called when the program clears the screen.
    fn on_clear_screen(&mut self);

    /// Called at the start of every cycle, before anything is fetched.
    /// This is where input should be polled into `state.keyboard`.
    fn on_cycle(&mut self, state: &mut MachineState);

    /// Called after every successful sprite draw.
    fn on_screen_update(&mut self, state: &MachineState);

    /// Called on every sound timer decrement (every 1/60th of a second
    /// while the sound timer is non-zero).
    fn on_beep(&mut self);

    /// Front end specific data the core does not interpret.
    fn custom_data(&self, key: &str) -> Option<&dyn Any>;

    fn set_custom_data(&mut self, key: &str, value: Box<dyn Any>) -> Result<(), PlatformError>;
}

/// Ignores every call. Used for headless runs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlatform;

impl Platform for NullPlatform {
    fn on_init(&mut self, _state: &MachineState) {}
    fn on_clear_screen(&mut self) {}
    fn on_cycle(&mut self, _state: &mut MachineState) {}
    fn on_screen_update(&mut self, _state: &MachineState) {}
    fn on_beep(&mut self) {}

    fn custom_data(&self, _key: &str) -> Option<&dyn Any> {
        None
    }

    fn set_custom_data(&mut self, _key: &str, _value: Box<dyn Any>) -> Result<(), PlatformError> {
        Err(PlatformError::NoSettableData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_platform_has_no_data() {
        let mut platform = NullPlatform;
        assert!(platform.custom_data("ctx").is_none());
        assert_eq!(
            platform.set_custom_data("key_map", Box::new(0u8)),
            Err(PlatformError::NoSettableData)
        );
    }
}
