//! Finite conductance states: read-time quantization of device conductances.

use memristive_crossbar::CrossbarMapping;

use crate::error::{Error, Result};

pub(crate) fn validate(conductance_states: usize) -> Result<()> {
    if conductance_states < 2 {
        return Err(Error::Configuration(format!(
            "conductance_states must be at least 2, got {}",
            conductance_states
        )));
    }
    Ok(())
}

/// Make every read see each device's conductance snapped to
/// `conductance_states` evenly spaced levels between its own bounds.
///
/// Device state is untouched; installing the same count again changes nothing.
pub(crate) fn apply(mapping: &mut CrossbarMapping, conductance_states: usize) {
    let previous = mapping
        .read_config_mut()
        .finite_states
        .replace(conductance_states);
    if let Some(previous) = previous.filter(|&p| p != conductance_states) {
        log::debug!(
            "Replacing {} conductance states with {}",
            previous,
            conductance_states
        );
    }
}
