//! Stuck-at device faults.

use memristive_crossbar::CrossbarMapping;
use memristive_devices::{Fault, ParameterSampler};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Proportions of devices stuck at either resistance bound.
///
/// `hrs_proportion` covers every high-resistance outcome; the
/// `electroform_proportion` part of it is attributed to devices that never
/// formed a filament.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceFaults {
    pub lrs_proportion: f64,
    pub hrs_proportion: f64,
    pub electroform_proportion: f64,
}

impl DeviceFaults {
    pub fn new(lrs_proportion: f64, hrs_proportion: f64, electroform_proportion: f64) -> Self {
        Self {
            lrs_proportion,
            hrs_proportion,
            electroform_proportion,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, p) in [
            ("lrs_proportion", self.lrs_proportion),
            ("hrs_proportion", self.hrs_proportion),
            ("electroform_proportion", self.electroform_proportion),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::Configuration(format!(
                    "{} must be in [0, 1], got {}",
                    name, p
                )));
            }
        }
        if self.lrs_proportion + self.hrs_proportion > 1.0 {
            return Err(Error::Configuration(format!(
                "lrs_proportion + hrs_proportion must not exceed 1, got {}",
                self.lrs_proportion + self.hrs_proportion
            )));
        }
        if self.electroform_proportion > self.hrs_proportion {
            return Err(Error::Configuration(format!(
                "electroform_proportion ({}) exceeds hrs_proportion ({})",
                self.electroform_proportion, self.hrs_proportion
            )));
        }
        Ok(())
    }

    /// Fault assigned to a device whose uniform draw is `u ∈ [0, 1)`.
    pub fn classify(&self, u: f64) -> Option<Fault> {
        let lrs = self.lrs_proportion;
        if u < lrs {
            Some(Fault::StuckLrs)
        } else if u < lrs + self.electroform_proportion {
            Some(Fault::Unformed)
        } else if u < lrs + self.hrs_proportion {
            Some(Fault::StuckHrs)
        } else {
            None
        }
    }

    /// Fault every device of `mapping` with one draw per device under `seed`.
    ///
    /// Returns the number of newly faulted devices. Already faulted devices
    /// keep their fault.
    pub(crate) fn apply(&self, mapping: &mut CrossbarMapping, seed: u64) -> usize {
        let parallel = mapping.parallel().clone();
        let counts = parallel.map_mut(mapping.tiles_mut(), |tile| {
            tile.devices_mut()
                .filter_map(|device| {
                    let u = ParameterSampler::new(seed, device.id().stream()).next_uniform();
                    self.classify(u).filter(|&fault| device.apply_fault(fault))
                })
                .count()
        });
        counts.into_iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_partitions_unit_interval() {
        let faults = DeviceFaults::new(0.1, 0.3, 0.05);
        assert_eq!(faults.classify(0.0), Some(Fault::StuckLrs));
        assert_eq!(faults.classify(0.099), Some(Fault::StuckLrs));
        assert_eq!(faults.classify(0.12), Some(Fault::Unformed));
        assert_eq!(faults.classify(0.2), Some(Fault::StuckHrs));
        assert_eq!(faults.classify(0.39), Some(Fault::StuckHrs));
        assert_eq!(faults.classify(0.41), None);
    }

    #[test]
    fn test_hrs_mass_includes_electroform() {
        let faults = DeviceFaults::new(0.0, 0.2, 0.2);
        assert_eq!(faults.classify(0.1), Some(Fault::Unformed));
        assert_eq!(faults.classify(0.25), None);
    }

    #[test]
    fn test_validation() {
        assert!(DeviceFaults::new(0.5, 0.5, 0.0).validate().is_ok());
        assert!(DeviceFaults::new(1.0, 0.0, 0.0).validate().is_ok());
        assert!(DeviceFaults::new(0.6, 0.5, 0.0).validate().is_err());
        assert!(DeviceFaults::new(-0.1, 0.0, 0.0).validate().is_err());
        assert!(DeviceFaults::new(0.0, 1.5, 0.0).validate().is_err());
        assert!(DeviceFaults::new(0.0, 0.1, 0.2).validate().is_err());
    }
}
