//! Ordered application of non-idealities to a crossbar mapping.

use memristive_crossbar::{AppliedNonIdeality, CrossbarMapping, Persistence};
use memristive_devices::rng::splitmix64;
use serde::{Deserialize, Serialize};

use crate::drift::{self, DriftParameters, ENDURANCE_SOURCE, RETENTION_SOURCE};
use crate::error::Result;
use crate::faults::DeviceFaults;
use crate::finite_states;
use crate::nonlinear::NonLinear;

/// Salt separating fault draws from the parameter draws of the mapping.
const FAULT_SALT: u64 = 0x6661_756c_7473_0001;

/// One non-ideality and its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NonIdeality {
    /// Stuck-at faults drawn once per device.
    DeviceFaults(DeviceFaults),
    /// Read-time quantization to evenly spaced conductance states.
    FiniteConductanceStates { conductance_states: usize },
    /// Drift after `x` write cycles.
    Endurance {
        x: f64,
        #[serde(default)]
        parameters: DriftParameters,
    },
    /// Drift after `time` seconds.
    Retention {
        time: f64,
        #[serde(default)]
        parameters: DriftParameters,
    },
    /// Non-linear I/V response during reads.
    NonLinear { response: NonLinear },
}

impl NonIdeality {
    pub fn name(&self) -> &'static str {
        match self {
            NonIdeality::DeviceFaults(_) => "device_faults",
            NonIdeality::FiniteConductanceStates { .. } => "finite_conductance_states",
            NonIdeality::Endurance { .. } => "endurance",
            NonIdeality::Retention { .. } => "retention",
            NonIdeality::NonLinear { .. } => "non_linear",
        }
    }

    /// Whether the non-ideality changes device state or only alters reads.
    pub fn persistence(&self) -> Persistence {
        match self {
            NonIdeality::DeviceFaults(_)
            | NonIdeality::Endurance { .. }
            | NonIdeality::Retention { .. } => Persistence::Permanent,
            NonIdeality::FiniteConductanceStates { .. } | NonIdeality::NonLinear { .. } => {
                Persistence::ReadTime
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            NonIdeality::DeviceFaults(faults) => faults.validate(),
            NonIdeality::FiniteConductanceStates { conductance_states } => {
                finite_states::validate(*conductance_states)
            }
            NonIdeality::Endurance { x, parameters } => {
                drift::check_stress("x", *x)?;
                parameters.validate()
            }
            NonIdeality::Retention { time, parameters } => {
                drift::check_stress("time", *time)?;
                parameters.validate()
            }
            NonIdeality::NonLinear { response } => response.validate(),
        }
    }
}

/// Applies non-idealities to crossbar mappings.
///
/// Kinds are applied strictly in the order given, each seeing the result of
/// the previous ones. Fault draws are a function of the engine seed and the
/// device identity only, so the same engine faults the same devices on every
/// run and on every clone of a mapping.
///
/// Re-applying faults keeps existing faults. Re-applying endurance or
/// retention recomputes drift from the state before that process was first
/// applied, replacing the earlier result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonIdealityEngine {
    seed: u64,
}

impl NonIdealityEngine {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Apply `kinds` to an owned mapping and return it.
    ///
    /// Callers needing the unmodified mapping clone it first.
    pub fn apply(
        &self,
        mut mapping: CrossbarMapping,
        kinds: &[NonIdeality],
    ) -> Result<CrossbarMapping> {
        self.apply_in_place(&mut mapping, kinds)?;
        Ok(mapping)
    }

    /// Apply `kinds` to `mapping` in place.
    ///
    /// Every kind is validated before any is applied, so a configuration
    /// error leaves the mapping untouched.
    pub fn apply_in_place(&self, mapping: &mut CrossbarMapping, kinds: &[NonIdeality]) -> Result<()> {
        for kind in kinds {
            kind.validate()?;
        }

        for kind in kinds {
            let affected = self.apply_one(mapping, kind)?;
            log::info!(
                "Applied {} to {} devices ({} affected)",
                kind.name(),
                mapping.device_count(),
                affected
            );
            mapping.record(AppliedNonIdeality {
                kind: kind.name().to_string(),
                persistence: kind.persistence(),
                devices_affected: affected,
            });
        }
        Ok(())
    }

    fn apply_one(&self, mapping: &mut CrossbarMapping, kind: &NonIdeality) -> Result<usize> {
        let affected = match kind {
            NonIdeality::DeviceFaults(faults) => {
                faults.apply(mapping, splitmix64(self.seed ^ FAULT_SALT))
            }
            NonIdeality::FiniteConductanceStates { conductance_states } => {
                finite_states::apply(mapping, *conductance_states);
                0
            }
            NonIdeality::Endurance { x, parameters } => {
                parameters.apply(mapping, ENDURANCE_SOURCE, *x)
            }
            NonIdeality::Retention { time, parameters } => {
                parameters.apply(mapping, RETENTION_SOURCE, *time)
            }
            NonIdeality::NonLinear { response } => {
                response.apply(mapping)?;
                0
            }
        };
        Ok(affected)
    }
}

impl Default for NonIdealityEngine {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memristive_crossbar::{map, CrossbarConfig, WeightTensor};
    use memristive_devices::Fault;

    fn mapping() -> CrossbarMapping {
        let data = (0..64).map(|i| (i as f64 - 32.0) / 32.0).collect();
        let weights = WeightTensor::linear(8, 8, data).unwrap();
        map(&weights, &CrossbarConfig::default(), 3).unwrap()
    }

    #[test]
    fn test_invalid_kind_leaves_mapping_untouched() {
        let mut m = mapping();
        let before: Vec<f64> = m.devices().map(|d| d.state()).collect();
        let kinds = [
            NonIdeality::DeviceFaults(DeviceFaults::new(1.0, 0.0, 0.0)),
            NonIdeality::FiniteConductanceStates {
                conductance_states: 1,
            },
        ];
        assert!(NonIdealityEngine::new(0).apply_in_place(&mut m, &kinds).is_err());
        let after: Vec<f64> = m.devices().map(|d| d.state()).collect();
        assert_eq!(before, after);
        assert!(m.applied().is_empty());
        assert!(m.devices().all(|d| d.fault().is_none()));
    }

    #[test]
    fn test_ledger_records_persistence() {
        let kinds = [
            NonIdeality::DeviceFaults(DeviceFaults::new(0.1, 0.1, 0.0)),
            NonIdeality::FiniteConductanceStates {
                conductance_states: 4,
            },
            NonIdeality::Retention {
                time: 10.0,
                parameters: DriftParameters::default(),
            },
        ];
        let m = NonIdealityEngine::new(9).apply(mapping(), &kinds).unwrap();
        let ledger = m.applied();
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger[0].kind, "device_faults");
        assert_eq!(ledger[0].persistence, Persistence::Permanent);
        assert_eq!(ledger[1].persistence, Persistence::ReadTime);
        assert_eq!(ledger[1].devices_affected, 0);
        assert_eq!(ledger[2].kind, "retention");
    }

    #[test]
    fn test_fault_draws_depend_on_engine_seed() {
        let kinds = [NonIdeality::DeviceFaults(DeviceFaults::new(0.5, 0.0, 0.0))];
        let faults = |seed| -> Vec<Option<Fault>> {
            NonIdealityEngine::new(seed)
                .apply(mapping(), &kinds)
                .unwrap()
                .devices()
                .map(|d| d.fault())
                .collect()
        };
        assert_eq!(faults(1), faults(1));
        assert_ne!(faults(1), faults(2));
    }

    #[test]
    fn test_deserialize_kind_list() {
        let kinds: Vec<NonIdeality> = serde_json::from_str(
            r#"[
                {"kind": "device_faults", "lrs_proportion": 0.1, "hrs_proportion": 0.2},
                {"kind": "finite_conductance_states", "conductance_states": 8},
                {"kind": "endurance", "x": 1e4},
                {"kind": "retention", "time": 3600.0, "parameters": {"operation_mode": "gradual"}},
                {"kind": "non_linear", "response": "simulated"}
            ]"#,
        )
        .unwrap();
        assert_eq!(kinds.len(), 5);
        assert_eq!(
            kinds[0],
            NonIdeality::DeviceFaults(DeviceFaults::new(0.1, 0.2, 0.0))
        );
        assert!(matches!(kinds[2], NonIdeality::Endurance { x, .. } if x == 1e4));
        assert_eq!(kinds[4].name(), "non_linear");
    }
}
