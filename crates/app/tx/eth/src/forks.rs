//! Ethereum hard-fork activation heights.

use serde::{Deserialize, Serialize};

/// Activation height of each fork the admission rules depend on.
///
/// A fork with no height never activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForkSchedule {
    #[serde(default)]
    pub homestead: Option<u64>,
    #[serde(default)]
    pub eip155: Option<u64>,
    #[serde(default)]
    pub istanbul: Option<u64>,
    #[serde(default)]
    pub berlin: Option<u64>,
    #[serde(default)]
    pub london: Option<u64>,
}

impl Default for ForkSchedule {
    /// Every fork active from genesis.
    fn default() -> Self {
        Self {
            homestead: Some(0),
            eip155: Some(0),
            istanbul: Some(0),
            berlin: Some(0),
            london: Some(0),
        }
    }
}

fn active(fork: Option<u64>, height: u64) -> bool {
    fork.is_some_and(|at| height >= at)
}

impl ForkSchedule {
    pub fn is_homestead(&self, height: u64) -> bool {
        active(self.homestead, height)
    }

    pub fn is_eip155(&self, height: u64) -> bool {
        active(self.eip155, height)
    }

    pub fn is_istanbul(&self, height: u64) -> bool {
        active(self.istanbul, height)
    }

    pub fn is_berlin(&self, height: u64) -> bool {
        active(self.berlin, height)
    }

    pub fn is_london(&self, height: u64) -> bool {
        active(self.london, height)
    }

    /// Activation heights must be non-decreasing in fork order.
    pub fn validate(&self) -> Result<(), String> {
        let order = [
            ("homestead", self.homestead),
            ("eip155", self.eip155),
            ("istanbul", self.istanbul),
            ("berlin", self.berlin),
            ("london", self.london),
        ];
        let mut previous: Option<(&str, Option<u64>)> = None;
        for (name, at) in order {
            if let Some((prev_name, prev_at)) = previous {
                match (prev_at, at) {
                    (None, Some(_)) => {
                        return Err(format!("fork {name} enabled while {prev_name} is not"))
                    }
                    (Some(p), Some(c)) if c < p => {
                        return Err(format!(
                            "fork {name} activates at {c}, before {prev_name} at {p}"
                        ))
                    }
                    _ => {}
                }
            }
            previous = Some((name, at));
        }
        Ok(())
    }
}
