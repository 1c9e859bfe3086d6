use std::fmt;

use serde::Serialize;

use crate::error::{FlowError, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Variant {
    /// Needs an explicitly initialised resource context.
    Accelerated,
    /// Software baseline.
    Reference,
}

impl Variant {
    pub fn label(self) -> &'static str {
        match self {
            Variant::Accelerated => "Accelerated",
            Variant::Reference => "Reference",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    Compress,
    Decompress,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Compress => f.write_str("Compress"),
            Role::Decompress => f.write_str("De-Compress"),
        }
    }
}

/// One row of the pairing table: which variant compresses, which variant
/// decompresses, and the tag appended to the original path for the
/// compressed artifact.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Scheme {
    pub compress: Variant,
    pub decompress: Variant,
    pub tag: &'static str,
    pub title: &'static str,
}

impl Scheme {
    /// Used by the single-file modes.
    pub const SINGLE_FILE: Scheme = Scheme {
        compress: Variant::Accelerated,
        decompress: Variant::Accelerated,
        tag: ".snappy",
        title: "Accelerated Compress vs Accelerated Decompress",
    };
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Pairing {
    AccelToAccel,
    AccelToReference,
    ReferenceToAccel,
}

impl Pairing {
    /// Execution order of selector 0.
    pub const ALL: [Pairing; 3] = [
        Pairing::AccelToAccel,
        Pairing::AccelToReference,
        Pairing::ReferenceToAccel,
    ];

    pub fn selector(self) -> u8 {
        match self {
            Pairing::AccelToAccel => 1,
            Pairing::AccelToReference => 2,
            Pairing::ReferenceToAccel => 3,
        }
    }

    pub fn scheme(self) -> Scheme {
        match self {
            Pairing::AccelToAccel => Scheme {
                compress: Variant::Accelerated,
                decompress: Variant::Accelerated,
                tag: ".xe2xd.snappy",
                title: "Accelerated Compress vs Accelerated Decompress",
            },
            Pairing::AccelToReference => Scheme {
                compress: Variant::Accelerated,
                decompress: Variant::Reference,
                tag: ".xe2sd.snappy",
                title: "Accelerated Compress vs Reference Decompress",
            },
            Pairing::ReferenceToAccel => Scheme {
                compress: Variant::Reference,
                decompress: Variant::Accelerated,
                tag: ".se2xd",
                title: "Reference Compress vs Accelerated Decompress",
            },
        }
    }
}

impl fmt::Display for Pairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme().title)
    }
}

/// Requested `--flow` value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum FlowSelector {
    All,
    Only(Pairing),
}

impl FlowSelector {
    pub const USAGE: &'static str = "valid flow selectors:\n  \
        0 - all flows (1, 2 and 3 in order)\n  \
        1 - Accelerated compress vs Accelerated decompress\n  \
        2 - Accelerated compress vs Reference decompress\n  \
        3 - Reference compress vs Accelerated decompress";

    pub fn from_index(sel: i64) -> Result<Self> {
        match sel {
            0 => Ok(FlowSelector::All),
            1 => Ok(FlowSelector::Only(Pairing::AccelToAccel)),
            2 => Ok(FlowSelector::Only(Pairing::AccelToReference)),
            3 => Ok(FlowSelector::Only(Pairing::ReferenceToAccel)),
            other => Err(FlowError::Usage(format!(
                "flow option is wrong: {other}\n{}",
                Self::USAGE
            ))),
        }
    }

    pub fn pairings(self) -> Vec<Pairing> {
        match self {
            FlowSelector::All => Pairing::ALL.to_vec(),
            FlowSelector::Only(p) => vec![p],
        }
    }

    /// True when a reference engine takes part in the run.
    pub fn uses_reference(self) -> bool {
        self.pairings().iter().any(|p| {
            let s = p.scheme();
            s.compress == Variant::Reference || s.decompress == Variant::Reference
        })
    }
}

impl Default for FlowSelector {
    fn default() -> Self {
        FlowSelector::Only(Pairing::AccelToAccel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_zero_runs_all_in_order() {
        let all = FlowSelector::from_index(0).unwrap().pairings();
        assert_eq!(all, Pairing::ALL.to_vec());
        let sels: Vec<u8> = all.iter().map(|p| p.selector()).collect();
        assert_eq!(sels, vec![1, 2, 3]);
    }

    #[test]
    fn single_selectors() {
        for p in Pairing::ALL {
            let sel = FlowSelector::from_index(p.selector() as i64).unwrap();
            assert_eq!(sel.pairings(), vec![p]);
        }
    }

    #[test]
    fn out_of_range_selector_enumerates_choices() {
        for bad in [-1, 4, 5, 100] {
            let err = FlowSelector::from_index(bad).unwrap_err();
            assert!(err.is_usage());
            let msg = err.to_string();
            for choice in ["0 -", "1 -", "2 -", "3 -"] {
                assert!(msg.contains(choice), "{msg}");
            }
        }
    }

    #[test]
    fn reference_usage() {
        assert!(!FlowSelector::default().uses_reference());
        assert!(FlowSelector::All.uses_reference());
        assert!(FlowSelector::Only(Pairing::ReferenceToAccel).uses_reference());
    }
}
