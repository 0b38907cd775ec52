// File: src/startup.rs
//
// What the daemon does with the outcome of the VRF probe at startup.

use serde_derive::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::VrfError;
use crate::vrf::Detection;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Any failure aborts startup.
    #[default]
    Strict,
    /// An inconclusive check degrades, a confirmed absence aborts.
    Lenient,
    /// Every failure degrades.
    Warn,
}

#[derive(Debug)]
pub enum Verdict {
    Proceed(Detection),
    /// Start without VRF-scoped features.
    Degrade(VrfError),
    Abort(VrfError),
}

impl Policy {
    pub fn apply(self, outcome: Result<Detection, VrfError>) -> Verdict {
        match (self, outcome) {
            (_, Ok(d)) => Verdict::Proceed(d),
            (Policy::Strict, Err(e)) => Verdict::Abort(e),
            (Policy::Lenient, Err(e)) if e.is_inconclusive() => Verdict::Degrade(e),
            (Policy::Lenient, Err(e)) => Verdict::Abort(e),
            (Policy::Warn, Err(e)) => Verdict::Degrade(e),
        }
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Policy::Strict),
            "lenient" => Ok(Policy::Lenient),
            "warn" => Ok(Policy::Warn),
            _ => Err(format!(
                "unknown policy {:?}, expected one of strict, lenient, warn",
                s
            )),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Policy::Strict => "strict",
            Policy::Lenient => "lenient",
            Policy::Warn => "warn",
        };
        write!(f, "{}", s)
    }
}

impl Verdict {
    pub fn exit_code(&self) -> u8 {
        match self {
            Verdict::Proceed(_) | Verdict::Degrade(_) => 0,
            Verdict::Abort(VrfError::NotLoaded) => 1,
            Verdict::Abort(VrfError::Inconclusive(_)) => 2,
        }
    }
}
