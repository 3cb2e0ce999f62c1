//! Workload profiles
//!
//! A profile is a probability mix over the four operation kinds. Weights are
//! stored cumulatively so one uniform draw in `[0, 1)` picks the operation.

use std::fmt;
use std::str::FromStr;

use ordmap_core::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Operation kinds issued by workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// Point lookup
    Get,
    /// Insert or overwrite
    Put,
    /// Point removal
    Remove,
    /// Inclusive range query
    Range,
}

/// Named operation mixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkloadProfile {
    /// 90% get, 5% put, 5% remove
    #[serde(rename = "read-heavy")]
    ReadHeavy,
    /// 20% get, 40% put, 40% remove
    #[serde(rename = "write-heavy")]
    WriteHeavy,
    /// 60% get, 20% put, 20% remove
    #[serde(rename = "mixed")]
    Mixed,
    /// 30% get, 10% put, 10% remove, 50% range
    #[serde(rename = "range-heavy")]
    RangeHeavy,
}

impl WorkloadProfile {
    /// Every profile, in report order
    pub fn all() -> Vec<WorkloadProfile> {
        vec![
            WorkloadProfile::ReadHeavy,
            WorkloadProfile::WriteHeavy,
            WorkloadProfile::Mixed,
            WorkloadProfile::RangeHeavy,
        ]
    }

    /// Stable identifier
    pub fn id(&self) -> &'static str {
        match self {
            WorkloadProfile::ReadHeavy => "read-heavy",
            WorkloadProfile::WriteHeavy => "write-heavy",
            WorkloadProfile::Mixed => "mixed",
            WorkloadProfile::RangeHeavy => "range-heavy",
        }
    }

    /// Weights of (get, put, remove, range); they sum to 1
    pub fn weights(&self) -> [f64; 4] {
        match self {
            WorkloadProfile::ReadHeavy => [0.90, 0.05, 0.05, 0.0],
            WorkloadProfile::WriteHeavy => [0.20, 0.40, 0.40, 0.0],
            WorkloadProfile::Mixed => [0.60, 0.20, 0.20, 0.0],
            WorkloadProfile::RangeHeavy => [0.30, 0.10, 0.10, 0.50],
        }
    }

    fn cumulative(&self) -> [f64; 3] {
        let [get, put, remove, _] = self.weights();
        [get, get + put, get + put + remove]
    }

    /// Pick the operation for a uniform draw in `[0, 1)`
    pub fn operation_for(&self, draw: f64) -> OperationType {
        let [get, put, remove] = self.cumulative();
        if draw < get {
            OperationType::Get
        } else if draw < put {
            OperationType::Put
        } else if draw < remove {
            OperationType::Remove
        } else {
            OperationType::Range
        }
    }

    /// Draw the next operation from `rng`
    pub fn choose_operation<R: Rng + ?Sized>(&self, rng: &mut R) -> OperationType {
        self.operation_for(rng.gen::<f64>())
    }

    /// Parse an identifier, ignoring case and surrounding whitespace
    pub fn from_id(id: &str) -> Result<WorkloadProfile> {
        let wanted = id.trim();
        WorkloadProfile::all()
            .into_iter()
            .find(|w| w.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownWorkload(wanted.to_string()))
    }

    /// Parse a comma-separated list; empty segments are skipped
    pub fn parse_list(list: &str) -> Result<Vec<WorkloadProfile>> {
        list.split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(WorkloadProfile::from_id)
            .collect()
    }
}

impl fmt::Display for WorkloadProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for WorkloadProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        WorkloadProfile::from_id(s)
    }
}
