use std::fmt;

use serde::{Deserialize, Serialize};

/// A category of repair work with independent scheduling state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepairType {
    Full,
    Incremental,
    PreviewRepaired,
}

impl RepairType {
    pub const ALL: [RepairType; 3] = [
        RepairType::Full,
        RepairType::Incremental,
        RepairType::PreviewRepaired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RepairType::Full => "FULL",
            RepairType::Incremental => "INCREMENTAL",
            RepairType::PreviewRepaired => "PREVIEW_REPAIRED",
        }
    }
}

impl fmt::Display for RepairType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
