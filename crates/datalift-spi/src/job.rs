// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Transfer direction of a job.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way a job moves data.
///
/// Import pulls data from the connector's source into the transfer service's
/// storage; export pushes it the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobDirection {
    /// Pull data from the connector into storage.
    Import,
    /// Push data from storage into the connector.
    Export,
}

impl JobDirection {
    /// Both directions, in declaration order.
    pub const ALL: [JobDirection; 2] = [JobDirection::Import, JobDirection::Export];
}

impl fmt::Display for JobDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobDirection::Import => write!(f, "IMPORT"),
            JobDirection::Export => write!(f, "EXPORT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde() {
        for direction in JobDirection::ALL {
            let encoded = serde_json::to_string(&direction).unwrap();
            assert_eq!(encoded, format!("\"{direction}\""));
        }
    }

    #[test]
    fn test_deserialize() {
        let direction: JobDirection = serde_json::from_str("\"EXPORT\"").unwrap();
        assert_eq!(direction, JobDirection::Export);
    }
}
