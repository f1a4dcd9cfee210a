// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The connector driver contract.

use crate::callbacks::Callbacks;
use crate::forms::FormSchema;
use crate::job::JobDirection;

/// A pluggable data source/sink driver.
///
/// A connector describes its user-facing configuration as two form surfaces
/// (one for connections, one per supported job direction) and supplies the
/// lifecycle callbacks that run around a submission attempt. Connectors are
/// registered once at process start and shared across submissions.
pub trait Connector: Send + Sync {
    /// Stable connector name; jobs and connections reference it.
    fn name(&self) -> &str;

    /// Artifact identifier the remote execution environment must stage to
    /// run this connector's code.
    fn artifact(&self) -> String {
        format!("datalift-connector-{}", self.name())
    }

    /// Schema of the connection configuration surface.
    fn connection_schema(&self) -> FormSchema;

    /// Schema of the job configuration surface for `direction`, or `None`
    /// when the connector does not support that direction.
    fn job_schema(&self, direction: JobDirection) -> Option<FormSchema>;

    /// Callbacks for import jobs, or `None` when imports are unsupported.
    fn importer(&self) -> Option<Callbacks>;

    /// Callbacks for export jobs, or `None` when exports are unsupported.
    fn exporter(&self) -> Option<Callbacks>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{Form, FormInput};

    struct FixtureConnector;

    impl Connector for FixtureConnector {
        fn name(&self) -> &str {
            "fixture"
        }

        fn connection_schema(&self) -> FormSchema {
            FormSchema::new(vec![Form::new("link", vec![FormInput::string("host", 255)])])
        }

        fn job_schema(&self, direction: JobDirection) -> Option<FormSchema> {
            match direction {
                JobDirection::Import => Some(FormSchema::default()),
                JobDirection::Export => None,
            }
        }

        fn importer(&self) -> Option<Callbacks> {
            Some(Callbacks::new())
        }

        fn exporter(&self) -> Option<Callbacks> {
            None
        }
    }

    #[test]
    fn test_default_artifact_uses_name() {
        assert_eq!(FixtureConnector.artifact(), "datalift-connector-fixture");
    }

    #[test]
    fn test_direction_support_is_per_direction() {
        let connector = FixtureConnector;
        assert!(connector.job_schema(JobDirection::Import).is_some());
        assert!(connector.job_schema(JobDirection::Export).is_none());
        assert!(connector.importer().is_some());
        assert!(connector.exporter().is_none());
    }
}
