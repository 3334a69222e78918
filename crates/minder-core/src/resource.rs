//! Resource kinds and classified envelopes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::file_arg::FileArg;
use crate::manifest::Manifest;

/// The resource variants the control plane accepts through apply.
///
/// Variants are declared in dispatch order: data sources are leaves, rule
/// types may reference data sources, and profiles may reference rule types.
/// The derived [`Ord`] follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// A reusable external-data definition.
    DataSource,
    /// A reusable evaluator definition.
    RuleType,
    /// A policy composing rule types against entities.
    Profile,
}

impl ResourceKind {
    /// All kinds, in dispatch order.
    pub const ALL: [Self; 3] = [Self::DataSource, Self::RuleType, Self::Profile];

    /// The canonical discriminator spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DataSource => "data-source",
            Self::RuleType => "rule-type",
            Self::Profile => "profile",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    /// Parses a discriminator, ignoring case and surrounding whitespace.
    /// Both `-` and `_` separators are accepted.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "profile" => Ok(Self::Profile),
            "rule-type" | "rule_type" => Ok(Self::RuleType),
            "data-source" | "data_source" => Ok(Self::DataSource),
            _ => Err(Error::UnknownKind {
                value: s.to_string(),
            }),
        }
    }
}

/// A classified manifest together with the input it came from.
///
/// The envelope is built by the classifier, which also applies any project
/// override; after that it is only read until the executor consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    kind: ResourceKind,
    manifest: Manifest,
    source: FileArg,
}

impl Envelope {
    /// Creates a new envelope.
    #[must_use]
    pub const fn new(kind: ResourceKind, manifest: Manifest, source: FileArg) -> Self {
        Self {
            kind,
            manifest,
            source,
        }
    }

    /// The resource kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.manifest.name()
    }

    /// The project the resource will be applied to, if any.
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.manifest.project()
    }

    /// The decoded manifest.
    #[must_use]
    pub const fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The input this envelope was loaded from.
    #[must_use]
    pub const fn source(&self) -> &FileArg {
        &self.source
    }

    /// Overrides the destination project.
    pub fn override_project(&mut self, project: impl Into<String>) {
        self.manifest.set_project(project);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_parse_variants() {
        assert_eq!("profile".parse::<ResourceKind>().unwrap(), ResourceKind::Profile);
        assert_eq!("Rule-Type".parse::<ResourceKind>().unwrap(), ResourceKind::RuleType);
        assert_eq!("rule_type".parse::<ResourceKind>().unwrap(), ResourceKind::RuleType);
        assert_eq!(
            "DATA_SOURCE".parse::<ResourceKind>().unwrap(),
            ResourceKind::DataSource
        );
        assert_eq!(
            " data-source ".parse::<ResourceKind>().unwrap(),
            ResourceKind::DataSource
        );
    }

    #[test]
    fn test_kind_parse_unknown() {
        let err = "ruletype-ish".parse::<ResourceKind>().unwrap_err();
        assert_eq!(
            err,
            Error::UnknownKind {
                value: "ruletype-ish".to_string()
            }
        );
    }

    #[test]
    fn test_kind_dispatch_order() {
        let mut kinds = vec![
            ResourceKind::Profile,
            ResourceKind::DataSource,
            ResourceKind::RuleType,
        ];
        kinds.sort();
        assert_eq!(kinds, ResourceKind::ALL.to_vec());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ResourceKind::RuleType).unwrap();
        assert_eq!(json, "\"rule-type\"");
    }

    #[test]
    fn test_envelope_override_project() {
        let manifest = Manifest::from_document(json!({
            "type": "profile",
            "name": "nightly",
            "context": {"project": "declared"},
        }))
        .unwrap();
        let mut envelope = Envelope::new(
            ResourceKind::Profile,
            manifest,
            FileArg::explicit("p.yaml").unwrap(),
        );

        assert_eq!(envelope.project(), Some("declared"));
        envelope.override_project("cli");
        assert_eq!(envelope.project(), Some("cli"));
        assert_eq!(envelope.source().path(), "p.yaml");
    }
}
