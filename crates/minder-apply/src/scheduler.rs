//! Dependency ordering.
//!
//! Resources are dispatched kind by kind, leaves first: data sources, then
//! rule types, then profiles. Within a kind the input order is kept. The
//! scheduler does not look at cross-references; the server rejects
//! dangling ones.

use std::collections::HashMap;

use minder_core::{Envelope, ResourceKind};

use crate::error::{ApplyError, Result};

/// Envelopes in dispatch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchPlan {
    envelopes: Vec<Envelope>,
}

impl DispatchPlan {
    /// Orders `envelopes` for dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::DuplicateResource`] if two envelopes share the
    /// same kind, project and name.
    pub fn new(mut envelopes: Vec<Envelope>) -> Result<Self> {
        check_unique(&envelopes)?;
        // Stable, so input order survives within each kind.
        envelopes.sort_by_key(Envelope::kind);
        Ok(Self { envelopes })
    }

    /// Number of envelopes to dispatch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    /// True if there is nothing to dispatch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    /// Number of envelopes of one kind.
    #[must_use]
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.envelopes.iter().filter(|e| e.kind() == kind).count()
    }

    /// Iterates in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &Envelope> {
        self.envelopes.iter()
    }
}

impl IntoIterator for DispatchPlan {
    type Item = Envelope;
    type IntoIter = std::vec::IntoIter<Envelope>;

    fn into_iter(self) -> Self::IntoIter {
        self.envelopes.into_iter()
    }
}

fn check_unique(envelopes: &[Envelope]) -> Result<()> {
    let mut seen: HashMap<(ResourceKind, Option<&str>, &str), &str> = HashMap::new();

    for envelope in envelopes {
        let key = (envelope.kind(), envelope.project(), envelope.name());
        if let Some(first) = seen.insert(key, envelope.source().path()) {
            return Err(ApplyError::DuplicateResource {
                kind: envelope.kind(),
                name: envelope.name().to_string(),
                project: envelope.project().unwrap_or("<default>").to_string(),
                first: first.to_string(),
                second: envelope.source().path().to_string(),
            });
        }
    }

    Ok(())
}
