//! Audit stamp - Metadati di creazione e modifica delle entità auditate

use super::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;

/// Actor/timestamp metadata carried by an [`AuditedEntity`].
///
/// Embed it with `#[serde(flatten)]` so the four fields sit next to the
/// entity's own fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Audit<A> {
    pub created_by: Option<A>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_by: Option<A>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<A> Default for Audit<A> {
    fn default() -> Self {
        Self {
            created_by: None,
            created_at: None,
            updated_by: None,
            updated_at: None,
        }
    }
}

impl<A: Clone> Audit<A> {
    /// Stamps the creation fields and clears the update fields
    pub fn stamp_created(&mut self, actor: A, at: DateTime<Utc>) {
        self.created_by = Some(actor);
        self.created_at = Some(at);
        self.updated_by = None;
        self.updated_at = None;
    }

    /// Stamps the update fields, keeping the creation fields of `current`
    pub fn stamp_updated(&mut self, current: &Audit<A>, actor: A, at: DateTime<Utc>) {
        self.created_by = current.created_by.clone();
        self.created_at = current.created_at;
        self.updated_by = Some(actor);
        self.updated_at = Some(at);
    }
}

/// An [`Entity`] that records who created it and who last updated it.
pub trait AuditedEntity: Entity {
    /// Identifier of the actor performing a write
    type Actor: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    fn audit(&self) -> &Audit<Self::Actor>;

    fn audit_mut(&mut self) -> &mut Audit<Self::Actor>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_stamp_created_clears_update_fields() {
        let now = Utc::now();
        let mut audit = Audit {
            created_by: None,
            created_at: None,
            updated_by: Some(9),
            updated_at: Some(now),
        };

        audit.stamp_created(1, now);

        assert_eq!(audit.created_by, Some(1));
        assert_eq!(audit.created_at, Some(now));
        assert_eq!(audit.updated_by, None);
        assert_eq!(audit.updated_at, None);
    }

    #[test]
    fn test_stamp_updated_keeps_original_creation() {
        let created_at = Utc::now() - Duration::days(1);
        let current = Audit {
            created_by: Some(1),
            created_at: Some(created_at),
            updated_by: None,
            updated_at: None,
        };
        // the incoming payload tries to rewrite the creation metadata
        let mut incoming = Audit {
            created_by: Some(99),
            created_at: Some(Utc::now()),
            updated_by: None,
            updated_at: None,
        };

        let now = Utc::now();
        incoming.stamp_updated(&current, 2, now);

        assert_eq!(incoming.created_by, Some(1));
        assert_eq!(incoming.created_at, Some(created_at));
        assert_eq!(incoming.updated_by, Some(2));
        assert_eq!(incoming.updated_at, Some(now));
    }
}
