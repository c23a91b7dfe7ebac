//! Allocation of application and workload unit identifiers.
use std::collections::BTreeMap;

use crate::Error;

/// Width of the zero padded sequence number in identifiers.
const SEQUENCE_WIDTH: usize = 6;

/// Application identifier of a tenant's workload unit, `app-<owner>-<sequence>`.
pub fn application_id(owner: &str, sequence: u64) -> String {
    format!("app-{owner}-{sequence:0width$}", width = SEQUENCE_WIDTH)
}

/// Pod name of a tenant's workload unit, `pod-<owner>-<sequence>`.
pub fn pod_name(owner: &str, sequence: u64) -> String {
    format!("pod-{owner}-{sequence:0width$}", width = SEQUENCE_WIDTH)
}

/// Identity of a single logical application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplicationIdentity {
    /// Unique application id
    pub application_id: String,
    /// Owner of the application
    pub owner: String,
}

/// Allocates application identities and records which owner each one belongs to.
///
/// Lives for the duration of a run. Entries are never removed.
#[derive(Debug, Default)]
pub struct IdentityAllocator {
    registry: BTreeMap<String, String>,
}

impl IdentityAllocator {
    /// Create an allocator with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the identity for the unit `sequence` (1-based) of `owner`.
    ///
    /// Allocating the same pair twice yields the same identity; the registry keeps one entry.
    pub fn allocate(&mut self, owner: &str, sequence: u64) -> Result<ApplicationIdentity, Error> {
        if sequence == 0 {
            return Err(Error::InvalidSequence {
                owner: owner.to_owned(),
                sequence,
            });
        }
        let identity = ApplicationIdentity {
            application_id: application_id(owner, sequence),
            owner: owner.to_owned(),
        };
        self.registry
            .insert(identity.application_id.clone(), identity.owner.clone());
        Ok(identity)
    }

    /// Owner of a previously allocated application id.
    pub fn owner_of(&self, application_id: &str) -> Option<&str> {
        self.registry.get(application_id).map(String::as_str)
    }

    /// Number of distinct application ids allocated so far.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Report if nothing has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_zero_padded() {
        assert_eq!(application_id("user1", 1), "app-user1-000001");
        assert_eq!(application_id("user2", 123456), "app-user2-123456");
        assert_eq!(application_id("user2", 1234567), "app-user2-1234567");
        assert_eq!(pod_name("user1", 42), "pod-user1-000042");
    }

    #[test]
    fn allocate_records_owner() {
        let mut identities = IdentityAllocator::new();
        let identity = identities.allocate("user1", 7).unwrap();
        assert_eq!(
            identity,
            ApplicationIdentity {
                application_id: "app-user1-000007".to_owned(),
                owner: "user1".to_owned(),
            }
        );
        assert_eq!(identities.owner_of("app-user1-000007"), Some("user1"));
        assert_eq!(identities.owner_of("app-user1-000008"), None);
    }

    #[test]
    fn ids_are_unique_across_tenants() {
        let mut identities = IdentityAllocator::new();
        let ids: Vec<_> = [("user1", 1), ("user1", 2), ("user2", 1)]
            .into_iter()
            .map(|(owner, seq)| identities.allocate(owner, seq).unwrap().application_id)
            .collect();
        assert_eq!(
            ids,
            vec!["app-user1-000001", "app-user1-000002", "app-user2-000001"]
        );
        assert_eq!(identities.len(), 3);
    }

    #[test]
    fn reallocation_is_idempotent() {
        let mut identities = IdentityAllocator::new();
        let first = identities.allocate("user1", 1).unwrap();
        let second = identities.allocate("user1", 1).unwrap();
        assert_eq!(first, second);
        assert_eq!(identities.len(), 1);
    }

    #[test]
    fn sequence_zero_is_rejected() {
        let mut identities = IdentityAllocator::new();
        let err = identities.allocate("user1", 0).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSequence { ref owner, sequence: 0 } if owner == "user1"
        ));
        assert!(identities.is_empty());
    }
}
