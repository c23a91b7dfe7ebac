//! Labels the scheduler under test reads from each pod.
use std::collections::BTreeMap;

use crate::identity::ApplicationIdentity;

/// Groups workload units under one logical application.
pub const APPLICATION_ID_LABEL: &str = "applicationId";
/// Target scheduling queue.
pub const QUEUE_LABEL: &str = "queue";
/// Owner identity the scheduler uses as its fairness key.
pub const USERNAME_LABEL: &str = "yunikorn.apache.org/username";
/// Cpu hint in millicores.
pub const VCORE_HINT_LABEL: &str = "vcore";
/// Memory hint in bytes.
pub const MEMORY_HINT_LABEL: &str = "memory";
/// Runtime hint in seconds.
pub const DURATION_HINT_LABEL: &str = "duration";

/// Scheduler simulation hints carried as labels, independent of the actual resource request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceHints {
    /// Millicores
    pub vcore: String,
    /// Bytes
    pub memory: String,
    /// Seconds
    pub duration: String,
}

/// Create the labels the scheduler under test consumes for a single workload unit.
pub fn workload_labels(
    identity: &ApplicationIdentity,
    queue: &str,
    hints: &ResourceHints,
) -> BTreeMap<String, String> {
    BTreeMap::from_iter(vec![
        (
            APPLICATION_ID_LABEL.to_owned(),
            identity.application_id.to_owned(),
        ),
        (QUEUE_LABEL.to_owned(), queue.to_owned()),
        (USERNAME_LABEL.to_owned(), identity.owner.to_owned()),
        (VCORE_HINT_LABEL.to_owned(), hints.vcore.to_owned()),
        (MEMORY_HINT_LABEL.to_owned(), hints.memory.to_owned()),
        (DURATION_HINT_LABEL.to_owned(), hints.duration.to_owned()),
    ])
}
