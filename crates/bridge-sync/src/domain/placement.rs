//! Datacenter placement of a monitor relative to this deployment.

use bridge_types::Entity;

/// Where a monitor runs relative to this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// No datacenter list: cached, not scheduled here.
    Unassigned,
    /// Listed for this deployment: cached and joins the schedule set.
    Local,
    /// Listed for other datacenters only: cached, not scheduled here.
    Remote,
}

impl Placement {
    /// Classify a decrypted entity for the deployment `datacenter`.
    pub fn of(entity: &Entity, datacenter: &str) -> Self {
        match entity.datacenters() {
            None => Placement::Unassigned,
            Some(list) if list.contains(&datacenter) => Placement::Local,
            Some(_) => Placement::Remote,
        }
    }

    pub fn joins_schedule(self) -> bool {
        self == Placement::Local
    }

    pub fn label(self) -> &'static str {
        match self {
            Placement::Unassigned => "no datacenter",
            Placement::Local => "local",
            Placement::Remote => "notify",
        }
    }
}
