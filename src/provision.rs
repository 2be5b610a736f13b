//! Content/user provisioning and target-settings contracts
//!
//! The orchestrator needs trackable resources to attribute synthetic visits
//! to, and the target system's settings must allow the tracker endpoint to be
//! reached. Both concerns are external collaborators behind traits; the
//! simulator ships a static provisioner and a no-op settings handle for
//! targets that are already prepared.

use async_trait::async_trait;

/// A trackable content resource on the target system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Content identifier on the target system
    pub id: u64,
    /// Public URL a synthetic visit is attributed to
    pub url: String,
    /// Human-readable title
    pub title: String,
}

impl Resource {
    /// Create a resource from its identifier, URL, and title.
    pub fn new(id: u64, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            title: title.into(),
        }
    }
}

/// A user account used for logged-in-visitor simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimUser {
    /// User identifier on the target system
    pub id: u64,
    /// Role name (weights which users appear in logged-in traffic)
    pub role: String,
}

impl SimUser {
    /// Create a user from its identifier and role.
    pub fn new(id: u64, role: impl Into<String>) -> Self {
        Self {
            id,
            role: role.into(),
        }
    }
}

/// Errors from provisioning and settings operations
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// Target system rejected or failed a provisioning call
    #[error("provisioning failed: {0}")]
    ProvisioningFailed(String),

    /// Settings could not be read or written on the target system
    #[error("settings error: {0}")]
    SettingsError(String),
}

/// Ensures sample content and users exist on the target system.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Ensure trackable resources exist, returning all of them.
    ///
    /// The orchestrator fails the run when this returns an empty list: with
    /// nothing to attribute visits to, there is no meaningful traffic to
    /// simulate.
    async fn ensure_resources(&self) -> Result<Vec<Resource>, ProvisionError>;

    /// Ensure at least `minimum` users exist, returning all of them.
    async fn ensure_users(&self, minimum: usize) -> Result<Vec<SimUser>, ProvisionError>;
}

/// Reads/repairs the target-system settings required for the tracker.
#[async_trait]
pub trait TargetSettings: Send + Sync {
    /// Verify tracker-reachability settings; repair them when `auto_fix`.
    ///
    /// Returns whether the settings are (now) correct.
    async fn ensure_settings(&self, auto_fix: bool) -> Result<bool, ProvisionError>;

    /// Restore pre-run settings values. Returns whether anything was restored.
    async fn restore_settings(&self) -> Result<bool, ProvisionError>;
}

/// Provisioner backed by a fixed, caller-supplied resource list.
///
/// Suitable when the target already has content (the common CLI case) or for
/// tests. Users are synthesized on demand with sequential ids.
#[derive(Debug, Clone, Default)]
pub struct StaticProvisioner {
    resources: Vec<Resource>,
    users: Vec<SimUser>,
}

impl StaticProvisioner {
    /// Create a provisioner over a fixed resource list.
    pub fn new(resources: Vec<Resource>) -> Self {
        Self {
            resources,
            users: Vec::new(),
        }
    }

    /// Attach a fixed user list for logged-in simulation.
    pub fn with_users(mut self, users: Vec<SimUser>) -> Self {
        self.users = users;
        self
    }
}

#[async_trait]
impl Provisioner for StaticProvisioner {
    async fn ensure_resources(&self) -> Result<Vec<Resource>, ProvisionError> {
        Ok(self.resources.clone())
    }

    async fn ensure_users(&self, minimum: usize) -> Result<Vec<SimUser>, ProvisionError> {
        let mut users = self.users.clone();
        while users.len() < minimum {
            let id = users.len() as u64 + 1;
            users.push(SimUser::new(id, "subscriber"));
        }
        Ok(users)
    }
}

/// Settings handle for targets that are already configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSettings;

#[async_trait]
impl TargetSettings for NoopSettings {
    async fn ensure_settings(&self, _auto_fix: bool) -> Result<bool, ProvisionError> {
        Ok(true)
    }

    async fn restore_settings(&self) -> Result<bool, ProvisionError> {
        Ok(false)
    }
}
