use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::whop::{AccessCheck, ResourceId};
use crate::services::identity_service::{IdentityVerifier, Subject};
use crate::services::whop_service::WhopApi;

#[derive(Clone)]
pub struct AccessService {
    identity: Arc<dyn IdentityVerifier>,
    whop: Arc<dyn WhopApi>,
}

impl AccessService {
    pub fn new(identity: Arc<dyn IdentityVerifier>, whop: Arc<dyn WhopApi>) -> Self {
        Self { identity, whop }
    }

    pub async fn check(&self, resource: &ResourceId, user_id: &str) -> Result<AccessCheck> {
        self.whop.check_access(user_id, resource).await
    }

    /// Fail-closed: no identity or any upstream failure yields `no_access`.
    pub async fn resolve(&self, resource: &ResourceId, subject: Subject<'_>) -> AccessCheck {
        let Some(user_id) = subject.user_id(self.identity.as_ref()) else {
            return AccessCheck::denied();
        };

        match self.check(resource, &user_id).await {
            Ok(access) => access,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    %user_id,
                    resource = %resource,
                    "Error checking Whop access"
                );
                AccessCheck::denied()
            }
        }
    }

    pub async fn is_admin(&self, resource: &ResourceId, subject: Subject<'_>) -> bool {
        self.resolve(resource, subject).await.is_admin()
    }

    pub async fn is_customer(&self, resource: &ResourceId, subject: Subject<'_>) -> bool {
        self.resolve(resource, subject).await.is_customer()
    }

    pub async fn require_admin(&self, resource: &ResourceId, subject: Subject<'_>) -> Result<()> {
        if self.is_admin(resource, subject).await {
            Ok(())
        } else {
            Err(Error::Forbidden("Admin access required".to_string()))
        }
    }
}
