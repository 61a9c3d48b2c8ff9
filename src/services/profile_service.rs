use std::sync::Arc;

use crate::error::Result;
use crate::models::whop::WhopUser;
use crate::services::identity_service::{IdentityVerifier, Subject};
use crate::services::whop_service::WhopApi;

#[derive(Clone)]
pub struct ProfileService {
    identity: Arc<dyn IdentityVerifier>,
    whop: Arc<dyn WhopApi>,
}

impl ProfileService {
    pub fn new(identity: Arc<dyn IdentityVerifier>, whop: Arc<dyn WhopApi>) -> Self {
        Self { identity, whop }
    }

    /// `Ok(None)` for an empty id or an unknown user; `Err` when Whop could not answer.
    pub async fn fetch(&self, user_id: &str) -> Result<Option<WhopUser>> {
        if user_id.trim().is_empty() {
            return Ok(None);
        }
        self.whop.get_user(user_id.trim()).await
    }

    pub async fn current_user(&self, subject: Subject<'_>) -> Result<Option<WhopUser>> {
        match subject.user_id(self.identity.as_ref()) {
            Some(user_id) => self.fetch(&user_id).await,
            None => Ok(None),
        }
    }

    /// Fail-soft lookup for rendering: every failure becomes `None`.
    pub async fn fetch_or_none(&self, subject: Subject<'_>) -> Option<WhopUser> {
        match self.current_user(subject).await {
            Ok(user) => user,
            Err(err) => {
                tracing::error!(error = %err, transient = err.is_transient(), "Error fetching Whop user");
                None
            }
        }
    }
}
