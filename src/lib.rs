pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::database::user_repository::{PgUserRepository, UserRepository};
use crate::error::Result;
use crate::services::{
    access_service::AccessService,
    identity_service::{IdentityVerifier, WhopTokenVerifier},
    mirror_service::UserMirror,
    profile_service::ProfileService,
    roster_service::RosterService,
    view_service::ViewService,
    whop_service::{WhopApi, WhopService},
};
use crate::utils::avatar::AvatarGenerator;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub profile_service: ProfileService,
    pub access_service: AccessService,
    pub roster_service: RosterService,
    pub user_mirror: UserMirror,
    pub view_service: ViewService,
}

impl AppState {
    pub fn new(config: Arc<Config>, pool: PgPool) -> Result<Self> {
        let identity = Arc::new(WhopTokenVerifier::from_config(&config)?);
        let whop = Arc::new(WhopService::from_config(&config)?);
        let repo = Arc::new(PgUserRepository::new(pool));
        Ok(Self::from_parts(config, identity, whop, repo))
    }

    /// Wires the services over the given backends.
    pub fn from_parts(
        config: Arc<Config>,
        identity: Arc<dyn IdentityVerifier>,
        whop: Arc<dyn WhopApi>,
        repo: Arc<dyn UserRepository>,
    ) -> Self {
        let avatars = AvatarGenerator::new(config.avatar_url_template.clone(), config.avatar_style);

        let profile_service = ProfileService::new(identity.clone(), whop.clone());
        let access_service = AccessService::new(identity.clone(), whop.clone());
        let roster_service = RosterService::new(whop, config.roster_page_size);
        let user_mirror = UserMirror::new(repo, avatars.clone());
        let view_service = ViewService::new(
            identity.clone(),
            profile_service.clone(),
            access_service.clone(),
            roster_service.clone(),
            user_mirror.clone(),
            avatars,
            config.sign_in_path.clone(),
        );

        Self {
            config,
            identity,
            profile_service,
            access_service,
            roster_service,
            user_mirror,
            view_service,
        }
    }
}
