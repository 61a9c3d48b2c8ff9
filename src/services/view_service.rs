//! Composes identity, profile, access, mirror and roster lookups into the two app views.
//!
//! Every request walks `Unauthenticated -> Authenticated -> AccessChecked -> Rendered`, or
//! ends in `Redirected` when no identity is present or, for the dashboard, when the caller
//! is not an admin of the company.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::response::{IntoResponse, Json, Redirect, Response};
use serde::Serialize;

use crate::dto::view_dto::{DashboardView, ExperienceView, ProfileCard};
use crate::models::user::MirroredUser;
use crate::models::whop::{ResourceId, WhopUser};
use crate::services::access_service::AccessService;
use crate::services::identity_service::{resolve_user_id, IdentityVerifier, Subject};
use crate::services::mirror_service::UserMirror;
use crate::services::profile_service::ProfileService;
use crate::services::roster_service::{RosterService, RosterSnapshot};
use crate::utils::avatar::AvatarGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Unauthenticated,
    Authenticated,
    AccessChecked,
    Rendered,
    Redirected,
}

impl ViewState {
    pub fn can_transition_to(self, next: ViewState) -> bool {
        use ViewState::*;
        matches!(
            (self, next),
            (Unauthenticated, Authenticated)
                | (Unauthenticated, Redirected)
                | (Authenticated, AccessChecked)
                | (AccessChecked, Rendered)
                | (AccessChecked, Redirected)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ViewState::Rendered | ViewState::Redirected)
    }
}

struct ViewFlow {
    view: &'static str,
    state: ViewState,
}

impl ViewFlow {
    fn start(view: &'static str) -> Self {
        Self {
            view,
            state: ViewState::Unauthenticated,
        }
    }

    fn advance(&mut self, next: ViewState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal view transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!(view = self.view, from = ?self.state, to = ?next, "view transition");
        self.state = next;
        if next.is_terminal() {
            tracing::info!(view = self.view, outcome = ?next, "view finished");
        }
    }
}

#[derive(Debug, Clone)]
pub enum ViewOutcome<T> {
    Rendered(T),
    Redirected(String),
}

impl<T> ViewOutcome<T> {
    pub fn redirect_location(&self) -> Option<&str> {
        match self {
            ViewOutcome::Redirected(location) => Some(location),
            ViewOutcome::Rendered(_) => None,
        }
    }

    pub fn rendered(self) -> Option<T> {
        match self {
            ViewOutcome::Rendered(view) => Some(view),
            ViewOutcome::Redirected(_) => None,
        }
    }
}

impl<T: Serialize> IntoResponse for ViewOutcome<T> {
    fn into_response(self) -> Response {
        match self {
            ViewOutcome::Rendered(view) => Json(view).into_response(),
            ViewOutcome::Redirected(location) => Redirect::to(&location).into_response(),
        }
    }
}

/// Member-facing page for `resource`.
pub fn experience_path(resource: &ResourceId) -> String {
    format!("/experiences/{}", resource)
}

#[derive(Clone)]
pub struct ViewService {
    identity: Arc<dyn IdentityVerifier>,
    profiles: ProfileService,
    access: AccessService,
    roster: RosterService,
    mirror: UserMirror,
    avatars: AvatarGenerator,
    sign_in_path: String,
}

impl ViewService {
    pub fn new(
        identity: Arc<dyn IdentityVerifier>,
        profiles: ProfileService,
        access: AccessService,
        roster: RosterService,
        mirror: UserMirror,
        avatars: AvatarGenerator,
        sign_in_path: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            profiles,
            access,
            roster,
            mirror,
            avatars,
            sign_in_path: sign_in_path.into(),
        }
    }

    pub async fn dashboard(
        &self,
        headers: &HeaderMap,
        company: &ResourceId,
    ) -> ViewOutcome<DashboardView> {
        let mut flow = ViewFlow::start("dashboard");

        let Some(user_id) = resolve_user_id(self.identity.as_ref(), headers) else {
            flow.advance(ViewState::Redirected);
            return ViewOutcome::Redirected(self.sign_in_path.clone());
        };
        flow.advance(ViewState::Authenticated);

        let profile = self.profiles.fetch_or_none(Subject::User(&user_id)).await;
        let access = self.access.resolve(company, Subject::User(&user_id)).await;
        flow.advance(ViewState::AccessChecked);

        if !access.is_admin() {
            tracing::info!(%user_id, company_id = %company, access_level = %access.access_level, "redirecting non-admin to member view");
            flow.advance(ViewState::Redirected);
            return ViewOutcome::Redirected(experience_path(company));
        }

        let mirrored_user = self.mirror_profile(profile.as_ref()).await;

        let roster = self
            .roster
            .fetch_all(company, None)
            .await
            .unwrap_or_else(|err| {
                tracing::error!(error = %err, company_id = %company, "Error fetching authorized users");
                RosterSnapshot::default()
            });

        let users = self.mirror.list().await.unwrap_or_else(|err| {
            tracing::error!(error = %err, "Error listing mirrored users");
            Vec::new()
        });
        let user_count = self.mirror.count().await.unwrap_or_else(|err| {
            tracing::error!(error = %err, "Error counting mirrored users");
            0
        });

        flow.advance(ViewState::Rendered);
        ViewOutcome::Rendered(DashboardView {
            company_id: company.to_string(),
            user: profile.as_ref().map(|p| ProfileCard::from_user(p, &self.avatars)),
            access_level: access.access_level,
            mirrored_user,
            users,
            user_count,
            authorized_users: roster.users,
            authorized_users_truncated: roster.truncated,
        })
    }

    pub async fn experience(
        &self,
        headers: &HeaderMap,
        experience: &ResourceId,
    ) -> ViewOutcome<ExperienceView> {
        let mut flow = ViewFlow::start("experience");

        let Some(user_id) = resolve_user_id(self.identity.as_ref(), headers) else {
            flow.advance(ViewState::Redirected);
            return ViewOutcome::Redirected(self.sign_in_path.clone());
        };
        flow.advance(ViewState::Authenticated);

        let profile = self.profiles.fetch_or_none(Subject::User(&user_id)).await;
        let access = self.access.resolve(experience, Subject::User(&user_id)).await;
        flow.advance(ViewState::AccessChecked);
        tracing::debug!(
            resource_kind = ?experience.kind(),
            access_level = %access.access_level,
            "member view access resolved"
        );

        let mirrored_user = self.mirror_profile(profile.as_ref()).await;

        flow.advance(ViewState::Rendered);
        ViewOutcome::Rendered(ExperienceView {
            experience_id: experience.to_string(),
            user: profile.as_ref().map(|p| ProfileCard::from_user(p, &self.avatars)),
            access_level: access.access_level,
            mirrored_user,
        })
    }

    async fn mirror_profile(&self, profile: Option<&WhopUser>) -> Option<MirroredUser> {
        let profile = profile?;
        match self.mirror.upsert(profile).await {
            Ok(stored) => Some(stored),
            Err(err) => {
                tracing::error!(error = %err, user_id = %profile.id, "Error syncing user to database");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::user_repository::MockUserRepository;
    use crate::error::Error;
    use crate::models::user::UpsertUser;
    use crate::models::whop::{
        AccessCheck, AccessLevel, AuthorizedUser, AuthorizedUserIdentity, AuthorizedUserRole,
        AuthorizedUsersPage,
    };
    use crate::services::identity_service::{IdentityError, MockIdentityVerifier};
    use crate::services::whop_service::MockWhopApi;
    use chrono::Utc;

    fn ana() -> WhopUser {
        WhopUser {
            id: "user_7".into(),
            username: "ana".into(),
            name: None,
            bio: None,
            created_at: Utc::now(),
            profile_picture: None,
        }
    }

    fn stored_from(record: &UpsertUser) -> MirroredUser {
        MirroredUser {
            id: record.id.clone(),
            username: record.username.clone(),
            name: record.name.clone(),
            bio: record.bio.clone(),
            profile_picture_url: Some(record.profile_picture_url.clone()),
            created_at: record.seen_at,
            updated_at: record.seen_at,
            last_login_at: Some(record.seen_at),
        }
    }

    fn identity_for(user_id: Option<&'static str>) -> MockIdentityVerifier {
        let mut identity = MockIdentityVerifier::new();
        identity.expect_verify().returning(move |_| match user_id {
            Some(id) => Ok(id.to_string()),
            None => Err(IdentityError::MissingToken),
        });
        identity
    }

    fn service(
        identity: MockIdentityVerifier,
        whop: MockWhopApi,
        repo: MockUserRepository,
    ) -> ViewService {
        let identity: Arc<dyn IdentityVerifier> = Arc::new(identity);
        let whop: Arc<dyn crate::services::whop_service::WhopApi> = Arc::new(whop);
        let avatars = AvatarGenerator::default();
        ViewService::new(
            identity.clone(),
            ProfileService::new(identity.clone(), whop.clone()),
            AccessService::new(identity.clone(), whop.clone()),
            RosterService::new(whop, 100),
            UserMirror::new(Arc::new(repo), avatars.clone()),
            avatars,
            "/",
        )
    }

    fn untouched_whop() -> MockWhopApi {
        let mut whop = MockWhopApi::new();
        whop.expect_get_user().never();
        whop.expect_check_access().never();
        whop.expect_list_authorized_users().never();
        whop
    }

    fn untouched_repo() -> MockUserRepository {
        let mut repo = MockUserRepository::new();
        repo.expect_upsert().never();
        repo.expect_list().never();
        repo.expect_count().never();
        repo
    }

    fn biz_99() -> ResourceId {
        ResourceId::parse("biz_99").unwrap()
    }

    #[test]
    fn transition_table() {
        use ViewState::*;
        assert!(Unauthenticated.can_transition_to(Authenticated));
        assert!(Unauthenticated.can_transition_to(Redirected));
        assert!(AccessChecked.can_transition_to(Redirected));
        assert!(AccessChecked.can_transition_to(Rendered));
        assert!(!Unauthenticated.can_transition_to(Rendered));
        assert!(!Authenticated.can_transition_to(Rendered));
        assert!(!Rendered.can_transition_to(Redirected));
        assert!(Rendered.is_terminal() && Redirected.is_terminal());
    }

    #[tokio::test]
    async fn unauthenticated_dashboard_redirects_without_side_effects() {
        let views = service(identity_for(None), untouched_whop(), untouched_repo());
        let outcome = views.dashboard(&HeaderMap::new(), &biz_99()).await;
        assert_eq!(outcome.redirect_location(), Some("/"));
    }

    #[tokio::test]
    async fn unauthenticated_experience_redirects_without_side_effects() {
        let views = service(identity_for(None), untouched_whop(), untouched_repo());
        let outcome = views
            .experience(&HeaderMap::new(), &ResourceId::parse("exp_1").unwrap())
            .await;
        assert_eq!(outcome.redirect_location(), Some("/"));
    }

    #[tokio::test]
    async fn customer_is_sent_to_member_view() {
        let mut whop = MockWhopApi::new();
        whop.expect_get_user().returning(|_| Ok(Some(ana())));
        whop.expect_check_access().returning(|_, _| {
            Ok(AccessCheck {
                has_access: true,
                access_level: AccessLevel::Customer,
            })
        });
        whop.expect_list_authorized_users().never();

        let views = service(identity_for(Some("user_7")), whop, untouched_repo());
        let outcome = views.dashboard(&HeaderMap::new(), &biz_99()).await;
        assert_eq!(outcome.redirect_location(), Some("/experiences/biz_99"));
    }

    #[tokio::test]
    async fn access_check_failure_redirects() {
        let mut whop = MockWhopApi::new();
        whop.expect_get_user().returning(|_| Ok(Some(ana())));
        whop.expect_check_access().returning(|_, _| {
            Err(Error::Upstream {
                status: 500,
                body: String::new(),
            })
        });
        whop.expect_list_authorized_users().never();

        let views = service(identity_for(Some("user_7")), whop, untouched_repo());
        let outcome = views.dashboard(&HeaderMap::new(), &biz_99()).await;
        assert!(outcome.redirect_location().is_some());
    }

    #[tokio::test]
    async fn admin_scenario_mirrors_and_fetches_roster_once() {
        let mut whop = MockWhopApi::new();
        whop.expect_get_user()
            .withf(|id| id == "user_7")
            .times(1)
            .returning(|_| Ok(Some(ana())));
        whop.expect_check_access()
            .withf(|user, resource| user == "user_7" && resource.as_str() == "biz_99")
            .times(1)
            .returning(|_, _| {
                Ok(AccessCheck {
                    has_access: true,
                    access_level: AccessLevel::Admin,
                })
            });
        whop.expect_list_authorized_users()
            .withf(|company, _| company.as_str() == "biz_99")
            .times(1)
            .returning(|_, _| {
                Ok(AuthorizedUsersPage {
                    data: vec![AuthorizedUser {
                        id: "ausr_1".into(),
                        role: AuthorizedUserRole::Owner,
                        user: AuthorizedUserIdentity {
                            id: "user_7".into(),
                            name: None,
                            username: "ana".into(),
                            email: None,
                        },
                    }],
                    page_info: Default::default(),
                })
            });

        let mut repo = MockUserRepository::new();
        repo.expect_upsert()
            .withf(|record| {
                record.id == "user_7"
                    && record.username == "ana"
                    && record.profile_picture_url
                        == "https://api.dicebear.com/7.x/adventurer/svg?seed=ana"
            })
            .times(1)
            .returning(|record| Ok(stored_from(record)));
        repo.expect_list().returning(|| Ok(Vec::new()));
        repo.expect_count().returning(|| Ok(1));

        let views = service(identity_for(Some("user_7")), whop, repo);
        let view = views
            .dashboard(&HeaderMap::new(), &biz_99())
            .await
            .rendered()
            .expect("admin should see the dashboard");

        assert_eq!(view.company_id, "biz_99");
        assert_eq!(view.access_level, AccessLevel::Admin);
        assert_eq!(view.authorized_users.len(), 1);
        assert!(!view.authorized_users_truncated);
        assert_eq!(view.mirrored_user.unwrap().id, "user_7");
        assert_eq!(view.user.unwrap().display_name, "ana");
    }

    #[tokio::test]
    async fn roster_and_mirror_failures_still_render_dashboard() {
        let mut whop = MockWhopApi::new();
        whop.expect_get_user().returning(|_| Ok(Some(ana())));
        whop.expect_check_access().returning(|_, _| {
            Ok(AccessCheck {
                has_access: true,
                access_level: AccessLevel::Admin,
            })
        });
        whop.expect_list_authorized_users().times(1).returning(|_, _| {
            Err(Error::Upstream {
                status: 503,
                body: String::new(),
            })
        });

        let mut repo = MockUserRepository::new();
        repo.expect_upsert()
            .returning(|_| Err(Error::Internal("db down".into())));
        repo.expect_list()
            .returning(|| Err(Error::Internal("db down".into())));
        repo.expect_count()
            .returning(|| Err(Error::Internal("db down".into())));

        let views = service(identity_for(Some("user_7")), whop, repo);
        let view = views
            .dashboard(&HeaderMap::new(), &biz_99())
            .await
            .rendered()
            .expect("page should render despite secondary failures");

        assert!(view.authorized_users.is_empty());
        assert!(view.mirrored_user.is_none());
        assert!(view.users.is_empty());
        assert_eq!(view.user_count, 0);
        assert!(view.user.is_some());
    }

    #[tokio::test]
    async fn member_view_renders_for_any_identity() {
        let mut whop = MockWhopApi::new();
        whop.expect_get_user().returning(|_| Ok(Some(ana())));
        whop.expect_check_access()
            .returning(|_, _| Ok(AccessCheck::denied()));
        whop.expect_list_authorized_users().never();

        let mut repo = MockUserRepository::new();
        repo.expect_upsert()
            .times(1)
            .returning(|record| Ok(stored_from(record)));
        repo.expect_list().never();

        let views = service(identity_for(Some("user_7")), whop, repo);
        let view = views
            .experience(&HeaderMap::new(), &ResourceId::parse("exp_5").unwrap())
            .await
            .rendered()
            .expect("member view should render");
        assert_eq!(view.experience_id, "exp_5");
        assert_eq!(view.access_level, AccessLevel::NoAccess);
        assert!(view.mirrored_user.is_some());
    }

    #[tokio::test]
    async fn missing_profile_skips_mirror() {
        let mut whop = MockWhopApi::new();
        whop.expect_get_user().returning(|_| Ok(None));
        whop.expect_check_access()
            .returning(|_, _| Ok(AccessCheck::denied()));

        let views = service(identity_for(Some("user_7")), whop, untouched_repo());
        let view = views
            .experience(&HeaderMap::new(), &ResourceId::parse("exp_5").unwrap())
            .await
            .rendered()
            .unwrap();
        assert!(view.user.is_none());
        assert!(view.mirrored_user.is_none());
    }
}
