//! Shared fixtures for HTTP handler tests.
//!
//! [`TestWorld`] wires the in-memory fixture adapters into a real
//! [`HttpState`], giving handler tests two tenants, seeded balances, and a
//! token per user without touching a database.

use std::sync::Arc;

use actix_web::{App, web};

use crate::domain::access::CallerIdentity;
use crate::domain::ports::{
    FixtureTokenVerifier, FixtureUserDirectory, InMemoryLedger, NoOpCache,
};
use crate::domain::user::{
    AdminScope, EmailAddress, OrganizationId, RoleType, User, UserDraft, UserId, UserStatus,
};
use crate::domain::{DirectoryUsersService, HierarchyService, PointsService};
use crate::inbound::http::state::HttpState;

/// An app with the full route table and the given state installed.
pub(crate) fn api_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .configure(crate::inbound::http::configure)
}

fn user(
    name: &str,
    organization: OrganizationId,
    manager: Option<UserId>,
    role: RoleType,
    is_admin: bool,
) -> User {
    User::new(UserDraft {
        id: UserId::random(),
        email: EmailAddress::new(format!("{name}@example.com")).expect("valid email"),
        display_name: name.to_owned(),
        organization_id: Some(organization),
        manager_id: manager,
        role_type: Some(role),
        is_admin,
        admin_scope: None,
        status: UserStatus::Active,
        department: None,
    })
    .expect("valid fixture user")
}

/// Two tenants, one admin, a small org chart, and seeded balances.
///
/// Organization A: `admin` plus `alice` with reports `bob` and `carol`.
/// Organization B: `dana`. Tokens equal the user's first name; `admin`
/// holds the only admin-capable role.
pub(crate) struct TestWorld {
    pub state: HttpState,
    pub org_a: OrganizationId,
    pub org_b: OrganizationId,
    pub admin: User,
    pub alice: User,
    pub bob: User,
    pub carol: User,
    pub dana: User,
}

impl TestWorld {
    pub fn new() -> Self {
        let org_a = OrganizationId::random();
        let org_b = OrganizationId::random();

        let admin = user("admin", org_a, None, RoleType::Admin, true);
        let alice = user("alice", org_a, None, RoleType::Employee, false);
        let bob = user("bob", org_a, Some(*alice.id()), RoleType::Employee, false);
        let carol = user("carol", org_a, Some(*alice.id()), RoleType::Employee, false);
        let dana = user("dana", org_b, None, RoleType::Employee, false);

        let directory = Arc::new(FixtureUserDirectory::new(vec![
            admin.clone(),
            alice.clone(),
            bob.clone(),
            carol.clone(),
            dana.clone(),
        ]));
        let ledger = Arc::new(
            InMemoryLedger::new()
                .with_user_account(*alice.id(), 100)
                .with_user_account(*bob.id(), 50)
                .with_user_account(*carol.id(), 0)
                .with_user_account(*dana.id(), 10),
        );
        let tokens = FixtureTokenVerifier::new()
            .with_identity("admin", CallerIdentity::from_user(&admin))
            .with_identity("alice", CallerIdentity::from_user(&alice))
            .with_identity("bob", CallerIdentity::from_user(&bob))
            .with_identity("carol", CallerIdentity::from_user(&carol))
            .with_identity("dana", CallerIdentity::from_user(&dana));

        let points = Arc::new(PointsService::new(ledger, Arc::new(NoOpCache)));
        let state = HttpState {
            points: points.clone(),
            points_query: points,
            hierarchy: Arc::new(HierarchyService::new(Arc::clone(&directory))),
            users: Arc::new(DirectoryUsersService::new(directory)),
            tokens: Arc::new(tokens),
        };

        Self {
            state,
            org_a,
            org_b,
            admin,
            alice,
            bob,
            carol,
            dana,
        }
    }

    /// A world whose `rogue` token resolves to a corporate admin that
    /// illegally carries a tenant scope. Such a row cannot be built through
    /// `User::new`, so the identity is handcrafted.
    pub fn with_scoped_corporate_admin() -> Self {
        let mut world = Self::new();
        let rogue = CallerIdentity {
            user_id: UserId::random(),
            organization_id: Some(world.org_a),
            is_admin: true,
            role_type: Some(RoleType::CorporateAdmin),
            admin_scope: Some(AdminScope::Super),
        };
        let tokens = FixtureTokenVerifier::new()
            .with_identity("rogue", rogue)
            .with_identity("alice", CallerIdentity::from_user(&world.alice));
        world.state.tokens = Arc::new(tokens);
        world
    }
}
