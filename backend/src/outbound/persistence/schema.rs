//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation. Regenerate with `diesel print-schema` when
//! the migrations change.

diesel::table! {
    /// Tenant organizations.
    organizations (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Organization display name.
        name -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Platform users, each belonging to at most one organization.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning tenant; null only for corporate admins.
        organization_id -> Nullable<Uuid>,
        /// Unique-per-tenant email address, stored lower-cased.
        email -> Varchar,
        /// Name shown to colleagues.
        display_name -> Varchar,
        /// Reporting line: the manager this user reports to.
        manager_id -> Nullable<Uuid>,
        /// Stored role label; unknown values degrade to no role.
        role_type -> Nullable<Varchar>,
        /// Raw admin flag; grants nothing without an admin-capable role.
        is_admin -> Bool,
        /// Elevated administrator scope label.
        admin_scope -> Nullable<Varchar>,
        /// Lifecycle status label.
        status -> Varchar,
        /// Free-text department label.
        department -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp (auto-updated by trigger).
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ledger accounts: one per user plus the single system account.
    accounts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user; null only for the system account.
        user_id -> Nullable<Uuid>,
        /// Account kind label: `user` or `system`.
        account_type -> Varchar,
        /// Current balance; kept non-negative by the posting transaction.
        balance -> Int8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only record of point movements between accounts.
    transactions (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Account the points left.
        from_account_id -> Uuid,
        /// Account the points entered.
        to_account_id -> Uuid,
        /// Amount moved; strictly positive.
        amount -> Int8,
        /// Short machine-friendly reason label.
        reason -> Varchar,
        /// Optional free-text description.
        description -> Nullable<Text>,
        /// Administrator who initiated the movement, when applicable.
        created_by -> Nullable<Uuid>,
        /// Creation timestamp; part of the history pagination keyset.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bearer tokens issued to users.
    api_tokens (token) {
        /// The opaque token value.
        token -> Varchar,
        /// Owning user.
        user_id -> Uuid,
        /// Issue timestamp.
        created_at -> Timestamptz,
        /// Revocation timestamp; null while the token is live.
        revoked_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(users -> organizations (organization_id));
diesel::joinable!(accounts -> users (user_id));
diesel::joinable!(api_tokens -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    organizations,
    users,
    accounts,
    transactions,
    api_tokens,
);
