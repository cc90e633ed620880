use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::ShellError, models::Profile};

/// ProfileStore Trait
///
/// Defines the abstract contract for looking up the profile behind a session, so the
/// session resolver can run against Postgres in production and an in-memory map in
/// tests and local development.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn ProfileStore>`) shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// `Ok(None)` means the user no longer exists. `Err` means we could not find out.
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, ShellError>;
}

/// ProfileStoreState
///
/// The concrete type used to share the profile store across the application state.
pub type ProfileStoreState = Arc<dyn ProfileStore>;

/// PostgresProfileStore
///
/// Reads roles from the `public.profiles` table.
pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, ShellError> {
        sqlx::query_as::<_, Profile>("SELECT id, email, role FROM public.profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = %id, "profile lookup failed");
                ShellError::SessionUnresolvable(e.to_string())
            })
    }
}

/// MockProfileStore
///
/// In-memory profile store used for tests and for local runs without `DATABASE_URL`.
#[derive(Clone, Default)]
pub struct MockProfileStore {
    profiles: HashMap<Uuid, Profile>,
    /// When true, every lookup returns a simulated outage.
    pub should_fail: bool,
}

impl MockProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            profiles: HashMap::new(),
            should_fail: true,
        }
    }

    pub fn with_profile(mut self, id: Uuid, email: &str, role: &str) -> Self {
        self.profiles.insert(
            id,
            Profile {
                id,
                email: email.to_string(),
                role: role.to_string(),
            },
        );
        self
    }
}

#[async_trait]
impl ProfileStore for MockProfileStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, ShellError> {
        if self.should_fail {
            return Err(ShellError::SessionUnresolvable(
                "Mock Profile Store Error: Simulation requested".to_string(),
            ));
        }
        Ok(self.profiles.get(&id).cloned())
    }
}
