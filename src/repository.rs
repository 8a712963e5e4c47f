use crate::error::RepoError;
use crate::models::{JobOpening, Resource, Stat, TeamMember, Testimonial};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    PgPool, Postgres,
    postgres::{PgArguments, PgRow},
    query::QueryAs,
};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// ResourceStore Trait
///
/// The persistence contract for one resource type. Every operation is a single-row (or
/// select-many) statement: there are no transactions and concurrent writes to the same
/// id are not coordinated, so the later write wins.
///
/// **Send + Sync + async_trait** are required so the store can sit behind an
/// `Arc<dyn Repository>` shared across Axum's task boundaries.
#[async_trait]
pub trait ResourceStore<R: Resource>: Send + Sync {
    /// All records ordered by `order` ascending. Ties have no guaranteed order.
    async fn list(&self) -> Result<Vec<R>, RepoError>;
    async fn create(&self, input: R::Create) -> Result<R, RepoError>;
    /// Overwrites the provided fields. Fails with `NotFound` when no row has `id`.
    async fn update(&self, id: Uuid, patch: R::Patch) -> Result<R, RepoError>;
    /// Removes the row. Fails with `NotFound` when no row has `id`.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Repository
///
/// The full persistence layer: one store per managed resource. Blanket-implemented for
/// anything that stores all four.
pub trait Repository:
    ResourceStore<TeamMember>
    + ResourceStore<Stat>
    + ResourceStore<Testimonial>
    + ResourceStore<JobOpening>
    + Send
    + Sync
{
}

impl<T> Repository for T where
    T: ResourceStore<TeamMember>
        + ResourceStore<Stat>
        + ResourceStore<Testimonial>
        + ResourceStore<JobOpening>
        + Send
        + Sync
{
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

// --- Postgres ---

type PgQueryAs<R> = QueryAs<'static, Postgres, R, PgArguments>;

/// PgResource
///
/// Table mapping for a resource stored in Postgres. `order` and `type` are SQL keywords and
/// are always quoted.
pub trait PgResource: Resource + for<'r> sqlx::FromRow<'r, PgRow> {
    const TABLE: &'static str;
    /// Column list used in SELECT and RETURNING clauses.
    const COLUMNS: &'static str;

    /// INSERT of a fully built record (defaults already applied).
    fn insert_query(record: Self) -> PgQueryAs<Self>;

    /// UPDATE that COALESCEs every patch field with the stored value. Binds `id` as `$1`.
    fn update_query(id: Uuid, patch: Self::Patch) -> PgQueryAs<Self>;
}

/// PostgresRepository
///
/// The production implementation of `Repository`, backed by a PostgreSQL pool.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl<R: PgResource> ResourceStore<R> for PostgresRepository {
    async fn list(&self) -> Result<Vec<R>, RepoError> {
        let sql = format!(
            r#"SELECT {} FROM {} ORDER BY "order" ASC"#,
            R::COLUMNS,
            R::TABLE
        );
        let rows = sqlx::query_as::<_, R>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn create(&self, input: R::Create) -> Result<R, RepoError> {
        let record = R::build(Uuid::new_v4(), input, Utc::now());
        let created = R::insert_query(record).fetch_one(&self.pool).await?;
        Ok(created)
    }

    async fn update(&self, id: Uuid, patch: R::Patch) -> Result<R, RepoError> {
        R::update_query(id, patch)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepoError::NotFound {
                resource: R::SINGULAR,
                id,
            })
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", R::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound {
                resource: R::SINGULAR,
                id,
            });
        }
        Ok(())
    }
}

impl PgResource for TeamMember {
    const TABLE: &'static str = "team_members";
    const COLUMNS: &'static str =
        r#"id, name, role, description, image, "order", active, created_at, updated_at"#;

    fn insert_query(record: Self) -> PgQueryAs<Self> {
        sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (id, name, role, description, image, "order", active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, role, description, image, "order", active, created_at, updated_at
            "#,
        )
        .bind(record.id)
        .bind(record.name)
        .bind(record.role)
        .bind(record.description)
        .bind(record.image)
        .bind(record.order)
        .bind(record.active)
        .bind(record.created_at)
        .bind(record.updated_at)
    }

    fn update_query(id: Uuid, patch: Self::Patch) -> PgQueryAs<Self> {
        sqlx::query_as::<_, TeamMember>(
            r#"
            UPDATE team_members
            SET name = COALESCE($2, name),
                role = COALESCE($3, role),
                description = COALESCE($4, description),
                image = COALESCE($5, image),
                "order" = COALESCE($6, "order"),
                active = COALESCE($7, active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, role, description, image, "order", active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.role)
        .bind(patch.description)
        .bind(patch.image)
        .bind(patch.order)
        .bind(patch.active)
    }
}

impl PgResource for Stat {
    const TABLE: &'static str = "stats";
    const COLUMNS: &'static str = r#"id, value, label, icon, "order", created_at, updated_at"#;

    fn insert_query(record: Self) -> PgQueryAs<Self> {
        sqlx::query_as::<_, Stat>(
            r#"
            INSERT INTO stats (id, value, label, icon, "order", created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, value, label, icon, "order", created_at, updated_at
            "#,
        )
        .bind(record.id)
        .bind(record.value)
        .bind(record.label)
        .bind(record.icon)
        .bind(record.order)
        .bind(record.created_at)
        .bind(record.updated_at)
    }

    fn update_query(id: Uuid, patch: Self::Patch) -> PgQueryAs<Self> {
        sqlx::query_as::<_, Stat>(
            r#"
            UPDATE stats
            SET value = COALESCE($2, value),
                label = COALESCE($3, label),
                icon = COALESCE($4, icon),
                "order" = COALESCE($5, "order"),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, value, label, icon, "order", created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.value)
        .bind(patch.label)
        .bind(patch.icon)
        .bind(patch.order)
    }
}

impl PgResource for Testimonial {
    const TABLE: &'static str = "testimonials";
    const COLUMNS: &'static str =
        r#"id, name, role, company, content, rating, "order", created_at, updated_at"#;

    fn insert_query(record: Self) -> PgQueryAs<Self> {
        sqlx::query_as::<_, Testimonial>(
            r#"
            INSERT INTO testimonials (id, name, role, company, content, rating, "order", created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, role, company, content, rating, "order", created_at, updated_at
            "#,
        )
        .bind(record.id)
        .bind(record.name)
        .bind(record.role)
        .bind(record.company)
        .bind(record.content)
        .bind(record.rating)
        .bind(record.order)
        .bind(record.created_at)
        .bind(record.updated_at)
    }

    fn update_query(id: Uuid, patch: Self::Patch) -> PgQueryAs<Self> {
        sqlx::query_as::<_, Testimonial>(
            r#"
            UPDATE testimonials
            SET name = COALESCE($2, name),
                role = COALESCE($3, role),
                company = COALESCE($4, company),
                content = COALESCE($5, content),
                rating = COALESCE($6, rating),
                "order" = COALESCE($7, "order"),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, role, company, content, rating, "order", created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.role)
        .bind(patch.company)
        .bind(patch.content)
        .bind(patch.rating)
        .bind(patch.order)
    }
}

impl PgResource for JobOpening {
    const TABLE: &'static str = "job_openings";
    const COLUMNS: &'static str = r#"id, title, department, location, "type", description, requirements, active, "order", created_at, updated_at"#;

    fn insert_query(record: Self) -> PgQueryAs<Self> {
        sqlx::query_as::<_, JobOpening>(
            r#"
            INSERT INTO job_openings (id, title, department, location, "type", description, requirements, active, "order", created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, title, department, location, "type", description, requirements, active, "order", created_at, updated_at
            "#,
        )
        .bind(record.id)
        .bind(record.title)
        .bind(record.department)
        .bind(record.location)
        .bind(record.job_type)
        .bind(record.description)
        .bind(record.requirements)
        .bind(record.active)
        .bind(record.order)
        .bind(record.created_at)
        .bind(record.updated_at)
    }

    fn update_query(id: Uuid, patch: Self::Patch) -> PgQueryAs<Self> {
        sqlx::query_as::<_, JobOpening>(
            r#"
            UPDATE job_openings
            SET title = COALESCE($2, title),
                department = COALESCE($3, department),
                location = COALESCE($4, location),
                "type" = COALESCE($5, "type"),
                description = COALESCE($6, description),
                requirements = COALESCE($7, requirements),
                active = COALESCE($8, active),
                "order" = COALESCE($9, "order"),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, department, location, "type", description, requirements, active, "order", created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.department)
        .bind(patch.location)
        .bind(patch.job_type)
        .bind(patch.description)
        .bind(patch.requirements)
        .bind(patch.active)
        .bind(patch.order)
    }
}

// --- In-Memory ---

/// InMemoryRepository
///
/// A `Repository` that keeps each table as a `Vec` behind a lock. Used by the integration
/// tests to drive the full router without Postgres. `new_failing` makes every operation
/// fail, which exercises the `InternalFailure` path.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
    should_fail: bool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    fn with_table<R, T>(&self, f: impl FnOnce(&mut Vec<R>) -> T) -> Result<T, RepoError>
    where
        R: Resource,
    {
        if self.should_fail {
            return Err(RepoError::Unavailable);
        }
        let mut tables = self.tables.write().map_err(|_| RepoError::Unavailable)?;
        let table = tables
            .entry(TypeId::of::<R>())
            .or_insert_with(|| Box::new(Vec::<R>::new()) as Box<dyn Any + Send + Sync>);
        let rows = table
            .downcast_mut::<Vec<R>>()
            .ok_or(RepoError::Unavailable)?;
        Ok(f(rows))
    }
}

#[async_trait]
impl<R: Resource> ResourceStore<R> for InMemoryRepository {
    async fn list(&self) -> Result<Vec<R>, RepoError> {
        let mut rows = self.with_table(|rows: &mut Vec<R>| rows.clone())?;
        rows.sort_by_key(|row| row.order());
        Ok(rows)
    }

    async fn create(&self, input: R::Create) -> Result<R, RepoError> {
        let record = R::build(Uuid::new_v4(), input, Utc::now());
        self.with_table(|rows: &mut Vec<R>| {
            rows.push(record.clone());
            record
        })
    }

    async fn update(&self, id: Uuid, patch: R::Patch) -> Result<R, RepoError> {
        self.with_table(|rows: &mut Vec<R>| {
            let row = rows.iter_mut().find(|row| row.id() == id)?;
            row.apply(patch, Utc::now());
            Some(row.clone())
        })?
        .ok_or(RepoError::NotFound {
            resource: R::SINGULAR,
            id,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let removed = self.with_table(|rows: &mut Vec<R>| {
            let before = rows.len();
            rows.retain(|row| row.id() != id);
            before != rows.len()
        })?;
        if !removed {
            return Err(RepoError::NotFound {
                resource: R::SINGULAR,
                id,
            });
        }
        Ok(())
    }
}
