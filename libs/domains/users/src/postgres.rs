//! PostgreSQL implementations of the user and group repositories.

use async_trait::async_trait;
use sea_orm::{DbBackend, FromQueryResult, Statement};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Group, User};
use crate::repository::{GroupRepository, UserRepository};

/// PostgreSQL implementation of UserRepository using SeaORM
#[derive(Clone)]
pub struct PostgresUserRepository {
    db: sea_orm::DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Helper struct for deserializing user rows from the database
#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    groups: Vec<String>, // PostgreSQL text array
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            groups: row.groups,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn map_unique_violation(e: sea_orm::DbErr, email: &str) -> UserError {
    let err_str = e.to_string();
    if err_str.contains("duplicate key") || err_str.contains("unique constraint") {
        UserError::DuplicateEmail(email.to_string())
    } else {
        UserError::Database(e)
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let sql = r#"
            INSERT INTO users (id, email, name, password_hash, groups, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.email.clone().into(),
                user.name.clone().into(),
                user.password_hash.clone().into(),
                user.groups.clone().into(),
                user.is_active.into(),
                user.created_at.into(),
                user.updated_at.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, &user.email))?
            .ok_or_else(|| UserError::Internal("Failed to create user".to_string()))?;

        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT * FROM users WHERE id = $1",
            [id.into()],
        );

        let row = UserRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT * FROM users WHERE LOWER(email) = LOWER($1)",
            [email.into()],
        );

        let row = UserRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let sql = r#"
            UPDATE users
            SET email = $2, name = $3, password_hash = $4, groups = $5,
                is_active = $6, updated_at = $7
            WHERE id = $1
            RETURNING *
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.email.clone().into(),
                user.name.clone().into(),
                user.password_hash.clone().into(),
                user.groups.clone().into(),
                user.is_active.into(),
                user.updated_at.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, &user.email))?
            .ok_or(UserError::NotFound(user.id))?;

        Ok(row.into())
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT id, email, name, password_hash, groups, is_active, created_at, updated_at FROM users WHERE LOWER(email) = LOWER($1)",
            [email.into()],
        );

        let row = UserRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.is_some())
    }

    async fn emails_in_group(&self, group: &str) -> UserResult<Vec<String>> {
        #[derive(FromQueryResult)]
        struct EmailRow {
            email: String,
        }

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT email FROM users WHERE is_active AND $1 = ANY(groups)",
            [group.into()],
        );

        let rows = EmailRow::find_by_statement(stmt).all(&self.db).await?;
        Ok(rows.into_iter().map(|r| r.email).collect())
    }
}

/// PostgreSQL implementation of GroupRepository using SeaORM
#[derive(Clone)]
pub struct PostgresGroupRepository {
    db: sea_orm::DatabaseConnection,
}

impl PostgresGroupRepository {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Helper struct for deserializing group rows from the database
#[derive(Debug, FromQueryResult)]
struct GroupRow {
    name: String,
    permissions: Vec<String>,
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Group {
            name: row.name,
            permissions: row.permissions,
        }
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn get_by_name(&self, name: &str) -> UserResult<Option<Group>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT name, permissions FROM groups WHERE name = $1",
            [name.into()],
        );

        let row = GroupRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn upsert(&self, group: Group) -> UserResult<Group> {
        let sql = r#"
            INSERT INTO groups (name, permissions)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET permissions = EXCLUDED.permissions
            RETURNING name, permissions
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [group.name.clone().into(), group.permissions.clone().into()],
        );

        let row = GroupRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .ok_or_else(|| UserError::Internal("Failed to upsert group".to_string()))?;

        Ok(row.into())
    }
}
