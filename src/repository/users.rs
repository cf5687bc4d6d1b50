//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{Role, User, UserOverview},
};

const USER_COLUMNS: &str = "user_id, name, email, password_hash, role, created_at";

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, user_id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE user_id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))
    }

    /// Get user by email (case-insensitive, primary authentication lookup)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check if email already exists (case-insensitive)
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND user_id != $2)",
            )
            .bind(email)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create a new user. The duplicate-email check and the insert share one
    /// transaction so a rejected registration never leaves a row behind.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        profile_image: Option<&[u8]>,
    ) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&mut *tx)
                .await?;

        if exists {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let user_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO users (name, email, password_hash, role, profile_image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING user_id
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(profile_image)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_by_id(user_id).await
    }

    /// Search users for the admin dashboard. A numeric search term also
    /// matches the user id.
    pub async fn search(&self, search: Option<&str>) -> AppResult<Vec<UserOverview>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());

        let users = match search {
            None => {
                sqlx::query_as::<_, UserOverview>(
                    "SELECT user_id, name, email, role FROM users ORDER BY name",
                )
                .fetch_all(&self.pool)
                .await?
            }
            Some(term) => {
                let pattern = format!("%{}%", term.to_lowercase());
                if let Ok(id) = term.parse::<i32>() {
                    sqlx::query_as::<_, UserOverview>(
                        r#"
                        SELECT user_id, name, email, role
                        FROM users
                        WHERE user_id = $1
                           OR LOWER(name) LIKE $2
                           OR LOWER(email) LIKE $2
                        ORDER BY name
                        "#,
                    )
                    .bind(id)
                    .bind(&pattern)
                    .fetch_all(&self.pool)
                    .await?
                } else {
                    sqlx::query_as::<_, UserOverview>(
                        r#"
                        SELECT user_id, name, email, role
                        FROM users
                        WHERE LOWER(name) LIKE $1
                           OR LOWER(email) LIKE $1
                        ORDER BY name
                        "#,
                    )
                    .bind(&pattern)
                    .fetch_all(&self.pool)
                    .await?
                }
            }
        };

        Ok(users)
    }

    /// Update a user's role
    pub async fn update_role(&self, user_id: i32, role: Role) -> AppResult<User> {
        let result = sqlx::query("UPDATE users SET role = $1 WHERE user_id = $2")
            .bind(role)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                user_id
            )));
        }

        self.get_by_id(user_id).await
    }

    /// Delete a user and their library entries in one transaction
    pub async fn delete(&self, user_id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_library WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                user_id
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Update a user's own profile. Only the given fields are touched; the
    /// email uniqueness check and the update share one transaction.
    pub async fn update_profile(
        &self,
        user_id: i32,
        name: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
        profile_image: Option<&[u8]>,
    ) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        if let Some(email) = email {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND user_id != $2)",
            )
            .bind(email)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

            if exists {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }

        let mut sets = Vec::new();
        let mut param_idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, param_idx));
                    param_idx += 1;
                }
            };
        }

        add_field!(name, "name");
        add_field!(email, "email");
        add_field!(password_hash, "password_hash");
        add_field!(profile_image, "profile_image");

        if !sets.is_empty() {
            let query = format!(
                "UPDATE users SET {} WHERE user_id = ${}",
                sets.join(", "),
                param_idx
            );

            let mut builder = sqlx::query(&query);

            macro_rules! bind_field {
                ($field:expr) => {
                    if let Some(val) = $field {
                        builder = builder.bind(val);
                    }
                };
            }

            bind_field!(name);
            bind_field!(email);
            bind_field!(password_hash);
            bind_field!(profile_image);

            builder.bind(user_id).execute(&mut *tx).await?;
        }

        tx.commit().await?;

        self.get_by_id(user_id).await
    }

    /// Get a user's stored profile image bytes, if any
    pub async fn get_profile_image(&self, user_id: i32) -> AppResult<Option<Vec<u8>>> {
        let row: Option<(Option<Vec<u8>>,)> =
            sqlx::query_as("SELECT profile_image FROM users WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.and_then(|(image,)| image))
    }
}
