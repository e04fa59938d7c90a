//! User account operations

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::User;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let created_at: String = row.get(5)?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        avatar: row.get(3)?,
        currency: row.get(4)?,
        created_at: parse_datetime(&created_at),
    })
}

const USER_COLUMNS: &str = "id, email, name, avatar, currency, created_at";

impl Database {
    /// Create a user with a hashed password and seed their default categories
    ///
    /// The avatar is derived from the first letter of the name, matching
    /// what the onboarding UI displays before a picture is uploaded.
    pub fn create_user(
        &self,
        email: &str,
        name: &str,
        password: &str,
        currency: Option<&str>,
    ) -> Result<User> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::InvalidInput("Invalid email address".into()));
        }
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("Name is required".into()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(Error::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE email = ?",
                params![email],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(Error::Conflict("User already exists".into()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::PasswordHash(e.to_string()))?
            .to_string();

        let avatar: String = name
            .trim()
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_default();

        conn.execute(
            r#"
            INSERT INTO users (email, name, password_hash, avatar, currency)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                email,
                name.trim(),
                password_hash,
                avatar,
                currency.unwrap_or("USD"),
            ],
        )?;
        let user_id = conn.last_insert_rowid();
        drop(conn);

        self.seed_default_categories(user_id)?;

        self.get_user(user_id)?
            .ok_or_else(|| Error::NotFound("User not found after creation".into()))
    }

    /// Get a user by id
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get a user by email (normalized to lowercase)
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                params![email.trim().to_lowercase()],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Verify a login attempt, returning the user on success
    ///
    /// Unknown email and wrong password both map to `Unauthorized` so the
    /// response does not reveal which accounts exist.
    pub fn verify_password(&self, email: &str, password: &str) -> Result<User> {
        let conn = self.conn()?;
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT id, password_hash FROM users WHERE email = ?",
                params![email.trim().to_lowercase()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        drop(conn);

        let (user_id, stored_hash) =
            row.ok_or_else(|| Error::Unauthorized("Invalid credentials".into()))?;

        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|e| Error::PasswordHash(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| Error::Unauthorized("Invalid credentials".into()))?;

        self.get_user(user_id)?
            .ok_or_else(|| Error::Unauthorized("Invalid credentials".into()))
    }

    /// Delete a user; cascades to their categories, expenses, budgets and plan
    pub fn delete_user(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM users WHERE id = ?", params![id])?;
        if affected == 0 {
            return Err(Error::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    /// Count users (for the CLI status command)
    pub fn count_users(&self) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
    }
}
