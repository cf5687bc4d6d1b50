//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    api::{ADMIN_LOGIN_PATH, DASHBOARD_PATH, LIBRARIAN_HOME_PATH, PROFILE_PATH},
    error::{AppError, AppResult},
    models::user::{RegisterRequest, Role, Session, UpdateProfile, User, UserOverview},
    repository::Repository,
    services::sessions::SessionStore,
};

/// Where the member login path sends an account, decided before anything else
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginRouting {
    /// Admin accounts never authenticate here
    RejectAdmin,
    /// Librarians land on their dashboard
    LibrarianDashboard,
    /// Everyone else lands on their profile
    MemberProfile,
}

/// Role routing for the member login path. Evaluated before the password:
/// admins are turned away first, then librarians get their landing page.
pub fn route_member_login(role: Role) -> LoginRouting {
    match role {
        Role::Admin => LoginRouting::RejectAdmin,
        Role::Librarian => LoginRouting::LibrarianDashboard,
        Role::Member => LoginRouting::MemberProfile,
    }
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    sessions: SessionStore,
}

impl AuthService {
    pub fn new(repository: Repository, sessions: SessionStore) -> Self {
        Self {
            repository,
            sessions,
        }
    }

    /// Register a new account. Self-registration always yields a member.
    pub async fn register(
        &self,
        request: RegisterRequest,
        profile_image: Option<Vec<u8>>,
    ) -> AppResult<User> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let email = request.email.trim().to_lowercase();
        let name = request.name.trim();

        if self.repository.users.email_exists(&email, None).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let password_hash = self.hash_password(&request.password)?;

        self.repository
            .users
            .create(
                name,
                &email,
                &password_hash,
                Role::Member,
                profile_image.as_deref(),
            )
            .await
    }

    /// Authenticate on the member login path. Returns the session and the
    /// landing page for the account's role.
    pub async fn member_login(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<(Session, &'static str)> {
        let user = self
            .repository
            .users
            .get_by_email(email.trim())
            .await?
            .ok_or_else(|| {
                AppError::Authentication("No account found with this email".to_string())
            })?;

        let landing = match route_member_login(user.role) {
            LoginRouting::RejectAdmin => {
                return Err(AppError::Authorization {
                    message: "Administrator accounts must log in through the admin login page"
                        .to_string(),
                    landing: ADMIN_LOGIN_PATH,
                });
            }
            LoginRouting::LibrarianDashboard => LIBRARIAN_HOME_PATH,
            LoginRouting::MemberProfile => PROFILE_PATH,
        };

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Incorrect password".to_string()));
        }

        let session = self.sessions.open(&user).await;
        Ok((session, landing))
    }

    /// Authenticate on the admin login path. The password is checked first,
    /// then any non-admin account is turned away without a session.
    pub async fn admin_login(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<(Session, &'static str)> {
        let user = self
            .repository
            .users
            .get_by_email(email.trim())
            .await?
            .ok_or_else(|| {
                AppError::Authentication("No account found with this email".to_string())
            })?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Incorrect password".to_string()));
        }

        if user.role != Role::Admin {
            return Err(AppError::Authorization {
                message: "Access denied. Admins only.".to_string(),
                landing: ADMIN_LOGIN_PATH,
            });
        }

        let session = self.sessions.open(&user).await;
        Ok((session, DASHBOARD_PATH))
    }

    /// Destroy the session (logout)
    pub async fn logout(&self, token: &str) {
        self.sessions.close(token).await;
    }

    /// Update the caller's own profile. Changing the password requires the
    /// current one; changing the email re-checks uniqueness.
    pub async fn update_profile(
        &self,
        user_id: i32,
        profile: UpdateProfile,
        profile_image: Option<Vec<u8>>,
    ) -> AppResult<User> {
        profile
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let user = self.repository.users.get_by_id(user_id).await?;

        let password_hash = if let Some(ref new_password) = profile.new_password {
            let current = profile.current_password.as_ref().ok_or_else(|| {
                AppError::Validation("Current password required to change password".to_string())
            })?;

            if !self.verify_password(&user, current)? {
                return Err(AppError::Authentication(
                    "Current password is incorrect".to_string(),
                ));
            }

            Some(self.hash_password(new_password)?)
        } else {
            None
        };

        let email = profile.email.as_ref().map(|e| e.trim().to_lowercase());

        let updated = self
            .repository
            .users
            .update_profile(
                user_id,
                profile.name.as_deref().map(str::trim),
                email.as_deref(),
                password_hash.as_deref(),
                profile_image.as_deref(),
            )
            .await?;

        self.sessions.refresh_user(&updated).await;
        Ok(updated)
    }

    /// Delete the caller's own account and destroy their sessions
    pub async fn delete_account(&self, user_id: i32) -> AppResult<()> {
        self.repository.users.delete(user_id).await?;
        self.sessions.close_for_user(user_id).await;
        Ok(())
    }

    /// Admin dashboard user listing
    pub async fn search_users(&self, search: Option<&str>) -> AppResult<Vec<UserOverview>> {
        self.repository.users.search(search).await
    }

    /// Assign a role to a user (admin only). Unknown role names are a
    /// validation error, never written.
    pub async fn update_role(&self, user_id: i32, role: &str) -> AppResult<User> {
        let role: Role = role
            .parse()
            .map_err(|_| AppError::Validation("Invalid role".to_string()))?;

        let updated = self.repository.users.update_role(user_id, role).await?;
        self.sessions.refresh_user(&updated).await;
        Ok(updated)
    }

    /// Delete a user as an admin. Self-deletion is rejected.
    pub async fn delete_user(&self, admin: &Session, user_id: i32) -> AppResult<()> {
        if admin.user_id == user_id {
            return Err(AppError::BusinessRule(
                "You cannot delete your own account".to_string(),
            ));
        }

        self.repository.users.delete(user_id).await?;
        self.sessions.close_for_user(user_id).await;
        Ok(())
    }

    /// Get a user's profile image, if one is stored
    pub async fn get_profile_image(&self, user_id: i32) -> AppResult<Option<Vec<u8>>> {
        self.repository.users.get_profile_image(user_id).await
    }

    /// Verify a password against the stored argon2 hash
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_is_rejected_before_anything_else() {
        assert_eq!(route_member_login(Role::Admin), LoginRouting::RejectAdmin);
    }

    #[test]
    fn librarian_lands_on_dashboard() {
        assert_eq!(
            route_member_login(Role::Librarian),
            LoginRouting::LibrarianDashboard
        );
    }

    #[test]
    fn member_lands_on_profile() {
        assert_eq!(route_member_login(Role::Member), LoginRouting::MemberProfile);
    }
}
