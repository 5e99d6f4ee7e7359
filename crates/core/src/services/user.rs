//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use foodgram_common::{AppError, AppResult, IdGenerator, error::reason};
use foodgram_db::{
    entities::user,
    repositories::{FollowRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::projection::{Listing, PageRequest, RegisteredUser, UserView};

/// Usernames that would shadow fixed routes.
const RESERVED_USERNAMES: &[&str] = &["me"];

/// Input for creating a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(email, length(max = 254))]
    pub email: String,

    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(length(min = 1, max = 150))]
    pub first_name: String,

    #[validate(length(min = 1, max = 150))]
    pub last_name: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Input for changing a password.
#[derive(Debug, Deserialize, Validate)]
pub struct SetPasswordInput {
    pub current_password: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// User service for accounts, credentials and profiles.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    follow_repo: FollowRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, follow_repo: FollowRepository) -> Self {
        Self {
            user_repo,
            follow_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<RegisteredUser> {
        input.validate()?;
        validate_username(&input.username)?;

        let email = input.email.to_lowercase();

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(email),
            username: Set(input.username),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            avatar: Set(None),
            password: Set(password_hash),
            token: Set(None),
            is_admin: Set(false),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, "User registered");

        Ok(RegisteredUser::from(&user))
    }

    /// Resolve an access token to its user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Authenticate a user by email and password.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Log in with email and password, returning the user's access token.
    ///
    /// An existing token is reused so other sessions stay valid.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        let user = self.authenticate(email, password).await?;

        match user.token {
            Some(token) => Ok(token),
            None => self.regenerate_token(&user.id).await,
        }
    }

    /// Regenerate a user's access token, invalidating the old one.
    pub async fn regenerate_token(&self, user_id: &str) -> AppResult<String> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let new_token = self.id_gen.generate_token();

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(new_token.clone()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await?;

        Ok(new_token)
    }

    /// Change a user's password after checking the current one.
    pub async fn set_password(&self, user: &user::Model, input: SetPasswordInput) -> AppResult<()> {
        input.validate()?;

        if !verify_password(&input.current_password, &user.password)? {
            return Err(AppError::validation("current_password", reason::INVALID));
        }

        let mut active: user::ActiveModel = user.clone().into();
        active.password = Set(hash_password(&input.new_password)?);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await?;
        Ok(())
    }

    /// Set (`Some`) or clear (`None`) the user's avatar reference.
    pub async fn set_avatar(
        &self,
        user: &user::Model,
        avatar: Option<String>,
    ) -> AppResult<Option<String>> {
        if avatar.as_deref().is_some_and(str::is_empty) {
            return Err(AppError::validation("avatar", reason::REQUIRED));
        }

        let mut active: user::ActiveModel = user.clone().into();
        active.avatar = Set(avatar);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.user_repo.update(active).await?;
        Ok(updated.avatar)
    }

    /// Get a user's public profile as seen by `viewer`.
    pub async fn get(&self, user_id: &str, viewer: Option<&str>) -> AppResult<UserView> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let is_subscribed = match viewer {
            Some(viewer_id) if viewer_id != user.id => {
                self.follow_repo.is_following(viewer_id, &user.id).await?
            }
            _ => false,
        };

        Ok(UserView::new(&user, is_subscribed))
    }

    /// List users as seen by `viewer`.
    pub async fn list(
        &self,
        page: PageRequest,
        viewer: Option<&str>,
    ) -> AppResult<Listing<UserView>> {
        let count = self.user_repo.count().await?;
        let users = self.user_repo.list(page.limit, page.offset()).await?;

        let following = match viewer {
            Some(viewer_id) => {
                let ids: Vec<String> = users.iter().map(|u| u.id.clone()).collect();
                self.follow_repo.following_among(viewer_id, &ids).await?
            }
            None => Default::default(),
        };

        let results = users
            .iter()
            .map(|u| UserView::new(u, following.contains(&u.id)))
            .collect();

        Ok(Listing::new(count, results))
    }
}

/// Letters, digits and `.@+-_` only; reserved route names are refused.
fn validate_username(username: &str) -> AppResult<()> {
    let allowed = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'));

    if !allowed || RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
        return Err(AppError::validation("username", reason::INVALID));
    }

    Ok(())
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
