use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{Registration, User};
use crate::infrastructure::security::{Claims, SecurityError, issue_token};
use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};

pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repository: Arc<dyn UserRepository>, jwt_secret: String) -> Self {
        Self {
            user_repository,
            jwt_secret,
        }
    }

    /// Signs whatever the caller sends. No check against stored users.
    #[instrument(skip(self, claims))]
    pub fn issue_token(&self, claims: Value) -> Result<String> {
        issue_token(claims, &self.jwt_secret).map_err(|e| match e {
            SecurityError::InvalidClaims => DomainError::Validation(e.to_string()).into(),
            SecurityError::Jwt(e) => {
                error!(error = %e, "Failed to sign token");
                DomainError::Internal(format!("Failed to generate token: {}", e)).into()
            }
        })
    }

    #[instrument(skip(self), fields(email = %user.email))]
    pub async fn register_user(&self, mut user: User) -> Result<Registration> {
        trace!("Starting user registration");

        if self
            .user_repository
            .find_user_by_email(&user.email)
            .await?
            .is_some()
        {
            info!("User already exists, skipping insert");
            return Ok(Registration::AlreadyExists);
        }

        user.id = None;
        let id = self.user_repository.insert_user(user).await?;
        info!(user_id = %id, "User registered successfully");
        Ok(Registration::Created { id })
    }

    /// Role lookup for the token holder's own email. Unknown users are not admins.
    #[instrument(skip(self, caller), fields(email = email))]
    pub async fn is_admin(&self, caller: &Claims, email: &str) -> Result<bool> {
        if caller.email() != Some(email) {
            warn!(caller = ?caller.email(), "Admin check for another user's email");
            return Err(DomainError::Forbidden("forbidden access".to_string()).into());
        }

        let admin = self
            .user_repository
            .find_user_by_email(email)
            .await?
            .is_some_and(|user| user.is_admin());
        debug!(admin, "Admin check resolved");
        Ok(admin)
    }

    /// Loads the token holder and requires the admin role.
    #[instrument(skip(self, caller))]
    pub async fn require_admin(&self, caller: &Claims) -> Result<User> {
        let forbidden = || DomainError::Forbidden("forbidden access".to_string());

        let email = caller.email().ok_or_else(forbidden)?;
        let user = self
            .user_repository
            .find_user_by_email(email)
            .await?
            .filter(User::is_admin)
            .ok_or_else(|| {
                warn!(email, "Non-admin attempted an admin operation");
                forbidden()
            })?;
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repository.list_users().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::user_repository::InMemoryUserRepository;
    use crate::infrastructure::security::verify_token;
    use serde_json::json;

    const SECRET: &str = "unit-test-secret";

    fn service() -> (AuthService, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let service = AuthService::new(repo.clone(), SECRET.to_string());
        (service, repo)
    }

    fn claims_for(service: &AuthService, email: &str) -> Claims {
        let token = service.issue_token(json!({ "email": email })).unwrap();
        verify_token(&token, SECRET).unwrap()
    }

    #[tokio::test]
    async fn test_register_twice_inserts_once() {
        let (service, repo) = service();

        let first = service
            .register_user(User::new("dup@example.com"))
            .await
            .unwrap();
        let second = service
            .register_user(User::new("dup@example.com"))
            .await
            .unwrap();

        assert!(matches!(first, Registration::Created { .. }));
        assert_eq!(second, Registration::AlreadyExists);
        assert_eq!(repo.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_is_admin_reflects_role() {
        let (service, repo) = service();
        repo.insert_user(User::new("boss@example.com").with_role("admin"))
            .await
            .unwrap();
        repo.insert_user(User::new("member@example.com"))
            .await
            .unwrap();

        let boss = claims_for(&service, "boss@example.com");
        let member = claims_for(&service, "member@example.com");
        let ghost = claims_for(&service, "ghost@example.com");

        assert!(service.is_admin(&boss, "boss@example.com").await.unwrap());
        assert!(!service.is_admin(&member, "member@example.com").await.unwrap());
        assert!(!service.is_admin(&ghost, "ghost@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_admin_for_someone_else_is_forbidden() {
        let (service, _repo) = service();
        let caller = claims_for(&service, "me@example.com");

        let err = service
            .is_admin(&caller, "other@example.com")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_require_admin() {
        let (service, repo) = service();
        repo.insert_user(User::new("boss@example.com").with_role("admin"))
            .await
            .unwrap();
        repo.insert_user(User::new("member@example.com").with_role("member"))
            .await
            .unwrap();

        let boss = claims_for(&service, "boss@example.com");
        assert_eq!(
            service.require_admin(&boss).await.unwrap().email,
            "boss@example.com"
        );

        let member = claims_for(&service, "member@example.com");
        assert!(service.require_admin(&member).await.is_err());

        let anonymous = verify_token(&service.issue_token(json!({})).unwrap(), SECRET).unwrap();
        assert!(service.require_admin(&anonymous).await.is_err());
    }

    #[test]
    fn test_issue_token_rejects_non_object_claims() {
        let (service, _repo) = service();

        let err = service.issue_token(json!(42)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Validation(_))
        ));
    }
}
