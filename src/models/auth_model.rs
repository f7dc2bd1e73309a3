use crate::models::member_model::{Member, MemberStore};
use crate::types::StoreError;
use async_trait::async_trait;
use axum_login::{AuthUser, AuthnBackend, AuthzBackend, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

impl AuthUser for Member {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.username.clone()
    }

    // changing the password invalidates existing sessions
    fn session_auth_hash(&self) -> &[u8] {
        self.password.as_bytes()
    }
}

#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl From<LoginRequest> for Credentials {
    fn from(request: LoginRequest) -> Self {
        Self {
            username: request.username,
            password: request.password,
        }
    }
}

/// A granted role such as `ROLE_ADMIN`
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Permission {
    pub name: String,
}

impl From<&str> for Permission {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// Authentication backend over whichever member store the application runs with
#[derive(Clone)]
pub struct Backend {
    members: Arc<dyn MemberStore>,
}

impl Backend {
    pub fn new(members: Arc<dyn MemberStore>) -> Self {
        Self { members }
    }
}

#[async_trait]
impl AuthnBackend for Backend {
    type User = Member;
    type Credentials = Credentials;
    type Error = StoreError;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        let member = self.members.find(&creds.username).await?;

        if let Some(member) = member {
            if let Ok(is_valid) = bcrypt::verify(&creds.password, &member.password) {
                if is_valid {
                    return Ok(Some(member));
                }
            }
        }
        Ok(None)
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        self.members.find(user_id).await
    }
}

#[async_trait]
impl AuthzBackend for Backend {
    type Permission = Permission;

    async fn get_user_permissions(
        &self,
        user: &Self::User,
    ) -> Result<HashSet<Self::Permission>, Self::Error> {
        Ok(user
            .auth_list
            .iter()
            .map(|auth| Permission::from(auth.as_str()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::member_model::{NewMember, ROLE_ADMIN, ROLE_MEMBER};
    use crate::models::memory_store::MemoryMemberStore;

    async fn backend() -> Backend {
        let store = Arc::new(MemoryMemberStore::new());
        store
            .insert(NewMember {
                username: "alice".into(),
                password_hash: bcrypt::hash("secret", 4).unwrap(),
                email: "alice@example.com".into(),
                auth_list: vec![ROLE_MEMBER.into(), ROLE_ADMIN.into()],
            })
            .await
            .unwrap();
        Backend::new(store)
    }

    #[tokio::test]
    async fn test_authenticate() {
        let backend = backend().await;
        let creds = |password: &str| Credentials {
            username: "alice".into(),
            password: password.into(),
        };

        assert!(backend.authenticate(creds("secret")).await.unwrap().is_some());
        assert!(backend.authenticate(creds("wrong")).await.unwrap().is_none());
        assert!(
            backend
                .authenticate(Credentials {
                    username: "nobody".into(),
                    password: "secret".into(),
                })
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_permissions_come_from_auth_list() {
        let backend = backend().await;
        let member = backend.get_user(&"alice".to_string()).await.unwrap().unwrap();
        let permissions = backend.get_user_permissions(&member).await.unwrap();
        assert!(permissions.contains(&Permission::from(ROLE_ADMIN)));
        assert!(permissions.contains(&Permission::from(ROLE_MEMBER)));
    }
}
