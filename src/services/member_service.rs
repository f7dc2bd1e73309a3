use crate::models::member_model::{
    ChangePasswordRequest, Member, MemberErr, MemberJoinRequest, MemberStore, MemberUpdateRequest,
    NewMember, ROLE_ADMIN, ROLE_MEMBER,
};
use crate::types::StoreError;
use std::path::PathBuf;
use std::sync::Arc;

const UNKNOWN_AVATAR: &str = "unknown.png";

/// Member account rules: unique usernames, bcrypt hashes, self-only profile changes
#[derive(Clone)]
pub struct MemberService {
    store: Arc<dyn MemberStore>,
    avatar_dir: PathBuf,
    bcrypt_cost: u32,
}

impl MemberService {
    pub fn new(store: Arc<dyn MemberStore>, avatar_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            avatar_dir: avatar_dir.into(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// True when the username is already taken
    pub async fn check_duplicate(&self, username: &str) -> Result<bool, MemberErr> {
        Ok(self.store.find(username).await?.is_some())
    }

    /// Registers a new member with the `ROLE_MEMBER` role
    ///
    /// # Errors
    /// - `InvalidInput` for a malformed username or a blank password
    /// - `DuplicateUsername` when the username is taken
    pub async fn join(&self, form: MemberJoinRequest) -> Result<Member, MemberErr> {
        self.register(form, vec![ROLE_MEMBER.to_string()]).await
    }

    /// Creates the configured admin account unless a member with that name already exists
    pub async fn ensure_admin(&self, form: MemberJoinRequest) -> Result<(), MemberErr> {
        if self.check_duplicate(&form.username).await? {
            return Ok(());
        }

        let username = form.username.clone();
        self.register(form, vec![ROLE_MEMBER.to_string(), ROLE_ADMIN.to_string()])
            .await?;
        tracing::info!("Admin member created: {}", username);
        Ok(())
    }

    async fn register(&self, form: MemberJoinRequest, auth_list: Vec<String>) -> Result<Member, MemberErr> {
        if !valid_username(&form.username) {
            return Err(MemberErr::InvalidInput(format!(
                "username '{}' may only contain letters, digits, '-' and '_'",
                form.username
            )));
        }
        if form.password.is_empty() {
            return Err(MemberErr::InvalidInput("password must not be empty".to_string()));
        }
        if self.check_duplicate(&form.username).await? {
            return Err(MemberErr::DuplicateUsername(form.username));
        }

        let password_hash = bcrypt::hash(&form.password, self.bcrypt_cost)?;
        let member = self
            .store
            .insert(NewMember {
                username: form.username,
                password_hash,
                email: form.email,
                auth_list,
            })
            .await
            .map_err(|e| match e {
                // lost a race with another join for the same name
                StoreError::Duplicate(username) => MemberErr::DuplicateUsername(username),
                other => MemberErr::Store(other),
            })?;

        tracing::info!("Member joined: {}", member.username);
        Ok(member)
    }

    pub async fn get(&self, username: &str) -> Result<Member, MemberErr> {
        self.store
            .find(username)
            .await?
            .ok_or_else(|| MemberErr::DoesNotExist(username.to_string()))
    }

    /// Updates the member's profile after confirming the current password
    ///
    /// # Errors
    /// - `NotOwner` when `actor` is someone else
    /// - `DoesNotExist` for an unknown member
    /// - `PasswordMismatch` when the confirmation password is wrong
    pub async fn update(
        &self,
        username: &str,
        actor: &str,
        form: MemberUpdateRequest,
    ) -> Result<Member, MemberErr> {
        ensure_self(username, actor)?;
        let member = self.get(username).await?;
        verify(&form.password, &member)?;

        if !self.store.update_email(username, &form.email).await? {
            return Err(MemberErr::DoesNotExist(username.to_string()));
        }

        tracing::info!("Member updated: {}", username);
        self.get(username).await
    }

    /// Replaces the password after checking the old one
    pub async fn change_password(
        &self,
        username: &str,
        actor: &str,
        form: ChangePasswordRequest,
    ) -> Result<(), MemberErr> {
        ensure_self(username, actor)?;
        let member = self.get(username).await?;
        verify(&form.old_password, &member)?;
        if form.new_password.is_empty() {
            return Err(MemberErr::InvalidInput("password must not be empty".to_string()));
        }

        let password_hash = bcrypt::hash(&form.new_password, self.bcrypt_cost)?;
        if !self.store.update_password(username, &password_hash).await? {
            return Err(MemberErr::DoesNotExist(username.to_string()));
        }

        tracing::info!("Password changed for {}", username);
        Ok(())
    }

    /// Where the member's avatar lives, or the placeholder image when there is none
    pub async fn avatar_path(&self, username: &str) -> PathBuf {
        if valid_username(username) {
            let path = self.avatar_dir.join(format!("{username}.png"));
            if tokio::fs::metadata(&path).await.is_ok_and(|meta| meta.is_file()) {
                return path;
            }
        }
        self.avatar_dir.join(UNKNOWN_AVATAR)
    }
}

fn ensure_self(username: &str, actor: &str) -> Result<(), MemberErr> {
    if username != actor {
        return Err(MemberErr::NotOwner(actor.to_string(), username.to_string()));
    }
    Ok(())
}

fn verify(password: &str, member: &Member) -> Result<(), MemberErr> {
    match bcrypt::verify(password, &member.password) {
        Ok(true) => Ok(()),
        Ok(false) => Err(MemberErr::PasswordMismatch),
        Err(e) => Err(MemberErr::Hash(e)),
    }
}

/// Usernames end up in file names, so keep them to a safe alphabet
fn valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
