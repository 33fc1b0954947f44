//! StaticAuthSession - 固定ユーザーでログイン済みの認証セッション

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::domain::AuthError;
use crate::ports::{AuthSession, AuthUser};

pub struct StaticAuthSession {
    user: AuthUser,
    signed_in: AtomicBool,
}

impl StaticAuthSession {
    pub fn new(user: AuthUser) -> Self {
        Self {
            user,
            signed_in: AtomicBool::new(true),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AuthSession for StaticAuthSession {
    fn current_user(&self) -> AuthUser {
        self.user.clone()
    }

    async fn logout(&self) -> Result<(), AuthError> {
        if !self.signed_in.swap(false, Ordering::Relaxed) {
            return Err(AuthError(format!("{} is not signed in", self.user.id)));
        }
        Ok(())
    }
}
