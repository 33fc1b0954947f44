//! AuthSession port - 認証協調者
//!
//! ログイン処理そのものは範囲外。画面が必要とするのは
//! 「今のユーザーは誰か」と「ログアウト」だけ。

use async_trait::async_trait;

use crate::domain::{AuthError, UserId};

/// AuthUser は認証済みユーザーの最小情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub display_name: String,
    pub photo_url: String,
}

#[async_trait]
pub trait AuthSession: Send + Sync {
    fn current_user(&self) -> AuthUser;

    async fn logout(&self) -> Result<(), AuthError>;
}
