//! Errors - エラー型と分類
//!
//! - StoreError: ドキュメントストアの操作エラー（ports の戻り値）
//! - AuthError: 認証協調者のエラー
//! - DeckError: 画面コンポーネント全体のエラー
//!
//! どのエラーも画面を落とさず、EventSink 経由で通知として表に出す。

use thiserror::Error;

use super::ids::UserId;

/// ErrorKind はエラーの運用分類
///
/// - Transient: 一時的なエラー（再試行で回復しうる）
/// - Permanent: 恒久的なエラー（再試行しても無意味）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
}

/// StoreError はドキュメントストアの操作エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// バッチの前提条件が崩れた（読んでからコミットまでに他者が書き込んだ）
    #[error("precondition failed: {0}")]
    Conflict(String),

    /// ストアが受け付けないクエリ・書き込み
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown store error: {0}")]
    Unknown(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Unavailable(_) | StoreError::Conflict(_) => ErrorKind::Transient,
            StoreError::NotFound(_)
            | StoreError::PermissionDenied(_)
            | StoreError::InvalidArgument(_)
            | StoreError::Unknown(_) => ErrorKind::Permanent,
        }
    }
}

/// AuthError は認証協調者のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("auth: {0}")]
pub struct AuthError(pub String);

/// DeckError は画面コンポーネントのエラー
#[derive(Debug, Error)]
pub enum DeckError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("profile for {0} does not exist")]
    MissingProfile(UserId),

    #[error("malformed document {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("swipe on {target} still conflicting after {attempts} attempts")]
    SwipeContention { target: UserId, attempts: u32 },
}

impl DeckError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeckError::Store(e) => e.kind(),
            DeckError::Auth(_) | DeckError::SwipeContention { .. } => ErrorKind::Transient,
            DeckError::MissingProfile(_) | DeckError::Malformed { .. } | DeckError::Encode(_) => {
                ErrorKind::Permanent
            }
        }
    }
}
