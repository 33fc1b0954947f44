//! Path - ドキュメントストア上の位置
//!
//! ストアは collection / document の階層構造を持つ。
//! 各コンポーネントが生の文字列でパスを組み立てないよう、
//! このアプリで使うパスはすべてここの型付きコンストラクタで作る。
//!
//! ```text
//! users/{user}
//! users/{actor}/passes/{target}
//! users/{actor}/swipes/{target}
//! matches/{match_id}
//! ```

use std::fmt;

use super::decision::Decision;
use super::ids::{MatchId, UserId};

const USERS: &str = "users";
const PASSES: &str = "passes";
const SWIPES: &str = "swipes";
const MATCHES: &str = "matches";

/// CollectionPath はコレクションの位置（例: `users/{id}/swipes`）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// 全ユーザーのプロフィール
    pub fn users() -> Self {
        Self(USERS.to_string())
    }

    /// `actor` が左スワイプした相手
    pub fn passes(actor: UserId) -> Self {
        Self(format!("{USERS}/{actor}/{PASSES}"))
    }

    /// `actor` が右スワイプした相手
    pub fn swipes(actor: UserId) -> Self {
        Self(format!("{USERS}/{actor}/{SWIPES}"))
    }

    /// 判定種別に対応するサブコレクション
    pub fn decisions(actor: UserId, decision: Decision) -> Self {
        match decision {
            Decision::Pass => Self::passes(actor),
            Decision::Swipe => Self::swipes(actor),
        }
    }

    pub fn matches() -> Self {
        Self(MATCHES.to_string())
    }

    pub fn doc(&self, id: impl Into<String>) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id: id.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// DocumentPath はドキュメントの位置（コレクション + ドキュメント ID）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: String,
}

impl DocumentPath {
    /// `users/{user}`
    pub fn user(user: UserId) -> Self {
        CollectionPath::users().doc(user.to_string())
    }

    /// `users/{actor}/passes/{target}`
    pub fn pass(actor: UserId, target: UserId) -> Self {
        CollectionPath::passes(actor).doc(target.to_string())
    }

    /// `users/{actor}/swipes/{target}`
    pub fn swipe(actor: UserId, target: UserId) -> Self {
        CollectionPath::swipes(actor).doc(target.to_string())
    }

    pub fn decision(actor: UserId, target: UserId, decision: Decision) -> Self {
        CollectionPath::decisions(actor, decision).doc(target.to_string())
    }

    /// `matches/{match_id}`
    pub fn match_record(id: &MatchId) -> Self {
        CollectionPath::matches().doc(id.as_str())
    }

    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}
