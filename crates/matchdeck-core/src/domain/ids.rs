//! Domain identifiers (strongly-typed IDs).
//!
//! ユーザー ID は ULID ベースの `Id<User>` で表現します。
//! ドキュメントストア上では Display 形式（`user-<ULID>`）がそのまま
//! ドキュメント ID になるため、`FromStr` で往復できるようにしています。
//!
//! ## Phantom Type パターン
//! `Id<T>` の `T` は実行時には使わないマーカー型です。
//! 将来 ID の種類が増えても UserId と混同できません。

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    /// Display で使うプレフィックス（例: "user-"）
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// ULID から Id を作成
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// 内部の ULID を取得
    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// ドキュメント ID から Id への変換エラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("expected prefix '{expected}' in '{value}'")]
    MissingPrefix { expected: &'static str, value: String },

    #[error("invalid ULID in '{value}': {reason}")]
    InvalidUlid { value: String, reason: String },
}

impl<T: IdMarker> FromStr for Id<T> {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .strip_prefix(T::prefix())
            .ok_or_else(|| IdParseError::MissingPrefix {
                expected: T::prefix(),
                value: s.to_string(),
            })?;
        let ulid = Ulid::from_string(raw).map_err(|e| IdParseError::InvalidUlid {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_ulid(ulid))
    }
}

// ドキュメント上は文字列（Display 形式）として保存する。
// map のキー（MatchRecord.users）にも使うので collect_str で出力する。
impl<T: IdMarker> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T: IdMarker> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// User のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum User {}

impl IdMarker for User {
    fn prefix() -> &'static str {
        "user-"
    }
}

/// Identifier of a user (one profile document per user).
pub type UserId = Id<User>;

/// MatchId は 2 人の UserId から導出される match ドキュメントの ID
///
/// # 導出規則
/// - 2 つの ID を文字列として比較し、大きい方を先に連結する
/// - 引数の順序に依存しない（A,B と B,A は同じ ID）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    pub fn between(a: UserId, b: UserId) -> Self {
        let (a, b) = (a.to_string(), b.to_string());
        if a > b {
            Self(a + &b)
        } else {
            Self(b + &a)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
