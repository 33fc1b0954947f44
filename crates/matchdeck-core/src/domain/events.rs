//! Events - 画面から外へ出ていくもの
//!
//! - Destination: Navigator に渡す遷移先
//! - DeckEvent: EventSink に渡す出来事（失敗通知を含む）

use super::errors::ErrorKind;
use super::ids::{MatchId, UserId};
use super::profile::UserProfile;

/// Destination は遷移先の画面
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// プロフィール設定（自分のプロフィールがまだ無いとき、ロゴ押下時）
    Onboarding,
    /// チャット一覧
    Chat,
    /// マッチ成立画面（両者のプロフィール付き）
    Match {
        logged_in: UserProfile,
        swiped: UserProfile,
    },
}

/// DeckEvent は画面で起きた出来事
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckEvent {
    Mounted { user: UserId, excluded: usize },
    CandidatesUpdated { count: usize },
    Passed { target: UserId },
    Swiped { target: UserId },
    Matched { match_id: MatchId, with: UserId },
    LoggedOut { user: UserId },
    /// 失敗通知（画面は止めない）
    Failed {
        operation: &'static str,
        message: String,
        kind: ErrorKind,
    },
}
