//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（Clock で時刻部分を決める）

use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use crate::domain::ids::UserId;
use crate::ports::Clock;
use tracing::warn;
use ulid::{Generator, Ulid};

/// IdGenerator はユーザー ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数タスクから使える）
pub trait IdGenerator: Send + Sync {
    fn generate_user_id(&self) -> UserId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// 同じミリ秒内に作った ID も生成順に並ぶ（単調増加）。
/// テスト時に FixedClock を渡すと timestamp 部分が固定される。
pub struct UlidGenerator<C> {
    clock: C,
    monotonic: Mutex<Generator>,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            monotonic: Mutex::new(Generator::new()),
        }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_user_id(&self) -> UserId {
        let now = self.clock.now();
        let mut generator = self
            .monotonic
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let ulid = generator
            .generate_from_datetime(SystemTime::from(now))
            .unwrap_or_else(|e| {
                // 1 ミリ秒内でランダム部が尽きた場合だけ
                warn!(error = %e, "monotonic ulid overflow, falling back to random");
                Ulid::from_parts(now.timestamp_millis() as u64, rand::random())
            });
        UserId::from(ulid)
    }
}
