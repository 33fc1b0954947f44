//! ProfileFeedLoader - 未判定の候補プロフィールのライブ購読
//!
//! # フロー
//! 1. 自分の passes / swipes を単発で読む（ライブではない）
//! 2. 両者の和集合を除外集合にする
//! 3. `users` コレクションを除外集合付きで購読する
//! 4. スナップショットが届くたびに、自分自身を除いた候補一覧を返す
//!
//! 除外集合はマウント時に 1 回だけ計算する。セッション中の判定で
//! 再計算はしない（判定したカードはデッキのカーソルが先に進むことで消える）。

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{
    CollectionPath, Decision, DeckError, DocumentPath, Query, UserId, UserProfile,
};
use crate::ports::{DocumentStore, QuerySnapshot, Subscription};

pub struct ProfileFeedLoader {
    store: Arc<dyn DocumentStore>,
}

impl ProfileFeedLoader {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// 自分のプロフィールドキュメントがあるか
    pub async fn own_profile_exists(&self, me: UserId) -> Result<bool, DeckError> {
        Ok(self.store.get(&DocumentPath::user(me)).await?.is_some())
    }

    /// 判定済み（pass + swipe）のユーザー ID を読む
    pub async fn exclusions(&self, me: UserId) -> Result<BTreeSet<String>, DeckError> {
        let mut exclusions = BTreeSet::new();
        for decision in [Decision::Pass, Decision::Swipe] {
            let decided = self
                .store
                .list(&Query::collection(CollectionPath::decisions(me, decision)))
                .await?;
            exclusions.extend(decided.into_iter().map(|doc| doc.id));
        }
        Ok(exclusions)
    }

    /// 除外集合からフィードのクエリを作る（空なら条件なし）
    pub fn feed_query(exclusions: &BTreeSet<String>) -> Query {
        Query::collection(CollectionPath::users()).excluding_ids(exclusions.iter().cloned())
    }

    /// 除外集合を読んで購読を開く
    pub async fn open(&self, me: UserId) -> Result<ProfileFeed, DeckError> {
        let exclusions = self.exclusions(me).await?;
        let subscription = self.store.subscribe(Self::feed_query(&exclusions)).await?;
        info!(user = %me, excluded = exclusions.len(), "profile feed opened");
        Ok(ProfileFeed {
            me,
            exclusions,
            subscription,
        })
    }
}

/// ProfileFeed は開いている購読
///
/// drop すると購読解除になる。
#[derive(Debug)]
pub struct ProfileFeed {
    me: UserId,
    exclusions: BTreeSet<String>,
    subscription: Subscription,
}

impl ProfileFeed {
    pub fn exclusions(&self) -> &BTreeSet<String> {
        &self.exclusions
    }

    /// 次のスナップショットを待って候補一覧にする。購読が閉じたら None。
    pub async fn next(&mut self) -> Option<Vec<UserProfile>> {
        let snapshot = self.subscription.next().await?;
        Some(self.candidates(snapshot))
    }

    /// 溜まっている中で最新の候補一覧（なければ None、待たない）
    pub fn latest(&mut self) -> Option<Vec<UserProfile>> {
        let snapshot = self.subscription.latest()?;
        Some(self.candidates(snapshot))
    }

    fn candidates(&self, snapshot: QuerySnapshot) -> Vec<UserProfile> {
        let me = self.me.to_string();
        let candidates: Vec<UserProfile> = snapshot
            .documents
            .into_iter()
            .filter(|doc| doc.id != me)
            .filter_map(|doc| match UserProfile::from_document(&doc.id, &doc.data) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    // 壊れた 1 件でデッキ全体を空にはしない
                    warn!(doc_id = %doc.id, error = %e, "skipping malformed profile");
                    None
                }
            })
            .collect();
        debug!(count = candidates.len(), "feed snapshot");
        candidates
    }
}
