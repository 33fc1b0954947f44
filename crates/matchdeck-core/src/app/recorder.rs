//! DecisionRecorder - pass / swipe の記録とマッチ検出
//!
//! # フロー（swipe）
//! 1. 自分のプロフィールを読む
//! 2. 相手 → 自分のスワイプがあるかを読む（相互性の確認）
//! 3. 自分 → 相手のスワイプを書く（どの分岐でも 1 回だけ）
//!    - 相互なら match ドキュメントも同じバッチで書く
//! 4. バッチには「相手のスワイプが読んだときのまま」という前提条件を付ける
//!    - 崩れていたら（Conflict）1 からやり直す
//! 5. マッチしたらマッチ画面へ遷移を依頼
//!
//! 前提条件付きのバッチにすることで、2 人がほぼ同時に右スワイプしても
//! 後からコミットした側が必ず相手のスワイプを見てマッチを作る。

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{
    Decision, DecisionOutcome, DeckError, Destination, DocumentPath, MatchRecord, StoreError,
    UserId, UserProfile,
};
use crate::ports::{DocumentStore, Navigator, Precondition, Write, WriteBatch};

pub struct DecisionRecorder {
    store: Arc<dyn DocumentStore>,
    navigator: Arc<dyn Navigator>,
    me: UserId,
    max_attempts: u32,
}

impl DecisionRecorder {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        navigator: Arc<dyn Navigator>,
        me: UserId,
        max_attempts: u32,
    ) -> Self {
        Self {
            store,
            navigator,
            me,
            max_attempts: max_attempts.max(1),
        }
    }

    /// 判定種別に応じて pass / swipe を呼ぶ
    pub async fn record(
        &self,
        decision: Decision,
        candidates: &[UserProfile],
        index: usize,
    ) -> Result<DecisionOutcome, DeckError> {
        match decision {
            Decision::Pass => self.pass(candidates, index).await,
            Decision::Swipe => self.swipe(candidates, index).await,
        }
    }

    /// 左スワイプ: pass レコードを書く
    ///
    /// `index` が範囲外なら何もしない（DecisionOutcome::Ignored）。
    pub async fn pass(
        &self,
        candidates: &[UserProfile],
        index: usize,
    ) -> Result<DecisionOutcome, DeckError> {
        let Some(target) = candidates.get(index) else {
            debug!(index, len = candidates.len(), "pass ignored: no card at index");
            return Ok(DecisionOutcome::Ignored { index });
        };

        let write = Write::new(
            DocumentPath::decision(self.me, target.id, Decision::Pass),
            serde_json::to_value(target)?,
        );
        self.store.set(write).await?;
        info!(actor = %self.me, target = %target.id, "passed");
        Ok(DecisionOutcome::Passed { target: target.id })
    }

    /// 右スワイプ: swipe レコードを書き、相互ならマッチを作る
    ///
    /// `index` が範囲外なら何もしない（DecisionOutcome::Ignored）。
    pub async fn swipe(
        &self,
        candidates: &[UserProfile],
        index: usize,
    ) -> Result<DecisionOutcome, DeckError> {
        let Some(target) = candidates.get(index) else {
            debug!(index, len = candidates.len(), "swipe ignored: no card at index");
            return Ok(DecisionOutcome::Ignored { index });
        };

        for attempt in 1..=self.max_attempts {
            match self.try_swipe(target).await {
                Err(DeckError::Store(StoreError::Conflict(reason))) => {
                    warn!(attempt, target = %target.id, %reason, "reciprocal swipe changed, retrying");
                }
                result => return result,
            }
        }
        Err(DeckError::SwipeContention {
            target: target.id,
            attempts: self.max_attempts,
        })
    }

    async fn try_swipe(&self, target: &UserProfile) -> Result<DecisionOutcome, DeckError> {
        let logged_in = self.own_profile().await?;
        let reciprocal = DocumentPath::swipe(target.id, self.me);
        let reciprocated = self.store.get(&reciprocal).await?.is_some();

        let swipe = Write::new(
            DocumentPath::decision(self.me, target.id, Decision::Swipe),
            serde_json::to_value(target)?,
        );
        let batch = WriteBatch::new().set(swipe);

        if !reciprocated {
            self.store
                .commit(batch.require(Precondition::Missing(reciprocal)))
                .await?;
            info!(actor = %self.me, target = %target.id, "swiped");
            return Ok(DecisionOutcome::Swiped { target: target.id });
        }

        let record = MatchRecord::new(&logged_in, target);
        let match_id = record.id();
        let match_write = Write::new(
            DocumentPath::match_record(&match_id),
            serde_json::to_value(&record)?,
        )
        .with_server_timestamp("timestamp");
        self.store
            .commit(
                batch
                    .require(Precondition::Exists(reciprocal))
                    .set(match_write),
            )
            .await?;
        info!(actor = %self.me, target = %target.id, %match_id, "matched");

        self.navigator.navigate(Destination::Match {
            logged_in: logged_in.clone(),
            swiped: target.clone(),
        });
        Ok(DecisionOutcome::Matched {
            match_id,
            logged_in,
            swiped: target.clone(),
        })
    }

    async fn own_profile(&self) -> Result<UserProfile, DeckError> {
        let path = DocumentPath::user(self.me);
        let doc = self
            .store
            .get(&path)
            .await?
            .ok_or(DeckError::MissingProfile(self.me))?;
        UserProfile::from_document(&doc.id, &doc.data).map_err(|source| DeckError::Malformed {
            path: path.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CollectionPath, MatchId, Query};
    use crate::impls::{InMemoryDocumentStore, RecordingNavigator};
    use crate::ports::FixedClock;
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::rstest;
    use ulid::Ulid;

    type Store = InMemoryDocumentStore<FixedClock>;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 14, 9, 0, 0).unwrap()
    }

    fn profile(n: u128, name: &str) -> UserProfile {
        UserProfile {
            id: UserId::from_ulid(Ulid::from(n)),
            display_name: name.to_string(),
            photo_url: format!("https://example.com/{name}.jpg"),
            age: 25 + n as u32,
            job: "Baker".to_string(),
        }
    }

    struct Fixture {
        store: Arc<Store>,
        navigator: Arc<RecordingNavigator>,
        u: UserProfile,
        z: UserProfile,
    }

    impl Fixture {
        async fn new() -> Self {
            let store = Arc::new(InMemoryDocumentStore::with_clock(FixedClock::new(at())));
            let u = profile(1, "ume");
            let z = profile(4, "zoe");
            for p in [&u, &z] {
                store
                    .set(Write::new(DocumentPath::user(p.id), serde_json::to_value(p).unwrap()))
                    .await
                    .unwrap();
            }
            Self {
                store,
                navigator: Arc::new(RecordingNavigator::new()),
                u,
                z,
            }
        }

        fn recorder_for(&self, me: UserId) -> DecisionRecorder {
            self.recorder_with_attempts(me, 3)
        }

        fn recorder_with_attempts(&self, me: UserId, attempts: u32) -> DecisionRecorder {
            DecisionRecorder::new(self.store.clone(), self.navigator.clone(), me, attempts)
        }

        async fn count(&self, collection: CollectionPath) -> usize {
            self.store.list(&Query::collection(collection)).await.unwrap().len()
        }

        async fn exists(&self, path: DocumentPath) -> bool {
            self.store.get(&path).await.unwrap().is_some()
        }
    }

    #[rstest]
    #[case::pass(Decision::Pass)]
    #[case::swipe(Decision::Swipe)]
    #[tokio::test]
    async fn out_of_range_index_is_a_no_op(#[case] decision: Decision) {
        let fx = Fixture::new().await;
        let recorder = fx.recorder_for(fx.u.id);

        let empty = recorder.record(decision, &[], 0).await.unwrap();
        assert_eq!(empty, DecisionOutcome::Ignored { index: 0 });

        let past_end = recorder.record(decision, &[fx.z.clone()], 1).await.unwrap();
        assert_eq!(past_end, DecisionOutcome::Ignored { index: 1 });

        assert_eq!(fx.count(CollectionPath::passes(fx.u.id)).await, 0);
        assert_eq!(fx.count(CollectionPath::swipes(fx.u.id)).await, 0);
    }

    #[tokio::test]
    async fn pass_writes_snapshot_of_target() {
        let fx = Fixture::new().await;
        let recorder = fx.recorder_for(fx.u.id);

        let outcome = recorder.pass(&[fx.z.clone()], 0).await.unwrap();
        assert_eq!(outcome, DecisionOutcome::Passed { target: fx.z.id });

        let doc = fx
            .store
            .get(&DocumentPath::pass(fx.u.id, fx.z.id))
            .await
            .unwrap()
            .unwrap();
        let stored: UserProfile = doc.decode().unwrap();
        assert_eq!(stored, fx.z);
    }

    #[tokio::test]
    async fn swipe_without_reciprocity_writes_only_swipe() {
        let fx = Fixture::new().await;
        let recorder = fx.recorder_for(fx.u.id);

        let outcome = recorder.swipe(&[fx.z.clone()], 0).await.unwrap();

        assert_eq!(outcome, DecisionOutcome::Swiped { target: fx.z.id });
        assert_eq!(fx.count(CollectionPath::swipes(fx.u.id)).await, 1);
        assert_eq!(fx.count(CollectionPath::matches()).await, 0);
        assert!(fx.navigator.visited().is_empty());
    }

    #[tokio::test]
    async fn swipe_with_reciprocity_creates_match_and_navigates() {
        let fx = Fixture::new().await;
        // zoe already swiped right on ume
        fx.recorder_for(fx.z.id).swipe(&[fx.u.clone()], 0).await.unwrap();

        let outcome = fx.recorder_for(fx.u.id).swipe(&[fx.z.clone()], 0).await.unwrap();

        let match_id = MatchId::between(fx.u.id, fx.z.id);
        assert!(outcome.is_match());
        assert!(fx.exists(DocumentPath::swipe(fx.u.id, fx.z.id)).await);
        assert_eq!(fx.count(CollectionPath::swipes(fx.u.id)).await, 1);
        assert_eq!(fx.count(CollectionPath::matches()).await, 1);

        let doc = fx
            .store
            .get(&DocumentPath::match_record(&match_id))
            .await
            .unwrap()
            .unwrap();
        let record: MatchRecord = doc.decode().unwrap();
        assert_eq!(record.users.get(&fx.u.id), Some(&fx.u));
        assert_eq!(record.users.get(&fx.z.id), Some(&fx.z));
        assert_eq!(record.users_matched, [fx.u.id, fx.z.id]);
        assert_eq!(record.timestamp, Some(at()));

        assert_eq!(
            fx.navigator.visited(),
            vec![Destination::Match {
                logged_in: fx.u.clone(),
                swiped: fx.z.clone(),
            }]
        );
    }

    #[tokio::test]
    async fn match_key_is_the_same_whichever_side_completes_it() {
        // u が後からスワイプ
        let first = Fixture::new().await;
        first.recorder_for(first.z.id).swipe(&[first.u.clone()], 0).await.unwrap();
        first.recorder_for(first.u.id).swipe(&[first.z.clone()], 0).await.unwrap();

        // z が後からスワイプ
        let second = Fixture::new().await;
        second.recorder_for(second.u.id).swipe(&[second.z.clone()], 0).await.unwrap();
        second.recorder_for(second.z.id).swipe(&[second.u.clone()], 0).await.unwrap();

        let id = MatchId::between(first.u.id, first.z.id);
        assert!(first.exists(DocumentPath::match_record(&id)).await);
        assert!(second.exists(DocumentPath::match_record(&id)).await);
        assert_eq!(first.count(CollectionPath::matches()).await, 1);
        assert_eq!(second.count(CollectionPath::matches()).await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_mutual_swipes_produce_exactly_one_match() {
        for _ in 0..20 {
            let fx = Fixture::new().await;
            let by_u = fx.recorder_for(fx.u.id);
            let by_z = fx.recorder_for(fx.z.id);
            let (u_cards, z_cards) = ([fx.z.clone()], [fx.u.clone()]);

            let (a, b) = tokio::join!(by_u.swipe(&u_cards, 0), by_z.swipe(&z_cards, 0));
            let matched = [a.unwrap(), b.unwrap()]
                .iter()
                .filter(|outcome| outcome.is_match())
                .count();

            assert_eq!(matched, 1);
            assert_eq!(fx.count(CollectionPath::matches()).await, 1);
        }
    }

    #[tokio::test]
    async fn conflict_with_no_attempts_left_is_contention() {
        let fx = Fixture::new().await;
        fx.store
            .fail_next(StoreError::Conflict("reciprocal swipe changed".into()))
            .await;

        let result = fx
            .recorder_with_attempts(fx.u.id, 1)
            .swipe(&[fx.z.clone()], 0)
            .await;

        assert!(matches!(
            result,
            Err(DeckError::SwipeContention { target, attempts: 1 }) if target == fx.z.id
        ));
        assert_eq!(fx.count(CollectionPath::swipes(fx.u.id)).await, 0);
    }

    #[tokio::test]
    async fn conflict_is_retried_until_swipe_lands() {
        let fx = Fixture::new().await;
        fx.store
            .fail_next(StoreError::Conflict("reciprocal swipe changed".into()))
            .await;

        let outcome = fx
            .recorder_with_attempts(fx.u.id, 2)
            .swipe(&[fx.z.clone()], 0)
            .await
            .unwrap();

        assert_eq!(outcome, DecisionOutcome::Swiped { target: fx.z.id });
        assert_eq!(fx.count(CollectionPath::swipes(fx.u.id)).await, 1);
        assert_eq!(fx.count(CollectionPath::matches()).await, 0);
    }

    #[tokio::test]
    async fn other_store_errors_are_not_retried() {
        let fx = Fixture::new().await;
        fx.store
            .fail_next(StoreError::Unavailable("offline".into()))
            .await;

        let result = fx.recorder_for(fx.u.id).swipe(&[fx.z.clone()], 0).await;
        assert!(matches!(
            result,
            Err(DeckError::Store(StoreError::Unavailable(_)))
        ));
        assert_eq!(fx.count(CollectionPath::swipes(fx.u.id)).await, 0);
    }

    #[tokio::test]
    async fn swipe_without_own_profile_fails() {
        let fx = Fixture::new().await;
        let stranger = UserId::from_ulid(Ulid::from(77u128));

        let result = fx.recorder_for(stranger).swipe(&[fx.z.clone()], 0).await;
        assert!(matches!(result, Err(DeckError::MissingProfile(id)) if id == stranger));
        assert!(!fx.exists(DocumentPath::swipe(stranger, fx.z.id)).await);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let fx = Fixture::new().await;
        fx.store
            .fail_next(StoreError::PermissionDenied("rules".into()))
            .await;

        let result = fx.recorder_for(fx.u.id).pass(&[fx.z.clone()], 0).await;
        assert!(matches!(
            result,
            Err(DeckError::Store(StoreError::PermissionDenied(_)))
        ));
    }
}
