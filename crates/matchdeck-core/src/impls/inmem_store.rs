//! InMemoryDocumentStore - 開発・テスト用のドキュメントストア
//!
//! # 実装詳細
//! - collection ごとに BTreeMap<doc_id, JSON> を持つ（ID 順に列挙される）
//! - tokio::sync::Mutex で全操作を直列化する（commit は前提条件の検査と書き込みが不可分）
//! - ライブ購読は mpsc::UnboundedSender で配信。commit のたびに、触ったコレクションを
//!   見ている購読者へ最新スナップショットを送る
//! - 受信側が drop された購読者は次の配信時に取り除く

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::domain::{CollectionPath, DocumentPath, Filter, Query, StoreError};
use crate::ports::{
    Clock, Document, DocumentStore, Precondition, QuerySnapshot, Subscription, SystemClock,
    WriteBatch,
};

struct Listener {
    query: Query,
    sender: mpsc::UnboundedSender<QuerySnapshot>,
}

#[derive(Default)]
struct StoreState {
    collections: BTreeMap<CollectionPath, BTreeMap<String, serde_json::Value>>,
    listeners: Vec<Listener>,
    /// 次の 1 操作を失敗させる（障害の再現用）
    injected_failure: Option<StoreError>,
}

impl StoreState {
    fn take_injected_failure(&mut self) -> Result<(), StoreError> {
        match self.injected_failure.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn exists(&self, path: &DocumentPath) -> bool {
        self.collections
            .get(path.collection())
            .is_some_and(|docs| docs.contains_key(path.id()))
    }

    fn snapshot(&self, query: &Query) -> QuerySnapshot {
        let documents = self
            .collections
            .get(query.collection_path())
            .map(|docs| {
                docs.iter()
                    .filter(|(id, _)| query.matches(id))
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        QuerySnapshot { documents }
    }

    fn notify(&mut self, touched: &BTreeSet<CollectionPath>) {
        let mut listeners = std::mem::take(&mut self.listeners);
        listeners.retain(|listener| {
            if listener.sender.is_closed() {
                return false;
            }
            if !touched.contains(listener.query.collection_path()) {
                return true;
            }
            listener.sender.send(self.snapshot(&listener.query)).is_ok()
        });
        self.listeners = listeners;
    }
}

fn validate(query: &Query) -> Result<(), StoreError> {
    // ホスト型ストアと同じく、空の not-in は受け付けない
    if let Filter::IdNotIn(ids) = query.filter()
        && ids.is_empty()
    {
        return Err(StoreError::InvalidArgument(format!(
            "empty not-in filter on {}",
            query.collection_path()
        )));
    }
    Ok(())
}

/// InMemoryDocumentStore は開発・テスト用のストア
///
/// # 使用例
/// ```ignore
/// let store = InMemoryDocumentStore::new();
/// store.set(Write::new(DocumentPath::user(id), json!({ ... }))).await?;
/// let mut sub = store.subscribe(Query::collection(CollectionPath::users())).await?;
/// let first = sub.next().await;
/// ```
pub struct InMemoryDocumentStore<C = SystemClock> {
    state: Mutex<StoreState>,
    clock: C,
}

impl InMemoryDocumentStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for InMemoryDocumentStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryDocumentStore<C> {
    /// サーバータイムスタンプに使う Clock を指定して作成
    pub fn with_clock(clock: C) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            clock,
        }
    }

    /// 次の 1 操作を `error` で失敗させる
    pub async fn fail_next(&self, error: StoreError) {
        self.state.lock().await.injected_failure = Some(error);
    }

    /// 生きている購読の数
    pub async fn listener_count(&self) -> usize {
        let mut state = self.state.lock().await;
        state.listeners.retain(|listener| !listener.sender.is_closed());
        state.listeners.len()
    }
}

#[async_trait]
impl<C: Clock + 'static> DocumentStore for InMemoryDocumentStore<C> {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
        let mut state = self.state.lock().await;
        state.take_injected_failure()?;
        let document = state
            .collections
            .get(path.collection())
            .and_then(|docs| docs.get(path.id()))
            .map(|data| Document {
                id: path.id().to_string(),
                data: data.clone(),
            });
        Ok(document)
    }

    async fn list(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        validate(query)?;
        let mut state = self.state.lock().await;
        state.take_injected_failure()?;
        Ok(state.snapshot(query).documents)
    }

    async fn subscribe(&self, query: Query) -> Result<Subscription, StoreError> {
        validate(&query)?;
        let mut state = self.state.lock().await;
        state.take_injected_failure()?;

        let (sender, receiver) = mpsc::unbounded_channel();
        // 登録時点のスナップショットを最初に配信する
        let _ = sender.send(state.snapshot(&query));
        debug!(collection = %query.collection_path(), "subscription opened");
        state.listeners.push(Listener { query, sender });
        Ok(Subscription::new(receiver))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.take_injected_failure()?;

        for precondition in batch.preconditions() {
            match precondition {
                Precondition::Exists(path) if !state.exists(path) => {
                    return Err(StoreError::Conflict(format!("{path} does not exist")));
                }
                Precondition::Missing(path) if state.exists(path) => {
                    return Err(StoreError::Conflict(format!("{path} already exists")));
                }
                _ => {}
            }
        }

        // 全件を検証してから書く（途中で失敗したら何も書かない）
        let now = self.clock.now();
        let resolved = batch
            .into_writes()
            .into_iter()
            .map(|write| write.resolve(now))
            .collect::<Result<Vec<_>, _>>()?;

        let mut touched = BTreeSet::new();
        for (path, data) in resolved {
            debug!(%path, "document written");
            touched.insert(path.collection().clone());
            state
                .collections
                .entry(path.collection().clone())
                .or_default()
                .insert(path.id().to_string(), data);
        }
        state.notify(&touched);
        Ok(())
    }
}
