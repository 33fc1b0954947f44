//! DocumentStore port - パス指定の階層型ドキュメントストア
//!
//! 画面が使う操作は以下だけ:
//! - ドキュメントの単発読み込み（get）
//! - コレクションの単発読み込み（list）
//! - コレクションクエリのライブ購読（subscribe）
//! - 書き込み（set / commit）とサーバータイムスタンプ
//!
//! # commit と前提条件
//! マッチ判定は「相手のスワイプを読む → 自分のスワイプ（+ match）を書く」。
//! この read-then-write を原子的にするため、WriteBatch に前提条件
//! （Precondition）を付けられる。前提が崩れていれば何も書かずに
//! StoreError::Conflict を返す。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use crate::domain::{DocumentPath, Query, StoreError};

/// Document はストアから読んだ 1 件
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: serde_json::Value,
}

impl Document {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }
}

/// QuerySnapshot はクエリ結果のある時点の全件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySnapshot {
    pub documents: Vec<Document>,
}

/// Write は 1 ドキュメントの上書き
#[derive(Debug, Clone, PartialEq)]
pub struct Write {
    path: DocumentPath,
    data: serde_json::Value,
    server_timestamps: Vec<String>,
}

impl Write {
    pub fn new(path: DocumentPath, data: serde_json::Value) -> Self {
        Self {
            path,
            data,
            server_timestamps: Vec::new(),
        }
    }

    /// `field` にコミット時のサーバー時刻を入れるよう依頼する
    pub fn with_server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.server_timestamps.push(field.into());
        self
    }

    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    /// サーバータイムスタンプを埋めて (path, data) に分解する
    ///
    /// タイムスタンプを要求する書き込みの data は JSON オブジェクトでなければならない。
    pub fn resolve(self, now: DateTime<Utc>) -> Result<(DocumentPath, serde_json::Value), StoreError> {
        let Write {
            path,
            mut data,
            server_timestamps,
        } = self;
        if server_timestamps.is_empty() {
            return Ok((path, data));
        }

        let serde_json::Value::Object(fields) = &mut data else {
            return Err(StoreError::InvalidArgument(format!(
                "server timestamp requested on non-object document {path}"
            )));
        };
        let stamp = serde_json::to_value(now).map_err(|e| StoreError::Unknown(e.to_string()))?;
        for field in server_timestamps {
            fields.insert(field, stamp.clone());
        }
        Ok((path, data))
    }
}

/// Precondition はコミット時に成り立っているべき条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    Exists(DocumentPath),
    Missing(DocumentPath),
}

/// WriteBatch は前提条件付きの書き込みの束（全部成功か、全部失敗）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    preconditions: Vec<Precondition>,
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, precondition: Precondition) -> Self {
        self.preconditions.push(precondition);
        self
    }

    pub fn set(mut self, write: Write) -> Self {
        self.writes.push(write);
        self
    }

    pub fn preconditions(&self) -> &[Precondition] {
        &self.preconditions
    }

    pub fn into_writes(self) -> Vec<Write> {
        self.writes
    }
}

/// Subscription はライブ購読のハンドル
///
/// drop すると購読解除になる（ストア側は次の配信時に送信先を掃除する）。
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<QuerySnapshot>,
}

impl Subscription {
    pub fn new(receiver: mpsc::UnboundedReceiver<QuerySnapshot>) -> Self {
        Self { receiver }
    }

    /// 次のスナップショットを待つ。ストア側が閉じたら None。
    pub async fn next(&mut self) -> Option<QuerySnapshot> {
        self.receiver.recv().await
    }

    /// 溜まっているスナップショットのうち最新のものを返す（待たない）
    pub fn latest(&mut self) -> Option<QuerySnapshot> {
        let mut latest = None;
        while let Ok(snapshot) = self.receiver.try_recv() {
            latest = Some(snapshot);
        }
        latest
    }
}

/// DocumentStore はドキュメントストアのポート
///
/// # 設計原則
/// - すべての操作は Result で失敗を返す（握りつぶさない）
/// - subscribe は登録時点のスナップショットを最初に 1 件配信する
/// - commit は前提条件の検査と書き込みを不可分に行う
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError>;

    async fn list(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    async fn subscribe(&self, query: Query) -> Result<Subscription, StoreError>;

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    async fn set(&self, write: Write) -> Result<(), StoreError> {
        self.commit(WriteBatch::new().set(write)).await
    }
}
