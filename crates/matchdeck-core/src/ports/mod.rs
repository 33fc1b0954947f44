//! Ports - 外部協調者の抽象化レイヤー
//!
//! 画面ロジック（app）はここの trait だけに依存する。
//! ホスト型のドキュメントストア、認証、ルーティング、通知 UI は
//! それぞれの実装を差し込む。開発・テスト用の実装は impls にある。

pub mod document_store;
pub mod navigator;
pub mod auth;
pub mod event_sink;
pub mod clock;
pub mod id_generator;

// 主要な trait を再エクスポート
pub use self::document_store::{
    Document, DocumentStore, Precondition, QuerySnapshot, Subscription, Write, WriteBatch,
};
pub use self::navigator::Navigator;
pub use self::auth::{AuthSession, AuthUser};
pub use self::event_sink::EventSink;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
