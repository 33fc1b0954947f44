//! Impls - ports の実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryDocumentStore**: 前提条件付きコミットとライブ購読を持つストア
//! - **RecordingNavigator / RecordingEventSink**: 呼び出しを記録するだけの実装
//! - **TracingEventSink**: DeckEvent を tracing に流す
//! - **StaticAuthSession**: 固定ユーザーの認証セッション
//!
//! ホスト型のドキュメントストアや実際の画面遷移は別クレートで実装する。

pub mod inmem_store;
pub mod recording;
pub mod tracing_sink;
pub mod static_auth;

// 主要な型を再エクスポート
pub use self::inmem_store::InMemoryDocumentStore;
pub use self::recording::{RecordingEventSink, RecordingNavigator};
pub use self::tracing_sink::TracingEventSink;
pub use self::static_auth::StaticAuthSession;
