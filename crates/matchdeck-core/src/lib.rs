//! matchdeck-core
//!
//! スワイプ式のカードデッキ（候補プロフィール一覧）と、その裏側の
//! 判定記録・マッチ検出をまとめたコアクレート。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, path, profile, decision, query, errors, events）
//! - **ports**: 外部協調者の抽象化（DocumentStore, Navigator, AuthSession, EventSink, Clock, IdGenerator）
//! - **impls**: ports の実装（InMemoryDocumentStore など開発・テスト用）
//! - **app**: 画面ロジック（ProfileFeedLoader, DecisionRecorder, CardDeck, HomeScreen）
//! - **config**: 環境変数からの設定読み込み

pub mod domain;
pub mod ports;
pub mod impls;
pub mod app;
pub mod config;

pub use config::DeckConfig;
