//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてホーム画面のロジックを実装します。
//!
//! # 主要コンポーネント
//! - **HomeScreenBuilder**: 協調者のワイヤリング
//! - **ProfileFeedLoader**: 未判定候補のライブ購読
//! - **DecisionRecorder**: pass / swipe の記録とマッチ検出
//! - **CardDeck**: カードスタックの表示状態
//! - **HomeScreen**: 上記を束ねた画面本体

pub mod builder;
pub mod deck;
pub mod feed;
pub mod recorder;
pub mod screen;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, HomeScreenBuilder, ScreenContext};
pub use self::deck::{CardDeck, Dismissal};
pub use self::feed::{ProfileFeed, ProfileFeedLoader};
pub use self::recorder::DecisionRecorder;
pub use self::screen::HomeScreen;
