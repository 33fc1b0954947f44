//! EventSink port - 画面イベントの記録先
//!
//! 失敗通知（DeckEvent::Failed）もここに流す。
//! ユーザーに見える通知（トーストなど）にするかログに留めるかは実装次第。

use crate::domain::DeckEvent;

pub trait EventSink: Send + Sync {
    fn emit(&self, event: DeckEvent);
}
