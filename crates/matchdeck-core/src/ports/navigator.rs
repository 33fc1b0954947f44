//! Navigator port - 画面遷移の依頼先

use crate::domain::Destination;

/// Navigator は遷移先を受け取る
///
/// 遷移そのもの（ルーティング、画面スタック）は協調者側の責務。
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: Destination);
}
