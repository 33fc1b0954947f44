//! HomeScreenBuilder - 画面の協調者のワイヤリング
//!
//! # Fail-fast 設計
//! - 必須の協調者（store, navigator, auth）が揃っていなければ build() で BuildError
//! - EventSink と DeckConfig は省略可（TracingEventSink, DeckConfig::default）

use std::sync::Arc;

use crate::config::DeckConfig;
use crate::impls::TracingEventSink;
use crate::ports::{AuthSession, DocumentStore, EventSink, Navigator};

/// ScreenContext は HomeScreen::mount に渡す協調者一式
#[derive(Clone)]
pub struct ScreenContext {
    pub store: Arc<dyn DocumentStore>,
    pub navigator: Arc<dyn Navigator>,
    pub auth: Arc<dyn AuthSession>,
    pub events: Arc<dyn EventSink>,
    pub config: DeckConfig,
}

/// BuildError は構築時のエラー
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Missing collaborators: {0:?}. These must be supplied before mounting.")]
    MissingCollaborators(Vec<&'static str>),
}

/// # 使用例
/// ```ignore
/// let ctx = HomeScreenBuilder::new()
///     .store(store)
///     .navigator(navigator)
///     .auth(auth)
///     .build()?;
/// let screen = HomeScreen::mount(ctx).await?;
/// ```
#[derive(Default)]
pub struct HomeScreenBuilder {
    store: Option<Arc<dyn DocumentStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    auth: Option<Arc<dyn AuthSession>>,
    events: Option<Arc<dyn EventSink>>,
    config: Option<DeckConfig>,
}

impl HomeScreenBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn auth(mut self, auth: Arc<dyn AuthSession>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn config(mut self, config: DeckConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<ScreenContext, BuildError> {
        let mut missing = Vec::new();
        if self.store.is_none() {
            missing.push("store");
        }
        if self.navigator.is_none() {
            missing.push("navigator");
        }
        if self.auth.is_none() {
            missing.push("auth");
        }

        match (self.store, self.navigator, self.auth) {
            (Some(store), Some(navigator), Some(auth)) => Ok(ScreenContext {
                store,
                navigator,
                auth,
                events: self.events.unwrap_or_else(|| Arc::new(TracingEventSink)),
                config: self.config.unwrap_or_default(),
            }),
            _ => Err(BuildError::MissingCollaborators(missing)),
        }
    }
}
