//! HomeScreen - the swipe screen, owning its session state.
//!
//! Lifecycle:
//! - `mount` checks for the user's own profile (onboarding if missing),
//!   reads the exclusion set and opens the live feed.
//! - `refresh` / `next_update` feed snapshots into the deck.
//! - `swipe_left` / `swipe_right` (buttons) and `on_swiped` (gesture) dismiss
//!   a card and hand its index to the recorder. Writes are awaited.
//! - `unmount` (or drop) tears the subscription down.
//!
//! Failures never take the screen down: they are emitted as
//! `DeckEvent::Failed` and returned to the caller.

use std::sync::Arc;

use tracing::info;

use super::builder::ScreenContext;
use super::deck::{CardDeck, Dismissal};
use super::feed::{ProfileFeed, ProfileFeedLoader};
use super::recorder::DecisionRecorder;
use crate::domain::{
    Decision, DecisionOutcome, DeckError, DeckEvent, Destination, SwipeDirection, UserProfile,
};
use crate::ports::{AuthSession, AuthUser, EventSink, Navigator};

pub struct HomeScreen {
    user: AuthUser,
    auth: Arc<dyn AuthSession>,
    navigator: Arc<dyn Navigator>,
    events: Arc<dyn EventSink>,
    recorder: DecisionRecorder,
    deck: CardDeck,
    feed: Option<ProfileFeed>,
}

fn report(events: &dyn EventSink, operation: &'static str, error: &DeckError) {
    events.emit(DeckEvent::Failed {
        operation,
        message: error.to_string(),
        kind: error.kind(),
    });
}

impl HomeScreen {
    pub async fn mount(ctx: ScreenContext) -> Result<Self, DeckError> {
        let user = ctx.auth.current_user();
        let feed = match Self::open_feed(&ctx, &user).await {
            Ok(feed) => feed,
            Err(e) => {
                report(ctx.events.as_ref(), "mount", &e);
                return Err(e);
            }
        };

        ctx.events.emit(DeckEvent::Mounted {
            user: user.id,
            excluded: feed.exclusions().len(),
        });

        let recorder = DecisionRecorder::new(
            ctx.store.clone(),
            ctx.navigator.clone(),
            user.id,
            ctx.config.swipe_max_attempts,
        );
        let mut screen = Self {
            user,
            auth: ctx.auth,
            navigator: ctx.navigator,
            events: ctx.events,
            recorder,
            deck: CardDeck::new(ctx.config.stack_size),
            feed: Some(feed),
        };
        // the subscription delivers its first snapshot immediately
        screen.refresh();
        Ok(screen)
    }

    async fn open_feed(ctx: &ScreenContext, user: &AuthUser) -> Result<ProfileFeed, DeckError> {
        let loader = ProfileFeedLoader::new(ctx.store.clone());
        if !loader.own_profile_exists(user.id).await? {
            info!(user = %user.id, "no profile yet, sending to onboarding");
            ctx.navigator.navigate(Destination::Onboarding);
        }
        loader.open(user.id).await
    }

    pub fn user(&self) -> &AuthUser {
        &self.user
    }

    pub fn deck(&self) -> &CardDeck {
        &self.deck
    }

    pub fn visible_cards(&self) -> &[UserProfile] {
        self.deck.visible()
    }

    pub fn is_mounted(&self) -> bool {
        self.feed.is_some()
    }

    /// Apply the newest pending snapshot, if any. Does not wait.
    pub fn refresh(&mut self) -> bool {
        let Some(candidates) = self.feed.as_mut().and_then(ProfileFeed::latest) else {
            return false;
        };
        self.apply(candidates);
        true
    }

    /// Wait for the next snapshot. Returns false once unmounted or closed.
    pub async fn next_update(&mut self) -> bool {
        let Some(feed) = self.feed.as_mut() else {
            return false;
        };
        let Some(candidates) = feed.next().await else {
            return false;
        };
        self.apply(candidates);
        true
    }

    fn apply(&mut self, candidates: Vec<UserProfile>) {
        self.events.emit(DeckEvent::CandidatesUpdated {
            count: candidates.len(),
        });
        self.deck.replace_candidates(candidates);
    }

    /// Cross button.
    pub async fn swipe_left(&mut self) -> Result<DecisionOutcome, DeckError> {
        self.press(SwipeDirection::Left).await
    }

    /// Heart button.
    pub async fn swipe_right(&mut self) -> Result<DecisionOutcome, DeckError> {
        self.press(SwipeDirection::Right).await
    }

    async fn press(&mut self, direction: SwipeDirection) -> Result<DecisionOutcome, DeckError> {
        match self.deck.dismiss(direction) {
            Some(dismissal) => self.decide(dismissal).await,
            None => Ok(DecisionOutcome::Ignored {
                index: self.deck.cursor(),
            }),
        }
    }

    /// Gesture completion callback from the card widget.
    pub async fn on_swiped(
        &mut self,
        direction: SwipeDirection,
        index: usize,
    ) -> Result<DecisionOutcome, DeckError> {
        let dismissal = self.deck.on_swiped(direction, index);
        self.decide(dismissal).await
    }

    async fn decide(&mut self, dismissal: Dismissal) -> Result<DecisionOutcome, DeckError> {
        let decision = Decision::from(dismissal.direction);
        let result = self
            .recorder
            .record(decision, self.deck.candidates(), dismissal.index)
            .await;

        match &result {
            Ok(DecisionOutcome::Ignored { .. }) => {}
            Ok(DecisionOutcome::Passed { target }) => {
                self.events.emit(DeckEvent::Passed { target: *target });
            }
            Ok(DecisionOutcome::Swiped { target }) => {
                self.events.emit(DeckEvent::Swiped { target: *target });
            }
            Ok(DecisionOutcome::Matched {
                match_id, swiped, ..
            }) => {
                self.events.emit(DeckEvent::Swiped { target: swiped.id });
                self.events.emit(DeckEvent::Matched {
                    match_id: match_id.clone(),
                    with: swiped.id,
                });
            }
            Err(e) => {
                let operation = match decision {
                    Decision::Pass => "pass",
                    Decision::Swipe => "swipe",
                };
                report(self.events.as_ref(), operation, e);
            }
        }
        result
    }

    /// Chat icon in the header.
    pub fn open_chat(&self) {
        self.navigator.navigate(Destination::Chat);
    }

    /// Logo in the header: edit one's own profile.
    pub fn open_profile_setup(&self) {
        self.navigator.navigate(Destination::Onboarding);
    }

    /// Avatar in the header: sign out and tear the screen down.
    pub async fn logout(&mut self) -> Result<(), DeckError> {
        if let Err(e) = self.auth.logout().await {
            let e = DeckError::from(e);
            report(self.events.as_ref(), "logout", &e);
            return Err(e);
        }
        self.unmount();
        self.events.emit(DeckEvent::LoggedOut { user: self.user.id });
        Ok(())
    }

    pub fn unmount(&mut self) {
        if self.feed.take().is_some() {
            info!(user = %self.user.id, "deck unmounted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::builder::HomeScreenBuilder;
    use crate::config::DeckConfig;
    use crate::domain::{
        CollectionPath, DocumentPath, ErrorKind, MatchId, Query, StoreError, UserId,
    };
    use crate::impls::{
        InMemoryDocumentStore, RecordingEventSink, RecordingNavigator, StaticAuthSession,
    };
    use crate::ports::{DocumentStore, Write};
    use ulid::Ulid;

    fn profile(n: u128, name: &str) -> UserProfile {
        UserProfile {
            id: UserId::from_ulid(Ulid::from(n)),
            display_name: name.to_string(),
            photo_url: String::new(),
            age: 30,
            job: "Florist".to_string(),
        }
    }

    struct Harness {
        store: Arc<InMemoryDocumentStore>,
        navigator: Arc<RecordingNavigator>,
        events: Arc<RecordingEventSink>,
        auth: Arc<StaticAuthSession>,
        u: UserProfile,
        x: UserProfile,
        y: UserProfile,
        z: UserProfile,
    }

    impl Harness {
        /// U has passed X and swiped Y; Z is unseen.
        async fn new() -> Self {
            let store = Arc::new(InMemoryDocumentStore::new());
            let (u, x, y, z) = (profile(1, "u"), profile(2, "x"), profile(3, "y"), profile(4, "z"));
            for p in [&u, &x, &y, &z] {
                put_profile(&store, p).await;
            }
            store
                .set(Write::new(DocumentPath::pass(u.id, x.id), serde_json::to_value(&x).unwrap()))
                .await
                .unwrap();
            store
                .set(Write::new(DocumentPath::swipe(u.id, y.id), serde_json::to_value(&y).unwrap()))
                .await
                .unwrap();

            let auth = Arc::new(StaticAuthSession::new(AuthUser {
                id: u.id,
                display_name: u.display_name.clone(),
                photo_url: u.photo_url.clone(),
            }));
            Self {
                store,
                navigator: Arc::new(RecordingNavigator::new()),
                events: Arc::new(RecordingEventSink::new()),
                auth,
                u,
                x,
                y,
                z,
            }
        }

        async fn mount(&self) -> Result<HomeScreen, DeckError> {
            let ctx = HomeScreenBuilder::new()
                .store(self.store.clone())
                .navigator(self.navigator.clone())
                .auth(self.auth.clone())
                .events(self.events.clone())
                .config(DeckConfig::default())
                .build()
                .unwrap();
            HomeScreen::mount(ctx).await
        }
    }

    async fn put_profile(store: &InMemoryDocumentStore, p: &UserProfile) {
        store
            .set(Write::new(DocumentPath::user(p.id), serde_json::to_value(p).unwrap()))
            .await
            .unwrap();
    }

    fn ids(cards: &[UserProfile]) -> Vec<UserId> {
        cards.iter().map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn mount_shows_only_unseen_candidates() {
        let h = Harness::new().await;
        let screen = h.mount().await.unwrap();

        let shown = ids(screen.visible_cards());
        assert_eq!(shown, vec![h.z.id]);
        for hidden in [h.u.id, h.x.id, h.y.id] {
            assert!(!shown.contains(&hidden));
        }
        assert!(h.navigator.visited().is_empty());
        assert_eq!(
            h.events.events().first(),
            Some(&DeckEvent::Mounted {
                user: h.u.id,
                excluded: 2
            })
        );
    }

    #[tokio::test]
    async fn heart_on_unreciprocated_candidate_only_swipes() {
        let h = Harness::new().await;
        let mut screen = h.mount().await.unwrap();

        let outcome = screen.swipe_right().await.unwrap();

        assert_eq!(outcome, DecisionOutcome::Swiped { target: h.z.id });
        let swipes = h
            .store
            .list(&Query::collection(CollectionPath::swipes(h.u.id)))
            .await
            .unwrap();
        assert_eq!(swipes.len(), 2);
        let matches = h
            .store
            .list(&Query::collection(CollectionPath::matches()))
            .await
            .unwrap();
        assert!(matches.is_empty());
        assert!(screen.deck().is_exhausted());
    }

    #[tokio::test]
    async fn heart_on_reciprocated_candidate_matches() {
        let h = Harness::new().await;
        h.store
            .set(Write::new(
                DocumentPath::swipe(h.z.id, h.u.id),
                serde_json::to_value(&h.u).unwrap(),
            ))
            .await
            .unwrap();
        let mut screen = h.mount().await.unwrap();

        let outcome = screen.swipe_right().await.unwrap();

        assert!(outcome.is_match());
        let match_id = MatchId::between(h.u.id, h.z.id);
        assert!(h.store.get(&DocumentPath::match_record(&match_id)).await.unwrap().is_some());
        assert_eq!(
            h.navigator.visited(),
            vec![Destination::Match {
                logged_in: h.u.clone(),
                swiped: h.z.clone(),
            }]
        );
        assert!(h.events.events().contains(&DeckEvent::Matched {
            match_id,
            with: h.z.id
        }));
    }

    #[tokio::test]
    async fn buttons_on_empty_deck_do_nothing() {
        let h = Harness::new().await;
        let mut screen = h.mount().await.unwrap();
        screen.swipe_left().await.unwrap();

        let outcome = screen.swipe_left().await.unwrap();
        assert_eq!(outcome, DecisionOutcome::Ignored { index: 1 });
        let outcome = screen.on_swiped(SwipeDirection::Right, 5).await.unwrap();
        assert_eq!(outcome, DecisionOutcome::Ignored { index: 5 });
    }

    #[tokio::test]
    async fn missing_own_profile_routes_to_onboarding() {
        let h = Harness::new().await;
        let newcomer = profile(9, "new");
        let auth = Arc::new(StaticAuthSession::new(AuthUser {
            id: newcomer.id,
            display_name: newcomer.display_name.clone(),
            photo_url: String::new(),
        }));
        let ctx = HomeScreenBuilder::new()
            .store(h.store.clone())
            .navigator(h.navigator.clone())
            .auth(auth)
            .build()
            .unwrap();

        let screen = HomeScreen::mount(ctx).await.unwrap();
        assert_eq!(h.navigator.visited(), vec![Destination::Onboarding]);
        assert_eq!(screen.deck().candidates().len(), 4);
    }

    #[tokio::test]
    async fn new_profiles_arrive_live() {
        let h = Harness::new().await;
        let mut screen = h.mount().await.unwrap();
        assert_eq!(screen.visible_cards().len(), 1);

        put_profile(&h.store, &profile(5, "w")).await;
        assert!(screen.next_update().await);
        assert_eq!(screen.visible_cards().len(), 2);
    }

    #[tokio::test]
    async fn decided_card_stays_gone_when_earlier_profile_arrives() {
        let h = Harness::new().await;
        let mut screen = h.mount().await.unwrap();
        screen.swipe_right().await.unwrap();

        // sorts before everyone already in the feed
        let newcomer = profile(0, "newcomer");
        put_profile(&h.store, &newcomer).await;
        assert!(screen.next_update().await);

        assert_eq!(ids(screen.visible_cards()), vec![newcomer.id]);
        let outcome = screen.swipe_left().await.unwrap();
        assert_eq!(outcome, DecisionOutcome::Passed { target: newcomer.id });

        let z_passed = h.store.get(&DocumentPath::pass(h.u.id, h.z.id)).await.unwrap();
        assert!(z_passed.is_none());
        assert!(screen.deck().is_exhausted());
    }

    #[tokio::test]
    async fn failed_write_is_reported_and_screen_survives() {
        let h = Harness::new().await;
        let mut screen = h.mount().await.unwrap();
        h.store
            .fail_next(StoreError::Unavailable("offline".into()))
            .await;

        let result = screen.swipe_left().await;
        assert!(result.is_err());
        assert!(matches!(
            h.events.failures().as_slice(),
            [DeckEvent::Failed { operation: "pass", kind: ErrorKind::Transient, .. }]
        ));
        assert!(screen.is_mounted());
    }

    #[tokio::test]
    async fn logout_tears_down_subscription() {
        let h = Harness::new().await;
        let mut screen = h.mount().await.unwrap();
        assert_eq!(h.store.listener_count().await, 1);

        screen.logout().await.unwrap();
        assert!(!screen.is_mounted());
        assert!(!h.auth.is_signed_in());
        assert_eq!(h.store.listener_count().await, 0);
        assert!(!screen.next_update().await);
    }

    #[tokio::test]
    async fn header_actions_navigate() {
        let h = Harness::new().await;
        let screen = h.mount().await.unwrap();
        screen.open_chat();
        screen.open_profile_setup();
        assert_eq!(
            h.navigator.visited(),
            vec![Destination::Chat, Destination::Onboarding]
        );
    }
}
