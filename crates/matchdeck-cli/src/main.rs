use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use matchdeck_core::DeckConfig;
use matchdeck_core::app::{HomeScreen, HomeScreenBuilder};
use matchdeck_core::domain::{DecisionOutcome, Destination, DocumentPath, UserId, UserProfile};
use matchdeck_core::impls::{InMemoryDocumentStore, StaticAuthSession};
use matchdeck_core::ports::{
    AuthUser, DocumentStore, IdGenerator, Navigator, SystemClock, UlidGenerator, Write,
};

const DEFAULT_SEED: &str = include_str!("../seed.json");

/// デモ用の初期データ（ユーザーはキーで参照する）
#[derive(Debug, Deserialize)]
struct Seed {
    me: String,
    profiles: Vec<SeedProfile>,
    #[serde(default)]
    passes: Vec<(String, String)>,
    #[serde(default)]
    swipes: Vec<(String, String)>,
    #[serde(default)]
    actions: Vec<Action>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedProfile {
    key: String,
    display_name: String,
    #[serde(rename = "photoURL")]
    photo_url: String,
    age: u32,
    #[serde(default)]
    job: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Action {
    Left,
    Right,
    Chat,
    Profile,
    Logout,
}

/// 遷移先を標準出力に書くだけの Navigator
struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn navigate(&self, destination: Destination) {
        match destination {
            Destination::Onboarding => println!("-> onboarding"),
            Destination::Chat => println!("-> chat"),
            Destination::Match { logged_in, swiped } => println!(
                "-> match: {} and {} liked each other",
                logged_in.display_name, swiped.display_name
            ),
        }
    }
}

struct Directory {
    ids: HashMap<String, UserId>,
    profiles: HashMap<String, UserProfile>,
}

impl Directory {
    fn id(&self, key: &str) -> anyhow::Result<UserId> {
        match self.ids.get(key) {
            Some(id) => Ok(*id),
            None => bail!("unknown user key in seed: {key}"),
        }
    }
}

async fn load_seed(store: &InMemoryDocumentStore, seed: &Seed) -> anyhow::Result<Directory> {
    let id_gen = UlidGenerator::new(SystemClock);
    let mut directory = Directory {
        ids: HashMap::new(),
        profiles: HashMap::new(),
    };

    for p in &seed.profiles {
        let profile = UserProfile {
            id: id_gen.generate_user_id(),
            display_name: p.display_name.clone(),
            photo_url: p.photo_url.clone(),
            age: p.age,
            job: p.job.clone(),
        };
        store
            .set(Write::new(
                DocumentPath::user(profile.id),
                serde_json::to_value(&profile)?,
            ))
            .await?;
        directory.ids.insert(p.key.clone(), profile.id);
        directory.profiles.insert(p.key.clone(), profile);
    }
    if !directory.ids.contains_key(&seed.me) {
        // プロフィール未作成のユーザーとしてログインさせる
        directory
            .ids
            .insert(seed.me.clone(), id_gen.generate_user_id());
    }

    write_decisions(store, &directory, &seed.passes, DocumentPath::pass).await?;
    write_decisions(store, &directory, &seed.swipes, DocumentPath::swipe).await?;

    info!(
        users = directory.ids.len(),
        passes = seed.passes.len(),
        swipes = seed.swipes.len(),
        "seed loaded"
    );
    Ok(directory)
}

/// (actor, target) の組を判定レコードとして書く。中身は相手のプロフィール。
async fn write_decisions(
    store: &InMemoryDocumentStore,
    directory: &Directory,
    records: &[(String, String)],
    path_of: fn(UserId, UserId) -> DocumentPath,
) -> anyhow::Result<()> {
    for (actor, target) in records {
        let target_profile = directory
            .profiles
            .get(target)
            .with_context(|| format!("no profile for decision target {target}"))?;
        let path = path_of(directory.id(actor)?, directory.id(target)?);
        store
            .set(Write::new(path, serde_json::to_value(target_profile)?))
            .await?;
    }
    Ok(())
}

fn print_deck(screen: &HomeScreen) {
    let cards = screen.visible_cards();
    if cards.is_empty() {
        println!("[no more profiles]");
        return;
    }
    for (i, card) in cards.iter().enumerate() {
        let marker = if i == 0 { ">" } else { " " };
        println!(
            "{marker} {}, {} ({})",
            card.display_name, card.age, card.job
        );
    }
}

fn print_outcome(outcome: &DecisionOutcome) {
    match outcome {
        DecisionOutcome::Ignored { .. } => println!("nothing to swipe"),
        DecisionOutcome::Passed { target } => println!("passed {target}"),
        DecisionOutcome::Swiped { target } => println!("swiped {target}"),
        DecisionOutcome::Matched { match_id, .. } => println!("matched ({match_id})"),
    }
}

/// 操作を順に流す。ログアウトに成功したら true を返して止まる。
async fn run_actions(screen: &mut HomeScreen, actions: &[Action]) -> bool {
    for &action in actions {
        let result = match action {
            Action::Left => screen.swipe_left().await.map(Some),
            Action::Right => screen.swipe_right().await.map(Some),
            Action::Chat => {
                screen.open_chat();
                Ok(None)
            }
            Action::Profile => {
                screen.open_profile_setup();
                Ok(None)
            }
            Action::Logout => screen.logout().await.map(|()| None),
        };
        match result {
            Ok(Some(outcome)) => {
                print_outcome(&outcome);
                screen.refresh();
                print_deck(screen);
            }
            Ok(None) if matches!(action, Action::Logout) => {
                println!("signed out");
                return true;
            }
            Ok(None) => {}
            // 画面は止めずに次の操作へ進む
            Err(e) => warn!(?action, error = %e, "action failed"),
        }
    }
    false
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = DeckConfig::from_env()?;

    let raw = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading seed file {}", path.display()))?,
        None => DEFAULT_SEED.to_string(),
    };
    let seed: Seed = serde_json::from_str(&raw).context("parsing seed")?;

    let store = Arc::new(InMemoryDocumentStore::new());
    let directory = load_seed(&store, &seed).await?;

    let me = directory.id(&seed.me)?;
    let auth_user = match directory.profiles.get(&seed.me) {
        Some(p) => AuthUser {
            id: me,
            display_name: p.display_name.clone(),
            photo_url: p.photo_url.clone(),
        },
        None => AuthUser {
            id: me,
            display_name: seed.me.clone(),
            photo_url: String::new(),
        },
    };

    let ctx = HomeScreenBuilder::new()
        .store(store.clone())
        .navigator(Arc::new(StdoutNavigator))
        .auth(Arc::new(StaticAuthSession::new(auth_user)))
        .config(config)
        .build()?;

    let mut screen = HomeScreen::mount(ctx).await?;
    println!("signed in as {}", screen.user().display_name);
    print_deck(&screen);

    run_actions(&mut screen, &seed.actions).await;
    screen.unmount();
    Ok(())
}
