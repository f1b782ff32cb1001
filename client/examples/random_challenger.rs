//! Two random players on a local server
//!
//! One player challenges the other, which accepts. Both answer every battle
//! request with a random legal choice until the target number of battles
//! has been played.
//!
//! ```text
//! PS_SERVER=localhost:8000 PS_AUTH=https://play.pokemonshowdown.com/action.php \
//! PS_USER1=alice PS_PASS1=... PS_USER2=bob PS_PASS2=... \
//! PS_MOVES=data/moves.json cargo run --example random_challenger
//! ```

use std::collections::HashSet;
use std::env;

use anyhow::{Context, Result};
use pokeagent_client::{DEFAULT_FORMAT, EngineConfig, EngineHandle, ProtocolEngine, SessionController};
use pokeagent_moves::MoveCatalog;
use rand::seq::SliceRandom;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

const TARGET_BATTLES: usize = 10;
const CONCURRENT_BATTLES: usize = 1;

enum Mode {
    Challenge { opponent: String },
    Wait,
}

struct RandomPlayer {
    handle: EngineHandle,
    mode: Mode,
    format: String,
    active: HashSet<String>,
    finished: usize,
}

impl RandomPlayer {
    fn new(handle: EngineHandle, mode: Mode) -> Self {
        Self {
            handle,
            mode,
            format: DEFAULT_FORMAT.to_string(),
            active: HashSet::new(),
            finished: 0,
        }
    }

    async fn challenge_if_needed(&self) {
        if let Mode::Challenge { opponent } = &self.mode
            && self.active.len() < CONCURRENT_BATTLES
            && self.finished + self.active.len() < TARGET_BATTLES
            && let Err(e) = self.handle.challenge(opponent, &self.format).await
        {
            tracing::error!(error = %e, "Failed to challenge");
        }
    }

    async fn answer_request(&self, room: &str, request: &Value) {
        if request.get("wait").and_then(Value::as_bool) == Some(true) {
            return;
        }

        let choices = legal_choices(request);
        let Some(choice) = choices.choose(&mut rand::thread_rng()) else {
            return;
        };

        if let Some(catalog) = MoveCatalog::global()
            && let Some(name) = chosen_move_name(request, choice)
        {
            match catalog.resolve(&name) {
                Ok(mv) => tracing::debug!(room, %mv, power = mv.base_power(), "Chosen move"),
                Err(e) => tracing::debug!(room, error = %e, "Move not in catalog"),
            }
        }

        let rqid = request.get("rqid").and_then(Value::as_u64).map(|id| id as u32);
        if let Err(e) = self.handle.choose(room, choice, rqid).await {
            tracing::error!(room, error = %e, "Failed to send choice");
        }
    }
}

/// Every `/choose` argument the request allows
fn legal_choices(request: &Value) -> Vec<String> {
    let side = request["side"]["pokemon"].as_array().cloned().unwrap_or_default();
    let switches = side
        .iter()
        .enumerate()
        .filter(|(_, pokemon)| {
            !pokemon["active"].as_bool().unwrap_or(false)
                && !pokemon["condition"].as_str().unwrap_or("").ends_with(" fnt")
        })
        .map(|(i, _)| format!("switch {}", i + 1));

    if request["teamPreview"].as_bool() == Some(true) {
        let order: String = (1..=side.len()).map(|i| i.to_string()).collect();
        return vec![format!("team {}", order)];
    }

    let forced = request["forceSwitch"]
        .as_array()
        .is_some_and(|slots| slots.iter().any(|slot| slot.as_bool() == Some(true)));
    if forced {
        return switches.collect();
    }

    let active = &request["active"][0];
    let moves = active["moves"]
        .as_array()
        .into_iter()
        .flatten()
        .enumerate()
        .filter(|(_, slot)| !slot["disabled"].as_bool().unwrap_or(false))
        .map(|(i, _)| format!("move {}", i + 1));

    if active["trapped"].as_bool() == Some(true) {
        moves.collect()
    } else {
        moves.chain(switches).collect()
    }
}

fn chosen_move_name(request: &Value, choice: &str) -> Option<String> {
    let slot: usize = choice.strip_prefix("move ")?.parse().ok()?;
    request["active"][0]["moves"][slot.checked_sub(1)?]["id"]
        .as_str()
        .map(str::to_string)
}

impl SessionController for RandomPlayer {
    fn can_accept_challenge(&self) -> bool {
        matches!(self.mode, Mode::Wait)
            && self.active.len() < CONCURRENT_BATTLES
            && self.finished + self.active.len() < TARGET_BATTLES
    }

    fn should_terminate(&self) -> bool {
        self.finished >= TARGET_BATTLES
    }

    async fn on_logged_in(&mut self, username: &str) {
        tracing::info!(username, "Ready");
        self.challenge_if_needed().await;
    }

    async fn on_session_start(&mut self, room: &str) {
        self.active.insert(room.to_string());
    }

    async fn on_battle_message(&mut self, room: &str, message: &str) {
        for line in message.lines() {
            if let Some(json) = line.strip_prefix("|request|") {
                if json.is_empty() {
                    continue;
                }
                match serde_json::from_str::<Value>(json) {
                    Ok(request) => self.answer_request(room, &request).await,
                    Err(e) => tracing::warn!(room, error = %e, "Bad request payload"),
                }
            } else if line.starts_with("|win|") || line == "|tie" {
                self.active.remove(room);
                self.finished += 1;
                tracing::info!(room, finished = self.finished, "Battle over");
                if let Err(e) = self.handle.leave(room).await {
                    tracing::error!(room, error = %e, "Failed to leave");
                }
                self.challenge_if_needed().await;
            }
        }
    }
}

fn config(user_var: &str, pass_var: &str) -> Result<EngineConfig> {
    let config = EngineConfig::new(
        env::var(user_var).with_context(|| format!("Set {}", user_var))?,
        env::var(pass_var).with_context(|| format!("Set {}", pass_var))?,
        env::var("PS_SERVER").unwrap_or_else(|_| "localhost:8000".to_string()),
    );
    Ok(config.with_authentication_address(env::var("PS_AUTH").context("Set PS_AUTH")?))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Ok(path) = env::var("PS_MOVES") {
        MoveCatalog::load(&path)?.install()?;
    }

    let challenger_config = config("PS_USER1", "PS_PASS1")?;
    let waiter_config = config("PS_USER2", "PS_PASS2")?;
    let opponent = waiter_config.username.clone();

    let mut challenger = ProtocolEngine::new(challenger_config)?;
    let mut waiter = ProtocolEngine::new(waiter_config)?;
    challenger.connect().await?;
    waiter.connect().await?;

    let mut challenging = RandomPlayer::new(challenger.handle(), Mode::Challenge { opponent });
    let mut waiting = RandomPlayer::new(waiter.handle(), Mode::Wait);

    tokio::try_join!(challenger.run(&mut challenging), waiter.run(&mut waiting))?;
    tracing::info!("Done");
    Ok(())
}
