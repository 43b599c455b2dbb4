//! Battle Demo - A headless duel demonstrating battle_core end to end
//!
//! This demo shows:
//! - Building combatants from TOML templates and the action catalog
//! - Driving turns through BattleSequence with a simple action policy
//! - Awaited presentation effects and an automatic target selector
//! - Waiting on the battle outcome
//!
//! Usage: `battle_demo [seed] [config_dir]`. With a config directory, `battle.toml`,
//! `actions.toml` and `combatants.toml` are read from it instead of the bundled data.

use async_trait::async_trait;
use battle_core::config::{load_action_catalog, load_battle_config, load_combatant_templates};
use battle_core::prelude::*;
use battle_core::{CombatantTemplate, ConfigError};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Safety net for battles where nobody can land a blow
const MAX_TURNS: u32 = 200;

/// Heal when below this share of max HP
const LOW_HP_RATIO: f64 = 0.4;

/// Prints a short flourish for each action and waits before the turn continues
struct ConsoleFlourish {
    delay: Duration,
}

#[async_trait]
impl PresentationEffect for ConsoleFlourish {
    async fn play(&self, source: &Combatant, target: &Combatant, _engine: &BattleEngine) {
        println!(
            "    ~ {} -> {} ({}/{} HP)",
            source.name(),
            target.name(),
            target.current_hp(),
            target.max_hp()
        );
        tokio::time::sleep(self.delay).await;
    }
}

/// Always aims at whoever is not acting
struct OpponentSelector {
    acting: Mutex<Side>,
}

impl OpponentSelector {
    fn set_acting(&self, side: Side) {
        if let Ok(mut acting) = self.acting.lock() {
            *acting = side;
        }
    }
}

#[async_trait]
impl TargetSelector for OpponentSelector {
    async fn select_target(&self, action: &Action, candidates: &[TargetCandidate]) -> Side {
        let acting = self.acting.lock().map(|side| *side).unwrap_or(Side::A);
        let choice = candidates
            .iter()
            .find(|c| c.side != acting)
            .or_else(|| candidates.first())
            .map_or(acting.opponent(), |c| c.side);
        info!(action = %action.name, target = %choice, "target selected");
        choice
    }
}

/// Content used for one demo run
struct Setup {
    config: BattleConfig,
    catalog: ActionCatalog,
    templates: HashMap<String, CombatantTemplate>,
}

fn load_setup(dir: Option<&Path>) -> Result<Setup, ConfigError> {
    match dir {
        Some(dir) => Ok(Setup {
            config: load_battle_config(&dir.join("battle.toml"))?,
            catalog: load_action_catalog(&dir.join("actions.toml"))?,
            templates: load_combatant_templates(&dir.join("combatants.toml"))?,
        }),
        None => Ok(Setup {
            config: BattleConfig::default(),
            catalog: ActionCatalog::with_defaults(),
            templates: default_combatants(),
        }),
    }
}

/// Hero against goblin when both exist, otherwise the first two templates by id
fn pick_fighters(setup: &Setup) -> Result<(Combatant, Combatant), Box<dyn Error>> {
    let mut ids: Vec<&String> = setup.templates.keys().collect();
    ids.sort();
    let (Some(first), Some(second)) = (ids.first(), ids.get(1)) else {
        return Err("need at least two combatant templates".into());
    };

    // Bundled data pits the hero against the goblin
    let (a, b) = match (setup.templates.get("hero"), setup.templates.get("goblin")) {
        (Some(hero), Some(goblin)) => (hero, goblin),
        _ => (&setup.templates[*first], &setup.templates[*second]),
    };
    Ok((a.build(&setup.catalog)?, b.build(&setup.catalog)?))
}

/// Heal when low, otherwise pick any non-healing action at random
fn choose_action<'a>(combatant: &'a Combatant, rng: &mut impl Rng) -> Option<&'a Action> {
    let heals = |action: &&Action| action.as_item().is_some_and(|item| item.payload.heal.is_some());

    let hp_ratio = f64::from(combatant.current_hp()) / f64::from(combatant.max_hp().max(1));
    if hp_ratio < LOW_HP_RATIO {
        if let Some(action) = combatant.available_actions().iter().find(heals) {
            return Some(action);
        }
    }

    let offensive: Vec<&Action> = combatant
        .available_actions()
        .iter()
        .filter(|action| !heals(action))
        .collect();
    offensive.choose(rng).copied()
}

fn print_new_lines(log: &BattleLog, printed: &mut usize) {
    for line in &log.entries()[*printed..] {
        println!("  {}", line);
    }
    *printed = log.len();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // Battle log lines are printed below; enable `battle_core::log=info` to trace them too
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,battle_core::log=warn")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = match args.next() {
        Some(raw) => raw.parse()?,
        None => 42,
    };
    let config_dir = args.next().map(PathBuf::from);

    let mut setup = load_setup(config_dir.as_deref())?;
    setup.catalog.set_default_presentation(Arc::new(ConsoleFlourish {
        delay: Duration::from_millis(40),
    }));
    let (hero, foe) = pick_fighters(&setup)?;
    info!(
        seed,
        a = %hero.name(),
        a_sprite = %hero.sprite(),
        b = %foe.name(),
        b_sprite = %foe.sprite(),
        "starting demo battle"
    );

    let selector = Arc::new(OpponentSelector {
        acting: Mutex::new(Side::A),
    });
    let mut sequence = BattleSequence::new(hero, foe)
        .with_config(setup.config.clone())
        .with_rng(ChaCha8Rng::seed_from_u64(seed))
        .with_target_selector(selector.clone());
    let mut policy_rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));

    let handle = sequence.start()?;
    let mut printed = 0;
    print_new_lines(sequence.log(), &mut printed);

    while let Some(actor) = sequence.next_actor() {
        if sequence.engine().turns_taken() >= MAX_TURNS {
            warn!(turns = MAX_TURNS, "turn limit reached, stopping");
            break;
        }

        selector.set_acting(actor);
        let action = choose_action(sequence.engine().combatant(actor), &mut policy_rng).cloned();
        match action {
            Some(action) => sequence.process_turn(actor, &action, None).await?,
            None => sequence.pass_turn(actor).await,
        }
        print_new_lines(sequence.log(), &mut printed);
    }

    match handle.try_outcome() {
        Some(_) => {
            let outcome = handle.outcome().await?;
            println!();
            println!(
                "{} defeated {} (side {} lost)",
                outcome.winner.name(),
                outcome.loser.name(),
                outcome.loser_side
            );
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        None => println!("No winner after {} turns.", sequence.engine().turns_taken()),
    }

    Ok(())
}
