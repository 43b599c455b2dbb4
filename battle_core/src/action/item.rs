//! Item - Consumable actions with numeric payloads and optional status effects

use super::mystery::MysteryTable;
use super::Action;
use crate::effect::EffectRecipe;
use crate::engine::TurnContext;
use crate::stats::Stat;
use crate::types::Side;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Numeric effects of an item; every present field is applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPayload {
    #[serde(default)]
    pub heal: Option<i32>,
    #[serde(default)]
    pub damage: Option<i32>,
    /// Permanent stat deltas keyed by stat name (e.g. "ATK")
    #[serde(default)]
    pub stat_changes: BTreeMap<String, i32>,
}

impl ItemPayload {
    pub fn heal(amount: i32) -> Self {
        ItemPayload {
            heal: Some(amount),
            ..Default::default()
        }
    }

    pub fn damage(amount: i32) -> Self {
        ItemPayload {
            damage: Some(amount),
            ..Default::default()
        }
    }

    pub fn with_stat_change(mut self, stat: impl Into<String>, delta: i32) -> Self {
        self.stat_changes.insert(stat.into(), delta);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.heal.is_none() && self.damage.is_none() && self.stat_changes.is_empty()
    }

    /// Apply heal, then damage, then stat deltas (in stat-name order) to `target`
    pub(crate) fn apply(&self, target: Side, ctx: &mut TurnContext<'_>) {
        if let Some(amount) = self.heal {
            let recipient = ctx.combatant_mut(target);
            let healed = recipient.heal(amount);
            let line = format!("{} recovers {} HP.", recipient.name(), healed);
            ctx.log.push(line);
        }

        if let Some(amount) = self.damage {
            let recipient = ctx.combatant_mut(target);
            let dealt = recipient.take_damage(amount);
            let hit = format!("{} takes {} damage.", recipient.name(), dealt);
            let defeat = (!recipient.is_alive()).then(|| format!("{} was defeated!", recipient.name()));
            ctx.log.push(hit);
            if let Some(line) = defeat {
                ctx.log.push(line);
            }
        }

        for (stat_name, delta) in &self.stat_changes {
            let stat = match stat_name.parse::<Stat>() {
                Ok(stat) => stat,
                Err(err) => {
                    warn!(%err, "stat change ignored");
                    continue;
                }
            };
            if *delta == 0 {
                continue;
            }

            let recipient = ctx.combatant_mut(target);
            let value = recipient.modify_stat(stat, *delta);
            let direction = if *delta > 0 { "rose" } else { "fell" };
            let line = format!(
                "{}'s {} {} by {} (now {}).",
                recipient.name(),
                stat,
                direction,
                delta.unsigned_abs(),
                value
            );
            ctx.log.push(line);
        }
    }
}

/// The item flavor: which status effect, if any, the item attaches.
///
/// In data files a fixed effect is written as its recipe, so `kind` is one of
/// `none`, `mystery` or any [`EffectRecipe`] kind (`poison`, `freeze`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemEffect {
    /// Plain item: payload only
    #[default]
    None,
    /// Weighted random outcome, see [`MysteryTable`]
    Mystery(MysteryTable),
    /// A fixed effect put on the target
    #[serde(untagged)]
    Status(EffectRecipe),
}

impl From<EffectRecipe> for ItemEffect {
    fn from(recipe: EffectRecipe) -> Self {
        ItemEffect::Status(recipe)
    }
}

impl From<MysteryTable> for ItemEffect {
    fn from(table: MysteryTable) -> Self {
        ItemEffect::Mystery(table)
    }
}

impl ItemEffect {
    /// Effect recipe for the fixed-outcome flavors
    pub fn recipe(&self) -> Option<&EffectRecipe> {
        match self {
            ItemEffect::Status(recipe) => Some(recipe),
            ItemEffect::None | ItemEffect::Mystery(_) => None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            ItemEffect::None => Ok(()),
            ItemEffect::Mystery(table) => table.validate(),
            ItemEffect::Status(recipe) => recipe.validate(),
        }
    }

    pub(crate) fn attach(&self, action: &Action, source: Side, target: Side, ctx: &mut TurnContext<'_>) {
        match self {
            ItemEffect::None => {}
            ItemEffect::Mystery(table) => table.resolve(action, source, target, ctx),
            ItemEffect::Status(recipe) => {
                let effect = recipe.build(&mut *ctx.rng);
                ctx.attach_effect(target, effect);
            }
        }
    }
}

pub(crate) fn default_consumable() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub payload: ItemPayload,
    /// Removed from the user's actions after use
    #[serde(default = "default_consumable")]
    pub consumable: bool,
    #[serde(default)]
    pub effect: ItemEffect,
}

impl Item {
    /// A consumable item with no status effect
    pub fn new(payload: ItemPayload) -> Self {
        Item {
            payload,
            consumable: true,
            effect: ItemEffect::None,
        }
    }

    pub fn with_effect(mut self, effect: impl Into<ItemEffect>) -> Self {
        self.effect = effect.into();
        self
    }

    pub fn reusable(mut self) -> Self {
        self.consumable = false;
        self
    }

    /// Status effect first, then the payload, then consumption
    pub(crate) fn resolve(&self, action: &Action, source: Side, target: Side, ctx: &mut TurnContext<'_>) {
        let user = ctx.combatant(source).name().to_string();
        ctx.log.push(format!("{} uses {}!", user, action.name));

        self.effect.attach(action, source, target, ctx);
        self.payload.apply(target, ctx);

        if self.consumable && ctx.combatant_mut(source).remove_action(&action.id) {
            debug!(combatant = %user, item = %action.id, "item consumed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionKind, Attack, DamageFormula};
    use crate::combatant::Combatant;
    use crate::engine::BattleEngine;
    use crate::effect::TurnRange;
    use crate::stats::StatBlock;
    use rand::rngs::mock::StepRng;

    fn engine_with(hero_actions: Vec<Action>) -> BattleEngine {
        let mut engine = BattleEngine::new(
            Combatant::new("Hero", 100, StatBlock::new(14, 6, 14)).with_actions(hero_actions),
            Combatant::new("Goblin", 80, StatBlock::new(12, 4, 10)),
        )
        .with_rng(StepRng::new(0, 0));
        engine.start_battle();
        engine
    }

    #[tokio::test]
    async fn test_payload_order_heal_damage_stats() {
        let payload = ItemPayload {
            heal: Some(10),
            damage: Some(15),
            stat_changes: BTreeMap::from([("SPD".to_string(), -2), ("ATK".to_string(), 3)]),
        };
        let odd = Action::item("odd", "Odd Brew", Item::new(payload)).with_default_target(crate::types::TargetKind::User);
        let mut engine = engine_with(vec![odd.clone()]);
        engine.combatant_mut(Side::A).take_damage(5);
        let start = engine.log().len();

        odd.execute(Side::A, Side::A, &mut engine).await;

        let lines = &engine.log().entries()[start..];
        assert_eq!(lines[0], "Hero uses Odd Brew!");
        assert_eq!(lines[1], "Hero recovers 5 HP.");
        assert_eq!(lines[2], "Hero takes 15 damage.");
        assert_eq!(lines[3], "Hero's ATK rose by 3 (now 17).");
        assert_eq!(lines[4], "Hero's SPD fell by 2 (now 12).");
        assert_eq!(engine.combatant(Side::A).current_hp(), 85);
    }

    #[tokio::test]
    async fn test_consumable_removed_once() {
        let potion = Action::item("potion", "Potion", Item::new(ItemPayload::heal(20)));
        let mut engine = engine_with(vec![potion.clone()]);

        potion.execute(Side::A, Side::A, &mut engine).await;
        potion.execute(Side::A, Side::A, &mut engine).await;

        let count = engine
            .combatant(Side::A)
            .available_actions()
            .iter()
            .filter(|a| a.id == "potion")
            .count();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_reusable_item_stays() {
        let charm = Action::item("charm", "Charm", Item::new(ItemPayload::damage(3)).reusable());
        let mut engine = engine_with(vec![charm.clone()]);

        charm.execute(Side::A, Side::B, &mut engine).await;
        assert!(engine.combatant(Side::A).find_action("charm").is_some());
        assert_eq!(engine.combatant(Side::B).current_hp(), 77);
    }

    #[tokio::test]
    async fn test_unknown_stat_is_skipped() {
        let item = Item::new(ItemPayload::default().with_stat_change("CHARISMA", 5).with_stat_change("DEF", 1));
        let tonic = Action::item("tonic", "Tonic", item);
        let mut engine = engine_with(vec![tonic.clone()]);

        tonic.execute(Side::A, Side::A, &mut engine).await;
        assert_eq!(engine.combatant(Side::A).base_stats().def, 7);
        assert!(!engine.log().contains("CHARISMA"));
    }

    #[tokio::test]
    async fn test_poison_item_attaches_before_payload() {
        let item = Item::new(ItemPayload::damage(4)).with_effect(EffectRecipe::Poison {
            damage: 5,
            turns: TurnRange::new(2, 5),
        });
        let vial = Action::item("vial", "Poison Vial", item);
        let mut engine = engine_with(vec![vial.clone()]);
        let start = engine.log().len();

        vial.execute(Side::A, Side::B, &mut engine).await;

        let lines = &engine.log().entries()[start..];
        assert_eq!(lines[1], "Goblin is poisoned!");
        assert_eq!(lines[2], "Goblin takes 4 damage.");
        let poison = engine.combatant(Side::B).effect("Poison").cloned().unwrap();
        assert_eq!(poison.remaining_turns, 2);
        assert_eq!(poison.owner(), Some(Side::B));
    }

    #[test]
    fn test_item_effect_validation() {
        assert!(ItemEffect::None.validate().is_ok());
        let bad = ItemEffect::from(EffectRecipe::Freeze {
            turns: TurnRange::new(3, 1),
        });
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_item_toml_defaults() {
        let item: Item = toml::from_str(
            "[payload]\nheal = 30\n\n[effect]\nkind = \"regeneration\"\nheal = 6\nturns = { min = 3, max = 5 }",
        )
        .unwrap();
        assert!(item.consumable);
        assert_eq!(item.payload.heal, Some(30));
        assert!(matches!(
            item.effect,
            ItemEffect::Status(EffectRecipe::Regeneration { heal: 6, .. })
        ));
    }

    #[test]
    fn test_item_effect_kinds_share_one_key() {
        let burn: Item = toml::from_str("[effect]\nkind = \"burn\"\ndamage = 8\nturns = { min = 2, max = 3 }").unwrap();
        assert_eq!(
            burn.effect.recipe(),
            Some(&EffectRecipe::Burn {
                damage: 8,
                def_penalty: 2,
                turns: TurnRange::new(2, 3),
            })
        );

        let plain: Item = toml::from_str("[effect]\nkind = \"none\"").unwrap();
        assert_eq!(plain.effect, ItemEffect::None);

        let mystery: Item = toml::from_str(
            "[effect]\nkind = \"mystery\"\n\n[[effect.branches]]\nlabel = \"Chill\"\nweight = 1.0\neffect = { kind = \"freeze\", turns = { min = 1, max = 1 } }",
        )
        .unwrap();
        assert!(matches!(mystery.effect, ItemEffect::Mystery(ref table) if table.branches.len() == 1));

        assert!(toml::from_str::<Item>("[effect]\nkind = \"lightning\"").is_err());
    }

    #[tokio::test]
    async fn test_attack_after_boundless_boost_saturates() {
        let rage = Action::item(
            "rage",
            "Rage Draught",
            Item::new(ItemPayload::default().with_stat_change("ATK", i32::MAX)).reusable(),
        );
        let mut engine = engine_with(vec![rage.clone()]);

        rage.execute(Side::A, Side::A, &mut engine).await;
        rage.execute(Side::A, Side::A, &mut engine).await;
        assert_eq!(engine.combatant(Side::A).stat(Stat::Atk), i32::MAX);

        let smash = Action::new(
            "smash",
            "Smash",
            ActionKind::Attack(Attack::new(6, DamageFormula::AttackVsDefense)),
        );
        smash.execute(Side::A, Side::B, &mut engine).await;
        assert!(!engine.combatant(Side::B).is_alive());
    }

    #[tokio::test]
    async fn test_boundless_drain_is_logged() {
        let drain = Action::item(
            "drain",
            "Drain",
            Item::new(ItemPayload::default().with_stat_change("DEF", i32::MIN)),
        );
        let mut engine = engine_with(vec![drain.clone()]);

        drain.execute(Side::A, Side::B, &mut engine).await;
        assert_eq!(engine.combatant(Side::B).stat(Stat::Def), i32::MIN + 4);
        assert!(engine.log().contains("Goblin's DEF fell by 2147483648"));
    }
}
