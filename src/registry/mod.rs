//! The logic registry: card-specific behavior, keyed by name.
//!
//! The engine core knows zones, phases and the damage pipeline; everything
//! a particular card does lives here as a registered callback. Keys are the
//! card's canonical name ("Nest Ball"), optionally suffixed with the attack
//! or ability name or a modifier context ("Charizard ex:Burning Darkness",
//! "Klefki:ability_lock"). Name keys make every printing of a card share
//! one handler, which is also how action deduplication treats them.
//!
//! The registry is built once at startup and shared read-only across games.
//! Callbacks receive the mutable state as an argument and capture nothing
//! mutable.

use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::warn;

use crate::cards::{CardDatabase, CardInstance};
use crate::core::{Action, CardId, GameState, PlayerId, StatusCondition};
use crate::effects::EffectResult;

/// What an attack callback decided. The engine feeds this into the damage
/// pipeline and status application.
#[derive(Clone, Debug, Default)]
pub struct AttackResult {
    /// Overrides the attack's printed base damage when set.
    pub damage: Option<i32>,
    pub defender_status: Option<StatusCondition>,
    pub self_status: Option<StatusCondition>,
    /// Extra damage counters placed outside the pipeline: (target, counters).
    pub bench_damage: Vec<(CardId, i32)>,
    pub message: String,
}

/// Outcome of an activatable ability. Steps are pushed directly onto the
/// state by the callback.
#[derive(Clone, Debug)]
pub struct AbilityResult {
    pub success: bool,
    pub message: String,
}

impl AbilityResult {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            message: String::new(),
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Everything a trainer handler needs, in one borrow.
///
/// The `action` carries the chosen target for targeted trainers; the `card`
/// is the instance already taken from hand (the engine discards it after a
/// successful handler).
pub struct TrainerContext<'a> {
    pub state: &'a mut GameState,
    pub db: &'a CardDatabase,
    pub card: &'a CardInstance,
    pub action: &'a Action,
    pub player: PlayerId,
}

/// How a generator's output is used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratorMode {
    /// `valid` gates a single engine-synthesized action.
    ValidityCheck,
    /// `actions` are emitted verbatim, one per target.
    ActionGeneration,
}

/// Candidate actions (or a validity verdict) for playing a card.
#[derive(Clone, Debug)]
pub struct GeneratorResult {
    pub valid: bool,
    pub mode: GeneratorMode,
    pub actions: Vec<Action>,
    pub reason: String,
}

impl GeneratorResult {
    #[must_use]
    pub fn valid() -> Self {
        Self {
            valid: true,
            mode: GeneratorMode::ValidityCheck,
            actions: Vec::new(),
            reason: String::new(),
        }
    }

    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            mode: GeneratorMode::ValidityCheck,
            actions: Vec::new(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn actions(actions: Vec<Action>) -> Self {
        Self {
            valid: !actions.is_empty(),
            mode: GeneratorMode::ActionGeneration,
            actions,
            reason: String::new(),
        }
    }
}

pub type AttackCallback = Arc<
    dyn Fn(&mut GameState, &CardDatabase, &CardInstance, &str, Option<&CardInstance>) -> AttackResult
        + Send
        + Sync,
>;
pub type AbilityCallback =
    Arc<dyn Fn(&mut GameState, &CardDatabase, &CardInstance, &str) -> AbilityResult + Send + Sync>;
pub type TrainerCallback =
    Arc<dyn for<'a> Fn(TrainerContext<'a>) -> EffectResult + Send + Sync>;
pub type PassiveCondition = Arc<dyn Fn(&GameState, &CardInstance) -> bool + Send + Sync>;
/// Returns true when the queried ability on `target` is blocked.
pub type PassiveEffect =
    Arc<dyn Fn(&GameState, &CardInstance, &CardInstance, &str) -> bool + Send + Sync>;
pub type ModifierCallback = Arc<dyn Fn(&GameState, &str, i32) -> i32 + Send + Sync>;
/// Returns false to block the action.
pub type GuardCallback = Arc<dyn Fn(&GameState, &Action) -> bool + Send + Sync>;
/// Returns true to cancel the event.
pub type HookCallback =
    Arc<dyn Fn(&mut GameState, &CardDatabase, &str, &CardId) -> bool + Send + Sync>;
pub type GeneratorCallback =
    Arc<dyn Fn(&GameState, &CardDatabase, &CardInstance) -> GeneratorResult + Send + Sync>;
pub type StadiumHook = Arc<dyn Fn(&mut GameState, &CardDatabase, PlayerId) + Send + Sync>;
pub type BenchSizeFn = Arc<dyn Fn(&GameState, &CardDatabase, PlayerId) -> usize + Send + Sync>;
pub type StadiumCondition = Arc<dyn Fn(&GameState, &CardDatabase, PlayerId) -> bool + Send + Sync>;

/// A stadium's continuous and one-shot behavior.
#[derive(Clone, Default)]
pub struct StadiumHandler {
    pub on_enter: Option<StadiumHook>,
    pub on_leave: Option<StadiumHook>,
    /// Continuous bench-size override, consulted only when `condition`
    /// passes for the queried player.
    pub bench_size: Option<BenchSizeFn>,
    pub condition: Option<StadiumCondition>,
}

/// A passive ability: a condition plus a blocking effect, scanned from the
/// active slots.
#[derive(Clone)]
pub struct PassiveHandler {
    pub condition: PassiveCondition,
    pub effect: PassiveEffect,
}

/// All registered card behavior. Immutable after startup.
#[derive(Clone, Default)]
pub struct LogicRegistry {
    attacks: FxHashMap<String, AttackCallback>,
    abilities: FxHashMap<String, AbilityCallback>,
    trainers: FxHashMap<String, TrainerCallback>,
    stadiums: FxHashMap<String, StadiumHandler>,
    passives: FxHashMap<String, PassiveHandler>,
    modifiers: FxHashMap<String, Vec<ModifierCallback>>,
    guards: FxHashMap<String, GuardCallback>,
    hooks: FxHashMap<String, Vec<HookCallback>>,
    generators: FxHashMap<String, GeneratorCallback>,
}

impl LogicRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Registration ===

    pub fn register_attack(
        &mut self,
        card_name: &str,
        attack_name: &str,
        callback: impl Fn(&mut GameState, &CardDatabase, &CardInstance, &str, Option<&CardInstance>) -> AttackResult
            + Send
            + Sync
            + 'static,
    ) {
        self.attacks
            .insert(format!("{card_name}:{attack_name}"), Arc::new(callback));
    }

    pub fn register_ability(
        &mut self,
        card_name: &str,
        ability_name: &str,
        callback: impl Fn(&mut GameState, &CardDatabase, &CardInstance, &str) -> AbilityResult
            + Send
            + Sync
            + 'static,
    ) {
        self.abilities
            .insert(format!("{card_name}:{ability_name}"), Arc::new(callback));
    }

    pub fn register_trainer(
        &mut self,
        card_name: &str,
        callback: impl for<'a> Fn(TrainerContext<'a>) -> EffectResult + Send + Sync + 'static,
    ) {
        self.trainers.insert(card_name.to_string(), Arc::new(callback));
    }

    pub fn register_stadium(&mut self, card_name: &str, handler: StadiumHandler) {
        self.stadiums.insert(card_name.to_string(), handler);
    }

    pub fn register_passive(&mut self, card_name: &str, handler: PassiveHandler) {
        self.passives.insert(card_name.to_string(), handler);
    }

    /// Modifiers stack: registration order is application order.
    pub fn register_modifier(
        &mut self,
        card_name: &str,
        context: &str,
        callback: impl Fn(&GameState, &str, i32) -> i32 + Send + Sync + 'static,
    ) {
        self.modifiers
            .entry(format!("{card_name}:{context}"))
            .or_default()
            .push(Arc::new(callback));
    }

    pub fn register_guard(
        &mut self,
        card_name: &str,
        context: &str,
        callback: impl Fn(&GameState, &Action) -> bool + Send + Sync + 'static,
    ) {
        self.guards
            .insert(format!("{card_name}:{context}"), Arc::new(callback));
    }

    pub fn register_hook(
        &mut self,
        card_name: &str,
        event: &str,
        callback: impl Fn(&mut GameState, &CardDatabase, &str, &CardId) -> bool + Send + Sync + 'static,
    ) {
        self.hooks
            .entry(format!("{card_name}:{event}"))
            .or_default()
            .push(Arc::new(callback));
    }

    pub fn register_generator(
        &mut self,
        card_name: &str,
        callback: impl Fn(&GameState, &CardDatabase, &CardInstance) -> GeneratorResult
            + Send
            + Sync
            + 'static,
    ) {
        self.generators.insert(card_name.to_string(), Arc::new(callback));
    }

    // === Lookup ===

    #[must_use]
    pub fn attack(&self, card_name: &str, attack_name: &str) -> Option<&AttackCallback> {
        self.attacks.get(&format!("{card_name}:{attack_name}"))
    }

    #[must_use]
    pub fn ability(&self, card_name: &str, ability_name: &str) -> Option<&AbilityCallback> {
        self.abilities.get(&format!("{card_name}:{ability_name}"))
    }

    #[must_use]
    pub fn trainer(&self, card_name: &str) -> Option<&TrainerCallback> {
        self.trainers.get(card_name)
    }

    #[must_use]
    pub fn stadium(&self, card_name: &str) -> Option<&StadiumHandler> {
        self.stadiums.get(card_name)
    }

    #[must_use]
    pub fn generator(&self, card_name: &str) -> Option<&GeneratorCallback> {
        self.generators.get(card_name)
    }

    #[must_use]
    pub fn has_trainer(&self, card_name: &str) -> bool {
        self.trainers.contains_key(card_name)
    }

    // === Invocation ===

    /// Run a trainer handler; an unregistered trainer is a warn-and-fail so
    /// the triggering play is rejected rather than silently eating the card.
    pub fn invoke_trainer(&self, card_name: &str, ctx: TrainerContext<'_>) -> EffectResult {
        match self.trainers.get(card_name) {
            Some(handler) => handler(ctx),
            None => {
                warn!(card = card_name, "no trainer handler registered");
                EffectResult::failed(format!("no handler for {card_name}"))
            }
        }
    }

    /// Hook invocation keyed by card name and event. Returns true if any
    /// hook cancelled the event.
    pub fn fire_hooks(
        &self,
        state: &mut GameState,
        db: &CardDatabase,
        card_name: &str,
        event: &str,
        subject: &CardId,
    ) -> bool {
        let Some(hooks) = self.hooks.get(&format!("{card_name}:{event}")) else {
            return false;
        };
        let mut cancelled = false;
        for hook in hooks {
            cancelled |= hook(state, db, event, subject);
        }
        cancelled
    }

    // === Board-wide scans ===

    /// Every in-play card that can carry a continuous effect: both actives,
    /// both benches, then the stadium.
    fn scan_names<'a>(&self, state: &'a GameState, db: &'a CardDatabase) -> Vec<&'a str> {
        let mut names = Vec::new();
        for player in &state.players {
            for poke in player.board.all_pokemon() {
                if let Some(def) = db.get(&poke.card_def_id) {
                    names.push(def.name.as_str());
                }
            }
        }
        if let Some(stadium) = &state.stadium {
            if let Some(def) = db.get(&stadium.card_def_id) {
                names.push(def.name.as_str());
            }
        }
        names
    }

    /// Fold `value` through every `context`-tagged modifier on the board,
    /// in scan order.
    #[must_use]
    pub fn scan_global_modifiers(
        &self,
        state: &GameState,
        db: &CardDatabase,
        context: &str,
        mut value: i32,
    ) -> i32 {
        for name in self.scan_names(state, db) {
            if let Some(callbacks) = self.modifiers.get(&format!("{name}:{context}")) {
                for callback in callbacks {
                    value = callback(state, context, value);
                }
            }
        }
        value
    }

    /// Per-card modifier chain (e.g. one Pokemon's `damage_dealt`).
    #[must_use]
    pub fn apply_modifiers(
        &self,
        state: &GameState,
        card_name: &str,
        context: &str,
        mut value: i32,
    ) -> i32 {
        if let Some(callbacks) = self.modifiers.get(&format!("{card_name}:{context}")) {
            for callback in callbacks {
                value = callback(state, context, value);
            }
        }
        value
    }

    /// True when any scanned guard blocks the action under `context`
    /// (e.g. `global_play_item` for item lock).
    #[must_use]
    pub fn check_global_block(
        &self,
        state: &GameState,
        db: &CardDatabase,
        context: &str,
        action: &Action,
    ) -> bool {
        for name in self.scan_names(state, db) {
            if let Some(guard) = self.guards.get(&format!("{name}:{context}")) {
                if !guard(state, action) {
                    return true;
                }
            }
        }
        false
    }

    /// Whether a passive on either active blocks `ability_name` on `target`.
    #[must_use]
    pub fn is_ability_blocked(
        &self,
        state: &GameState,
        db: &CardDatabase,
        target: &CardInstance,
        ability_name: &str,
    ) -> bool {
        for player in &state.players {
            let Some(active) = player.board.active.as_ref() else {
                continue;
            };
            let Some(def) = db.get(&active.card_def_id) else {
                continue;
            };
            let Some(passive) = self.passives.get(&def.name) else {
                continue;
            };
            if (passive.condition)(state, active)
                && (passive.effect)(state, active, target, ability_name)
            {
                return true;
            }
        }
        false
    }

    /// The effective bench limit for `player`, from the in-play stadium's
    /// continuous modifier. Falls back to the default when no stadium
    /// applies.
    #[must_use]
    pub fn bench_limit_for(&self, state: &GameState, db: &CardDatabase, player: PlayerId) -> usize {
        let default = crate::zones::DEFAULT_BENCH_LIMIT;
        let Some(stadium) = &state.stadium else {
            return default;
        };
        let Some(def) = db.get(&stadium.card_def_id) else {
            return default;
        };
        let Some(handler) = self.stadiums.get(&def.name) else {
            return default;
        };
        let applies = handler
            .condition
            .as_ref()
            .map_or(true, |cond| cond(state, db, player));
        if !applies {
            return default;
        }
        handler
            .bench_size
            .as_ref()
            .map_or(default, |f| f(state, db, player))
    }
}

impl std::fmt::Debug for LogicRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogicRegistry")
            .field("attacks", &self.attacks.len())
            .field("abilities", &self.abilities.len())
            .field("trainers", &self.trainers.len())
            .field("stadiums", &self.stadiums.len())
            .field("passives", &self.passives.len())
            .field("modifiers", &self.modifiers.len())
            .field("guards", &self.guards.len())
            .field("hooks", &self.hooks.len())
            .field("generators", &self.generators.len())
            .finish()
    }
}
