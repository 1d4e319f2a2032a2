//! The rules engine: game creation, setup, and action application.
//!
//! The engine itself is immutable during play. It borrows the card
//! database and logic registry behind `Arc` so one engine can drive many
//! concurrent games; all mutable state lives in the `GameState` passed to
//! every call. `step` clones before mutating, which is the MCTS contract:
//! a speculative action can never corrupt the parent node.

use std::sync::Arc;

use im::Vector;
use tracing::{debug, warn};

use crate::cards::{CardDatabase, CardDef, CardInstance};
use crate::core::{
    Action, ActionKind, CardDefId, CardId, GameOutcome, GamePhase, GameState, PlayerId,
};
use crate::error::{EngineError, EngineResult};
use crate::registry::{AttackResult, LogicRegistry, TrainerContext};

use super::config::{EngineConfig, MulliganBonus, TiePolicy};
use super::damage;

const HAND_SIZE: usize = 7;
const PRIZE_COUNT: usize = 6;

/// The rules engine. Cheap to clone; construct once per database/registry
/// pair and share.
#[derive(Clone)]
pub struct Engine {
    pub(crate) db: Arc<CardDatabase>,
    pub(crate) registry: Arc<LogicRegistry>,
    pub(crate) config: EngineConfig,
}

impl Engine {
    #[must_use]
    pub fn new(db: Arc<CardDatabase>, registry: Arc<LogicRegistry>) -> Self {
        Self::with_config(db, registry, EngineConfig::default())
    }

    #[must_use]
    pub fn with_config(
        db: Arc<CardDatabase>,
        registry: Arc<LogicRegistry>,
        config: EngineConfig,
    ) -> Self {
        Self {
            db,
            registry,
            config,
        }
    }

    #[must_use]
    pub fn database(&self) -> &CardDatabase {
        &self.db
    }

    #[must_use]
    pub fn registry(&self) -> &LogicRegistry {
        &self.registry
    }

    // === Game creation ===

    /// Materialize both decks into a fresh game state. Rejects any deck
    /// entry the database does not know.
    pub fn create_game(
        &self,
        deck0: &[CardDefId],
        deck1: &[CardDefId],
        seed: u64,
    ) -> EngineResult<GameState> {
        let mut state = GameState::new(seed);

        for (player, deck) in [(PlayerId::ZERO, deck0), (PlayerId::ONE, deck1)] {
            for (i, def_id) in deck.iter().enumerate() {
                if !self.db.has(def_id) {
                    return Err(EngineError::MissingDefinition(def_id.clone()));
                }
                let instance = CardInstance::new(
                    format!("p{}_{i}", player.0),
                    def_id.clone(),
                    player,
                );
                state.player_mut(player).deck.add_card(instance);
            }
            let db = &self.db;
            state.player_mut(player).record_deck_knowledge(db);
        }

        Ok(state)
    }

    /// Shuffle, pick who goes first, deal opening hands, resolve mulligans,
    /// lay prizes, and grant mulligan bonus draws.
    pub fn setup_initial_board(&self, state: &mut GameState) {
        let starting = if state.rng.flip_coin() {
            PlayerId::ZERO
        } else {
            PlayerId::ONE
        };
        state.starting_player = starting;
        state.active_player = starting;

        for player in PlayerId::both() {
            state.players[player.index()].deck.shuffle(&mut state.rng);
        }

        for player in PlayerId::both() {
            self.draw(state, player, HAND_SIZE);
        }

        let mut mulligans = [0u32; 2];
        for player in PlayerId::both() {
            while !self.hand_has_basic(state, player) {
                if !self.deck_or_hand_has_basic(state, player) {
                    warn!(player = %player, "deck contains no Basic Pokemon; skipping mulligans");
                    break;
                }
                self.redraw_hand(state, player);
                mulligans[player.index()] += 1;
            }
        }

        for player in PlayerId::both() {
            for _ in 0..PRIZE_COUNT {
                if let Some(card) = state.player_mut(player).deck.draw_top() {
                    state.player_mut(player).prizes.add_card(card);
                }
            }
        }

        for player in PlayerId::both() {
            let owed = mulligans[player.opponent().index()];
            if owed == 0 {
                continue;
            }
            match self.config.mulligan_bonus {
                MulliganBonus::Automatic => self.draw(state, player, owed as usize),
                MulliganBonus::PlayerChoice => {
                    state.player_mut(player).pending_mulligan_draws = owed as u8;
                }
            }
        }

        state.phase = GamePhase::Setup;
        state.turn_count = 0;
    }

    // === Stepping ===

    /// Apply an action to a copy of the state. The input is untouched.
    pub fn step(&self, state: &GameState, action: &Action) -> EngineResult<GameState> {
        let mut next = state.clone();
        self.step_inplace(&mut next, action)?;
        Ok(next)
    }

    /// In-place variant for rollouts that own their state.
    pub fn step_inplace(&self, state: &mut GameState, action: &Action) -> EngineResult<()> {
        if state.is_game_over() {
            return Err(EngineError::IllegalAction("game is over".to_string()));
        }
        if !self.legal_actions(state).contains(action) {
            return Err(EngineError::IllegalAction(format!(
                "{:?} is not legal in the current state",
                action.kind
            )));
        }

        state.record_action(action);
        self.apply_action(state, action)?;
        self.check_win_conditions(state);
        Ok(())
    }

    fn apply_action(&self, state: &mut GameState, action: &Action) -> EngineResult<()> {
        match action.kind {
            ActionKind::MulliganDraw => self.apply_mulligan_draw(state, action),
            ActionKind::RevealHandMulligan => self.apply_reveal_hand_mulligan(state, action),
            ActionKind::PlaceActive => self.apply_place_active(state, action),
            ActionKind::PlaceBench | ActionKind::PlayBasic => self.apply_play_basic(state, action),
            ActionKind::Evolve => self.apply_evolve(state, action),
            ActionKind::AttachEnergy => self.apply_attach_energy(state, action),
            ActionKind::PlayItem | ActionKind::PlaySupporter => {
                self.apply_play_trainer(state, action)
            }
            ActionKind::PlayStadium => self.apply_play_stadium(state, action),
            ActionKind::AttachTool => self.apply_attach_tool(state, action),
            ActionKind::UseAbility => self.apply_use_ability(state, action),
            ActionKind::Retreat => self.apply_retreat(state, action),
            ActionKind::Attack => self.apply_attack(state, action),
            ActionKind::EndTurn => self.apply_end_turn(state, action),
            ActionKind::PromoteActive => self.apply_promote_active(state, action),
            ActionKind::SelectCard => self.apply_select_card(state, action),
            ActionKind::ConfirmSelection => self.apply_confirm_selection(state, action),
        }
    }

    // === Setup and mulligan flow ===

    fn apply_mulligan_draw(&self, state: &mut GameState, action: &Action) -> EngineResult<()> {
        let player = action.player_id;
        self.draw(state, player, 1);
        let pending = &mut state.player_mut(player).pending_mulligan_draws;
        *pending = pending.saturating_sub(1);
        if state.player(player).pending_mulligan_draws == 0 {
            self.advance_mulligan(state);
        }
        Ok(())
    }

    fn apply_reveal_hand_mulligan(&self, state: &mut GameState, action: &Action) -> EngineResult<()> {
        let player = action.player_id;
        self.redraw_hand(state, player);
        match self.config.mulligan_bonus {
            MulliganBonus::Automatic => self.draw(state, player.opponent(), 1),
            MulliganBonus::PlayerChoice => {
                state.player_mut(player.opponent()).pending_mulligan_draws += 1;
            }
        }
        Ok(())
    }

    fn apply_place_active(&self, state: &mut GameState, action: &Action) -> EngineResult<()> {
        let player = action.player_id;
        let mut card = self.take_from_hand(state, player, action.card_id.as_ref())?;
        let def = self.def_of(&card)?.clone();
        card.current_hp = def.hp_or_zero();
        state.player_mut(player).board.active = Some(card);
        Ok(())
    }

    fn apply_play_basic(&self, state: &mut GameState, action: &Action) -> EngineResult<()> {
        let player = action.player_id;
        let mut card = self.take_from_hand(state, player, action.card_id.as_ref())?;
        let def = self.def_of(&card)?.clone();
        card.current_hp = def.hp_or_zero();
        let card_id = card.id.clone();

        if let Err(card) = state.player_mut(player).board.add_to_bench(card) {
            state.player_mut(player).hand.add_card(card);
            return Err(EngineError::IllegalAction("bench is full".to_string()));
        }

        self.registry
            .fire_hooks(state, &self.db, &def.name, "on_play", &card_id);
        self.recompute_bench_limits(state);
        Ok(())
    }

    // === Evolution ===

    fn apply_evolve(&self, state: &mut GameState, action: &Action) -> EngineResult<()> {
        let player = action.player_id;
        let evo_id = action
            .card_id
            .as_ref()
            .ok_or_else(|| EngineError::IllegalAction("evolve needs a card".to_string()))?;
        let target_id = action
            .target_id
            .as_ref()
            .ok_or_else(|| EngineError::IllegalAction("evolve needs a target".to_string()))?
            .clone();

        // A pending EvolveTarget step (Rare Candy) waives the stage and
        // sickness checks.
        let forced = matches!(
            state.top_step(),
            Some(crate::stack::ResolutionStep::EvolveTarget {
                base_id,
                evolution_card_id,
                ..
            }) if *base_id == target_id && evolution_card_id == evo_id
        );

        let evo = self.take_from_hand(state, player, Some(evo_id))?;
        let evo_def = self.def_of(&evo)?.clone();

        if !forced {
            let target_def_name = state
                .player(player)
                .find_pokemon(&target_id)
                .and_then(|poke| self.db.get(&poke.card_def_id))
                .map(|def| def.name.clone());
            let valid = target_def_name.as_deref() == evo_def.evolves_from.as_deref();
            if !valid {
                state.player_mut(player).hand.add_card(evo);
                return Err(EngineError::InvalidEvolution(format!(
                    "{} does not evolve from the chosen target",
                    evo_def.name
                )));
            }
        }

        if !evolve_in_place(state, player, &target_id, evo, &evo_def) {
            return Err(EngineError::MissingInstance(target_id));
        }

        if forced {
            state.pop_step();
        }

        // The evolved card carries the evolution's instance id.
        self.registry
            .fire_hooks(state, &self.db, &evo_def.name, "on_evolve", evo_id);
        self.recompute_bench_limits(state);
        Ok(())
    }

    // === Attachments ===

    fn apply_attach_energy(&self, state: &mut GameState, action: &Action) -> EngineResult<()> {
        let player = action.player_id;
        let target_id = action
            .target_id
            .as_ref()
            .ok_or_else(|| EngineError::IllegalAction("attach needs a target".to_string()))?
            .clone();
        let energy = self.take_from_hand(state, player, action.card_id.as_ref())?;

        let target_def_name = state
            .player(player)
            .find_pokemon(&target_id)
            .and_then(|poke| self.db.get(&poke.card_def_id))
            .map(|def| def.name.clone());

        match state.player_mut(player).find_pokemon_mut(&target_id) {
            Some(target) => target.attached_energy.push(energy),
            None => {
                state.player_mut(player).hand.add_card(energy);
                return Err(EngineError::MissingInstance(target_id));
            }
        }
        state.player_mut(player).energy_attached_this_turn = true;

        if let Some(name) = target_def_name {
            self.registry
                .fire_hooks(state, &self.db, &name, "on_attach_energy", &target_id);
        }
        Ok(())
    }

    fn apply_attach_tool(&self, state: &mut GameState, action: &Action) -> EngineResult<()> {
        let player = action.player_id;
        let target_id = action
            .target_id
            .as_ref()
            .ok_or_else(|| EngineError::IllegalAction("attach needs a target".to_string()))?
            .clone();
        let tool = self.take_from_hand(state, player, action.card_id.as_ref())?;

        match state.player_mut(player).find_pokemon_mut(&target_id) {
            Some(target) if target.attached_tools.is_empty() => {
                target.attached_tools.push(tool);
                Ok(())
            }
            Some(_) => {
                state.player_mut(player).hand.add_card(tool);
                Err(EngineError::InvalidTarget(
                    "target already holds a tool".to_string(),
                ))
            }
            None => {
                state.player_mut(player).hand.add_card(tool);
                Err(EngineError::MissingInstance(target_id))
            }
        }
    }

    // === Trainers ===

    fn apply_play_trainer(&self, state: &mut GameState, action: &Action) -> EngineResult<()> {
        let player = action.player_id;
        let card = self.take_from_hand(state, player, action.card_id.as_ref())?;
        let def = self.def_of(&card)?.clone();

        let result = self.registry.invoke_trainer(
            &def.name,
            TrainerContext {
                state,
                db: &self.db,
                card: &card,
                action,
                player,
            },
        );

        if !result.success {
            state.player_mut(player).hand.add_card(card);
            return Err(EngineError::IllegalAction(result.message));
        }

        state.player_mut(player).discard.add_card(card);
        if action.kind == ActionKind::PlaySupporter {
            state.player_mut(player).supporter_played_this_turn = true;
        }

        // Handler effects can place damage counters or change what is in
        // play, so knockouts and bench limits are settled here.
        self.process_knockouts(state);
        self.recompute_bench_limits(state);
        Ok(())
    }

    fn apply_play_stadium(&self, state: &mut GameState, action: &Action) -> EngineResult<()> {
        let player = action.player_id;
        let card = self.take_from_hand(state, player, action.card_id.as_ref())?;
        let def = self.def_of(&card)?.clone();

        // The outgoing stadium leaves first.
        if let Some(old) = state.stadium.take() {
            let old_name = self.db.get(&old.card_def_id).map(|d| d.name.clone());
            let owner = old.owner_id;
            state.player_mut(owner).discard.add_card(old);
            if let Some(name) = old_name {
                if let Some(handler) = self.registry.stadium(&name) {
                    if let Some(on_leave) = handler.on_leave.clone() {
                        on_leave(state, &self.db, owner);
                    }
                }
            }
        }

        state.stadium = Some(card);
        state.player_mut(player).stadium_played_this_turn = true;

        if let Some(handler) = self.registry.stadium(&def.name) {
            if let Some(on_enter) = handler.on_enter.clone() {
                on_enter(state, &self.db, player);
            }
        }
        self.recompute_bench_limits(state);
        Ok(())
    }

    // === Abilities ===

    fn apply_use_ability(&self, state: &mut GameState, action: &Action) -> EngineResult<()> {
        let player = action.player_id;
        let card_id = action
            .card_id
            .as_ref()
            .ok_or_else(|| EngineError::IllegalAction("ability needs a source".to_string()))?
            .clone();
        let ability_name = action
            .ability_name
            .as_deref()
            .ok_or_else(|| EngineError::IllegalAction("ability needs a name".to_string()))?;

        let poke = state
            .player(player)
            .find_pokemon(&card_id)
            .cloned()
            .ok_or_else(|| EngineError::MissingInstance(card_id.clone()))?;
        let def = self.def_of(&poke)?.clone();

        if let Some(marked) = state.player_mut(player).find_pokemon_mut(&card_id) {
            marked
                .abilities_used_this_turn
                .insert(ability_name.to_string());
        }

        let result = match self.registry.ability(&def.name, ability_name) {
            Some(callback) => callback(state, &self.db, &poke, ability_name),
            None => crate::registry::AbilityResult::failed(format!(
                "no handler for ability {ability_name}"
            )),
        };

        if !result.success {
            if let Some(marked) = state.player_mut(player).find_pokemon_mut(&card_id) {
                marked.abilities_used_this_turn.remove(ability_name);
            }
            return Err(EngineError::IllegalAction(result.message));
        }

        self.process_knockouts(state);
        self.recompute_bench_limits(state);
        Ok(())
    }

    // === Retreat ===

    fn apply_retreat(&self, state: &mut GameState, action: &Action) -> EngineResult<()> {
        let player = action.player_id;
        let bench_id = action
            .target_id
            .as_ref()
            .ok_or_else(|| EngineError::IllegalAction("retreat needs a bench target".to_string()))?
            .clone();

        let active_def = {
            let active = state
                .player(player)
                .board
                .active
                .as_ref()
                .ok_or_else(|| EngineError::IllegalAction("no active Pokemon".to_string()))?;
            self.def_of(active)?.clone()
        };
        let cost = damage::modified_retreat_cost(&self.registry, state, &self.db, &active_def);

        let board = &mut state.player_mut(player).board;
        let discarded: Vec<CardInstance> = {
            let active = board.active.as_mut().ok_or_else(|| {
                EngineError::IllegalAction("no active Pokemon".to_string())
            })?;
            if (active.total_attached_energy() as i32) < cost {
                return Err(EngineError::InsufficientEnergy("retreat".to_string()));
            }
            // Oldest attachments pay first.
            active.attached_energy.drain(..cost as usize).collect()
        };

        if !board.switch_active(&bench_id) {
            // Undo the energy payment; the bench target was bad.
            if let Some(active) = board.active.as_mut() {
                for card in discarded {
                    active.attached_energy.push(card);
                }
            }
            return Err(EngineError::InvalidTarget("bench target not found".to_string()));
        }

        for card in discarded {
            let owner = card.owner_id;
            state.player_mut(owner).discard.add_card(card);
        }
        state.player_mut(player).retreated_this_turn = true;
        Ok(())
    }

    // === Attack ===

    fn apply_attack(&self, state: &mut GameState, action: &Action) -> EngineResult<()> {
        let player = action.player_id;
        let opponent = player.opponent();
        let attack_name = action
            .attack_name
            .as_deref()
            .ok_or_else(|| EngineError::IllegalAction("attack needs a name".to_string()))?;

        let attacker = state
            .player(player)
            .board
            .active
            .clone()
            .ok_or_else(|| EngineError::IllegalAction("no active Pokemon".to_string()))?;
        let attacker_def = self.def_of(&attacker)?.clone();
        let attack = attacker_def
            .attacks
            .iter()
            .find(|a| a.name == attack_name)
            .ok_or_else(|| {
                EngineError::IllegalAction(format!("{} has no attack {attack_name}", attacker_def.name))
            })?
            .clone();

        if !damage::can_pay_cost(&attacker.provided_energy(&self.db), &attack.cost) {
            return Err(EngineError::InsufficientEnergy(attack_name.to_string()));
        }

        let defender = state.player(opponent).board.active.clone();
        let defender_def = match &defender {
            Some(d) => Some(self.def_of(d)?.clone()),
            None => None,
        };

        let result = match self.registry.attack(&attacker_def.name, attack_name) {
            Some(callback) => callback(state, &self.db, &attacker, attack_name, defender.as_ref()),
            None => AttackResult::default(),
        };

        let mut active_koed_by_damage = false;
        if let (Some(defender), Some(defender_def)) = (&defender, &defender_def) {
            let base = result.damage.unwrap_or(attack.base_damage);
            let final_damage = damage::compute_damage(
                &self.registry,
                state,
                &self.db,
                &attacker_def,
                defender_def,
                base,
            );
            let counters = final_damage / 10;
            if let Some(target) = state.player_mut(opponent).find_pokemon_mut(&defender.id) {
                target.damage_counters += counters;
                active_koed_by_damage =
                    counters > 0 && target.is_knocked_out(defender_def.hp_or_zero());
            }
            if let Some(status) = result.defender_status {
                if let Some(target) = state.player_mut(opponent).find_pokemon_mut(&defender.id) {
                    target.add_status(status);
                }
            }
        }
        if let Some(status) = result.self_status {
            if let Some(own) = state.player_mut(player).find_pokemon_mut(&attacker.id) {
                own.add_status(status);
            }
        }
        for (target_id, counters) in &result.bench_damage {
            let _ = crate::effects::add_damage_counters(state, target_id, *counters);
        }

        self.process_knockouts(state);
        if active_koed_by_damage {
            self.award_attack_bonus_prizes(state, player, &attacker_def);
        }
        self.end_turn_sequence(state);
        Ok(())
    }

    // === Knockouts and prizes ===

    /// Pay out effects that grant extra prizes when an attack knocks out
    /// the opposing active (Briar). An effect carrying an `extra_prizes`
    /// parameter for the attacking player pays once and is consumed;
    /// `requires_tera` limits the payout to Tera attackers.
    fn award_attack_bonus_prizes(
        &self,
        state: &mut GameState,
        player: PlayerId,
        attacker_def: &CardDef,
    ) {
        let mut remaining = Vector::new();
        let mut bonus: u8 = 0;
        for effect in std::mem::take(&mut state.active_effects) {
            let for_player = effect.target_player == Some(player);
            let extra = effect
                .parameters
                .get("extra_prizes")
                .and_then(|v| v.parse::<u8>().ok());
            let needs_tera = effect
                .parameters
                .get("requires_tera")
                .is_some_and(|v| v == "true");
            match extra {
                Some(n) if for_player && (!needs_tera || attacker_def.is_tera()) => bonus += n,
                _ => remaining.push_back(effect),
            }
        }
        state.active_effects = remaining;
        for _ in 0..bonus {
            if let Some(prize) = state.player_mut(player).prizes.draw_top() {
                state.player_mut(player).hand.add_card(prize);
                state.player_mut(player).prizes_taken += 1;
            }
        }
    }

    /// Sweep both boards for knocked-out Pokemon: discard them with every
    /// attachment, award prizes to the other player, fire hooks.
    pub(crate) fn process_knockouts(&self, state: &mut GameState) {
        for player in PlayerId::both().collect::<Vec<_>>() {
            let koed: Vec<(CardId, String, u8)> = state
                .player(player)
                .board
                .all_pokemon()
                .filter_map(|poke| {
                    let def = self.db.get(&poke.card_def_id)?;
                    poke.is_knocked_out(def.hp_or_zero())
                        .then(|| (poke.id.clone(), def.name.clone(), def.prize_value()))
                })
                .collect();

            for (id, def_name, prizes) in koed {
                let Some(poke) = state.player_mut(player).board.take_pokemon(&id) else {
                    continue;
                };
                debug!(pokemon = %def_name, owner = %player, "knocked out");
                self.discard_card_tree(state, poke);

                let scorer = player.opponent();
                for _ in 0..prizes {
                    if let Some(prize) = state.player_mut(scorer).prizes.draw_top() {
                        state.player_mut(scorer).hand.add_card(prize);
                        state.player_mut(scorer).prizes_taken += 1;
                    }
                }

                self.registry
                    .fire_hooks(state, &self.db, &def_name, "on_knockout", &id);
            }
        }
        self.recompute_bench_limits(state);
    }

    /// Flatten a Pokemon and everything under it into its owner's discard,
    /// each card as its own entry.
    pub(crate) fn discard_card_tree(&self, state: &mut GameState, mut card: CardInstance) {
        for energy in std::mem::take(&mut card.attached_energy) {
            let owner = energy.owner_id;
            state.player_mut(owner).discard.add_card(energy);
        }
        for tool in std::mem::take(&mut card.attached_tools) {
            let owner = tool.owner_id;
            state.player_mut(owner).discard.add_card(tool);
        }
        for stage in std::mem::take(&mut card.previous_stages) {
            self.discard_card_tree(state, stage);
        }
        let owner = card.owner_id;
        state.player_mut(owner).discard.add_card(card);
    }

    // === Turn flow ===

    fn apply_end_turn(&self, state: &mut GameState, action: &Action) -> EngineResult<()> {
        match state.phase {
            GamePhase::Setup => {
                self.finish_setup_pass(state, action.player_id);
                Ok(())
            }
            GamePhase::Mulligan => {
                state.player_mut(action.player_id).pending_mulligan_draws = 0;
                self.advance_mulligan(state);
                Ok(())
            }
            _ => {
                self.end_turn_sequence(state);
                Ok(())
            }
        }
    }

    fn finish_setup_pass(&self, state: &mut GameState, player: PlayerId) {
        if state.opponent(player).has_active() {
            self.begin_first_turn(state);
        } else {
            state.switch_active_player();
        }
    }

    fn begin_first_turn(&self, state: &mut GameState) {
        let pending = PlayerId::both()
            .any(|p| state.player(p).pending_mulligan_draws > 0);
        if pending && self.config.mulligan_bonus == MulliganBonus::PlayerChoice {
            state.phase = GamePhase::Mulligan;
            let first_pending = PlayerId::both()
                .find(|&p| state.player(p).pending_mulligan_draws > 0)
                .unwrap_or(state.starting_player);
            state.active_player = first_pending;
            return;
        }
        self.start_first_turn_proper(state);
    }

    fn advance_mulligan(&self, state: &mut GameState) {
        if let Some(next) = PlayerId::both().find(|&p| state.player(p).pending_mulligan_draws > 0) {
            state.active_player = next;
            return;
        }
        self.start_first_turn_proper(state);
    }

    fn start_first_turn_proper(&self, state: &mut GameState) {
        state.active_player = state.starting_player;
        state.turn_count = 1;
        state.phase = GamePhase::Draw;
        self.start_turn(state);
    }

    /// End the current turn and begin the next player's. Shared by
    /// `EndTurn` and the post-attack path.
    pub(crate) fn end_turn_sequence(&self, state: &mut GameState) {
        let ending = state.active_player;

        state.phase = GamePhase::Cleanup;
        for player in PlayerId::both().collect::<Vec<_>>() {
            state.player_mut(player).increment_turns_in_play();
        }
        if let Some(active) = state.player_mut(ending).board.active.as_mut() {
            active.attack_effects.clear();
        }
        state.expire_effects_for(ending);

        state.switch_active_player();
        state.turn_count += 1;
        state.phase = GamePhase::Draw;
        self.start_turn(state);
    }

    /// Draw phase: reset flags, check deck-out, draw one, enter Main.
    fn start_turn(&self, state: &mut GameState) {
        let player = state.active_player;
        state.player_mut(player).reset_turn_flags();
        self.recompute_bench_limits(state);

        if state.player(player).deck.is_empty() {
            self.declare_winner(state, player.opponent());
            return;
        }
        self.draw(state, player, 1);
        state.phase = GamePhase::Main;
    }

    fn apply_promote_active(&self, state: &mut GameState, action: &Action) -> EngineResult<()> {
        let player = action.player_id;
        let bench_id = action
            .card_id
            .as_ref()
            .ok_or_else(|| EngineError::IllegalAction("promote needs a target".to_string()))?;
        if state.player_mut(player).board.promote_to_active(bench_id) {
            Ok(())
        } else {
            Err(EngineError::InvalidTarget(
                "promotion target not on bench".to_string(),
            ))
        }
    }

    // === Win conditions ===

    /// Check prize-out and no-Pokemon wins for both players, applying the
    /// tie policy when both qualify on the same step.
    pub fn check_win_conditions(&self, state: &mut GameState) {
        if state.is_game_over() {
            return;
        }
        let in_battle = !matches!(state.phase, GamePhase::Setup | GamePhase::Mulligan)
            && state.turn_count >= 1;

        let mut winners = Vec::new();
        for player in PlayerId::both() {
            let opponent = state.opponent(player);
            let no_pokemon = in_battle && !opponent.has_any_pokemon_in_play();
            let prized_out =
                state.player(player).prizes.is_empty() && state.player(player).prizes_taken > 0;
            if no_pokemon || prized_out {
                winners.push(player);
            }
        }

        match winners.as_slice() {
            [] => {}
            [winner] => self.declare_winner(state, *winner),
            _ => match self.config.simultaneous_win {
                TiePolicy::ActivePlayer => {
                    let winner = state.active_player;
                    self.declare_winner(state, winner);
                }
                TiePolicy::Draw => {
                    state.result = GameOutcome::Draw;
                    state.winner = None;
                    state.phase = GamePhase::End;
                }
            },
        }
    }

    fn declare_winner(&self, state: &mut GameState, winner: PlayerId) {
        state.result = GameOutcome::win_for(winner);
        state.winner = Some(winner);
        state.phase = GamePhase::End;
    }

    // === Shared helpers ===

    pub(crate) fn def_of<'a>(&'a self, card: &CardInstance) -> EngineResult<&'a CardDef> {
        self.db
            .get(&card.card_def_id)
            .ok_or_else(|| EngineError::MissingDefinition(card.card_def_id.clone()))
    }

    fn take_from_hand(
        &self,
        state: &mut GameState,
        player: PlayerId,
        id: Option<&CardId>,
    ) -> EngineResult<CardInstance> {
        let id = id.ok_or_else(|| EngineError::IllegalAction("action needs a card".to_string()))?;
        state
            .player_mut(player)
            .hand
            .take_card(id)
            .ok_or_else(|| EngineError::MissingInstance(id.clone()))
    }

    pub(crate) fn draw(&self, state: &mut GameState, player: PlayerId, count: usize) {
        let p = state.player_mut(player);
        for _ in 0..count {
            match p.deck.draw_top() {
                Some(card) => p.hand.add_card(card),
                None => break,
            }
        }
    }

    fn redraw_hand(&self, state: &mut GameState, player: PlayerId) {
        let hand = std::mem::take(&mut state.players[player.index()].hand.cards);
        for card in hand {
            state.players[player.index()].deck.add_card(card);
        }
        state.players[player.index()].deck.shuffle(&mut state.rng);
        self.draw(state, player, HAND_SIZE);
    }

    fn hand_has_basic(&self, state: &GameState, player: PlayerId) -> bool {
        state.player(player).hand.cards.iter().any(|card| {
            self.db
                .get(&card.card_def_id)
                .is_some_and(CardDef::is_basic_pokemon)
        })
    }

    fn deck_or_hand_has_basic(&self, state: &GameState, player: PlayerId) -> bool {
        let p = state.player(player);
        p.deck
            .cards
            .iter()
            .chain(p.hand.cards.iter())
            .any(|card| {
                self.db
                    .get(&card.card_def_id)
                    .is_some_and(CardDef::is_basic_pokemon)
            })
    }

    /// Re-derive both players' effective bench limits from the in-play
    /// stadium. A shrinking limit never discards existing bench Pokemon; it
    /// only stops further placement.
    pub(crate) fn recompute_bench_limits(&self, state: &mut GameState) {
        for player in PlayerId::both().collect::<Vec<_>>() {
            let limit = self.registry.bench_limit_for(state, &self.db, player);
            state.player_mut(player).board.bench_limit = limit;
        }
    }
}

/// Replace the in-play target with the evolution, migrating everything that
/// carries over. Used both for regular evolution and for handlers that skip
/// a stage (Rare Candy). Returns false when the target is not in play.
pub(crate) fn evolve_in_place(
    state: &mut GameState,
    player: PlayerId,
    target_id: &CardId,
    evo: CardInstance,
    evo_def: &CardDef,
) -> bool {
    let board = &mut state.player_mut(player).board;

    let slot_is_active = board
        .active
        .as_ref()
        .is_some_and(|active| &active.id == target_id);
    let bench_index = board.bench.iter().position(|poke| &poke.id == target_id);

    let mut base = if slot_is_active {
        match board.active.take() {
            Some(active) => active,
            None => return false,
        }
    } else if let Some(index) = bench_index {
        board.bench.remove(index)
    } else {
        return false;
    };

    let mut evolved = evo;
    evolved.current_hp = evo_def.hp_or_zero();
    evolved.damage_counters = base.damage_counters;
    evolved.turns_in_play = base.turns_in_play;
    evolved.attached_energy = std::mem::take(&mut base.attached_energy);
    evolved.attached_tools = std::mem::take(&mut base.attached_tools);
    evolved.previous_stages = std::mem::take(&mut base.previous_stages);
    evolved.previous_stages.push(base);
    evolved.evolved_this_turn = true;
    // Status and lingering attack effects do not carry over.
    evolved.clear_all_status();
    evolved.attack_effects.clear();

    if slot_is_active {
        board.active = Some(evolved);
    } else if let Some(index) = bench_index {
        board.bench.insert(index, evolved);
    }
    true
}
