//! Legal-action generation.
//!
//! Dispatch is by state shape, in priority order: a finished game has no
//! actions, a pending resolution step dictates the choices, otherwise the
//! phase decides. Within the main phase every category deduplicates by
//! functional id so MCTS never explores two copies of the same card as
//! distinct branches.

use rustc_hash::FxHashSet;

use crate::cards::{CardDef, CardInstance};
use crate::core::{Action, GamePhase, GameState, PlayerId};
use crate::registry::GeneratorMode;

use super::damage;
use super::engine::Engine;

impl Engine {
    /// All actions the active player may take, flat.
    #[must_use]
    pub fn legal_actions(&self, state: &GameState) -> Vec<Action> {
        if state.is_game_over() {
            return Vec::new();
        }
        if state.has_pending_steps() {
            return self.resolution_actions(state);
        }
        match state.phase {
            GamePhase::Setup => self.setup_actions(state),
            GamePhase::Mulligan => self.mulligan_actions(state),
            GamePhase::Main | GamePhase::SuddenDeath => self.main_actions(state),
            // Draw, Attack and Cleanup auto-advance; End is terminal.
            _ => Vec::new(),
        }
    }

    fn setup_actions(&self, state: &GameState) -> Vec<Action> {
        let player = state.active_player;
        let p = state.player(player);
        let mut actions = Vec::new();

        if !p.has_active() {
            let mut seen = FxHashSet::default();
            for card in &p.hand.cards {
                let Some(def) = self.db.get(&card.card_def_id) else {
                    continue;
                };
                if def.is_basic_pokemon() && seen.insert(def.functional_id()) {
                    actions.push(
                        Action::place_active(player, card.id.clone())
                            .with_label(format!("Start with {}", def.name)),
                    );
                }
            }
            if actions.is_empty() {
                actions.push(Action::reveal_hand_mulligan(player));
            }
            return actions;
        }

        if p.board.can_add_to_bench() {
            let mut seen = FxHashSet::default();
            for card in &p.hand.cards {
                let Some(def) = self.db.get(&card.card_def_id) else {
                    continue;
                };
                if def.is_basic_pokemon() && seen.insert(def.functional_id()) {
                    actions.push(
                        Action::place_bench(player, card.id.clone())
                            .with_label(format!("Bench {}", def.name)),
                    );
                }
            }
        }
        actions.push(Action::end_turn(player).with_label("Done placing"));
        actions
    }

    fn mulligan_actions(&self, state: &GameState) -> Vec<Action> {
        let player = state.active_player;
        if state.player(player).pending_mulligan_draws == 0 {
            return Vec::new();
        }
        vec![
            Action::mulligan_draw(player).with_label("Draw for opponent mulligan"),
            Action::end_turn(player).with_label("Decline remaining draws"),
        ]
    }

    fn main_actions(&self, state: &GameState) -> Vec<Action> {
        let player = state.active_player;
        let p = state.player(player);

        // A knocked-out active forces promotion before anything else.
        if !p.has_active() {
            return p
                .board
                .bench
                .iter()
                .map(|poke| Action::promote_active(player, poke.id.clone()))
                .collect();
        }

        let mut actions = vec![Action::end_turn(player)];
        self.energy_attach_actions(state, player, &mut actions);
        self.play_basic_actions(state, player, &mut actions);
        self.evolve_actions(state, player, &mut actions);
        self.trainer_actions(state, player, &mut actions);
        self.ability_actions(state, player, &mut actions);
        self.retreat_actions(state, player, &mut actions);
        self.attack_actions(state, player, &mut actions);
        actions
    }

    fn energy_attach_actions(&self, state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
        let p = state.player(player);
        if p.energy_attached_this_turn {
            return;
        }
        let mut seen = FxHashSet::default();
        for card in &p.hand.cards {
            let Some(def) = self.db.get(&card.card_def_id) else {
                continue;
            };
            if !def.is_energy() || !seen.insert(def.functional_id()) {
                continue;
            }
            for poke in p.board.all_pokemon() {
                out.push(
                    Action::attach_energy(player, card.id.clone(), poke.id.clone())
                        .with_label(format!("Attach {}", def.name)),
                );
            }
        }
    }

    fn play_basic_actions(&self, state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
        let p = state.player(player);
        if !p.board.can_add_to_bench() {
            return;
        }
        let mut seen = FxHashSet::default();
        for card in &p.hand.cards {
            let Some(def) = self.db.get(&card.card_def_id) else {
                continue;
            };
            if def.is_basic_pokemon() && seen.insert(def.functional_id()) {
                out.push(
                    Action::play_basic(player, card.id.clone())
                        .with_label(format!("Bench {}", def.name)),
                );
            }
        }
    }

    fn evolve_actions(&self, state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
        if state.turn_count <= 1 {
            return;
        }
        let p = state.player(player);
        let mut seen = FxHashSet::default();
        for card in &p.hand.cards {
            let Some(def) = self.db.get(&card.card_def_id) else {
                continue;
            };
            let Some(evolves_from) = def.evolves_from.as_deref() else {
                continue;
            };
            if !def.is_pokemon() {
                continue;
            }
            for poke in p.board.all_pokemon() {
                if poke.evolved_this_turn || poke.turns_in_play < 1 {
                    continue;
                }
                let Some(target_def) = self.db.get(&poke.card_def_id) else {
                    continue;
                };
                if target_def.name != evolves_from {
                    continue;
                }
                if seen.insert((def.functional_id(), poke.id.clone())) {
                    out.push(
                        Action::evolve(player, card.id.clone(), poke.id.clone())
                            .with_label(format!("Evolve into {}", def.name)),
                    );
                }
            }
        }
    }

    fn trainer_actions(&self, state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
        let p = state.player(player);
        let mut seen = FxHashSet::default();
        for card in &p.hand.cards {
            let Some(def) = self.db.get(&card.card_def_id) else {
                continue;
            };
            if !def.is_trainer() || !seen.insert(def.functional_id()) {
                continue;
            }

            if def.is_tool() {
                for poke in p.board.all_pokemon() {
                    if poke.attached_tools.is_empty() {
                        out.push(
                            Action::attach_tool(player, card.id.clone(), poke.id.clone())
                                .with_label(format!("Attach {}", def.name)),
                        );
                    }
                }
                continue;
            }

            let canonical = if def.is_item() {
                let action = Action::play_item(player, card.id.clone());
                if self
                    .registry
                    .check_global_block(state, &self.db, "global_play_item", &action)
                {
                    continue;
                }
                action
            } else if def.is_supporter() {
                if p.supporter_played_this_turn {
                    continue;
                }
                if state.turn_count == 1 && player == state.starting_player {
                    continue;
                }
                Action::play_supporter(player, card.id.clone())
            } else if def.is_stadium() {
                if p.stadium_played_this_turn {
                    continue;
                }
                let same_name = state
                    .stadium
                    .as_ref()
                    .and_then(|s| self.db.get(&s.card_def_id))
                    .is_some_and(|in_play| in_play.name == def.name);
                if same_name {
                    continue;
                }
                Action::play_stadium(player, card.id.clone())
            } else {
                continue;
            };

            self.expand_trainer(state, card, def, canonical, out);
        }
    }

    /// Run the card's generator if registered; otherwise emit the canonical
    /// action when a handler exists to resolve it.
    fn expand_trainer(
        &self,
        state: &GameState,
        card: &CardInstance,
        def: &CardDef,
        canonical: Action,
        out: &mut Vec<Action>,
    ) {
        if let Some(generator) = self.registry.generator(&def.name) {
            let result = generator(state, &self.db, card);
            if !result.valid {
                return;
            }
            match result.mode {
                GeneratorMode::ActionGeneration => out.extend(result.actions),
                GeneratorMode::ValidityCheck => {
                    out.push(canonical.with_label(format!("Play {}", def.name)));
                }
            }
            return;
        }
        if def.is_stadium() || self.registry.has_trainer(&def.name) {
            out.push(canonical.with_label(format!("Play {}", def.name)));
        }
    }

    fn ability_actions(&self, state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
        let p = state.player(player);
        for poke in p.board.all_pokemon() {
            let Some(def) = self.db.get(&poke.card_def_id) else {
                continue;
            };
            for ability in &def.abilities {
                if !matches!(
                    ability.category,
                    crate::cards::AbilityCategory::Activatable
                ) {
                    continue;
                }
                if poke.abilities_used_this_turn.contains(&ability.name) {
                    continue;
                }
                if self.registry.ability(&def.name, &ability.name).is_none() {
                    continue;
                }
                if self
                    .registry
                    .is_ability_blocked(state, &self.db, poke, &ability.name)
                {
                    continue;
                }
                out.push(
                    Action::use_ability(player, poke.id.clone(), ability.name.clone())
                        .with_label(format!("Use {}", ability.name)),
                );
            }
        }
    }

    fn retreat_actions(&self, state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
        let p = state.player(player);
        if p.retreated_this_turn || p.board.bench_count() == 0 {
            return;
        }
        let Some(active) = p.board.active.as_ref() else {
            return;
        };
        if active.is_asleep_or_paralyzed() {
            return;
        }
        let Some(def) = self.db.get(&active.card_def_id) else {
            return;
        };
        let cost = damage::modified_retreat_cost(&self.registry, state, &self.db, def);
        if (active.total_attached_energy() as i32) < cost {
            return;
        }
        for poke in &p.board.bench {
            out.push(
                Action::retreat(player, active.id.clone(), poke.id.clone())
                    .with_label("Retreat"),
            );
        }
    }

    fn attack_actions(&self, state: &GameState, player: PlayerId, out: &mut Vec<Action>) {
        // The player going first cannot attack on their first turn.
        if state.turn_count == 1 && player == state.starting_player {
            return;
        }
        let p = state.player(player);
        let Some(active) = p.board.active.as_ref() else {
            return;
        };
        if active.is_asleep_or_paralyzed() {
            return;
        }
        if state.has_effect_on("cannot_attack_next_turn", &active.id) {
            return;
        }
        let Some(def) = self.db.get(&active.card_def_id) else {
            return;
        };
        let provided = active.provided_energy(&self.db);
        for attack in &def.attacks {
            if damage::can_pay_cost(&provided, &attack.cost) {
                out.push(
                    Action::attack(player, active.id.clone(), attack.name.clone())
                        .with_label(format!("Attack with {}", attack.name)),
                );
            }
        }
    }
}
