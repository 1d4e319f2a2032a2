//! Resolution-stack handling: enumerating the choices of the top step,
//! recording selections, and running completions.

use rustc_hash::FxHashSet;
use tracing::warn;

use crate::cards::CardInstance;
use crate::core::{Action, GameState, PlayerId, SelectionPurpose, ZoneKind};
use crate::error::{EngineError, EngineResult};
use crate::stack::ResolutionStep;

use super::engine::Engine;

impl Engine {
    /// Legal actions while a step is pending: one `SelectCard` per
    /// remaining candidate (deduplicated by functional id) plus a confirm
    /// once the minimum is met.
    pub(crate) fn resolution_actions(&self, state: &GameState) -> Vec<Action> {
        let Some(step) = state.top_step() else {
            return Vec::new();
        };
        let player = step.player();
        let mut actions = Vec::new();

        match step {
            ResolutionStep::SelectFromZone {
                zone,
                filter,
                excluded,
                selected,
                ..
            } => {
                let mut seen = FxHashSet::default();
                for card in self.zone_cards(state, player, *zone) {
                    if excluded.contains(&card.id) || selected.contains(&card.id) {
                        continue;
                    }
                    let Some(def) = self.db.get(&card.card_def_id) else {
                        continue;
                    };
                    if !filter.matches(def, &self.db, Some(state.player(player))) {
                        continue;
                    }
                    if !seen.insert(def.functional_id()) {
                        continue;
                    }
                    actions.push(
                        Action::select_card(player, card.id.clone())
                            .with_label(format!("Select {}", def.name)),
                    );
                }
                if step.can_confirm() {
                    actions.push(Action::confirm_selection(player).with_label("Confirm"));
                }
            }
            ResolutionStep::SearchDeck {
                filter, selected, ..
            } => {
                let mut seen = FxHashSet::default();
                for card in &state.player(player).deck.cards {
                    if selected.contains(&card.id) {
                        continue;
                    }
                    let Some(def) = self.db.get(&card.card_def_id) else {
                        continue;
                    };
                    if !filter.matches(def, &self.db, Some(state.player(player))) {
                        continue;
                    }
                    if !seen.insert(def.functional_id()) {
                        continue;
                    }
                    actions.push(
                        Action::select_card(player, card.id.clone())
                            .with_label(format!("Take {}", def.name)),
                    );
                }
                if step.can_confirm() {
                    actions.push(Action::confirm_selection(player).with_label("Done searching"));
                }
            }
            ResolutionStep::AttachToTarget { valid_targets, .. } => {
                for target in valid_targets {
                    actions.push(
                        Action::select_card(player, target.clone())
                            .with_label("Choose attachment target"),
                    );
                }
            }
            ResolutionStep::EvolveTarget {
                base_id,
                evolution_card_id,
                ..
            } => {
                actions.push(Action::evolve(player, evolution_card_id.clone(), base_id.clone()));
            }
        }

        actions
    }

    fn zone_cards<'a>(
        &self,
        state: &'a GameState,
        player: PlayerId,
        zone: ZoneKind,
    ) -> Vec<&'a CardInstance> {
        let p = state.player(player);
        match zone {
            ZoneKind::Hand => p.hand.cards.iter().collect(),
            ZoneKind::Deck => p.deck.cards.iter().collect(),
            ZoneKind::Discard => p.discard.cards.iter().collect(),
            ZoneKind::Bench => p.board.bench.iter().collect(),
            ZoneKind::Active => p.board.active.iter().collect(),
            ZoneKind::Board => p.board.all_pokemon().collect(),
        }
    }

    // === Selection application ===

    pub(crate) fn apply_select_card(
        &self,
        state: &mut GameState,
        action: &Action,
    ) -> EngineResult<()> {
        let id = action
            .card_id
            .as_ref()
            .ok_or_else(|| EngineError::IllegalAction("selection needs a card".to_string()))?
            .clone();
        let step = state
            .top_step_mut()
            .ok_or_else(|| EngineError::IllegalAction("nothing to select for".to_string()))?;
        if !step.record_selection(id) {
            return Err(EngineError::IllegalAction(
                "selection not accepted by the pending step".to_string(),
            ));
        }
        if step.is_complete() {
            self.finish_top_step(state)?;
        }
        Ok(())
    }

    pub(crate) fn apply_confirm_selection(
        &self,
        state: &mut GameState,
        _action: &Action,
    ) -> EngineResult<()> {
        let step = state
            .top_step_mut()
            .ok_or_else(|| EngineError::IllegalAction("nothing to confirm".to_string()))?;
        if !step.can_confirm() {
            return Err(EngineError::IllegalAction(
                "minimum selection not reached".to_string(),
            ));
        }
        step.mark_complete();
        self.finish_top_step(state)
    }

    /// Pop the completed top step and run its callback, or the default
    /// completion derived from its shape and purpose.
    pub(crate) fn finish_top_step(&self, state: &mut GameState) -> EngineResult<()> {
        let Some(step) = state.pop_step() else {
            return Ok(());
        };
        let selected = step.selected_ids().to_vec();
        let player = step.player();

        if step.header().on_complete.is_some() {
            step.header()
                .on_complete
                .invoke(state, &self.db, &selected, player);
        } else {
            self.default_completion(state, &step)?;
        }

        // Completions can bench, switch or damage Pokemon.
        self.process_knockouts(state);
        self.recompute_bench_limits(state);
        Ok(())
    }

    fn default_completion(&self, state: &mut GameState, step: &ResolutionStep) -> EngineResult<()> {
        let player = step.player();
        match step {
            ResolutionStep::SearchDeck {
                destination,
                shuffle_after,
                selected,
                ..
            } => {
                for id in selected {
                    let Some(mut card) = state.player_mut(player).deck.take_card(id) else {
                        warn!(card = %id, "search pick left the deck before completion");
                        continue;
                    };
                    match destination {
                        ZoneKind::Hand => state.player_mut(player).hand.add_card(card),
                        ZoneKind::Discard => state.player_mut(player).discard.add_card(card),
                        ZoneKind::Bench => {
                            if let Some(def) = self.db.get(&card.card_def_id) {
                                card.current_hp = def.hp_or_zero();
                            }
                            if let Err(card) = state.player_mut(player).board.add_to_bench(card) {
                                warn!("bench filled up mid-search; moving pick to hand");
                                state.player_mut(player).hand.add_card(card);
                            }
                        }
                        other => {
                            warn!(?other, "unsupported search destination; moving pick to hand");
                            state.player_mut(player).hand.add_card(card);
                        }
                    }
                }
                if *shuffle_after {
                    state.players[player.index()].deck.shuffle(&mut state.rng);
                }
                Ok(())
            }
            ResolutionStep::SelectFromZone {
                selected, header, ..
            } => {
                match header.purpose {
                    SelectionPurpose::DiscardCost => {
                        for id in selected {
                            if let Some(card) = state.player_mut(player).hand.take_card(id) {
                                state.player_mut(player).discard.add_card(card);
                            }
                        }
                    }
                    SelectionPurpose::SwitchTarget => {
                        if let Some(id) = selected.first() {
                            let board = &mut state.player_mut(player).board;
                            if board.has_active() {
                                board.switch_active(id);
                            } else {
                                board.promote_to_active(id);
                            }
                        }
                    }
                    SelectionPurpose::RecoverToDeck => {
                        for id in selected {
                            if let Some(card) = state.player_mut(player).discard.take_card(id) {
                                state.player_mut(player).deck.add_card(card);
                            }
                        }
                        state.players[player.index()].deck.shuffle(&mut state.rng);
                    }
                    SelectionPurpose::RecoverToHand => {
                        for id in selected {
                            if let Some(card) = state.player_mut(player).discard.take_card(id) {
                                state.player_mut(player).hand.add_card(card);
                            }
                        }
                    }
                    SelectionPurpose::DiscardFromPlay => {
                        for id in selected {
                            if let Some(poke) = state.player_mut(player).board.take_pokemon(id) {
                                self.discard_card_tree(state, poke);
                            }
                        }
                    }
                    other => {
                        warn!(?other, "selection completed without a callback; no default");
                    }
                }
                Ok(())
            }
            ResolutionStep::AttachToTarget {
                card_to_attach,
                selected_target,
                ..
            } => {
                let Some(target_id) = selected_target else {
                    return Ok(());
                };
                let card = state
                    .player_mut(player)
                    .hand
                    .take_card(card_to_attach)
                    .or_else(|| state.player_mut(player).discard.take_card(card_to_attach));
                let Some(card) = card else {
                    warn!(card = %card_to_attach, "attachment source not found");
                    return Ok(());
                };
                let is_tool = self
                    .db
                    .get(&card.card_def_id)
                    .is_some_and(crate::cards::CardDef::is_tool);
                match state.player_mut(player).find_pokemon_mut(target_id) {
                    Some(target) if is_tool => target.attached_tools.push(card),
                    Some(target) => target.attached_energy.push(card),
                    None => {
                        warn!(target = %target_id, "attachment target left play");
                        state.player_mut(player).hand.add_card(card);
                    }
                }
                Ok(())
            }
            // Resolved through the Evolve action, never by confirmation.
            ResolutionStep::EvolveTarget { .. } => Ok(()),
        }
    }

}
