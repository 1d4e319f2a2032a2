//! Resolution steps - pending choices a card effect is waiting on.
//!
//! When a card effect needs player input (pick two cards to discard, choose
//! a deck search target, pick the new active), its handler pushes a step.
//! The engine then sources legal actions from the top step until it
//! completes, runs the completion callback or the purpose-derived default,
//! and pops it. The stack is LIFO: the most recently pushed choice resolves
//! first.

use serde::{Deserialize, Serialize};

use super::callback::CompletionCallback;
use crate::core::{CardId, PlayerId, SelectionPurpose, ZoneKind};
use crate::effects::Filter;

/// Fields every step shape shares.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepHeader {
    /// The card whose effect pushed this step.
    pub source_id: CardId,
    /// Display name of the source, for labels.
    pub source_name: String,
    /// The player who makes this choice.
    pub player: PlayerId,
    pub purpose: SelectionPurpose,
    pub is_complete: bool,
    pub on_complete: CompletionCallback,
}

impl StepHeader {
    #[must_use]
    pub fn new(
        source_id: CardId,
        source_name: impl Into<String>,
        player: PlayerId,
        purpose: SelectionPurpose,
    ) -> Self {
        Self {
            source_id,
            source_name: source_name.into(),
            player,
            purpose,
            is_complete: false,
            on_complete: CompletionCallback::none(),
        }
    }

    #[must_use]
    pub fn with_callback(mut self, callback: CompletionCallback) -> Self {
        self.on_complete = callback;
        self
    }
}

/// A pending choice. Four shapes cover every card in the pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ResolutionStep {
    /// Pick `min..=max` cards from one of the chooser's zones.
    SelectFromZone {
        header: StepHeader,
        zone: ZoneKind,
        min_count: usize,
        max_count: usize,
        /// When set, the step auto-completes at exactly this many picks.
        exact_count: Option<usize>,
        filter: Filter,
        /// Ids never offered (e.g. the source card itself).
        excluded: Vec<CardId>,
        selected: Vec<CardId>,
    },
    /// Search the deck for up to `count` cards matching the filter.
    /// `min_count = 0` models "you may fail to find".
    SearchDeck {
        header: StepHeader,
        count: usize,
        min_count: usize,
        destination: ZoneKind,
        filter: Filter,
        selected: Vec<CardId>,
        shuffle_after: bool,
        reveal_cards: bool,
    },
    /// Choose which in-play target receives `card_to_attach`.
    AttachToTarget {
        header: StepHeader,
        card_to_attach: CardId,
        valid_targets: Vec<CardId>,
        selected_target: Option<CardId>,
    },
    /// A forced evolution (Rare Candy's two-stage jump).
    EvolveTarget {
        header: StepHeader,
        base_id: CardId,
        evolution_card_id: CardId,
        skip_evolution_sickness: bool,
        skip_stage_check: bool,
    },
}

impl ResolutionStep {
    #[must_use]
    pub fn header(&self) -> &StepHeader {
        match self {
            ResolutionStep::SelectFromZone { header, .. }
            | ResolutionStep::SearchDeck { header, .. }
            | ResolutionStep::AttachToTarget { header, .. }
            | ResolutionStep::EvolveTarget { header, .. } => header,
        }
    }

    #[must_use]
    pub fn header_mut(&mut self) -> &mut StepHeader {
        match self {
            ResolutionStep::SelectFromZone { header, .. }
            | ResolutionStep::SearchDeck { header, .. }
            | ResolutionStep::AttachToTarget { header, .. }
            | ResolutionStep::EvolveTarget { header, .. } => header,
        }
    }

    #[must_use]
    pub fn player(&self) -> PlayerId {
        self.header().player
    }

    #[must_use]
    pub fn purpose(&self) -> SelectionPurpose {
        self.header().purpose
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.header().is_complete
    }

    /// The accumulated selection, in pick order.
    #[must_use]
    pub fn selected_ids(&self) -> &[CardId] {
        match self {
            ResolutionStep::SelectFromZone { selected, .. }
            | ResolutionStep::SearchDeck { selected, .. } => selected,
            ResolutionStep::AttachToTarget {
                selected_target, ..
            } => selected_target.as_ref().map_or(&[], std::slice::from_ref),
            ResolutionStep::EvolveTarget { .. } => &[],
        }
    }

    /// Record one pick. Marks the step complete when its completion
    /// condition is met. Returns false if the step cannot take a pick.
    pub fn record_selection(&mut self, id: CardId) -> bool {
        match self {
            ResolutionStep::SelectFromZone {
                header,
                max_count,
                exact_count,
                selected,
                ..
            } => {
                if selected.len() >= *max_count {
                    return false;
                }
                selected.push(id);
                if selected.len() == exact_count.unwrap_or(*max_count) {
                    header.is_complete = true;
                }
                true
            }
            ResolutionStep::SearchDeck {
                header,
                count,
                selected,
                ..
            } => {
                if selected.len() >= *count {
                    return false;
                }
                selected.push(id);
                if selected.len() == *count {
                    header.is_complete = true;
                }
                true
            }
            ResolutionStep::AttachToTarget {
                header,
                valid_targets,
                selected_target,
                ..
            } => {
                if selected_target.is_some() || !valid_targets.contains(&id) {
                    return false;
                }
                *selected_target = Some(id);
                header.is_complete = true;
                true
            }
            ResolutionStep::EvolveTarget { .. } => false,
        }
    }

    /// Whether the player may confirm with the current selection.
    #[must_use]
    pub fn can_confirm(&self) -> bool {
        match self {
            ResolutionStep::SelectFromZone {
                min_count, selected, ..
            }
            | ResolutionStep::SearchDeck {
                min_count, selected, ..
            } => selected.len() >= *min_count,
            ResolutionStep::AttachToTarget {
                selected_target, ..
            } => selected_target.is_some(),
            ResolutionStep::EvolveTarget { .. } => false,
        }
    }

    pub fn mark_complete(&mut self) {
        self.header_mut().is_complete = true;
    }
}

// === Constructors ===

impl ResolutionStep {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn select_from_zone(
        header: StepHeader,
        zone: ZoneKind,
        min_count: usize,
        max_count: usize,
        exact_count: Option<usize>,
        filter: Filter,
        excluded: Vec<CardId>,
    ) -> Self {
        ResolutionStep::SelectFromZone {
            header,
            zone,
            min_count,
            max_count,
            exact_count,
            filter,
            excluded,
            selected: Vec::new(),
        }
    }

    #[must_use]
    pub fn search_deck(
        header: StepHeader,
        count: usize,
        min_count: usize,
        destination: ZoneKind,
        filter: Filter,
        shuffle_after: bool,
    ) -> Self {
        ResolutionStep::SearchDeck {
            header,
            count,
            min_count,
            destination,
            filter,
            selected: Vec::new(),
            shuffle_after,
            reveal_cards: false,
        }
    }

    #[must_use]
    pub fn attach_to_target(
        header: StepHeader,
        card_to_attach: CardId,
        valid_targets: Vec<CardId>,
    ) -> Self {
        ResolutionStep::AttachToTarget {
            header,
            card_to_attach,
            valid_targets,
            selected_target: None,
        }
    }

    #[must_use]
    pub fn evolve_target(header: StepHeader, base_id: CardId, evolution_card_id: CardId) -> Self {
        ResolutionStep::EvolveTarget {
            header,
            base_id,
            evolution_card_id,
            skip_evolution_sickness: true,
            skip_stage_check: true,
        }
    }
}
