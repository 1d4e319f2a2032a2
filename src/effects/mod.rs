//! Filters and reusable effect primitives for card handlers.

pub mod builders;
mod filter;

pub use builders::{
    add_damage_counters, discard_hand_draw, discard_then, draw_cards, heal_damage,
    recover_from_discard, search_deck, search_deck_to_bench, shuffle_discard_to_deck,
    switch_active, EffectResult,
};
pub use filter::{Filter, FilterBuilder};
