//! Card-specific behavior registrations.
//!
//! One module per trainer class plus abilities. Everything here goes
//! through [`register_all`], which a caller runs once against a fresh
//! [`LogicRegistry`] before constructing the engine.

use std::sync::Arc;

use crate::cards::CardDatabase;
use crate::registry::LogicRegistry;

pub mod abilities;
pub mod attacks;
pub mod items;
pub mod stadiums;
pub mod supporters;

/// Install every built-in card handler.
pub fn register_all(registry: &mut LogicRegistry, db: &Arc<CardDatabase>) {
    items::register(registry);
    supporters::register(registry);
    stadiums::register(registry);
    attacks::register(registry);
    abilities::register(registry, db);
}
