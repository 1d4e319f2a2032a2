//! Card definitions, instances, and the definition database.

pub mod database;
pub mod definition;
pub mod instance;

pub use database::{categorize_ability, CardDatabase};
pub use definition::{
    AbilityCategory, AbilityDef, AttackDef, CardDef, Resistance, Weakness,
};
pub use instance::CardInstance;
