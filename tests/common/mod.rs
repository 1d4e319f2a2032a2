//! Shared fixtures: a small card pool and mid-game state builders.

use std::sync::Arc;

use ptcg_engine::cards::{
    AbilityCategory, AbilityDef, AttackDef, CardDatabase, CardDef, CardInstance,
};
use ptcg_engine::core::{EnergyType, GamePhase, PlayerId, Subtype};
use ptcg_engine::{handlers, Engine, EngineConfig, GameState, LogicRegistry};

/// A pool wide enough to exercise every handler pattern.
pub fn sample_db() -> Arc<CardDatabase> {
    let mut db = CardDatabase::new();

    db.insert(
        CardDef::pokemon("charmander", "Charmander", 70, &[EnergyType::Fire])
            .with_subtype(Subtype::Basic)
            .with_weakness(EnergyType::Water)
            .with_retreat_cost(1)
            .with_attack(AttackDef::new("Ember", &[EnergyType::Fire], 30)),
    );
    db.insert(
        CardDef::pokemon("charmeleon", "Charmeleon", 100, &[EnergyType::Fire])
            .with_subtype(Subtype::Stage1)
            .with_evolves_from("Charmander")
            .with_retreat_cost(2)
            .with_attack(AttackDef::new(
                "Flame Tail",
                &[EnergyType::Fire, EnergyType::Colorless],
                60,
            )),
    );
    db.insert(
        CardDef::pokemon("charizard-ex", "Charizard ex", 280, &[EnergyType::Fire])
            .with_subtype(Subtype::Stage2)
            .with_subtype(Subtype::Ex)
            .with_subtype(Subtype::Tera)
            .with_evolves_from("Charmeleon")
            .with_retreat_cost(2)
            .with_attack(AttackDef::new(
                "Burning Darkness",
                &[EnergyType::Fire, EnergyType::Fire],
                180,
            )),
    );
    db.insert(
        CardDef::pokemon("pidgey", "Pidgey", 60, &[EnergyType::Colorless])
            .with_subtype(Subtype::Basic)
            .with_weakness(EnergyType::Lightning)
            .with_retreat_cost(1)
            .with_attack(AttackDef::new("Gust", &[EnergyType::Colorless], 10)),
    );
    db.insert(
        CardDef::pokemon("snorlax", "Snorlax", 150, &[EnergyType::Colorless])
            .with_subtype(Subtype::Basic)
            .with_retreat_cost(4)
            .with_attack(AttackDef::new(
                "Body Slam",
                &[EnergyType::Colorless, EnergyType::Colorless],
                50,
            )),
    );
    db.insert(
        CardDef::pokemon("iron-leaves-ex", "Iron Leaves ex", 220, &[EnergyType::Grass])
            .with_subtype(Subtype::Basic)
            .with_subtype(Subtype::Ex)
            .with_subtype(Subtype::Tera)
            .with_retreat_cost(1)
            .with_attack(AttackDef::new("Rapid Verdant", &[EnergyType::Grass], 220)),
    );
    db.insert(
        CardDef::pokemon("klefki", "Klefki", 70, &[EnergyType::Psychic])
            .with_subtype(Subtype::Basic)
            .with_retreat_cost(1)
            .with_ability(AbilityDef::new(
                "Mischievous Lock",
                "As long as this Pokemon is in the Active Spot, Basic Pokemon \
                 in play have no Abilities, except Klefki.",
                AbilityCategory::Passive {
                    kind: "ability_lock".to_string(),
                },
            )),
    );

    db.insert(CardDef::trainer("nest-ball", "Nest Ball", Subtype::Item));
    db.insert(CardDef::trainer("ultra-ball", "Ultra Ball", Subtype::Item));
    db.insert(CardDef::trainer(
        "buddy-buddy-poffin",
        "Buddy-Buddy Poffin",
        Subtype::Item,
    ));
    db.insert(CardDef::trainer("super-rod", "Super Rod", Subtype::Item));
    db.insert(CardDef::trainer(
        "night-stretcher",
        "Night Stretcher",
        Subtype::Item,
    ));
    db.insert(CardDef::trainer("rare-candy", "Rare Candy", Subtype::Item));
    db.insert(
        CardDef::trainer("prime-catcher", "Prime Catcher", Subtype::Item)
            .with_subtype(Subtype::AceSpec),
    );
    db.insert(CardDef::trainer("iono", "Iono", Subtype::Supporter));
    db.insert(CardDef::trainer(
        "boss-orders",
        "Boss's Orders",
        Subtype::Supporter,
    ));
    db.insert(CardDef::trainer("briar", "Briar", Subtype::Supporter));
    db.insert(CardDef::trainer("dawn", "Dawn", Subtype::Supporter));
    db.insert(CardDef::trainer(
        "area-zero",
        "Area Zero Underdepths",
        Subtype::Stadium,
    ));

    db.insert(CardDef::basic_energy(
        "fire-energy",
        "Fire Energy",
        EnergyType::Fire,
    ));
    db.insert(CardDef::basic_energy(
        "water-energy",
        "Water Energy",
        EnergyType::Water,
    ));
    db.insert(CardDef::basic_energy(
        "grass-energy",
        "Grass Energy",
        EnergyType::Grass,
    ));

    Arc::new(db)
}

pub fn engine() -> Engine {
    engine_with_config(EngineConfig::default())
}

pub fn engine_with_config(config: EngineConfig) -> Engine {
    let db = sample_db();
    let mut registry = LogicRegistry::new();
    handlers::register_all(&mut registry, &db);
    Engine::with_config(db, Arc::new(registry), config)
}

/// An instance ready to sit in play: HP set from the definition, one turn
/// of tenure so evolution and Rare Candy are legal.
pub fn in_play(db: &CardDatabase, def_key: &str, id: &str, owner: PlayerId) -> CardInstance {
    let mut card = CardInstance::new(id.to_string(), def_key.to_string(), owner);
    let hp = db
        .get(&card.card_def_id)
        .and_then(|def| def.hp)
        .unwrap_or(0);
    card.current_hp = hp;
    card.turns_in_play = 1;
    card
}

/// A card instance for a hand, deck, or discard pile.
pub fn in_zone(def_key: &str, id: &str, owner: PlayerId) -> CardInstance {
    CardInstance::new(id.to_string(), def_key.to_string(), owner)
}

/// A mid-game Main-phase state: Charmander active for player 0, Pidgey
/// active for player 1, six prizes and a ten-card deck each.
pub fn battle_state(engine: &Engine) -> GameState {
    let db = engine.database();
    let mut state = GameState::new(7);
    state.turn_count = 2;
    state.phase = GamePhase::Main;
    state.active_player = PlayerId::ZERO;
    state.starting_player = PlayerId::ONE;

    state.players[0].board.active = Some(in_play(db, "charmander", "p0_active", PlayerId::ZERO));
    state.players[1].board.active = Some(in_play(db, "pidgey", "p1_active", PlayerId::ONE));

    for player in [PlayerId::ZERO, PlayerId::ONE] {
        let idx = player.index();
        for i in 0..6 {
            state.players[idx]
                .prizes
                .add_card(in_zone("fire-energy", &format!("p{idx}_prize{i}"), player));
        }
        for i in 0..10 {
            state.players[idx]
                .deck
                .add_card(in_zone("fire-energy", &format!("p{idx}_deck{i}"), player));
        }
    }
    state
}

/// Attach a fresh Fire Energy to the given player's active Pokemon.
pub fn power_up_active(state: &mut GameState, player: PlayerId, count: usize) {
    let idx = player.index();
    for i in 0..count {
        let energy = in_zone("fire-energy", &format!("p{idx}_pwr{i}"), player);
        if let Some(active) = state.players[idx].board.active.as_mut() {
            active.attached_energy.push(energy);
        }
    }
}
