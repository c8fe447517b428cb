//! Data layer: populates the item catalog at startup.
//!
//! Runs in OnEnter(GameState::Loading), parses the embedded catalog, fills
//! `ItemCatalog` and then transitions to GameState::Title. Other domains can
//! read the catalog once the state has advanced past Loading.

use bevy::prelude::*;
use crate::shared::*;

/// Shipped catalog, embedded so the browser build needs no filesystem.
pub const CATALOG_RON: &str = include_str!("../../assets/catalog.ron");

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_catalog);
    }
}

/// Parses a RON list of item definitions.
pub fn parse_catalog(src: &str) -> Result<Vec<ItemDefinition>, String> {
    ron::from_str::<Vec<ItemDefinition>>(src).map_err(|e| format!("Catalog parse failed: {}", e))
}

fn load_catalog(mut catalog: ResMut<ItemCatalog>, mut next_state: ResMut<NextState<GameState>>) {
    info!("DataPlugin: populating catalog…");

    match parse_catalog(CATALOG_RON) {
        Ok(definitions) => {
            *catalog = ItemCatalog::from_definitions(definitions);
            info!("  Items loaded: {}", catalog.len());
        }
        Err(e) => {
            error!("[Data] {}", e);
            *catalog = ItemCatalog::default();
        }
    }

    info!("DataPlugin: catalog ready. Transitioning to Title.");
    next_state.set(GameState::Title);
}
