//! Catalog rotation: which cards are on display.
//!
//! Draws `ShopConfig::rotation_size` definitions from the catalog, projects
//! them into `ItemPick`s and replaces `Storefront`. Runs once when a session
//! begins and again on every `RotateCatalogEvent` from the session clock.

pub mod rotation;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::shared::*;
use rotation::pick_random;

/// RNG for rotations. Seeded from `ShopConfig::rng_seed` when set.
#[derive(Resource)]
pub struct RotationRng(pub StdRng);

impl RotationRng {
    pub fn from_config(config: &ShopConfig) -> Self {
        match config.rng_seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

impl Default for RotationRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

pub struct CatalogPlugin;

impl Plugin for CatalogPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, seed_rotation_rng)
            .add_systems(
                Update,
                (
                    draw_on_session_start,
                    rotate_on_tick,
                )
                    .in_set(ShopSet::Rotation)
                    .run_if(in_state(GameState::Shopping)),
            );
    }
}

fn seed_rotation_rng(mut commands: Commands, config: Res<ShopConfig>) {
    if let Some(seed) = config.rng_seed {
        info!("[Catalog] Rotation RNG seeded with {}", seed);
    }
    commands.insert_resource(RotationRng::from_config(&config));
}

/// Replaces the storefront with a fresh draw from the catalog.
pub fn rotate_storefront(
    catalog: &ItemCatalog,
    count: usize,
    rng: &mut RotationRng,
    storefront: &mut Storefront,
) {
    if catalog.is_empty() {
        warn!("[Catalog] Catalog is empty.");
        storefront.picks.clear();
        return;
    }
    let drawn = pick_random(count, &catalog.items, &mut rng.0);
    storefront.picks = drawn.iter().map(ItemDefinition::to_pick).collect();
    storefront.rotations = storefront.rotations.wrapping_add(1);
    for pick in &storefront.picks {
        debug!(
            "[Catalog]  - {} ({} → {})",
            pick.title,
            format_cents(pick.original_price_cents as u64),
            format_cents(pick.final_price_cents())
        );
    }
}

fn draw_on_session_start(
    mut events: EventReader<SessionStartedEvent>,
    catalog: Res<ItemCatalog>,
    config: Res<ShopConfig>,
    mut rng: ResMut<RotationRng>,
    mut storefront: ResMut<Storefront>,
) {
    if events.read().count() == 0 {
        return;
    }
    storefront.rotations = 0;
    rotate_storefront(&catalog, config.rotation_size, &mut rng, &mut storefront);
    info!("[Catalog] Opening rotation: {} card(s)", storefront.picks.len());
}

fn rotate_on_tick(
    mut events: EventReader<RotateCatalogEvent>,
    catalog: Res<ItemCatalog>,
    config: Res<ShopConfig>,
    mut rng: ResMut<RotationRng>,
    mut storefront: ResMut<Storefront>,
) {
    for _ev in events.read() {
        rotate_storefront(&catalog, config.rotation_size, &mut rng, &mut storefront);
        info!("[Catalog] Rotation #{} — refreshed displayed items", storefront.rotations);
    }
}
