//! Economy domain: ledger debits, direct purchases, cart, checkout, library
//! stats and the end-of-session evaluation.
//!
//! All cross-domain communication goes through `crate::shared::*` events and resources.
//! No other domain module is imported here.

use bevy::prelude::*;
use crate::shared::*;

pub mod ledger;
pub mod shop;
pub mod cart;
pub mod stats;
pub mod evaluation;

use ledger::{reset_on_session_start, track_refusals, EconomyStats};
use shop::{handle_add_to_cart, handle_purchase};
use cart::{handle_checkout, handle_clear_cart, handle_remove_from_cart};
use stats::refresh_library_stats;
use evaluation::evaluate_final_library;

// ─────────────────────────────────────────────────────────────────────────────
// Plugin
// ─────────────────────────────────────────────────────────────────────────────

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        // ── Resources ──────────────────────────────────────────────────────
        app.init_resource::<EconomyStats>()
            .init_resource::<LibraryStats>();

        // ── Systems: Shopping state ────────────────────────────────────────
        app.add_systems(
            Update,
            reset_on_session_start
                .before(ShopSet::Transactions)
                .run_if(in_state(GameState::Shopping)),
        );

        app.add_systems(
            Update,
            (
                // Requests from the UI, applied in a fixed order so one frame
                // with several requests is deterministic.
                handle_purchase,
                handle_add_to_cart,
                handle_remove_from_cart,
                handle_clear_cart,
                handle_checkout,
            )
                .chain()
                .in_set(ShopSet::Transactions)
                .run_if(in_state(GameState::Shopping))
                .run_if(resource_exists::<Ledger>),
        );

        app.add_systems(
            Update,
            (refresh_library_stats, track_refusals)
                .after(ShopSet::Transactions)
                .run_if(in_state(GameState::Shopping)),
        );

        // ── Outcome screen ─────────────────────────────────────────────────
        app.add_systems(OnEnter(GameState::Ending), evaluate_final_library);

        info!("[Economy] EconomyPlugin registered.");
    }
}
