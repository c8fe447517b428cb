mod ending_screen;
mod hud;
mod input;
mod title_screen;

use bevy::prelude::*;
use crate::shared::*;

/// Which listing the lower panel shows while shopping.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingTab {
    #[default]
    Cart,
    Library,
}

/// Last refusal shown under the cards, cleared after a short delay.
#[derive(Resource, Debug, Clone)]
pub struct RefusalBanner {
    pub message: Option<String>,
    pub timer: Timer,
}

impl Default for RefusalBanner {
    fn default() -> Self {
        Self {
            message: None,
            timer: Timer::from_seconds(2.0, TimerMode::Once),
        }
    }
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ListingTab>()
            .init_resource::<RefusalBanner>();

        // ─── TITLE ───
        app.add_systems(OnEnter(GameState::Title), title_screen::spawn_title_screen);
        app.add_systems(OnExit(GameState::Title), title_screen::despawn_title_screen);
        app.add_systems(
            Update,
            (title_screen::blink_prompt, input::title_input)
                .run_if(in_state(GameState::Title)),
        );

        // ─── SHOPPING HUD ───
        app.add_systems(OnEnter(GameState::Shopping), hud::spawn_hud);
        app.add_systems(OnExit(GameState::Shopping), hud::despawn_hud);
        app.add_systems(
            Update,
            input::shop_input
                .in_set(ShopSet::Input)
                .run_if(in_state(GameState::Shopping)),
        );
        app.add_systems(
            Update,
            (
                hud::listen_for_refusals,
                hud::update_balance_display,
                hud::update_timer_display,
                hud::update_cart_display,
                hud::update_owned_display,
                hud::update_card_display,
                hud::update_listing_display,
                hud::update_refusal_display,
            )
                .chain()
                .after(ShopSet::Rotation)
                .run_if(in_state(GameState::Shopping)),
        );

        // ─── OUTCOME SCREEN ───
        app.add_systems(OnEnter(GameState::Ending), ending_screen::spawn_ending_screen);
        app.add_systems(OnExit(GameState::Ending), ending_screen::despawn_ending_screen);
        app.add_systems(
            Update,
            (ending_screen::update_ending_text, input::ending_input)
                .run_if(in_state(GameState::Ending)),
        );
    }
}
