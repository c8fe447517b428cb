mod shared;
mod data;
mod catalog;
mod economy;
mod session;
mod snapshot;
mod ui;

use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use shared::*;

fn main() {
    let (config, config_note) = load_config();
    let grades = config.grades;

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Bargain Bin".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    level: Level::INFO,
                    filter: "wgpu=error,naga=warn,bargain_bin=debug".to_string(),
                    ..default()
                }),
        )
        // Game state
        .init_state::<GameState>()
        // Configuration
        .insert_resource(config)
        .insert_resource(grades)
        // Shared resources
        .init_resource::<ItemCatalog>()
        .init_resource::<Storefront>()
        .init_resource::<Ledger>()
        .init_resource::<Cart>()
        .init_resource::<Library>()
        .init_resource::<LibraryStats>()
        .init_resource::<FinalEvaluation>()
        // Notifications
        .add_event::<BalanceChangedEvent>()
        .add_event::<DepletedEvent>()
        .add_event::<CartChangedEvent>()
        .add_event::<LibraryChangedEvent>()
        .add_event::<RotateCatalogEvent>()
        .add_event::<SessionStartedEvent>()
        .add_event::<SessionEndedEvent>()
        .add_event::<ShopRefusedEvent>()
        // Requests
        .add_event::<PurchaseRequestEvent>()
        .add_event::<AddToCartRequestEvent>()
        .add_event::<RemoveFromCartRequestEvent>()
        .add_event::<CheckoutRequestEvent>()
        .add_event::<ClearCartRequestEvent>()
        .add_event::<RestartSessionEvent>()
        // Domain plugins
        .add_plugins(session::SessionPlugin)
        .add_plugins(catalog::CatalogPlugin)
        .add_plugins(economy::EconomyPlugin)
        .add_plugins(snapshot::SnapshotPlugin)
        .add_plugins(ui::UiPlugin)
        // Data loading
        .add_plugins(data::DataPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .add_systems(Startup, move || info!("[Config] {}", config_note))
        .run();
}

/// Reads `bargain_bin.ron` from the working directory on desktop builds.
/// Returns the config and a line describing where it came from; logging
/// is not up yet at this point.
#[cfg(not(target_arch = "wasm32"))]
fn load_config() -> (ShopConfig, String) {
    const CONFIG_PATH: &str = "bargain_bin.ron";
    match std::fs::read_to_string(CONFIG_PATH) {
        Ok(src) => match ShopConfig::from_ron(&src) {
            Ok(config) => (config, format!("Loaded {}", CONFIG_PATH)),
            Err(e) => (ShopConfig::default(), format!("{}; using defaults", e)),
        },
        Err(_) => (
            ShopConfig::default(),
            format!("No {} found; using defaults", CONFIG_PATH),
        ),
    }
}

#[cfg(target_arch = "wasm32")]
fn load_config() -> (ShopConfig, String) {
    (ShopConfig::default(), "Using defaults".to_string())
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
