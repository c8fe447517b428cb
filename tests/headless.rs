//! Headless integration tests for Bargain Bin.
//!
//! These tests exercise the shop's ECS logic without a window or GPU.
//! They use Bevy's `MinimalPlugins` to tick the app, register the domain
//! plugins minus the UI, and drive the session with manual time steps.
//!
//! Run with: `cargo test --test headless`

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use bargain_bin::catalog::CatalogPlugin;
use bargain_bin::data::DataPlugin;
use bargain_bin::economy::evaluation::evaluate;
use bargain_bin::economy::ledger::EconomyStats;
use bargain_bin::economy::EconomyPlugin;
use bargain_bin::session::SessionPlugin;
use bargain_bin::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Event counters
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Resource, Default)]
struct Observed {
    cart_changed: usize,
    library_changed: usize,
    balance_changes: Vec<u64>,
    refusals: Vec<Refusal>,
    endings: Vec<SessionOutcome>,
}

fn observe_events(
    mut cart: EventReader<CartChangedEvent>,
    mut library: EventReader<LibraryChangedEvent>,
    mut balance: EventReader<BalanceChangedEvent>,
    mut refused: EventReader<ShopRefusedEvent>,
    mut ended: EventReader<SessionEndedEvent>,
    mut observed: ResMut<Observed>,
) {
    observed.cart_changed += cart.read().count();
    observed.library_changed += library.read().count();
    observed
        .balance_changes
        .extend(balance.read().map(|ev| ev.balance));
    observed.refusals.extend(refused.read().map(|ev| ev.reason));
    observed.endings.extend(ended.read().map(|ev| ev.outcome));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builds a minimal Bevy app with all shared resources and events registered
/// (mirrors main.rs) plus every domain plugin except the UI. Time is frozen
/// until a test calls `set_step`.
fn build_test_app(config: ShopConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::ZERO));

    // ── Game State ───────────────────────────────────────────────────────
    app.init_state::<GameState>();

    // ── Configuration ────────────────────────────────────────────────────
    app.insert_resource(config.grades);
    app.insert_resource(config);

    // ── Shared Resources (mirrors main.rs) ───────────────────────────────
    app.init_resource::<ItemCatalog>()
        .init_resource::<Storefront>()
        .init_resource::<Ledger>()
        .init_resource::<Cart>()
        .init_resource::<Library>()
        .init_resource::<LibraryStats>()
        .init_resource::<FinalEvaluation>();

    // ── Shared Events (mirrors main.rs) ──────────────────────────────────
    app.add_event::<BalanceChangedEvent>()
        .add_event::<DepletedEvent>()
        .add_event::<CartChangedEvent>()
        .add_event::<LibraryChangedEvent>()
        .add_event::<RotateCatalogEvent>()
        .add_event::<SessionStartedEvent>()
        .add_event::<SessionEndedEvent>()
        .add_event::<ShopRefusedEvent>()
        .add_event::<PurchaseRequestEvent>()
        .add_event::<AddToCartRequestEvent>()
        .add_event::<RemoveFromCartRequestEvent>()
        .add_event::<CheckoutRequestEvent>()
        .add_event::<ClearCartRequestEvent>()
        .add_event::<RestartSessionEvent>();

    // ── Domain plugins ───────────────────────────────────────────────────
    app.add_plugins(SessionPlugin)
        .add_plugins(CatalogPlugin)
        .add_plugins(EconomyPlugin)
        .add_plugins(DataPlugin);

    app.init_resource::<Observed>();
    app.add_systems(Update, observe_events.after(ShopSet::Rotation));

    app
}

fn test_config() -> ShopConfig {
    ShopConfig {
        starting_balance_cents: 25_000,
        duration_secs: 30.0,
        rotation_interval_secs: 1_000.0,
        rotation_size: 3,
        cart_capacity: 10,
        rng_seed: Some(7),
        grades: GradeThresholds::default(),
    }
}

/// Boots through Loading and Title into Shopping. On return the session is
/// running and the first rotation is on display.
fn start_shopping(app: &mut App) {
    app.update(); // Loading: catalog parsed
    app.update(); // Title
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Shopping);
    app.update(); // Shopping: session begins, first rotation drawn
    *app.world_mut().resource_mut::<Observed>() = Observed::default();
}

fn set_step(app: &mut App, secs: f32) {
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
        secs,
    )));
}

fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

fn balance(app: &App) -> u64 {
    app.world().resource::<Ledger>().balance()
}

fn displayed(app: &App, slot: usize) -> ItemPick {
    app.world().resource::<Storefront>().picks[slot].clone()
}

fn run_until_ending(app: &mut App, max_frames: usize) {
    for _ in 0..max_frames {
        if state(app) == GameState::Ending {
            return;
        }
        app.update();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Boot
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_headless_boot_reaches_title_with_catalog() {
    let mut app = build_test_app(test_config());

    // First update enters Loading and fills the catalog; second applies NextState.
    app.update();
    app.update();

    assert_eq!(state(&app), GameState::Title, "Expected Title after loading data");
    let catalog = app.world().resource::<ItemCatalog>();
    assert!(catalog.len() >= 10, "catalog should be populated during boot");
    assert!(catalog.get("G_SIM_0001").is_some());
}

#[test]
fn test_session_start_opens_ledger_and_draws_cards() {
    let mut app = build_test_app(test_config());
    start_shopping(&mut app);

    assert_eq!(state(&app), GameState::Shopping);
    assert_eq!(balance(&app), 25_000);

    let clock = app.world().resource::<SessionClock>();
    assert!(clock.is_running());
    assert_eq!(clock.start_balance(), 25_000);
    assert!(!clock.has_spent());

    let storefront = app.world().resource::<Storefront>();
    assert_eq!(storefront.picks.len(), 3);
    assert_eq!(storefront.rotations, 1);
    let catalog = app.world().resource::<ItemCatalog>();
    for pick in &storefront.picks {
        assert!(catalog.get(&pick.id).is_some(), "{} not from catalog", pick.id);
    }

    assert!(app.world().resource::<Cart>().is_empty());
    assert_eq!(app.world().resource::<Cart>().capacity(), 10);
    assert!(app.world().resource::<Library>().is_empty());
}

#[test]
fn test_same_seed_draws_same_opening_cards() {
    let mut a = build_test_app(test_config());
    let mut b = build_test_app(test_config());
    start_shopping(&mut a);
    start_shopping(&mut b);

    let ids = |app: &App| -> Vec<ItemId> {
        app.world()
            .resource::<Storefront>()
            .picks
            .iter()
            .map(|p| p.id.clone())
            .collect()
    };
    assert_eq!(ids(&a), ids(&b));
}

// ─────────────────────────────────────────────────────────────────────────────
// Purchases
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_purchase_debits_and_adds_to_library() {
    let mut app = build_test_app(test_config());
    start_shopping(&mut app);

    let pick = displayed(&app, 0);
    app.world_mut().send_event(PurchaseRequestEvent {
        item_id: pick.id.clone(),
    });
    app.update();

    assert_eq!(balance(&app), 25_000 - pick.final_price_cents());
    let library = app.world().resource::<Library>();
    assert_eq!(library.len(), 1);
    assert!(library.has_item(&pick.id));

    let observed = app.world().resource::<Observed>();
    assert_eq!(observed.library_changed, 1);
    assert_eq!(observed.balance_changes, vec![25_000 - pick.final_price_cents()]);
    assert!(app.world().resource::<SessionClock>().has_spent());

    let stats = app.world().resource::<LibraryStats>();
    assert_eq!(stats.total_items, 1);
    assert_eq!(stats.total_original_price_cents, pick.original_price_cents as u64);
}

#[test]
fn test_repeat_purchase_adds_second_copy() {
    let mut app = build_test_app(test_config());
    start_shopping(&mut app);

    let pick = displayed(&app, 1);
    for _ in 0..2 {
        app.world_mut().send_event(PurchaseRequestEvent {
            item_id: pick.id.clone(),
        });
    }
    app.update();

    assert_eq!(app.world().resource::<Library>().len(), 2);
    assert_eq!(balance(&app), 25_000 - 2 * pick.final_price_cents());
}

#[test]
fn test_purchase_refused_when_unaffordable() {
    let mut app = build_test_app(ShopConfig {
        starting_balance_cents: 1,
        ..test_config()
    });
    start_shopping(&mut app);

    let pick = displayed(&app, 0);
    assert!(pick.final_price_cents() > 1);
    app.world_mut().send_event(PurchaseRequestEvent { item_id: pick.id });
    app.update();

    assert_eq!(balance(&app), 1, "failed spend leaves the balance alone");
    assert!(app.world().resource::<Library>().is_empty());
    let observed = app.world().resource::<Observed>();
    assert_eq!(observed.refusals, vec![Refusal::InsufficientFunds]);
    assert!(observed.balance_changes.is_empty());
    assert_eq!(app.world().resource::<EconomyStats>().refusals, 1);
}

#[test]
fn test_purchase_of_item_not_on_display_is_refused() {
    let mut app = build_test_app(test_config());
    start_shopping(&mut app);

    app.world_mut().send_event(PurchaseRequestEvent {
        item_id: "NOT_A_GAME".to_string(),
    });
    app.update();

    assert_eq!(balance(&app), 25_000);
    assert_eq!(
        app.world().resource::<Observed>().refusals,
        vec![Refusal::UnknownItem]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Cart
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_clearing_empty_cart_notifies_once() {
    let mut app = build_test_app(test_config());
    start_shopping(&mut app);

    app.world_mut().send_event(ClearCartRequestEvent);
    app.update();

    assert!(app.world().resource::<Cart>().is_empty());
    assert_eq!(app.world().resource::<Observed>().cart_changed, 1);
}

#[test]
fn test_cart_capacity_refuses_extra_items() {
    let mut app = build_test_app(ShopConfig {
        cart_capacity: 2,
        ..test_config()
    });
    start_shopping(&mut app);

    let pick = displayed(&app, 0);
    for _ in 0..3 {
        app.world_mut().send_event(AddToCartRequestEvent {
            item_id: pick.id.clone(),
        });
    }
    app.update();

    let cart = app.world().resource::<Cart>();
    assert_eq!(cart.len(), 2);
    assert_eq!(cart.count_of(&pick.id), 2);
    let observed = app.world().resource::<Observed>();
    assert_eq!(observed.cart_changed, 2);
    assert_eq!(observed.refusals, vec![Refusal::CartFull]);
}

#[test]
fn test_remove_from_cart_by_id_and_index() {
    let mut app = build_test_app(test_config());
    start_shopping(&mut app);

    let first = displayed(&app, 0);
    let second = displayed(&app, 1);
    for pick in [&first, &second, &first] {
        app.world_mut().send_event(AddToCartRequestEvent {
            item_id: pick.id.clone(),
        });
    }
    app.update();

    app.world_mut().send_event(RemoveFromCartRequestEvent {
        target: CartTarget::Item(first.id.clone()),
    });
    app.world_mut().send_event(RemoveFromCartRequestEvent {
        target: CartTarget::Index(5),
    });
    app.update();

    let cart = app.world().resource::<Cart>();
    assert_eq!(cart.len(), 2);
    assert_eq!(cart.items()[0].id, second.id, "first matching entry removed");
    assert_eq!(
        app.world().resource::<Observed>().refusals,
        vec![Refusal::InvalidIndex]
    );
}

#[test]
fn test_checkout_moves_cart_into_library() {
    let mut app = build_test_app(test_config());
    start_shopping(&mut app);

    let picks: Vec<ItemPick> = (0..3).map(|i| displayed(&app, i)).collect();
    for pick in &picks {
        app.world_mut().send_event(AddToCartRequestEvent {
            item_id: pick.id.clone(),
        });
    }
    app.update();
    let total: u64 = picks.iter().map(ItemPick::final_price_cents).sum();
    assert_eq!(app.world().resource::<Cart>().total_price_cents(), total);

    app.world_mut().resource_mut::<Observed>().library_changed = 0;
    app.world_mut().resource_mut::<Observed>().cart_changed = 0;
    app.world_mut().send_event(CheckoutRequestEvent);
    app.update();

    assert!(app.world().resource::<Cart>().is_empty());
    let library = app.world().resource::<Library>();
    assert_eq!(library.len(), 3);
    for pick in &picks {
        assert!(library.has_item(&pick.id));
    }
    assert_eq!(balance(&app), 25_000 - total);

    let observed = app.world().resource::<Observed>();
    assert_eq!(observed.library_changed, 3);
    assert_eq!(observed.cart_changed, 1);
    assert_eq!(app.world().resource::<EconomyStats>().checkouts, 1);
}

#[test]
fn test_checkout_without_funds_keeps_cart() {
    let mut app = build_test_app(ShopConfig {
        starting_balance_cents: 1,
        ..test_config()
    });
    start_shopping(&mut app);

    let pick = displayed(&app, 0);
    app.world_mut().send_event(AddToCartRequestEvent { item_id: pick.id });
    app.update();
    app.world_mut().send_event(CheckoutRequestEvent);
    app.update();

    assert_eq!(app.world().resource::<Cart>().len(), 1);
    assert!(app.world().resource::<Library>().is_empty());
    assert_eq!(balance(&app), 1);
    assert_eq!(
        app.world().resource::<Observed>().refusals,
        vec![Refusal::InsufficientFunds]
    );
}

#[test]
fn test_checkout_of_empty_cart_is_refused() {
    let mut app = build_test_app(test_config());
    start_shopping(&mut app);

    app.world_mut().send_event(CheckoutRequestEvent);
    app.update();

    assert_eq!(
        app.world().resource::<Observed>().refusals,
        vec![Refusal::CartEmpty]
    );
    assert_eq!(balance(&app), 25_000);
}

// ─────────────────────────────────────────────────────────────────────────────
// Session outcomes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_timeout_without_spending() {
    let mut app = build_test_app(ShopConfig {
        starting_balance_cents: 10_000,
        duration_secs: 5.0,
        ..test_config()
    });
    start_shopping(&mut app);

    set_step(&mut app, 1.0);
    run_until_ending(&mut app, 20);

    assert_eq!(state(&app), GameState::Ending);
    let clock = app.world().resource::<SessionClock>();
    assert_eq!(clock.outcome(), Some(SessionOutcome::TimeoutNoSpend));
    assert_eq!(clock.time_left(), 0.0);
    assert_eq!(
        app.world().resource::<Observed>().endings,
        vec![SessionOutcome::TimeoutNoSpend]
    );
}

#[test]
fn test_timeout_after_spending() {
    let mut app = build_test_app(ShopConfig {
        starting_balance_cents: 10_000,
        duration_secs: 5.0,
        ..test_config()
    });
    start_shopping(&mut app);

    let pick = displayed(&app, 0);
    app.world_mut().send_event(PurchaseRequestEvent { item_id: pick.id });
    app.update();
    assert!(app.world().resource::<SessionClock>().has_spent());

    set_step(&mut app, 1.0);
    run_until_ending(&mut app, 20);

    assert_eq!(
        app.world().resource::<SessionClock>().outcome(),
        Some(SessionOutcome::TimeoutSpent)
    );
    assert_eq!(
        app.world().resource::<Observed>().endings,
        vec![SessionOutcome::TimeoutSpent]
    );
}

#[test]
fn test_spending_to_zero_depletes_session() {
    let mut app = build_test_app(test_config());
    start_shopping(&mut app);

    // Leave exactly enough for the first card.
    let pick = displayed(&app, 0);
    let price = pick.final_price_cents();
    app.world_mut().resource_mut::<Ledger>().restore(price);

    app.world_mut().send_event(PurchaseRequestEvent { item_id: pick.id });
    app.update();
    app.update();

    assert_eq!(balance(&app), 0);
    assert_eq!(state(&app), GameState::Ending);
    assert_eq!(
        app.world().resource::<SessionClock>().outcome(),
        Some(SessionOutcome::Depleted)
    );
    // Balance-changed and depleted both fire; the session ends only once.
    assert_eq!(
        app.world().resource::<Observed>().endings,
        vec![SessionOutcome::Depleted]
    );
}

fn flat_catalog(price_cents: u32) -> ItemCatalog {
    let defs = ["G_PUZ_0001", "G_PUZ_0002", "G_PUZ_0003"]
        .iter()
        .map(|id| ItemDefinition {
            id: id.to_string(),
            display_name: format!("Puzzle {}", id),
            base_price_cents: price_cents,
            discount: 1.0,
            cover_art: String::new(),
            series: String::new(),
            series_count: 0,
            category: "Puzzle".to_string(),
            quality: 3.0,
        })
        .collect();
    ItemCatalog::from_definitions(defs)
}

#[test]
fn test_single_spend_of_whole_balance_depletes_session() {
    let mut app = build_test_app(ShopConfig {
        starting_balance_cents: 500,
        ..test_config()
    });
    app.update(); // Loading
    app.update(); // Title
    app.insert_resource(flat_catalog(500));
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Shopping);
    app.update();
    assert_eq!(state(&app), GameState::Shopping);
    assert_eq!(balance(&app), 500);

    let pick = displayed(&app, 0);
    assert_eq!(pick.final_price_cents(), 500);
    app.world_mut().send_event(PurchaseRequestEvent { item_id: pick.id });
    app.update();
    app.update();

    assert_eq!(balance(&app), 0);
    assert_eq!(app.world().resource::<Library>().len(), 1);
    assert_eq!(state(&app), GameState::Ending);
    assert_eq!(
        app.world().resource::<SessionClock>().outcome(),
        Some(SessionOutcome::Depleted)
    );
    assert_eq!(
        app.world().resource::<Observed>().endings,
        vec![SessionOutcome::Depleted]
    );
}

#[test]
fn test_zero_starting_balance_ends_session_immediately() {
    let mut app = build_test_app(ShopConfig {
        starting_balance_cents: 0,
        ..test_config()
    });
    app.update(); // Loading
    app.update(); // Title
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Shopping);
    app.update(); // session opens empty and ends in the same frame
    app.update();

    assert_eq!(balance(&app), 0);
    assert_eq!(state(&app), GameState::Ending);
    assert_eq!(
        app.world().resource::<SessionClock>().outcome(),
        Some(SessionOutcome::Depleted)
    );
    assert_eq!(
        app.world().resource::<Observed>().endings,
        vec![SessionOutcome::Depleted]
    );
    assert!(app.world().resource::<Library>().is_empty());
}

#[test]
fn test_ended_session_ignores_further_ticks() {
    let mut app = build_test_app(ShopConfig {
        duration_secs: 2.0,
        ..test_config()
    });
    start_shopping(&mut app);

    set_step(&mut app, 1.0);
    run_until_ending(&mut app, 20);
    assert_eq!(state(&app), GameState::Ending);

    let rotations = app.world().resource::<Storefront>().rotations;
    for _ in 0..10 {
        app.update();
    }

    let clock = app.world().resource::<SessionClock>();
    assert_eq!(clock.outcome(), Some(SessionOutcome::TimeoutNoSpend));
    assert_eq!(clock.time_left(), 0.0);
    assert_eq!(app.world().resource::<Storefront>().rotations, rotations);
    assert_eq!(app.world().resource::<Observed>().endings.len(), 1);
}

#[test]
fn test_missing_ledger_disables_clock() {
    let mut app = build_test_app(ShopConfig {
        duration_secs: 2.0,
        ..test_config()
    });
    app.world_mut().remove_resource::<Ledger>();
    start_shopping(&mut app);

    assert_eq!(
        app.world().resource::<SessionClock>().phase(),
        SessionPhase::Disabled
    );

    set_step(&mut app, 1.0);
    for _ in 0..10 {
        app.update();
    }

    assert_eq!(state(&app), GameState::Shopping, "degraded session never ends");
    assert!(app.world().resource::<Observed>().endings.is_empty());
    assert!(app.world().resource::<Storefront>().picks.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Rotation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_rotation_refreshes_storefront_on_interval() {
    let mut app = build_test_app(ShopConfig {
        duration_secs: 100.0,
        rotation_interval_secs: 1.0,
        ..test_config()
    });
    start_shopping(&mut app);
    assert_eq!(app.world().resource::<Storefront>().rotations, 1);

    set_step(&mut app, 1.0);
    for _ in 0..5 {
        app.update();
    }

    let storefront = app.world().resource::<Storefront>();
    assert!(storefront.rotations >= 4, "got {} rotations", storefront.rotations);
    assert_eq!(storefront.picks.len(), 3);
    assert_eq!(state(&app), GameState::Shopping);
}

// ─────────────────────────────────────────────────────────────────────────────
// Outcome screen
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_final_evaluation_scores_library() {
    let mut app = build_test_app(ShopConfig {
        duration_secs: 3.0,
        ..test_config()
    });
    start_shopping(&mut app);

    for slot in 0..2 {
        let pick = displayed(&app, slot);
        app.world_mut().send_event(PurchaseRequestEvent { item_id: pick.id });
    }
    app.update();

    set_step(&mut app, 1.0);
    run_until_ending(&mut app, 20);
    app.update(); // OnEnter(Ending) has run

    let owned = app.world().resource::<Library>().snapshot();
    let (expected_total, expected_grade) = evaluate(&owned, &GradeThresholds::default());

    let evaluation = app.world().resource::<FinalEvaluation>();
    assert_eq!(evaluation.outcome, Some(SessionOutcome::TimeoutSpent));
    assert_eq!(evaluation.items_owned, 2);
    assert_eq!(evaluation.total_score, expected_total);
    assert_eq!(evaluation.grade, Some(expected_grade));
}

#[test]
fn test_try_again_starts_fresh_session() {
    let mut app = build_test_app(ShopConfig {
        duration_secs: 2.0,
        ..test_config()
    });
    start_shopping(&mut app);

    let pick = displayed(&app, 0);
    let second_id = displayed(&app, 1).id;
    app.world_mut().send_event(PurchaseRequestEvent { item_id: pick.id });
    app.world_mut().send_event(AddToCartRequestEvent {
        item_id: second_id,
    });
    app.update();

    set_step(&mut app, 1.0);
    run_until_ending(&mut app, 20);
    assert_eq!(state(&app), GameState::Ending);

    set_step(&mut app, 0.0);
    app.world_mut().send_event(RestartSessionEvent);
    app.update(); // restart requested
    app.update(); // back in Shopping

    assert_eq!(state(&app), GameState::Shopping);
    assert_eq!(balance(&app), 25_000);
    assert!(app.world().resource::<Library>().is_empty());
    assert!(app.world().resource::<Cart>().is_empty());
    let clock = app.world().resource::<SessionClock>();
    assert!(clock.is_running());
    assert!(!clock.has_spent());
    assert_eq!(clock.time_left(), 2.0);
    assert_eq!(app.world().resource::<Storefront>().picks.len(), 3);
    assert_eq!(app.world().resource::<EconomyStats>().purchases, 0);
}
