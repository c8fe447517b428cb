//! Session domain: the shop's countdown.
//!
//! Responsible for:
//! - Ordering the frame (`ShopSet` chain)
//! - Opening a session on entry to Shopping: ledger, cart, library, clock
//! - Ticking the clock on real time and raising rotation ticks
//! - Ending the session exactly once (timeout or depletion) and routing to
//!   the outcome screen
//! - Restarting from the outcome screen

use bevy::prelude::*;

use crate::shared::*;

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                ShopSet::Input,
                ShopSet::Transactions,
                ShopSet::Session,
                ShopSet::Rotation,
            )
                .chain(),
        )
        .init_resource::<SessionClock>()
        .add_systems(OnEnter(GameState::Shopping), begin_session)
        .add_systems(
            Update,
            (
                observe_balance_changes,
                observe_depletion,
                tick_session_clock,
                route_session_outcome,
            )
                .chain()
                .in_set(ShopSet::Session)
                .run_if(in_state(GameState::Shopping)),
        )
        .add_systems(
            Update,
            handle_restart.run_if(in_state(GameState::Ending)),
        );
    }
}

// ─── Session start ────────────────────────────────────────────────────────────

/// Opens a fresh session unless one is already running. Coming back to
/// Shopping from another view keeps the clock where it was.
fn begin_session(
    mut clock: ResMut<SessionClock>,
    ledger: Option<ResMut<Ledger>>,
    config: Res<ShopConfig>,
    mut cart: ResMut<Cart>,
    mut library: ResMut<Library>,
    mut balance_writer: EventWriter<BalanceChangedEvent>,
    mut depleted_writer: EventWriter<DepletedEvent>,
    mut cart_writer: EventWriter<CartChangedEvent>,
    mut library_writer: EventWriter<LibraryChangedEvent>,
    mut started_writer: EventWriter<SessionStartedEvent>,
) {
    if clock.phase() != SessionPhase::Idle {
        return;
    }

    let Some(mut ledger) = ledger else {
        error!("[Session] No ledger present; the session clock is disabled.");
        clock.disable();
        return;
    };

    *cart = Cart::with_capacity(config.cart_capacity);
    *library = Library::default();
    cart_writer.send(CartChangedEvent);
    library_writer.send(LibraryChangedEvent);

    let update = ledger.init(config.starting_balance_cents);
    balance_writer.send(BalanceChangedEvent {
        balance: update.balance,
    });
    if update.depleted {
        warn!("[Session] Ledger opened empty.");
        depleted_writer.send(DepletedEvent);
    }

    clock.start(
        config.duration_secs,
        config.rotation_interval_secs,
        update.balance,
    );
    started_writer.send(SessionStartedEvent {
        starting_balance: update.balance,
    });

    info!(
        "[Session] Session started — {} to spend, {} on the clock",
        format_cents(update.balance),
        clock.display()
    );
}

// ─── Balance observers ───────────────────────────────────────────────────────

fn observe_balance_changes(
    mut events: EventReader<BalanceChangedEvent>,
    mut clock: ResMut<SessionClock>,
    mut ended_writer: EventWriter<SessionEndedEvent>,
) {
    for ev in events.read() {
        if let Some(outcome) = clock.observe_balance(ev.balance) {
            info!("[Session] Balance reached zero — session over");
            ended_writer.send(SessionEndedEvent { outcome });
        }
    }
}

fn observe_depletion(
    mut events: EventReader<DepletedEvent>,
    mut clock: ResMut<SessionClock>,
    mut ended_writer: EventWriter<SessionEndedEvent>,
) {
    for _ev in events.read() {
        if let Some(outcome) = clock.observe_depleted() {
            info!("[Session] Depleted — session over");
            ended_writer.send(SessionEndedEvent { outcome });
        }
    }
}

// ─── Clock tick ──────────────────────────────────────────────────────────────

/// Advances on real time so the countdown ignores any virtual time scaling.
fn tick_session_clock(
    time: Res<Time<Real>>,
    mut clock: ResMut<SessionClock>,
    mut rotate_writer: EventWriter<RotateCatalogEvent>,
    mut ended_writer: EventWriter<SessionEndedEvent>,
) {
    let tick = clock.tick(time.delta_secs());

    if tick.rotate {
        rotate_writer.send(RotateCatalogEvent);
    }
    if let Some(outcome) = tick.ended {
        info!("[Session] Time's up — {:?}", outcome);
        ended_writer.send(SessionEndedEvent { outcome });
    }
}

// ─── Outcome routing ─────────────────────────────────────────────────────────

fn route_session_outcome(
    mut events: EventReader<SessionEndedEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    // At most one per session; the clock only finishes once.
    if let Some(ev) = events.read().last() {
        info!("[Session] Routing to outcome screen: {:?}", ev.outcome);
        next_state.set(GameState::Ending);
    }
}

// ─── Restart ─────────────────────────────────────────────────────────────────

fn handle_restart(
    mut events: EventReader<RestartSessionEvent>,
    mut clock: ResMut<SessionClock>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if events.read().count() == 0 {
        return;
    }
    clock.reset();
    info!("[Session] Try again — returning to the shop");
    next_state.set(GameState::Shopping);
}
