use bevy::prelude::*;
use crate::shared::*;

/// Running totals for the current session, reset when a new one begins.
#[derive(Resource, Debug, Clone, Default)]
pub struct EconomyStats {
    pub total_spent_cents: u64,
    pub purchases: u64,
    pub checkouts: u64,
    pub refusals: u64,
}

/// Debits the ledger and emits balance notifications on success.
///
/// `depleted` follows `balance_changed` in the same frame so listeners that
/// only watch one of them still see the session end.
pub fn charge(
    ledger: &mut Ledger,
    amount: u64,
    reason: &str,
    balance_writer: &mut EventWriter<BalanceChangedEvent>,
    depleted_writer: &mut EventWriter<DepletedEvent>,
) -> Result<BalanceUpdate, Refusal> {
    match ledger.spend(amount) {
        Ok(update) => {
            info!(
                "[Economy] -{}: {}. New balance: {}",
                format_cents(amount),
                reason,
                format_cents(update.balance)
            );
            balance_writer.send(BalanceChangedEvent {
                balance: update.balance,
            });
            if update.depleted {
                info!("[Economy] Balance depleted.");
                depleted_writer.send(DepletedEvent);
            }
            Ok(update)
        }
        Err(refusal) => {
            info!(
                "[Economy] Cannot afford {} for {} (have {})",
                format_cents(amount),
                reason,
                format_cents(ledger.balance())
            );
            Err(refusal)
        }
    }
}

pub fn reset_on_session_start(
    mut events: EventReader<SessionStartedEvent>,
    mut stats: ResMut<EconomyStats>,
    mut library_stats: ResMut<LibraryStats>,
) {
    if events.read().count() == 0 {
        return;
    }
    *stats = EconomyStats::default();
    *library_stats = LibraryStats::default();
}

/// Counts refusals for the end-of-session evaluation log line.
pub fn track_refusals(
    mut events: EventReader<ShopRefusedEvent>,
    mut stats: ResMut<EconomyStats>,
) {
    for ev in events.read() {
        stats.refusals = stats.refusals.saturating_add(1);
        debug!("[Economy] Refused: {}", ev.reason);
    }
}
