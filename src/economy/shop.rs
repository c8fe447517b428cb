use bevy::prelude::*;
use crate::shared::*;

use super::ledger::{charge, EconomyStats};

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

/// Processes PurchaseRequestEvents: direct buy of a card on display.
///
/// Pays the final price, then adds one copy to the library. Owning the item
/// already is fine; repeat purchases add another copy.
pub fn handle_purchase(
    mut purchase_events: EventReader<PurchaseRequestEvent>,
    storefront: Res<Storefront>,
    mut ledger: ResMut<Ledger>,
    mut library: ResMut<Library>,
    mut stats: ResMut<EconomyStats>,
    mut balance_writer: EventWriter<BalanceChangedEvent>,
    mut depleted_writer: EventWriter<DepletedEvent>,
    mut library_writer: EventWriter<LibraryChangedEvent>,
    mut refused_writer: EventWriter<ShopRefusedEvent>,
) {
    for ev in purchase_events.read() {
        let Some(pick) = storefront.find(&ev.item_id) else {
            warn!("[Economy] Purchase failed — '{}' is not on display", ev.item_id);
            refused_writer.send(ShopRefusedEvent {
                reason: Refusal::UnknownItem,
            });
            continue;
        };

        let price = pick.final_price_cents();
        let memo = format!("Bought {}", pick.title);
        if let Err(reason) = charge(
            &mut ledger,
            price,
            &memo,
            &mut balance_writer,
            &mut depleted_writer,
        ) {
            refused_writer.send(ShopRefusedEvent { reason });
            continue;
        }

        library.add_item(pick.clone());
        library_writer.send(LibraryChangedEvent);

        stats.total_spent_cents = stats.total_spent_cents.saturating_add(price);
        stats.purchases += 1;

        info!(
            "[Economy] Purchased '{}' for {}. Library now holds {} item(s).",
            pick.id,
            format_cents(price),
            library.len()
        );
    }
}

/// Processes AddToCartRequestEvents. Duplicates and already-owned items are
/// accepted; only a full cart or an unknown id is refused.
pub fn handle_add_to_cart(
    mut add_events: EventReader<AddToCartRequestEvent>,
    storefront: Res<Storefront>,
    mut cart: ResMut<Cart>,
    mut cart_writer: EventWriter<CartChangedEvent>,
    mut refused_writer: EventWriter<ShopRefusedEvent>,
) {
    for ev in add_events.read() {
        let Some(pick) = storefront.find(&ev.item_id) else {
            warn!("[Cart] Tried to add '{}' which is not on display", ev.item_id);
            refused_writer.send(ShopRefusedEvent {
                reason: Refusal::UnknownItem,
            });
            continue;
        };

        match cart.add(pick.clone()) {
            Ok(()) => {
                info!(
                    "[Cart] Added '{}' ({} in cart)",
                    pick.title,
                    cart.capacity_string()
                );
                cart_writer.send(CartChangedEvent);
            }
            Err(reason) => {
                warn!(
                    "[Cart] Cart is full, at most {} items",
                    cart.capacity()
                );
                refused_writer.send(ShopRefusedEvent { reason });
            }
        }
    }
}
