//! Cart maintenance and checkout.
//!
//! Checkout is the only path from Cart to Library besides a direct purchase.
//! It charges the cart total in one debit; if the balance cannot cover it the
//! cart is left exactly as it was.

use bevy::prelude::*;
use crate::shared::*;

use super::ledger::{charge, EconomyStats};

pub fn handle_remove_from_cart(
    mut remove_events: EventReader<RemoveFromCartRequestEvent>,
    mut cart: ResMut<Cart>,
    mut cart_writer: EventWriter<CartChangedEvent>,
    mut refused_writer: EventWriter<ShopRefusedEvent>,
) {
    for ev in remove_events.read() {
        let result = match &ev.target {
            CartTarget::Item(id) => cart.remove_by_id(id),
            CartTarget::Index(index) => cart.remove_at(*index),
        };
        match result {
            Ok(removed) => {
                info!(
                    "[Cart] Removed '{}' ({} in cart)",
                    removed.title,
                    cart.capacity_string()
                );
                cart_writer.send(CartChangedEvent);
            }
            Err(reason) => {
                warn!("[Cart] Remove failed for {:?}: {}", ev.target, reason);
                refused_writer.send(ShopRefusedEvent { reason });
            }
        }
    }
}

/// Clearing always notifies, even when the cart was already empty.
pub fn handle_clear_cart(
    mut clear_events: EventReader<ClearCartRequestEvent>,
    mut cart: ResMut<Cart>,
    mut cart_writer: EventWriter<CartChangedEvent>,
) {
    for _ev in clear_events.read() {
        let dropped = cart.clear();
        info!("[Cart] Cleared, removed {} item(s)", dropped);
        cart_writer.send(CartChangedEvent);
    }
}

pub fn handle_checkout(
    mut checkout_events: EventReader<CheckoutRequestEvent>,
    mut cart: ResMut<Cart>,
    mut ledger: ResMut<Ledger>,
    mut library: ResMut<Library>,
    mut stats: ResMut<EconomyStats>,
    mut balance_writer: EventWriter<BalanceChangedEvent>,
    mut depleted_writer: EventWriter<DepletedEvent>,
    mut cart_writer: EventWriter<CartChangedEvent>,
    mut library_writer: EventWriter<LibraryChangedEvent>,
    mut refused_writer: EventWriter<ShopRefusedEvent>,
) {
    for _ev in checkout_events.read() {
        if cart.is_empty() {
            warn!("[Cart] Cart is empty, nothing to check out");
            refused_writer.send(ShopRefusedEvent {
                reason: Refusal::CartEmpty,
            });
            continue;
        }

        cart.log_contents();
        let total = cart.total_price_cents();
        let memo = format!("Checkout of {} item(s)", cart.len());
        if let Err(reason) = charge(
            &mut ledger,
            total,
            &memo,
            &mut balance_writer,
            &mut depleted_writer,
        ) {
            refused_writer.send(ShopRefusedEvent { reason });
            continue;
        }

        let bought = cart.take_all();
        let count = bought.len();
        for pick in bought {
            library.add_item(pick);
            library_writer.send(LibraryChangedEvent);
        }
        cart_writer.send(CartChangedEvent);

        stats.total_spent_cents = stats.total_spent_cents.saturating_add(total);
        stats.checkouts += 1;

        info!(
            "[Cart] Checked out {} item(s) for {}. Library now holds {}.",
            count,
            format_cents(total),
            library.len()
        );
    }
}
