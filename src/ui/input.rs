use bevy::prelude::*;
use crate::shared::*;
use super::ListingTab;

/// Enter leaves the title screen.
pub fn title_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if keyboard.just_pressed(KeyCode::Enter) {
        next_state.set(GameState::Shopping);
    }
}

/// Translates keys into shop requests. The economy domain decides whether
/// each request succeeds.
pub fn shop_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    storefront: Res<Storefront>,
    cart: Res<Cart>,
    mut tab: ResMut<ListingTab>,
    mut purchase_writer: EventWriter<PurchaseRequestEvent>,
    mut add_writer: EventWriter<AddToCartRequestEvent>,
    mut remove_writer: EventWriter<RemoveFromCartRequestEvent>,
    mut checkout_writer: EventWriter<CheckoutRequestEvent>,
    mut clear_writer: EventWriter<ClearCartRequestEvent>,
) {
    let buy_keys = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3];
    let cart_keys = [KeyCode::KeyQ, KeyCode::KeyW, KeyCode::KeyE];

    for (slot, key) in buy_keys.iter().enumerate() {
        if keyboard.just_pressed(*key) {
            if let Some(pick) = storefront.picks.get(slot) {
                purchase_writer.send(PurchaseRequestEvent {
                    item_id: pick.id.clone(),
                });
            }
        }
    }
    for (slot, key) in cart_keys.iter().enumerate() {
        if keyboard.just_pressed(*key) {
            if let Some(pick) = storefront.picks.get(slot) {
                add_writer.send(AddToCartRequestEvent {
                    item_id: pick.id.clone(),
                });
            }
        }
    }

    if keyboard.just_pressed(KeyCode::KeyC) {
        checkout_writer.send(CheckoutRequestEvent);
    }
    if keyboard.just_pressed(KeyCode::KeyX) {
        clear_writer.send(ClearCartRequestEvent);
    }
    if keyboard.just_pressed(KeyCode::Backspace) {
        // An empty cart turns into an InvalidIndex refusal.
        remove_writer.send(RemoveFromCartRequestEvent {
            target: CartTarget::Index(cart.len().saturating_sub(1)),
        });
    }
    if keyboard.just_pressed(KeyCode::Tab) {
        *tab = match *tab {
            ListingTab::Cart => ListingTab::Library,
            ListingTab::Library => ListingTab::Cart,
        };
    }
}

/// R asks for another session.
pub fn ending_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut restart_writer: EventWriter<RestartSessionEvent>,
) {
    if keyboard.just_pressed(KeyCode::KeyR) {
        restart_writer.send(RestartSessionEvent);
    }
}
