use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// PUBLIC TYPES
// ═══════════════════════════════════════════════════════════════════════

pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to hand the shop over between views: balance, cart
/// contents and the owned library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopSnapshot {
    pub version: u32,
    pub balance_cents: u64,
    pub cart: Cart,
    pub library: Library,
}

impl ShopSnapshot {
    pub fn capture(ledger: &Ledger, cart: &Cart, library: &Library) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            balance_cents: ledger.balance(),
            cart: cart.clone(),
            library: library.clone(),
        }
    }

    /// Writes the captured state back. Does not emit notifications; callers
    /// that need re-rendering send the change events themselves.
    ///
    /// The cart is rebuilt through `Cart::add`, so entries past its capacity
    /// are dropped rather than restored.
    pub fn restore_into(&self, ledger: &mut Ledger, cart: &mut Cart, library: &mut Library) {
        ledger.restore(self.balance_cents);

        let mut rebuilt = Cart::with_capacity(self.cart.capacity());
        for pick in self.cart.items() {
            if rebuilt.add(pick.clone()).is_err() {
                warn!(
                    "[Snapshot] Cart over capacity {}; dropping '{}'",
                    rebuilt.capacity(),
                    pick.id
                );
            }
        }
        *cart = rebuilt;
        *library = self.library.clone();
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Serialization failed: {}", e))
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        let snapshot: ShopSnapshot =
            serde_json::from_str(json).map_err(|e| format!("Deserialization failed: {}", e))?;
        if snapshot.version != SNAPSHOT_VERSION {
            warn!(
                "Snapshot has version {} but current version is {}. Loading anyway.",
                snapshot.version, SNAPSHOT_VERSION
            );
        }
        if snapshot.cart.len() > snapshot.cart.capacity() {
            return Err(format!(
                "Cart holds {} item(s) but its capacity is {}",
                snapshot.cart.len(),
                snapshot.cart.capacity()
            ));
        }
        Ok(snapshot)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SnapshotPlugin;

impl Plugin for SnapshotPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            dump_snapshot_keybind
                .in_set(ShopSet::Input)
                .run_if(in_state(GameState::Shopping))
                .run_if(resource_exists::<ButtonInput<KeyCode>>),
        );
    }
}

/// F5 logs the current shop state as JSON.
fn dump_snapshot_keybind(
    keys: Res<ButtonInput<KeyCode>>,
    ledger: Option<Res<Ledger>>,
    cart: Res<Cart>,
    library: Res<Library>,
) {
    if !keys.just_pressed(KeyCode::F5) {
        return;
    }
    let Some(ledger) = ledger else {
        warn!("[Snapshot] No ledger to capture.");
        return;
    };
    match ShopSnapshot::capture(&ledger, &cart, &library).to_json() {
        Ok(json) => info!("[Snapshot]\n{}", json),
        Err(e) => error!("[Snapshot] {}", e),
    }
}
