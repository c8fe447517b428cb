use bevy::prelude::*;
use crate::shared::*;
use super::{ListingTab, RefusalBanner};

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS: used to query and update HUD elements
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct HudRoot;

#[derive(Component)]
pub struct HudBalanceText;

#[derive(Component)]
pub struct HudTimerText;

#[derive(Component)]
pub struct HudCartText;

#[derive(Component)]
pub struct HudOwnedText;

/// One storefront card; `index` is its position in `Storefront::picks`.
#[derive(Component)]
pub struct HudCard {
    pub index: usize,
}

#[derive(Component)]
pub struct HudCardText {
    pub index: usize,
}

#[derive(Component)]
pub struct HudListingText;

#[derive(Component)]
pub struct HudRefusalText;

const CARD_BG: Color = Color::srgb(0.14, 0.18, 0.26);
const CARD_BG_OWNED: Color = Color::srgb(0.12, 0.24, 0.18);
const PANEL_BG: Color = Color::srgba(0.05, 0.06, 0.09, 0.9);

/// Keys printed on the cards: buy / add to cart.
const CARD_KEYS: [(&str, &str); 3] = [("1", "Q"), ("2", "W"), ("3", "E")];

// ═══════════════════════════════════════════════════════════════════════
// SPAWN / DESPAWN
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_hud(mut commands: Commands, config: Res<ShopConfig>) {
    commands
        .spawn((
            HudRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(16.0)),
                row_gap: Val::Px(14.0),
                ..default()
            },
            BackgroundColor(Color::srgb(0.09, 0.11, 0.16)),
        ))
        .with_children(|root| {
            // ── Top bar ──
            root.spawn((
                Node {
                    width: Val::Percent(100.0),
                    justify_content: JustifyContent::SpaceBetween,
                    padding: UiRect::axes(Val::Px(12.0), Val::Px(8.0)),
                    ..default()
                },
                BackgroundColor(PANEL_BG),
            ))
            .with_children(|bar| {
                bar.spawn((
                    HudBalanceText,
                    Text::new("$0.00"),
                    TextFont { font_size: 24.0, ..default() },
                    TextColor(Color::srgb(0.55, 0.9, 0.45)),
                ));
                bar.spawn((
                    HudTimerText,
                    Text::new("0:00"),
                    TextFont { font_size: 24.0, ..default() },
                    TextColor(Color::WHITE),
                ));
                bar.spawn((
                    HudCartText,
                    Text::new("Cart 0/0"),
                    TextFont { font_size: 18.0, ..default() },
                    TextColor(Color::srgb(0.8, 0.85, 0.95)),
                ));
                bar.spawn((
                    HudOwnedText,
                    Text::new("Owned 0"),
                    TextFont { font_size: 18.0, ..default() },
                    TextColor(Color::srgb(0.8, 0.85, 0.95)),
                ));
            });

            // ── Cards ──
            root.spawn(Node {
                width: Val::Percent(100.0),
                column_gap: Val::Px(12.0),
                justify_content: JustifyContent::Center,
                ..default()
            })
            .with_children(|row| {
                for index in 0..config.rotation_size {
                    row.spawn((
                        HudCard { index },
                        Node {
                            width: Val::Px(300.0),
                            min_height: Val::Px(150.0),
                            padding: UiRect::all(Val::Px(10.0)),
                            ..default()
                        },
                        BackgroundColor(CARD_BG),
                    ))
                    .with_children(|card| {
                        card.spawn((
                            HudCardText { index },
                            Text::new(""),
                            TextFont { font_size: 16.0, ..default() },
                            TextColor(Color::WHITE),
                        ));
                    });
                }
            });

            root.spawn((
                HudRefusalText,
                Text::new(""),
                TextFont { font_size: 18.0, ..default() },
                TextColor(Color::srgb(1.0, 0.45, 0.4)),
            ));

            // ── Cart / library listing ──
            root.spawn((
                Node {
                    width: Val::Percent(100.0),
                    flex_grow: 1.0,
                    padding: UiRect::all(Val::Px(10.0)),
                    ..default()
                },
                BackgroundColor(PANEL_BG),
            ))
            .with_children(|panel| {
                panel.spawn((
                    HudListingText,
                    Text::new(""),
                    TextFont { font_size: 15.0, ..default() },
                    TextColor(Color::srgb(0.85, 0.88, 0.95)),
                ));
            });

            root.spawn((
                Text::new(
                    "1-3 buy   Q/W/E add to cart   C checkout   X clear cart   \
                     Backspace remove last   Tab cart/library   F5 snapshot",
                ),
                TextFont { font_size: 13.0, ..default() },
                TextColor(Color::srgb(0.5, 0.55, 0.65)),
            ));
        });
}

pub fn despawn_hud(mut commands: Commands, query: Query<Entity, With<HudRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn listen_for_refusals(
    time: Res<Time>,
    mut events: EventReader<ShopRefusedEvent>,
    mut banner: ResMut<RefusalBanner>,
) {
    if let Some(ev) = events.read().last() {
        banner.message = Some(ev.reason.to_string());
        banner.timer.reset();
        return;
    }
    if banner.message.is_some() {
        banner.timer.tick(time.delta());
        if banner.timer.finished() {
            banner.message = None;
        }
    }
}

pub fn update_balance_display(
    ledger: Option<Res<Ledger>>,
    mut query: Query<&mut Text, With<HudBalanceText>>,
) {
    let Some(ledger) = ledger else { return };
    if !ledger.is_changed() {
        return;
    }
    for mut text in &mut query {
        **text = format_cents(ledger.balance());
    }
}

pub fn update_timer_display(
    clock: Res<SessionClock>,
    mut query: Query<(&mut Text, &mut TextColor), With<HudTimerText>>,
) {
    if !clock.is_changed() {
        return;
    }
    for (mut text, mut color) in &mut query {
        **text = match clock.phase() {
            SessionPhase::Disabled => "--:--".to_string(),
            _ => clock.display(),
        };
        // Last ten seconds turn red.
        color.0 = if clock.is_running() && clock.time_left() <= 10.0 {
            Color::srgb(1.0, 0.35, 0.3)
        } else {
            Color::WHITE
        };
    }
}

pub fn update_cart_display(cart: Res<Cart>, mut query: Query<&mut Text, With<HudCartText>>) {
    if !cart.is_changed() {
        return;
    }
    for mut text in &mut query {
        **text = format!(
            "Cart {}  ({})",
            cart.capacity_string(),
            format_cents(cart.total_price_cents())
        );
    }
}

pub fn update_owned_display(
    stats: Res<LibraryStats>,
    mut query: Query<&mut Text, With<HudOwnedText>>,
) {
    if !stats.is_changed() {
        return;
    }
    for mut text in &mut query {
        **text = format!("Owned {}", stats.total_items);
    }
}

pub fn update_card_display(
    storefront: Res<Storefront>,
    library: Res<Library>,
    ledger: Option<Res<Ledger>>,
    mut texts: Query<(&HudCardText, &mut Text)>,
    mut cards: Query<(&HudCard, &mut BackgroundColor)>,
) {
    let ledger_changed = ledger.as_ref().is_some_and(|l| l.is_changed());
    if !storefront.is_changed() && !library.is_changed() && !ledger_changed {
        return;
    }
    let balance = ledger.map(|l| l.balance()).unwrap_or(0);

    for (slot, mut text) in &mut texts {
        **text = match storefront.picks.get(slot.index) {
            Some(pick) => card_label(slot.index, pick, library.has_item(&pick.id), balance),
            None => String::from("(empty)"),
        };
    }
    for (card, mut bg) in &mut cards {
        let owned = storefront
            .picks
            .get(card.index)
            .is_some_and(|p| library.has_item(&p.id));
        bg.0 = if owned { CARD_BG_OWNED } else { CARD_BG };
    }
}

fn card_label(index: usize, pick: &ItemPick, owned: bool, balance: u64) -> String {
    let keys = CARD_KEYS
        .get(index)
        .map(|(buy, cart)| format!("[{}] buy  [{}] cart", buy, cart))
        .unwrap_or_default();
    let price = pick.final_price_cents();
    let mut label = format!(
        "{}\n{}  {} {} ({})\n{:.1}/5  {}\n{}",
        pick.title,
        pick.category,
        format_cents(pick.original_price_cents as u64),
        format_cents(price),
        pick.discount_label(),
        pick.quality,
        if price > balance { "can't afford" } else { "" },
        keys
    );
    if owned {
        label.push_str("\nOWNED");
    }
    label
}

pub fn update_listing_display(
    tab: Res<ListingTab>,
    cart: Res<Cart>,
    library: Res<Library>,
    stats: Res<LibraryStats>,
    mut query: Query<&mut Text, With<HudListingText>>,
) {
    if !tab.is_changed() && !cart.is_changed() && !library.is_changed() && !stats.is_changed() {
        return;
    }
    let body = match *tab {
        ListingTab::Cart => {
            let mut lines = vec![format!(
                "CART {} — total {}",
                cart.capacity_string(),
                format_cents(cart.total_price_cents())
            )];
            for (i, pick) in cart.items().iter().enumerate() {
                lines.push(format!(
                    "{:>2}. {}  {}",
                    i + 1,
                    pick.title,
                    format_cents(pick.final_price_cents())
                ));
            }
            if cart.is_empty() {
                lines.push("(empty)".to_string());
            }
            lines.join("\n")
        }
        ListingTab::Library => {
            let mut lines = vec![format!(
                "LIBRARY {} owned — worth {} at list price, {} top rated, {} duds",
                stats.total_items,
                format_cents(stats.total_original_price_cents),
                stats.top_quality_count,
                stats.zero_quality_count
            )];
            for pick in library.snapshot() {
                lines.push(format!("  {}  ({:.1}/5, {})", pick.title, pick.quality, pick.category));
            }
            lines.join("\n")
        }
    };
    for mut text in &mut query {
        **text = body.clone();
    }
}

pub fn update_refusal_display(
    banner: Res<RefusalBanner>,
    mut query: Query<&mut Text, With<HudRefusalText>>,
) {
    if !banner.is_changed() {
        return;
    }
    for mut text in &mut query {
        **text = banner.message.clone().unwrap_or_default();
    }
}
