use bevy::prelude::*;
use crate::shared::*;

#[derive(Component)]
pub struct TitleRoot;

#[derive(Component)]
pub struct TitlePrompt;

pub fn spawn_title_screen(mut commands: Commands, config: Res<ShopConfig>, catalog: Res<ItemCatalog>) {
    commands
        .spawn((
            TitleRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(24.0),
                ..default()
            },
            BackgroundColor(Color::srgb(0.09, 0.11, 0.16)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("BARGAIN BIN"),
                TextFont {
                    font_size: 56.0,
                    ..default()
                },
                TextColor(Color::srgb(0.4, 0.75, 1.0)),
            ));

            parent.spawn((
                Text::new(format!(
                    "{} to spend. {} seconds on the clock. {} games in the bin.",
                    format_cents(config.starting_balance_cents.max(0) as u64),
                    config.duration_secs.ceil() as u32,
                    catalog.len()
                )),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgb(0.75, 0.8, 0.9)),
            ));

            parent.spawn((
                TitlePrompt,
                Text::new("Press Enter to start shopping"),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

pub fn despawn_title_screen(mut commands: Commands, query: Query<Entity, With<TitleRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

pub fn blink_prompt(time: Res<Time>, mut query: Query<&mut TextColor, With<TitlePrompt>>) {
    let alpha = 0.55 + 0.45 * (time.elapsed_secs() * 3.0).sin().abs();
    for mut color in &mut query {
        color.0 = Color::srgba(1.0, 1.0, 1.0, alpha);
    }
}
