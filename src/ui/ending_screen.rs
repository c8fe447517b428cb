use bevy::prelude::*;
use crate::shared::*;

#[derive(Component)]
pub struct EndingRoot;

#[derive(Component)]
pub struct EndingHeadline;

#[derive(Component)]
pub struct EndingDetail;

pub fn spawn_ending_screen(mut commands: Commands) {
    commands
        .spawn((
            EndingRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(20.0),
                ..default()
            },
            BackgroundColor(Color::srgb(0.07, 0.08, 0.12)),
        ))
        .with_children(|parent| {
            parent.spawn((
                EndingHeadline,
                Text::new(""),
                TextFont {
                    font_size: 44.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.85, 0.4)),
            ));
            parent.spawn((
                EndingDetail,
                Text::new(""),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.85, 0.95)),
                TextLayout::new_with_justify(JustifyText::Center),
            ));
            parent.spawn((
                Text::new("R: try again"),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

pub fn despawn_ending_screen(mut commands: Commands, query: Query<Entity, With<EndingRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

fn outcome_title(outcome: Option<SessionOutcome>) -> &'static str {
    match outcome {
        Some(SessionOutcome::Depleted) => "Wallet empty!",
        Some(SessionOutcome::TimeoutSpent) => "Store closed",
        Some(SessionOutcome::TimeoutNoSpend) => "Window shopper",
        None => "Session over",
    }
}

/// Fills the texts once the evaluation has been written for this visit.
pub fn update_ending_text(
    evaluation: Res<FinalEvaluation>,
    library_stats: Res<LibraryStats>,
    mut headlines: Query<&mut Text, (With<EndingHeadline>, Without<EndingDetail>)>,
    mut details: Query<&mut Text, (With<EndingDetail>, Without<EndingHeadline>)>,
) {
    if !evaluation.is_changed() {
        return;
    }

    for mut text in &mut headlines {
        **text = outcome_title(evaluation.outcome).to_string();
    }

    // Window shoppers get no grade.
    let detail = match (evaluation.outcome, evaluation.grade) {
        (Some(SessionOutcome::TimeoutNoSpend), _) | (_, None) => {
            "You left without buying anything.".to_string()
        }
        (_, Some(grade)) => format!(
            "{} — {}\nScore {:.1}\n{} games owned, worth {} at list price",
            grade.headline(),
            grade.blurb(),
            evaluation.total_score,
            evaluation.items_owned,
            format_cents(library_stats.total_original_price_cents)
        ),
    };
    for mut text in &mut details {
        **text = detail.clone();
    }
}
