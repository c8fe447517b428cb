//! End-of-session evaluation: scores the owned library and assigns a grade.
//!
//! Runs once on entering `GameState::Ending`. For every owned item:
//!
//! ```text
//! money_saved = original - original * discount
//! item_score  = money_saved * rating * series * type
//! ```
//!
//! where the three multipliers are step functions of the item's quality, its
//! series size and how many owned items share its category. The total is
//! bucketed by `GradeThresholds`.

use bevy::prelude::*;
use crate::shared::*;

use super::ledger::EconomyStats;

// ─────────────────────────────────────────────────────────────────────────────
// Multipliers
// ─────────────────────────────────────────────────────────────────────────────

/// Quality truncates toward zero before lookup, so 4.9 scores as 4.
pub fn rating_multiplier(quality: f32) -> f64 {
    match quality as i32 {
        0 => 0.01,
        1 => 0.1,
        2 => 0.3,
        3 => 0.5,
        4 => 0.7,
        _ => 1.0,
    }
}

pub fn series_count_multiplier(count: usize) -> f64 {
    match count {
        5.. => 2.0,
        4 => 1.5,
        3 => 1.2,
        _ => 1.0,
    }
}

pub fn type_count_multiplier(count: usize) -> f64 {
    match count {
        10.. => 1.5,
        5..=9 => 1.3,
        3..=4 => 1.1,
        _ => 1.0,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scoring
// ─────────────────────────────────────────────────────────────────────────────

pub fn item_score(pick: &ItemPick, owned: &[ItemPick]) -> f64 {
    let original = pick.original_price_cents as f64;
    let money_saved = original - original * pick.discount as f64;

    // Picks do not carry series membership, so the series bonus is always
    // evaluated at a count of zero. Known gap: the multiplier never fires.
    let series_count = 0;

    let type_count = owned.iter().filter(|p| p.category == pick.category).count();

    money_saved
        * rating_multiplier(pick.quality)
        * series_count_multiplier(series_count)
        * type_count_multiplier(type_count)
}

pub fn score_library(owned: &[ItemPick]) -> f64 {
    owned.iter().map(|pick| item_score(pick, owned)).sum()
}

/// Score and grade for a library snapshot.
pub fn evaluate(owned: &[ItemPick], thresholds: &GradeThresholds) -> (f64, Grade) {
    let total = score_library(owned);
    (total, thresholds.grade_for(total))
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

/// Scores the final library on entering the outcome screen and stores the
/// result in `FinalEvaluation` for the UI.
pub fn evaluate_final_library(
    library: Res<Library>,
    thresholds: Res<GradeThresholds>,
    clock: Res<SessionClock>,
    stats: Res<EconomyStats>,
    mut evaluation: ResMut<FinalEvaluation>,
) {
    let owned = library.snapshot();
    let (total, grade) = evaluate(&owned, &thresholds);

    *evaluation = FinalEvaluation {
        outcome: clock.outcome(),
        total_score: total,
        grade: Some(grade),
        items_owned: owned.len(),
    };

    info!(
        "[Evaluation] Outcome {:?}: {} item(s), total score {:.1} → {:?}. Spent {} over {} purchase(s) and {} checkout(s); {} refusal(s).",
        evaluation.outcome,
        owned.len(),
        total,
        grade,
        format_cents(stats.total_spent_cents),
        stats.purchases,
        stats.checkouts,
        stats.refusals
    );
}
