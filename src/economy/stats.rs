use bevy::prelude::*;
use crate::shared::*;

/// Quality at or above this counts as a top-rated item on the library page.
const TOP_QUALITY: f32 = 4.5;
/// Quality at or below this counts as a zero-rated item.
const ZERO_QUALITY: f32 = 0.5;

pub fn compute_library_stats(owned: &[ItemPick]) -> LibraryStats {
    let mut stats = LibraryStats {
        total_items: owned.len(),
        ..default()
    };
    for pick in owned {
        stats.total_original_price_cents += pick.original_price_cents as u64;
        if pick.quality >= TOP_QUALITY {
            stats.top_quality_count += 1;
        } else if pick.quality <= ZERO_QUALITY {
            stats.zero_quality_count += 1;
        }
    }
    stats
}

/// Recomputes `LibraryStats` whenever the library grows.
pub fn refresh_library_stats(
    mut events: EventReader<LibraryChangedEvent>,
    library: Res<Library>,
    mut stats: ResMut<LibraryStats>,
) {
    if events.read().count() == 0 {
        return;
    }
    *stats = compute_library_stats(&library.snapshot());
    debug!(
        "[Library] Stats updated - Total: {}, Price: {}, Q5: {}, Q0: {}",
        stats.total_items,
        format_cents(stats.total_original_price_cents),
        stats.top_quality_count,
        stats.zero_quality_count
    );
}
