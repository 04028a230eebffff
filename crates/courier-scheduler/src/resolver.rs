//! Marker resolution — turns a symbolic queue marker into display text.
//!
//! Simple markers map straight to catalogue constants. Progress slots pick
//! one tier variant uniformly at random; once per-user progress tracking
//! exists, the pick should be driven by actual lesson counts instead.

use rand::seq::SliceRandom;

use crate::texts::{self, VariantSet};

/// Resolve a marker to display text. `None` means the marker is unknown —
/// a terminal condition for the item, since retrying cannot fix it.
pub fn resolve(marker: &str) -> Option<String> {
    let key = marker.trim();

    let text = match key {
        "welcome_1" => texts::WELCOME_1,
        "welcome_2" => texts::WELCOME_2,
        "pro_welcome_12m" => texts::PRO_WELCOME_12M,
        "pro_next_day" => texts::PRO_NEXT_DAY,
        "access_ended_1" => texts::ACCESS_ENDED_1,
        "access_ended_2" => texts::ACCESS_ENDED_2,
        "progress_slot_day1_1934" => return Some(pick_variant(&texts::DAY1_1934)),
        "progress_slot_day2_2022" => return Some(pick_variant(&texts::DAY2_2022)),
        "progress_slot_day3_0828" => return Some(pick_variant(&texts::DAY3_0828)),
        _ => return None,
    };
    Some(text.to_string())
}

fn pick_variant(variants: &VariantSet) -> String {
    let (_, text) = variants
        .choose(&mut rand::thread_rng())
        .expect("variant sets are non-empty");
    (*text).to_string()
}
