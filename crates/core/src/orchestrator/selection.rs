//! Date selection policy.

use rand::Rng;
use tracing::{info, warn};

use crate::config::SelectionMode;
use crate::schedule::{AvailabilityMap, DateScheduleInfo};

use super::types::AcquireError;

/// The date picked for this attempt and its blocks, as found in the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub date: String,
    pub records: Vec<DateScheduleInfo>,
    /// Mode actually applied; `order` may fall back to `random`.
    pub effective_mode: SelectionMode,
}

/// Pick a date from `availability`.
///
/// In `order` mode the wanted date is used when present. When it is absent, a
/// one-shot run falls back to random selection for this attempt, while a
/// polling run fails with [`AcquireError::DateUnavailable`] so the next poll
/// can look again. In `random` mode any listed date is picked uniformly.
pub fn select_date<R: Rng + ?Sized>(
    availability: &AvailabilityMap,
    mode: SelectionMode,
    wanted: Option<&str>,
    loop_enabled: bool,
    rng: &mut R,
) -> Result<Selection, AcquireError> {
    if mode == SelectionMode::Order {
        let wanted = wanted.unwrap_or_default();
        if let Some(records) = availability.get(wanted) {
            return Ok(Selection {
                date: wanted.to_string(),
                records: records.to_vec(),
                effective_mode: SelectionMode::Order,
            });
        }

        if loop_enabled {
            return Err(AcquireError::DateUnavailable {
                date: wanted.to_string(),
            });
        }

        warn!(
            date = wanted,
            "Wanted date is not bookable yet; polling is off, switching to random mode for this attempt"
        );
    }

    let entries = availability.entries();
    if entries.is_empty() {
        return Err(AcquireError::NoAvailability);
    }

    let entry = &entries[rng.gen_range(0..entries.len())];
    info!(date = %entry.date, candidates = entries.len(), "Picked a random date");
    Ok(Selection {
        date: entry.date.clone(),
        records: entry.sessions.clone(),
        effective_mode: SelectionMode::Random,
    })
}
