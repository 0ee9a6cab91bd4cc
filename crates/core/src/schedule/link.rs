//! Confirmation link construction.

use super::types::{DateScheduleInfo, TimeScheduleInfo};

/// Build the confirmation URL for one time slot.
pub fn reservation_url(base_url: &str, date: &DateScheduleInfo, time: &TimeScheduleInfo) -> String {
    format!(
        "{}/reservation/hos_toConfirm.do?schcode={}&hosCfgCode={}",
        base_url.trim_end_matches('/'),
        date.schcode,
        time.code
    )
}

/// Confirmation URLs for the bookable slots of a block, in slot order.
///
/// Slots whose state is not bookable never produce a link.
pub fn bookable_links(
    base_url: &str,
    date: &DateScheduleInfo,
    times: &[TimeScheduleInfo],
) -> Vec<String> {
    times
        .iter()
        .filter(|t| t.is_bookable())
        .map(|t| reservation_url(base_url, date, t))
        .collect()
}
