//! Types for the schedule system.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `state` value of a time slot that can still be booked.
pub const BOOKABLE_STATE: i64 = 1;

/// Half-day designation of a bookable block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Am,
    Pm,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Am => "am",
            SessionType::Pm => "pm",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "am" => Ok(SessionType::Am),
            "pm" => Ok(SessionType::Pm),
            other => Err(other.to_string()),
        }
    }
}

/// One bookable (date, session type) block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateScheduleInfo {
    /// Provider code.
    pub hoscode: String,
    /// Schedule code, identifies the block on the platform.
    pub schcode: String,
    /// Doctor id.
    pub docid: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
}

/// One concrete time slot under a [`DateScheduleInfo`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeScheduleInfo {
    /// Slot code, substituted into the confirmation link.
    pub code: String,
    #[serde(rename = "startHour", default)]
    pub start_hour: String,
    #[serde(rename = "endHour", default)]
    pub end_hour: String,
    /// 1 = bookable, anything else = taken or not yet open.
    pub state: i64,
    /// Latest time the ticket can be picked up.
    #[serde(rename = "takeTime", default)]
    pub take_time: String,
}

impl TimeScheduleInfo {
    pub fn is_bookable(&self) -> bool {
        self.state == BOOKABLE_STATE
    }
}

/// A date and its bookable blocks, in page order (am before pm).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DateEntry {
    pub date: String,
    pub sessions: Vec<DateScheduleInfo>,
}

/// Date-keyed availability, ordered as the dates appear on the schedule page.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AvailabilityMap {
    entries: Vec<DateEntry>,
}

impl AvailabilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block under `date`, creating the entry on first sight.
    pub fn push(&mut self, date: &str, info: DateScheduleInfo) {
        match self.entries.iter_mut().find(|e| e.date == date) {
            Some(entry) => entry.sessions.push(info),
            None => self.entries.push(DateEntry {
                date: date.to_string(),
                sessions: vec![info],
            }),
        }
    }

    pub fn get(&self, date: &str) -> Option<&[DateScheduleInfo]> {
        self.entries
            .iter()
            .find(|e| e.date == date)
            .map(|e| e.sessions.as_slice())
    }

    pub fn contains(&self, date: &str) -> bool {
        self.get(date).is_some()
    }

    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.date.as_str())
    }

    pub fn entries(&self) -> &[DateEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(schcode: &str, session_type: SessionType) -> DateScheduleInfo {
        DateScheduleInfo {
            hoscode: "320100".to_string(),
            schcode: schcode.to_string(),
            docid: "4411".to_string(),
            session_type,
        }
    }

    #[test]
    fn test_session_type_parse() {
        assert_eq!("am".parse::<SessionType>(), Ok(SessionType::Am));
        assert_eq!(" PM ".parse::<SessionType>(), Ok(SessionType::Pm));
        assert!("evening".parse::<SessionType>().is_err());
    }

    #[test]
    fn test_availability_map_preserves_insertion_order() {
        let mut map = AvailabilityMap::new();
        map.push("2024-05-03", info("C", SessionType::Am));
        map.push("2024-05-01", info("A", SessionType::Am));
        map.push("2024-05-03", info("D", SessionType::Pm));

        let dates: Vec<_> = map.dates().collect();
        assert_eq!(dates, vec!["2024-05-03", "2024-05-01"]);
        assert_eq!(map.len(), 2);

        let sessions = map.get("2024-05-03").unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_type, SessionType::Am);
        assert_eq!(sessions[1].schcode, "D");
        assert!(!map.contains("2024-05-02"));
    }

    #[test]
    fn test_time_slot_deserialization() {
        let json = r#"[
            {"code":"S1","startHour":"08:00","endHour":"08:30","state":1,"takeTime":"07:50"},
            {"code":"S2","startHour":"08:30","endHour":"09:00","state":0}
        ]"#;
        let slots: Vec<TimeScheduleInfo> = serde_json::from_str(json).unwrap();
        assert_eq!(slots.len(), 2);
        assert!(slots[0].is_bookable());
        assert_eq!(slots[0].take_time, "07:50");
        assert!(!slots[1].is_bookable());
        assert_eq!(slots[1].take_time, "");
    }

    #[test]
    fn test_date_schedule_info_uses_type_field() {
        let json = serde_json::to_string(&info("A", SessionType::Pm)).unwrap();
        assert!(json.contains("\"type\":\"pm\""));
    }
}
