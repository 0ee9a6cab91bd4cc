//! Testing utilities and mock implementations.
//!
//! Mocks for the portal and captcha seams, so the acquisition flow can be
//! exercised without network access or an OCR engine installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use slotgrab_core::testing::{fixtures, MockCaptchaSolver, MockPortal};
//!
//! let portal = MockPortal::new();
//! portal
//!     .push_schedule_page(fixtures::schedule_page(&[("2024-05-01", Some("AM1"), None)]))
//!     .await;
//! portal.set_time_slots("AM1", vec![fixtures::time_slot("S1", 1)]).await;
//!
//! let solver = MockCaptchaSolver::with_answers(vec!["X1", "X2"]);
//! ```

mod mock_captcha;
mod mock_portal;

pub use mock_captcha::MockCaptchaSolver;
pub use mock_portal::{MockPortal, PortalCall, MOCK_SESSION_COOKIE};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::schedule::{DateScheduleInfo, SessionType, TimeScheduleInfo};

    pub const HOSCODE: &str = "320100";
    pub const DOCID: &str = "4411";

    /// A bookable block with the fixture provider and doctor.
    pub fn date_info(schcode: &str, session_type: SessionType) -> DateScheduleInfo {
        DateScheduleInfo {
            hoscode: HOSCODE.to_string(),
            schcode: schcode.to_string(),
            docid: DOCID.to_string(),
            session_type,
        }
    }

    /// A half-hour time slot with the given state.
    pub fn time_slot(code: &str, state: i64) -> TimeScheduleInfo {
        TimeScheduleInfo {
            code: code.to_string(),
            start_hour: "08:00".to_string(),
            end_hour: "08:30".to_string(),
            state,
            take_time: "07:50".to_string(),
        }
    }

    fn cell(schcode: Option<&str>, session: SessionType) -> String {
        match schcode {
            Some(code) => format!(
                r#"<td><div class="doc_yuyue_time"><a href="javascript:doYuyue('{}','{}','{}','{}')">预约</a></div></td>"#,
                HOSCODE, code, session, DOCID
            ),
            None => "<td>约满</td>".to_string(),
        }
    }

    /// Render a doctor detail page.
    ///
    /// Each entry is `(date, am_schcode, pm_schcode)`; `None` renders a full
    /// (unbookable) cell.
    pub fn schedule_page(days: &[(&str, Option<&str>, Option<&str>)]) -> String {
        let header: String = days
            .iter()
            .map(|(date, _, _)| format!("<th><b>{}</b><br/>周三</th>", date))
            .collect();
        let am: String = days
            .iter()
            .map(|(_, am, _)| cell(*am, SessionType::Am))
            .collect();
        let pm: String = days
            .iter()
            .map(|(_, _, pm)| cell(*pm, SessionType::Pm))
            .collect();

        format!(
            r#"<html><body><table class="yy_paiban">
<thead><tr><th>时段</th>{}</tr></thead>
<tbody>
<tr><td>上午</td>{}</tr>
<tr><td>下午</td>{}</tr>
</tbody></table></body></html>"#,
            header, am, pm
        )
    }
}
