//! Schedule page parsing.

use std::sync::OnceLock;

use regex_lite::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use super::types::{AvailabilityMap, DateScheduleInfo, SessionType};

const DATE_SELECTOR: &str = "thead th b";
const AM_ROW_SELECTOR: &str = ".yy_paiban tbody tr:nth-child(1) td";
const PM_ROW_SELECTOR: &str = ".yy_paiban tbody tr:nth-child(2) td";
const BOOKING_LINK_SELECTOR: &str = ".doc_yuyue_time a";

/// Errors raised while reading the schedule page.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),

    #[error("No {session} cell for date {date}")]
    MissingCell { date: String, session: SessionType },

    #[error("Booking link for {date} has no href")]
    MissingHref { date: String },

    #[error("Malformed booking link: {0}")]
    MalformedBookingLink(String),

    #[error("Unknown session type: {0}")]
    UnknownSessionType(String),
}

/// Compiled selectors for the schedule page.
struct PageSelectors {
    date: Selector,
    am_row: Selector,
    pm_row: Selector,
    booking_link: Selector,
}

fn page_selectors() -> Result<&'static PageSelectors, ParseError> {
    static SELECTORS: OnceLock<Result<PageSelectors, String>> = OnceLock::new();

    let parse = |css: &str| Selector::parse(css).map_err(|_| css.to_string());
    SELECTORS
        .get_or_init(|| {
            Ok(PageSelectors {
                date: parse(DATE_SELECTOR)?,
                am_row: parse(AM_ROW_SELECTOR)?,
                pm_row: parse(PM_ROW_SELECTOR)?,
                booking_link: parse(BOOKING_LINK_SELECTOR)?,
            })
        })
        .as_ref()
        .map_err(|css| ParseError::InvalidSelector(css.clone()))
}

/// Matches the argument list of a `javascript:fn(...)` link.
fn booking_args_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX
        .get_or_init(|| Regex::new(r"\(([^)]*)\)").ok())
        .as_ref()
}

/// Parse the doctor detail page into an [`AvailabilityMap`].
///
/// Dates are the bold labels in the table header. The first body row holds
/// the morning cells, the second the afternoon cells, each preceded by a label
/// cell. A cell is bookable when it carries a booking link.
pub fn parse_schedule_page(html: &str) -> Result<AvailabilityMap, ParseError> {
    let document = Html::parse_document(html);
    let selectors = page_selectors()?;

    let dates: Vec<String> = document
        .select(&selectors.date)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .collect();

    let rows = [
        (SessionType::Am, row_cells(&document, &selectors.am_row, dates.len())),
        (SessionType::Pm, row_cells(&document, &selectors.pm_row, dates.len())),
    ];

    let mut availability = AvailabilityMap::new();
    for (idx, date) in dates.iter().enumerate() {
        for (session, cells) in &rows {
            let cell = cells.get(idx).ok_or_else(|| ParseError::MissingCell {
                date: date.clone(),
                session: *session,
            })?;
            let Some(link) = cell.select(&selectors.booking_link).next() else {
                continue;
            };
            let href = link
                .value()
                .attr("href")
                .ok_or_else(|| ParseError::MissingHref { date: date.clone() })?;
            availability.push(date, parse_booking_href(href)?);
        }
    }

    Ok(availability)
}

/// Body cells of one session row, without the leading label cell.
fn row_cells<'a>(document: &'a Html, sel: &Selector, count: usize) -> Vec<ElementRef<'a>> {
    document.select(sel).skip(1).take(count).collect()
}

/// Parse a booking link such as `javascript:doYuyue('320100','SCH1','am','4411')`.
///
/// Arguments are hoscode, schcode, session type and docid, in that order.
pub fn parse_booking_href(href: &str) -> Result<DateScheduleInfo, ParseError> {
    let args_regex = booking_args_regex()
        .ok_or_else(|| ParseError::MalformedBookingLink(href.to_string()))?;
    let args = args_regex
        .captures(href)
        .and_then(|c| c.get(1))
        .ok_or_else(|| ParseError::MalformedBookingLink(href.to_string()))?
        .as_str()
        .replace('\'', "");

    let fields: Vec<&str> = args.split(',').map(str::trim).collect();
    let [hoscode, schcode, session, docid, ..] = fields.as_slice() else {
        return Err(ParseError::MalformedBookingLink(href.to_string()));
    };

    let session_type = session
        .parse::<SessionType>()
        .map_err(ParseError::UnknownSessionType)?;

    Ok(DateScheduleInfo {
        hoscode: hoscode.to_string(),
        schcode: schcode.to_string(),
        docid: docid.to_string(),
        session_type,
    })
}
