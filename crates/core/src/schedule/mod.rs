//! Schedule data for one provider/doctor pair.
//!
//! The platform exposes availability in two steps: a schedule page listing
//! bookable (date, am/pm) blocks, and a per-block JSON query listing concrete
//! time slots. This module holds the types for both, the page parser, and the
//! confirmation link builder.

mod link;
mod parser;
mod types;

pub use link::{bookable_links, reservation_url};
pub use parser::{parse_booking_href, parse_schedule_page, ParseError};
pub use types::*;
