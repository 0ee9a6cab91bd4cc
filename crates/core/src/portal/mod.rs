//! Reservation portal abstraction.
//!
//! This module provides a `ReservationPortal` trait covering the platform
//! endpoints an acquisition attempt needs. Cookie state is carried in an
//! explicit [`Session`] value passed to every call; implementations keep no
//! ambient cookie jar.

mod nj12320;
mod session;
mod types;

pub use nj12320::Nj12320Portal;
pub use session::Session;
pub use types::*;
