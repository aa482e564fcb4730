//! Text formatting for replies and links.

mod percent;
mod time_ago;

pub use percent::percent_encode;
pub use time_ago::{time_ago, time_ago_or_fallback, FormatError};
