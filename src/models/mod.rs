pub mod details;
pub mod listing;

pub use details::*;
pub use listing::*;
