pub mod display_date;
pub mod record;

pub use display_date::*;
pub use record::*;
