pub use domain::*;
pub use rate_limited::*;
pub use table::*;

mod domain;
mod rate_limited;
mod table;
