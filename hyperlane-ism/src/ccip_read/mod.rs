pub use builder::*;
pub use fetcher::*;
pub use ism::*;

mod builder;
mod fetcher;
mod ism;
