pub use factory::*;
pub use ism::*;
pub use metadata::*;

mod factory;
mod ism;
mod metadata;
