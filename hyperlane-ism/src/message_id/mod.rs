pub use ism::*;
pub use store::*;

mod ism;
mod store;
