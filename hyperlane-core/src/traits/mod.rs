pub use aggregation_ism::*;
pub use ccip_read_ism::*;
pub use encode::*;
pub use ism::*;
pub use mailbox::*;
pub use routing_ism::*;

mod aggregation_ism;
mod ccip_read_ism;
mod encode;
mod ism;
mod mailbox;
mod routing_ism;
