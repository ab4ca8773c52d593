pub use ism::MockInterchainSecurityModule;
pub use mailbox::{MockMailboxContract, TestMailbox};

mod ism;
mod mailbox;
