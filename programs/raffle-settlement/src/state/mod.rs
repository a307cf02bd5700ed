pub use claim_registry::*;
pub use config::*;
pub use ledger::*;
pub use participant::*;
pub use raffle::*;
pub use ticket_approval::*;
pub use treasury::*;

pub mod claim_registry;
pub mod config;
pub mod ledger;
pub mod participant;
pub mod raffle;
pub mod ticket_approval;
pub mod treasury;
