pub mod claim_ticket;
pub mod close_registration;
pub mod create_raffle;
pub mod deposit_fungible;
pub mod deposit_native;
pub mod execute;
pub mod init_config;
pub mod on_non_fungible_received;
pub mod open_second_round;
pub mod receive_approval;
pub mod receive_ticket_approval;
pub mod views;

pub use claim_ticket::*;
pub use close_registration::*;
pub use create_raffle::*;
pub use deposit_fungible::*;
pub use deposit_native::*;
pub use execute::*;
pub use init_config::*;
pub use on_non_fungible_received::*;
pub use open_second_round::*;
pub use receive_approval::*;
pub use receive_ticket_approval::*;
pub use views::*;
