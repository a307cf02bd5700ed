use anchor_lang::prelude::*;

use crate::error::RaffleError;

// 8 discriminator + 32 management_authority + 1 bump + 8 raffle_counter
pub const CONFIG_ACCOUNT_SIZE: usize = 8 + 32 + 1 + 8;

/// Program-wide settings. PDA with seeds ["config"]
#[account]
pub struct Config {
    /// Only signer allowed to create raffles
    pub management_authority: Pubkey,
    pub bump: u8,
    /// Seed of the next raffle address
    pub raffle_counter: u64,
}

impl Config {
    /// Consumes the current counter value for a new raffle.
    pub fn advance_counter(&mut self) -> Result<u64> {
        let current = self.raffle_counter;
        self.raffle_counter = current.checked_add(1).ok_or(RaffleError::Overflow)?;
        Ok(current)
    }
}
