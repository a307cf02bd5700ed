use anchor_lang::prelude::*;

use crate::error::RaffleError;

pub const TREASURY_SEED: &[u8] = b"treasury";

// 8 discriminator, 32 raffle, 1 bump
pub const TREASURY_ACCOUNT_SIZE: usize = 8 + 32 + 1;

/// Custody PDA of a raffle. Holds the deposited lamports and is the
/// authority of every vault token account.
/// PDA with seeds ["treasury", raffle_key]
#[account]
pub struct Treasury {
    pub raffle: Pubkey,
    pub bump: u8,
}

impl Treasury {
    /// Moves custodied lamports out of the treasury account. The account
    /// keeps its rent-exempt reserve; only deposits are ever released.
    pub fn release_lamports(
        treasury: &AccountInfo,
        recipient: &AccountInfo,
        amount: u64,
    ) -> Result<()> {
        let reserve = Rent::get()?.minimum_balance(TREASURY_ACCOUNT_SIZE);
        let remaining = treasury
            .lamports()
            .checked_sub(amount)
            .ok_or(RaffleError::Overflow)?;
        require!(remaining >= reserve, RaffleError::TransferFailure);

        treasury.sub_lamports(amount)?;
        recipient.add_lamports(amount)?;
        Ok(())
    }
}
