use anchor_lang::prelude::*;

use crate::error::RaffleError;

pub const PARTICIPANT_SEED: &[u8] = b"participant";

// 8 discriminator + 32 raffle + 32 owner + 4 approved_tickets + 4 claimed_tickets + 1 bump
pub const PARTICIPANT_ACCOUNT_SIZE: usize = 8 + 32 + 32 + 4 + 4 + 1;

/// Per-holder counters of one raffle. The raffle counts holders, not
/// tickets, so only the first approval and the first claim of a holder
/// move its `approvers` and `entrants` totals.
/// PDA with seeds ["participant", raffle_key, owner]
#[account]
#[derive(Default)]
pub struct Participant {
    pub raffle: Pubkey,
    pub owner: Pubkey,
    pub approved_tickets: u32,
    pub claimed_tickets: u32,
    pub bump: u8,
}

impl Participant {
    pub fn init_if_new(&mut self, raffle: Pubkey, owner: Pubkey, bump: u8) {
        if self.raffle == Pubkey::default() {
            self.raffle = raffle;
            self.owner = owner;
            self.bump = bump;
        }
    }

    /// Returns whether this is the holder's first approved ticket.
    pub fn record_approval(&mut self) -> Result<bool> {
        self.approved_tickets = self
            .approved_tickets
            .checked_add(1)
            .ok_or(RaffleError::Overflow)?;
        Ok(self.approved_tickets == 1)
    }

    /// Returns whether this is the holder's first claimed ticket.
    pub fn record_claim(&mut self) -> Result<bool> {
        self.claimed_tickets = self
            .claimed_tickets
            .checked_add(1)
            .ok_or(RaffleError::Overflow)?;
        Ok(self.claimed_tickets == 1)
    }
}
