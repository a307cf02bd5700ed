use anchor_lang::prelude::*;

use crate::error::RaffleError;

// 8 discriminator + 32 raffle + 8 ticket_id + 32 owner + 1 claimed + 1 bump
pub const TICKET_APPROVAL_ACCOUNT_SIZE: usize = 8 + 32 + 8 + 32 + 1 + 1;

/// Record left by a ticket holder's approve-and-notify call.
/// PDA with seeds ["ticket", raffle_key, ticket_id]
#[account]
#[derive(Default)]
pub struct TicketApproval {
    pub raffle: Pubkey,
    pub ticket_id: u64,
    pub owner: Pubkey,
    pub claimed: bool,
    pub bump: u8,
}

impl TicketApproval {
    pub fn is_new(&self) -> bool {
        self.raffle == Pubkey::default()
    }

    /// Binds the approval to its current holder. Returns whether this is the
    /// first approval for the ticket.
    pub fn approve(&mut self, raffle: Pubkey, ticket_id: u64, owner: Pubkey, bump: u8) -> Result<bool> {
        require!(!self.claimed, RaffleError::DuplicateClaim);
        let first = self.is_new();
        self.raffle = raffle;
        self.ticket_id = ticket_id;
        self.owner = owner;
        self.bump = bump;
        Ok(first)
    }

    /// A claimed ticket stays claimed whoever holds it now.
    pub fn mark_claimed(&mut self, claimant: &Pubkey) -> Result<()> {
        require!(!self.claimed, RaffleError::DuplicateClaim);
        require!(self.owner == *claimant, RaffleError::UnauthorizedCaller);
        self.claimed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_raffle_err;

    #[test]
    fn test_reapproval_follows_the_holder() {
        let raffle = Pubkey::new_from_array([1; 32]);
        let first_holder = Pubkey::new_from_array([2; 32]);
        let second_holder = Pubkey::new_from_array([3; 32]);

        let mut approval = TicketApproval::default();
        assert!(approval.approve(raffle, 22, first_holder, 254).unwrap());
        assert!(!approval.approve(raffle, 22, second_holder, 254).unwrap());
        assert_eq!(approval.owner, second_holder);

        assert_raffle_err(approval.mark_claimed(&first_holder), RaffleError::UnauthorizedCaller);
        approval.mark_claimed(&second_holder).unwrap();
        assert_raffle_err(approval.mark_claimed(&second_holder), RaffleError::DuplicateClaim);
        assert_raffle_err(
            approval.approve(raffle, 22, first_holder, 254),
            RaffleError::DuplicateClaim,
        );
        assert_eq!(approval.owner, second_holder);
    }

    #[test]
    fn test_claimed_ticket_rejects_a_later_holder() {
        let raffle = Pubkey::new_from_array([1; 32]);
        let first_holder = Pubkey::new_from_array([2; 32]);
        let buyer = Pubkey::new_from_array([4; 32]);

        let mut approval = TicketApproval::default();
        approval.approve(raffle, 5, first_holder, 253).unwrap();
        approval.mark_claimed(&first_holder).unwrap();

        // the ticket changed hands after the claim
        assert_raffle_err(approval.mark_claimed(&buyer), RaffleError::DuplicateClaim);
        assert_raffle_err(approval.approve(raffle, 5, buyer, 253), RaffleError::DuplicateClaim);
    }
}
