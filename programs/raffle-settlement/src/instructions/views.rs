use anchor_lang::prelude::*;

use crate::state::{AssetKind, ClaimRegistry, Ledger, Raffle, RafflePhase, Winner};

// Read-only instructions. Results come back as return data, so they can be
// simulated without a signature.

pub fn phase(ctx: Context<RaffleView>) -> Result<RafflePhase> {
    Ok(ctx.accounts.raffle.phase)
}

/// Custodied amount for an asset identity. `mint` is ignored for Native;
/// identities the raffle never saw read as zero.
pub fn query_balance(ctx: Context<RaffleView>, kind: AssetKind, mint: Pubkey) -> Result<u64> {
    Ok(ctx.accounts.ledger.balance(kind, &mint))
}

/// Token id at `index` among the held tokens of a non-fungible collection,
/// in deposit order.
pub fn prize_non_fungible(ctx: Context<RaffleView>, collection: Pubkey, index: u64) -> Result<u64> {
    ctx.accounts.ledger.non_fungible_at(&collection, index)
}

pub fn number_at(ctx: Context<RaffleView>, index: u64) -> Result<u64> {
    ctx.accounts.claim_registry.number_at(index)
}

pub fn claimed_count(ctx: Context<RaffleView>) -> Result<u32> {
    Ok(ctx.accounts.claim_registry.len() as u32)
}

pub fn winner(ctx: Context<RaffleView>) -> Result<Winner> {
    ctx.accounts.raffle.winner()
}

#[derive(Accounts)]
pub struct RaffleView<'info> {
    pub raffle: Box<Account<'info, Raffle>>,

    #[account(
        seeds = [b"ledger", raffle.key().as_ref()],
        bump,
        has_one = raffle,
    )]
    pub ledger: Box<Account<'info, Ledger>>,

    #[account(
        seeds = [b"claims", raffle.key().as_ref()],
        bump,
        has_one = raffle,
    )]
    pub claim_registry: Box<Account<'info, ClaimRegistry>>,
}
