use anchor_lang::prelude::*;

use crate::{
    custody::read_slot_entropy,
    settlement::derive_seed,
    state::{ClaimRegistry, Raffle},
};

/// Event emitted when the claim window closes and the draw seed is fixed
#[event]
pub struct RegistrationClosed {
    pub raffle: Pubkey,
    pub entries: u32,
    pub closed_at: i64,
}

/// Closes the claim window and stores the draw seed.
pub(crate) fn freeze_registration(
    raffle: &mut Account<Raffle>,
    registry: &ClaimRegistry,
    slot_hashes: &AccountInfo,
    now: i64,
) -> Result<()> {
    let entropy = read_slot_entropy(slot_hashes)?;
    let seed = derive_seed(entropy, now, registry.numbers());
    raffle.close_registration(registry.len(), now, seed)?;

    emit!(RegistrationClosed {
        raffle: raffle.key(),
        entries: registry.len() as u32,
        closed_at: now,
    });
    Ok(())
}

/// Permissionless close of the claim window once the registry is full, the
/// claim deadline passed, or an instant-win raffle reached its minimum. The
/// first and last normally close inside the claim that caused them; this
/// covers the deadline.
pub fn close_registration(ctx: Context<CloseRegistration>) -> Result<()> {
    let current_time = Clock::get()?.unix_timestamp;
    freeze_registration(
        &mut ctx.accounts.raffle,
        &ctx.accounts.claim_registry,
        &ctx.accounts.recent_slothashes,
        current_time,
    )
}

#[derive(Accounts)]
pub struct CloseRegistration<'info> {
    #[account(mut)]
    pub raffle: Box<Account<'info, Raffle>>,

    #[account(
        seeds = [b"claims", raffle.key().as_ref()],
        bump,
        has_one = raffle,
    )]
    pub claim_registry: Box<Account<'info, ClaimRegistry>>,

    /// CHECK: address is checked against the SlotHashes sysvar id when read.
    /// Anchor cannot deserialize SlotHashes, so it stays unchecked here.
    pub recent_slothashes: UncheckedAccount<'info>,

    pub caller: Signer<'info>,
}
