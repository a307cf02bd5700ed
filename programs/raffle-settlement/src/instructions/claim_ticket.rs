use anchor_lang::prelude::*;
use anchor_spl::token::{burn, Burn, Mint, Token, TokenAccount};

use crate::{
    custody::TokenGrant,
    error::RaffleError,
    instructions::close_registration::freeze_registration,
    state::{ClaimRegistry, Participant, Raffle, TicketApproval, Treasury, PARTICIPANT_SEED, TREASURY_SEED},
};

/// Event emitted for every claimed ticket
#[event]
pub struct TicketClaimed {
    pub raffle: Pubkey,
    pub ticket_id: u64,
    pub claimant: Pubkey,
    pub position: u32,
    pub entrants: u32,
}

/// Second-round claim of an approved ticket.
///
/// The claimant must be the approver on record and must still hold the
/// ticket token with the treasury as its delegate. The treasury burns the
/// ticket through that delegation, so a claimed ticket cannot be sold on.
/// The ticket number is appended to the registry. The claim that fills the
/// registry, or with `instant_win` the claim that brings in the
/// `min_participants`-th distinct holder, also closes the window and fixes
/// the draw seed.
///
/// # Errors
/// - `InvalidPhase` outside Registering or after the claim deadline
/// - `DuplicateClaim` if the ticket was claimed before, by anyone
/// - `InvalidTokenMint` if `ticket_mint` is not the mint of `ticket_id`
/// - `UnauthorizedCaller` if the claimant is not the approver or no longer
///   holds or delegates the ticket
/// - `TransferVerificationFailed` if the ticket is still held after the burn
pub fn claim_ticket(ctx: Context<ClaimTicket>, ticket_id: u64) -> Result<()> {
    let current_time = Clock::get()?.unix_timestamp;
    ctx.accounts.raffle.ensure_claim_window(current_time)?;

    let claimant = ctx.accounts.claimant.key();
    ctx.accounts.ticket_approval.mark_claimed(&claimant)?;

    let ticket_mint = ctx.accounts.raffle.ticket_mint(ticket_id);
    require_keys_eq!(
        ctx.accounts.ticket_mint.key(),
        ticket_mint,
        RaffleError::InvalidTokenMint
    );
    let ticket_account: &TokenAccount = &ctx.accounts.claimant_ticket_account;
    TokenGrant::from(ticket_account).ensure_ticket(
        &ticket_mint,
        &claimant,
        &ctx.accounts.treasury.key(),
    )?;

    let raffle_key = ctx.accounts.raffle.key();
    let signer_seeds: &[&[u8]] = &[
        TREASURY_SEED,
        raffle_key.as_ref(),
        &[ctx.accounts.treasury.bump],
    ];
    burn(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.ticket_mint.to_account_info(),
                from: ctx.accounts.claimant_ticket_account.to_account_info(),
                authority: ctx.accounts.treasury.to_account_info(),
            },
            &[signer_seeds],
        ),
        1,
    )?;
    ctx.accounts.claimant_ticket_account.reload()?;
    require!(
        ctx.accounts.claimant_ticket_account.amount == 0,
        RaffleError::TransferVerificationFailed
    );

    let position = ctx.accounts.claim_registry.record(ticket_id, claimant)?;
    if ctx.accounts.participant.record_claim()? {
        ctx.accounts.raffle.record_entrant()?;
    }

    emit!(TicketClaimed {
        raffle: raffle_key,
        ticket_id,
        claimant,
        position: position as u32,
        entrants: ctx.accounts.raffle.entrants,
    });

    let entries = ctx.accounts.claim_registry.len();
    if ctx.accounts.raffle.registration_closable(entries, current_time) {
        freeze_registration(
            &mut ctx.accounts.raffle,
            &ctx.accounts.claim_registry,
            &ctx.accounts.recent_slothashes,
            current_time,
        )?;
    }

    Ok(())
}

#[derive(Accounts)]
#[instruction(ticket_id: u64)]
pub struct ClaimTicket<'info> {
    #[account(mut)]
    pub raffle: Box<Account<'info, Raffle>>,

    #[account(
        mut,
        seeds = [b"claims", raffle.key().as_ref()],
        bump,
        has_one = raffle,
    )]
    pub claim_registry: Box<Account<'info, ClaimRegistry>>,

    #[account(
        seeds = [TREASURY_SEED, raffle.key().as_ref()],
        bump = treasury.bump,
    )]
    pub treasury: Account<'info, Treasury>,

    #[account(
        mut,
        seeds = [
            b"ticket",
            raffle.key().as_ref(),
            ticket_id.to_le_bytes().as_ref(),
        ],
        bump = ticket_approval.bump,
    )]
    pub ticket_approval: Account<'info, TicketApproval>,

    /// Created by the claimant's ticket approval
    #[account(
        mut,
        seeds = [
            PARTICIPANT_SEED,
            raffle.key().as_ref(),
            claimant.key().as_ref(),
        ],
        bump = participant.bump,
    )]
    pub participant: Account<'info, Participant>,

    #[account(mut)]
    pub ticket_mint: Account<'info, Mint>,

    #[account(mut)]
    pub claimant_ticket_account: Account<'info, TokenAccount>,

    /// CHECK: address is checked against the SlotHashes sysvar id when read.
    /// Only read when this claim closes the window.
    pub recent_slothashes: UncheckedAccount<'info>,

    pub claimant: Signer<'info>,

    pub token_program: Program<'info, Token>,
}
