use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::Token;

use crate::{
    custody::{ensure_winner_can_receive, CpiGateway},
    settlement,
    state::{ClaimRegistry, Ledger, Raffle, Treasury, TREASURY_SEED},
};

/// Event emitted once the prizes reached the winner
#[event]
pub struct RaffleSettled {
    pub raffle: Pubkey,
    pub winner: Pubkey,
    pub winning_number: u64,
    pub native_paid: u64,
    pub token_payouts: u8,
}

/// Draws the winner from the frozen seed and transfers every custodied prize
/// to them in one instruction.
///
/// Callable by anyone once the claim window is closed. The winner is fully
/// determined by then, so the executor passes the winner's system account and,
/// in `remaining_accounts`, one `(mint, vault, winner_token_account)` triple
/// per token transfer: every non-empty fungible holding, then every held
/// non-fungible token by its own mint. Missing winner token accounts are
/// created and paid for by the executor.
///
/// # Errors
/// - `AlreadySettled` on any call after a successful settlement
/// - `InvalidPhase` while the claim window is still open
/// - `InsufficientParticipants` without entrants, or below the minimum
///   before the claim deadline
/// - `WinnerMismatch` if `winner` is not the drawn participant
/// - `WinnerAccountUnfunded` if the winner's system account does not exist
///   and the native prize is below the rent-exempt minimum. Funding the
///   account with any lamports makes the raffle settleable again
/// - `TransferFailure` if any payout fails; no state changes persist
pub fn execute<'info>(ctx: Context<'_, '_, 'info, 'info, Execute<'info>>) -> Result<()> {
    let current_time = Clock::get()?.unix_timestamp;
    let entries = ctx.accounts.claim_registry.len();
    ctx.accounts.raffle.ensure_settleable(entries, current_time)?;

    settlement::ensure_winner(
        &ctx.accounts.raffle,
        &ctx.accounts.claim_registry,
        &ctx.accounts.winner.key(),
    )?;

    let native_paid = ctx.accounts.ledger.native;
    ensure_winner_can_receive(
        ctx.accounts.winner.lamports(),
        native_paid,
        Rent::get()?.minimum_balance(0),
    )?;
    let token_payouts = settlement::token_payouts(&ctx.accounts.ledger).len() as u8;

    let raffle_key = ctx.accounts.raffle.key();
    let treasury_bump = [ctx.accounts.treasury.bump];
    let signer_seeds: &[&[u8]] = &[TREASURY_SEED, raffle_key.as_ref(), &treasury_bump];

    let mut gateway = CpiGateway {
        treasury: ctx.accounts.treasury.to_account_info(),
        winner: ctx.accounts.winner.to_account_info(),
        payer: ctx.accounts.executor.to_account_info(),
        token_program: &ctx.accounts.token_program,
        associated_token_program: &ctx.accounts.associated_token_program,
        system_program: &ctx.accounts.system_program,
        prize_accounts: ctx.remaining_accounts,
        signer_seeds,
    };

    let winner = settlement::settle(
        &mut ctx.accounts.raffle,
        &mut ctx.accounts.ledger,
        &ctx.accounts.claim_registry,
        current_time,
        &mut gateway,
    )?;

    emit!(RaffleSettled {
        raffle: raffle_key,
        winner: winner.participant,
        winning_number: winner.number,
        native_paid,
        token_payouts,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Execute<'info> {
    #[account(mut)]
    pub raffle: Box<Account<'info, Raffle>>,

    #[account(
        mut,
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

    #[account(
        mut,
        seeds = [TREASURY_SEED, raffle.key().as_ref()],
        bump = treasury.bump,
    )]
    pub treasury: Box<Account<'info, Treasury>>,

    /// CHECK: compared against the drawn participant in the handler
    #[account(mut)]
    pub winner: UncheckedAccount<'info>,

    #[account(mut)]
    pub executor: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}
