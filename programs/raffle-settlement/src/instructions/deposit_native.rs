use anchor_lang::prelude::*;
use anchor_lang::system_program::{transfer, Transfer};

use crate::{
    error::RaffleError,
    state::{Ledger, Raffle, RafflePhase, Treasury, TREASURY_SEED},
};

/// Event emitted when lamports are deposited as a prize
#[event]
pub struct NativeDeposited {
    pub raffle: Pubkey,
    pub depositor: Pubkey,
    pub amount: u64,
    pub total: u64,
}

/// Deposits lamports into the raffle treasury.
///
/// # Security Considerations
/// 1. Only accepted while the raffle is in Deposit phase
/// 2. The treasury balance delta is checked against the amount before the
///    instruction succeeds, so the ledger never records unreceived funds
pub fn deposit_native(ctx: Context<DepositNative>, amount: u64) -> Result<()> {
    require!(amount > 0, RaffleError::InvalidAmount);

    ctx.accounts.ledger.credit_native(amount)?;

    let pre_transfer_balance = ctx.accounts.treasury.to_account_info().lamports();

    transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            Transfer {
                from: ctx.accounts.depositor.to_account_info(),
                to: ctx.accounts.treasury.to_account_info(),
            },
        ),
        amount,
    )?;

    let post_transfer_balance = ctx.accounts.treasury.to_account_info().lamports();
    require!(
        post_transfer_balance
            == pre_transfer_balance
                .checked_add(amount)
                .ok_or(RaffleError::Overflow)?,
        RaffleError::TransferVerificationFailed
    );

    emit!(NativeDeposited {
        raffle: ctx.accounts.raffle.key(),
        depositor: ctx.accounts.depositor.key(),
        amount,
        total: ctx.accounts.ledger.native,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct DepositNative<'info> {
    #[account(
        constraint = raffle.phase == RafflePhase::Deposit @ RaffleError::InvalidPhase,
    )]
    pub raffle: Box<Account<'info, Raffle>>,

    #[account(
        mut,
        seeds = [b"ledger", raffle.key().as_ref()],
        bump,
        has_one = raffle,
    )]
    pub ledger: Box<Account<'info, Ledger>>,

    #[account(
        mut,
        seeds = [TREASURY_SEED, raffle.key().as_ref()],
        bump = treasury.bump,
    )]
    pub treasury: Account<'info, Treasury>,

    #[account(mut)]
    pub depositor: Signer<'info>,

    pub system_program: Program<'info, System>,
}
