use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::{
    custody::{transfer_token, TokenGrant},
    error::RaffleError,
    instructions::deposit_fungible::{record_fungible_deposit, FungibleDeposited},
    state::{AssetKind, Ledger, Raffle, RafflePhase, Treasury, TREASURY_SEED},
};

/// Approve-and-notify deposit: the token owner has delegated at least
/// `amount` to the raffle treasury, and this call spends that delegation.
///
/// Anyone may notify on the owner's behalf; the owner consented through the
/// delegation. `extra_data` is an opaque payload forwarded by the notifier.
///
/// # Security Considerations
/// 1. Only accepted while the raffle is in Deposit phase
/// 2. The mint must be registered as a fungible prize, otherwise the
///    notification is rejected as coming from an unknown token
/// 3. The delegate must be the treasury with a sufficient allowance
pub fn receive_approval(
    ctx: Context<ReceiveApproval>,
    amount: u64,
    extra_data: Vec<u8>,
) -> Result<()> {
    require!(amount > 0, RaffleError::InvalidAmount);
    let mint = ctx.accounts.mint.key();
    ctx.accounts
        .raffle
        .ensure_prize(AssetKind::Fungible, &mint)?;

    let source: &TokenAccount = &ctx.accounts.owner_token_account;
    TokenGrant::from(source).ensure_allowance(&ctx.accounts.treasury.key(), amount)?;
    if !extra_data.is_empty() {
        msg!("receive_approval: {} bytes of extra data", extra_data.len());
    }

    let pre_transfer_balance = ctx.accounts.vault.amount;
    let raffle_key = ctx.accounts.raffle.key();
    let signer_seeds: &[&[u8]] = &[
        TREASURY_SEED,
        raffle_key.as_ref(),
        &[ctx.accounts.treasury.bump],
    ];

    transfer_token(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.owner_token_account.to_account_info(),
        ctx.accounts.vault.to_account_info(),
        ctx.accounts.treasury.to_account_info(),
        amount,
        Some(&[signer_seeds]),
    )?;

    let total = record_fungible_deposit(
        &ctx.accounts.raffle,
        &mut ctx.accounts.ledger,
        &mut ctx.accounts.vault,
        &mint,
        amount,
        pre_transfer_balance,
    )?;

    emit!(FungibleDeposited {
        raffle: raffle_key,
        mint,
        depositor: ctx.accounts.owner_token_account.owner,
        amount,
        total,
        via_approval: true,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct ReceiveApproval<'info> {
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
        seeds = [TREASURY_SEED, raffle.key().as_ref()],
        bump = treasury.bump,
    )]
    pub treasury: Box<Account<'info, Treasury>>,

    pub mint: Box<Account<'info, Mint>>,

    #[account(
        init_if_needed,
        payer = notifier,
        associated_token::mint = mint,
        associated_token::authority = treasury,
    )]
    pub vault: Box<Account<'info, TokenAccount>>,

    /// Token account of the approving owner, delegated to the treasury
    #[account(
        mut,
        token::mint = mint,
    )]
    pub owner_token_account: Box<Account<'info, TokenAccount>>,

    /// Pays for the vault if it does not exist yet
    #[account(mut)]
    pub notifier: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}
