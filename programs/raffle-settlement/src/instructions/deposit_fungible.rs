use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::{
    custody::transfer_token,
    error::RaffleError,
    state::{AssetKind, Ledger, Raffle, RafflePhase, Treasury, TREASURY_SEED},
};

/// Event emitted when fungible prize tokens enter custody, by push or by
/// approve-and-notify
#[event]
pub struct FungibleDeposited {
    pub raffle: Pubkey,
    pub mint: Pubkey,
    pub depositor: Pubkey,
    pub amount: u64,
    pub total: u64,
    pub via_approval: bool,
}

/// Credits the ledger once the vault balance proves the tokens arrived.
pub(crate) fn record_fungible_deposit(
    raffle: &Raffle,
    ledger: &mut Ledger,
    vault: &mut Account<TokenAccount>,
    mint: &Pubkey,
    amount: u64,
    pre_transfer_balance: u64,
) -> Result<u64> {
    vault.reload()?;
    require!(
        vault.amount
            == pre_transfer_balance
                .checked_add(amount)
                .ok_or(RaffleError::Overflow)?,
        RaffleError::TransferVerificationFailed
    );
    raffle.ensure_prize(AssetKind::Fungible, mint)?;
    ledger.credit_fungible(mint, amount)?;
    Ok(ledger.balance(AssetKind::Fungible, mint))
}

/// Push deposit: the depositor signs a token transfer into the raffle vault.
///
/// # Security Considerations
/// 1. Only accepted while the raffle is in Deposit phase
/// 2. The mint must be registered as a fungible prize of this raffle
/// 3. The vault is the treasury's associated token account for the mint
pub fn deposit_fungible(ctx: Context<DepositFungible>, amount: u64) -> Result<()> {
    require!(amount > 0, RaffleError::InvalidAmount);
    ctx.accounts
        .raffle
        .ensure_prize(AssetKind::Fungible, &ctx.accounts.mint.key())?;

    let pre_transfer_balance = ctx.accounts.vault.amount;

    transfer_token(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.depositor_token_account.to_account_info(),
        ctx.accounts.vault.to_account_info(),
        ctx.accounts.depositor.to_account_info(),
        amount,
        None,
    )?;

    let mint = ctx.accounts.mint.key();
    let total = record_fungible_deposit(
        &ctx.accounts.raffle,
        &mut ctx.accounts.ledger,
        &mut ctx.accounts.vault,
        &mint,
        amount,
        pre_transfer_balance,
    )?;

    emit!(FungibleDeposited {
        raffle: ctx.accounts.raffle.key(),
        mint,
        depositor: ctx.accounts.depositor.key(),
        amount,
        total,
        via_approval: false,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct DepositFungible<'info> {
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
        payer = depositor,
        associated_token::mint = mint,
        associated_token::authority = treasury,
    )]
    pub vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = mint,
        token::authority = depositor,
    )]
    pub depositor_token_account: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub depositor: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}
