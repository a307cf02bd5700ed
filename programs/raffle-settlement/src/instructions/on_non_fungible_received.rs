use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::{
    custody::transfer_token,
    error::RaffleError,
    state::{Ledger, Raffle, RafflePhase, Treasury, TREASURY_SEED},
};

/// Acknowledgement returned to the sender once the token is in custody.
pub const NFT_RECEIVED: [u8; 4] = *b"RNFT";

/// Event emitted when a non-fungible prize enters custody
#[event]
pub struct NonFungibleDeposited {
    pub raffle: Pubkey,
    pub collection: Pubkey,
    pub token_id: u64,
    pub mint: Pubkey,
    pub depositor: Pubkey,
}

/// Receive hook for one token of a listed non-fungible collection.
///
/// A collection is identified by its issuer; token `#token_id` of it is the
/// mint at `["token", token_id_le]` under the issuer. The unit is moved from
/// the sender into that mint's vault and added to the collection's held set,
/// then `NFT_RECEIVED` is returned as the instruction's return data.
///
/// # Security Considerations
/// 1. Only accepted while the raffle is in Deposit phase
/// 2. A collection that is not a listed non-fungible prize is refused before
///    any token moves
/// 3. The mint must be the collection's mint for `token_id`, have zero
///    decimals, and the sender must hold exactly one unit
/// 4. A token already in custody is refused, as is any token beyond the
///    ledger's capacity
pub fn on_non_fungible_received(
    ctx: Context<OnNonFungibleReceived>,
    collection: Pubkey,
    token_id: u64,
    extra_data: Vec<u8>,
) -> Result<[u8; 4]> {
    let mint = ctx.accounts.mint.key();
    ctx.accounts.raffle.ensure_non_fungible_deposit(
        &collection,
        token_id,
        &mint,
        ctx.accounts.mint.decimals,
        ctx.accounts.sender_token_account.amount,
    )?;
    require!(
        !ctx.accounts.ledger.holds_token(&mint),
        RaffleError::NotNonFungible
    );
    if !extra_data.is_empty() {
        msg!("on_non_fungible_received: {} bytes of extra data", extra_data.len());
    }

    let pre_transfer_balance = ctx.accounts.vault.amount;

    transfer_token(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.sender_token_account.to_account_info(),
        ctx.accounts.vault.to_account_info(),
        ctx.accounts.sender.to_account_info(),
        1,
        None,
    )?;

    ctx.accounts.vault.reload()?;
    require!(
        ctx.accounts.vault.amount
            == pre_transfer_balance
                .checked_add(1)
                .ok_or(RaffleError::Overflow)?,
        RaffleError::TransferVerificationFailed
    );

    ctx.accounts
        .ledger
        .credit_non_fungible(&collection, token_id, &mint)?;

    emit!(NonFungibleDeposited {
        raffle: ctx.accounts.raffle.key(),
        collection,
        token_id,
        mint,
        depositor: ctx.accounts.sender.key(),
    });

    Ok(NFT_RECEIVED)
}

#[derive(Accounts)]
pub struct OnNonFungibleReceived<'info> {
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
        payer = sender,
        associated_token::mint = mint,
        associated_token::authority = treasury,
    )]
    pub vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = mint,
        token::authority = sender,
    )]
    pub sender_token_account: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub sender: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}
