use anchor_lang::prelude::*;
use anchor_lang::solana_program::{program_option::COption, sysvar::slot_hashes};
use anchor_spl::associated_token::{get_associated_token_address, AssociatedToken, Create};
use anchor_spl::token::{Token, TokenAccount, Transfer};
use arrayref::array_ref;

use crate::{
    error::RaffleError,
    settlement::PrizeGateway,
    state::Treasury,
};

/// The parts of an SPL token account that decide whether the treasury may
/// move its tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenGrant {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub delegate: Option<Pubkey>,
    pub delegated_amount: u64,
}

impl From<&TokenAccount> for TokenGrant {
    fn from(account: &TokenAccount) -> Self {
        let delegate = match account.delegate {
            COption::Some(key) => Some(key),
            COption::None => None,
        };
        Self {
            mint: account.mint,
            owner: account.owner,
            amount: account.amount,
            delegate,
            delegated_amount: account.delegated_amount,
        }
    }
}

impl TokenGrant {
    /// The account holds the single unit of `ticket_mint`, belongs to
    /// `claimant` and has delegated it to the treasury.
    pub fn ensure_ticket(&self, ticket_mint: &Pubkey, claimant: &Pubkey, treasury: &Pubkey) -> Result<()> {
        require!(
            self.mint == *ticket_mint
                && self.owner == *claimant
                && self.amount == 1
                && self.delegate == Some(*treasury)
                && self.delegated_amount >= 1,
            RaffleError::UnauthorizedCaller
        );
        Ok(())
    }

    /// The treasury may spend at least `amount` from this account.
    pub fn ensure_allowance(&self, treasury: &Pubkey, amount: u64) -> Result<()> {
        require!(
            self.delegate == Some(*treasury) && self.delegated_amount >= amount,
            RaffleError::InsufficientAllowance
        );
        Ok(())
    }
}

/// A system account that does not exist yet can only be credited with at
/// least the rent-exempt minimum, so a smaller native prize would fail
/// after the winner was drawn.
pub fn ensure_winner_can_receive(winner_lamports: u64, native: u64, rent_minimum: u64) -> Result<()> {
    require!(
        winner_lamports > 0 || native == 0 || native >= rent_minimum,
        RaffleError::WinnerAccountUnfunded
    );
    Ok(())
}

pub fn transfer_token<'info>(
    token_program: AccountInfo<'info>,
    from: AccountInfo<'info>,
    to: AccountInfo<'info>,
    authority: AccountInfo<'info>,
    amount: u64,
    signer_seeds: Option<&[&[&[u8]]]>,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }

    let transfer_instruction = Transfer {
        from,
        to,
        authority,
    };

    let cpi_ctx = match signer_seeds {
        Some(seeds) => CpiContext::new_with_signer(token_program, transfer_instruction, seeds),
        None => CpiContext::new(token_program, transfer_instruction),
    };

    anchor_spl::token::transfer(cpi_ctx, amount)
}

/// Reads two 8-byte words of the newest hash in the SlotHashes sysvar.
///
/// Layout: 8 byte entry count, then `(slot: u64, hash: [u8; 32])` entries,
/// newest first.
pub fn read_slot_entropy(sysvar_account: &AccountInfo) -> Result<(u64, u64)> {
    require_keys_eq!(
        *sysvar_account.key,
        slot_hashes::ID,
        RaffleError::InvalidSlotHashesAccount
    );
    let data = sysvar_account.try_borrow_data()?;
    slot_entropy(&data)
}

fn slot_entropy(data: &[u8]) -> Result<(u64, u64)> {
    // count + slot + at least 16 bytes of the first hash
    require!(data.len() >= 32, RaffleError::InvalidSlotHashesAccount);
    require!(
        u64::from_le_bytes(*array_ref![data, 0, 8]) > 0,
        RaffleError::InvalidSlotHashesAccount
    );

    let first = u64::from_le_bytes(*array_ref![data, 16, 8]);
    let second = u64::from_le_bytes(*array_ref![data, 24, 8]);
    Ok((first, second))
}

/// Pays the winner out of the treasury through CPIs.
///
/// `prize_accounts` holds one `(mint, vault, winner_token_account)` triple per
/// token transfer: each non-zero fungible holding and each held
/// non-fungible token.
pub struct CpiGateway<'a, 'info> {
    pub treasury: AccountInfo<'info>,
    pub winner: AccountInfo<'info>,
    pub payer: AccountInfo<'info>,
    pub token_program: &'a Program<'info, Token>,
    pub associated_token_program: &'a Program<'info, AssociatedToken>,
    pub system_program: &'a Program<'info, System>,
    pub prize_accounts: &'a [AccountInfo<'info>],
    pub signer_seeds: &'a [&'a [u8]],
}

impl<'a, 'info> CpiGateway<'a, 'info> {
    fn prize_accounts_for(&self, mint: &Pubkey) -> Result<(AccountInfo<'info>, AccountInfo<'info>, AccountInfo<'info>)> {
        let triple = self
            .prize_accounts
            .chunks_exact(3)
            .find(|chunk| chunk[0].key == mint)
            .ok_or(RaffleError::MissingPrizeAccounts)?;

        let (mint_info, vault, winner_account) = (&triple[0], &triple[1], &triple[2]);
        require!(
            vault.key() == get_associated_token_address(self.treasury.key, mint),
            RaffleError::MissingPrizeAccounts
        );
        require!(
            winner_account.key() == get_associated_token_address(self.winner.key, mint),
            RaffleError::MissingPrizeAccounts
        );
        Ok((mint_info.clone(), vault.clone(), winner_account.clone()))
    }
}

impl<'a, 'info> PrizeGateway for CpiGateway<'a, 'info> {
    fn pay_native(&mut self, amount: u64) -> Result<()> {
        // program-owned PDA, no System transfer needed
        Treasury::release_lamports(&self.treasury, &self.winner, amount)
    }

    fn pay_token(&mut self, mint: &Pubkey, amount: u64) -> Result<()> {
        let (mint, vault, winner_account) = self.prize_accounts_for(mint)?;

        anchor_spl::associated_token::create_idempotent(CpiContext::new(
            self.associated_token_program.to_account_info(),
            Create {
                payer: self.payer.clone(),
                associated_token: winner_account.clone(),
                authority: self.winner.clone(),
                mint,
                system_program: self.system_program.to_account_info(),
                token_program: self.token_program.to_account_info(),
            },
        ))?;

        transfer_token(
            self.token_program.to_account_info(),
            vault,
            winner_account,
            self.treasury.clone(),
            amount,
            Some(&[self.signer_seeds]),
        )
    }
}
