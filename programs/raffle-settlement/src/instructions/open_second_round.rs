use anchor_lang::prelude::*;

use crate::state::Raffle;

/// Event emitted when the claim window opens
#[event]
pub struct SecondRoundOpened {
    pub raffle: Pubkey,
    pub approvers: u32,
    pub opened_at: i64,
}

/// Moves the raffle from Deposit to Registering. Permissionless: succeeds
/// once `min_participants` distinct holders approved a ticket or the round deadline passed.
pub fn open_second_round(ctx: Context<OpenSecondRound>) -> Result<()> {
    let current_time = Clock::get()?.unix_timestamp;
    let raffle = &mut ctx.accounts.raffle;

    raffle.open_second_round(current_time)?;

    emit!(SecondRoundOpened {
        raffle: raffle.key(),
        approvers: raffle.approvers,
        opened_at: current_time,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct OpenSecondRound<'info> {
    #[account(mut)]
    pub raffle: Box<Account<'info, Raffle>>,

    pub caller: Signer<'info>,
}
