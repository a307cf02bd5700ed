use crate::state::{Config, CONFIG_ACCOUNT_SIZE};
use anchor_lang::prelude::*;

/// Event emitted when the program-wide config is created
#[event]
pub struct ConfigInitialized {
    pub management_authority: Pubkey,
    pub initialized_by: Pubkey,
}

/// Creates the program-wide config PDA. Runs once per deployment: a second
/// call fails because the `["config"]` account already exists.
///
/// The management authority recorded here is the only signer allowed to
/// create raffles, and the raffle counter it starts at zero is used to derive
/// raffle addresses.
pub fn init_config(ctx: Context<InitConfig>) -> Result<()> {
    let config = &mut ctx.accounts.config;
    config.management_authority = ctx.accounts.management_authority.key();
    config.bump = ctx.bumps.config;
    config.raffle_counter = 0;

    emit!(ConfigInitialized {
        management_authority: config.management_authority,
        initialized_by: ctx.accounts.deployer.key(),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct InitConfig<'info> {
    #[account(
        init,
        payer = deployer,
        space = CONFIG_ACCOUNT_SIZE,
        seeds = [b"config"],
        bump
    )]
    pub config: Account<'info, Config>,

    #[account(mut)]
    pub deployer: Signer<'info>,

    pub management_authority: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}
