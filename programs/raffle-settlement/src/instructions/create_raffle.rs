use crate::{
    error::RaffleError,
    state::{
        ClaimRegistry, Config, Ledger, Raffle, RaffleConfig, RafflePhase, Treasury,
        LEDGER_ACCOUNT_SIZE, RAFFLE_ACCOUNT_SIZE, TREASURY_ACCOUNT_SIZE, TREASURY_SEED,
    },
};
use anchor_lang::prelude::*;

const MAX_DURATION: i64 = 30 * 24 * 60 * 60; // 30 days in seconds

/// Event emitted when a raffle is created
#[event]
pub struct RaffleCreated {
    pub raffle: Pubkey,
    pub name: String,
    pub sponsor: String,
    pub ticket_issuer: Pubkey,
    pub prize_count: u8,
    pub required_claims: u32,
    pub round_deadline: i64,
    pub claim_deadline: i64,
}

/// Creates a raffle together with its treasury, ledger and claim registry.
///
/// # Arguments
/// * `ctx` - The context object containing all required accounts
/// * `config` - Immutable raffle parameters
///
/// # Security Considerations
/// 1. Only the management authority stored in the config PDA may create raffles
/// 2. The prize list must be non-empty, free of duplicates and only hold
///    fungible or non-fungible mints
/// 3. The round deadline must be in the future and the claim deadline must
///    follow it by no more than 30 days from now
///
/// # Implementation Notes
/// - The ledger is seeded with one zero holding per prize token
/// - The claim registry is sized for exactly `required_claims` entries
pub fn create_raffle(ctx: Context<CreateRaffle>, config: RaffleConfig) -> Result<()> {
    let current_time = Clock::get()?.unix_timestamp;

    config.validate()?;
    require!(config.round_deadline > current_time, RaffleError::InvalidDeadlines);
    require!(
        config.claim_deadline
            <= current_time
                .checked_add(MAX_DURATION)
                .ok_or(RaffleError::Overflow)?,
        RaffleError::DurationTooLong
    );

    let raffle_key = ctx.accounts.raffle.key();

    ctx.accounts.treasury.raffle = raffle_key;
    ctx.accounts.treasury.bump = ctx.bumps.treasury;

    ctx.accounts
        .ledger
        .seed_holdings(raffle_key, &config.prize_tokens);

    ctx.accounts.claim_registry.raffle = raffle_key;
    ctx.accounts.claim_registry.capacity = config.required_claims;
    ctx.accounts.claim_registry.entries = Vec::new();

    let raffle = &mut ctx.accounts.raffle;
    raffle.config = config;
    raffle.creator = ctx.accounts.management_authority.key();
    raffle.creation_time = current_time;
    raffle.phase = RafflePhase::Deposit;
    raffle.approvers = 0;
    raffle.entrants = 0;
    raffle.draw_seed = None;
    raffle.winner = None;
    raffle.bump = ctx.bumps.raffle;

    ctx.accounts.raffle_config.advance_counter()?;

    let raffle = &ctx.accounts.raffle;
    emit!(RaffleCreated {
        raffle: raffle_key,
        name: raffle.config.name.clone(),
        sponsor: raffle.config.sponsor.clone(),
        ticket_issuer: raffle.config.ticket_issuer,
        prize_count: raffle.config.prize_tokens.len() as u8,
        required_claims: raffle.config.required_claims,
        round_deadline: raffle.config.round_deadline,
        claim_deadline: raffle.config.claim_deadline,
    });

    Ok(())
}

#[derive(Accounts)]
#[instruction(config: RaffleConfig)]
pub struct CreateRaffle<'info> {
    #[account(
        init,
        payer = management_authority,
        space = RAFFLE_ACCOUNT_SIZE,
        seeds = [
            b"raffle",
            raffle_config.raffle_counter.to_le_bytes().as_ref(),
        ],
        bump
    )]
    pub raffle: Box<Account<'info, Raffle>>,

    #[account(mut)]
    pub management_authority: Signer<'info>,

    #[account(
        init,
        payer = management_authority,
        space = TREASURY_ACCOUNT_SIZE,
        seeds = [
            TREASURY_SEED,
            raffle.key().as_ref(),
        ],
        bump,
    )]
    pub treasury: Account<'info, Treasury>,

    #[account(
        init,
        payer = management_authority,
        space = LEDGER_ACCOUNT_SIZE,
        seeds = [
            b"ledger",
            raffle.key().as_ref(),
        ],
        bump,
    )]
    pub ledger: Box<Account<'info, Ledger>>,

    #[account(
        init,
        payer = management_authority,
        space = ClaimRegistry::space(config.required_claims.min(RaffleConfig::MAX_REQUIRED_CLAIMS)),
        seeds = [
            b"claims",
            raffle.key().as_ref(),
        ],
        bump,
    )]
    pub claim_registry: Box<Account<'info, ClaimRegistry>>,

    /// The config account storing the management authority and raffle counter
    #[account(
        mut,
        seeds = [b"config"],
        bump = raffle_config.bump,
        has_one = management_authority @ RaffleError::NotProgramManagementAuthority,
    )]
    pub raffle_config: Account<'info, Config>,

    pub system_program: Program<'info, System>,
}
