use anchor_lang::prelude::*;
use anchor_spl::token::{approve, Approve, Mint, Token, TokenAccount};

use crate::{
    error::RaffleError,
    state::{
        Participant, Raffle, RafflePhase, TicketApproval, Treasury, PARTICIPANT_ACCOUNT_SIZE,
        PARTICIPANT_SEED, TICKET_APPROVAL_ACCOUNT_SIZE, TREASURY_SEED,
    },
};

/// Event emitted when a ticket holder approves the raffle for a ticket
#[event]
pub struct TicketApproved {
    pub raffle: Pubkey,
    pub ticket_id: u64,
    pub owner: Pubkey,
    pub approvers: u32,
}

/// Approve-and-notify for raffle tickets.
///
/// The holder delegates their single ticket token to the treasury and the
/// raffle records who approved it. Approving again after a transfer rebinds
/// the ticket to its new holder. The raffle counts distinct approving
/// holders, so a holder of several tickets counts once.
///
/// # Security Considerations
/// 1. Only accepted in Deposit or Registering phase
/// 2. The mint must be the ticket issuer's mint for `ticket_id`
/// 3. A ticket that was already claimed cannot be approved again
pub fn receive_ticket_approval(ctx: Context<ReceiveTicketApproval>, ticket_id: u64) -> Result<()> {
    require!(
        ctx.accounts.ticket_mint.key() == ctx.accounts.raffle.ticket_mint(ticket_id),
        RaffleError::InvalidTokenMint
    );

    approve(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Approve {
                to: ctx.accounts.owner_ticket_account.to_account_info(),
                delegate: ctx.accounts.treasury.to_account_info(),
                authority: ctx.accounts.owner.to_account_info(),
            },
        ),
        1,
    )?;

    let raffle_key = ctx.accounts.raffle.key();
    let owner = ctx.accounts.owner.key();
    // re-approving the same holder's ticket must not count twice
    let rebinds =
        ctx.accounts.ticket_approval.is_new() || ctx.accounts.ticket_approval.owner != owner;
    ctx.accounts.ticket_approval.approve(
        raffle_key,
        ticket_id,
        owner,
        ctx.bumps.ticket_approval,
    )?;

    let participant = &mut ctx.accounts.participant;
    participant.init_if_new(raffle_key, owner, ctx.bumps.participant);
    if rebinds && participant.record_approval()? {
        ctx.accounts.raffle.record_approver()?;
    }

    emit!(TicketApproved {
        raffle: raffle_key,
        ticket_id,
        owner,
        approvers: ctx.accounts.raffle.approvers,
    });

    Ok(())
}

#[derive(Accounts)]
#[instruction(ticket_id: u64)]
pub struct ReceiveTicketApproval<'info> {
    #[account(
        mut,
        constraint = matches!(raffle.phase, RafflePhase::Deposit | RafflePhase::Registering)
            @ RaffleError::InvalidPhase,
    )]
    pub raffle: Box<Account<'info, Raffle>>,

    #[account(
        seeds = [TREASURY_SEED, raffle.key().as_ref()],
        bump = treasury.bump,
    )]
    pub treasury: Account<'info, Treasury>,

    #[account(
        init_if_needed,
        payer = owner,
        space = TICKET_APPROVAL_ACCOUNT_SIZE,
        seeds = [
            b"ticket",
            raffle.key().as_ref(),
            ticket_id.to_le_bytes().as_ref(),
        ],
        bump,
    )]
    pub ticket_approval: Account<'info, TicketApproval>,

    #[account(
        init_if_needed,
        payer = owner,
        space = PARTICIPANT_ACCOUNT_SIZE,
        seeds = [
            PARTICIPANT_SEED,
            raffle.key().as_ref(),
            owner.key().as_ref(),
        ],
        bump,
    )]
    pub participant: Account<'info, Participant>,

    pub ticket_mint: Account<'info, Mint>,

    #[account(
        mut,
        token::mint = ticket_mint,
        token::authority = owner,
        constraint = owner_ticket_account.amount == 1 @ RaffleError::UnauthorizedCaller,
    )]
    pub owner_ticket_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}
