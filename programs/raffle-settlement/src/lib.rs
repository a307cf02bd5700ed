use anchor_lang::prelude::*;
use instructions::*;
use state::{AssetKind, RaffleConfig, RafflePhase, Winner};

pub mod custody;
pub mod error;
pub mod instructions;
pub mod settlement;
pub mod state;

#[cfg(test)]
mod test_utils;

declare_id!("4jSCBPNhQC8djSVqChhnkx7TRECzjVJNjboXz7sMWMqf");

#[program]
pub mod raffle_settlement {
    use super::*;

    pub fn init_config(ctx: Context<InitConfig>) -> Result<()> {
        instructions::init_config::init_config(ctx)
    }

    pub fn create_raffle(ctx: Context<CreateRaffle>, config: RaffleConfig) -> Result<()> {
        instructions::create_raffle::create_raffle(ctx, config)
    }

    pub fn deposit_native(ctx: Context<DepositNative>, amount: u64) -> Result<()> {
        instructions::deposit_native::deposit_native(ctx, amount)
    }

    pub fn deposit_fungible(ctx: Context<DepositFungible>, amount: u64) -> Result<()> {
        instructions::deposit_fungible::deposit_fungible(ctx, amount)
    }

    pub fn receive_approval(
        ctx: Context<ReceiveApproval>,
        amount: u64,
        extra_data: Vec<u8>,
    ) -> Result<()> {
        instructions::receive_approval::receive_approval(ctx, amount, extra_data)
    }

    pub fn on_non_fungible_received(
        ctx: Context<OnNonFungibleReceived>,
        collection: Pubkey,
        token_id: u64,
        extra_data: Vec<u8>,
    ) -> Result<[u8; 4]> {
        instructions::on_non_fungible_received::on_non_fungible_received(
            ctx, collection, token_id, extra_data,
        )
    }

    pub fn receive_ticket_approval(
        ctx: Context<ReceiveTicketApproval>,
        ticket_id: u64,
    ) -> Result<()> {
        instructions::receive_ticket_approval::receive_ticket_approval(ctx, ticket_id)
    }

    pub fn open_second_round(ctx: Context<OpenSecondRound>) -> Result<()> {
        instructions::open_second_round::open_second_round(ctx)
    }

    pub fn claim_ticket(ctx: Context<ClaimTicket>, ticket_id: u64) -> Result<()> {
        instructions::claim_ticket::claim_ticket(ctx, ticket_id)
    }

    pub fn close_registration(ctx: Context<CloseRegistration>) -> Result<()> {
        instructions::close_registration::close_registration(ctx)
    }

    pub fn execute<'info>(ctx: Context<'_, '_, 'info, 'info, Execute<'info>>) -> Result<()> {
        instructions::execute::execute(ctx)
    }

    pub fn phase(ctx: Context<RaffleView>) -> Result<RafflePhase> {
        instructions::views::phase(ctx)
    }

    pub fn query_balance(
        ctx: Context<RaffleView>,
        kind: AssetKind,
        mint: Pubkey,
    ) -> Result<u64> {
        instructions::views::query_balance(ctx, kind, mint)
    }

    pub fn number_at(ctx: Context<RaffleView>, index: u64) -> Result<u64> {
        instructions::views::number_at(ctx, index)
    }

    pub fn prize_non_fungible(
        ctx: Context<RaffleView>,
        collection: Pubkey,
        index: u64,
    ) -> Result<u64> {
        instructions::views::prize_non_fungible(ctx, collection, index)
    }

    pub fn claimed_count(ctx: Context<RaffleView>) -> Result<u32> {
        instructions::views::claimed_count(ctx)
    }

    pub fn winner(ctx: Context<RaffleView>) -> Result<Winner> {
        instructions::views::winner(ctx)
    }
}
