use anchor_lang::prelude::*;

use crate::error::RaffleError;

// Space calculation:
// 8 (discriminator) +
// 4 + 64 (name) +
// 4 + 64 (sponsor) +
// 32 (ticket_issuer) +
// 4 + 8 * 33 (prize_tokens) +
// 1 (instant_win) +
// 4 (min_participants) +
// 8 (round_deadline) +
// 8 (claim_deadline) +
// 4 (required_claims) +
// 32 (creator) +
// 8 (creation_time) +
// 1 (phase) +
// 4 (approvers) +
// 4 (entrants) +
// 9 (draw_seed: Option<u64>) +
// 41 (winner: Option<Winner>) +
// 1 (bump) =
// 569 total bytes
pub const RAFFLE_ACCOUNT_SIZE: usize = 8
    + (4 + RaffleConfig::MAX_NAME_LEN)
    + (4 + RaffleConfig::MAX_SPONSOR_LEN)
    + 32
    + (4 + RaffleConfig::MAX_PRIZE_TOKENS * PrizeToken::SIZE)
    + 1
    + 4
    + 8
    + 8
    + 4
    + 32
    + 8
    + 1
    + 4
    + 4
    + 9
    + (1 + Winner::SIZE)
    + 1;

pub const TICKET_MINT_SEED: &[u8] = b"ticket";
pub const TOKEN_MINT_SEED: &[u8] = b"token";

/// The closed set of asset capabilities the engine accepts.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AssetKind {
    Native,
    Fungible,
    NonFungible,
    Ticket,
}

/// Lifecycle of a raffle. Transitions only ever move forward.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum RafflePhase {
    #[default]
    Deposit,
    Registering,
    Closed,
    Settled,
}

/// A prize identity: the mint of a fungible token, or the issuer of a
/// non-fungible collection whose token `#n` is the mint `["token", n]`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct PrizeToken {
    pub kind: AssetKind,
    pub mint: Pubkey,
}

impl PrizeToken {
    pub const SIZE: usize = 1 + 32;
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct Winner {
    pub participant: Pubkey,
    pub number: u64,
}

impl Winner {
    pub const SIZE: usize = 32 + 8;
}

/// Parameters fixed at creation.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct RaffleConfig {
    pub name: String,
    pub sponsor: String,
    /// Program whose PDAs `["ticket", id]` are the ticket mints.
    pub ticket_issuer: Pubkey,
    pub prize_tokens: Vec<PrizeToken>,
    /// Close the claim window as soon as `min_participants` distinct
    /// holders have claimed, instead of waiting for a full registry.
    pub instant_win: bool,
    /// Distinct ticket holders, not tickets.
    pub min_participants: u32,
    pub round_deadline: i64,
    pub claim_deadline: i64,
    pub required_claims: u32,
}

impl RaffleConfig {
    pub const MAX_NAME_LEN: usize = 64;
    pub const MAX_SPONSOR_LEN: usize = 64;
    pub const MAX_PRIZE_TOKENS: usize = 8;
    pub const MAX_REQUIRED_CLAIMS: u32 = 250;

    pub fn validate(&self) -> Result<()> {
        require!(self.name.len() <= Self::MAX_NAME_LEN, RaffleError::NameTooLong);
        require!(
            self.sponsor.len() <= Self::MAX_SPONSOR_LEN,
            RaffleError::SponsorTooLong
        );
        require!(
            !self.prize_tokens.is_empty() && self.prize_tokens.len() <= Self::MAX_PRIZE_TOKENS,
            RaffleError::InvalidPrizeTokens
        );
        for (i, prize) in self.prize_tokens.iter().enumerate() {
            require!(
                matches!(prize.kind, AssetKind::Fungible | AssetKind::NonFungible),
                RaffleError::InvalidPrizeTokens
            );
            require!(
                !self.prize_tokens[..i].iter().any(|p| p.mint == prize.mint),
                RaffleError::InvalidPrizeTokens
            );
        }
        require!(
            self.required_claims > 0 && self.required_claims <= Self::MAX_REQUIRED_CLAIMS,
            RaffleError::InvalidRequiredClaims
        );
        require!(
            self.min_participants > 0 && self.min_participants <= self.required_claims,
            RaffleError::InvalidMinParticipants
        );
        require!(
            self.claim_deadline > self.round_deadline,
            RaffleError::InvalidDeadlines
        );
        Ok(())
    }
}

#[account]
#[derive(Default)]
pub struct Raffle {
    pub config: RaffleConfig,
    pub creator: Pubkey,
    pub creation_time: i64,
    pub phase: RafflePhase,
    /// Distinct holders that approved at least one ticket.
    pub approvers: u32,
    /// Distinct holders that claimed at least one ticket.
    pub entrants: u32,
    /// Frozen when the claim window closes.
    pub draw_seed: Option<u64>,
    pub winner: Option<Winner>,
    pub bump: u8,
}

impl Raffle {
    /// Rejects asset identities that are not part of the prize list.
    pub fn ensure_prize(&self, kind: AssetKind, mint: &Pubkey) -> Result<()> {
        require!(
            self.config
                .prize_tokens
                .iter()
                .any(|p| p.kind == kind && p.mint == *mint),
            RaffleError::UnauthorizedCaller
        );
        Ok(())
    }

    pub fn ticket_mint(&self, ticket_id: u64) -> Pubkey {
        ticket_mint_address(&self.config.ticket_issuer, ticket_id)
    }

    /// Admission check for a non-fungible deposit of `collection` token
    /// `token_id`, run before the token moves.
    pub fn ensure_non_fungible_deposit(
        &self,
        collection: &Pubkey,
        token_id: u64,
        mint: &Pubkey,
        decimals: u8,
        sender_amount: u64,
    ) -> Result<()> {
        self.ensure_prize(AssetKind::NonFungible, collection)?;
        require_keys_eq!(
            *mint,
            non_fungible_mint_address(collection, token_id),
            RaffleError::InvalidTokenMint
        );
        require!(
            decimals == 0 && sender_amount == 1,
            RaffleError::NotNonFungible
        );
        Ok(())
    }

    pub fn record_approver(&mut self) -> Result<()> {
        require!(
            matches!(self.phase, RafflePhase::Deposit | RafflePhase::Registering),
            RaffleError::InvalidPhase
        );
        self.approvers = self.approvers.checked_add(1).ok_or(RaffleError::Overflow)?;
        Ok(())
    }

    pub fn record_entrant(&mut self) -> Result<()> {
        require!(self.phase == RafflePhase::Registering, RaffleError::InvalidPhase);
        self.entrants = self.entrants.checked_add(1).ok_or(RaffleError::Overflow)?;
        Ok(())
    }

    fn minimum_reached(&self) -> bool {
        self.entrants >= self.config.min_participants
    }

    /// Deposit -> Registering, once enough holders approved a ticket or the
    /// round deadline passed.
    pub fn open_second_round(&mut self, now: i64) -> Result<()> {
        require!(self.phase == RafflePhase::Deposit, RaffleError::InvalidPhase);
        require!(
            self.approvers >= self.config.min_participants || now >= self.config.round_deadline,
            RaffleError::InsufficientParticipants
        );
        self.phase = RafflePhase::Registering;
        Ok(())
    }

    pub fn ensure_claim_window(&self, now: i64) -> Result<()> {
        require!(
            self.phase == RafflePhase::Registering && now < self.config.claim_deadline,
            RaffleError::InvalidPhase
        );
        Ok(())
    }

    /// Any closing condition is enough; they are checked at call time.
    pub fn registration_closable(&self, entries: usize, now: i64) -> bool {
        self.phase == RafflePhase::Registering
            && (entries >= self.config.required_claims as usize
                || now >= self.config.claim_deadline
                || (self.config.instant_win && self.minimum_reached()))
    }

    pub fn close_registration(&mut self, entries: usize, now: i64, seed: u64) -> Result<()> {
        require!(
            self.registration_closable(entries, now),
            RaffleError::InvalidPhase
        );
        self.phase = RafflePhase::Closed;
        self.draw_seed = Some(seed);
        Ok(())
    }

    pub fn ensure_settleable(&self, entries: usize, now: i64) -> Result<()> {
        match self.phase {
            RafflePhase::Settled => return err!(RaffleError::AlreadySettled),
            RafflePhase::Closed => {}
            _ => return err!(RaffleError::InvalidPhase),
        }
        // Below the minimum the draw waits for the deadline, then settles
        // with whoever entered.
        require!(
            entries > 0 && (self.minimum_reached() || now >= self.config.claim_deadline),
            RaffleError::InsufficientParticipants
        );
        Ok(())
    }

    pub fn winner(&self) -> Result<Winner> {
        match (self.phase, self.winner) {
            (RafflePhase::Settled, Some(winner)) => Ok(winner),
            _ => err!(RaffleError::NotSettled),
        }
    }
}

pub fn ticket_mint_address(ticket_issuer: &Pubkey, ticket_id: u64) -> Pubkey {
    issued_mint_address(ticket_issuer, TICKET_MINT_SEED, ticket_id)
}

pub fn non_fungible_mint_address(collection: &Pubkey, token_id: u64) -> Pubkey {
    issued_mint_address(collection, TOKEN_MINT_SEED, token_id)
}

fn issued_mint_address(issuer: &Pubkey, seed: &[u8], id: u64) -> Pubkey {
    Pubkey::find_program_address(&[seed, &id.to_le_bytes()], issuer).0
}
