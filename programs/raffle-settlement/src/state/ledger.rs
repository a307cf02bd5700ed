use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    state::raffle::{AssetKind, PrizeToken, RaffleConfig},
};

// 8 discriminator + 32 raffle + 8 native
// + 4 + 8 * 41 holdings + 4 + 16 * 72 held tokens
pub const LEDGER_ACCOUNT_SIZE: usize = 8
    + 32
    + 8
    + (4 + RaffleConfig::MAX_PRIZE_TOKENS * Holding::SIZE)
    + (4 + Ledger::MAX_HELD_TOKENS * HeldToken::SIZE);

/// Quantity of one prize identity held in custody. For a non-fungible
/// collection the amount is the number of its tokens held.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct Holding {
    pub kind: AssetKind,
    pub mint: Pubkey,
    pub amount: u64,
}

impl Holding {
    pub const SIZE: usize = 1 + 32 + 8;
}

/// One non-fungible token in custody.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct HeldToken {
    pub collection: Pubkey,
    pub token_id: u64,
    /// Mint derived from `collection` and `token_id`.
    pub mint: Pubkey,
}

impl HeldToken {
    pub const SIZE: usize = 32 + 8 + 32;
}

/// Everything the raffle currently custodies, independent of who deposited it.
#[account]
#[derive(Default)]
pub struct Ledger {
    pub raffle: Pubkey,
    pub native: u64,
    pub holdings: Vec<Holding>,
    /// Non-fungible tokens in deposit order.
    pub tokens: Vec<HeldToken>,
}

impl Ledger {
    pub const MAX_HELD_TOKENS: usize = 16;

    /// One zeroed holding per configured prize, in configuration order.
    pub fn seed_holdings(&mut self, raffle: Pubkey, prize_tokens: &[PrizeToken]) {
        self.raffle = raffle;
        self.native = 0;
        self.holdings = prize_tokens
            .iter()
            .map(|p| Holding {
                kind: p.kind,
                mint: p.mint,
                amount: 0,
            })
            .collect();
        self.tokens = Vec::new();
    }

    pub fn credit_native(&mut self, amount: u64) -> Result<()> {
        require!(amount > 0, RaffleError::InvalidAmount);
        self.native = self.native.checked_add(amount).ok_or(RaffleError::Overflow)?;
        Ok(())
    }

    pub fn credit_fungible(&mut self, mint: &Pubkey, amount: u64) -> Result<()> {
        require!(amount > 0, RaffleError::InvalidAmount);
        let holding = self.holding_mut(AssetKind::Fungible, mint)?;
        holding.amount = holding.amount.checked_add(amount).ok_or(RaffleError::Overflow)?;
        Ok(())
    }

    /// Adds `token_id` to the held set of `collection`.
    pub fn credit_non_fungible(
        &mut self,
        collection: &Pubkey,
        token_id: u64,
        mint: &Pubkey,
    ) -> Result<()> {
        self.holding_mut(AssetKind::NonFungible, collection)?;
        require!(!self.holds_token(mint), RaffleError::NotNonFungible);
        require!(
            self.tokens.len() < Self::MAX_HELD_TOKENS,
            RaffleError::NonFungibleCustodyFull
        );

        let holding = self.holding_mut(AssetKind::NonFungible, collection)?;
        holding.amount = holding.amount.checked_add(1).ok_or(RaffleError::Overflow)?;
        self.tokens.push(HeldToken {
            collection: *collection,
            token_id,
            mint: *mint,
        });
        Ok(())
    }

    pub fn holds_token(&self, mint: &Pubkey) -> bool {
        self.tokens.iter().any(|t| t.mint == *mint)
    }

    /// For Native the mint is ignored; for NonFungible it is the collection
    /// and the result is the number of its tokens held.
    pub fn balance(&self, kind: AssetKind, mint: &Pubkey) -> u64 {
        match kind {
            AssetKind::Native => self.native,
            AssetKind::Ticket => 0,
            _ => self
                .holdings
                .iter()
                .find(|h| h.kind == kind && h.mint == *mint)
                .map_or(0, |h| h.amount),
        }
    }

    /// Token id at `index` among the held tokens of `collection`.
    pub fn non_fungible_at(&self, collection: &Pubkey, index: u64) -> Result<u64> {
        usize::try_from(index)
            .ok()
            .and_then(|i| {
                self.tokens
                    .iter()
                    .filter(|t| t.collection == *collection)
                    .nth(i)
            })
            .map(|t| t.token_id)
            .ok_or_else(|| error!(RaffleError::IndexOutOfRange))
    }

    /// Non-zero fungible holdings, in configuration order.
    pub fn fungible_payouts(&self) -> Vec<Holding> {
        self.holdings
            .iter()
            .filter(|h| h.kind == AssetKind::Fungible && h.amount > 0)
            .copied()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.native == 0 && self.tokens.is_empty() && self.holdings.iter().all(|h| h.amount == 0)
    }

    pub fn clear(&mut self) {
        self.native = 0;
        for holding in self.holdings.iter_mut() {
            holding.amount = 0;
        }
        self.tokens.clear();
    }

    fn holding_mut(&mut self, kind: AssetKind, mint: &Pubkey) -> Result<&mut Holding> {
        self.holdings
            .iter_mut()
            .find(|h| h.kind == kind && h.mint == *mint)
            .ok_or_else(|| error!(RaffleError::UnauthorizedCaller))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::state::raffle::tests::sample_raffle;
    use crate::test_utils::assert_raffle_err;

    pub(crate) fn sample_ledger() -> Ledger {
        let raffle = sample_raffle(4, 1);
        let mut ledger = Ledger::default();
        ledger.seed_holdings(Pubkey::new_from_array([8; 32]), &raffle.config.prize_tokens);
        ledger
    }

    #[test]
    fn test_native_deposit_is_recorded() {
        let mut ledger = sample_ledger();
        ledger.credit_native(1_234_567_890).unwrap();
        assert_eq!(ledger.balance(AssetKind::Native, &Pubkey::default()), 1_234_567_890);
        // re-query without an intervening deposit
        assert_eq!(ledger.balance(AssetKind::Native, &Pubkey::default()), 1_234_567_890);
    }

    #[test]
    fn test_credits_sum_to_deposits() {
        let mut ledger = sample_ledger();
        let mint = Pubkey::new_from_array([1; 32]);
        let deposits = [77_000_009_333u64, 1, 23_000_001_111, 500];
        for amount in deposits {
            ledger.credit_fungible(&mint, amount).unwrap();
        }
        assert_eq!(ledger.balance(AssetKind::Fungible, &mint), deposits.iter().sum::<u64>());
        assert_eq!(ledger.balance(AssetKind::Fungible, &Pubkey::new_from_array([2; 32])), 0);
    }

    #[test]
    fn test_rejected_credit_leaves_ledger_untouched() {
        let mut ledger = sample_ledger();
        let before = ledger.clone();

        assert_raffle_err(
            ledger.credit_fungible(&Pubkey::new_from_array([3; 32]), 10),
            RaffleError::UnauthorizedCaller,
        );
        assert_raffle_err(
            ledger.credit_fungible(&Pubkey::new_from_array([42; 32]), 10),
            RaffleError::UnauthorizedCaller,
        );
        assert_raffle_err(ledger.credit_native(0), RaffleError::InvalidAmount);

        ledger.native = u64::MAX;
        assert_raffle_err(ledger.credit_native(1), RaffleError::Overflow);
        ledger.native = before.native;
        assert_eq!(ledger.holdings, before.holdings);
    }

    fn nft(id: u64) -> Pubkey {
        Pubkey::new_from_array([100 + id as u8; 32])
    }

    #[test]
    fn test_non_fungible_custody_is_a_set_per_collection() {
        let mut ledger = sample_ledger();
        let collection = Pubkey::new_from_array([3; 32]);
        ledger.credit_non_fungible(&collection, 888, &nft(1)).unwrap();
        ledger.credit_non_fungible(&collection, 12, &nft(2)).unwrap();

        assert_eq!(ledger.balance(AssetKind::NonFungible, &collection), 2);
        assert_eq!(ledger.non_fungible_at(&collection, 0).unwrap(), 888);
        assert_eq!(ledger.non_fungible_at(&collection, 1).unwrap(), 12);
        assert_raffle_err(
            ledger.non_fungible_at(&collection, 2),
            RaffleError::IndexOutOfRange,
        );

        assert_raffle_err(
            ledger.credit_non_fungible(&collection, 888, &nft(1)),
            RaffleError::NotNonFungible,
        );
        // a fungible prize is not a collection
        assert_raffle_err(
            ledger.credit_non_fungible(&Pubkey::new_from_array([1; 32]), 5, &nft(3)),
            RaffleError::UnauthorizedCaller,
        );
        assert_eq!(ledger.tokens.len(), 2);
    }

    #[test]
    fn test_non_fungible_custody_is_bounded() {
        let mut ledger = sample_ledger();
        let collection = Pubkey::new_from_array([3; 32]);
        for id in 0..Ledger::MAX_HELD_TOKENS as u64 {
            ledger.credit_non_fungible(&collection, id, &nft(id)).unwrap();
        }
        assert_raffle_err(
            ledger.credit_non_fungible(&collection, 99, &nft(99)),
            RaffleError::NonFungibleCustodyFull,
        );
        assert_eq!(
            ledger.balance(AssetKind::NonFungible, &collection),
            Ledger::MAX_HELD_TOKENS as u64
        );
    }

    #[test]
    fn test_payouts_and_clear() {
        let mut ledger = sample_ledger();
        ledger.credit_native(10).unwrap();
        ledger
            .credit_fungible(&Pubkey::new_from_array([2; 32]), 5)
            .unwrap();
        ledger
            .credit_non_fungible(&Pubkey::new_from_array([3; 32]), 888, &nft(1))
            .unwrap();

        let payouts = ledger.fungible_payouts();
        assert_eq!(payouts.len(), 1);
        assert_eq!(payouts[0].mint, Pubkey::new_from_array([2; 32]));
        assert!(!ledger.is_empty());

        ledger.clear();
        assert!(ledger.is_empty());
        assert!(ledger.fungible_payouts().is_empty());
        assert!(ledger.tokens.is_empty());
        assert_eq!(ledger.holdings.len(), 3);
    }

    #[test]
    fn test_account_size_covers_maximum_holdings() {
        let mut ledger = Ledger::default();
        ledger.holdings = vec![
            Holding {
                kind: AssetKind::Fungible,
                mint: Pubkey::default(),
                amount: u64::MAX,
            };
            RaffleConfig::MAX_PRIZE_TOKENS
        ];
        ledger.tokens = vec![
            HeldToken {
                collection: Pubkey::default(),
                token_id: u64::MAX,
                mint: Pubkey::default(),
            };
            Ledger::MAX_HELD_TOKENS
        ];
        let mut encoded = Vec::new();
        ledger.serialize(&mut encoded).unwrap();
        assert_eq!(8 + encoded.len(), LEDGER_ACCOUNT_SIZE);
    }
}
