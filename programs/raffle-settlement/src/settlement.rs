//! Winner selection and the one-shot payout of everything in custody.
//!
//! The draw seed is frozen when the claim window closes, from entropy that
//! nobody can know while claims are still accepted (the most recent slot hash
//! and the closing timestamp) folded together with every claimed number.
//! Once stored, anyone can recompute the winner from public account data.

use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    state::{ClaimRegistry, Ledger, Raffle, RafflePhase, Winner},
};

/// Outbound transfer capability used by [`settle`]. The program implements it
/// with CPIs to the System and Token programs.
pub trait PrizeGateway {
    fn pay_native(&mut self, amount: u64) -> Result<()>;
    /// Moves `amount` units of `mint` out of the treasury vault. A
    /// non-fungible token is paid as one unit of its own mint.
    fn pay_token(&mut self, mint: &Pubkey, amount: u64) -> Result<()>;
}

/// Cryptographic mixing function with strong avalanche properties.
/// Based on the splitmix64 finalizer.
pub fn mix(a: u64, b: u64) -> u64 {
    let mut z = a.wrapping_add(b);

    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Maps a random number into `[0, range)` without modulo bias.
pub fn unbiased_range(x: u64, range: u64) -> Result<u64> {
    if range == 0 {
        return err!(RaffleError::InsufficientParticipants);
    }

    if range.is_power_of_two() {
        return Ok(x & (range - 1));
    }

    let threshold = u64::MAX - (u64::MAX % range);

    // Bounded rejection sampling
    const MAX_ATTEMPTS: u8 = 3;

    let mut value = x;
    for i in 0..MAX_ATTEMPTS {
        if value < threshold {
            return Ok(value % range);
        }
        value = mix(value, value.wrapping_add(i as u64 + 1));
    }

    Ok(value % range)
}

/// Seed frozen at window close.
pub fn derive_seed(slot_entropy: (u64, u64), timestamp: i64, numbers: impl Iterator<Item = u64>) -> u64 {
    let mut seed = mix(slot_entropy.0, timestamp as u64);
    seed = mix(seed, slot_entropy.1);
    numbers.fold(seed, mix)
}

/// Index into the claimed sequence picked by `seed`.
pub fn select_index(seed: u64, entries: usize) -> Result<u64> {
    unbiased_range(seed, entries as u64)
}

/// Picks the winner of a closed raffle without mutating anything.
pub fn draw(raffle: &Raffle, registry: &ClaimRegistry) -> Result<Winner> {
    let seed = raffle.draw_seed.ok_or(RaffleError::InvalidPhase)?;
    let entry = registry.entry_at(select_index(seed, registry.len())?)?;
    Ok(Winner {
        participant: entry.participant,
        number: entry.number,
    })
}

/// Draws the winner and checks that `candidate` is the account the caller
/// supplied for it.
pub fn ensure_winner(raffle: &Raffle, registry: &ClaimRegistry, candidate: &Pubkey) -> Result<Winner> {
    let winner = draw(raffle, registry)?;
    require_keys_eq!(*candidate, winner.participant, RaffleError::WinnerMismatch);
    Ok(winner)
}

/// Every token transfer `settle` performs, fungible holdings first and then
/// each held non-fungible token in deposit order.
pub fn token_payouts(ledger: &Ledger) -> Vec<(Pubkey, u64)> {
    ledger
        .fungible_payouts()
        .into_iter()
        .map(|h| (h.mint, h.amount))
        .chain(ledger.tokens.iter().map(|t| (t.mint, 1)))
        .collect()
}

/// Draws the winner and moves every custodied asset to them.
///
/// Ledger and phase are updated before any transfer is attempted. If one
/// transfer fails, the previous ledger, phase and winner are restored and
/// `TransferFailure` is returned, so a later retry starts from the same state.
pub fn settle<G: PrizeGateway>(
    raffle: &mut Raffle,
    ledger: &mut Ledger,
    registry: &ClaimRegistry,
    now: i64,
    gateway: &mut G,
) -> Result<Winner> {
    raffle.ensure_settleable(registry.len(), now)?;
    let winner = draw(raffle, registry)?;

    let snapshot = ledger.clone();
    let native = ledger.native;
    let payouts = token_payouts(ledger);

    ledger.clear();
    raffle.phase = RafflePhase::Settled;
    raffle.winner = Some(winner);

    if let Err(error) = pay_out(gateway, native, &payouts) {
        msg!("Settlement aborted: {}", error);
        *ledger = snapshot;
        raffle.phase = RafflePhase::Closed;
        raffle.winner = None;
        return err!(RaffleError::TransferFailure);
    }

    Ok(winner)
}

fn pay_out<G: PrizeGateway>(gateway: &mut G, native: u64, payouts: &[(Pubkey, u64)]) -> Result<()> {
    if native > 0 {
        gateway.pay_native(native)?;
    }
    for (mint, amount) in payouts {
        gateway.pay_token(mint, *amount)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        claim_registry::tests::participant,
        ledger::tests::sample_ledger,
        raffle::{
            non_fungible_mint_address,
            tests::{sample_raffle, CLAIM_DEADLINE, ROUND_DEADLINE},
        },
        AssetKind,
    };
    use crate::test_utils::assert_raffle_err;

    /// In-memory recipient that can be told to refuse one mint.
    #[derive(Default)]
    struct MockGateway {
        native_received: u64,
        tokens_received: Vec<(Pubkey, u64)>,
        failing_mint: Option<Pubkey>,
    }

    impl PrizeGateway for MockGateway {
        fn pay_native(&mut self, amount: u64) -> Result<()> {
            self.native_received += amount;
            Ok(())
        }

        fn pay_token(&mut self, mint: &Pubkey, amount: u64) -> Result<()> {
            if self.failing_mint == Some(*mint) {
                return err!(RaffleError::MissingPrizeAccounts);
            }
            self.tokens_received.push((*mint, amount));
            Ok(())
        }
    }

    const FUNGIBLE: [u8; 32] = [1; 32];
    const ADVANCED: [u8; 32] = [2; 32];
    const COLLECTION: [u8; 32] = [3; 32];

    fn nft(token_id: u64) -> Pubkey {
        non_fungible_mint_address(&Pubkey::new_from_array(COLLECTION), token_id)
    }

    fn closed_raffle() -> (Raffle, Ledger, ClaimRegistry) {
        let mut raffle = sample_raffle(4, 2);
        let mut ledger = sample_ledger();
        let mut registry = ClaimRegistry {
            capacity: 4,
            ..Default::default()
        };

        ledger.credit_native(1_234_567_890).unwrap();
        ledger
            .credit_fungible(&Pubkey::new_from_array(FUNGIBLE), 77_000_009_333)
            .unwrap();
        ledger
            .credit_fungible(&Pubkey::new_from_array(ADVANCED), 23_000_001_111)
            .unwrap();
        let collection = Pubkey::new_from_array(COLLECTION);
        ledger.credit_non_fungible(&collection, 888, &nft(888)).unwrap();
        ledger.credit_non_fungible(&collection, 889, &nft(889)).unwrap();

        raffle.approvers = 4;
        raffle.open_second_round(ROUND_DEADLINE - 10).unwrap();
        for (i, number) in [17u64, 22, 27, 83].into_iter().enumerate() {
            registry.record(number, participant(i as u8)).unwrap();
            raffle.record_entrant().unwrap();
        }
        let seed = derive_seed((11, 13), ROUND_DEADLINE, registry.numbers());
        raffle
            .close_registration(registry.len(), ROUND_DEADLINE, seed)
            .unwrap();

        (raffle, ledger, registry)
    }

    #[test]
    fn test_unbiased_range_stays_in_bounds() {
        for range in [1u64, 2, 3, 4, 7, 100, 257, 1_000_003] {
            for x in [0u64, 1, 12345, u64::MAX - 1, u64::MAX] {
                assert!(unbiased_range(x, range).unwrap() < range);
            }
        }
        assert_raffle_err(unbiased_range(5, 0), RaffleError::InsufficientParticipants);
    }

    #[test]
    fn test_seed_depends_on_every_input() {
        let numbers = [17u64, 22, 27, 83];
        let seed = derive_seed((1, 2), 1_000, numbers.into_iter());

        assert_eq!(seed, derive_seed((1, 2), 1_000, numbers.into_iter()));
        assert_ne!(seed, derive_seed((1, 3), 1_000, numbers.into_iter()));
        assert_ne!(seed, derive_seed((1, 2), 1_001, numbers.into_iter()));
        assert_ne!(seed, derive_seed((1, 2), 1_000, numbers.into_iter().rev()));
    }

    #[test]
    fn test_settle_pays_everything_to_the_winner() {
        let (mut raffle, mut ledger, registry) = closed_raffle();
        let expected = draw(&raffle, &registry).unwrap();
        let mut gateway = MockGateway::default();

        let winner = settle(&mut raffle, &mut ledger, &registry, ROUND_DEADLINE, &mut gateway).unwrap();

        assert_eq!(winner, expected);
        assert!(registry.contains(winner.number));
        assert_eq!(raffle.winner().unwrap(), winner);
        assert_eq!(raffle.phase, RafflePhase::Settled);

        assert_eq!(gateway.native_received, 1_234_567_890);
        assert_eq!(
            gateway.tokens_received,
            vec![
                (Pubkey::new_from_array(FUNGIBLE), 77_000_009_333),
                (Pubkey::new_from_array(ADVANCED), 23_000_001_111),
                (nft(888), 1),
                (nft(889), 1),
            ]
        );
        let collection = Pubkey::new_from_array(COLLECTION);
        assert_eq!(ledger.balance(AssetKind::NonFungible, &collection), 0);

        assert!(ledger.is_empty());
        assert_eq!(ledger.balance(AssetKind::Native, &Pubkey::default()), 0);
    }

    #[test]
    fn test_second_execute_is_rejected() {
        let (mut raffle, mut ledger, registry) = closed_raffle();
        let mut gateway = MockGateway::default();
        let winner = settle(&mut raffle, &mut ledger, &registry, ROUND_DEADLINE, &mut gateway).unwrap();

        let mut second = MockGateway::default();
        assert_raffle_err(
            settle(&mut raffle, &mut ledger, &registry, CLAIM_DEADLINE, &mut second),
            RaffleError::AlreadySettled,
        );
        assert_eq!(second.native_received, 0);
        assert!(second.tokens_received.is_empty());
        assert_eq!(raffle.winner().unwrap(), winner);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_failed_transfer_rolls_back_settlement() {
        let (mut raffle, mut ledger, registry) = closed_raffle();
        let before = ledger.clone();
        let mut gateway = MockGateway {
            failing_mint: Some(nft(889)),
            ..Default::default()
        };

        assert_raffle_err(
            settle(&mut raffle, &mut ledger, &registry, ROUND_DEADLINE, &mut gateway),
            RaffleError::TransferFailure,
        );
        assert_eq!(ledger.native, before.native);
        assert_eq!(ledger.holdings, before.holdings);
        assert_eq!(ledger.tokens, before.tokens);
        assert_eq!(raffle.phase, RafflePhase::Closed);
        assert_raffle_err(raffle.winner(), RaffleError::NotSettled);

        // retry once the recipient accepts the asset
        let mut gateway = MockGateway::default();
        let winner = settle(&mut raffle, &mut ledger, &registry, ROUND_DEADLINE, &mut gateway).unwrap();
        assert_eq!(raffle.winner().unwrap(), winner);
        assert_eq!(gateway.tokens_received.len(), 4);
    }

    #[test]
    fn test_ensure_winner_rejects_another_account() {
        let (raffle, _, registry) = closed_raffle();
        let expected = draw(&raffle, &registry).unwrap();

        assert_eq!(ensure_winner(&raffle, &registry, &expected.participant).unwrap(), expected);
        let impostor = (0..4u8)
            .map(participant)
            .find(|p| *p != expected.participant)
            .unwrap();
        assert_raffle_err(
            ensure_winner(&raffle, &registry, &impostor),
            RaffleError::WinnerMismatch,
        );
    }

    #[test]
    fn test_settle_requires_closed_window() {
        let mut raffle = sample_raffle(4, 2);
        let mut ledger = sample_ledger();
        let registry = ClaimRegistry::default();
        let mut gateway = MockGateway::default();

        assert_raffle_err(
            settle(&mut raffle, &mut ledger, &registry, ROUND_DEADLINE, &mut gateway),
            RaffleError::InvalidPhase,
        );

        raffle.open_second_round(ROUND_DEADLINE).unwrap();
        raffle.close_registration(0, CLAIM_DEADLINE, 1).unwrap();
        assert_raffle_err(
            settle(&mut raffle, &mut ledger, &registry, CLAIM_DEADLINE, &mut gateway),
            RaffleError::InsufficientParticipants,
        );
        assert_eq!(raffle.phase, RafflePhase::Closed);
    }

    #[test]
    fn test_roster_below_minimum_settles_after_deadline() {
        let mut raffle = sample_raffle(4, 2);
        let mut ledger = sample_ledger();
        ledger.credit_native(500).unwrap();
        let mut registry = ClaimRegistry {
            capacity: 4,
            ..Default::default()
        };
        raffle.open_second_round(ROUND_DEADLINE).unwrap();
        // one holder against a minimum of two
        registry.record(17, participant(0)).unwrap();
        raffle.record_entrant().unwrap();
        let seed = derive_seed((5, 6), CLAIM_DEADLINE, registry.numbers());
        raffle.close_registration(registry.len(), CLAIM_DEADLINE, seed).unwrap();

        let mut gateway = MockGateway::default();
        let winner = settle(&mut raffle, &mut ledger, &registry, CLAIM_DEADLINE, &mut gateway).unwrap();
        assert_eq!(winner.number, 17);
        assert_eq!(winner.participant, participant(0));
        assert_eq!(gateway.native_received, 500);
        // nothing else was in custody
        assert!(gateway.tokens_received.is_empty());
    }
}
