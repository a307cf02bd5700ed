use anchor_lang::prelude::*;

use crate::error::RaffleError;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct ClaimEntry {
    /// The claimed ticket id.
    pub number: u64,
    pub participant: Pubkey,
}

impl ClaimEntry {
    pub const SIZE: usize = 8 + 32;
}

/// Ordered, append-only roster of entrants.
#[account]
#[derive(Default)]
pub struct ClaimRegistry {
    pub raffle: Pubkey,
    pub capacity: u32,
    pub entries: Vec<ClaimEntry>,
}

impl ClaimRegistry {
    // 8 discriminator + 32 raffle + 4 capacity + 4 entries length
    pub const INIT_DATA_SIZE: usize = 8 + 32 + 4 + 4;

    pub fn space(capacity: u32) -> usize {
        Self::INIT_DATA_SIZE + capacity as usize * ClaimEntry::SIZE
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity as usize
    }

    pub fn contains(&self, number: u64) -> bool {
        self.entries.iter().any(|e| e.number == number)
    }

    pub fn record(&mut self, number: u64, participant: Pubkey) -> Result<usize> {
        require!(!self.contains(number), RaffleError::DuplicateClaim);
        require!(!self.is_full(), RaffleError::RegistryFull);
        self.entries.push(ClaimEntry { number, participant });
        Ok(self.entries.len() - 1)
    }

    pub fn entry_at(&self, index: u64) -> Result<ClaimEntry> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.entries.get(i))
            .copied()
            .ok_or_else(|| error!(RaffleError::IndexOutOfRange))
    }

    pub fn number_at(&self, index: u64) -> Result<u64> {
        Ok(self.entry_at(index)?.number)
    }

    pub fn numbers(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().map(|e| e.number)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::test_utils::assert_raffle_err;

    pub(crate) fn participant(i: u8) -> Pubkey {
        Pubkey::new_from_array([100 + i; 32])
    }

    #[test]
    fn test_claims_keep_their_order() {
        let mut registry = ClaimRegistry {
            capacity: 4,
            ..Default::default()
        };
        // tickets 0..25 belong to P0; 22 was handed to P1, 27 and 83 belong to P2 and P3
        let claims = [(17, 0), (22, 1), (27, 2), (83, 3)];
        for (position, (ticket, owner)) in claims.into_iter().enumerate() {
            assert_eq!(registry.record(ticket, participant(owner)).unwrap(), position);
            assert_eq!(registry.number_at(position as u64).unwrap(), ticket);
        }

        assert_eq!(registry.numbers().collect::<Vec<_>>(), vec![17, 22, 27, 83]);
        assert_eq!(registry.number_at(0).unwrap(), 17);
        assert_eq!(registry.entry_at(3).unwrap().participant, participant(3));
        assert!(registry.is_full());
    }

    #[test]
    fn test_duplicate_claim_is_rejected() {
        let mut registry = ClaimRegistry {
            capacity: 4,
            ..Default::default()
        };
        registry.record(17, participant(0)).unwrap();

        assert_raffle_err(registry.record(17, participant(0)), RaffleError::DuplicateClaim);
        assert_raffle_err(registry.record(17, participant(1)), RaffleError::DuplicateClaim);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let mut registry = ClaimRegistry {
            capacity: 2,
            ..Default::default()
        };
        registry.record(1, participant(0)).unwrap();
        registry.record(2, participant(0)).unwrap();
        assert_raffle_err(registry.record(3, participant(0)), RaffleError::RegistryFull);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_number_at_bounds() {
        let mut registry = ClaimRegistry {
            capacity: 4,
            ..Default::default()
        };
        assert_raffle_err(registry.number_at(0), RaffleError::IndexOutOfRange);

        registry.record(17, participant(0)).unwrap();
        registry.record(22, participant(1)).unwrap();
        assert_raffle_err(registry.number_at(registry.len() as u64), RaffleError::IndexOutOfRange);
        assert_raffle_err(registry.number_at(u64::MAX), RaffleError::IndexOutOfRange);
    }

    #[test]
    fn test_space_matches_full_registry() {
        let mut registry = ClaimRegistry {
            capacity: 3,
            ..Default::default()
        };
        for i in 0..3 {
            registry.record(i, participant(i as u8)).unwrap();
        }
        let mut encoded = Vec::new();
        registry.serialize(&mut encoded).unwrap();
        assert_eq!(8 + encoded.len(), ClaimRegistry::space(3));
    }
}
