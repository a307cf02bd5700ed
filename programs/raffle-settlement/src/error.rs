use anchor_lang::error_code;

#[error_code]
pub enum RaffleError {
    Overflow,
    NameTooLong,
    SponsorTooLong,
    InvalidAmount,
    #[msg("Only the program management authority can create raffles")]
    NotProgramManagementAuthority,
    #[msg("Operation is not allowed in the current raffle phase")]
    InvalidPhase,
    #[msg("Caller or asset identity is not authorized for this raffle")]
    UnauthorizedCaller,
    #[msg("Ticket has already been claimed")]
    DuplicateClaim,
    #[msg("Claim index is out of range")]
    IndexOutOfRange,
    #[msg("The raffle has not been settled yet")]
    NotSettled,
    #[msg("The raffle has already been settled")]
    AlreadySettled,
    #[msg("Not enough participants")]
    InsufficientParticipants,
    #[msg("A prize transfer to the winner failed")]
    TransferFailure,
    #[msg("Prize token list is empty, duplicated or contains an invalid kind")]
    InvalidPrizeTokens,
    #[msg("Required claim count must be between 1 and the maximum allowed")]
    InvalidRequiredClaims,
    #[msg("Minimum participants must be at least 1")]
    InvalidMinParticipants,
    #[msg("Claim deadline must follow the round deadline, both in the future")]
    InvalidDeadlines,
    #[msg("Raffle duration exceeds maximum allowed")]
    DurationTooLong,
    #[msg("Invalid SlotHashes account provided")]
    InvalidSlotHashesAccount,
    #[msg("Mint does not match the issuer derivation for this token id")]
    InvalidTokenMint,
    #[msg("Delegated allowance is missing or too small")]
    InsufficientAllowance,
    #[msg("Token is not a non-fungible asset")]
    NotNonFungible,
    #[msg("Claim registry is full")]
    RegistryFull,
    #[msg("Winner account does not match the drawn participant")]
    WinnerMismatch,
    #[msg("Missing vault or winner token accounts for a prize")]
    MissingPrizeAccounts,
    #[msg("Inbound transfer did not reach the vault")]
    TransferVerificationFailed,
    #[msg("No room left for another non-fungible prize")]
    NonFungibleCustodyFull,
    #[msg("Winner account cannot hold the native prize without rent-exempt funding")]
    WinnerAccountUnfunded,
}
