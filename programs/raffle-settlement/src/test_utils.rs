use anchor_lang::error::Error;
use anchor_lang::prelude::Result;

use crate::error::RaffleError;

/// Compares by Anchor error code so the source location of `err!` is ignored.
pub fn assert_raffle_err<T: std::fmt::Debug>(result: Result<T>, expected: RaffleError) {
    let expected_code: u32 = expected.into();
    match result {
        Err(Error::AnchorError(error)) => assert_eq!(
            error.error_code_number, expected_code,
            "unexpected error {}",
            error.error_name
        ),
        other => panic!("expected error code {expected_code}, got {other:?}"),
    }
}
