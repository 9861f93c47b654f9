//! Boundary to the FHE engine. Round, ticket and draw logic only ever talk to
//! an [`FheCapability`]; they never see plaintext ticket numbers.

use anchor_lang::prelude::*;
use std::ops::RangeInclusive;

use crate::constants::NUMBERS_PER_TICKET;
use crate::state::CipherHandle;

/// One submitted ciphertext with its validity proof.
#[derive(Clone, Copy, Debug)]
pub struct EncryptedInput<'a> {
    pub handle: &'a CipherHandle,
    pub proof: &'a [u8],
}

/// Slot a ciphertext is registered into. Binding inputs to it stops a proof
/// from being replayed into another round or ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputContext {
    pub round_id: u64,
    pub ticket_id: u64,
}

/// Result of comparing one ticket against the winning numbers.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Distinct winning numbers present in the ticket.
    pub matched: u8,
}

impl MatchOutcome {
    pub fn is_jackpot(&self) -> bool {
        self.matched as usize == NUMBERS_PER_TICKET
    }
}

pub trait FheCapability {
    /// Checks that `input` is a well-formed encryption of an in-range value
    /// and registers it to `(context, owner)`. `Ok(false)` means rejected.
    fn verify_and_register(
        &mut self,
        input: EncryptedInput<'_>,
        context: InputContext,
        owner: &Pubkey,
    ) -> Result<bool>;

    /// Publicly verifiable random numbers, `count` of them, each in `range`.
    fn random_winning_numbers(&mut self, count: usize, range: RangeInclusive<u8>) -> Result<Vec<u8>>;

    /// Compares encrypted ticket numbers with the winning numbers without
    /// revealing any individual ticket value.
    fn compare_encrypted(
        &mut self,
        ticket: &[CipherHandle; NUMBERS_PER_TICKET],
        winning: &[u8; NUMBERS_PER_TICKET],
    ) -> Result<MatchOutcome>;
}
