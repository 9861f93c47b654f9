//! On-chain [`FheCapability`] backed by ed25519 attestations from the
//! off-chain FHE coprocessor named in `Config.coprocessor`.
//!
//! Wire format of a signed statement: `tag || program_id || borsh(body)`.

use anchor_lang::prelude::*;
use std::ops::RangeInclusive;

use crate::{
    capability::{EncryptedInput, FheCapability, InputContext, MatchOutcome},
    constants::NUMBERS_PER_TICKET,
    errors::LotteryError,
    state::{CipherHandle, DrawEntry},
    utils::{handles_digest, ledger_root, proof_digest},
};

pub const INPUT_ATTESTATION_TAG: &[u8] = b"fhe-lottery:input_v1";
pub const DRAW_ATTESTATION_TAG: &[u8] = b"fhe-lottery:draw_v1";

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AttestedInput {
    pub handle: CipherHandle,
    pub proof_digest: [u8; 32],
}

/// Coprocessor verdict on the ciphertexts of one ticket slot.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct InputAttestation {
    pub round_id: u64,
    pub ticket_id: u64,
    pub owner: Pubkey,
    pub entries: Vec<AttestedInput>,
}

/// Coprocessor draw result: the winning numbers and one match count per
/// ticket, bound to the exact ledger through `ledger_root`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct DrawAttestation {
    pub round_id: u64,
    pub ticket_count: u64,
    pub winning_numbers: [u8; NUMBERS_PER_TICKET],
    pub ledger_root: [u8; 32],
    pub match_counts: Vec<u8>,
}

pub fn encode_attestation<T: AnchorSerialize>(
    tag: &[u8],
    program_id: &Pubkey,
    body: &T,
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(tag.len() + 32 + 64);
    out.extend_from_slice(tag);
    out.extend_from_slice(program_id.as_ref());
    body.serialize(&mut out)
        .map_err(|_| error!(LotteryError::MalformedAttestation))?;
    Ok(out)
}

pub fn decode_attestation<T: AnchorDeserialize>(
    tag: &[u8],
    program_id: &Pubkey,
    msg: &[u8],
) -> Option<T> {
    let program_bytes = program_id.to_bytes();
    let rest = msg.strip_prefix(tag)?;
    let body = rest.strip_prefix(&program_bytes[..])?;
    T::try_from_slice(body).ok()
}

#[derive(Debug)]
struct VerifiedDraw {
    winning: [u8; NUMBERS_PER_TICKET],
    // positional: match_counts[i] belongs to digests[i]
    digests: Vec<[u8; 32]>,
    match_counts: Vec<u8>,
}

#[derive(Debug)]
pub struct AttestedCoprocessor {
    inputs: Option<InputAttestation>,
    draw: Option<VerifiedDraw>,
}

impl AttestedCoprocessor {
    pub fn for_inputs(program_id: &Pubkey, msg: &[u8]) -> Result<Self> {
        let att: InputAttestation = decode_attestation(INPUT_ATTESTATION_TAG, program_id, msg)
            .ok_or_else(|| error!(LotteryError::MalformedAttestation))?;
        Ok(Self {
            inputs: Some(att),
            draw: None,
        })
    }

    /// Accepts the draw statement only if it covers exactly `tickets`, in
    /// id order, for `round_id`.
    pub fn for_draw(program_id: &Pubkey, msg: &[u8], round_id: u64, tickets: &[DrawEntry]) -> Result<Self> {
        let att: DrawAttestation = decode_attestation(DRAW_ATTESTATION_TAG, program_id, msg)
            .ok_or_else(|| error!(LotteryError::RandomnessUnavailable))?;

        require!(att.round_id == round_id, LotteryError::OutcomeMismatch);
        require!(att.ticket_count == tickets.len() as u64, LotteryError::OutcomeMismatch);
        require!(att.match_counts.len() == tickets.len(), LotteryError::OutcomeMismatch);

        let mut digests = Vec::with_capacity(tickets.len());
        digests.extend(tickets.iter().map(|t| handles_digest(&t.handles)));
        require!(ledger_root(digests.iter()) == att.ledger_root, LotteryError::OutcomeMismatch);

        Ok(Self {
            inputs: None,
            draw: Some(VerifiedDraw {
                winning: att.winning_numbers,
                digests,
                match_counts: att.match_counts,
            }),
        })
    }
}

impl FheCapability for AttestedCoprocessor {
    fn verify_and_register(
        &mut self,
        input: EncryptedInput<'_>,
        context: InputContext,
        owner: &Pubkey,
    ) -> Result<bool> {
        let att = self
            .inputs
            .as_ref()
            .ok_or_else(|| error!(LotteryError::ProofRejected))?;

        if att.round_id != context.round_id || att.ticket_id != context.ticket_id || att.owner != *owner {
            return Ok(false);
        }

        let digest = proof_digest(input.proof);
        Ok(att
            .entries
            .iter()
            .any(|e| e.handle == *input.handle && e.proof_digest == digest))
    }

    fn random_winning_numbers(&mut self, count: usize, _range: RangeInclusive<u8>) -> Result<Vec<u8>> {
        let draw = self
            .draw
            .as_ref()
            .ok_or_else(|| error!(LotteryError::RandomnessUnavailable))?;
        require!(count == NUMBERS_PER_TICKET, LotteryError::RandomnessUnavailable);
        Ok(draw.winning.to_vec())
    }

    fn compare_encrypted(
        &mut self,
        ticket: &[CipherHandle; NUMBERS_PER_TICKET],
        winning: &[u8; NUMBERS_PER_TICKET],
    ) -> Result<MatchOutcome> {
        let draw = self
            .draw
            .as_ref()
            .ok_or_else(|| error!(LotteryError::ComparisonFailed))?;
        require!(draw.winning == *winning, LotteryError::ComparisonFailed);

        let digest = handles_digest(ticket);
        draw.digests
            .iter()
            .position(|d| *d == digest)
            .and_then(|i| draw.match_counts.get(i))
            .map(|matched| MatchOutcome { matched: *matched })
            .ok_or_else(|| error!(LotteryError::ComparisonFailed))
    }
}
