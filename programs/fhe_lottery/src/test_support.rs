//! Fixtures and a plaintext coprocessor for unit tests.

use anchor_lang::prelude::*;
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::{
    capability::{EncryptedInput, FheCapability, InputContext, MatchOutcome},
    constants::{DEFAULT_CLAIM_GRACE_SECS, INITIAL_ROUND_ID, INITIAL_VERSION, NUMBERS_PER_TICKET},
    errors::LotteryError,
    state::{CipherHandle, Config, DrawEntry, Round, RoundRegistry, Ticket, UserTickets, WinnerBoard},
};

pub const VALID_PROOF: &[u8] = b"range-proof:ok";

// -------------------------
// Heap accounting
// -------------------------

// The SBF bump allocator never frees, so every allocation and every
// realloc target counts toward its 32 KiB.
struct CountingAlloc;

thread_local! {
    static HEAP_BYTES: Cell<usize> = const { Cell::new(0) };
}

fn charge(bytes: usize) {
    let _ = HEAP_BYTES.try_with(|c| c.set(c.get().saturating_add(bytes)));
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        charge(layout.size());
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        charge(new_size);
        System.realloc(ptr, layout, new_size)
    }
}

#[global_allocator]
static ALLOCATOR: CountingAlloc = CountingAlloc;

/// Runs `f` and returns its result with the bytes it allocated on this
/// thread, as a bump heap would have to provide them.
pub fn heap_bytes_during<R>(f: impl FnOnce() -> R) -> (R, usize) {
    let before = HEAP_BYTES.with(Cell::get);
    let out = f();
    let after = HEAP_BYTES.with(Cell::get);
    (out, after - before)
}

pub fn assert_lottery_err<T: std::fmt::Debug>(res: Result<T>, expected: LotteryError) {
    match res {
        Ok(v) => panic!("expected {:?}, got Ok({:?})", expected, v),
        Err(anchor_lang::error::Error::AnchorError(e)) => {
            assert_eq!(e.error_code_number, u32::from(expected), "got {}", e.error_name)
        }
        Err(other) => panic!("expected {:?}, got {:?}", expected, other),
    }
}

/// Six distinct handles derived from `seed`.
pub fn handles(seed: u8) -> [CipherHandle; NUMBERS_PER_TICKET] {
    let mut out = [[0u8; 32]; NUMBERS_PER_TICKET];
    for (i, h) in out.iter_mut().enumerate() {
        h[0] = seed;
        h[1] = i as u8;
    }
    out
}

pub fn entry(round_id: u64, ticket_id: u64, owner: Pubkey, handles: [CipherHandle; NUMBERS_PER_TICKET]) -> DrawEntry {
    DrawEntry {
        round_id,
        ticket_id,
        owner,
        handles,
    }
}

pub fn config(admin: Pubkey) -> Config {
    Config {
        admin,
        bump: 0,
        coprocessor: Pubkey::new_unique(),
        paused: false,
        claim_grace_secs: DEFAULT_CLAIM_GRACE_SECS,
        treasury: Pubkey::new_unique(),
        treasury_bump: 0,
        version: INITIAL_VERSION,
    }
}

pub fn registry(admin: Pubkey) -> RoundRegistry {
    RoundRegistry {
        admin,
        bump: 0,
        next_round_id: INITIAL_ROUND_ID,
        version: INITIAL_VERSION,
    }
}

/// Zeroed account data, as a freshly initialised PDA deserialises.
pub fn blank_round() -> Round {
    Round {
        round_id: 0,
        bump: 0,
        phase: Default::default(),
        name: String::new(),
        creator: Pubkey::default(),
        start_time: 0,
        end_time: 0,
        ticket_price: 0,
        prize_pool: 0,
        ticket_count: 0,
        vault: Pubkey::default(),
        vault_bump: 0,
        drawn: false,
        drawn_at: 0,
        winning_numbers: [0; NUMBERS_PER_TICKET],
        winner_count: 0,
        claimed_amount: 0,
        swept: false,
        swept_at: 0,
    }
}

pub fn blank_ticket() -> Ticket {
    Ticket {
        round_id: 0,
        ticket_id: 0,
        owner: Pubkey::default(),
        bump: 0,
        handles: [[0u8; 32]; NUMBERS_PER_TICKET],
        proof_digests: [[0u8; 32]; NUMBERS_PER_TICKET],
        purchased_at: 0,
    }
}

pub fn blank_user_tickets() -> UserTickets {
    UserTickets {
        round_id: 0,
        owner: Pubkey::default(),
        bump: 0,
        ticket_ids: Vec::new(),
    }
}

pub fn blank_board() -> WinnerBoard {
    WinnerBoard {
        round_id: 0,
        bump: 0,
        recorded: false,
        winners: Vec::new(),
    }
}

/// Deterministic stand-in for the FHE engine. Keeps plaintexts in a table,
/// hands out scripted winning numbers and fails on demand.
#[derive(Default)]
pub struct MockCoprocessor {
    plaintexts: HashMap<CipherHandle, u8>,
    bindings: HashMap<CipherHandle, (InputContext, Pubkey)>,
    next_handle: u64,

    pub winning: Option<Vec<u8>>,
    pub reject_all_proofs: bool,
    /// Comparison call index (0-based) that errors.
    pub fail_compare_at: Option<usize>,
    pub compare_calls: usize,
}

impl MockCoprocessor {
    pub fn with_winning(numbers: &[u8]) -> Self {
        Self {
            winning: Some(numbers.to_vec()),
            ..Default::default()
        }
    }

    pub fn encrypt(&mut self, value: u8) -> CipherHandle {
        self.next_handle += 1;
        let mut handle = [0u8; 32];
        handle[..8].copy_from_slice(&self.next_handle.to_le_bytes());
        handle[31] = 0xfe;
        self.plaintexts.insert(handle, value);
        handle
    }

    /// Encrypted numbers and matching proofs for one ticket.
    pub fn encrypt_ticket(&mut self, numbers: [u8; NUMBERS_PER_TICKET]) -> (Vec<CipherHandle>, Vec<Vec<u8>>) {
        let handles = numbers.iter().map(|n| self.encrypt(*n)).collect();
        let proofs = vec![VALID_PROOF.to_vec(); NUMBERS_PER_TICKET];
        (handles, proofs)
    }

    pub fn is_bound(&self, handle: &CipherHandle) -> bool {
        self.bindings.contains_key(handle)
    }
}

impl FheCapability for MockCoprocessor {
    fn verify_and_register(
        &mut self,
        input: EncryptedInput<'_>,
        context: InputContext,
        owner: &Pubkey,
    ) -> Result<bool> {
        if self.reject_all_proofs || input.proof != VALID_PROOF {
            return Ok(false);
        }
        let Some(value) = self.plaintexts.get(input.handle) else {
            return Ok(false);
        };
        if !(1..=49).contains(value) {
            return Ok(false);
        }
        match self.bindings.get(input.handle) {
            Some(bound) => Ok(*bound == (context, *owner)),
            None => {
                self.bindings.insert(*input.handle, (context, *owner));
                Ok(true)
            }
        }
    }

    fn random_winning_numbers(&mut self, count: usize, _range: RangeInclusive<u8>) -> Result<Vec<u8>> {
        let numbers = self
            .winning
            .clone()
            .ok_or_else(|| error!(LotteryError::RandomnessUnavailable))?;
        require!(numbers.len() == count, LotteryError::RandomnessUnavailable);
        Ok(numbers)
    }

    fn compare_encrypted(
        &mut self,
        ticket: &[CipherHandle; NUMBERS_PER_TICKET],
        winning: &[u8; NUMBERS_PER_TICKET],
    ) -> Result<MatchOutcome> {
        let call = self.compare_calls;
        self.compare_calls += 1;
        if self.fail_compare_at == Some(call) {
            return err!(LotteryError::ComparisonFailed);
        }

        let mut values = Vec::with_capacity(NUMBERS_PER_TICKET);
        for h in ticket.iter() {
            let v = self
                .plaintexts
                .get(h)
                .ok_or_else(|| error!(LotteryError::ComparisonFailed))?;
            values.push(*v);
        }
        let matched = winning.iter().filter(|w| values.contains(w)).count() as u8;
        Ok(MatchOutcome { matched })
    }
}
