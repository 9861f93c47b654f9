use anchor_lang::prelude::*;

#[error_code]
pub enum LotteryError {
    // -----------------
    // Validation
    // -----------------
    #[msg("Round name must not be empty")]
    EmptyRoundName,
    #[msg("Round name too long")]
    RoundNameTooLong,
    #[msg("Ticket price must be greater than zero")]
    ZeroTicketPrice,
    #[msg("Exactly 6 encrypted numbers and 6 proofs are required")]
    WrongEntryCount,
    #[msg("Payment must equal the ticket price")]
    IncorrectPayment,
    #[msg("Ticket accounts do not match the round ledger")]
    InvalidTicketAccounts,
    #[msg("Ticket PDA mismatch")]
    TicketPdaMismatch,
    #[msg("Ticket is not in the winners list")]
    NotWinner,

    // -----------------
    // State
    // -----------------
    #[msg("Protocol paused")]
    Paused,
    #[msg("Round is not open for ticket sales")]
    RoundNotOpen,
    #[msg("Round has not closed yet")]
    RoundNotClosed,
    #[msg("Round already drawn")]
    AlreadyDrawn,
    #[msg("Round not drawn yet")]
    NotDrawn,
    #[msg("Round ticket capacity reached")]
    RoundFull,
    #[msg("Coprocessor pubkey not set")]
    CoprocessorNotSet,
    #[msg("Sweep not allowed yet (grace period not elapsed)")]
    SweepTooEarly,
    #[msg("Round already swept")]
    AlreadySwept,

    // -----------------
    // Proof
    // -----------------
    #[msg("Encrypted input rejected by the coprocessor")]
    ProofRejected,
    #[msg("Missing or invalid ed25519 verify instruction")]
    MissingOrInvalidEd25519Ix,
    #[msg("Ed25519 pubkey mismatch")]
    Ed25519PubkeyMismatch,
    #[msg("Malformed coprocessor attestation")]
    MalformedAttestation,

    // -----------------
    // Auth
    // -----------------
    #[msg("Unauthorized")]
    Unauthorized,

    // -----------------
    // Accounting
    // -----------------
    #[msg("Already claimed")]
    AlreadyClaimed,
    #[msg("Payout would exceed the prize pool")]
    Overdraw,
    #[msg("Cannot claim after the round was swept")]
    ClaimAfterSweep,
    #[msg("Insufficient vault funds")]
    InsufficientVaultFunds,
    #[msg("Math overflow")]
    MathOverflow,

    // -----------------
    // Randomness
    // -----------------
    #[msg("Draw randomness not available")]
    RandomnessUnavailable,
    #[msg("Winning numbers must be 6 distinct values in 1..=49")]
    InvalidWinningNumbers,
    #[msg("Encrypted comparison failed")]
    ComparisonFailed,
    #[msg("Draw attestation does not match the round ledger")]
    OutcomeMismatch,

    // -----------------
    // Lookup
    // -----------------
    #[msg("Round not found")]
    RoundNotFound,
}

/// Coarse error classes callers branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    State,
    Proof,
    Auth,
    Accounting,
    Randomness,
    NotFound,
}

impl ErrorKind {
    /// Proof and randomness failures come from the coprocessor; the same call
    /// can succeed once the external dependency recovers.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Proof | ErrorKind::Randomness)
    }
}

impl LotteryError {
    pub const ALL: [LotteryError; 32] = [
        LotteryError::EmptyRoundName,
        LotteryError::RoundNameTooLong,
        LotteryError::ZeroTicketPrice,
        LotteryError::WrongEntryCount,
        LotteryError::IncorrectPayment,
        LotteryError::InvalidTicketAccounts,
        LotteryError::TicketPdaMismatch,
        LotteryError::NotWinner,
        LotteryError::Paused,
        LotteryError::RoundNotOpen,
        LotteryError::RoundNotClosed,
        LotteryError::AlreadyDrawn,
        LotteryError::NotDrawn,
        LotteryError::RoundFull,
        LotteryError::CoprocessorNotSet,
        LotteryError::SweepTooEarly,
        LotteryError::AlreadySwept,
        LotteryError::ProofRejected,
        LotteryError::MissingOrInvalidEd25519Ix,
        LotteryError::Ed25519PubkeyMismatch,
        LotteryError::MalformedAttestation,
        LotteryError::Unauthorized,
        LotteryError::AlreadyClaimed,
        LotteryError::Overdraw,
        LotteryError::ClaimAfterSweep,
        LotteryError::InsufficientVaultFunds,
        LotteryError::MathOverflow,
        LotteryError::RandomnessUnavailable,
        LotteryError::InvalidWinningNumbers,
        LotteryError::ComparisonFailed,
        LotteryError::OutcomeMismatch,
        LotteryError::RoundNotFound,
    ];

    pub fn kind(self) -> ErrorKind {
        use LotteryError::*;
        match self {
            EmptyRoundName | RoundNameTooLong | ZeroTicketPrice | WrongEntryCount
            | IncorrectPayment | InvalidTicketAccounts | TicketPdaMismatch | NotWinner => {
                ErrorKind::Validation
            }
            Paused | RoundNotOpen | RoundNotClosed | AlreadyDrawn | NotDrawn | RoundFull
            | CoprocessorNotSet | SweepTooEarly | AlreadySwept => ErrorKind::State,
            ProofRejected | MissingOrInvalidEd25519Ix | Ed25519PubkeyMismatch
            | MalformedAttestation => ErrorKind::Proof,
            Unauthorized => ErrorKind::Auth,
            AlreadyClaimed | Overdraw | ClaimAfterSweep | InsufficientVaultFunds
            | MathOverflow => ErrorKind::Accounting,
            RandomnessUnavailable | InvalidWinningNumbers | ComparisonFailed
            | OutcomeMismatch => ErrorKind::Randomness,
            RoundNotFound => ErrorKind::NotFound,
        }
    }
}

/// Classifies an error returned by any lottery instruction. Framework errors
/// (account constraints, deserialization) have no lottery kind.
pub fn error_kind(err: &anchor_lang::error::Error) -> Option<ErrorKind> {
    match err {
        anchor_lang::error::Error::AnchorError(e) => LotteryError::ALL
            .iter()
            .find(|v| u32::from(**v) == e.error_code_number)
            .map(|v| v.kind()),
        _ => None,
    }
}
