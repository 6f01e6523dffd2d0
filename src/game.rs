use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::num::IntErrorKind;
use tracing::debug;

/// Smallest number a target or guess may take
pub const MIN_NUMBER: u8 = 1;
/// Largest number a target or guess may take
pub const MAX_NUMBER: u8 = 99;

/// Why a start or guess input was rejected
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessError {
    #[error("not a number")]
    NotANumber,
    #[error("number must be between 1 and 99")]
    OutOfRange,
    #[error("no game in progress")]
    InvalidState,
}

impl GuessError {
    /// Stable machine-readable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            GuessError::NotANumber => "not_a_number",
            GuessError::OutOfRange => "out_of_range",
            GuessError::InvalidState => "invalid_state",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Status {
    NotStarted,
    InProgress,
    Won,
}

/// Classification of a single guess against the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Outcome {
    Correct,
    TooLow,
    TooHigh,
}

/// Result of a recorded guess, with the count after recording it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub guess: u8,
    pub outcome: Outcome,
    pub guess_count: usize,
}

/// One playthrough: owns the target, the guesses made so far and the lifecycle status.
///
/// The RNG is owned by the session so the "system picks the target" path can be
/// made deterministic by handing in a seeded generator.
#[derive(Debug)]
pub struct GameSession<R: Rng = StdRng> {
    rng: R,
    target: Option<u8>,
    // oldest first
    guesses: Vec<u8>,
    status: Status,
}

impl GameSession<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for GameSession<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> GameSession<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            target: None,
            guesses: Vec::new(),
            status: Status::NotStarted,
        }
    }

    /// Begin a session. `None` draws the target uniformly from the valid range.
    ///
    /// An out-of-range seed leaves the session exactly as it was.
    pub fn start(&mut self, seed: Option<i64>) -> Result<(), GuessError> {
        let target = match seed {
            Some(n) => in_range(n).ok_or(GuessError::OutOfRange)?,
            None => self.rng.gen_range(MIN_NUMBER..=MAX_NUMBER),
        };

        self.target = Some(target);
        self.guesses.clear();
        self.status = Status::InProgress;
        debug!(seeded = seed.is_some(), "session started");
        Ok(())
    }

    /// Begin a session with a secret typed in by a player.
    /// Any unusable input counts as out of range here.
    pub fn start_from_input(&mut self, raw: &str) -> Result<(), GuessError> {
        let seed = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| GuessError::OutOfRange)?;
        self.start(Some(seed))
    }

    pub fn submit_guess(&mut self, raw: &str) -> Result<Feedback, GuessError> {
        let target = match (self.status, self.target) {
            (Status::InProgress, Some(target)) => target,
            _ => return Err(GuessError::InvalidState),
        };

        let guess = parse_guess(raw)?;
        self.guesses.push(guess);

        let outcome = match guess.cmp(&target) {
            std::cmp::Ordering::Equal => {
                self.status = Status::Won;
                Outcome::Correct
            }
            std::cmp::Ordering::Less => Outcome::TooLow,
            std::cmp::Ordering::Greater => Outcome::TooHigh,
        };

        debug!(guess, %outcome, count = self.guesses.len(), "guess recorded");

        Ok(Feedback {
            guess,
            outcome,
            guess_count: self.guesses.len(),
        })
    }

    pub fn reset(&mut self) {
        self.target = None;
        self.guesses.clear();
        self.status = Status::NotStarted;
        debug!("session reset");
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Guesses in the order they were made
    pub fn guesses(&self) -> &[u8] {
        &self.guesses
    }

    pub fn guess_count(&self) -> usize {
        self.guesses.len()
    }

    pub fn last_guess(&self) -> Option<u8> {
        self.guesses.last().copied()
    }

    /// The target, revealed only once it has been guessed
    pub fn target(&self) -> Option<u8> {
        match self.status {
            Status::Won => self.target,
            _ => None,
        }
    }

    /// Tightest interval still consistent with the feedback given so far
    pub fn bounds(&self) -> Option<(u8, u8)> {
        let target = self.target?;
        let low = self
            .guesses
            .iter()
            .filter(|&&g| g < target)
            .max()
            .map_or(MIN_NUMBER, |g| g + 1);
        let high = self
            .guesses
            .iter()
            .filter(|&&g| g > target)
            .min()
            .map_or(MAX_NUMBER, |g| g - 1);
        Some((low, high))
    }
}

fn in_range(n: i64) -> Option<u8> {
    if (i64::from(MIN_NUMBER)..=i64::from(MAX_NUMBER)).contains(&n) {
        u8::try_from(n).ok()
    } else {
        None
    }
}

fn parse_guess(raw: &str) -> Result<u8, GuessError> {
    let n = raw.trim().parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => GuessError::OutOfRange,
        _ => GuessError::NotANumber,
    })?;
    in_range(n).ok_or(GuessError::OutOfRange)
}
