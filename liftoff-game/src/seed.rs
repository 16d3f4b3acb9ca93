//! Shareable flight codes.
//! Code format: <MODE>-<WORD><NN>, e.g. RD-COMET42 (rounds) or CT-NOVA07 (continuous).
//!
//! A code maps to a 64-bit seed whose low 16 bits carry the word index and
//! number, so a seed produced from a code always renders back to that code.
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::session::FlightMode;

pub const WORD_LIST: [&str; 64] = [
    "COMET", "NOVA", "ORBIT", "APOGEE", "PERIGEE", "ZENITH", "NADIR", "QUASAR", "PULSAR", "NEBULA",
    "GALAXY", "METEOR", "ROCKET", "BOOSTER", "NOZZLE", "GIMBAL", "FAIRING", "PAYLOAD", "CAPSULE",
    "LANDER", "ROVER", "PROBE", "SATURN", "JUPITER", "MARS", "VENUS", "MERCURY", "PLUTO", "TITAN",
    "EUROPA", "IO", "CALLISTO", "GANYMEDE", "PHOBOS", "DEIMOS", "LUNA", "SOLAR", "FLARE",
    "PLASMA", "ION", "THRUST", "VECTOR", "DELTA", "APOLLO", "GEMINI", "VOYAGER", "PIONEER",
    "HUBBLE", "KEPLER", "HALLEY", "VEGA", "SIRIUS", "ALTAIR", "DENEB", "RIGEL", "CASTOR", "POLLUX",
    "ANTARES", "ALDEBAR", "CYGNUS", "LYRA", "DRACO", "ORION", "HYDRA",
];

const DOMAIN: &[u8; 8] = b"LIFTOFF-";

pub(crate) fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    bytes.iter().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

const fn mode_prefix(mode: FlightMode) -> &'static str {
    match mode {
        FlightMode::Rounds => "RD",
        FlightMode::Continuous => "CT",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlightCodeError {
    #[error("flight code '{0}' is missing the mode prefix")]
    MissingPrefix(String),
    #[error("unknown flight mode prefix '{0}' (expected RD or CT)")]
    UnknownMode(String),
    #[error("flight code word '{0}' is not in the word list")]
    UnknownWord(String),
    #[error("flight code must end in two digits")]
    BadNumber,
}

/// Human-friendly handle for a seeded flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlightCode {
    pub mode: FlightMode,
    word_index: u8,
    number: u8,
}

impl FlightCode {
    /// Derive the code that a seed renders to under the given mode.
    #[must_use]
    pub fn from_seed(mode: FlightMode, seed: u64) -> Self {
        let word_index = u8::try_from((seed & 0xFF) % WORD_LIST.len() as u64).unwrap_or(0);
        let number = u8::try_from(((seed >> 8) & 0xFF) % 100).unwrap_or(0);
        Self {
            mode,
            word_index,
            number,
        }
    }

    /// Pick a code from arbitrary entropy (a clock reading, a hashed string).
    #[must_use]
    pub fn from_entropy(mode: FlightMode, entropy: u64) -> Self {
        let mixed = fnv1a64(&entropy.to_le_bytes());
        Self::from_seed(mode, mixed)
    }

    #[must_use]
    pub fn word(&self) -> &'static str {
        WORD_LIST
            .get(usize::from(self.word_index))
            .copied()
            .unwrap_or(WORD_LIST[0])
    }

    #[must_use]
    pub const fn number(&self) -> u8 {
        self.number
    }

    /// Deterministic 64-bit seed for this code.
    #[must_use]
    pub fn seed(&self) -> u64 {
        let packed = u16::from(self.word_index) | (u16::from(self.number) << 8);
        let mut buf = [0u8; 12];
        buf[..8].copy_from_slice(DOMAIN);
        buf[8..10].copy_from_slice(mode_prefix(self.mode).as_bytes());
        buf[10..12].copy_from_slice(&packed.to_le_bytes());
        (fnv1a64(&buf) & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
    }
}

impl fmt::Display for FlightCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}{:02}",
            mode_prefix(self.mode),
            self.word(),
            self.number
        )
    }
}

impl FromStr for FlightCode {
    type Err = FlightCodeError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let trimmed = code.trim();
        let (prefix, rest) = trimmed
            .split_once('-')
            .ok_or_else(|| FlightCodeError::MissingPrefix(trimmed.to_string()))?;
        let mode = match prefix.to_ascii_uppercase().as_str() {
            "RD" => FlightMode::Rounds,
            "CT" => FlightMode::Continuous,
            other => return Err(FlightCodeError::UnknownMode(other.to_string())),
        };
        if rest.len() < 3 || !rest.is_char_boundary(rest.len() - 2) {
            return Err(FlightCodeError::BadNumber);
        }
        let (word_part, number_part) = rest.split_at(rest.len() - 2);
        if !number_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FlightCodeError::BadNumber);
        }
        let number: u8 = number_part.parse().map_err(|_| FlightCodeError::BadNumber)?;
        let word = word_part.to_ascii_uppercase();
        let index = WORD_LIST
            .iter()
            .position(|candidate| *candidate == word)
            .ok_or_else(|| FlightCodeError::UnknownWord(word.clone()))?;
        let word_index = u8::try_from(index).map_err(|_| FlightCodeError::UnknownWord(word))?;
        Ok(Self {
            mode,
            word_index,
            number,
        })
    }
}

/// Parse a flight code into its mode and seed.
#[must_use]
pub fn parse_flight_code(code: &str) -> Option<(FlightMode, u64)> {
    code.parse::<FlightCode>()
        .ok()
        .map(|parsed| (parsed.mode, parsed.seed()))
}
