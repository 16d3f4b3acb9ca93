use std::collections::HashMap;

use anyhow::{Context, Result};
use liftoff_game::{FlightCode, FlightMode, parse_flight_code};
use regex::Regex;
use sha2::{Digest, Sha256};

const DEFAULT_SEED: u64 = 1337;
const FLIGHT_CODE_PATTERN: &str = r"(?i)^(RD|CT)-[A-Z]+\d{2}$";

/// Detailed seed metadata used for simulation and reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: Option<String>,
    pub source_mode: Option<FlightMode>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self {
            seed,
            code: None,
            source_mode: None,
        }
    }

    #[must_use]
    pub const fn from_flight_code(seed: u64, mode: FlightMode, code: String) -> Self {
        Self {
            seed,
            code: Some(code),
            source_mode: Some(mode),
        }
    }

    /// A seed taken from a code only runs in the code's own mode.
    #[must_use]
    pub fn matches_mode(&self, mode: FlightMode) -> bool {
        self.source_mode.is_none_or(|source| source == mode)
    }

    #[must_use]
    pub fn flight_code_for_mode(&self, mode: FlightMode) -> String {
        if let (Some(code), Some(source_mode)) = (&self.code, self.source_mode)
            && source_mode == mode
        {
            return code.clone();
        }
        FlightCode::from_seed(mode, self.seed).to_string()
    }
}

/// Stable seed for arbitrary text: the first eight bytes of its SHA-256 digest.
#[must_use]
pub fn seed_from_text(text: &str) -> u64 {
    let digest = Sha256::digest(text.as_bytes());
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Resolve a list of CLI seed arguments into canonical seed metadata.
///
/// Supports literal integers, flight codes, the keyword `all` (every code in
/// the word list, both modes) and free text, which is hashed.
///
/// # Errors
///
/// Returns an error for a token shaped like a flight code whose word is not
/// in the word list.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let code_shape = Regex::new(FLIGHT_CODE_PATTERN).context("compiling flight code pattern")?;
    let mut pending: Vec<SeedInfo> = Vec::new();
    let mut request_all = false;

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("all") {
            request_all = true;
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }

        if code_shape.is_match(token) {
            let code: FlightCode = token
                .parse()
                .with_context(|| format!("invalid flight code {token}"))?;
            pending.push(SeedInfo::from_flight_code(
                code.seed(),
                code.mode,
                code.to_string(),
            ));
            continue;
        }

        log::debug!("hashing free-text seed '{token}'");
        pending.push(SeedInfo::from_numeric(seed_from_text(token)));
    }

    if request_all {
        pending.extend(generate_all_flight_code_seeds()?);
    }

    let mut deduped: Vec<SeedInfo> = Vec::new();
    let mut index: HashMap<(u64, u8), usize> = HashMap::new();

    for info in pending {
        let key = (info.seed, mode_tag(info.source_mode));
        if let Some(existing) = index.get(&key).copied() {
            if deduped[existing].code.is_none() && info.code.is_some() {
                deduped[existing] = info;
            }
        } else {
            index.insert(key, deduped.len());
            deduped.push(info);
        }
    }

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(DEFAULT_SEED));
    }

    Ok(deduped)
}

fn generate_all_flight_code_seeds() -> Result<Vec<SeedInfo>> {
    use liftoff_game::seed::WORD_LIST;

    let mut seeds = Vec::with_capacity(WORD_LIST.len() * 2);
    for word in WORD_LIST {
        for prefix in ["RD", "CT"] {
            let code = format!("{prefix}-{word}00");
            let (mode, seed) = parse_flight_code(&code)
                .with_context(|| format!("failed to parse flight code: {code}"))?;
            seeds.push(SeedInfo::from_flight_code(seed, mode, code));
        }
    }
    Ok(seeds)
}

const fn mode_tag(mode: Option<FlightMode>) -> u8 {
    match mode {
        Some(FlightMode::Rounds) => 1,
        Some(FlightMode::Continuous) => 2,
        None => 0,
    }
}
