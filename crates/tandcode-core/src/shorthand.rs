//! Extractors for clinical shorthand in free-text treatment notes.
//!
//! Clinicians write dense notes like `comp 36 MOD`, `wkb 46 3k` or
//! `gebitsreiniging 20 min`. These functions pull counted evidence out of
//! that text so billing codes can be derived deterministically.
//!
//! # Shorthand conventions
//!
//! - Surfaces: one letter per restored tooth face, `M` mesial, `O` occlusal,
//!   `D` distal, `B` buccal, `L` lingual, `P` palatal, `I` incisal,
//!   `V` vestibular. `MOD` is a three-surface restoration.
//! - Explicit surface counts: `2v`, `3 vlak`, `3 vlakken`.
//! - Canal counts: `3k`, `2 kanalen`, `1 kanaal`.
//! - Durations: `20 min`, `15 minuten`.
//!
//! Every extractor returns `None` when nothing matches; none of them
//! default to zero.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Letters that name a tooth surface.
pub const SURFACE_ALPHABET: &[char] = &['M', 'O', 'D', 'B', 'L', 'P', 'I', 'V'];

static SURFACE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b[MODBLPIV]{2,6}\b").expect("valid surface regex"));

static SURFACE_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d)\s*(?:v|vl|vlak|vlakken)\b").expect("valid surface count regex")
});

static CANAL_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d)\s*(?:k|kanaal|kanalen)\b").expect("valid canal regex")
});

static MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3})\s*(?:min|mins|minuut|minuten)\b").expect("valid minutes regex")
});

fn is_surface_letter(c: char) -> bool {
    SURFACE_ALPHABET.contains(&c)
}

/// Dutch words spelled only with surface letters. Never read as surfaces
/// when written in lowercase.
const LOWERCASE_STOP_WORDS: &[&str] = &[
    "bid", "bod", "bol", "boom", "dd", "di", "do", "dom", "dood", "id", "lid", "lip",
    "lol", "lood", "mop", "om", "op", "pil", "pip", "pol", "pop", "vol",
];

/// Find a surface-letter token (2–6 letters, all from [`SURFACE_ALPHABET`]).
///
/// An all-uppercase token wins over a lowercase one, so `op 36 MOD` yields
/// `MOD` rather than the Dutch preposition. Lowercase tokens are a last
/// resort: common Dutch words are skipped, and none is used when the note
/// states an explicit count like `3 vlakken`. The result is uppercased.
pub fn extract_surfaces(text: &str) -> Option<String> {
    let mut fallback: Option<&str> = None;

    for m in SURFACE_TOKEN.find_iter(text) {
        let token = m.as_str();
        if token.chars().all(|c| c.is_ascii_uppercase()) {
            return Some(token.to_string());
        }
        if !LOWERCASE_STOP_WORDS.contains(&token.to_ascii_lowercase().as_str()) {
            fallback.get_or_insert(token);
        }
    }

    if extract_surface_count(text).is_some() {
        return None;
    }
    fallback.map(|t| t.to_ascii_uppercase())
}

/// Count the distinct surface letters in `s`.
///
/// Non-surface characters are ignored and repeats count once: `MOM` is 2,
/// `MOD` is 3. A typo such as `MOO` therefore counts as 2.
pub fn count_surfaces(s: &str) -> usize {
    s.chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|&c| is_surface_letter(c))
        .collect::<BTreeSet<char>>()
        .len()
}

/// Explicit surface count such as `2v` or `3 vlakken`.
pub fn extract_surface_count(text: &str) -> Option<u8> {
    first_number(&SURFACE_COUNT, text)
}

/// Explicit canal count such as `3k` or `2 kanalen`.
pub fn extract_canal_count(text: &str) -> Option<u8> {
    first_number(&CANAL_COUNT, text)
}

/// Stated duration in minutes such as `20 min`.
pub fn extract_minutes(text: &str) -> Option<u32> {
    MINUTES
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn first_number(re: &Regex, text: &str) -> Option<u8> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
