//! FDI two-digit tooth numbering.
//!
//! Quadrant digit 1–4 is the permanent dentition (upper right, upper left,
//! lower left, lower right), 5–8 the primary dentition in the same order.
//! Position digit counts from the midline: 1–8 permanent, 1–5 primary.

/// True for a valid permanent (11–48) or primary (51–85) FDI number.
pub fn is_valid_fdi(tooth: u8) -> bool {
    let quadrant = tooth / 10;
    let position = tooth % 10;
    match quadrant {
        1..=4 => (1..=8).contains(&position),
        5..=8 => (1..=5).contains(&position),
        _ => false,
    }
}

/// True for teeth in the upper jaw (quadrants 1, 2, 5, 6).
pub fn is_upper(tooth: u8) -> bool {
    matches!(tooth / 10, 1 | 2 | 5 | 6)
}

pub fn is_primary(tooth: u8) -> bool {
    (5..=8).contains(&(tooth / 10))
}

/// Typical canal count for a tooth, used only when neither the model nor
/// the clinician's text states one.
///
/// Incisors and canines: 1. Upper premolars: 2, lower premolars: 1.
/// Upper first molars: 4, other molars: 3. Primary molars: 3.
pub fn default_canal_count(tooth: u8) -> Option<u8> {
    if !is_valid_fdi(tooth) {
        return None;
    }
    let position = tooth % 10;

    if is_primary(tooth) {
        return Some(if position >= 4 { 3 } else { 1 });
    }

    let count = match position {
        1..=3 => 1,
        4 | 5 if is_upper(tooth) => 2,
        4 | 5 => 1,
        6 if is_upper(tooth) => 4,
        _ => 3,
    };
    Some(count)
}
