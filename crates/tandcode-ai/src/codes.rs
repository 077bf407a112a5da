//! Fixed code tables the correction rules derive codes from.

/// Injected local anesthesia (infiltration / block).
pub const LOCAL_ANESTHESIA: &str = "A10";
/// Topical anesthesia.
pub const TOPICAL_ANESTHESIA: &str = "A15";
/// Small intra-oral x-ray.
pub const SMALL_XRAY: &str = "X10";
/// Panoramic x-ray.
pub const PANORAMIC_XRAY: &str = "X21";
pub const PERIODIC_CHECKUP: &str = "C002";
pub const PROBLEM_CONSULT: &str = "C003";
/// Periodontal cleaning, billed per unit of [`CLEANING_UNIT_MINUTES`].
pub const CLEANING: &str = "M03";
pub const CLEANING_UNIT_MINUTES: u32 = 5;

/// Restoration material families whose code depends on surface count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillingFamily {
    Amalgam,
    Composite,
}

/// Codes for 1, 2, 3 and 4+ surfaces.
const AMALGAM_CODES: [&str; 4] = ["V71", "V72", "V73", "V74"];
const COMPOSITE_CODES: [&str; 4] = ["V91", "V92", "V93", "V94"];

impl FillingFamily {
    /// Family of a (normalized) filling code, if any.
    pub fn of(code: &str) -> Option<Self> {
        if AMALGAM_CODES.contains(&code) {
            Some(Self::Amalgam)
        } else if COMPOSITE_CODES.contains(&code) {
            Some(Self::Composite)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amalgam => "amalgam",
            Self::Composite => "composite",
        }
    }

    /// Code for `surfaces` restored faces; 4 through 6 share one code.
    pub fn code_for(&self, surfaces: usize) -> Option<&'static str> {
        let codes = match self {
            Self::Amalgam => &AMALGAM_CODES,
            Self::Composite => &COMPOSITE_CODES,
        };
        match surfaces {
            1..=3 => Some(codes[surfaces - 1]),
            4..=6 => Some(codes[3]),
            _ => None,
        }
    }
}

/// Root canal treatment codes for 1, 2, 3 and 4+ canals.
const ENDO_CODES: [&str; 4] = ["E13", "E14", "E16", "E17"];

pub fn is_endodontic(code: &str) -> bool {
    ENDO_CODES.contains(&code)
}

/// Code for a treatment of `canals` canals; 4 and 5 share one code.
pub fn endo_code_for(canals: u8) -> Option<&'static str> {
    match canals {
        1..=3 => Some(ENDO_CODES[usize::from(canals) - 1]),
        4 | 5 => Some(ENDO_CODES[3]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filling_family_lookup() {
        assert_eq!(FillingFamily::of("V93"), Some(FillingFamily::Composite));
        assert_eq!(FillingFamily::of("V72"), Some(FillingFamily::Amalgam));
        assert_eq!(FillingFamily::of("E13"), None);
    }

    #[test]
    fn filling_codes_by_surface_count() {
        let c = FillingFamily::Composite;
        assert_eq!(c.code_for(1), Some("V91"));
        assert_eq!(c.code_for(3), Some("V93"));
        assert_eq!(c.code_for(4), Some("V94"));
        assert_eq!(c.code_for(6), Some("V94"));
        assert_eq!(c.code_for(0), None);
        assert_eq!(c.code_for(7), None);
        assert_eq!(FillingFamily::Amalgam.code_for(2), Some("V72"));
    }

    #[test]
    fn endo_codes_by_canal_count() {
        assert_eq!(endo_code_for(1), Some("E13"));
        assert_eq!(endo_code_for(2), Some("E14"));
        assert_eq!(endo_code_for(3), Some("E16"));
        assert_eq!(endo_code_for(5), Some("E17"));
        assert_eq!(endo_code_for(0), None);
        assert_eq!(endo_code_for(6), None);
        assert!(is_endodontic("E16"));
        assert!(!is_endodontic("V93"));
    }
}
