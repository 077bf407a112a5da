//! Keyword triggers that map clinician shorthand to catalog categories.
//!
//! One table, one row per [`Category`]. Matching is a case-insensitive
//! substring test, so triggers are stored lowercase and kept short enough to
//! catch inflections (`chirurg` matches `chirurgisch` and `chirurgie`).

use tandcode_core::Category;

/// Category → trigger keywords and abbreviations.
pub const TRIGGERS: &[(Category, &[&str])] = &[
    (
        Category::Consultation,
        &["controle", "consult", "onderzoek", "intake", "pijnklacht", "check"],
    ),
    (
        Category::Prevention,
        &[
            "gebitsreiniging",
            "reiniging",
            "tandsteen",
            "scaling",
            "fluor",
            "polijst",
            "sealant",
        ],
    ),
    (
        Category::Fillings,
        &[
            "comp",
            "vulling",
            "amalgaam",
            "amal",
            "glasionomeer",
            "vlak",
            "restauratie",
        ],
    ),
    (
        Category::Endodontics,
        &["wkb", "wortelkanaal", "endo", "kanalen", "pulp", "trepanatie"],
    ),
    (
        Category::Extraction,
        &["extractie", "extraheren", "trekken", "getrokken"],
    ),
    (
        Category::CrownBridge,
        &["kroon", "kronen", "brug", "crown", "bridge", "inlay", "onlay", "facing"],
    ),
    (
        Category::Prosthetics,
        &["prothese", "kunstgebit", "klikgebit", "rebasing"],
    ),
    (
        Category::Anesthesia,
        &[
            "verdoving",
            "verdoofd",
            "anesth",
            "anaesth",
            "infiltratie",
            "geleiding",
            "oppervlakte",
        ],
    ),
    (
        Category::Radiography,
        &[
            "foto",
            "röntgen",
            "rontgen",
            "x-ray",
            "opg",
            "bitewing",
            "kaakoverzicht",
        ],
    ),
    (
        Category::Surgery,
        &[
            "chirurg",
            "flap",
            "hecht",
            "osteotomie",
            "apexresectie",
            "wortelpunt",
            "implant",
            "incisie",
        ],
    ),
];

/// Categories always included, whatever the text says.
pub const ALWAYS_INCLUDED: &[Category] = &[Category::Consultation];

/// A selection no larger than this carries only forced categories, so the
/// classifier widens to every category instead.
pub const FORCED_ONLY_THRESHOLD: usize = ALWAYS_INCLUDED.len();

/// Triggers for a single category (empty if the category has no row).
pub fn triggers_for(category: Category) -> &'static [&'static str] {
    TRIGGERS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, t)| *t)
        .unwrap_or(&[])
}
