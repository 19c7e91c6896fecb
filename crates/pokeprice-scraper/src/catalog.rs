//! Fixed vocabularies shared by the extraction stages.
//!
//! Both tables are ordered: earlier entries win over later ones.

use std::sync::LazyLock;

use pokeprice_core::Grade;
use regex::Regex;

/// How a matching grade rule produces its grade.
#[derive(Debug, Clone, Copy)]
pub enum GradeRule {
    /// The label always maps to this grade.
    Fixed(Grade),
    /// Capture group 1 holds a value like `10`, `9.5`, or `7`.
    Numeric,
}

/// Grade rules in priority order. Patterns run against lowercased,
/// whitespace-collapsed labels.
pub static GRADE_RULES: LazyLock<Vec<(Regex, GradeRule)>> = LazyLock::new(|| {
    [
        (r"\b(?:ungraded|unrated|raw)\b", GradeRule::Fixed(Grade::UNGRADED)),
        (
            r"\b(?:bgs 10 black(?: label)?|sgc 10|cgc 10 pristine|pristine 10)\b",
            GradeRule::Fixed(Grade::GEM_MINT),
        ),
        (
            r"\b(?:grade|psa|sgc|cgc|bgs) ?(10|[1-9](?:\.5)?)\b",
            GradeRule::Numeric,
        ),
    ]
    .into_iter()
    .map(|(pattern, rule)| (Regex::new(pattern).expect("valid grade rule regex"), rule))
    .collect()
});

/// Matches every grade label the price-window extractor looks for in raw
/// markup. Longer alternatives come first so `BGS 10 Black Label` is not
/// split into a shorter label.
pub static GRADE_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:ungraded|unrated|raw|bgs\s*10\s*black(?:\s*label)?|cgc\s*10\s*pristine|pristine\s*10|(?:grade|psa|sgc|cgc|bgs)\s*(?:10|[1-9](?:\.5)?))\b",
    )
    .expect("valid grade label regex")
});

/// Known expansion names as `(lowercase needle, display name)`.
///
/// Specific names precede the names they contain (`base set 2` before
/// `base set`, `team rocket returns` before `team rocket`).
pub static SET_CATALOG: &[(&str, &str)] = &[
    ("base set 2", "Base Set 2"),
    ("base set", "Base Set"),
    ("jungle", "Jungle"),
    ("fossil", "Fossil"),
    ("team rocket returns", "Team Rocket Returns"),
    ("team rocket", "Team Rocket"),
    ("gym heroes", "Gym Heroes"),
    ("gym challenge", "Gym Challenge"),
    ("neo genesis", "Neo Genesis"),
    ("neo discovery", "Neo Discovery"),
    ("neo revelation", "Neo Revelation"),
    ("neo destiny", "Neo Destiny"),
    ("legendary collection", "Legendary Collection"),
    ("expedition", "Expedition"),
    ("aquapolis", "Aquapolis"),
    ("skyridge", "Skyridge"),
    ("ex dragon frontiers", "EX Dragon Frontiers"),
    ("ex deoxys", "EX Deoxys"),
    ("ex emerald", "EX Emerald"),
    ("ex hidden legends", "EX Hidden Legends"),
    ("ex fire red & leaf green", "EX FireRed & LeafGreen"),
    ("ex ruby & sapphire", "EX Ruby & Sapphire"),
    ("diamond & pearl", "Diamond & Pearl"),
    ("heartgold & soulsilver", "HeartGold & SoulSilver"),
    ("call of legends", "Call of Legends"),
    ("black & white", "Black & White"),
    ("legendary treasures", "Legendary Treasures"),
    ("xy evolutions", "XY Evolutions"),
    ("evolutions", "Evolutions"),
    ("generations", "Generations"),
    ("sun & moon", "Sun & Moon"),
    ("hidden fates", "Hidden Fates"),
    ("cosmic eclipse", "Cosmic Eclipse"),
    ("team up", "Team Up"),
    ("champion's path", "Champion's Path"),
    ("shining fates", "Shining Fates"),
    ("vivid voltage", "Vivid Voltage"),
    ("battle styles", "Battle Styles"),
    ("chilling reign", "Chilling Reign"),
    ("evolving skies", "Evolving Skies"),
    ("fusion strike", "Fusion Strike"),
    ("celebrations", "Celebrations"),
    ("brilliant stars", "Brilliant Stars"),
    ("astral radiance", "Astral Radiance"),
    ("pokemon go", "Pokemon GO"),
    ("lost origin", "Lost Origin"),
    ("silver tempest", "Silver Tempest"),
    ("crown zenith", "Crown Zenith"),
    ("sword & shield", "Sword & Shield"),
    ("paldea evolved", "Paldea Evolved"),
    ("obsidian flames", "Obsidian Flames"),
    ("scarlet & violet 151", "Scarlet & Violet 151"),
    ("pokemon 151", "Scarlet & Violet 151"),
    ("paradox rift", "Paradox Rift"),
    ("paldean fates", "Paldean Fates"),
    ("temporal forces", "Temporal Forces"),
    ("twilight masquerade", "Twilight Masquerade"),
    ("shrouded fable", "Shrouded Fable"),
    ("stellar crown", "Stellar Crown"),
    ("surging sparks", "Surging Sparks"),
    ("prismatic evolutions", "Prismatic Evolutions"),
    ("journey together", "Journey Together"),
    ("destined rivals", "Destined Rivals"),
    ("scarlet & violet", "Scarlet & Violet"),
    ("black star promo", "Black Star Promo"),
    ("promo", "Promo"),
];
