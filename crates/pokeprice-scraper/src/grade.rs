//! Grade-label normalization onto the PSA scale.

use pokeprice_core::Grade;
use regex::Regex;

use crate::catalog::{GradeRule, GRADE_RULES};

/// Maps a free-text grading label to a canonical grade using the default
/// rule table.
///
/// Half grades below 10 round down (`Grade 9.5` is `PSA9`). Labels that no
/// rule recognizes return `None` and contribute no price point.
#[must_use]
pub fn normalize_grade(label: &str) -> Option<Grade> {
    normalize_grade_with(label, &GRADE_RULES)
}

/// Same as [`normalize_grade`] with a caller-supplied rule table.
#[must_use]
pub fn normalize_grade_with(label: &str, rules: &[(Regex, GradeRule)]) -> Option<Grade> {
    let normalized = label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    rules.iter().find_map(|(re, rule)| {
        let caps = re.captures(&normalized)?;
        match rule {
            GradeRule::Fixed(grade) => Some(*grade),
            GradeRule::Numeric => caps.get(1).and_then(|m| numeric_grade(m.as_str())),
        }
    })
}

fn numeric_grade(value: &str) -> Option<Grade> {
    let whole = value.split('.').next()?;
    whole.parse::<u8>().ok().and_then(Grade::new)
}
