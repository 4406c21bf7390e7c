//! Extraction of application codes from network group names.
//!
//! An application code is a run of exactly four uppercase ASCII letters
//! enclosed in underscores, e.g. `SSSS` in `APF2_QASD1_SSSS_CASD1_`. A
//! delimiting underscore may be shared by two neighbouring codes, so
//! `_ABCD_EFGH_` contains both `ABCD` and `EFGH`.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([A-Z]{4})_").expect("static pattern is valid"));

/// Extracts the distinct application codes found in the given group names.
///
/// The result is sorted and free of duplicates. Digits and lowercase letters
/// never form part of a code.
///
/// ```
/// use rolematrix::extract_codes;
///
/// let codes = extract_codes(["APF2_QASD1_SSSS_CASD1_", "_ABCD_EFGH_"]);
/// assert_eq!(
///     codes.into_iter().collect::<Vec<_>>(),
///     vec!["ABCD", "EFGH", "SSSS"]
/// );
/// ```
pub fn extract_codes<I, S>(groups: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut codes = BTreeSet::new();
    for group in groups {
        codes.extend(codes_in(group.as_ref()).map(str::to_string));
    }
    codes
}

/// Iterates the codes in a single group name, left to right.
fn codes_in(group: &str) -> impl Iterator<Item = &str> {
    let mut start = 0;
    std::iter::from_fn(move || {
        let captures = CODE_PATTERN.captures_at(group, start)?;
        let whole = captures.get(0)?;
        // resume on the closing underscore so it can open the next code
        start = whole.end() - 1;
        captures.get(1).map(|code| code.as_str())
    })
}
