//! Identifier Allocator
//!
//! Produces non-colliding table names within a section. Two schemes:
//! numeric (bare `"7"` or reserved-prefix `"ROOM7"`) for bulk creation,
//! and single-letter suffixes (`"7 A"`, `"7 B"`, …) for split subtables.

use std::collections::HashSet;

use super::error::{SeatingError, SeatingResult};

/// Section name (compared case-insensitively) that switches bulk creation
/// to the reserved prefix
pub const ROOM_SECTION_TRIGGER: &str = "room section";

/// Prefix applied to table numbers in the trigger section
pub const ROOM_PREFIX: &str = "ROOM";

/// First run of digits embedded in a name, if any.
/// `"ROOM12"` → 12, `"7 A"` → 7, `"Patio"` → none.
fn numeric_part(name: &str) -> Option<u64> {
    let digits: String = name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Request-local working set for one create batch.
///
/// Seeded once from the section's current names; every allocated name joins
/// the set, so a single batch never collides with itself. Two concurrent
/// batches against the same section must be serialized by the caller.
pub struct NameAllocator {
    existing: HashSet<String>,
    next: u64,
    prefixed: bool,
}

impl NameAllocator {
    /// Seed from a section's current top-level table names.
    pub fn for_section<I, S>(section_name: &str, existing_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let existing: HashSet<String> = existing_names.into_iter().map(Into::into).collect();
        let max = existing.iter().filter_map(|n| numeric_part(n)).max().unwrap_or(0);
        Self {
            existing,
            next: max + 1,
            prefixed: section_name.eq_ignore_ascii_case(ROOM_SECTION_TRIGGER),
        }
    }

    /// Allocate the next free name and add it to the working set.
    ///
    /// The collision retry walks bare numerics only; the reserved prefix is
    /// not re-applied on that path.
    pub fn next_name(&mut self) -> String {
        let mut candidate = if self.prefixed {
            format!("{ROOM_PREFIX}{}", self.next)
        } else {
            self.next.to_string()
        };
        self.next += 1;

        while self.existing.contains(&candidate) {
            candidate = self.next.to_string();
            self.next += 1;
        }

        self.existing.insert(candidate.clone());
        candidate
    }
}

/// Single-letter suffix parsed from a subtable name: `"12 B"` → `'B'`.
/// The suffix is the second whitespace-separated token when it is one
/// uppercase ASCII letter.
fn suffix_letter(name: &str) -> Option<char> {
    let token = name.split_whitespace().nth(1)?;
    let mut chars = token.chars();
    let c = chars.next()?;
    if chars.next().is_none() && c.is_ascii_uppercase() {
        Some(c)
    } else {
        None
    }
}

/// Next suffix letter after the given sibling names, `'A'` when none exist.
///
/// Suffixes stop at `'Z'`; a table cannot accumulate more than 26 subtables.
pub fn next_suffix<'a, I>(sibling_names: I) -> SeatingResult<char>
where
    I: IntoIterator<Item = &'a str>,
{
    match sibling_names.into_iter().filter_map(suffix_letter).max() {
        None => Ok('A'),
        Some('Z') => Err(SeatingError::Validation(
            "Subtable suffixes are exhausted past 'Z'".to_string(),
        )),
        Some(c) => Ok((c as u8 + 1) as char),
    }
}

/// Compose a subtable name from its parent's name and a suffix letter.
pub fn subtable_name(base: &str, suffix: char) -> String {
    format!("{base} {suffix}")
}
