//! Screening of candidate passwords against a set of already used ones.

use crate::set_membership::SetMembership;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Outcome of screening one password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Empty password; never looked up nor recorded.
    Invalid,
    /// Already used, or a false positive of the filter.
    Duplicate,
    /// Not seen before; it is now recorded.
    Unique,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Invalid => "invalid",
            Status::Duplicate => "duplicate",
            Status::Unique => "unique",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn screen<F: SetMembership + ?Sized>(filter: &mut F, password: &str) -> Status {
    if password.is_empty() {
        Status::Invalid
    } else if filter.contains(password) {
        Status::Duplicate
    } else {
        filter.insert(password);
        Status::Unique
    }
}

/// Screens `passwords` in order, recording every unique one in `filter`.
///
/// Returns one entry per input, so a password repeated within the batch is
/// reported `unique` and then `duplicate`.
pub fn classify<F, I, S>(filter: &mut F, passwords: I) -> Vec<(String, Status)>
where
    F: SetMembership + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    passwords
        .into_iter()
        .map(|password| {
            let password = password.as_ref();
            (password.to_owned(), screen(filter, password))
        })
        .collect()
}

/// Like [`classify`], but keyed by password: each distinct password appears
/// once, at the position of its first occurrence, with the status of its last
/// occurrence.
pub fn classify_keyed<F, I, S>(filter: &mut F, passwords: I) -> Vec<(String, Status)>
where
    F: SetMembership + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut results: Vec<(String, Status)> = Vec::new();

    for password in passwords {
        let password = password.as_ref();
        let status = screen(filter, password);
        match slots.get(password) {
            Some(&slot) => results[slot].1 = status,
            None => {
                slots.insert(password.to_owned(), results.len());
                results.push((password.to_owned(), status));
            }
        }
    }
    results
}
