//! Crash signatures and the insertion-ordered sets that hold them.
//!
//! A bug's `cf_crash_signature` field stores one or more entries of the form
//! `[@ signature]`, usually one per line. Signatures are opaque: identity is
//! exact text equality and the only property the planner cares about is
//! [`signature_len`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Length of a signature in characters, as counted against the batch budget.
#[must_use]
pub fn signature_len(signature: &str) -> usize {
    signature.chars().count()
}

/// Split a raw crash-signature field into its distinct signatures.
///
/// Entries are separated by `[@`. Each entry is cut at its last `]`; an entry
/// without a closing bracket is kept whole. Blank entries are skipped.
#[must_use]
pub fn parse_signature_field(raw: &str) -> SignatureSet {
    let mut signatures = SignatureSet::new();
    for piece in raw.split("[@") {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let signature = piece.rfind(']').map_or(piece, |end| &piece[..end]).trim();
        if !signature.is_empty() {
            signatures.insert(signature);
        }
    }
    signatures
}

/// A set of signatures that remembers insertion order.
///
/// Iteration order is the order in which signatures were first inserted, so
/// anything derived from it (batch assignment in particular) is reproducible
/// for the same input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SignatureSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl SignatureSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a signature. Returns `false` if it was already present.
    pub fn insert(&mut self, signature: impl Into<String>) -> bool {
        let signature = signature.into();
        if self.members.contains(&signature) {
            return false;
        }
        self.members.insert(signature.clone());
        self.order.push(signature);
        true
    }

    /// Remove a signature. Returns `false` if it was not present.
    pub fn remove(&mut self, signature: &str) -> bool {
        if !self.members.remove(signature) {
            return false;
        }
        self.order.retain(|s| s != signature);
        true
    }

    #[must_use]
    pub fn contains(&self, signature: &str) -> bool {
        self.members.contains(signature)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Signatures in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Whether every member of `self` is also in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.order.iter().all(|s| other.contains(s))
    }

    /// Add every member of `other` not already present, keeping `other`'s order.
    pub fn extend_from(&mut self, other: &Self) {
        for signature in other.iter() {
            self.insert(signature);
        }
    }
}

impl From<Vec<String>> for SignatureSet {
    fn from(signatures: Vec<String>) -> Self {
        signatures.into_iter().collect()
    }
}

impl From<SignatureSet> for Vec<String> {
    fn from(set: SignatureSet) -> Self {
        set.order
    }
}

impl<S: Into<String>> FromIterator<S> for SignatureSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for signature in iter {
            set.insert(signature);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SignatureSet {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

    fn into_iter(self) -> Self::IntoIter {
        let as_str: fn(&'a String) -> &'a str = String::as_str;
        self.order.iter().map(as_str)
    }
}
