//! Normalization callbacks.
//!
//! Name-splitting and line-classification heuristics differ per backend and
//! live outside this crate; the decoder consumes them through these traits.
//! The shipped implementations are deliberately simple: enough for tests
//! and for backends whose labels need no special handling.

use std::collections::HashMap;

use crate::domain::{Line, Product};

/// Splits a raw location name into an optional place and a name.
///
/// Backends encode locality differently ("Berlin, Hbf", "Hbf (Berlin)");
/// the provider layer knows which convention applies.
pub trait NameSplitter {
    /// Split `full_name` into `(place, name)`.
    fn split(&self, full_name: &str) -> (Option<String>, String);
}

/// Classifies a raw line label into a [`Line`] with a product.
pub trait LineResolver {
    /// Build a line from the label as transmitted by the backend.
    fn resolve(&self, label: &str) -> Line;
}

/// A splitter that never splits: the whole string is the name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSplit;

impl NameSplitter for NoSplit {
    fn split(&self, full_name: &str) -> (Option<String>, String) {
        (None, full_name.to_owned())
    }
}

/// A splitter for the common "Place, Name" convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommaSplit;

impl NameSplitter for CommaSplit {
    fn split(&self, full_name: &str) -> (Option<String>, String) {
        match full_name.split_once(',') {
            Some((place, name)) => (Some(place.trim().to_owned()), name.trim().to_owned()),
            None => (None, full_name.to_owned()),
        }
    }
}

/// Line resolver driven by a first-token lookup table.
///
/// "ICE 123" resolves through the "ICE" entry; labels with no matching
/// entry fall back to the configured default product.
#[derive(Debug, Clone)]
pub struct KeywordLineResolver {
    network: Option<String>,
    products: HashMap<String, Product>,
    fallback: Product,
}

impl KeywordLineResolver {
    /// Create a resolver with a fallback product for unmatched labels.
    pub fn new(fallback: Product) -> Self {
        Self {
            network: None,
            products: HashMap::new(),
            fallback,
        }
    }

    /// Set the network name attached to every resolved line.
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Map a label keyword (its first whitespace-separated token) to a product.
    pub fn keyword(mut self, keyword: impl Into<String>, product: Product) -> Self {
        self.products.insert(keyword.into(), product);
        self
    }
}

impl LineResolver for KeywordLineResolver {
    fn resolve(&self, label: &str) -> Line {
        let token = label.split_whitespace().next().unwrap_or(label);
        let product = self.products.get(token).copied().unwrap_or(self.fallback);
        let mut line = Line::new(product, label);
        line.network = self.network.clone();
        line
    }
}
