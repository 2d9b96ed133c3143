//! Canonical product identity.
//!
//! A product's id is its trimmed barcode when one is given, otherwise its
//! lower-cased trimmed name. Barcode-derived and name-derived ids share one
//! namespace, so a product named "111" and barcode "111" land on the same id.

/// Where a canonical id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdOrigin {
    Barcode,
    Name,
}

/// Trimmed barcode, or `None` if absent or blank.
pub fn normalize_barcode(barcode: Option<&str>) -> Option<String> {
    barcode
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
}

/// Compute the canonical id for a product and report which input it came from.
pub fn canonical_product_id(name: &str, barcode: Option<&str>) -> (String, IdOrigin) {
    match normalize_barcode(barcode) {
        Some(code) => (code, IdOrigin::Barcode),
        None => (name.trim().to_lowercase(), IdOrigin::Name),
    }
}

/// Lookup keys for a typed or scanned identifier, in resolution order:
/// the trimmed input, then its lower-cased form when that differs.
/// Empty for blank input.
pub fn lookup_keys(identifier: &str) -> Vec<String> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let mut keys = vec![trimmed.to_string()];
    let lower = trimmed.to_lowercase();
    if lower != trimmed {
        keys.push(lower);
    }
    keys
}
