//! crates/hronir_core/src/ids.rs
//! Deterministic identity and content hashing.
//!
//! All identifiers are pure functions of their inputs: no salts, no time, no
//! randomness. Re-encoding the same logical value always yields bit-identical
//! bytes.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Normalize hrönir text: require valid UTF-8 (already guaranteed
/// by `&str`), trim trailing whitespace, then ensure exactly one trailing
/// newline.
pub fn normalize_text(text: &str) -> String {
    let trimmed = text.trim_end();
    let mut out = String::with_capacity(trimmed.len() + 1);
    out.push_str(trimmed);
    out.push('\n');
    out
}

/// `hronir_id(text) -> UUID` — UUID5 of the normalized text bytes, over the
/// DNS namespace.
pub fn hronir_id(text: &str) -> Uuid {
    let normalized = normalize_text(text);
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, normalized.as_bytes())
}

/// `path_id(position, predecessor, current) -> UUID` — UUID5 of the canonical
/// string form `"{position}:{predecessor or ''}:{current}"`. `predecessor`
/// is rendered as the empty string exactly when it is the nil UUID (the
/// position-0 sentinel); at any other position a nil predecessor is an error
/// the caller (graph invariants) must reject before deriving an id from it.
pub fn path_id(position: u64, predecessor: Uuid, current: Uuid) -> Uuid {
    let pred_str = if predecessor.is_nil() {
        String::new()
    } else {
        predecessor.to_string()
    };
    let canonical = format!("{position}:{pred_str}:{current}");
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, canonical.as_bytes())
}

/// `mandate_id(path_uuid, prev_tx_hash) -> [u8; 16]` — BLAKE3 of
/// `path_uuid ∥ prev_tx_hash`, truncated to 16 bytes.
pub fn mandate_id(path_uuid: Uuid, prev_tx_hash: &[u8]) -> [u8; 16] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(path_uuid.as_bytes());
    hasher.update(prev_tx_hash);
    let full = hasher.finalize();
    let mut out = [0u8; 16];
    out.copy_from_slice(&full.as_bytes()[..16]);
    out
}

/// Lowercase-hex encode a digest (for storage/display).
pub fn hex_encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode lowercase hex back into bytes; returns `None` on malformed input.
pub fn hex_decode(s: &str) -> Option<Vec<u8>> {
    hex::decode(s).ok()
}

/// The 32-byte zero sentinel used as `prev_tx_hash` of the genesis transaction.
pub const ZERO_HASH: [u8; 32] = [0u8; 32];

/// `tx_content_hash(tx) -> bytes` — SHA-256 of the canonical JSON encoding of
/// `bytes` (caller supplies the already-canonicalized, content-hash-excluded
/// encoding; see `canonical_json::to_canonical_bytes`).
pub fn sha256_of_canonical_bytes(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&out);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_adds_single_newline() {
        assert_eq!(normalize_text("alpha"), "alpha\n");
        assert_eq!(normalize_text("alpha\n"), "alpha\n");
        assert_eq!(normalize_text("alpha\n\n\n"), "alpha\n");
        assert_eq!(normalize_text("alpha   \n  "), "alpha\n");
    }

    #[test]
    fn hronir_id_is_pure_function_of_content() {
        let a = hronir_id("alpha\n");
        let b = hronir_id("alpha");
        let c = hronir_id("alpha\n\n");
        assert_eq!(a, b);
        assert_eq!(a, c);

        let d = hronir_id("beta\n");
        assert_ne!(a, d);
    }

    #[test]
    fn path_id_position_zero_uses_empty_predecessor_string() {
        let current = hronir_id("alpha\n");
        let p1 = path_id(0, Uuid::nil(), current);
        // Same derivation done by hand must match.
        let canonical = format!("0::{current}");
        let expected = Uuid::new_v5(&Uuid::NAMESPACE_DNS, canonical.as_bytes());
        assert_eq!(p1, expected);
    }

    #[test]
    fn path_id_distinguishes_position_and_predecessor() {
        let h1 = hronir_id("alpha\n");
        let h2 = hronir_id("beta\n");
        let p_a = path_id(1, h1, h2);
        let p_b = path_id(2, h1, h2);
        let p_c = path_id(1, h2, h1);
        assert_ne!(p_a, p_b);
        assert_ne!(p_a, p_c);
    }

    #[test]
    fn mandate_id_is_16_bytes_and_depends_on_both_inputs() {
        let path = hronir_id("p\n");
        let m1 = mandate_id(path, &ZERO_HASH);
        let m2 = mandate_id(path, &[1u8; 32]);
        assert_eq!(m1.len(), 16);
        assert_ne!(m1, m2);
    }

    #[test]
    fn sha256_of_canonical_bytes_is_deterministic() {
        let a = sha256_of_canonical_bytes(b"{\"a\":1}");
        let b = sha256_of_canonical_bytes(b"{\"a\":1}");
        assert_eq!(a, b);
        let c = sha256_of_canonical_bytes(b"{\"a\":2}");
        assert_ne!(a, c);
    }
}
