//! Placeholder identifier sentinel

use uuid::Uuid;

/// Generate a placeholder identifier for a record awaiting verification
///
/// The first four bytes are zeroed so the sentinel is recognizable; real
/// name-based identifiers never carry that prefix in practice. The rest of
/// the UUID is derived from the class and ordinal so placeholders within a
/// chunk stay distinct.
pub fn placeholder_id(class: &str, ordinal: usize) -> Uuid {
    let base = Uuid::new_v5(
        &Uuid::nil(),
        format!("placeholder|{class}|{ordinal}").as_bytes(),
    );
    let mut bytes = *base.as_bytes();
    bytes[..4].copy_from_slice(&[0u8; 4]);
    Uuid::from_bytes(bytes)
}

/// Whether an identifier matches the placeholder sentinel pattern
pub fn is_placeholder(id: &Uuid) -> bool {
    id.as_bytes()[..4] == [0u8; 4]
}
