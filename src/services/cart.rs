use crate::models::CartItem;

/// Parse the uploaded cart manifest.
///
/// Bytes that are not valid UTF-8 are replaced before JSON parsing. Anything
/// other than a JSON array of objects is an error.
pub fn parse_manifest(bytes: &[u8]) -> Result<Vec<CartItem>, serde_json::Error> {
    let text = String::from_utf8_lossy(bytes);
    serde_json::from_str(&text)
}
