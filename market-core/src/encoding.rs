/// Percent-encode every byte outside the URL unreserved set
/// (`A-Z a-z 0-9 - _ . ~`).
///
/// The output never contains `/`, so it is safe both as a single URL path
/// segment and as a file name.
pub fn percent_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}
