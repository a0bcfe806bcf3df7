//! Fixed-width base62 codec used for generated short codes.

/// The base62 alphabet, in ascending digit order.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Number of symbols in [`ALPHABET`].
pub const BASE: u64 = 62;

/// Returns `true` if `c` is a base62 digit.
pub fn is_base62(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// Returns the number of distinct codes of the given width, or `None` if it
/// does not fit in a `u64`.
pub fn space(width: usize) -> Option<u64> {
    let width = u32::try_from(width).ok()?;
    BASE.checked_pow(width)
}

/// Encodes `value` as base62, left-padded with `'0'` to exactly `width`
/// characters.
///
/// Values that need more than `width` digits are reduced modulo `62^width`,
/// so the output length is always `width`.
pub fn encode_fixed(mut value: u64, width: usize) -> String {
    let mut digits = vec![ALPHABET[0]; width];
    for slot in digits.iter_mut().rev() {
        *slot = ALPHABET[(value % BASE) as usize];
        value /= BASE;
    }
    // every byte comes from ALPHABET
    digits.into_iter().map(char::from).collect()
}

/// Decodes a base62 string. Returns `None` on a non-base62 character or
/// overflow.
pub fn decode(input: &str) -> Option<u64> {
    input.bytes().try_fold(0_u64, |acc, byte| {
        let digit = match byte {
            b'0'..=b'9' => byte - b'0',
            b'A'..=b'Z' => byte - b'A' + 10,
            b'a'..=b'z' => byte - b'a' + 36,
            _ => return None,
        };
        acc.checked_mul(BASE)?.checked_add(u64::from(digit))
    })
}
