//! Starting-position heuristic for the known-plaintext attack.

use crate::helpers::distinct_count;

/// Picks the text index the cracker should grow from.
///
/// A window of `window_size` characters slides over both texts; the offset
/// minimizing the combined count of distinct symbols wins (first strict
/// minimum), and the middle of that window is returned. Few distinct symbols
/// around the anchor means the early deductions cascade instead of
/// branching, which keeps the search tree small where it is widest.
///
/// # Example
///
/// ```
/// use chaocipher_rs::find_anchor;
///
/// let anchor = find_anchor(b"aaaabcdefgh", b"xyzwvutsrqp", 4).unwrap();
/// assert_eq!(anchor, 2);
/// ```
///
pub fn find_anchor(plaintext: &[u8], cryptext: &[u8], window_size: usize) -> Result<usize, String> {
    if plaintext.len() != cryptext.len() {
        return Err("texts must have equal length".to_string());
    }
    if window_size == 0 {
        return Err("window size must not be zero".to_string());
    }
    if window_size > plaintext.len() {
        return Err("window size larger than the text".to_string());
    }

    let mut best_index = 0;
    let mut best_size = 2 * crate::ALPHABET.len();
    for i in 0..plaintext.len() - window_size {
        let size = distinct_count(&plaintext[i..i + window_size])
            + distinct_count(&cryptext[i..i + window_size]);
        if size < best_size {
            best_size = size;
            best_index = i + window_size / 2;
        }
    }
    Ok(best_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(b"aaaabcdefgh", b"xyzwvutsrqp", 4, 2)]
    #[case(b"abcdefghaaaa", b"abcdefghijkl", 4, 9)]
    #[case(b"abcdef", b"ghijkl", 6, 0)]
    fn test_find_anchor(
        #[case] pt: &[u8],
        #[case] ct: &[u8],
        #[case] window: usize,
        #[case] expected: usize,
    ) {
        assert_eq!(find_anchor(pt, ct, window).unwrap(), expected);
    }

    #[test]
    fn test_find_anchor_prefers_first_minimum() {
        // two equally repetitive windows, the earlier one wins
        let pt = b"aaaaxyzwaaaa";
        let ct = b"bbbbqrstbbbb";
        assert_eq!(find_anchor(pt, ct, 4).unwrap(), 2);
    }

    #[rstest]
    #[case(b"abc", b"ab", 2)]
    #[case(b"abc", b"abc", 0)]
    #[case(b"abc", b"abc", 4)]
    fn test_find_anchor_rejects_bad_input(#[case] pt: &[u8], #[case] ct: &[u8], #[case] window: usize) {
        assert!(find_anchor(pt, ct, window).is_err());
    }
}
