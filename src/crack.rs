//! Known-plaintext attack on the Chaocipher.
//!
//! Given a plaintext and its encryption, the two starting alphabets can be
//! recovered even though only two slots are pinned down by the first observed
//! pair. Every further character either *forces* a slot on one rotor (when
//! the other rotor already carries its counterpart) or *offers a choice* of
//! where a fresh pair may sit. The attack is therefore a depth-first
//! backtracking search interleaved with forced deductions: starting from an
//! anchor position it widens a window over the text pair in both directions,
//! filling slots whenever they are forced, branching over the open slot
//! pairs when they are not, and abandoning a branch as soon as a forced fill
//! contradicts the rotor contents.
//!
//! Deep but narrow: branches die quickly through contradictions, so in
//! practice a few dozen characters of paired text pin down both alphabets.
//!
//! # Example
//!
//! ```
//! use chaocipher_rs::{crack, find_anchor, RotorState, ALPHABET};
//!
//! let plaintext = b"allgoodqquickbrownfoxesjumpoverlazydogtosavetheirpar";
//! let mut rotor = RotorState::from_alphabets(ALPHABET, ALPHABET).unwrap();
//! let cryptext = rotor.encode(plaintext, false).unwrap();
//!
//! let anchor = find_anchor(plaintext, &cryptext, 6).unwrap();
//! let recovered = crack(plaintext, &cryptext, anchor).unwrap();
//! assert!(recovered.is_some());
//! ```
//!
use crate::rotor::{RotorState, ZENITH};

/// Window of text positions whose character pairs are already committed to
/// the rotors. Half-open, `start <= anchor < end`, grows outward only.
#[derive(Clone, Copy, Debug)]
struct SearchRange {
    start: usize,
    end: usize,
}

/// Recovers the rotor pair behind a plaintext/ciphertext pair.
///
/// Both texts must have the same length and consist of the 26 lowercase
/// letters only; `anchor` is the text index the search grows from (see
/// [`crate::find_anchor`]). Invalid input is an `Err`; an exhausted search
/// is `Ok(None)`.
///
/// On success the returned state sits somewhere inside the text. Rewind it
/// to index 0 and re-encode to verify it, or to read off the starting
/// alphabets:
///
/// ```no_run
/// use chaocipher_rs::crack;
///
/// # let (plaintext, cryptext): (Vec<u8>, Vec<u8>) = (vec![], vec![]);
/// if let Some(mut state) = crack(&plaintext, &cryptext, 26).unwrap() {
///     state.rewind(&plaintext, false).unwrap();
///     println!("plain:  {}", state.plain_alphabet());
///     println!("cipher: {}", state.cipher_alphabet());
/// }
/// ```
///
/// The search may also cover the whole text before both rotors are complete;
/// the partial state is still returned, and still re-encodes the plaintext
/// to the ciphertext over the covered range.
pub fn crack(plaintext: &[u8], cryptext: &[u8], anchor: usize) -> Result<Option<RotorState>, String> {
    if plaintext.len() != cryptext.len() {
        return Err("texts must have equal length".to_string());
    }
    if plaintext.is_empty() {
        return Err("texts must not be empty".to_string());
    }
    for text in [plaintext, cryptext] {
        if let Some(&ch) = text.iter().find(|&&ch| !ch.is_ascii_lowercase()) {
            return Err(format!("'{}' not in the working alphabet", ch as char));
        }
    }
    if anchor >= plaintext.len() {
        return Err("anchor out of range".to_string());
    }

    let state = RotorState::anchored(plaintext[anchor], cryptext[anchor], anchor);
    let range = SearchRange { start: anchor, end: anchor + 1 };
    Ok(dfs(plaintext, cryptext, state, range))
}

/// The depth-first search body. Runs forced fills to fixpoint, checks the
/// two termination conditions, then extends the window one position in the
/// chosen direction, trying every open slot pair in ascending order.
fn dfs(
    plaintext: &[u8],
    cryptext: &[u8],
    mut state: RotorState,
    mut range: SearchRange,
) -> Option<RotorState> {
    while deducible(plaintext, cryptext, &state, &range) {
        if fill_pass(plaintext, cryptext, &mut state, &mut range).is_err() {
            return None;
        }
    }
    if state.is_complete() {
        return Some(state);
    }
    if range.start == 0 && range.end == plaintext.len() {
        return Some(state);
    }

    let traverse_position = decide_direction(plaintext, cryptext, &state, &range);
    let backwards = traverse_position == range.start;
    let search_position = if backwards { traverse_position - 1 } else { traverse_position };
    if state.traverse_to(plaintext, traverse_position, false).is_err() {
        return None;
    }

    for (ci, pi) in open_positions(&state, backwards) {
        let mut branch = state.clone();
        branch.cipher[ci] = Some(cryptext[search_position]);
        branch.cipher_seen.insert(cryptext[search_position]);
        branch.plain[pi] = Some(plaintext[search_position]);
        branch.plain_seen.insert(plaintext[search_position]);
        if let Some(found) = dfs(plaintext, cryptext, branch, range) {
            return Some(found);
        }
    }
    None
}

/// True while a character just outside the window is already on its rotor,
/// i.e. the slot for its counterpart on the other rotor is forced.
fn deducible(plaintext: &[u8], cryptext: &[u8], state: &RotorState, range: &SearchRange) -> bool {
    if range.end != plaintext.len()
        && (state.plain_seen.contains(plaintext[range.end])
            || state.cipher_seen.contains(cryptext[range.end]))
    {
        return true;
    }
    if range.start != 0
        && (state.plain_seen.contains(plaintext[range.start - 1])
            || state.cipher_seen.contains(cryptext[range.start - 1]))
    {
        return true;
    }
    false
}

/// One pass over the four boundary deductions: cipher then plain on the
/// right boundary, cipher then plain on the left. Each fill that fires
/// widens the window, so a pass can cascade; the caller loops until
/// [`deducible`] goes quiet. `Err` is a contradiction.
fn fill_pass(
    plaintext: &[u8],
    cryptext: &[u8],
    state: &mut RotorState,
    range: &mut SearchRange,
) -> Result<(), ()> {
    for (fill_cipher, forward) in [(true, true), (false, true), (true, false), (false, false)] {
        try_fill(plaintext, cryptext, state, range, fill_cipher, forward)?;
    }
    Ok(())
}

/// Applies one boundary deduction if its precondition holds.
///
/// A fill is forced when the boundary character of one text is already on
/// its rotor: traversing past the boundary (driven by that text) brings the
/// slot for the *other* text's character to a fixed position, which must be
/// free or already hold that character, and the character must not sit
/// elsewhere on the rotor. Anything else is a contradiction.
fn try_fill(
    plaintext: &[u8],
    cryptext: &[u8],
    state: &mut RotorState,
    range: &mut SearchRange,
    fill_cipher: bool,
    forward: bool,
) -> Result<(), ()> {
    if forward && range.end == plaintext.len() {
        return Ok(());
    }
    if !forward && range.start == 0 {
        return Ok(());
    }

    let boundary = if forward { range.end } else { range.start - 1 };
    let known = if fill_cipher {
        state.plain_seen.contains(plaintext[boundary])
    } else {
        state.cipher_seen.contains(cryptext[boundary])
    };
    if !known {
        return Ok(());
    }

    let target = if forward { range.end + 1 } else { range.start - 1 };
    let (ref_text, use_cipher) = if fill_cipher {
        (plaintext, false)
    } else {
        (cryptext, true)
    };
    if state.traverse_to(ref_text, target, use_cipher).is_err() {
        return Err(());
    }

    // Forward plain fills land in the last slot; everything else lands at
    // the zenith (the reverse step leaves both write slots there).
    let fill_ch = if fill_cipher { cryptext[boundary] } else { plaintext[boundary] };
    let slot = if fill_cipher || !forward { ZENITH } else { state.width() - 1 };

    let (rotor, seen) = if fill_cipher {
        (&mut state.cipher, &mut state.cipher_seen)
    } else {
        (&mut state.plain, &mut state.plain_seen)
    };
    match rotor[slot] {
        Some(cur) if cur == fill_ch => {}
        Some(_) => return Err(()),
        None if seen.contains(fill_ch) => return Err(()),
        None => {}
    }
    rotor[slot] = Some(fill_ch);
    seen.insert(fill_ch);

    if forward {
        range.end += 1;
    } else {
        range.start -= 1;
    }
    Ok(())
}

/// Picks the text position to extend toward, as the traversal target: the
/// right boundary (`range.end`) or the left one (`range.start`).
///
/// The window is extended toward the side whose next-but-one pair is
/// already fully known on both rotors, since the extension there will
/// cascade without branching. A first candidate that misses on either side
/// immediately yields the opposite side; at the ends of the text the only
/// possible direction wins.
fn decide_direction(
    plaintext: &[u8],
    cryptext: &[u8],
    state: &RotorState,
    range: &SearchRange,
) -> usize {
    let len = plaintext.len();
    if range.start == 0 {
        return range.end;
    }
    if range.end == len {
        return range.start;
    }

    let pair_known = |i: usize| {
        state.plain_seen.contains(plaintext[i]) && state.cipher_seen.contains(cryptext[i])
    };

    let mut forward = 1;
    while range.end + forward < len && !pair_known(range.end + forward) {
        forward += 1;
        if range.end + forward < len {
            return range.start;
        }
    }
    let mut backward = 1;
    while range.start > backward && !pair_known(range.start - backward) {
        backward += 1;
        if range.start > backward {
            return range.end;
        }
    }
    if forward <= backward { range.end } else { range.start }
}

/// Open slot pairs for committing the next character pair, in ascending
/// cipher-slot order. Forward extensions pair equal indices; reverse
/// extensions pair the plain slot one below, matching where the reverse
/// step leaves the zenith of each rotor.
fn open_positions(state: &RotorState, backwards: bool) -> Vec<(usize, usize)> {
    let n = state.width();
    (0..n)
        .filter_map(|i| {
            let pi = if backwards { (i + n - 1) % n } else { i };
            (state.cipher[i].is_none() && state.plain[pi].is_none()).then_some((i, pi))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::find_anchor;
    use crate::rotor::ALPHABET;

    use rstest::rstest;

    const PLAIN_TXT: &str = "welldoneisbetterthanwellsaid";
    const CIPHER_TXT: &str = "oahqhcnynxtszjrrhjbyhqksoujy";
    const PANGRAM: &str = "allgoodqquickbrownfoxesjumpoverlazydogtosavetheirpartyw";

    /// Rewinds a recovered state to text index 0 and checks that it encodes
    /// the plaintext back to the ciphertext.
    fn verify(mut state: RotorState, plaintext: &[u8], cryptext: &[u8]) -> RotorState {
        state.rewind(plaintext, false).unwrap();
        let mut replay = state.clone();
        assert_eq!(replay.encode(plaintext, false).unwrap(), cryptext);
        state
    }

    #[rstest]
    #[case(b"abc", b"ab", 0)]
    #[case(b"", b"", 0)]
    #[case(b"abc", b"abc", 3)]
    #[case(b"a#c", b"abc", 0)]
    #[case(b"abc", b"aBc", 0)]
    fn test_crack_rejects_bad_input(#[case] pt: &[u8], #[case] ct: &[u8], #[case] anchor: usize) {
        assert!(crack(pt, ct, anchor).is_err());
    }

    #[test]
    fn test_crack_byrne_pair() {
        let (pt, ct) = (PLAIN_TXT.as_bytes(), CIPHER_TXT.as_bytes());
        let anchor = find_anchor(pt, ct, 6).unwrap();
        let state = crack(pt, ct, anchor).unwrap().expect("pair should be solvable");
        verify(state, pt, ct);
    }

    #[test]
    fn test_crack_is_deterministic() {
        let (pt, ct) = (PLAIN_TXT.as_bytes(), CIPHER_TXT.as_bytes());
        let anchor = find_anchor(pt, ct, 6).unwrap();
        let first = crack(pt, ct, anchor).unwrap();
        let second = crack(pt, ct, anchor).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_crack_mismatched_pair_is_unsolvable() {
        let pt = &PANGRAM.as_bytes()[..52];
        let mut rotor = RotorState::from_alphabets(ALPHABET, ALPHABET).unwrap();
        let mut ct = rotor.encode(pt, false).unwrap();
        // one corrupted character poisons every branch
        ct[26] = b'a' + (ct[26] - b'a' + 1) % 26;
        let anchor = find_anchor(pt, &ct, 6).unwrap();
        assert_eq!(crack(pt, &ct, anchor).unwrap(), None);
    }

    #[test]
    fn test_crack_52_character_pair() {
        let pt = &PANGRAM.as_bytes()[..52];
        let mut rotor = RotorState::from_alphabets(ALPHABET, ALPHABET).unwrap();
        let ct = rotor.encode(pt, false).unwrap();

        let anchor = find_anchor(pt, &ct, 6).unwrap();
        let state = crack(pt, &ct, anchor).unwrap().expect("pair should be solvable");
        verify(state, pt, &ct);
    }

    #[test]
    fn test_crack_recovers_original_rotors() {
        let text = PANGRAM.repeat(8);
        let pt = text.as_bytes();
        let initial = RotorState::from_alphabets(ALPHABET, ALPHABET).unwrap();
        let ct = initial.clone().encode(pt, false).unwrap();

        let anchor = find_anchor(pt, &ct, 6).unwrap();
        let state = crack(pt, &ct, anchor).unwrap().expect("pair should be solvable");
        assert!(state.is_complete());

        let rewound = verify(state, pt, &ct);
        assert!(rewound.equivalent_to(&initial));
    }

    #[test]
    fn test_crack_recovers_keyed_rotors() {
        let text = PANGRAM.repeat(8);
        let pt = text.as_bytes();
        let initial = RotorState::keyed("arabesque").unwrap();
        let ct = initial.clone().encode(pt, false).unwrap();

        let anchor = find_anchor(pt, &ct, 6).unwrap();
        let state = crack(pt, &ct, anchor).unwrap().expect("pair should be solvable");
        assert!(state.is_complete());

        let rewound = verify(state, pt, &ct);
        assert!(rewound.equivalent_to(&initial));
    }

    #[test]
    fn test_open_positions_on_anchored_state() {
        let state = RotorState::anchored(b'h', b'o', 3);

        let forward = open_positions(&state, false);
        // slot 0 holds the anchor ciphertext letter, slot 25 pairs with the
        // occupied last plain slot
        assert_eq!(forward.len(), 24);
        assert!(forward.iter().all(|&(ci, pi)| ci == pi));
        assert!(!forward.iter().any(|&(ci, _)| ci == 0 || ci == 25));

        let backward = open_positions(&state, true);
        assert!(backward.iter().all(|&(ci, pi)| pi == (ci + 25) % 26));
        assert!(!backward.iter().any(|&(ci, _)| ci == 0));
        assert!(!backward.iter().any(|&(_, pi)| pi == 25));
    }

    #[test]
    fn test_decide_direction_clamps_at_text_ends() {
        let (pt, ct) = (PLAIN_TXT.as_bytes(), CIPHER_TXT.as_bytes());
        let state = RotorState::anchored(pt[0], ct[0], 0);

        let at_left_edge = SearchRange { start: 0, end: 5 };
        assert_eq!(decide_direction(pt, ct, &state, &at_left_edge), 5);

        let at_right_edge = SearchRange { start: 20, end: pt.len() };
        assert_eq!(decide_direction(pt, ct, &state, &at_right_edge), 20);
    }
}
