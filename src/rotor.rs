//! Rotor-pair state for the Chaocipher.
//!
//! The Chaocipher (John Francis Byrne, 1918) enciphers with two alphabet
//! wheels, a plain rotor and a cipher rotor, which are re-permuted after every
//! character. This module owns the pair: the forward and reverse permutation
//! steps, traversal of a text to an arbitrary position, and the character
//! drivers built on top of them.
//!
//! During normal encryption every slot on both rotors is known. The
//! known-plaintext attack in [`crate::crack`] works on the same state with
//! most slots still undetermined, so slots are `Option<u8>` and a separate
//! seen-set tracks which symbols are already placed on each rotor.
//!
//! # Example
//!
//! ```
//! use chaocipher_rs::RotorState;
//!
//! let mut rotor = RotorState::keyed("wouldnotitbeniceifwewereolder").unwrap();
//! let secret = rotor.encode(b"thenwewouldnothavetowaitsolong", false).unwrap();
//! assert_eq!(secret.len(), 30);
//! ```
//!

/// The working alphabet. The convenience layer can extend it with a trailing
/// space for 27-slot rotors; the cracker only handles these 26 symbols.
pub const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

pub(crate) const ZENITH: usize = 0;
pub(crate) const NADIR: usize = 13;

/// Set of symbols currently placed on one rotor, as a bitmask.
///
/// Bits 0-25 are `a`-`z`, bit 26 is the space of the extended alphabet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SeenSet(u32);

impl SeenSet {
    fn bit(ch: u8) -> u32 {
        if ch == b' ' { 1 << 26 } else { 1 << (ch - b'a') }
    }

    pub(crate) fn insert(&mut self, ch: u8) {
        self.0 |= Self::bit(ch);
    }

    pub(crate) fn contains(&self, ch: u8) -> bool {
        self.0 & Self::bit(ch) != 0
    }

    pub(crate) fn len(&self) -> usize {
        self.0.count_ones() as usize
    }
}

/// The two Chaocipher rotors at one point of an encryption, decryption or
/// rotor-recovery run.
///
/// `text_index` is the cursor into the driving text: the index of the next
/// character to be enciphered when stepping forward. After a forward step the
/// freshly produced ciphertext letter sits at `cipher[0]` (the zenith) and the
/// matching plaintext letter in the last plain slot.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotorState {
    /// Plain rotor (right alphabet); `None` marks a slot not yet recovered
    pub(crate) plain: Vec<Option<u8>>,
    /// Cipher rotor (left alphabet)
    pub(crate) cipher: Vec<Option<u8>>,
    /// Symbols already placed on the plain rotor
    pub(crate) plain_seen: SeenSet,
    /// Symbols already placed on the cipher rotor
    pub(crate) cipher_seen: SeenSet,
    /// Index of the next character to encipher
    pub(crate) text_index: usize,
}

/// Checks that `alpha` is a permutation of the working alphabet (26 letters,
/// or 27 symbols including the space).
fn check_alphabet(alpha: &[u8]) -> Result<(), String> {
    if alpha.len() != 26 && alpha.len() != 27 {
        return Err("bad alphabet length".to_string());
    }
    let mut seen = SeenSet::default();
    for &ch in alpha {
        match ch {
            b'a'..=b'z' => {}
            b' ' if alpha.len() == 27 => {}
            _ => return Err(format!("'{}' not in the working alphabet", ch as char)),
        }
        if seen.contains(ch) {
            return Err(format!("duplicate '{}' in alphabet", ch as char));
        }
        seen.insert(ch);
    }
    Ok(())
}

impl RotorState {
    /// Creates a state from two known alphabets.
    ///
    /// Both must be permutations of the same working alphabet: 26 lowercase
    /// letters, or 27 symbols including a space for the extended mode.
    ///
    /// # Example
    ///
    /// ```
    /// use chaocipher_rs::RotorState;
    ///
    /// let rotor = RotorState::from_alphabets(
    ///     "ptlnbqdeoysfavzkgjrihwxumc",
    ///     "hxuczvamdslkpefjrigtwobnyq",
    /// ).unwrap();
    /// assert!(rotor.is_complete());
    /// ```
    ///
    pub fn from_alphabets(plain: &str, cipher: &str) -> Result<Self, String> {
        let (pw, cw) = (plain.as_bytes(), cipher.as_bytes());
        check_alphabet(pw)?;
        check_alphabet(cw)?;
        if pw.len() != cw.len() {
            return Err("bad alphabet length".to_string());
        }

        let mut state = RotorState {
            plain: pw.iter().map(|&ch| Some(ch)).collect(),
            cipher: cw.iter().map(|&ch| Some(ch)).collect(),
            plain_seen: SeenSet::default(),
            cipher_seen: SeenSet::default(),
            text_index: 0,
        };
        for &ch in pw {
            state.plain_seen.insert(ch);
        }
        for &ch in cw {
            state.cipher_seen.insert(ch);
        }
        Ok(state)
    }

    /// Creates a state by priming straight alphabets with a key text.
    ///
    /// Both rotors start as `a..z`, the key is enciphered to churn them, and
    /// the cursor is reset so the state is ready to encode a message.
    pub fn keyed(key: &str) -> Result<Self, String> {
        let mut state = Self::from_alphabets(ALPHABET, ALPHABET)?;
        state.encode(key.as_bytes(), false)?;
        state.text_index = 0;
        Ok(state)
    }

    /// Same as [`RotorState::keyed`] but on 27-slot rotors carrying a space,
    /// so the key and the messages may contain word breaks.
    pub fn keyed_spaced(key: &str) -> Result<Self, String> {
        let spaced = format!("{ALPHABET} ");
        let mut state = Self::from_alphabets(&spaced, &spaced)?;
        state.encode(key.as_bytes(), false)?;
        state.text_index = 0;
        Ok(state)
    }

    /// A 26-slot state with every slot undetermined, cursor at `anchor`.
    pub(crate) fn empty(anchor: usize) -> Self {
        RotorState {
            plain: vec![None; ALPHABET.len()],
            cipher: vec![None; ALPHABET.len()],
            plain_seen: SeenSet::default(),
            cipher_seen: SeenSet::default(),
            text_index: anchor,
        }
    }

    /// Seeds an empty state with the pair observed at the anchor position, in
    /// encode orientation: the ciphertext letter at the zenith, the plaintext
    /// letter in the last plain slot, cursor one past the anchor.
    pub(crate) fn anchored(pt_ch: u8, ct_ch: u8, anchor: usize) -> Self {
        let mut state = Self::empty(anchor);
        state.cipher[ZENITH] = Some(ct_ch);
        state.cipher_seen.insert(ct_ch);
        let last = state.plain.len() - 1;
        state.plain[last] = Some(pt_ch);
        state.plain_seen.insert(pt_ch);
        state.text_index += 1;
        state
    }

    /// Number of slots on each rotor (26, or 27 in extended mode).
    pub fn width(&self) -> usize {
        self.plain.len()
    }

    /// Index of the next character to be enciphered.
    pub fn text_index(&self) -> usize {
        self.text_index
    }

    /// True once every symbol has been placed on both rotors.
    pub fn is_complete(&self) -> bool {
        self.plain_seen.len() == self.width() && self.cipher_seen.len() == self.width()
    }

    /// The plain rotor as a string, undetermined slots rendered as `.`.
    pub fn plain_alphabet(&self) -> String {
        Self::render(&self.plain)
    }

    /// The cipher rotor as a string, undetermined slots rendered as `.`.
    pub fn cipher_alphabet(&self) -> String {
        Self::render(&self.cipher)
    }

    fn render(rotor: &[Option<u8>]) -> String {
        rotor
            .iter()
            .map(|slot| slot.map(|ch| ch as char).unwrap_or('.'))
            .collect()
    }

    /// True when `other` holds the same rotor pair up to a common ring
    /// rotation.
    ///
    /// No operation observes the absolute orientation of the pair, only the
    /// alignment of the two rings, so recovered rotors should be compared
    /// with this rather than `==`.
    pub fn equivalent_to(&self, other: &RotorState) -> bool {
        let n = self.width();
        if n != other.width() {
            return false;
        }
        (0..n).any(|k| {
            (0..n).all(|i| self.plain[(i + k) % n] == other.plain[i])
                && (0..n).all(|i| self.cipher[(i + k) % n] == other.cipher[i])
        })
    }

    /// Left circular shift by n positions.
    fn lshift(rotor: &mut [Option<u8>], n: usize) {
        if rotor.is_empty() {
            return;
        }
        let n = n % rotor.len();
        rotor.rotate_left(n);
    }

    /// Index of `ch` on the given rotor, skipping undetermined slots.
    fn ring_index(rotor: &[Option<u8>], ch: u8, name: &str) -> Result<usize, String> {
        rotor
            .iter()
            .position(|&slot| slot == Some(ch))
            .ok_or_else(|| format!("'{}' not on the {} rotor", ch as char, name))
    }

    /// One step in the encode direction, driven by `text[text_index]`.
    ///
    /// The reference rotor is the cipher rotor when `use_cipher` is set (the
    /// text is a ciphertext), otherwise the plain rotor. Both rotors rotate
    /// to bring the reference character to the zenith, the plain rotor one
    /// position further, then each rotor takes its fixed zenith-to-nadir
    /// permutation.
    pub fn step_forward(&mut self, text: &[u8], use_cipher: bool) -> Result<(), String> {
        let ch = *text
            .get(self.text_index)
            .ok_or_else(|| "text exhausted".to_string())?;
        let idx = if use_cipher {
            Self::ring_index(&self.cipher, ch, "cipher")?
        } else {
            Self::ring_index(&self.plain, ch, "plain")?
        };

        Self::lshift(&mut self.cipher, idx);
        Self::lshift(&mut self.plain, idx + 1);

        // zenith+2 slides down to the nadir on the plain rotor, zenith+1 on
        // the cipher rotor
        self.plain[ZENITH + 2..=NADIR].rotate_left(1);
        self.cipher[ZENITH + 1..=NADIR].rotate_left(1);

        self.text_index += 1;
        Ok(())
    }

    /// One step in the decode direction, undoing the step that consumed
    /// `text[text_index - 1]`.
    pub fn step_back(&mut self, text: &[u8], use_cipher: bool) -> Result<(), String> {
        let prev = self
            .text_index
            .checked_sub(1)
            .ok_or_else(|| "already at the start of the text".to_string())?;
        let ch = *text
            .get(prev)
            .ok_or_else(|| "text exhausted".to_string())?;
        let (idx, offset) = if use_cipher {
            (Self::ring_index(&self.cipher, ch, "cipher")?, 0)
        } else {
            (Self::ring_index(&self.plain, ch, "plain")?, 1)
        };

        Self::lshift(&mut self.cipher, idx + offset);
        Self::lshift(&mut self.plain, idx + offset);

        self.cipher[ZENITH + 1..=NADIR].rotate_right(1);
        self.plain.rotate_right(1);
        self.plain[ZENITH + 3..=NADIR + 1].rotate_right(1);

        self.text_index = prev;
        Ok(())
    }

    /// Advances or rewinds the state until the cursor reaches `target`,
    /// driven by `text`. This is how the cracker moves the rotors to the
    /// position where a new slot must be filled.
    pub fn traverse_to(&mut self, text: &[u8], target: usize, use_cipher: bool) -> Result<(), String> {
        while self.text_index != target {
            if self.text_index > target {
                self.step_back(text, use_cipher)?;
            } else {
                self.step_forward(text, use_cipher)?;
            }
        }
        Ok(())
    }

    /// Forward driver: enciphers `text` from the current cursor to its end.
    ///
    /// With the plain rotor driving (`use_cipher` false) the output is the
    /// ciphertext; with the cipher rotor driving, a ciphertext input yields
    /// the plaintext back. A driving character missing from the reference
    /// rotor is an error.
    pub fn encode(&mut self, text: &[u8], use_cipher: bool) -> Result<Vec<u8>, String> {
        let mut out = Vec::with_capacity(text.len());
        while self.text_index < text.len() {
            self.step_forward(text, use_cipher)?;
            let slot = if use_cipher {
                self.plain[self.plain.len() - 1]
            } else {
                self.cipher[ZENITH]
            };
            out.push(slot.ok_or_else(|| "rotor slot undetermined".to_string())?);
        }
        Ok(out)
    }

    /// Reverse driver: rewinds the state back to text index 0, collecting the
    /// opposite text along the way.
    ///
    /// Driven by the plaintext it returns the ciphertext, driven by the
    /// ciphertext (`use_cipher` set) it returns the recovered plaintext. The
    /// collected characters come out newest-first and are reversed before
    /// returning.
    pub fn rewind(&mut self, text: &[u8], use_cipher: bool) -> Result<Vec<u8>, String> {
        let mut out = Vec::with_capacity(self.text_index);
        while self.text_index > 0 {
            self.step_back(text, use_cipher)?;
            let slot = if use_cipher {
                self.plain[ZENITH]
            } else {
                self.cipher[ZENITH]
            };
            out.push(slot.ok_or_else(|| "rotor slot undetermined".to_string())?);
        }
        out.reverse();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    const KEY_PLAIN: &str = "ptlnbqdeoysfavzkgjrihwxumc";
    const KEY_CIPHER: &str = "hxuczvamdslkpefjrigtwobnyq";

    #[test]
    fn test_from_alphabets() {
        let r = RotorState::from_alphabets(KEY_PLAIN, KEY_CIPHER).unwrap();
        assert!(r.is_complete());
        assert_eq!(r.width(), 26);
        assert_eq!(r.plain_alphabet(), KEY_PLAIN);
        assert_eq!(r.cipher_alphabet(), KEY_CIPHER);
    }

    #[rstest]
    #[case("ab", "cd")]
    #[case("abcdefghijklmnopqrstuvwxya", ALPHABET)]
    #[case("abcdefghijklmnopqrstuvwxyZ", ALPHABET)]
    fn test_from_alphabets_rejects(#[case] plain: &str, #[case] cipher: &str) {
        assert!(RotorState::from_alphabets(plain, cipher).is_err());
    }

    #[test]
    fn test_from_alphabets_spaced() {
        let spaced = format!("{ALPHABET} ");
        let r = RotorState::from_alphabets(&spaced, &spaced).unwrap();
        assert_eq!(r.width(), 27);
        assert!(r.is_complete());
    }

    #[test]
    fn test_mixed_widths_rejected() {
        let spaced = format!("{ALPHABET} ");
        assert!(RotorState::from_alphabets(ALPHABET, &spaced).is_err());
    }

    // Lowercased step vectors from the Byrne exhibit alphabets.
    #[rstest]
    #[case(b'a', "vzgjrihwxumcpktlnbqdeoysfa", "pfjrigtwobnyqehxuczvamdslk")]
    #[case(b'w', "xucptlnbqdeoymsfavzkgjrihw", "onyqhxuczvamdbslkpefjrigtw")]
    fn test_step_forward(#[case] ch: u8, #[case] expected_plain: &str, #[case] expected_cipher: &str) {
        let mut r = RotorState::from_alphabets(KEY_PLAIN, KEY_CIPHER).unwrap();
        r.step_forward(&[ch], false).unwrap();
        assert_eq!(r.plain_alphabet(), expected_plain);
        assert_eq!(r.cipher_alphabet(), expected_cipher);
        assert_eq!(r.text_index(), 1);
    }

    #[test]
    fn test_step_forward_from_straight_alphabets() {
        let mut r = RotorState::from_alphabets(ALPHABET, ALPHABET).unwrap();
        r.step_forward(b"a", false).unwrap();
        assert_eq!(r.plain_alphabet(), "bcefghijklmnodpqrstuvwxyza");
        assert_eq!(r.cipher_alphabet(), "acdefghijklmnbopqrstuvwxyz");
        assert_eq!(r.cipher[ZENITH], Some(b'a'));
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn test_step_roundtrip_at_zenith(#[case] use_cipher: bool) {
        // The driving character sits at position 0, so even the absolute
        // orientation is restored.
        let mut r = RotorState::from_alphabets(ALPHABET, ALPHABET).unwrap();
        let initial = r.clone();
        r.step_forward(b"a", use_cipher).unwrap();
        r.step_back(b"a", use_cipher).unwrap();
        assert_eq!(r, initial);
    }

    #[rstest]
    #[case(b"w", false)]
    #[case(b"w", true)]
    #[case(b"q", false)]
    fn test_step_roundtrip_realigns(#[case] text: &[u8], #[case] use_cipher: bool) {
        let mut r = RotorState::from_alphabets(KEY_PLAIN, KEY_CIPHER).unwrap();
        let initial = r.clone();
        r.step_forward(text, use_cipher).unwrap();
        r.step_back(text, use_cipher).unwrap();
        assert!(r.equivalent_to(&initial));
        assert_eq!(r.text_index(), 0);
    }

    #[test]
    fn test_rotors_stay_permutations() {
        let mut r = RotorState::keyed("arabesque").unwrap();
        let text = b"allgoodqquickbrownfoxesjumpoverlazydogtosavetheirparty";
        r.encode(text, false).unwrap();

        for rendered in [r.plain_alphabet(), r.cipher_alphabet()] {
            let mut letters: Vec<u8> = rendered.into_bytes();
            letters.sort_unstable();
            assert_eq!(letters, ALPHABET.as_bytes());
        }
    }

    #[test]
    fn test_straight_alphabet_roundtrip() {
        let mut enc = RotorState::from_alphabets(ALPHABET, ALPHABET).unwrap();
        let ct = enc.encode(b"hello", false).unwrap();

        let mut dec = RotorState::from_alphabets(ALPHABET, ALPHABET).unwrap();
        assert_eq!(dec.encode(&ct, true).unwrap(), b"hello");
    }

    #[test]
    fn test_encode_known_vector() {
        let mut r = RotorState::from_alphabets(KEY_PLAIN, KEY_CIPHER).unwrap();
        let ct = r.encode(b"welldoneisbetterthanwellsaid", false).unwrap();
        assert_eq!(ct, b"oahqhcnynxtszjrrhjbyhqksoujy");
    }

    #[test]
    fn test_decode_known_vector() {
        let mut r = RotorState::from_alphabets(KEY_PLAIN, KEY_CIPHER).unwrap();
        let pt = r.encode(b"oahqhcnynxtszjrrhjbyhqksoujy", true).unwrap();
        assert_eq!(pt, b"welldoneisbetterthanwellsaid");
    }

    #[test]
    fn test_encode_rejects_foreign_character() {
        let mut r = RotorState::from_alphabets(ALPHABET, ALPHABET).unwrap();
        assert!(r.encode(b"hell0", false).is_err());
    }

    #[test]
    fn test_rewind_recovers_both_texts() {
        let pt = b"welldoneisbetterthanwellsaid";
        let mut r = RotorState::from_alphabets(KEY_PLAIN, KEY_CIPHER).unwrap();
        let ct = r.encode(pt, false).unwrap();

        let mut replay = r.clone();
        let recovered = replay.rewind(&ct, true).unwrap();
        assert_eq!(recovered, pt);

        let echoed = r.rewind(pt, false).unwrap();
        assert_eq!(echoed, ct);

        let initial = RotorState::from_alphabets(KEY_PLAIN, KEY_CIPHER).unwrap();
        assert!(r.equivalent_to(&initial));
        assert_eq!(r.text_index(), 0);
    }

    #[test]
    fn test_keyed_roundtrip() {
        let key = "wouldnotitbeniceifwewereolder";
        let msg = b"thenwewouldnothavetowaitsolong";

        let mut enc = RotorState::keyed(key).unwrap();
        let secret = enc.encode(msg, false).unwrap();
        assert_ne!(secret, msg);

        let mut dec = RotorState::keyed(key).unwrap();
        assert_eq!(dec.encode(&secret, true).unwrap(), msg);
    }

    #[test]
    fn test_keyed_spaced_roundtrip() {
        let key = "would not it be nice if we were older";
        let msg = b"then we would not have to wait so long";

        let mut enc = RotorState::keyed_spaced(key).unwrap();
        let secret = enc.encode(msg, false).unwrap();

        let mut dec = RotorState::keyed_spaced(key).unwrap();
        assert_eq!(dec.encode(&secret, true).unwrap(), msg);
    }

    #[test]
    fn test_keyed_rejects_foreign_character() {
        assert!(RotorState::keyed("no spaces here").is_err());
    }

    #[test]
    fn test_equivalent_to_is_rotation_insensitive() {
        let a = RotorState::from_alphabets(KEY_PLAIN, KEY_CIPHER).unwrap();
        let mut b = a.clone();
        b.plain.rotate_left(7);
        b.cipher.rotate_left(7);
        assert!(a.equivalent_to(&b));

        // rotating only one ring breaks the alignment
        let mut c = a.clone();
        c.cipher.rotate_left(7);
        assert!(!a.equivalent_to(&c));
    }
}
