//! Chaocipher implementation.
//!
//! The Chaocipher is a cipher method invented by John Francis Byrne in 1918 and described in his
//! 1953 autobiographical Silent Years. He believed Chaocipher was simple, yet unbreakable.
//!
//! The algorithm uses two alphabets (called the left and right alphabets, or cipher and plaintext
//! alphabets) which are permuted after each character is processed. The permutation involves
//! rotating both alphabets and performing specific shifts at fixed positions (zenith and nadir).
//! The rotor mechanics live in [`crate::RotorState`]; this module wraps them behind the
//! [`Block`] trait for whole-message work.
//!
//! Byrne was wrong about the unbreakable part: see [`crate::crack`] for the known-plaintext
//! attack that recovers both starting alphabets from a message and its encryption.
//!
//! # Example
//!
//! ```
//! use chaocipher_rs::{Block, Chaocipher};
//!
//! let pkey = "ptlnbqdeoysfavzkgjrihwxumc";
//! let ckey = "hxuczvamdslkpefjrigtwobnyq";
//! let cipher = Chaocipher::new(pkey, ckey).unwrap();
//!
//! let plaintext = b"hello";
//! let mut ciphertext = vec![0u8; plaintext.len()];
//! cipher.encrypt(&mut ciphertext, plaintext).unwrap();
//! ```
//!
use crate::Block;
use crate::rotor::RotorState;
use std::cell::RefCell;

/// A Chaocipher instance with two permutation alphabets.
///
/// The starting configuration is kept so the working state can be reset
/// before every whole-message operation; the working state itself sits in a
/// `RefCell` because the `Block` operations take `&self`.
///
pub struct Chaocipher {
    /// Starting configuration, restored before each operation
    initial: RotorState,
    /// Internal mutable state holding the working rotors
    state: RefCell<RotorState>,
}

impl Chaocipher {
    /// Creates a new Chaocipher instance from two explicit alphabets.
    ///
    /// Both alphabets must be permutations of the working alphabet: 26
    /// lowercase letters, or 27 symbols including a space for the extended
    /// mode.
    ///
    /// # Arguments
    ///
    /// * `pkey` - The plaintext alphabet (right alphabet)
    /// * `ckey` - The cipher alphabet (left alphabet)
    ///
    /// # Example
    ///
    /// ```
    /// use chaocipher_rs::Chaocipher;
    ///
    /// let cipher = Chaocipher::new(
    ///     "ptlnbqdeoysfavzkgjrihwxumc",
    ///     "hxuczvamdslkpefjrigtwobnyq"
    /// ).unwrap();
    /// ```
    ///
    pub fn new(pkey: &str, ckey: &str) -> Result<Self, String> {
        let initial = RotorState::from_alphabets(pkey, ckey)?;
        let state = RefCell::new(initial.clone());
        Ok(Chaocipher { initial, state })
    }

    /// Creates an instance whose alphabets are derived from a key text.
    ///
    /// Both rotors start straight and are churned by enciphering the key, a
    /// simple way to agree on a full rotor pair without exchanging two
    /// alphabets.
    ///
    /// # Example
    ///
    /// ```
    /// use chaocipher_rs::{Block, Chaocipher};
    ///
    /// let cipher = Chaocipher::with_key("wouldnotitbeniceifwewereolder").unwrap();
    /// let mut ct = vec![0u8; 5];
    /// cipher.encrypt(&mut ct, b"hello").unwrap();
    /// ```
    ///
    pub fn with_key(key: &str) -> Result<Self, String> {
        let initial = RotorState::keyed(key)?;
        let state = RefCell::new(initial.clone());
        Ok(Chaocipher { initial, state })
    }

    /// Key-derived instance on 27-slot rotors that carry a space, so keys and
    /// messages may keep their word breaks. Not supported by the cracker,
    /// which only handles the 26-letter alphabet.
    pub fn with_key_spaced(key: &str) -> Result<Self, String> {
        let initial = RotorState::keyed_spaced(key)?;
        let state = RefCell::new(initial.clone());
        Ok(Chaocipher { initial, state })
    }

    /// The current alphabets as `(plain, cipher)` strings.
    pub fn alphabets(&self) -> (String, String) {
        (self.initial.plain_alphabet(), self.initial.cipher_alphabet())
    }

    /// Restores the working rotors to the starting configuration.
    fn reset(&self) {
        *self.state.borrow_mut() = self.initial.clone();
    }
}

impl Block for Chaocipher {
    /// Chaocipher operates on single characters, so the block size is always 1.
    fn block_size(&self) -> usize {
        1
    }

    /// Encrypts the source data into the destination buffer.
    ///
    /// The state is reset first, so each call starts from the initial
    /// alphabets. Fails if a plaintext character is not on the plain rotor;
    /// `dst` must be at least as long as `src`.
    ///
    /// # Example
    ///
    /// ```
    /// use chaocipher_rs::{Block, Chaocipher};
    ///
    /// let cipher = Chaocipher::new(
    ///     "ptlnbqdeoysfavzkgjrihwxumc",
    ///     "hxuczvamdslkpefjrigtwobnyq"
    /// ).unwrap();
    ///
    /// let plaintext = b"hello";
    /// let mut ciphertext = vec![0u8; plaintext.len()];
    /// let n = cipher.encrypt(&mut ciphertext, plaintext).unwrap();
    /// assert_eq!(n, plaintext.len());
    /// ```
    ///
    fn encrypt(&self, dst: &mut [u8], src: &[u8]) -> Result<usize, String> {
        self.reset();
        let out = self.state.borrow_mut().encode(src, false)?;
        dst[..out.len()].copy_from_slice(&out);
        Ok(out.len())
    }

    /// Decrypts the source data into the destination buffer.
    ///
    /// Decryption runs the same forward motion with the cipher rotor as the
    /// reference, reading the recovered plaintext off the plain rotor. Fails
    /// if a ciphertext character is not on the cipher rotor.
    ///
    fn decrypt(&self, dst: &mut [u8], src: &[u8]) -> Result<usize, String> {
        self.reset();
        let out = self.state.borrow_mut().encode(src, true)?;
        dst[..out.len()].copy_from_slice(&out);
        Ok(out.len())
    }
}
