pub mod helpers;
mod anchor;
mod chaocipher;
mod crack;
mod rotor;

pub use anchor::find_anchor;
pub use chaocipher::Chaocipher;
pub use crack::crack;
pub use rotor::ALPHABET;
pub use rotor::RotorState;


pub trait Block {
    fn block_size(&self) -> usize;
    fn encrypt(&self, dst: &mut [u8], src: &[u8]) -> Result<usize, String>;
    fn decrypt(&self, dst: &mut [u8], src: &[u8]) -> Result<usize, String>;
}
