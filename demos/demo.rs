use chaocipher_rs::{ALPHABET, Block, Chaocipher, RotorState, crack, find_anchor, helpers};

const KEY_PLAIN: &str = "ptlnbqdeoysfavzkgjrihwxumc";
const KEY_CIPHER: &str = "hxuczvamdslkpefjrigtwobnyq";
const PLAIN: &str = "welldoneisbetterthanwellsaid";
const LOW_DIVERSITY: &str = "allgoodqquickbrownfoxesjumpoverlazydogtosavetheirpar";

fn main() {
    println!("==> Plain = \n{}", PLAIN);

    // Byrne's exhibit alphabets
    let cipher = Chaocipher::new(KEY_PLAIN, KEY_CIPHER).unwrap();
    let src = PLAIN.as_bytes();
    let mut ct = vec![0u8; src.len()];
    let n = cipher.encrypt(&mut ct, src).unwrap();
    println!("==> Chaocipher");
    println!("{}", helpers::output_as_block(&String::from_utf8_lossy(&ct[..n])));

    let mut pt = vec![0u8; n];
    let n1 = cipher.decrypt(&mut pt, &ct[..n]).unwrap();
    if pt[..n1] == *src {
        println!("decrypt ok\n");
    } else {
        println!("decrypt not ok\n{}\n{}\n", PLAIN, String::from_utf8_lossy(&pt[..n1]));
    }

    // Key-primed rotors, the pen-and-paper way of agreeing on alphabets
    let keyed = Chaocipher::with_key("wouldnotitbeniceifwewereolder").unwrap();
    let (pw, cw) = keyed.alphabets();
    println!("==> Keyed rotors\nplain:  {}\ncipher: {}\n", pw, cw);

    // And the attack: recover the rotors from a plaintext/ciphertext pair
    let pt = LOW_DIVERSITY.as_bytes();
    let mut rotor = RotorState::from_alphabets(ALPHABET, ALPHABET).unwrap();
    let ct = rotor.encode(pt, false).unwrap();

    let anchor = find_anchor(pt, &ct, 6).unwrap();
    println!("==> Cracking {} characters from anchor {}", pt.len(), anchor);
    match crack(pt, &ct, anchor).unwrap() {
        Some(mut state) => {
            state.rewind(pt, false).unwrap();
            println!("recovered plain:  {}", state.plain_alphabet());
            println!("recovered cipher: {}", state.cipher_alphabet());
        }
        None => println!("no rotor pair fits"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main() {
        main();
    }
}
