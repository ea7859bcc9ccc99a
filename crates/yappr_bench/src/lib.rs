use rand::Rng;
use yappr_core::Identifier;

/// `n` random identifiers for bench inputs.
pub fn random_identifiers(n: usize) -> Vec<Identifier> {
    let mut rng = rand::rng();
    (0..n).map(|_| Identifier::from_bytes(rng.random())).collect()
}
