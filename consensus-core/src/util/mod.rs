mod id;

pub use id::*;

use rand::{distributions::Alphanumeric, thread_rng, Rng};

pub fn random_string(length: usize) -> String {
    let mut rng = thread_rng();

    std::iter::repeat(())
        .map(|_| rng.sample(Alphanumeric) as char)
        .take(length)
        .collect()
}

/// Generates a join code: uppercase alphanumeric, easy to read out loud.
pub fn random_code(length: usize) -> String {
    random_string(length).to_ascii_uppercase()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_random_code() {
        let code = random_code(5);

        assert_eq!(code.len(), 5, "code has the requested length");
        assert!(
            code.chars().all(|c| c.is_ascii_alphanumeric()),
            "code is alphanumeric"
        );
        assert_eq!(code, code.to_ascii_uppercase(), "code is uppercased");
    }
}
