use anyhow::{Result, bail};

/// Resolve CLI seed tokens. Integers are taken as-is; `random` draws a fresh
/// seed so a run can be reproduced from the report afterwards.
pub fn resolve_seeds(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    for token in tokens {
        if token.eq_ignore_ascii_case("random") {
            let seed: u64 = rand::random();
            log::info!("drew random seed {seed}");
            seeds.push(seed);
            continue;
        }
        if let Ok(value) = token.parse::<u64>() {
            seeds.push(value);
            continue;
        }
        if let Ok(value) = token.parse::<i64>() {
            seeds.push(value.unsigned_abs());
            continue;
        }
        bail!("invalid seed '{token}': expected an integer or 'random'");
    }
    if seeds.is_empty() {
        bail!("no seeds given");
    }
    seeds.dedup();
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn integers_and_negatives_resolve() {
        let seeds = resolve_seeds(&tokens(&["1337", "-5", "18446744073709551615"])).unwrap();
        assert_eq!(seeds, vec![1337, 5, u64::MAX]);
    }

    #[test]
    fn random_draws_one_seed() {
        assert_eq!(resolve_seeds(&tokens(&["random"])).unwrap().len(), 1);
    }

    #[test]
    fn junk_and_empty_lists_fail() {
        assert!(resolve_seeds(&tokens(&["banana"])).is_err());
        assert!(resolve_seeds(&[]).is_err());
    }
}
