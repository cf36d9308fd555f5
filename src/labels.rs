//! Unique name generation for label dimensions and metric identifiers.
//!
//! Names are `adjective_noun` pairs drawn from fixed word tables, the way
//! human-memorable container names are minted. The tables bound the name
//! space, so uniqueness is enforced by rejection sampling with a retry
//! budget; a request too close to the exhaustion point of the space fails
//! outright rather than spinning.

use std::collections::HashSet;

use rand::Rng;

/// Attempts per slot before unique generation gives up.
pub const MAX_RETRIES: usize = 100;

pub(crate) const ADJECTIVES: &[&str] = &[
    "amber", "ancient", "bitter", "bold", "brave", "bright", "calm", "clever", "crimson",
    "curious", "dusty", "eager", "elastic", "fierce", "frosty", "gentle", "gilded", "hollow",
    "humble", "jolly", "lively", "lucid", "mellow", "nimble", "opaque", "placid", "quiet",
    "rapid", "rustic", "silent", "solar", "sturdy", "tidal", "vivid", "wandering", "zesty",
];

pub(crate) const NOUNS: &[&str] = &[
    "anchor", "basin", "beacon", "canyon", "cedar", "cinder", "comet", "current", "delta",
    "ember", "falcon", "fjord", "garnet", "glacier", "harbor", "heron", "lagoon", "lantern",
    "marble", "meadow", "nebula", "orchard", "osprey", "pebble", "prairie", "quarry", "raven",
    "reef", "ridge", "saffron", "summit", "thicket", "tundra", "walnut", "willow", "zephyr",
];

/// Draw one random `adjective_noun` name.
pub fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.random_range(0..NOUNS.len())];
    format!("{adjective}_{noun}")
}

/// Generate `count` distinct names, returned in sorted order so that
/// downstream cartesian enumeration is structurally deterministic.
///
/// Each slot gets up to [`MAX_RETRIES`] draws; if any slot cannot find an
/// unused name the whole call returns `None` with no partial result.
pub fn generate_unique_names<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Option<Vec<String>> {
    let mut chosen: HashSet<String> = HashSet::with_capacity(count);
    for _ in 0..count {
        let accepted = (0..MAX_RETRIES).any(|_| chosen.insert(random_name(rng)));
        if !accepted {
            return None;
        }
    }
    let mut names: Vec<String> = chosen.into_iter().collect();
    names.sort_unstable();
    Some(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generates_exactly_the_requested_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let names = generate_unique_names(&mut rng, 5).expect("generate");
        assert_eq!(names.len(), 5);
        let distinct: HashSet<&String> = names.iter().collect();
        assert_eq!(distinct.len(), 5);
    }

    #[test]
    fn names_come_back_sorted() {
        let mut rng = StdRng::seed_from_u64(7);
        let names = generate_unique_names(&mut rng, 20).expect("generate");
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn zero_count_yields_empty_list() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(generate_unique_names(&mut rng, 0), Some(Vec::new()));
    }

    #[test]
    fn exhausting_the_name_space_fails_with_no_partial_result() {
        let mut rng = StdRng::seed_from_u64(7);
        let over_capacity = ADJECTIVES.len() * NOUNS.len() + 1;
        assert_eq!(generate_unique_names(&mut rng, over_capacity), None);
    }

    #[test]
    fn random_name_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let name = random_name(&mut rng);
        let mut parts = name.splitn(2, '_');
        assert!(ADJECTIVES.contains(&parts.next().unwrap()));
        assert!(NOUNS.contains(&parts.next().unwrap()));
    }
}
