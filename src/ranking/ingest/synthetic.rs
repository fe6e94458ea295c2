//! Synthetic item producers for benchmarks and tests.
//!
//! Both producers are lazy: items are built one at a time as the consumer
//! pulls them, so arbitrarily long sequences never materialize in memory.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ranking::core::item::Item;

/// Age window of generated items, in seconds.
const AGE_WINDOW_SECONDS: u64 = 86_400 * 30;

/// Id of the `index`-th generated item.
#[must_use]
pub fn item_id(index: u64) -> String {
    format!("post_{index:08}")
}

/// Deterministic sequence of `count` items ending at `base_time`.
///
/// Counters are simple modular functions of the index so that runs are
/// reproducible without a seed.
pub fn sequential_items(count: u64, base_time: f64) -> impl Iterator<Item = Item> + Send {
    (0..count).map(move |index| sequential_item(index, base_time))
}

/// The `index`-th item of [`sequential_items`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sequential_item(index: u64, base_time: f64) -> Item {
    let likes = (index * 7) % 10_000 + 1;
    let comments = (index * 3) % 1_000 + 1;
    let shares = (index * 5) % 500 + 1;
    let created_at = base_time - (index % AGE_WINDOW_SECONDS) as f64;

    Item::new(item_id(index), created_at)
        .with_likes(likes)
        .with_comments(comments)
        .with_shares(shares)
        .with_votes(likes + index % 100, index % 50)
}

/// Seeded random sequence of `count` items created within 30 days before `base_time`.
pub fn random_items(count: u64, seed: u64, base_time: f64) -> impl Iterator<Item = Item> + Send {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(move |index| {
        let likes = rng.gen_range(0..10_000_u64);
        let downvotes = rng.gen_range(0..50_u64);
        let upvotes = rng.gen_range(0..=likes + 100);
        #[allow(clippy::cast_precision_loss)]
        let age = rng.gen_range(0.0..AGE_WINDOW_SECONDS as f64);

        Item::new(item_id(index), base_time - age)
            .with_likes(likes)
            .with_comments(rng.gen_range(0..1_000))
            .with_shares(rng.gen_range(0..500))
            .with_votes(upvotes, downvotes)
    })
}
