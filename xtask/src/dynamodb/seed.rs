//! Seed data generation (Functional Core).

use ddbkit::{AttributeType, AttributeValue, Item, KeyAttribute};

use super::config::TableConfig;

const LABELS: [&str; 5] = ["alpha", "bravo", "charlie", "delta", "echo"];

/// Generate `count` sample items for the table.
///
/// Each item has a distinct primary key plus a `score` and a `label`
/// attribute, unless those names are taken by the key.
pub fn generate_seed_items(config: &TableConfig, count: u32) -> Vec<Item> {
    (0..count)
        .map(|i| {
            let mut item = Item::from([
                (
                    "score".to_string(),
                    AttributeValue::N(sample_score(i).to_string()),
                ),
                (
                    "label".to_string(),
                    AttributeValue::S(LABELS[i as usize % LABELS.len()].to_string()),
                ),
            ]);

            // Spread items over a few partitions when there is a sort key.
            let (partition, sort) = match config.sort_key {
                Some(_) => (i / 4, Some(i % 4)),
                None => (i, None),
            };
            item.insert(
                config.partition_key.name.clone(),
                key_value(&config.partition_key, partition),
            );
            if let (Some(sk), Some(sort)) = (&config.sort_key, sort) {
                item.insert(sk.name.clone(), key_value(sk, sort));
            }
            item
        })
        .collect()
}

/// Scatters scores over `0..100`. Widened so large indices cannot overflow.
fn sample_score(i: u32) -> u64 {
    (u64::from(i) * 37) % 100
}

fn key_value(key: &KeyAttribute, n: u32) -> AttributeValue {
    match key.attribute_type {
        AttributeType::String => AttributeValue::S(format!("{}-{n:04}", key.name)),
        AttributeType::Number => AttributeValue::N(n.to_string()),
        AttributeType::Binary => {
            AttributeValue::B(aws_sdk_dynamodb::primitives::Blob::new(n.to_be_bytes()))
        }
    }
}
