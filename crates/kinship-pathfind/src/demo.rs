//! The ten-person demo dataset, and the seed-then-query walkthrough run by
//! `kinship demo`.

use std::time::Instant;

use serde::Serialize;

use kinship_core::{Batch, Entity, ExecutionContext, Relation};
use kinship_graph::{BatchReport, GraphStore};

use crate::error::Result;
use crate::types::{PathReport, SearchStatus};
use crate::PathfindEngine;

const PEOPLE: [(&str, i64); 10] = [
    ("Alice", 30),
    ("Bob", 25),
    ("Charlie", 35),
    ("Diana", 28),
    ("Eve", 22),
    ("Frank", 40),
    ("Grace", 33),
    ("Hank", 29),
    ("Ivy", 31),
    ("Jack", 26),
];

/// Friendships beyond the ring.
const CROSS_LINKS: [(&str, &str); 10] = [
    ("Alice", "Charlie"),
    ("Bob", "Eve"),
    ("Charlie", "Frank"),
    ("Diana", "Hank"),
    ("Eve", "Ivy"),
    ("Frank", "Jack"),
    ("Grace", "Alice"),
    ("Hank", "Bob"),
    ("Ivy", "Charlie"),
    ("Jack", "Diana"),
];

/// Ten people, each a friend of the next in a ring, plus ten cross-links.
pub fn people() -> Batch {
    let mut batch = Batch::new();
    for (name, age) in PEOPLE {
        batch = batch.entity(Entity::new(name).with_attribute("age", age));
    }
    for (i, (name, _)) in PEOPLE.iter().enumerate() {
        let (next, _) = PEOPLE[(i + 1) % PEOPLE.len()];
        batch = batch.relation(Relation::friends(*name, next));
    }
    for (from, to) in CROSS_LINKS {
        batch = batch.relation(Relation::friends(from, to));
    }
    batch
}

/// Everything `kinship demo` prints.
#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub seeded: BatchReport,
    pub friends: Vec<Entity>,
    pub shortest: PathReport,
    pub longest: PathReport,
}

/// Seed [`people`], then list the friends of `from` and query the shortest
/// and longest paths from `from` to `to`, all against one engine.
pub async fn run<S: GraphStore>(
    engine: &PathfindEngine<S>,
    from: &str,
    to: &str,
    ctx: &ExecutionContext,
) -> Result<DemoReport> {
    let seeded = engine.commit(&people(), ctx).await?;
    let friends = engine.friends_of(from, ctx).await?;

    let started = Instant::now();
    let path = engine.shortest_path(from, to, ctx).await?;
    let shortest = PathReport::new(
        from,
        to,
        path,
        SearchStatus::Complete,
        started.elapsed().as_millis() as u64,
    );

    let started = Instant::now();
    let longest = engine.longest_path(from, to, ctx).await?;
    let longest = PathReport::new(
        from,
        to,
        longest.path,
        longest.status,
        started.elapsed().as_millis() as u64,
    );

    Ok(DemoReport {
        seeded,
        friends,
        shortest,
        longest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_people_batch_is_valid() {
        let batch = people();
        assert_eq!(batch.entities.len(), 10);
        assert_eq!(batch.relations.len(), 20);
        assert!(batch.validate().is_ok());
        assert!(batch.relations.contains(&Relation::friends("Jack", "Alice")));
    }
}
