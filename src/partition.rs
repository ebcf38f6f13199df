//! Partitioner: the courier-keyed fragmentation rule.
//!
//! A static predicate split, not a hash or range partition. Skew between
//! the two fragments is expected; courier volume is uneven in this domain.

use crate::model::{CourierName, Rider};

/// The three fragments produced by one partitioning pass.
///
/// `full` is the entire dataset in source order; `group_a` holds rows whose
/// courier equals the pivot and `group_b` the rest. Every row of `full`
/// appears in exactly one of the two groups.
#[derive(Debug, Clone)]
pub struct Partitions {
    pub full: Vec<Rider>,
    pub group_a: Vec<Rider>,
    pub group_b: Vec<Rider>,
}

/// Split the dataset on courier identity equality with the pivot.
pub fn partition(riders: Vec<Rider>, pivot: CourierName) -> Partitions {
    let mut group_a = Vec::new();
    let mut group_b = Vec::new();

    for rider in &riders {
        if rider.courier_name == pivot.as_str() {
            group_a.push(rider.clone());
        } else {
            group_b.push(rider.clone());
        }
    }

    Partitions {
        full: riders,
        group_a,
        group_b,
    }
}
