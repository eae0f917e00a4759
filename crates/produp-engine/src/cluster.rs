//! Partitioning candidates into duplicate groups.
//!
//! Candidates are addressed by position throughout: record ids are only
//! unique within their origin collection, positions are unique per run.
//! The processed flags are owned by the sequential pass. Parallel scoring
//! only ever reads them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use produp_core::{CatalogRecord, ClusterMode, RecordKey, DEFAULT_THRESHOLD};
use rayon::prelude::*;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::master::select_master_index;
use crate::scorer::similarity;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterOptions {
    /// Minimum pairwise similarity for two records to be grouped, in `(0, 1]`.
    pub threshold: f64,
    pub mode: ClusterMode,
    /// Score pairs on the rayon pool. Results are identical either way.
    pub parallel: bool,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            mode: ClusterMode::SeedAttach,
            parallel: false,
        }
    }
}

/// Two or more records believed to be the same product.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    members: Vec<CatalogRecord>,
    similarity: f64,
    master_index: usize,
}

impl DuplicateGroup {
    /// Members in discovery order; the first is the seed.
    #[must_use]
    pub fn members(&self) -> &[CatalogRecord] {
        &self.members
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Number of members that would be removed by merging the group.
    #[must_use]
    pub fn duplicates(&self) -> usize {
        self.members.len() - 1
    }

    /// Aggregate similarity of the group, in `[0, 1]`.
    #[must_use]
    pub fn similarity(&self) -> f64 {
        self.similarity
    }

    #[must_use]
    pub fn suggested_master(&self) -> &CatalogRecord {
        &self.members[self.master_index]
    }

    /// Keep the suggested master and remove every other member.
    #[must_use]
    pub fn merge_plan(&self) -> MergePlan {
        MergePlan {
            keep: self.suggested_master().key(),
            remove: self
                .members
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != self.master_index)
                .map(|(_, member)| member.key())
                .collect(),
        }
    }
}

impl Serialize for DuplicateGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DuplicateGroup", 4)?;
        state.serialize_field("group", &self.members)?;
        state.serialize_field("count", &self.count())?;
        state.serialize_field("similarity", &self.similarity)?;
        state.serialize_field("suggestedMaster", self.suggested_master())?;
        state.end()
    }
}

/// Input for the merge capability: which record to keep and which to retire.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergePlan {
    pub keep: RecordKey,
    pub remove: Vec<RecordKey>,
}

/// A group before records are copied out and a master is chosen.
struct PendingGroup {
    positions: Vec<usize>,
    similarity: f64,
}

/// Partition `candidates` into duplicate groups.
///
/// Groups come back in the order their first member appears in
/// `candidates`. Singleton groups are never returned.
#[must_use]
pub fn build_groups(
    candidates: &[CatalogRecord],
    options: &ClusterOptions,
    now: DateTime<Utc>,
) -> Vec<DuplicateGroup> {
    let pending = match options.mode {
        ClusterMode::SeedAttach => seed_attach(candidates, options),
        ClusterMode::Connected => connected_components(candidates, options),
    };

    pending
        .into_iter()
        .filter_map(|group| finalize(candidates, group, now))
        .collect()
}

fn finalize(
    candidates: &[CatalogRecord],
    group: PendingGroup,
    now: DateTime<Utc>,
) -> Option<DuplicateGroup> {
    if group.positions.len() < 2 {
        return None;
    }

    let members: Vec<CatalogRecord> = group
        .positions
        .iter()
        .map(|&pos| candidates[pos].clone())
        .collect();
    let master_index = select_master_index(&members, now)?;

    tracing::debug!(
        seed = %members[0].key(),
        members = members.len(),
        similarity = group.similarity,
        master = %members[master_index].key(),
        "duplicate group found"
    );

    Some(DuplicateGroup {
        members,
        similarity: group.similarity,
        master_index,
    })
}

/// Each unprocessed candidate seeds a group and attaches every later
/// unprocessed candidate whose similarity to the seed meets the threshold.
fn seed_attach(candidates: &[CatalogRecord], options: &ClusterOptions) -> Vec<PendingGroup> {
    let mut processed = vec![false; candidates.len()];
    let mut groups = Vec::new();

    for seed in 0..candidates.len() {
        if processed[seed] {
            continue;
        }

        let attached = scan_from_seed(candidates, seed, &processed, options);
        processed[seed] = true;
        for &(pos, _) in &attached {
            processed[pos] = true;
        }

        if attached.is_empty() {
            continue;
        }

        let similarity = mean(attached.iter().map(|&(_, sim)| sim));
        let positions = std::iter::once(seed)
            .chain(attached.iter().map(|&(pos, _)| pos))
            .collect();
        groups.push(PendingGroup {
            positions,
            similarity,
        });
    }

    groups
}

/// Later unprocessed candidates similar enough to `seed`, in candidate order.
fn scan_from_seed(
    candidates: &[CatalogRecord],
    seed: usize,
    processed: &[bool],
    options: &ClusterOptions,
) -> Vec<(usize, f64)> {
    let seed_record = &candidates[seed];
    let threshold = options.threshold;
    let score = |pos: usize| -> Option<(usize, f64)> {
        if processed[pos] {
            return None;
        }
        let sim = similarity(seed_record, &candidates[pos]);
        (sim >= threshold).then_some((pos, sim))
    };

    let rest = seed + 1..candidates.len();
    if options.parallel {
        rest.into_par_iter().filter_map(score).collect()
    } else {
        rest.filter_map(score).collect()
    }
}

/// Connected components of the graph whose edges are pairs at or above the
/// threshold. Group similarity is the mean weight of the component's edges.
fn connected_components(
    candidates: &[CatalogRecord],
    options: &ClusterOptions,
) -> Vec<PendingGroup> {
    let n = candidates.len();
    let threshold = options.threshold;
    let edges_from = move |i: usize| {
        (i + 1..n).filter_map(move |j| {
            let sim = similarity(&candidates[i], &candidates[j]);
            (sim >= threshold).then_some((i, j, sim))
        })
    };

    let edges: Vec<(usize, usize, f64)> = if options.parallel {
        (0..n).into_par_iter().flat_map_iter(edges_from).collect()
    } else {
        (0..n).flat_map(edges_from).collect()
    };

    let mut sets = DisjointSet::new(n);
    for &(i, j, _) in &edges {
        sets.union(i, j);
    }

    let mut edge_totals: HashMap<usize, (f64, usize)> = HashMap::new();
    for &(i, _, sim) in &edges {
        let entry = edge_totals.entry(sets.find(i)).or_insert((0.0, 0));
        entry.0 += sim;
        entry.1 += 1;
    }

    // Walking positions in order makes each group's first position its
    // lowest, which also fixes group order.
    let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
    for pos in 0..n {
        let root = sets.find(pos);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            groups.push((root, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(pos);
    }

    groups
        .into_iter()
        .filter(|(_, positions)| positions.len() > 1)
        .map(|(root, positions)| {
            let similarity = edge_totals.get(&root).map_or(0.0, |&(total, count)| {
                #[allow(clippy::cast_precision_loss)]
                let count = count as f64;
                total / count
            });
            PendingGroup {
                positions,
                similarity,
            }
        })
        .collect()
}

/// Union-find over candidate positions. The root of a set is always its
/// lowest position.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[high] = low;
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
#[path = "cluster_test.rs"]
mod tests;
