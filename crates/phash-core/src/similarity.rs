//! Near-duplicate grouping by Hamming distance.
//!
//! Two images are linked when their hashes are within the threshold; groups
//! are the connected components of that relation, so membership is transitive.

use crate::types::{DuplicateGroup, HashedImage};

/// Group records whose perceptual hashes are within `threshold` bits.
///
/// Singletons are omitted. Groups are ordered by their first path, and files
/// inside a group are sorted by path.
pub fn group_near_duplicates(records: &[HashedImage], threshold: u32) -> Vec<DuplicateGroup> {
    let mut sets = DisjointSet::new(records.len());
    for i in 0..records.len() {
        for j in (i + 1)..records.len() {
            if records[i].phash.is_similar(records[j].phash, threshold) {
                sets.union(i, j);
            }
        }
    }

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    for i in 0..records.len() {
        let root = sets.find(i);
        members[root].push(i);
    }

    let mut groups: Vec<DuplicateGroup> = members
        .into_iter()
        .filter(|m| m.len() > 1)
        .map(|mut m| {
            m.sort_by(|a, b| records[*a].file_path.cmp(&records[*b].file_path));
            let mut max_distance = 0;
            for (pos, &a) in m.iter().enumerate() {
                for &b in &m[pos + 1..] {
                    max_distance = max_distance.max(records[a].phash.distance(records[b].phash));
                }
            }
            DuplicateGroup {
                files: m.iter().map(|&i| records[i].file_path.clone()).collect(),
                hashes: m.iter().map(|&i| records[i].phash).collect(),
                max_distance,
            }
        })
        .collect();

    groups.sort_by(|a, b| a.files[0].cmp(&b.files[0]));
    tracing::debug!(
        "Found {} near-duplicate group(s) among {} image(s)",
        groups.len(),
        records.len()
    );
    groups
}

/// Union-find with path halving and union by size.
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
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
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}
