use std::collections::{HashMap, HashSet};

use crate::config::NeighborhoodConfig;
use crate::types::{NeighborhoodCandidate, PaperRecord};

/// Out-of-bibliography papers chosen for display, in selection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Neighborhood {
    candidates: Vec<NeighborhoodCandidate>,
    index: HashMap<String, usize>,
}

impl Neighborhood {
    fn from_candidates(candidates: Vec<NeighborhoodCandidate>) -> Self {
        let index = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        Self { candidates, index }
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&NeighborhoodCandidate> {
        self.index.get(id).map(|&i| &self.candidates[i])
    }

    #[cfg(test)]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NeighborhoodCandidate> {
        self.candidates.iter()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Choose referenced papers that are not part of `papers`.
///
/// A candidate's count is the number of distinct bibliography papers whose
/// reference list contains it. Candidates below `threshold` are discarded,
/// the rest are stably sorted by ascending count and the first `max_count`
/// are kept. Ties keep first-seen order.
pub fn select(papers: &[PaperRecord], threshold: usize, max_count: usize) -> Neighborhood {
    let primary: HashSet<&str> = papers.iter().map(|p| p.id.as_str()).collect();

    let mut order: Vec<NeighborhoodCandidate> = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut citers: HashSet<&str> = HashSet::new();
    for paper in papers {
        // A bibliography listing the same paper twice still cites once.
        if !citers.insert(paper.id.as_str()) {
            continue;
        }
        let mut counted_here: HashSet<&str> = HashSet::new();
        for stub in &paper.references {
            let id = stub.id.as_str();
            if primary.contains(id) || !counted_here.insert(id) {
                continue;
            }
            match seen.get(id) {
                Some(&i) => order[i].count += 1,
                None => {
                    seen.insert(id, order.len());
                    order.push(NeighborhoodCandidate {
                        id: stub.id.clone(),
                        title: stub.title.clone(),
                        count: 1,
                    });
                }
            }
        }
    }

    let mut qualifying: Vec<NeighborhoodCandidate> =
        order.into_iter().filter(|c| c.count >= threshold).collect();
    // Ascending, so the cap keeps the least-referenced qualifiers.
    qualifying.sort_by_key(|c| c.count);
    qualifying.truncate(max_count);
    Neighborhood::from_candidates(qualifying)
}

pub fn select_with(papers: &[PaperRecord], config: &NeighborhoodConfig) -> Neighborhood {
    select(papers, config.threshold, config.max_count)
}
