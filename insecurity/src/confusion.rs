use crate::{attribution::ClassSaliency, common::*, config::ExtractionConfig};

/// Unordered pair of distinct candidate slots, stored as `first < second`.
///
/// A slot indexes the candidate class list of one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassPair {
    first: usize,
    second: usize,
}

impl ClassPair {
    /// Returns `None` for a degenerate pair of equal slots.
    pub fn new(lhs: usize, rhs: usize) -> Option<Self> {
        match lhs.cmp(&rhs) {
            Ordering::Less => Some(Self {
                first: lhs,
                second: rhs,
            }),
            Ordering::Greater => Some(Self {
                first: rhs,
                second: lhs,
            }),
            Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn second(&self) -> usize {
        self.second
    }

    /// Resolves the slots to class indices in slot order.
    pub fn classes(&self, candidates: &[i64]) -> Result<(i64, i64)> {
        let lookup = |slot: usize| {
            candidates.get(slot).copied().ok_or_else(|| {
                format_err!(
                    "candidate slot {} is out of range for {} candidates",
                    slot,
                    candidates.len()
                )
            })
        };
        Ok((lookup(self.first)?, lookup(self.second)?))
    }
}

impl Display for ClassPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// Collects the candidate pairs that rank among the top slots anywhere on
/// the attribution grid.
#[derive(Debug, Clone)]
pub struct ConfusionPairEnumerator {
    top_k: usize,
}

impl ConfusionPairEnumerator {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        ensure!(
            config.top_k >= 2,
            "top_k must be at least 2 to form pairs, but get {}",
            config.top_k
        );
        Ok(Self {
            top_k: config.top_k,
        })
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Per-pixel top slots sorted by slot index, shape `(H, W, top_k)`.
    ///
    /// Slots are ranked ascending by saliency, and equal values keep the
    /// lower slot lower in the ranking.
    pub fn rank(&self, maps: &ClassSaliency) -> Result<Array3<usize>> {
        let num_candidates = maps.num_candidates();
        ensure!(
            self.top_k <= num_candidates,
            "top_k {} exceeds the number of candidate classes {}",
            self.top_k,
            num_candidates
        );

        let (h, w) = maps.dim();
        let mut ranking = Array3::zeros((h, w, self.top_k));

        maps.maps()
            .lanes(Axis(2))
            .into_iter()
            .zip(ranking.lanes_mut(Axis(2)))
            .for_each(|(values, mut top)| {
                let mut slots: Vec<usize> = (0..num_candidates).collect();
                slots.sort_by(|&lhs, &rhs| values[lhs].total_cmp(&values[rhs]));

                let mut kept = slots.split_off(num_candidates - self.top_k);
                kept.sort_unstable();
                top.iter_mut().zip(kept).for_each(|(dst, slot)| *dst = slot);
            });

        Ok(ranking)
    }

    /// Distinct pairs over all pixels and rank-position pairs, ordered.
    pub fn enumerate(&self, ranking: &Array3<usize>) -> Vec<ClassPair> {
        let pairs: BTreeSet<_> = ranking
            .lanes(Axis(2))
            .into_iter()
            .flat_map(|slots| {
                slots
                    .iter()
                    .copied()
                    .tuple_combinations()
                    .filter_map(|(lhs, rhs)| ClassPair::new(lhs, rhs))
                    .collect_vec()
            })
            .collect();
        pairs.into_iter().collect()
    }

    pub fn pairs(&self, maps: &ClassSaliency) -> Result<Vec<ClassPair>> {
        let ranking = self.rank(maps)?;
        Ok(self.enumerate(&ranking))
    }
}
