
/// Overlap tallies for one unordered pair of sets
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PairwiseOverlap {
    /// Label of the first set, in session insertion order
    first_label: String,
    /// Label of the second set
    second_label: String,
    /// Keys found only in the first set
    only_first: usize,
    /// Keys found only in the second set
    only_second: usize,
    /// Keys found in both sets
    shared: usize
}

impl PairwiseOverlap {
    /// Constructor
    pub fn new(first_label: String, second_label: String, only_first: usize, only_second: usize, shared: usize) -> Self {
        Self {
            first_label, second_label,
            only_first, only_second, shared
        }
    }

    /// Size of the pair's intersection
    pub fn intersection_count(&self) -> usize {
        self.shared
    }

    /// Size of the pair's union
    pub fn union_count(&self) -> usize {
        self.only_first + self.only_second + self.shared
    }

    /// Jaccard similarity, |intersection| / |union|; two empty sets score 0.0 by convention
    pub fn jaccard(&self) -> f64 {
        let union = self.union_count();
        if union > 0 {
            self.shared as f64 / union as f64
        } else {
            0.0
        }
    }

    // getters
    pub fn first_label(&self) -> &str {
        &self.first_label
    }

    pub fn second_label(&self) -> &str {
        &self.second_label
    }

    pub fn only_first(&self) -> usize {
        self.only_first
    }

    pub fn only_second(&self) -> usize {
        self.only_second
    }

    pub fn shared(&self) -> usize {
        self.shared
    }
}

/// One exclusive region of the set partition: keys belonging to exactly these member sets
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegionCount {
    /// Labels of the member sets, in session insertion order
    labels: Vec<String>,
    /// Number of keys falling in exactly this membership combination
    count: usize
}

impl RegionCount {
    /// Constructor
    pub fn new(labels: Vec<String>, count: usize) -> Self {
        Self {
            labels, count
        }
    }

    // getters
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// Full overlap picture over all loaded sets
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlapResult {
    /// One entry per unordered pair, enumerated in session insertion order
    pairwise: Vec<PairwiseOverlap>,
    /// Exclusive membership regions; populated for two sets (3 regions) or three sets (7 regions)
    partition: Vec<RegionCount>
}

impl OverlapResult {
    /// Constructor
    pub fn new(pairwise: Vec<PairwiseOverlap>, partition: Vec<RegionCount>) -> Self {
        Self {
            pairwise, partition
        }
    }

    // getters
    pub fn pairwise(&self) -> &[PairwiseOverlap] {
        &self.pairwise
    }

    pub fn partition(&self) -> &[RegionCount] {
        &self.partition
    }
}
