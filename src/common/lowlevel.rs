use std::cmp::Ordering;

#[derive(Clone, Debug)]
pub(crate) struct LowLevelNode {
    pub(crate) position: (usize, usize),
    pub(crate) f_cost: usize,
    pub(crate) g_cost: usize, // Unit cost for moves and waits, so this is also the time step
    pub(crate) sequence: usize,
}

impl PartialEq for LowLevelNode {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl Eq for LowLevelNode {}

impl PartialOrd for LowLevelNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LowLevelNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_cost
            .cmp(&other.f_cost)
            // Earlier discovered node has higher priority
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}
