#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Running,
    Done,
}

/// Lazily yields every `k`-element subset of a clique, in lexicographic
/// order of the chosen positions.
///
/// Every subset of a clique is a clique, so for a clique of size `n` this
/// yields C(n, k) smaller cliques. Nothing is yielded when `k > n`.
#[derive(Debug, Clone)]
pub struct SubCliques<'a, T> {
    clique: &'a [T],
    indices: Vec<usize>,
    state: State,
}

impl<'a, T: Clone> SubCliques<'a, T> {
    pub fn new(clique: &'a [T], k: usize) -> Self {
        Self {
            clique,
            indices: (0..k).collect(),
            state: State::Start,
        }
    }

    /// Starts over from the first subset.
    pub fn restart(&mut self) {
        let k = self.indices.len();
        self.indices = (0..k).collect();
        self.state = State::Start;
    }

    /// Positions chosen by the subset returned last.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    fn current(&self) -> Vec<T> {
        self.indices.iter().map(|&i| self.clique[i].clone()).collect()
    }

    /// Moves the rightmost index that is not yet at its maximum one step
    /// forward and packs the indices after it right behind it.
    fn advance(&mut self) -> bool {
        let n = self.clique.len();
        let k = self.indices.len();
        let i = match (0..k).rev().find(|&i| self.indices[i] != i + n - k) {
            Some(i) => i,
            None => return false,
        };
        self.indices[i] += 1;
        for j in i + 1..k {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        true
    }
}

impl<'a, T: Clone> Iterator for SubCliques<'a, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            State::Start if self.indices.len() > self.clique.len() => {
                self.state = State::Done;
                None
            }
            State::Start => {
                self.state = State::Running;
                Some(self.current())
            }
            State::Running => {
                if self.advance() {
                    Some(self.current())
                } else {
                    self.state = State::Done;
                    None
                }
            }
            State::Done => None,
        }
    }
}
