//! Trait definitions shared by the GA operators.
//!
//! Selection and replacement only need to compare and inspect individuals,
//! so they are written against [`Individual`] rather than [`Solution`].

use crate::solution::Solution;

/// Marker trait for fitness values.
///
/// Lower fitness is considered better (minimization).
pub trait Fitness: PartialOrd + Copy + std::fmt::Debug + 'static {}

impl Fitness for f64 {}

/// A member of the GA population.
pub trait Individual: Clone {
    /// The fitness type. Must implement [`Fitness`].
    type Fitness: Fitness;

    /// Penalized fitness used for ranking and tournaments.
    fn fitness(&self) -> Self::Fitness;

    /// Raw objective, used to detect repeated individuals.
    fn objective(&self) -> usize;

    /// Whether the individual changed since the last evaluation step.
    fn is_modified(&self) -> bool;

    fn set_modified(&mut self, modified: bool);
}

impl Individual for Solution {
    type Fitness = f64;

    fn fitness(&self) -> f64 {
        self.penalized_fitness()
    }

    fn objective(&self) -> usize {
        Solution::objective(self)
    }

    fn is_modified(&self) -> bool {
        Solution::is_modified(self)
    }

    fn set_modified(&mut self, modified: bool) {
        Solution::set_modified(self, modified);
    }
}
