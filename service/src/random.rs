use mockall::automock;

/// Source of randomness for the optimistic slot-race simulation. Behind a
/// trait so tests can pin the roll and a real backend can swap the whole
/// check for a conditional write.
#[automock]
pub trait RandomService {
    /// Uniform roll in `[0, 1)`.
    fn roll(&self, usage: &str) -> f64;
}
