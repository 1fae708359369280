pub mod participation;
pub mod results;
pub mod tally;
pub mod winner;

pub use participation::ParticipationStats;
pub use results::{calculate_results, ElectionResults};
pub use tally::{tally_votes, DanglingVote, TallyResult};
pub use winner::{resolve_position, PositionOutcome};

/// `part` as a percentage of `whole`, rounded to two decimal places.
/// Zero when `whole` is zero.
pub fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::percentage;

    #[test]
    fn percentage_rounds_to_two_places() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(5, 8), 62.5);
    }

    #[test]
    fn percentage_of_nothing_is_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 0), 0.0);
    }
}
