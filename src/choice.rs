use crate::card::{DestinationCard, TrainColor, NUM_DRAWN_DESTINATION_CARDS};
use crate::city::CityToCity;
use crate::error::GameError;
use crate::map::Route;

use smallvec::SmallVec;

/// The decisions an embedding UI must be able to collect from a human
/// player.
///
/// The engine itself never blocks on input: a frontend gathers choices
/// through this trait, then calls the corresponding game action. Strategies
/// cover the same decisions for AI players.
pub trait ChoiceProvider {
    /// Which of the parallel tracks between two cities to claim.
    fn pick_parallel_route(&mut self, cities: CityToCity, tracks: &[Route]) -> usize;

    /// Which color pays for a gray route, among the qualifying colors.
    fn pick_gray_color(&mut self, cities: CityToCity, qualifying: &[TrainColor]) -> TrainColor;

    /// Which of the drawn destination cards to keep (`true` keeps).
    /// At least `min_keep` entries must be true.
    fn pick_destinations(
        &mut self,
        drawn: &[DestinationCard],
        min_keep: usize,
    ) -> SmallVec<[bool; NUM_DRAWN_DESTINATION_CARDS]>;
}

/// Checks a destination keep/discard decision vector before it reaches the
/// game, so a frontend can re-prompt instead of burning the action on an
/// error.
pub fn validate_destination_selection(
    decisions: &[bool],
    drawn: usize,
    min_keep: usize,
) -> Result<(), GameError> {
    if decisions.len() != drawn {
        return Err(GameError::DestinationDecisionMismatch {
            submitted: decisions.len(),
            drawn,
        });
    }

    let kept = decisions.iter().filter(|kept| **kept).count();
    if kept < min_keep {
        return Err(GameError::TooFewDestinationsKept { kept, min_keep });
    }

    Ok(())
}
