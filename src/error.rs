use crate::card::TrainColor;
use crate::city::CityToCity;

use thiserror::Error;

/// Every reason the engine can refuse an action.
///
/// Deck exhaustion is deliberately *not* represented here: running out of
/// train or destination cards is a normal game situation, reported as
/// `None` or an empty draw by the relevant operation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("the game is over")]
    GameOver,

    #[error("the main action for this turn has already been used")]
    ActionAlreadyUsed,

    #[error("drawn destination cards must be selected before taking another action")]
    DestinationSelectionPending,

    #[error("no destination cards are pending selection")]
    NoPendingDestinations,

    #[error("got {submitted} destination decisions, but {drawn} cards were drawn")]
    DestinationDecisionMismatch { submitted: usize, drawn: usize },

    #[error("kept {kept} destination cards, but at least {min_keep} must be kept")]
    TooFewDestinationsKept { kept: usize, min_keep: usize },

    #[error("visible slot {slot} is out of bounds or empty")]
    InvalidVisibleSlot { slot: usize },

    #[error("a visible locomotive cannot be taken as a second draw")]
    LocomotiveOnSecondDraw,

    #[error("no route {index} exists between {} and {}", .cities.0, .cities.1)]
    NoSuchRoute { cities: CityToCity, index: usize },

    #[error("the route between {} and {} is already claimed", .cities.0, .cities.1)]
    RouteAlreadyTaken { cities: CityToCity },

    #[error("claiming needs {needed} wagons, but only {remaining} remain")]
    OutOfWagons { needed: u8, remaining: u8 },

    #[error("not enough {color} cards (with locomotives) to pay for the route")]
    InsufficientCards { color: TrainColor },

    #[error("no color in hand can pay for this gray route")]
    InsufficientCardsForGrayRoute,

    #[error("several colors could pay for this gray route; a color choice is required")]
    AmbiguousColorChoice,

    #[error("player {0} has no strategy attached")]
    NotAnAiPlayer(String),

    #[error("got {got} players, but between {min} and {max} are required")]
    InvalidPlayerCount { got: usize, min: usize, max: usize },
}
