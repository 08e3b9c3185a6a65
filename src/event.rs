use crate::card::{DestinationCard, TrainColor};
use crate::city::CityToCity;

use serde::Serialize;

/// Public record of something that happened in the game.
///
/// The engine appends to its event log as it processes actions; the
/// embedding UI drains and renders them. Events only carry public
/// information: a hidden draw never reveals which card was drawn.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum GameEvent {
    DrewHiddenCard {
        player: usize,
    },
    DrewVisibleCard {
        player: usize,
        card: TrainColor,
        reshuffled: bool,
    },
    DrewDestinationCards {
        player: usize,
        count: usize,
    },
    KeptDestinationCards {
        player: usize,
        kept: usize,
    },
    RouteClaimed {
        player: usize,
        cities: CityToCity,
        length: u8,
        points: u8,
    },
    DestinationCompleted {
        player: usize,
        destination: DestinationCard,
        points: u8,
    },
    DestinationFailed {
        player: usize,
        destination: DestinationCard,
        points: u8,
    },
    LastTurnTriggered {
        player: usize,
    },
    TurnEnded {
        player: usize,
        turn: usize,
    },
    GameEnded {
        scores: Vec<i32>,
    },
}
