use crate::ai::Strategy;
use crate::card::{DestinationCard, TrainColor, NUM_DRAWN_DESTINATION_CARDS};
use crate::map::ClaimedRoute;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// How many wagons each player starts the game with.
pub const NUM_STARTING_WAGONS: u8 = 45;

/// Represents the different colors a player can embody.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayerColor {
    Black,
    Blue,
    Green,
    Orange,
    Pink,
    Red,
    White,
    Yellow,
}

/// Everything a single player owns: hand, destinations, claimed routes,
/// wagons, score, and per-turn bookkeeping.
///
/// The hand preserves insertion order; paying for a route consumes matching
/// colors first, then locomotives, each in hand order, so the discarded
/// cards are deterministic.
#[derive(Debug, Serialize)]
pub struct Player {
    name: String,
    color: PlayerColor,
    train_cards: Vec<TrainColor>,
    destinations: Vec<DestinationCard>,
    accomplished_destinations: Vec<DestinationCard>,
    pending_destinations: SmallVec<[DestinationCard; NUM_DRAWN_DESTINATION_CARDS]>,
    claimed_routes: Vec<ClaimedRoute>,
    remaining_wagons: u8,
    score: i32,
    action_done: bool,
    cards_drawn_this_turn: u8,
    strategy: Option<Strategy>,
}

impl Player {
    /// Creates a human-controlled player.
    pub fn new(name: impl Into<String>, color: PlayerColor) -> Self {
        Self {
            name: name.into(),
            color,
            train_cards: Vec::new(),
            destinations: Vec::new(),
            accomplished_destinations: Vec::new(),
            pending_destinations: SmallVec::new(),
            claimed_routes: Vec::new(),
            remaining_wagons: NUM_STARTING_WAGONS,
            score: 0,
            action_done: false,
            cards_drawn_this_turn: 0,
            strategy: None,
        }
    }

    /// Creates a player driven by the given strategy.
    pub fn new_ai(name: impl Into<String>, color: PlayerColor, strategy: Strategy) -> Self {
        Self {
            strategy: Some(strategy),
            ..Self::new(name, color)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> PlayerColor {
        self.color
    }

    /// The player's hand, in draw order.
    pub fn train_cards(&self) -> &[TrainColor] {
        &self.train_cards
    }

    /// Destinations held but not yet accomplished.
    pub fn destinations(&self) -> &[DestinationCard] {
        &self.destinations
    }

    pub fn accomplished_destinations(&self) -> &[DestinationCard] {
        &self.accomplished_destinations
    }

    /// Destinations drawn this turn, awaiting a keep/discard decision.
    pub fn pending_destinations(&self) -> &[DestinationCard] {
        &self.pending_destinations
    }

    pub fn claimed_routes(&self) -> &[ClaimedRoute] {
        &self.claimed_routes
    }

    pub fn remaining_wagons(&self) -> u8 {
        self.remaining_wagons
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    /// Whether this turn's main action has been spent.
    pub fn action_done(&self) -> bool {
        self.action_done
    }

    pub fn cards_drawn_this_turn(&self) -> u8 {
        self.cards_drawn_this_turn
    }

    pub fn strategy(&self) -> Option<Strategy> {
        self.strategy
    }

    pub fn is_ai(&self) -> bool {
        self.strategy.is_some()
    }

    /// How many cards of the given color the player holds.
    pub fn count_color(&self, color: TrainColor) -> usize {
        self.train_cards.iter().filter(|c| **c == color).count()
    }

    /// Whether `count(color) + locomotives` covers the given length.
    pub fn can_afford(&self, color: TrainColor, length: u8) -> bool {
        self.count_color(color) + self.count_color(TrainColor::Locomotive) >= usize::from(length)
    }

    /// The colors that could pay for a route of the given color and length,
    /// in the canonical `TrainColor` declaration order.
    ///
    /// For a gray route (`route_color` is `None`), every plain color whose
    /// count plus locomotives covers the length qualifies; for a colored
    /// route, only that color can qualify.
    pub fn affordable_colors(
        &self,
        route_color: Option<TrainColor>,
        length: u8,
    ) -> SmallVec<[TrainColor; 8]> {
        match route_color {
            Some(color) => {
                if self.can_afford(color, length) {
                    SmallVec::from_slice(&[color])
                } else {
                    SmallVec::new()
                }
            }
            None => TrainColor::iter()
                .filter(|color| color.is_not_locomotive())
                .filter(|color| self.can_afford(*color, length))
                .collect(),
        }
    }

    pub(crate) fn begin_turn(&mut self) {
        self.action_done = false;
        self.cards_drawn_this_turn = 0;
    }

    pub(crate) fn note_card_drawn(&mut self) {
        self.cards_drawn_this_turn += 1;
    }

    pub(crate) fn mark_action_done(&mut self) {
        self.action_done = true;
    }

    pub(crate) fn add_train_card(&mut self, card: TrainColor) {
        self.train_cards.push(card);
    }

    pub(crate) fn add_train_cards(&mut self, cards: impl IntoIterator<Item = TrainColor>) {
        self.train_cards.extend(cards);
    }

    /// Removes `length` cards paying with the given color: matching colors
    /// first, then locomotives, each in hand order. Returns the removed
    /// cards in removal order.
    ///
    /// The caller must have checked affordability beforehand.
    pub(crate) fn remove_cards_for_claim(
        &mut self,
        color: TrainColor,
        length: u8,
    ) -> Vec<TrainColor> {
        let mut removed = Vec::with_capacity(usize::from(length));
        let mut remaining = usize::from(length);

        for pass_color in [color, TrainColor::Locomotive] {
            let mut i = 0;
            while i < self.train_cards.len() && remaining > 0 {
                if self.train_cards[i] == pass_color {
                    removed.push(self.train_cards.remove(i));
                    remaining -= 1;
                } else {
                    i += 1;
                }
            }
            if remaining == 0 {
                break;
            }
        }

        removed
    }

    pub(crate) fn set_pending_destinations(
        &mut self,
        destinations: SmallVec<[DestinationCard; NUM_DRAWN_DESTINATION_CARDS]>,
    ) {
        self.pending_destinations = destinations;
    }

    pub(crate) fn take_pending_destinations(
        &mut self,
    ) -> SmallVec<[DestinationCard; NUM_DRAWN_DESTINATION_CARDS]> {
        std::mem::take(&mut self.pending_destinations)
    }

    pub(crate) fn add_destination(&mut self, destination: DestinationCard) {
        self.destinations.push(destination);
    }

    /// Moves the destination at `index` to the accomplished pile.
    pub(crate) fn accomplish_destination(&mut self, index: usize) -> DestinationCard {
        let destination = self.destinations.remove(index);
        self.accomplished_destinations.push(destination.clone());
        destination
    }

    pub(crate) fn add_score(&mut self, points: i32) {
        self.score += points;
    }

    pub(crate) fn spend_wagons(&mut self, count: u8) {
        self.remaining_wagons -= count;
    }

    pub(crate) fn push_claimed_route(&mut self, claimed_route: ClaimedRoute) {
        self.claimed_routes.push(claimed_route);
    }
}
