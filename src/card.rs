use crate::city::{City, CityToCity};
use crate::error::GameError;

use array_init::array_init;
use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::iter::repeat;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// How many train cards are openly displayed at a time.
pub const NUM_VISIBLE_SLOTS: usize = 5;
/// How many destination cards a draw offers.
pub const NUM_DRAWN_DESTINATION_CARDS: usize = 3;

const NUM_LOCOMOTIVE_CARDS: usize = 14;
const NUM_CARDS_PER_COLOR: usize = 12;
const LOCOMOTIVE_DISPLAY_LIMIT: usize = 3;
const NUM_INITIAL_TRAIN_CARDS: usize = 4;

/// Represents the different variants of train cards.
///
/// The declaration order of the plain colors is the canonical color
/// priority used whenever a single color must be picked deterministically
/// (e.g. paying for a gray route without an explicit choice).
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrainColor {
    Black,
    Blue,
    Green,
    Orange,
    Pink,
    Red,
    White,
    Yellow,
    /// The wildcard: matches with any color.
    Locomotive,
}

impl TrainColor {
    /// Whether the current card is a locomotive, i.e. matches with any color.
    ///
    /// # Examples:
    /// ```
    /// use rail_adventurer::card::TrainColor;
    ///
    /// assert!(!TrainColor::Black.is_locomotive());
    /// assert!(TrainColor::Locomotive.is_locomotive());
    /// ```
    #[inline]
    pub fn is_locomotive(&self) -> bool {
        *self == TrainColor::Locomotive
    }

    /// The opposite of `is_locomotive`.
    #[inline]
    pub fn is_not_locomotive(&self) -> bool {
        !self.is_locomotive()
    }
}

/// Encapsulates information about a destination card.
///
/// The cities form an ordered chain: a classic card connects two cities,
/// but longer chains are supported, in which case every consecutive pair
/// must be connected to fulfill the card.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DestinationCard {
    /// The chain of cities (at least two) to connect.
    pub cities: SmallVec<[City; 2]>,
    /// How many points are granted once this card is fulfilled.
    /// If not fulfilled by the end of the game, the same amount is
    /// subtracted instead.
    pub points: u8,
}

impl DestinationCard {
    /// Iterates over the consecutive city pairs of the chain.
    pub fn legs(&self) -> impl Iterator<Item = CityToCity> + '_ {
        self.cities.windows(2).map(|leg| (leg[0], leg[1]))
    }
}

/// Convenience macro to generate a destination card.
#[macro_export]
macro_rules! destination_card {
    ($($city:expr),+ => $points:literal) => {
        $crate::card::DestinationCard {
            cities: smallvec::smallvec![$($city),+],
            points: $points,
        }
    };
}

/// Serializable public summary of the dealer, for UIs.
///
/// Deck contents stay hidden; only the visible display and deck sizes
/// are exposed.
#[derive(Serialize)]
pub struct CardDealerView<'a> {
    visible_slots: &'a [Option<TrainColor>],
    deck_size: usize,
    discard_size: usize,
    destination_deck_size: usize,
}

/// Entity in charge of dealing as well as shuffling destination and train cards.
#[derive(Debug)]
pub struct CardDealer {
    visible_slots: [Option<TrainColor>; NUM_VISIBLE_SLOTS],
    deck: Vec<TrainColor>,
    discard: Vec<TrainColor>,
    destination_deck: VecDeque<DestinationCard>,
}

impl CardDealer {
    /// Creates a new `CardDealer`, which starts with all decks shuffled and in a
    /// valid state: five visible cards, under the locomotive display limit (3).
    ///
    /// # Example
    /// ```
    /// use rail_adventurer::card::CardDealer;
    ///
    /// let card_dealer = CardDealer::new();
    /// ```
    pub fn new() -> Self {
        Self::with_destination_cards(Self::generate_destination_cards())
    }

    /// Creates a `CardDealer` with a custom destination card pool.
    ///
    /// The train card decks are the standard 110 cards either way.
    pub fn with_destination_cards(destination_cards: Vec<DestinationCard>) -> Self {
        let mut deck = Vec::with_capacity(110);

        for color in TrainColor::iter() {
            let num_cards = if color.is_locomotive() {
                NUM_LOCOMOTIVE_CARDS
            } else {
                NUM_CARDS_PER_COLOR
            };
            deck.extend(repeat(color).take(num_cards));
        }

        deck.shuffle(&mut thread_rng());

        let mut destination_deck = destination_cards;
        destination_deck.shuffle(&mut thread_rng());

        let mut new_card_dealer = Self {
            visible_slots: [None; NUM_VISIBLE_SLOTS],
            deck,
            discard: Vec::new(),
            destination_deck: VecDeque::from(destination_deck),
        };

        for slot in 0..NUM_VISIBLE_SLOTS {
            new_card_dealer.visible_slots[slot] = new_card_dealer.draw_hidden();
        }
        new_card_dealer.maybe_reshuffle_visible_slots();

        new_card_dealer
    }

    fn generate_destination_cards() -> Vec<DestinationCard> {
        vec![
            destination_card! {City::Boston, City::Miami => 12},
            destination_card! {City::Calgary, City::Phoenix => 13},
            destination_card! {City::Calgary, City::SaltLakeCity => 7},
            destination_card! {City::Chicago, City::NewOrleans => 7},
            destination_card! {City::Chicago, City::SantaFe => 9},
            destination_card! {City::Dallas, City::NewYork => 11},
            destination_card! {City::Denver, City::ElPaso => 4},
            destination_card! {City::Denver, City::Pittsburgh => 11},
            destination_card! {City::Duluth, City::ElPaso => 10},
            destination_card! {City::Duluth, City::Houston => 8},
            destination_card! {City::Helena, City::LosAngeles => 8},
            destination_card! {City::KansasCity, City::Houston => 5},
            destination_card! {City::LosAngeles, City::Chicago => 16},
            destination_card! {City::LosAngeles, City::Miami => 20},
            destination_card! {City::LosAngeles, City::NewYork => 21},
            destination_card! {City::Montreal, City::Atlanta => 9},
            destination_card! {City::Montreal, City::NewOrleans => 13},
            destination_card! {City::NewYork, City::Atlanta => 6},
            destination_card! {City::Portland, City::Nashville => 17},
            destination_card! {City::Portland, City::Phoenix => 11},
            destination_card! {City::SanFrancisco, City::Atlanta => 17},
            destination_card! {City::SaultStMarie, City::Nashville => 8},
            destination_card! {City::SaultStMarie, City::OklahomaCity => 9},
            destination_card! {City::Seattle, City::LosAngeles => 9},
            destination_card! {City::Seattle, City::NewYork => 22},
            destination_card! {City::Toronto, City::Miami => 10},
            destination_card! {City::Vancouver, City::Montreal => 20},
            destination_card! {City::Vancouver, City::SantaFe => 13},
            destination_card! {City::Winnipeg, City::Houston => 12},
            destination_card! {City::Winnipeg, City::LittleRock => 11},
        ]
    }

    fn should_reshuffle_visible_slots(&self) -> bool {
        let mut num_visible_locomotives = 0;
        let mut num_non_locomotives = 0;
        for card in self.visible_slots.iter().flatten() {
            if card.is_locomotive() {
                num_visible_locomotives += 1;
            } else {
                num_non_locomotives += 1;
            }
        }

        if num_visible_locomotives < LOCOMOTIVE_DISPLAY_LIMIT {
            return false;
        }

        // Only reshuffle if at least 3 non-locomotive cards exist across all
        // decks. If we did not verify that, we could end up reshuffling ad
        // infinitum.
        for deck in [&self.deck, &self.discard] {
            for card in deck {
                if card.is_not_locomotive() {
                    num_non_locomotives += 1;

                    if num_non_locomotives >= LOCOMOTIVE_DISPLAY_LIMIT {
                        return true;
                    }
                }
            }
        }

        false
    }

    fn maybe_reshuffle_visible_slots(&mut self) -> bool {
        if !self.should_reshuffle_visible_slots() {
            return false;
        }

        log::debug!("three locomotives are visible; reshuffling the display");

        // Return the whole display to the deck, shuffle, and refill.
        self.deck
            .extend(self.visible_slots.iter_mut().filter_map(|slot| slot.take()));
        self.deck.shuffle(&mut thread_rng());

        for slot in 0..NUM_VISIBLE_SLOTS {
            self.visible_slots[slot] = self.draw_hidden();
        }

        // The refilled display may again show three or more locomotives.
        self.maybe_reshuffle_visible_slots();

        true
    }

    /// Draws from the top of the face-down deck, and returns the card.
    ///
    /// Returns `None` only once both the deck and the discard pile are empty:
    /// whenever the deck empties while discarded cards exist, the discard pile
    /// is shuffled and becomes the new deck.
    ///
    /// # Example
    /// ```
    /// use rail_adventurer::card::CardDealer;
    ///
    /// let mut card_dealer = CardDealer::new();
    /// assert!(card_dealer.draw_hidden().is_some());
    /// ```
    pub fn draw_hidden(&mut self) -> Option<TrainColor> {
        let card = self.deck.pop()?;
        self.maybe_recycle_discard_pile();

        Some(card)
    }

    /// Draws the train card at the given visible slot.
    ///
    /// A locomotive can only be taken when `is_second_draw` is false; taking
    /// one is worth a whole turn.
    ///
    /// The emptied slot is refilled from the top of the deck (possibly to an
    /// empty slot, if no cards are left anywhere), after which the
    /// three-locomotive display rule re-runs. Returns the drawn card, plus
    /// whether the display had to be reshuffled upon refilling it.
    ///
    /// Errors if the slot is out of bounds or empty, or on a locomotive
    /// during a second draw.
    ///
    /// # Example
    /// ```
    /// use rail_adventurer::card::CardDealer;
    ///
    /// let mut card_dealer = CardDealer::new();
    ///
    /// assert!(card_dealer.draw_visible(5, false).is_err());
    /// assert!(card_dealer.draw_visible(2, false).is_ok());
    /// ```
    pub fn draw_visible(
        &mut self,
        slot: usize,
        is_second_draw: bool,
    ) -> Result<(TrainColor, bool), GameError> {
        let card = self.peek_at_visible_slot(slot)?;

        if is_second_draw && card.is_locomotive() {
            return Err(GameError::LocomotiveOnSecondDraw);
        }

        self.visible_slots[slot] = self.draw_hidden();

        Ok((card, self.maybe_reshuffle_visible_slots()))
    }

    /// Draws up to three destination cards from the top of the destination deck.
    ///
    /// If fewer than three are left, returns what is left; if the deck is
    /// empty, the result is empty. Exhaustion is not an error.
    ///
    /// # Example
    /// ```
    /// use rail_adventurer::card::CardDealer;
    ///
    /// let mut card_dealer = CardDealer::new();
    ///
    /// let drawn = card_dealer.draw_destination_cards();
    /// assert_eq!(drawn.len(), 3);
    /// ```
    pub fn draw_destination_cards(
        &mut self,
    ) -> SmallVec<[DestinationCard; NUM_DRAWN_DESTINATION_CARDS]> {
        let mut drawn_destination_cards = SmallVec::new();

        for _ in 0..NUM_DRAWN_DESTINATION_CARDS {
            match self.destination_deck.pop_back() {
                Some(destination_card) => drawn_destination_cards.push(destination_card),
                None => break,
            }
        }

        drawn_destination_cards
    }

    /// Deals the four train cards each player starts the game with.
    pub fn initial_draw(&mut self) -> [TrainColor; NUM_INITIAL_TRAIN_CARDS] {
        // Note that it is safe to unwrap here, as initial draws cannot fail
        // considering the number of cards we start with, and the maximum
        // number of players.
        array_init(|_| self.draw_hidden().unwrap())
    }

    /// Adds the given train cards to the discard pile.
    ///
    /// If the face-down deck is empty, the discard pile is shuffled and
    /// becomes the new deck.
    pub fn discard_train_cards(&mut self, train_cards: Vec<TrainColor>) {
        // Insertion order in the discard pile does not matter.
        self.discard.extend(train_cards);

        self.maybe_recycle_discard_pile();
    }

    /// Adds the given destination cards to the bottom of the destination deck.
    ///
    /// If players go through all the undiscarded destination cards, they will
    /// cycle through the discarded ones.
    pub fn discard_destination_cards(
        &mut self,
        destination_cards: SmallVec<[DestinationCard; NUM_DRAWN_DESTINATION_CARDS]>,
    ) {
        for destination_card in destination_cards {
            self.destination_deck.push_front(destination_card);
        }
    }

    #[inline]
    fn maybe_recycle_discard_pile(&mut self) {
        if !self.deck.is_empty() || self.discard.is_empty() {
            return;
        }

        log::debug!(
            "recycling {} discarded train cards into the deck",
            self.discard.len()
        );

        self.discard.shuffle(&mut thread_rng());
        std::mem::swap(&mut self.deck, &mut self.discard);
    }

    #[inline]
    fn peek_at_visible_slot(&self, slot: usize) -> Result<TrainColor, GameError> {
        self.visible_slots
            .get(slot)
            .copied()
            .flatten()
            .ok_or(GameError::InvalidVisibleSlot { slot })
    }

    /// Whether a player who already drew once this turn could draw again.
    ///
    /// This is separate from the rule of not being allowed to take a visible
    /// locomotive on a second draw: if no cards are left in any deck, or the
    /// only cards left are visible locomotives, the turn terminates early.
    #[inline]
    pub fn can_draw_again(&self) -> bool {
        !self.deck.is_empty()
            || !self.discard.is_empty()
            || self
                .visible_slots
                .iter()
                .flatten()
                .any(|card| card.is_not_locomotive())
    }

    /// Whether any train card remains to be drawn, hidden or visible.
    #[inline]
    pub fn has_train_cards(&self) -> bool {
        !self.deck.is_empty()
            || !self.discard.is_empty()
            || self.visible_slots.iter().any(|slot| slot.is_some())
    }

    /// The number of destination cards left in the pool.
    #[inline]
    pub fn num_destination_cards(&self) -> usize {
        self.destination_deck.len()
    }

    /// The number of face-down cards left, counting the discard pile that
    /// would be recycled into the deck.
    #[inline]
    pub fn num_hidden_cards(&self) -> usize {
        self.deck.len() + self.discard.len()
    }

    /// Read-only view of the visible display.
    #[inline]
    pub fn visible_slots(&self) -> &[Option<TrainColor>; NUM_VISIBLE_SLOTS] {
        &self.visible_slots
    }

    /// Serializable public summary of the dealer.
    pub fn view(&self) -> CardDealerView {
        CardDealerView {
            visible_slots: &self.visible_slots,
            deck_size: self.deck.len(),
            discard_size: self.discard.len(),
            destination_deck_size: self.destination_deck.len(),
        }
    }

    /// Mutable accessor to the visible display.
    ///
    /// Should only be used for testing!
    pub fn get_mut_visible_slots(&mut self) -> &mut [Option<TrainColor>; NUM_VISIBLE_SLOTS] {
        &mut self.visible_slots
    }

    /// Accessor to the face-down deck.
    ///
    /// Should only be used for testing!
    pub fn get_deck(&self) -> &Vec<TrainColor> {
        &self.deck
    }

    /// Mutable accessor to the face-down deck.
    ///
    /// Should only be used for testing!
    pub fn get_mut_deck(&mut self) -> &mut Vec<TrainColor> {
        &mut self.deck
    }

    /// Accessor to the discard pile.
    ///
    /// Should only be used for testing!
    pub fn get_discard_pile(&self) -> &Vec<TrainColor> {
        &self.discard
    }

    /// Mutable accessor to the destination deck.
    ///
    /// Should only be used for testing!
    pub fn get_mut_destination_deck(&mut self) -> &mut VecDeque<DestinationCard> {
        &mut self.destination_deck
    }
}

impl Default for CardDealer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    // Tests for `TrainColor`.

    #[test]
    fn train_color_to_string() {
        assert_eq!(TrainColor::Orange.to_string(), "orange");
        assert_eq!(TrainColor::Locomotive.to_string(), "locomotive");
    }

    #[test]
    fn train_color_to_json() -> serde_json::Result<()> {
        assert_eq!(serde_json::to_string(&TrainColor::Blue)?, r#""blue""#);
        assert_eq!(
            serde_json::to_string(&TrainColor::Locomotive)?,
            r#""locomotive""#
        );
        Ok(())
    }

    #[test]
    fn json_to_train_color() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::from_str::<TrainColor>(r#""green""#)?,
            TrainColor::Green
        );

        Ok(())
    }

    #[test]
    fn invalid_json_to_train_color() {
        assert!(serde_json::from_str::<TrainColor>(r#""turquoise""#).is_err());
    }

    // Tests for `DestinationCard`.

    #[test]
    fn destination_card_pair_legs() {
        let card = destination_card! {City::Boston, City::Miami => 12};
        assert_eq!(
            card.legs().collect::<Vec<_>>(),
            vec![(City::Boston, City::Miami)]
        );
    }

    #[test]
    fn destination_card_chain_legs() {
        let card = destination_card! {City::Seattle, City::Helena, City::Denver => 18};
        assert_eq!(
            card.legs().collect::<Vec<_>>(),
            vec![(City::Seattle, City::Helena), (City::Helena, City::Denver)]
        );
    }

    // Tests for `CardDealer`.

    #[test]
    fn new_card_dealer() {
        let card_dealer = CardDealer::new();

        assert!(card_dealer.visible_slots.iter().all(|slot| slot.is_some()));
        assert!(
            card_dealer
                .visible_slots
                .iter()
                .flatten()
                .filter(|color| color.is_locomotive())
                .count()
                < LOCOMOTIVE_DISPLAY_LIMIT
        );

        // 110 cards total, minus 5 in the visible display.
        assert_eq!(card_dealer.deck.len() + card_dealer.discard.len(), 105);
        assert_eq!(card_dealer.destination_deck.len(), 30);

        let mut num_train_cards_per_color = HashMap::new();

        for card in card_dealer.visible_slots.iter().flatten() {
            *num_train_cards_per_color.entry(*card).or_insert(0) += 1;
        }
        for deck in [&card_dealer.deck, &card_dealer.discard] {
            for card in deck {
                *num_train_cards_per_color.entry(*card).or_insert(0) += 1;
            }
        }

        for color in TrainColor::iter() {
            let expected_num = if color.is_locomotive() {
                NUM_LOCOMOTIVE_CARDS
            } else {
                NUM_CARDS_PER_COLOR
            };
            assert_eq!(num_train_cards_per_color[&color], expected_num);
        }
    }

    #[test]
    fn new_card_dealer_different_every_time() {
        // With 110 cards (12 cards for the 8 colors, and 14 locomotives),
        // there is technically a 110! / (12!^8 * 14!) chance of generating
        // the same deck twice.
        let first_card_dealer = CardDealer::new();
        let second_card_dealer = CardDealer::new();

        assert_ne!(first_card_dealer.deck, second_card_dealer.deck);
        assert_ne!(
            first_card_dealer.destination_deck,
            second_card_dealer.destination_deck
        );
    }

    #[test]
    fn card_dealer_should_reshuffle_visible() {
        let mut card_dealer = CardDealer::new();
        card_dealer.visible_slots = [
            Some(TrainColor::Locomotive),
            Some(TrainColor::Red),
            Some(TrainColor::Black),
            Some(TrainColor::Locomotive),
            Some(TrainColor::Locomotive),
        ];
        card_dealer.deck = vec![
            TrainColor::Red,
            TrainColor::Orange,
            TrainColor::Black,
            TrainColor::Green,
            TrainColor::Blue,
        ];
        card_dealer.discard.clear();

        assert!(card_dealer.maybe_reshuffle_visible_slots());
        assert!(card_dealer.visible_slots.iter().all(|slot| slot.is_some()));
        assert!(
            card_dealer
                .visible_slots
                .iter()
                .flatten()
                .filter(|color| color.is_locomotive())
                .count()
                < LOCOMOTIVE_DISPLAY_LIMIT
        );

        // No cards enter or leave the dealer during a reshuffle.
        let total = card_dealer.visible_slots.iter().flatten().count()
            + card_dealer.deck.len()
            + card_dealer.discard.len();
        assert_eq!(total, 10);
    }

    #[test]
    fn card_dealer_should_not_reshuffle_if_under_locomotive_limit() {
        let mut card_dealer = CardDealer::new();
        let visible_slots = [
            Some(TrainColor::Blue),
            Some(TrainColor::Red),
            Some(TrainColor::Black),
            Some(TrainColor::Locomotive),
            Some(TrainColor::Locomotive),
        ];
        card_dealer.visible_slots = visible_slots;

        assert!(!card_dealer.maybe_reshuffle_visible_slots());
        assert_eq!(card_dealer.visible_slots, visible_slots);
    }

    #[test]
    fn card_dealer_should_not_reshuffle_if_not_enough_non_locomotives_left() {
        let mut card_dealer = CardDealer::new();
        let visible_slots = [
            Some(TrainColor::Locomotive),
            None,
            Some(TrainColor::Black),
            Some(TrainColor::Locomotive),
            Some(TrainColor::Locomotive),
        ];
        card_dealer.visible_slots = visible_slots;
        card_dealer.deck.clear();
        card_dealer.discard.clear();

        assert!(!card_dealer.maybe_reshuffle_visible_slots());
        assert_eq!(card_dealer.visible_slots, visible_slots);
    }

    #[test]
    fn card_dealer_draw_hidden() {
        let mut card_dealer = CardDealer::new();
        let expected_card = card_dealer.deck.last().cloned();
        assert_eq!(card_dealer.draw_hidden(), expected_card);

        card_dealer.deck = vec![TrainColor::Blue];
        card_dealer.discard = vec![TrainColor::Red];

        assert_eq!(card_dealer.draw_hidden(), Some(TrainColor::Blue));
        assert!(card_dealer.discard.is_empty());
        assert_eq!(card_dealer.draw_hidden(), Some(TrainColor::Red));
        assert_eq!(card_dealer.draw_hidden(), None);
    }

    #[test]
    fn card_dealer_draw_visible_err() {
        let mut card_dealer = CardDealer::new();
        card_dealer.visible_slots = [
            Some(TrainColor::Blue),
            None,
            Some(TrainColor::Black),
            Some(TrainColor::Locomotive),
            Some(TrainColor::Locomotive),
        ];

        assert_eq!(
            card_dealer.draw_visible(1, false),
            Err(GameError::InvalidVisibleSlot { slot: 1 })
        );
        assert_eq!(
            card_dealer.draw_visible(6, false),
            Err(GameError::InvalidVisibleSlot { slot: 6 })
        );
    }

    #[test]
    fn card_dealer_draw_visible_locomotive() {
        let mut card_dealer = CardDealer::new();
        card_dealer.visible_slots = [
            Some(TrainColor::Blue),
            None,
            Some(TrainColor::Black),
            Some(TrainColor::Locomotive),
            Some(TrainColor::Locomotive),
        ];

        assert_eq!(
            card_dealer.draw_visible(3, false),
            Ok((TrainColor::Locomotive, false))
        );

        // The 4th slot also holds a locomotive, which is rejected on a
        // second draw.
        assert_eq!(
            card_dealer.draw_visible(4, true),
            Err(GameError::LocomotiveOnSecondDraw)
        );
    }

    #[test]
    fn card_dealer_draw_visible_empty_deck() {
        let mut card_dealer = CardDealer::new();
        card_dealer.visible_slots = [
            Some(TrainColor::White),
            None,
            Some(TrainColor::Black),
            Some(TrainColor::Locomotive),
            Some(TrainColor::Locomotive),
        ];
        card_dealer.deck.clear();
        card_dealer.discard.clear();

        assert_eq!(
            card_dealer.draw_visible(0, false),
            Ok((TrainColor::White, false))
        );
        assert!(card_dealer.visible_slots[0].is_none());
    }

    #[test]
    fn card_dealer_draw_visible_triggers_reshuffle() {
        let mut card_dealer = CardDealer::new();
        card_dealer.visible_slots = [
            Some(TrainColor::White),
            Some(TrainColor::Red),
            Some(TrainColor::Black),
            Some(TrainColor::Locomotive),
            Some(TrainColor::Locomotive),
        ];
        card_dealer.deck = vec![
            TrainColor::Blue,
            TrainColor::Blue,
            TrainColor::Blue,
            TrainColor::Blue,
            TrainColor::Blue,
            TrainColor::Locomotive,
        ];
        card_dealer.discard.clear();

        // Replacing the white card with the deck's top locomotive puts three
        // locomotives on display, which forces a reshuffle.
        let (card, reshuffled) = card_dealer.draw_visible(0, false).unwrap();
        assert_eq!(card, TrainColor::White);
        assert!(reshuffled);
        assert!(
            card_dealer
                .visible_slots
                .iter()
                .flatten()
                .filter(|color| color.is_locomotive())
                .count()
                < LOCOMOTIVE_DISPLAY_LIMIT
        );
    }

    #[test]
    fn card_dealer_discard_train_cards_with_non_empty_deck() {
        let mut card_dealer = CardDealer::new();
        let discarded = vec![TrainColor::Yellow];
        let deck = vec![TrainColor::Pink];
        card_dealer.deck = deck.clone();
        card_dealer.discard.clear();

        card_dealer.discard_train_cards(discarded.clone());
        assert_eq!(card_dealer.deck, deck);
        assert_eq!(card_dealer.discard, discarded);
    }

    #[test]
    fn card_dealer_discard_train_cards_with_empty_deck() {
        let mut card_dealer = CardDealer::new();
        let discarded = vec![TrainColor::Yellow];
        card_dealer.deck.clear();
        card_dealer.discard.clear();

        card_dealer.discard_train_cards(discarded.clone());
        assert_eq!(card_dealer.deck, discarded);
        assert!(card_dealer.discard.is_empty());
    }

    #[test]
    fn card_dealer_draw_destination_cards() {
        let mut card_dealer = CardDealer::new();
        assert_eq!(card_dealer.destination_deck.len(), 30);
        let expected: SmallVec<[_; NUM_DRAWN_DESTINATION_CARDS]> = card_dealer
            .destination_deck
            .iter()
            .skip(27)
            .rev()
            .cloned()
            .collect();

        assert_eq!(card_dealer.draw_destination_cards(), expected);
        assert_eq!(card_dealer.destination_deck.len(), 27);
    }

    #[test]
    fn card_dealer_draw_destination_cards_cycles_discards() {
        let mut card_dealer = CardDealer::new();
        let only_destination_card = destination_card! {City::Boston, City::Montreal => 5};
        card_dealer.destination_deck = VecDeque::from([only_destination_card.clone()]);

        let discarded: SmallVec<[DestinationCard; 3]> = smallvec::smallvec![
            destination_card! {City::Duluth, City::Vancouver => 15},
            destination_card! {City::LosAngeles, City::ElPaso => 6},
        ];
        card_dealer.discard_destination_cards(discarded.clone());

        let drawn = card_dealer.draw_destination_cards();
        assert_eq!(
            drawn.as_slice(),
            [
                only_destination_card,
                discarded[0].clone(),
                discarded[1].clone()
            ]
        );
    }

    #[test]
    fn card_dealer_draw_destination_cards_partial() {
        let mut card_dealer = CardDealer::new();
        let only_destination_card = destination_card! {City::Boston, City::Montreal => 5};
        card_dealer.destination_deck = VecDeque::from([only_destination_card.clone()]);

        assert_eq!(
            card_dealer.draw_destination_cards().as_slice(),
            [only_destination_card]
        );
    }

    #[test]
    fn card_dealer_draw_destination_cards_empty() {
        let mut card_dealer = CardDealer::new();
        card_dealer.destination_deck.clear();

        assert!(card_dealer.draw_destination_cards().is_empty());
    }

    #[test]
    fn card_dealer_initial_draw() {
        let mut card_dealer = CardDealer::new();
        let expected: Vec<_> = card_dealer
            .deck
            .iter()
            .rev()
            .take(NUM_INITIAL_TRAIN_CARDS)
            .cloned()
            .collect();

        assert_eq!(card_dealer.initial_draw().to_vec(), expected);
    }

    #[test]
    fn card_dealer_can_draw_again() {
        let mut card_dealer = CardDealer::new();
        assert!(card_dealer.can_draw_again());

        card_dealer.deck.clear();
        card_dealer.discard.clear();
        card_dealer.visible_slots = [
            Some(TrainColor::Locomotive),
            Some(TrainColor::Locomotive),
            None,
            None,
            None,
        ];
        assert!(!card_dealer.can_draw_again());
        assert!(card_dealer.has_train_cards());

        card_dealer.visible_slots[1] = Some(TrainColor::Green);
        assert!(card_dealer.can_draw_again());

        card_dealer.visible_slots = [None; NUM_VISIBLE_SLOTS];
        assert!(!card_dealer.has_train_cards());
    }
}
