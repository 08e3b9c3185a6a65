use crate::card::{CardDealer, DestinationCard, TrainColor, NUM_DRAWN_DESTINATION_CARDS};
use crate::city::CityToCity;
use crate::error::GameError;
use crate::event::GameEvent;
use crate::map::{score_for_route_length, ClaimedRoute, Map};
use crate::player::Player;

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 5;

/// A player ending a claim with this many wagons or fewer triggers the
/// final round.
const LAST_TURN_WAGON_THRESHOLD: u8 = 2;

/// At least this many destination cards must be kept out of a draw.
const MIN_KEPT_DESTINATIONS: usize = 1;

/// Upper bound of strategy steps per AI turn, against misbehaving policies.
const MAX_AI_STEPS_PER_TURN: usize = 16;

/// The phases of a game.
///
/// Starts in `Playing`; a claim that leaves a player nearly out of wagons
/// (or is rejected for lack of them) moves to `LastTurn`, granting every
/// other player one final turn; final scoring moves to `Done`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Playing,
    LastTurn,
    Done,
}

/// The aggregate root: players, board, dealer, and the turn state machine.
///
/// Each turn allows one main action: drawing up to two train cards, drawing
/// (then selecting) destination cards, or claiming a route. Actions advance
/// the turn themselves once complete.
#[derive(Debug)]
pub struct Game {
    players: Vec<Player>,
    current_player_index: usize,
    map: Map,
    card_dealer: CardDealer,
    phase: GamePhase,
    turn: usize,
    last_turns_remaining: Option<usize>,
    consecutive_passes: usize,
    events: Vec<GameEvent>,
}

impl Game {
    /// Starts a game on the standard map with a fresh dealer: validates the
    /// player count (2 to 5) and deals each player their four starting train
    /// cards.
    ///
    /// # Example
    /// ```
    /// use rail_adventurer::game::Game;
    /// use rail_adventurer::player::{Player, PlayerColor};
    ///
    /// let game = Game::new(vec![
    ///     Player::new("alice", PlayerColor::Red),
    ///     Player::new("bob", PlayerColor::Blue),
    /// ])
    /// .unwrap();
    /// assert_eq!(game.current_player().train_cards().len(), 4);
    /// ```
    pub fn new(players: Vec<Player>) -> Result<Self, GameError> {
        Self::with_components(players, Map::new(), CardDealer::new())
    }

    /// Starts a game on a custom map and dealer.
    pub fn with_components(
        mut players: Vec<Player>,
        map: Map,
        mut card_dealer: CardDealer,
    ) -> Result<Self, GameError> {
        if players.len() < MIN_PLAYERS || players.len() > MAX_PLAYERS {
            return Err(GameError::InvalidPlayerCount {
                got: players.len(),
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
            });
        }

        for player in &mut players {
            player.add_train_cards(card_dealer.initial_draw());
        }

        Ok(Self {
            players,
            current_player_index: 0,
            map,
            card_dealer,
            phase: GamePhase::Playing,
            turn: 0,
            last_turns_remaining: None,
            consecutive_passes: 0,
            events: Vec::new(),
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index]
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn card_dealer(&self) -> &CardDealer {
        &self.card_dealer
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Monotonically increasing turn counter, starting at 0.
    pub fn turn(&self) -> usize {
        self.turn
    }

    /// The events accumulated so far.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Takes the accumulated events, leaving the log empty.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn ensure_turn_action_available(&self) -> Result<(), GameError> {
        if self.phase == GamePhase::Done {
            return Err(GameError::GameOver);
        }
        let player = self.current_player();
        if !player.pending_destinations().is_empty() {
            return Err(GameError::DestinationSelectionPending);
        }
        if player.action_done() {
            return Err(GameError::ActionAlreadyUsed);
        }
        Ok(())
    }

    /// Checks that the main action is still fully available, i.e. not even a
    /// partial card draw happened.
    fn ensure_whole_action_available(&self) -> Result<(), GameError> {
        self.ensure_turn_action_available()?;
        if self.current_player().cards_drawn_this_turn() > 0 {
            return Err(GameError::ActionAlreadyUsed);
        }
        Ok(())
    }

    /// Draws a card from the face-down deck into the active player's hand.
    ///
    /// `Ok(None)` means every hidden card is exhausted; nothing changes and
    /// the turn is not consumed. Otherwise the draw counts toward the two
    /// allowed this turn; the second draw (or running out of drawable cards)
    /// ends the turn.
    pub fn draw_hidden_card(&mut self) -> Result<Option<TrainColor>, GameError> {
        self.ensure_turn_action_available()?;

        let card = match self.card_dealer.draw_hidden() {
            Some(card) => card,
            None => return Ok(None),
        };

        self.consecutive_passes = 0;
        let player_id = self.current_player_index;
        let player = &mut self.players[player_id];
        player.add_train_card(card);
        player.note_card_drawn();
        self.events.push(GameEvent::DrewHiddenCard { player: player_id });

        if self.players[player_id].cards_drawn_this_turn() >= 2 || !self.card_dealer.can_draw_again()
        {
            self.players[player_id].mark_action_done();
            self.finish_turn();
        }

        Ok(Some(card))
    }

    /// Draws the card at the given visible slot into the active player's hand.
    ///
    /// A locomotive is only legal as the first draw, and taking one ends the
    /// turn immediately. Otherwise the same two-draw rule as
    /// [`Self::draw_hidden_card`] applies.
    pub fn draw_visible_card(&mut self, slot: usize) -> Result<TrainColor, GameError> {
        self.ensure_turn_action_available()?;

        let player_id = self.current_player_index;
        let is_second_draw = self.players[player_id].cards_drawn_this_turn() == 1;
        let (card, reshuffled) = self.card_dealer.draw_visible(slot, is_second_draw)?;

        self.consecutive_passes = 0;
        let player = &mut self.players[player_id];
        player.add_train_card(card);
        player.note_card_drawn();
        self.events.push(GameEvent::DrewVisibleCard {
            player: player_id,
            card,
            reshuffled,
        });

        let turn_over = card.is_locomotive()
            || self.players[player_id].cards_drawn_this_turn() >= 2
            || !self.card_dealer.can_draw_again();
        if turn_over {
            self.players[player_id].mark_action_done();
            self.finish_turn();
        }

        Ok(card)
    }

    /// Draws up to three destination cards for the active player to choose
    /// from.
    ///
    /// An empty result means the pool is exhausted; the turn is not consumed.
    /// Otherwise the drawn cards become pending, and no other action is
    /// possible until [`Self::select_destination_cards`] resolves them.
    pub fn draw_destination_cards(
        &mut self,
    ) -> Result<SmallVec<[DestinationCard; NUM_DRAWN_DESTINATION_CARDS]>, GameError> {
        self.ensure_whole_action_available()?;

        let drawn = self.card_dealer.draw_destination_cards();
        if drawn.is_empty() {
            return Ok(drawn);
        }

        let player_id = self.current_player_index;
        self.players[player_id].set_pending_destinations(drawn.clone());
        self.events.push(GameEvent::DrewDestinationCards {
            player: player_id,
            count: drawn.len(),
        });

        Ok(drawn)
    }

    /// Resolves a pending destination draw: `decisions[i]` keeps the i-th
    /// drawn card. At least one card must be kept; the rest cycle to the
    /// bottom of the pool. Ends the turn, and returns how many were kept.
    pub fn select_destination_cards(
        &mut self,
        decisions: SmallVec<[bool; NUM_DRAWN_DESTINATION_CARDS]>,
    ) -> Result<usize, GameError> {
        if self.phase == GamePhase::Done {
            return Err(GameError::GameOver);
        }

        let player_id = self.current_player_index;
        let num_pending = self.players[player_id].pending_destinations().len();
        if num_pending == 0 {
            return Err(GameError::NoPendingDestinations);
        }
        if decisions.len() != num_pending {
            return Err(GameError::DestinationDecisionMismatch {
                submitted: decisions.len(),
                drawn: num_pending,
            });
        }
        let kept = decisions.iter().filter(|kept| **kept).count();
        if kept < MIN_KEPT_DESTINATIONS {
            return Err(GameError::TooFewDestinationsKept {
                kept,
                min_keep: MIN_KEPT_DESTINATIONS,
            });
        }

        self.consecutive_passes = 0;
        let pending = self.players[player_id].take_pending_destinations();
        let mut discarded = SmallVec::new();
        for (destination, keep) in pending.into_iter().zip(decisions) {
            if keep {
                self.players[player_id].add_destination(destination);
            } else {
                discarded.push(destination);
            }
        }
        self.card_dealer.discard_destination_cards(discarded);

        self.events.push(GameEvent::KeptDestinationCards {
            player: player_id,
            kept,
        });

        // A kept card may already be connected by the existing network.
        self.maybe_complete_destinations(player_id);

        self.players[player_id].mark_action_done();
        self.finish_turn();

        Ok(kept)
    }

    /// Claims a route for the active player: the whole turn's action.
    ///
    /// Validation happens before any state changes, in a fixed order: action
    /// availability, route existence and vacancy, wagons, then cards. A
    /// claim rejected for lack of wagons still triggers the final round.
    ///
    /// `color_choice` picks the color paying for a gray route when several
    /// could; it is ignored for colored routes.
    pub fn claim_route(
        &mut self,
        cities: CityToCity,
        parallel_route_index: usize,
        color_choice: Option<TrainColor>,
    ) -> Result<ClaimedRoute, GameError> {
        self.ensure_whole_action_available()?;

        let player_id = self.current_player_index;
        let route = self
            .map
            .route(cities, parallel_route_index)
            .ok_or(GameError::NoSuchRoute {
                cities,
                index: parallel_route_index,
            })?;
        if route.claimed_by.is_some() {
            return Err(GameError::RouteAlreadyTaken { cities });
        }
        let (route_color, length) = (route.color, route.length);

        // Running dry of wagons ends the game even when the claim itself is
        // rejected.
        let remaining = self.players[player_id].remaining_wagons();
        if remaining <= length {
            self.trigger_last_turn();
            return Err(GameError::OutOfWagons {
                needed: length,
                remaining,
            });
        }

        let affordable = self.players[player_id].affordable_colors(route_color, length);
        let payment_color = match route_color {
            Some(color) => {
                if affordable.is_empty() {
                    return Err(GameError::InsufficientCards { color });
                }
                color
            }
            None => match color_choice {
                Some(choice) => {
                    if !affordable.contains(&choice) {
                        return Err(GameError::InsufficientCards { color: choice });
                    }
                    choice
                }
                None => match affordable.as_slice() {
                    [] => return Err(GameError::InsufficientCardsForGrayRoute),
                    [only] => *only,
                    _ => return Err(GameError::AmbiguousColorChoice),
                },
            },
        };

        // Validation is done; commit.
        self.consecutive_passes = 0;
        let removed = self.players[player_id].remove_cards_for_claim(payment_color, length);
        self.card_dealer.discard_train_cards(removed);

        // Safe: existence and vacancy were just checked.
        let claimed = self.map.claim_route(cities, parallel_route_index, player_id)?;

        let points = score_for_route_length(length);
        let player = &mut self.players[player_id];
        player.push_claimed_route(claimed.clone());
        player.spend_wagons(length);
        player.add_score(i32::from(points));
        self.events.push(GameEvent::RouteClaimed {
            player: player_id,
            cities: claimed.route,
            length,
            points,
        });

        self.maybe_complete_destinations(player_id);

        if self.players[player_id].remaining_wagons() <= LAST_TURN_WAGON_THRESHOLD {
            self.trigger_last_turn();
        }

        self.players[player_id].mark_action_done();
        self.finish_turn();

        Ok(claimed)
    }

    /// Awards every destination the given player's network now fulfills.
    /// Idempotent: accomplished cards leave the held pile.
    fn maybe_complete_destinations(&mut self, player_id: usize) {
        loop {
            let completed_index = self.players[player_id]
                .destinations()
                .iter()
                .position(|destination| self.map.is_destination_fulfilled(destination, player_id));

            match completed_index {
                Some(index) => {
                    let destination = self.players[player_id].accomplish_destination(index);
                    let points = destination.points;
                    self.players[player_id].add_score(i32::from(points));
                    self.events.push(GameEvent::DestinationCompleted {
                        player: player_id,
                        destination,
                        points,
                    });
                }
                None => break,
            }
        }
    }

    fn trigger_last_turn(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }

        log::debug!(
            "player {} is nearly out of wagons; final round begins",
            self.current_player_index
        );
        self.phase = GamePhase::LastTurn;
        self.last_turns_remaining = Some(self.players.len() - 1);
        self.events.push(GameEvent::LastTurnTriggered {
            player: self.current_player_index,
        });
    }

    /// Ends the active player's turn, advancing to the next player, or to
    /// final scoring once the final round is spent.
    fn finish_turn(&mut self) {
        self.events.push(GameEvent::TurnEnded {
            player: self.current_player_index,
            turn: self.turn,
        });

        if self.phase == GamePhase::LastTurn {
            match self.last_turns_remaining {
                Some(0) | None => {
                    self.finalize();
                    return;
                }
                Some(remaining) => self.last_turns_remaining = Some(remaining - 1),
            }
        }

        self.turn += 1;
        self.current_player_index = (self.current_player_index + 1) % self.players.len();
        self.players[self.current_player_index].begin_turn();
    }

    /// Final scoring: every still-held destination is re-checked once, and
    /// either awarded or penalized by its points.
    fn finalize(&mut self) {
        self.phase = GamePhase::Done;

        for player_id in 0..self.players.len() {
            self.maybe_complete_destinations(player_id);

            for destination in self.players[player_id].destinations().to_vec() {
                let points = destination.points;
                self.players[player_id].add_score(-i32::from(points));
                self.events.push(GameEvent::DestinationFailed {
                    player: player_id,
                    destination,
                    points,
                });
            }
        }

        let scores = self.players.iter().map(|player| player.score()).collect();
        log::info!("game over; final scores: {:?}", scores);
        self.events.push(GameEvent::GameEnded { scores });
    }

    /// Plays out the active player's whole turn with their attached
    /// strategy, applying moves until the turn passes to the next player or
    /// the game ends.
    ///
    /// Errors if the active player has no strategy. A turn with no possible
    /// move is forfeited.
    pub fn play_ai_turn<R: Rng>(&mut self, rng: &mut R) -> Result<(), GameError> {
        if self.phase == GamePhase::Done {
            return Err(GameError::GameOver);
        }

        let strategy = self
            .current_player()
            .strategy()
            .ok_or_else(|| GameError::NotAnAiPlayer(self.current_player().name().to_string()))?;

        let starting_turn = self.turn;
        for _ in 0..MAX_AI_STEPS_PER_TURN {
            if self.phase == GamePhase::Done || self.turn != starting_turn {
                return Ok(());
            }

            match strategy.choose_move(self, rng) {
                Some(crate::ai::Move::DrawHiddenCard) => {
                    self.draw_hidden_card()?;
                }
                Some(crate::ai::Move::DrawVisibleCard { slot }) => {
                    self.draw_visible_card(slot)?;
                }
                Some(crate::ai::Move::DrawDestinations) => {
                    let drawn = self.draw_destination_cards()?;
                    if drawn.is_empty() {
                        // Pool exhausted after the strategy looked; forfeit.
                        self.current_player_forfeits();
                        return Ok(());
                    }
                    // AI players keep everything they draw.
                    let decisions = smallvec::smallvec![true; drawn.len()];
                    self.select_destination_cards(decisions)?;
                }
                Some(crate::ai::Move::ClaimRoute {
                    cities,
                    parallel_route_index,
                    color_choice,
                }) => match self.claim_route(cities, parallel_route_index, color_choice) {
                    Ok(_) => {}
                    // The claim may surface the wagon shortage; the turn is
                    // forfeited and the final round is already under way.
                    Err(GameError::OutOfWagons { .. }) => {
                        self.current_player_forfeits();
                        return Ok(());
                    }
                    Err(err) => return Err(err),
                },
                None => {
                    self.current_player_forfeits();
                    return Ok(());
                }
            }
        }

        // Step cap reached; fail safe by forfeiting the rest of the turn.
        if self.phase != GamePhase::Done && self.turn == starting_turn {
            self.current_player_forfeits();
        }
        Ok(())
    }

    fn current_player_forfeits(&mut self) {
        log::trace!("player {} passes", self.current_player_index);
        self.players[self.current_player_index].mark_action_done();
        self.consecutive_passes += 1;

        // A full round of passes means nobody can act anymore; score what
        // stands instead of cycling turns forever.
        if self.consecutive_passes >= self.players.len() {
            self.events.push(GameEvent::TurnEnded {
                player: self.current_player_index,
                turn: self.turn,
            });
            self.finalize();
            return;
        }

        self.finish_turn();
    }

    /// Mutable accessor to the card dealer.
    ///
    /// Should only be used for testing!
    pub fn get_mut_card_dealer(&mut self) -> &mut CardDealer {
        &mut self.card_dealer
    }

    /// Mutable accessor to the players.
    ///
    /// Should only be used for testing!
    pub fn get_mut_players(&mut self) -> &mut [Player] {
        &mut self.players
    }

    /// Mutable accessor to the map.
    ///
    /// Should only be used for testing!
    pub fn get_mut_map(&mut self) -> &mut Map {
        &mut self.map
    }
}
