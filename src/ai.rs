use crate::card::{TrainColor, NUM_DRAWN_DESTINATION_CARDS};
use crate::city::CityToCity;
use crate::game::{Game, GamePhase};
use crate::map::Route;
use crate::player::Player;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A single decision the active player could take.
///
/// Strategies produce moves; only the turn machine applies them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Move {
    DrawHiddenCard,
    DrawVisibleCard {
        slot: usize,
    },
    DrawDestinations,
    ClaimRoute {
        cities: CityToCity,
        parallel_route_index: usize,
        color_choice: Option<TrainColor>,
    },
}

/// The decision policies an AI player can follow.
///
/// Both are pure functions of the game view: they never mutate, and all
/// randomness comes through the caller's `Rng`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Picks uniformly among the legal moves.
    Random,
    /// Works toward its destinations along shortest paths, drawing cards
    /// until the next needed route is affordable.
    ShortestPath,
}

/// For a gray route, the color the payment defaults to; colored routes
/// need no choice.
fn default_color_choice(player: &Player, route: &Route) -> Option<TrainColor> {
    if route.color.is_some() {
        return None;
    }

    player
        .affordable_colors(None, route.length)
        .first()
        .copied()
}

/// Whether the active player could claim this track right now.
fn is_claimable(player: &Player, route: &Route) -> bool {
    route.claimed_by.is_none()
        && player.remaining_wagons() > route.length
        && !player
            .affordable_colors(route.color, route.length)
            .is_empty()
}

/// Every move the active player may legally take, in deterministic order:
/// hidden draw, visible draws by slot, destination draw, then claims in map
/// order.
///
/// After a first card draw, only draw moves remain; a visible locomotive is
/// excluded on a second draw.
pub fn legal_moves(game: &Game) -> Vec<Move> {
    let mut moves = Vec::new();
    if game.phase() == GamePhase::Done {
        return moves;
    }

    let player = game.current_player();
    if player.action_done() || !player.pending_destinations().is_empty() {
        return moves;
    }
    let is_second_draw = player.cards_drawn_this_turn() == 1;

    if game.card_dealer().num_hidden_cards() > 0 {
        moves.push(Move::DrawHiddenCard);
    }
    for (slot, card) in game.card_dealer().visible_slots().iter().enumerate() {
        match card {
            Some(card) if is_second_draw && card.is_locomotive() => {}
            Some(_) => moves.push(Move::DrawVisibleCard { slot }),
            None => {}
        }
    }

    if is_second_draw {
        return moves;
    }

    if game.card_dealer().num_destination_cards() >= NUM_DRAWN_DESTINATION_CARDS {
        moves.push(Move::DrawDestinations);
    }

    for (cities, parallel_route_index, route) in game.map().iter_routes() {
        if is_claimable(player, route) {
            moves.push(Move::ClaimRoute {
                cities,
                parallel_route_index,
                color_choice: default_color_choice(player, route),
            });
        }
    }

    moves
}

impl Strategy {
    /// Decides the active player's next move, or `None` if no move is
    /// possible (in which case the turn is forfeited).
    ///
    /// Regardless of policy, a player holding no destination cards draws
    /// destinations first, as long as the pool offers a full draw.
    pub fn choose_move<R: Rng>(&self, game: &Game, rng: &mut R) -> Option<Move> {
        let player = game.current_player();

        // Finish a started card draw before anything else.
        if player.cards_drawn_this_turn() > 0 {
            return self.choose_draw(game, rng);
        }

        if player.destinations().is_empty()
            && player.accomplished_destinations().is_empty()
            && game.card_dealer().num_destination_cards() >= NUM_DRAWN_DESTINATION_CARDS
        {
            return Some(Move::DrawDestinations);
        }

        match self {
            Strategy::Random => legal_moves(game).choose(rng).copied(),
            Strategy::ShortestPath => self
                .claim_toward_destinations(game)
                .or_else(|| self.choose_draw(game, rng)),
        }
    }

    fn choose_draw<R: Rng>(&self, game: &Game, rng: &mut R) -> Option<Move> {
        let draws: Vec<Move> = legal_moves(game)
            .into_iter()
            .filter(|m| {
                matches!(m, Move::DrawHiddenCard | Move::DrawVisibleCard { .. })
            })
            .collect();

        match self {
            Strategy::Random => draws.choose(rng).copied(),
            // Directed play prefers the hidden deck; the visible display is
            // a fallback once the deck runs dry.
            Strategy::ShortestPath => draws
                .iter()
                .find(|m| **m == Move::DrawHiddenCard)
                .or_else(|| draws.first())
                .copied(),
        }
    }

    /// The first claimable track along a shortest path toward any held
    /// destination.
    fn claim_toward_destinations(&self, game: &Game) -> Option<Move> {
        let player = game.current_player();
        let player_id = game.current_player_index();
        let map = game.map();

        for destination in player.destinations() {
            for (start, end) in destination.legs() {
                let (path, _) = map.shortest_path(start, end);

                for cities in path {
                    let tracks = map.routes_between(cities);
                    if tracks
                        .iter()
                        .any(|route| route.claimed_by == Some(player_id))
                    {
                        continue;
                    }

                    if let Some((parallel_route_index, route)) = tracks
                        .iter()
                        .enumerate()
                        .find(|(_, route)| is_claimable(player, route))
                    {
                        return Some(Move::ClaimRoute {
                            cities,
                            parallel_route_index,
                            color_choice: default_color_choice(player, route),
                        });
                    }

                    // Blocked or unaffordable edges are skipped: a later
                    // edge of the same path may still be open.
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardDealer;
    use crate::city::City;
    use crate::destination_card;
    use crate::map::Map;
    use crate::player::PlayerColor;

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use smallvec::smallvec;

    fn two_bot_game(strategy: Strategy) -> Game {
        Game::new(vec![
            Player::new_ai("a", PlayerColor::Red, strategy),
            Player::new_ai("b", PlayerColor::Blue, strategy),
        ])
        .unwrap()
    }

    #[test]
    fn legal_moves_start_of_turn() {
        let game = two_bot_game(Strategy::Random);
        let moves = legal_moves(&game);

        assert!(moves.contains(&Move::DrawHiddenCard));
        assert!(moves.contains(&Move::DrawDestinations));
        // All five visible slots are filled at game start.
        for slot in 0..5 {
            assert!(moves.contains(&Move::DrawVisibleCard { slot }));
        }
    }

    #[test]
    fn legal_claims_respect_hand_and_wagons() {
        let game = two_bot_game(Strategy::Random);
        let player = game.current_player();

        for m in legal_moves(&game) {
            if let Move::ClaimRoute {
                cities,
                parallel_route_index,
                color_choice,
            } = m
            {
                let route = game.map().route(cities, parallel_route_index).unwrap();
                assert!(route.claimed_by.is_none());
                assert!(player.remaining_wagons() > route.length);
                let color = route.color.or(color_choice).unwrap();
                assert!(player.can_afford(color, route.length));
            }
        }
    }

    #[test]
    fn second_draw_offers_only_non_locomotive_draws() {
        let mut game = two_bot_game(Strategy::Random);
        game.get_mut_card_dealer().get_mut_visible_slots()[0] = Some(TrainColor::Locomotive);
        game.draw_hidden_card().unwrap();

        let moves = legal_moves(&game);
        assert!(!moves.is_empty());
        for m in &moves {
            match m {
                Move::DrawHiddenCard => {}
                Move::DrawVisibleCard { slot } => {
                    assert_ne!(*slot, 0);
                }
                other => panic!("unexpected move after a first draw: {:?}", other),
            }
        }
    }

    #[test]
    fn strategies_draw_destinations_when_holding_none() {
        let mut rng = StdRng::seed_from_u64(7);

        for strategy in [Strategy::Random, Strategy::ShortestPath] {
            let game = two_bot_game(strategy);
            assert_eq!(
                strategy.choose_move(&game, &mut rng),
                Some(Move::DrawDestinations)
            );
        }
    }

    #[test]
    fn random_strategy_picks_a_legal_move() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut game = two_bot_game(Strategy::Random);
        // Hold a destination so the mandatory pre-step does not kick in.
        game.get_mut_players()[0].add_destination(destination_card! {City::Denver, City::ElPaso => 4});

        let legal = legal_moves(&game);
        for _ in 0..20 {
            let chosen = Strategy::Random.choose_move(&game, &mut rng).unwrap();
            assert!(legal.contains(&chosen));
        }
    }

    #[test]
    fn shortest_path_strategy_claims_along_its_destination() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut game = two_bot_game(Strategy::ShortestPath);
        game.get_mut_players()[0]
            .add_destination(destination_card! {City::Atlanta, City::Nashville => 4});
        // A gray route of length 1; any single card pays for it.
        game.get_mut_players()[0].add_train_cards([TrainColor::Green]);

        let chosen = Strategy::ShortestPath.choose_move(&game, &mut rng).unwrap();
        match chosen {
            Move::ClaimRoute {
                cities,
                color_choice,
                ..
            } => {
                assert_eq!(cities, (City::Atlanta, City::Nashville));
                assert!(color_choice.is_some());
            }
            other => panic!("expected a claim, got {:?}", other),
        }
    }

    #[test]
    fn shortest_path_strategy_skips_blocked_edges() {
        let mut rng = StdRng::seed_from_u64(11);
        // A two-hop board: Atlanta - Charleston - Miami.
        let mut map = Map::with_routes([
            (
                (City::Atlanta, City::Charleston),
                smallvec![Route::new(None, 2)],
            ),
            (
                (City::Charleston, City::Miami),
                smallvec![Route::new(None, 2)],
            ),
        ]);
        // The opponent holds the first edge of the path.
        map.claim_route((City::Atlanta, City::Charleston), 0, 1)
            .unwrap();

        let mut game = Game::with_components(
            vec![
                Player::new_ai("a", PlayerColor::Red, Strategy::ShortestPath),
                Player::new_ai("b", PlayerColor::Blue, Strategy::ShortestPath),
            ],
            map,
            CardDealer::new(),
        )
        .unwrap();
        game.get_mut_players()[0]
            .add_destination(destination_card! {City::Atlanta, City::Miami => 6});
        game.get_mut_players()[0].add_train_cards([TrainColor::Green, TrainColor::Green]);

        // The blocked first edge is skipped in favor of the still-open
        // second one, rather than falling back to drawing cards.
        let chosen = Strategy::ShortestPath.choose_move(&game, &mut rng).unwrap();
        match chosen {
            Move::ClaimRoute { cities, .. } => {
                assert_eq!(cities, (City::Charleston, City::Miami));
            }
            other => panic!("expected a claim, got {:?}", other),
        }
    }

    #[test]
    fn shortest_path_strategy_draws_when_route_unaffordable() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut game = two_bot_game(Strategy::ShortestPath);
        // Seattle - New York is far; the starting hand rarely covers the
        // first needed route.
        game.get_mut_players()[0]
            .add_destination(destination_card! {City::Seattle, City::NewYork => 22});

        let chosen = Strategy::ShortestPath.choose_move(&game, &mut rng).unwrap();
        match chosen {
            Move::ClaimRoute { cities, .. } => {
                // If the starting hand happens to afford a path edge, it
                // must lie between the two endpoints' shortest path.
                let (path, _) = game.map().shortest_path(City::Seattle, City::NewYork);
                assert!(path.contains(&cities));
            }
            Move::DrawHiddenCard => {}
            other => panic!("unexpected move: {:?}", other),
        }
    }

    #[test]
    fn strategy_to_json() -> serde_json::Result<()> {
        assert_eq!(serde_json::to_string(&Strategy::Random)?, r#""random""#);
        assert_eq!(
            serde_json::to_string(&Strategy::ShortestPath)?,
            r#""shortest_path""#
        );
        Ok(())
    }
}
