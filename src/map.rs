use crate::card::{DestinationCard, TrainColor};
use crate::city::{City, CityToCity};
use crate::error::GameError;

use serde::Serialize;
use smallvec::{smallvec, SmallVec};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, VecDeque};
use strum::EnumCount;

/// How many points claiming a route of the given length is worth.
///
/// Lengths outside the standard table score their own length.
pub fn score_for_route_length(length: u8) -> u8 {
    match length {
        1 => 1,
        2 => 2,
        3 => 4,
        4 => 7,
        5 => 10,
        6 => 15,
        _ => length,
    }
}

/// A single track between two adjacent cities.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    /// The color of cards required to claim this route.
    /// `None` is a gray route: any single color (plus locomotives) pays for it.
    pub color: Option<TrainColor>,
    /// How many wagons (and cards) claiming this route costs.
    pub length: u8,
    /// Index of the player who claimed this route, if any.
    pub claimed_by: Option<usize>,
}

impl Route {
    pub fn new(color: Option<TrainColor>, length: u8) -> Self {
        Self {
            color,
            length,
            claimed_by: None,
        }
    }
}

/// A route successfully claimed by a player.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClaimedRoute {
    pub route: CityToCity,
    pub parallel_route_index: usize,
    pub length: u8,
}

/// Convenience macro to generate a track of the built-in map.
macro_rules! route {
    (gray, $length:literal) => {
        Route::new(None, $length)
    };
    ($color:ident, $length:literal) => {
        Route::new(Some(TrainColor::$color), $length)
    };
}

/// The board: every city pair that is directly connected, with one or two
/// parallel tracks each.
///
/// Routes are stored once per unordered city pair, under a normalized
/// `(min, max)` key; lookups accept the pair in either order.
#[derive(Debug)]
pub struct Map {
    routes: BTreeMap<CityToCity, SmallVec<[Route; 2]>>,
}

impl Map {
    /// Creates the standard US map.
    ///
    /// # Example
    /// ```
    /// use rail_adventurer::map::Map;
    ///
    /// let map = Map::new();
    /// ```
    pub fn new() -> Self {
        let mut map = Self {
            routes: BTreeMap::new(),
        };

        {
            let mut add = |a: City, b: City, tracks: SmallVec<[Route; 2]>| {
                map.routes.insert(Self::normalize((a, b)), tracks);
            };

            use City::*;
            add(Atlanta, Charleston, smallvec![route!(gray, 2)]);
            add(Atlanta, Miami, smallvec![route!(Blue, 5)]);
            add(Atlanta, Nashville, smallvec![route!(gray, 1)]);
            add(Atlanta, NewOrleans, smallvec![route!(Yellow, 4), route!(Orange, 4)]);
            add(Atlanta, Raleigh, smallvec![route!(gray, 2), route!(gray, 2)]);
            add(Boston, Montreal, smallvec![route!(gray, 2), route!(gray, 2)]);
            add(Boston, NewYork, smallvec![route!(Yellow, 2), route!(Red, 2)]);
            add(Calgary, Helena, smallvec![route!(gray, 4)]);
            add(Calgary, Seattle, smallvec![route!(gray, 4)]);
            add(Calgary, Vancouver, smallvec![route!(gray, 3)]);
            add(Calgary, Winnipeg, smallvec![route!(White, 6)]);
            add(Charleston, Miami, smallvec![route!(Pink, 4)]);
            add(Charleston, Raleigh, smallvec![route!(gray, 2)]);
            add(Chicago, Duluth, smallvec![route!(Red, 3)]);
            add(Chicago, Omaha, smallvec![route!(Blue, 4)]);
            add(Chicago, Pittsburgh, smallvec![route!(Orange, 3), route!(Black, 3)]);
            add(Chicago, SaintLouis, smallvec![route!(Green, 2), route!(White, 2)]);
            add(Chicago, Toronto, smallvec![route!(White, 4)]);
            add(Dallas, ElPaso, smallvec![route!(Red, 4)]);
            add(Dallas, Houston, smallvec![route!(gray, 1), route!(gray, 1)]);
            add(Dallas, LittleRock, smallvec![route!(gray, 2)]);
            add(Dallas, OklahomaCity, smallvec![route!(gray, 2), route!(gray, 2)]);
            add(Denver, Helena, smallvec![route!(Green, 4)]);
            add(Denver, KansasCity, smallvec![route!(Black, 4), route!(Orange, 4)]);
            add(Denver, OklahomaCity, smallvec![route!(Red, 4)]);
            add(Denver, Omaha, smallvec![route!(Pink, 4)]);
            add(Denver, Phoenix, smallvec![route!(White, 5)]);
            add(Denver, SaltLakeCity, smallvec![route!(Red, 3), route!(Yellow, 3)]);
            add(Denver, SantaFe, smallvec![route!(gray, 2)]);
            add(Duluth, Helena, smallvec![route!(Orange, 6)]);
            add(Duluth, Omaha, smallvec![route!(gray, 2), route!(gray, 2)]);
            add(Duluth, SaultStMarie, smallvec![route!(gray, 3)]);
            add(Duluth, Toronto, smallvec![route!(Pink, 6)]);
            add(Duluth, Winnipeg, smallvec![route!(Black, 4)]);
            add(ElPaso, Houston, smallvec![route!(Green, 6)]);
            add(ElPaso, LosAngeles, smallvec![route!(Black, 6)]);
            add(ElPaso, OklahomaCity, smallvec![route!(Yellow, 5)]);
            add(ElPaso, Phoenix, smallvec![route!(gray, 3)]);
            add(ElPaso, SantaFe, smallvec![route!(gray, 2)]);
            add(Helena, Omaha, smallvec![route!(Red, 5)]);
            add(Helena, SaltLakeCity, smallvec![route!(Pink, 3)]);
            add(Helena, Seattle, smallvec![route!(Yellow, 6)]);
            add(Helena, Winnipeg, smallvec![route!(Blue, 4)]);
            add(Houston, NewOrleans, smallvec![route!(gray, 2)]);
            add(KansasCity, OklahomaCity, smallvec![route!(gray, 2), route!(gray, 2)]);
            add(KansasCity, Omaha, smallvec![route!(gray, 1), route!(gray, 1)]);
            add(KansasCity, SaintLouis, smallvec![route!(Blue, 2), route!(Pink, 2)]);
            add(LasVegas, LosAngeles, smallvec![route!(gray, 2)]);
            add(LasVegas, SaltLakeCity, smallvec![route!(Orange, 3)]);
            add(LittleRock, Nashville, smallvec![route!(White, 3)]);
            add(LittleRock, NewOrleans, smallvec![route!(Green, 3)]);
            add(LittleRock, OklahomaCity, smallvec![route!(gray, 2)]);
            add(LittleRock, SaintLouis, smallvec![route!(gray, 2)]);
            add(LosAngeles, Phoenix, smallvec![route!(gray, 3)]);
            add(LosAngeles, SanFrancisco, smallvec![route!(Yellow, 3), route!(Pink, 3)]);
            add(Miami, NewOrleans, smallvec![route!(Red, 6)]);
            add(Montreal, NewYork, smallvec![route!(Blue, 3)]);
            add(Montreal, SaultStMarie, smallvec![route!(Black, 5)]);
            add(Montreal, Toronto, smallvec![route!(gray, 3)]);
            add(Nashville, Pittsburgh, smallvec![route!(Yellow, 4)]);
            add(Nashville, Raleigh, smallvec![route!(Black, 3)]);
            add(Nashville, SaintLouis, smallvec![route!(gray, 2)]);
            add(NewYork, Pittsburgh, smallvec![route!(White, 2), route!(Green, 2)]);
            add(NewYork, Washington, smallvec![route!(Orange, 2), route!(Black, 2)]);
            add(Phoenix, SantaFe, smallvec![route!(gray, 3)]);
            add(Pittsburgh, Raleigh, smallvec![route!(gray, 2)]);
            add(Pittsburgh, SaintLouis, smallvec![route!(Green, 5)]);
            add(Pittsburgh, Toronto, smallvec![route!(gray, 2)]);
            add(Pittsburgh, Washington, smallvec![route!(gray, 2)]);
            add(Portland, SaltLakeCity, smallvec![route!(Blue, 6)]);
            add(Portland, SanFrancisco, smallvec![route!(Green, 5), route!(Pink, 5)]);
            add(Portland, Seattle, smallvec![route!(gray, 1), route!(gray, 1)]);
            add(Raleigh, Washington, smallvec![route!(gray, 2), route!(gray, 2)]);
            add(SaltLakeCity, SanFrancisco, smallvec![route!(Orange, 5), route!(White, 5)]);
            add(SantaFe, OklahomaCity, smallvec![route!(Blue, 3)]);
            add(SaultStMarie, Toronto, smallvec![route!(gray, 2)]);
            add(SaultStMarie, Winnipeg, smallvec![route!(gray, 6)]);
            add(Seattle, Vancouver, smallvec![route!(gray, 1), route!(gray, 1)]);
        }

        map
    }

    /// Creates a custom map from the given route definitions.
    ///
    /// Keys are normalized, so each pair may be given in either order.
    pub fn with_routes(
        route_defs: impl IntoIterator<Item = (CityToCity, SmallVec<[Route; 2]>)>,
    ) -> Self {
        Self {
            routes: route_defs
                .into_iter()
                .map(|(cities, tracks)| (Self::normalize(cities), tracks))
                .collect(),
        }
    }

    #[inline]
    fn normalize((a, b): CityToCity) -> CityToCity {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// The parallel tracks between two cities, in either order.
    /// Empty if the cities are not adjacent.
    pub fn routes_between(&self, cities: CityToCity) -> &[Route] {
        self.routes
            .get(&Self::normalize(cities))
            .map(|tracks| tracks.as_slice())
            .unwrap_or(&[])
    }

    /// A specific track between two cities, if it exists.
    pub fn route(&self, cities: CityToCity, parallel_route_index: usize) -> Option<&Route> {
        self.routes_between(cities).get(parallel_route_index)
    }

    /// Iterates over every track of the map, with its (normalized) city pair
    /// and parallel index.
    pub fn iter_routes(&self) -> impl Iterator<Item = (CityToCity, usize, &Route)> {
        self.routes.iter().flat_map(|(&cities, tracks)| {
            tracks
                .iter()
                .enumerate()
                .map(move |(parallel_route_index, route)| (cities, parallel_route_index, route))
        })
    }

    /// Settles a claim on the given track for `player_id`.
    ///
    /// Errors if the track does not exist, or is already claimed (by anyone).
    /// Affordability is the caller's responsibility; the map only tracks
    /// ownership.
    pub fn claim_route(
        &mut self,
        cities: CityToCity,
        parallel_route_index: usize,
        player_id: usize,
    ) -> Result<ClaimedRoute, GameError> {
        let cities = Self::normalize(cities);
        let route = self
            .routes
            .get_mut(&cities)
            .and_then(|tracks| tracks.get_mut(parallel_route_index))
            .ok_or(GameError::NoSuchRoute {
                cities,
                index: parallel_route_index,
            })?;

        if route.claimed_by.is_some() {
            return Err(GameError::RouteAlreadyTaken { cities });
        }

        route.claimed_by = Some(player_id);
        log::debug!(
            "player {} claimed route {} - {} (track {})",
            player_id,
            cities.0,
            cities.1,
            parallel_route_index
        );

        Ok(ClaimedRoute {
            route: cities,
            parallel_route_index,
            length: route.length,
        })
    }

    /// Whether `player_id`'s claimed network connects every consecutive leg
    /// of the given destination card.
    ///
    /// Each leg is checked independently with a breadth-first search over the
    /// player's claimed routes only.
    pub fn is_destination_fulfilled(
        &self,
        destination_card: &DestinationCard,
        player_id: usize,
    ) -> bool {
        // Adjacency restricted to the player's network, built once and
        // shared by every leg.
        let mut adjacency: Vec<SmallVec<[City; 4]>> = vec![SmallVec::new(); City::COUNT];
        for (&(a, b), tracks) in &self.routes {
            if tracks
                .iter()
                .any(|route| route.claimed_by == Some(player_id))
            {
                adjacency[a as usize].push(b);
                adjacency[b as usize].push(a);
            }
        }

        destination_card
            .legs()
            .all(|(start, end)| Self::are_connected(&adjacency, start, end))
    }

    fn are_connected(adjacency: &[SmallVec<[City; 4]>], start: City, end: City) -> bool {
        if start == end {
            return true;
        }

        let mut visited = [false; City::COUNT];
        let mut frontier = VecDeque::from([start]);
        visited[start as usize] = true;

        while let Some(city) = frontier.pop_front() {
            for &neighbor in &adjacency[city as usize] {
                if neighbor == end {
                    return true;
                }
                if !visited[neighbor as usize] {
                    visited[neighbor as usize] = true;
                    frontier.push_back(neighbor);
                }
            }
        }

        false
    }

    /// Shortest path between two cities over *all* routes, claimed or not,
    /// as the edges to traverse plus the total length.
    ///
    /// Parallel tracks count as one edge, weighted by the shorter track.
    /// Deterministic: ties break by city declaration order. Returns
    /// `(vec![], u32::MAX)` when no path exists.
    pub fn shortest_path(&self, start: City, end: City) -> (Vec<CityToCity>, u32) {
        let mut distances = [u32::MAX; City::COUNT];
        let mut previous: [Option<City>; City::COUNT] = [None; City::COUNT];
        let mut heap = BinaryHeap::new();

        distances[start as usize] = 0;
        heap.push(Reverse((0u32, start)));

        while let Some(Reverse((distance, city))) = heap.pop() {
            if distance > distances[city as usize] {
                continue;
            }
            if city == end {
                break;
            }

            for (&(a, b), tracks) in &self.routes {
                let neighbor = if a == city {
                    b
                } else if b == city {
                    a
                } else {
                    continue;
                };

                // Every entry holds at least one track.
                let weight = tracks
                    .iter()
                    .map(|route| u32::from(route.length))
                    .min()
                    .unwrap_or(u32::MAX);
                let next_distance = distance.saturating_add(weight);

                if next_distance < distances[neighbor as usize] {
                    distances[neighbor as usize] = next_distance;
                    previous[neighbor as usize] = Some(city);
                    heap.push(Reverse((next_distance, neighbor)));
                }
            }
        }

        if distances[end as usize] == u32::MAX {
            return (Vec::new(), u32::MAX);
        }

        let mut path = Vec::new();
        let mut city = end;
        while let Some(prev) = previous[city as usize] {
            path.push((prev, city));
            city = prev;
        }
        path.reverse();

        (path, distances[end as usize])
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}
