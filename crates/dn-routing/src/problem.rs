//! The input handed to a [`RouteOptimizer`](crate::RouteOptimizer).

use dn_core::Point;

use crate::{RoutingError, RoutingResult};

/// A capacitated-by-length vehicle routing problem over warehouses.
///
/// `distances[i][j]` is the travel distance in km from node `i` to node `j`.
/// Every route must start and end at `depot` and may not exceed
/// `max_route_len` km in total.
#[derive(Clone, Debug)]
pub struct RoutingProblem {
    pub distances:     Vec<Vec<f64>>,
    pub vehicles:      usize,
    pub depot:         usize,
    pub max_route_len: f64,
}

impl RoutingProblem {
    /// Build the Euclidean distance matrix between `points`.
    pub fn from_points(points: &[Point], vehicles: usize, depot: usize, max_route_len: f64) -> Self {
        let distances = points
            .iter()
            .map(|a| points.iter().map(|b| a.distance(*b)).collect())
            .collect();
        Self { distances, vehicles, depot, max_route_len }
    }

    pub fn node_count(&self) -> usize {
        self.distances.len()
    }

    /// Every non-depot node, ascending.
    pub fn stops(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.node_count()).filter(move |&i| i != self.depot)
    }

    #[inline]
    pub fn dist(&self, from: usize, to: usize) -> f64 {
        self.distances[from][to]
    }

    /// Length of the closed tour `depot → stops… → depot`.
    pub fn tour_len(&self, stops: &[usize]) -> f64 {
        let mut len = 0.0;
        let mut at = self.depot;
        for &s in stops {
            len += self.dist(at, s);
            at = s;
        }
        len + self.dist(at, self.depot)
    }

    pub fn validate(&self) -> RoutingResult<()> {
        let n = self.node_count();
        if n == 0 {
            return Err(RoutingError::NoWarehouses);
        }
        if self.depot >= n {
            return Err(RoutingError::DepotOutOfRange { depot: self.depot, nodes: n });
        }
        for (row, r) in self.distances.iter().enumerate() {
            if r.len() != n {
                return Err(RoutingError::MatrixNotSquare { row, got: r.len(), expected: n });
            }
        }
        Ok(())
    }
}
