//! Route optimizer trait and the default Clarke–Wright savings heuristic.
//!
//! # Pluggability
//!
//! The simulation builder calls routing through [`RouteOptimizer`], so
//! applications can swap in an exact solver or a different heuristic without
//! touching the simulation core.
//!
//! # Output contract
//!
//! One stop sequence per vehicle, each `[depot, s1, …, sk]` and read as a
//! cycle (the truck returns to the depot after `sk`).  Across all vehicles
//! every non-depot node appears at least once.

use log::debug;

use crate::{RoutingError, RoutingProblem, RoutingResult};

/// Pluggable fleet router.
///
/// Implementations must be `Send + Sync` so a configured builder can be
/// shared across the threads of a parameter sweep.
pub trait RouteOptimizer: Send + Sync {
    /// Solve `problem`, returning one route per vehicle.
    fn solve(&self, problem: &RoutingProblem) -> RoutingResult<Vec<Vec<usize>>>;

    /// Short label for reports.
    fn name(&self) -> &'static str;
}

// ── SavingsOptimizer ──────────────────────────────────────────────────────────

/// Clarke–Wright savings with a route-length limit.
///
/// ```text
/// start:  one route per stop, depot → s → depot
/// saving: s(i, j) = d(depot, i) + d(depot, j) − d(i, j)
/// merge:  in descending saving order, join the routes ending in i and j
///         while there are more routes than vehicles and the joined tour
///         stays within max_route_len
/// ```
///
/// Infeasible when a single stop's round trip already exceeds the limit, or
/// when merging cannot bring the route count down to the vehicle count.  If
/// there are more vehicles than routes, the surplus vehicles repeat existing
/// routes round-robin.
#[derive(Copy, Clone, Debug, Default)]
pub struct SavingsOptimizer;

impl RouteOptimizer for SavingsOptimizer {
    fn name(&self) -> &'static str {
        "savings"
    }

    fn solve(&self, problem: &RoutingProblem) -> RoutingResult<Vec<Vec<usize>>> {
        problem.validate()?;
        let depot = problem.depot;
        let stops: Vec<usize> = problem.stops().collect();

        if problem.vehicles == 0 {
            if stops.is_empty() {
                return Ok(Vec::new());
            }
            return Err(infeasible(problem, stops.len(), "no vehicles".into()));
        }
        if stops.is_empty() {
            return Ok(vec![vec![depot]; problem.vehicles]);
        }

        for &s in &stops {
            let round_trip = problem.tour_len(&[s]);
            if round_trip > problem.max_route_len + EPS {
                return Err(infeasible(
                    problem,
                    stops.len(),
                    format!("round trip to stop {s} alone is {round_trip:.1} km"),
                ));
            }
        }

        // routes[r] is None once merged away; route_of[node] is its route.
        let mut routes: Vec<Option<Vec<usize>>> = stops.iter().map(|&s| Some(vec![s])).collect();
        let mut route_of = vec![usize::MAX; problem.node_count()];
        for (r, &s) in stops.iter().enumerate() {
            route_of[s] = r;
        }
        let mut count = routes.len();

        let mut savings: Vec<(f64, usize, usize)> = Vec::new();
        for (a, &i) in stops.iter().enumerate() {
            for &j in &stops[a + 1..] {
                let s = problem.dist(depot, i) + problem.dist(depot, j) - problem.dist(i, j);
                savings.push((s, i, j));
            }
        }
        savings.sort_by(|x, y| y.0.total_cmp(&x.0).then((x.1, x.2).cmp(&(y.1, y.2))));

        for (_, i, j) in savings {
            if count <= problem.vehicles {
                break;
            }
            let (ri, rj) = (route_of[i], route_of[j]);
            if ri == rj {
                continue;
            }
            let (Some(a), Some(b)) = (&routes[ri], &routes[rj]) else { continue };
            let Some(merged) = join_at(a, b, i, j) else { continue };
            if problem.tour_len(&merged) > problem.max_route_len + EPS {
                continue;
            }
            for &n in &merged {
                route_of[n] = ri;
            }
            routes[ri] = Some(merged);
            routes[rj] = None;
            count -= 1;
        }

        if count > problem.vehicles {
            return Err(infeasible(
                problem,
                stops.len(),
                format!("{count} routes needed within the length limit"),
            ));
        }

        let mut solved: Vec<Vec<usize>> = routes.into_iter().flatten().collect();
        solved.sort_by_key(|r| r.iter().copied().min());
        debug!("savings: {} route(s) for {} vehicle(s)", solved.len(), problem.vehicles);

        Ok((0..problem.vehicles)
            .map(|v| {
                let mut route = Vec::with_capacity(solved[v % solved.len()].len() + 1);
                route.push(depot);
                route.extend_from_slice(&solved[v % solved.len()]);
                route
            })
            .collect())
    }
}

const EPS: f64 = 1e-9;

fn infeasible(problem: &RoutingProblem, stops: usize, reason: String) -> RoutingError {
    RoutingError::Infeasible {
        vehicles: problem.vehicles,
        stops,
        max_route_len: problem.max_route_len,
        reason,
    }
}

/// Join two open paths so that `i` and `j` become adjacent, or `None` if
/// either is interior to its path.
fn join_at(a: &[usize], b: &[usize], i: usize, j: usize) -> Option<Vec<usize>> {
    let a_first = a.first() == Some(&i);
    let a_last = a.last() == Some(&i);
    let b_first = b.first() == Some(&j);
    let b_last = b.last() == Some(&j);

    let (left, right): (Vec<usize>, Vec<usize>) = if a_last && b_first {
        (a.to_vec(), b.to_vec())
    } else if b_last && a_first {
        (b.to_vec(), a.to_vec())
    } else if a_last && b_last {
        (a.to_vec(), b.iter().rev().copied().collect())
    } else if a_first && b_first {
        (a.iter().rev().copied().collect(), b.to_vec())
    } else {
        return None;
    };
    Some(left.into_iter().chain(right).collect())
}
