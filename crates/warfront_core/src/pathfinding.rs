//! Cost-aware reachability and path reconstruction on the hex board.
//!
//! The planner expands a frontier from the start cell, paying the terrain
//! cost of every cell it enters, and records the cheapest known cost and the
//! predecessor of each cell within the movement budget. All containers are
//! ordered so results are identical across runs and platforms.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::hex::Cell;
use crate::terrain::{MobilityClass, TerrainIndex, COST_IMPASSABLE};

/// Frontier discipline used when expanding the reachable set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExpansionOrder {
    /// Cheapest-first (Dijkstra). Always yields minimal costs.
    #[default]
    CostOrdered,
    /// Plain first-in-first-out queue, re-enqueueing on improvement.
    Fifo,
}

/// Best known cost and predecessor of a visited cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    /// Total terrain cost from the start.
    pub cost: u32,
    /// Previous cell on the cheapest known path; `None` for the start.
    pub predecessor: Option<Cell>,
}

/// Result of a reachability expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveMap {
    start: Cell,
    budget: u32,
    visits: BTreeMap<Cell, Visit>,
}

impl MoveMap {
    /// Cell the expansion started from.
    #[must_use]
    pub const fn start(&self) -> Cell {
        self.start
    }

    /// Budget used for the expansion.
    #[must_use]
    pub const fn budget(&self) -> u32 {
        self.budget
    }

    /// Whether `cell` is reachable within the budget.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.visits.contains_key(&cell)
    }

    /// Best known cost to reach `cell`.
    #[must_use]
    pub fn cost(&self, cell: Cell) -> Option<u32> {
        self.visits.get(&cell).map(|v| v.cost)
    }

    /// Visit record of `cell`.
    #[must_use]
    pub fn visit(&self, cell: Cell) -> Option<&Visit> {
        self.visits.get(&cell)
    }

    /// Reachable cells in coordinate order, start included.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.visits.keys().copied()
    }

    /// Number of reachable cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    /// Always false: the start cell is always reachable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// Walk predecessor links from `end` back to the start.
    ///
    /// Returns the path start-first, or an empty vector if `end` was not
    /// reached.
    #[must_use]
    pub fn path_to(&self, end: Cell) -> Vec<Cell> {
        let mut path = Vec::new();
        let mut current = Some(end);

        while let Some(cell) = current {
            let Some(visit) = self.visits.get(&cell) else {
                return Vec::new();
            };
            path.push(cell);
            current = visit.predecessor;

            // A well-formed map can never produce a longer chain.
            if path.len() > self.visits.len() {
                return Vec::new();
            }
        }

        path.reverse();
        path
    }
}

/// A node in the cheapest-first frontier.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct FrontierNode {
    cell: Cell,
    cost: u32,
    /// Tie-breaker for determinism: lower coordinates first.
    tie_breaker: u64,
}

impl Ord for FrontierNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse for cheapest-first.
        match other.cost.cmp(&self.cost) {
            Ordering::Equal => other.tie_breaker.cmp(&self.tie_breaker),
            ord => ord,
        }
    }
}

impl PartialOrd for FrontierNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[inline]
fn cell_to_tie_breaker(cell: Cell) -> u64 {
    (u64::from(cell.row as u32) << 32) | u64::from(cell.col as u32)
}

/// Reachability queries against one terrain index.
#[derive(Debug, Clone, Copy)]
pub struct PathPlanner<'a> {
    terrain: &'a TerrainIndex,
    impassable_threshold: u32,
    order: ExpansionOrder,
}

impl<'a> PathPlanner<'a> {
    /// Create a cheapest-first planner with the default impassable threshold.
    #[must_use]
    pub const fn new(terrain: &'a TerrainIndex) -> Self {
        Self {
            terrain,
            impassable_threshold: COST_IMPASSABLE,
            order: ExpansionOrder::CostOrdered,
        }
    }

    /// Treat terrain costs at or above `threshold` as hard blocks.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: u32) -> Self {
        self.impassable_threshold = threshold;
        self
    }

    /// Select the frontier discipline.
    #[must_use]
    pub const fn with_order(mut self, order: ExpansionOrder) -> Self {
        self.order = order;
        self
    }

    /// Cost of stepping into `cell`, or `None` if it is a hard block.
    fn step_cost(&self, cell: Cell, blockers: &BTreeSet<Cell>, mobility: MobilityClass) -> Option<u32> {
        if blockers.contains(&cell) || !self.terrain.on_board(cell) {
            return None;
        }
        let cost = self.terrain.movement_cost(cell, mobility);
        (cost < self.impassable_threshold).then_some(cost)
    }

    /// Every cell reachable from `start` within `budget`, with its cheapest
    /// known cost and predecessor.
    ///
    /// `blockers` are cells the unit may not enter at all (non-allied units).
    #[must_use]
    pub fn reachable_set(
        &self,
        start: Cell,
        budget: u32,
        blockers: &BTreeSet<Cell>,
        mobility: MobilityClass,
    ) -> MoveMap {
        let mut visits = BTreeMap::new();
        visits.insert(
            start,
            Visit {
                cost: 0,
                predecessor: None,
            },
        );

        match self.order {
            ExpansionOrder::CostOrdered => self.expand_cost_ordered(start, budget, blockers, mobility, &mut visits),
            ExpansionOrder::Fifo => self.expand_fifo(start, budget, blockers, mobility, &mut visits),
        }

        tracing::debug!(
            start = %start,
            budget,
            ?mobility,
            order = ?self.order,
            reachable = visits.len(),
            "Expanded reachable set"
        );

        MoveMap { start, budget, visits }
    }

    fn relax(
        &self,
        current: Cell,
        current_cost: u32,
        budget: u32,
        blockers: &BTreeSet<Cell>,
        mobility: MobilityClass,
        visits: &mut BTreeMap<Cell, Visit>,
        mut enqueue: impl FnMut(Cell, u32),
    ) {
        for next in current.neighbors() {
            let Some(step) = self.step_cost(next, blockers, mobility) else {
                continue;
            };
            let new_cost = current_cost.saturating_add(step);
            if new_cost > budget {
                continue;
            }
            let improves = visits.get(&next).map_or(true, |v| new_cost < v.cost);
            if improves {
                visits.insert(
                    next,
                    Visit {
                        cost: new_cost,
                        predecessor: Some(current),
                    },
                );
                enqueue(next, new_cost);
            }
        }
    }

    fn expand_cost_ordered(
        &self,
        start: Cell,
        budget: u32,
        blockers: &BTreeSet<Cell>,
        mobility: MobilityClass,
        visits: &mut BTreeMap<Cell, Visit>,
    ) {
        let mut open_set = BinaryHeap::new();
        open_set.push(FrontierNode {
            cell: start,
            cost: 0,
            tie_breaker: cell_to_tie_breaker(start),
        });

        while let Some(current) = open_set.pop() {
            // Skip stale entries superseded by a cheaper push.
            if visits.get(&current.cell).is_some_and(|v| current.cost > v.cost) {
                continue;
            }
            self.relax(current.cell, current.cost, budget, blockers, mobility, visits, |cell, cost| {
                open_set.push(FrontierNode {
                    cell,
                    cost,
                    tie_breaker: cell_to_tie_breaker(cell),
                });
            });
        }
    }

    fn expand_fifo(
        &self,
        start: Cell,
        budget: u32,
        blockers: &BTreeSet<Cell>,
        mobility: MobilityClass,
        visits: &mut BTreeMap<Cell, Visit>,
    ) {
        let mut frontier = VecDeque::new();
        frontier.push_back(start);

        while let Some(current) = frontier.pop_front() {
            let current_cost = visits.get(&current).map_or(0, |v| v.cost);
            self.relax(current, current_cost, budget, blockers, mobility, visits, |cell, _| {
                frontier.push_back(cell);
            });
        }
    }

    /// Cheapest path from `start` to `end`, start-first.
    ///
    /// Returns an empty vector if `end` is not reachable within `budget`.
    #[must_use]
    pub fn path_to(
        &self,
        start: Cell,
        end: Cell,
        budget: u32,
        blockers: &BTreeSet<Cell>,
        mobility: MobilityClass,
    ) -> Vec<Cell> {
        self.reachable_set(start, budget, blockers, mobility).path_to(end)
    }

    /// Cells the unit may end its move on.
    ///
    /// Same as [`Self::navigable_tiles`] minus cells in `stop_blockers`
    /// (allied units), except the start cell itself.
    #[must_use]
    pub fn reachable_tiles(
        &self,
        start: Cell,
        budget: u32,
        blockers: &BTreeSet<Cell>,
        stop_blockers: &BTreeSet<Cell>,
        mobility: MobilityClass,
    ) -> Vec<Cell> {
        stop_filtered(&self.reachable_set(start, budget, blockers, mobility), stop_blockers)
    }

    /// Every cell the unit can pass through, including allied-occupied cells.
    #[must_use]
    pub fn navigable_tiles(
        &self,
        start: Cell,
        budget: u32,
        blockers: &BTreeSet<Cell>,
        mobility: MobilityClass,
    ) -> Vec<Cell> {
        self.reachable_set(start, budget, blockers, mobility).cells().collect()
    }

    /// Sum of terrain costs of every cell after the first.
    #[must_use]
    pub fn path_cost(&self, path: &[Cell], mobility: MobilityClass) -> u32 {
        path.iter()
            .skip(1)
            .map(|&cell| self.terrain.movement_cost(cell, mobility))
            .fold(0u32, u32::saturating_add)
    }
}

/// Reachable cells of `map` that are legal stopping places.
#[must_use]
pub fn stop_filtered(map: &MoveMap, stop_blockers: &BTreeSet<Cell>) -> Vec<Cell> {
    map.cells()
        .filter(|cell| *cell == map.start() || !stop_blockers.contains(cell))
        .collect()
}
