//! Layout statistics.
//!
//! Provides placement counters for a single allocation pass.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::comment::{Comment, DisplayMode};
use crate::layout::{Placement, PlacementState};

/// Statistics for one layout pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutStatistics {
    /// Total number of comments seen by the pass
    pub total_count: u64,
    /// Comments that found free lanes
    pub placed_count: u64,
    /// Comments placed over an occupied lane
    pub forced_count: u64,
    /// Comments dropped under the reduced policy
    pub dropped_count: u64,
    /// Comments taller than the usable stage
    pub oversized_count: u64,
    /// Absolute-position comments left to a positioned emitter
    pub deferred_count: u64,
    /// Lane usage per pool and mode, ordered by pool then mode
    pub lane_usage: Vec<LaneUsage>,
    /// Earliest start among visible comments
    pub first_progress: Option<f64>,
    /// Latest end among visible comments
    pub last_end: Option<f64>,
}

impl LayoutStatistics {
    /// Comments that will appear in the output.
    pub fn visible_count(&self) -> u64 {
        self.placed_count + self.forced_count + self.oversized_count
    }
}

/// Lane usage for one pool/mode grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneUsage {
    pub pool: i32,
    pub mode: DisplayMode,
    /// Comments given a lane in this grid
    pub comment_count: u64,
    /// Lowest row reached by any block, exclusive
    pub deepest_row: u32,
}

/// Aggregator for layout statistics.
#[derive(Debug, Default)]
pub struct StatisticsAggregator {
    total_count: u64,
    placed_count: u64,
    forced_count: u64,
    dropped_count: u64,
    oversized_count: u64,
    deferred_count: u64,
    /// (pool, mode) -> (comment count, deepest row)
    lanes: FxHashMap<(i32, DisplayMode), (u64, u32)>,
    first_progress: Option<f64>,
    last_end: Option<f64>,
}

impl StatisticsAggregator {
    /// Create a new statistics aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a comment and its placement.
    pub fn record(&mut self, comment: &Comment, placement: Placement) {
        self.total_count += 1;
        match placement.state {
            PlacementState::Placed => self.placed_count += 1,
            PlacementState::ForcedPlaced => self.forced_count += 1,
            PlacementState::Dropped => self.dropped_count += 1,
            PlacementState::Oversized => self.oversized_count += 1,
            PlacementState::Deferred => self.deferred_count += 1,
        }

        if !placement.state.is_visible() {
            return;
        }

        self.first_progress = Some(
            self.first_progress
                .map_or(comment.progress(), |p| p.min(comment.progress())),
        );
        self.last_end = Some(self.last_end.map_or(comment.end(), |e| e.max(comment.end())));

        if let Some(lane) = placement.lane {
            let bottom = lane.saturating_add(comment.block_height().ceil() as u32);
            let entry = self
                .lanes
                .entry((comment.pool(), comment.mode()))
                .or_insert((0, 0));
            entry.0 += 1;
            entry.1 = entry.1.max(bottom);
        }
    }

    /// Finalize and return statistics.
    pub fn finalize(self) -> LayoutStatistics {
        let mut lane_usage: Vec<LaneUsage> = self
            .lanes
            .into_iter()
            .map(|((pool, mode), (comment_count, deepest_row))| LaneUsage {
                pool,
                mode,
                comment_count,
                deepest_row,
            })
            .collect();
        lane_usage.sort_by_key(|usage| (usage.pool, mode_rank(usage.mode)));

        LayoutStatistics {
            total_count: self.total_count,
            placed_count: self.placed_count,
            forced_count: self.forced_count,
            dropped_count: self.dropped_count,
            oversized_count: self.oversized_count,
            deferred_count: self.deferred_count,
            lane_usage,
            first_progress: self.first_progress,
            last_end: self.last_end,
        }
    }
}

fn mode_rank(mode: DisplayMode) -> u8 {
    match mode {
        DisplayMode::ScrollRightToLeft => 0,
        DisplayMode::ScrollLeftToRight => 1,
        DisplayMode::Top => 2,
        DisplayMode::Bottom => 3,
        DisplayMode::AbsolutePosition => 4,
    }
}
