//! Lane allocation.
//!
//! Each canvas row is a lane. Comments are visited in time order
//! (`progress`, then `creation_order`) and each one takes the first run of
//! free lanes tall enough for its block, scanning from the top. Every
//! `(pool, mode)` pair has its own occupancy grid, so comments in different
//! pools or modes never compete for lanes.
//!
//! Whether an occupied lane is free depends on the mode:
//!
//! - static comments block a lane until they disappear (plus a small
//!   tolerance);
//! - scrolling comments free a lane once their tail has entered the stage, as
//!   long as the newcomer cannot catch up with them before they leave.
//!
//! When no run is found the comment is dropped under the reduced policy, or
//! otherwise forced onto the lane whose occupant started earliest.
//!
//! Grid cells hold indices into the comment slice, never references, and the
//! grid is thrown away when the pass ends.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::comment::{Comment, DisplayMode};
use crate::config::Canvas;
use crate::statistics::{LayoutStatistics, StatisticsAggregator};

/// Extra seconds a static comment keeps its lane after it disappears.
pub const STILL_TOLERANCE_SECS: f64 = 0.1;

/// Terminal state of a comment after allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementState {
    /// Got a run of free lanes
    Placed,
    /// No free run; placed over the earliest-started occupant
    ForcedPlaced,
    /// No free run under the reduced policy; not emitted
    Dropped,
    /// Taller than the usable stage; pinned without a search
    Oversized,
    /// Absolute-position comment; not handled by the lane engine
    Deferred,
}

impl PlacementState {
    /// Whether the comment has a lane and should be emitted.
    pub fn is_visible(self) -> bool {
        matches!(self, Self::Placed | Self::ForcedPlaced | Self::Oversized)
    }
}

/// Allocation result for one comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub state: PlacementState,
    /// Top row of the block; `None` for dropped and deferred comments
    pub lane: Option<u32>,
    /// Anchor the block on its vertical center instead of its top edge
    pub centered: bool,
}

impl Placement {
    fn at(state: PlacementState, lane: usize) -> Self {
        Self {
            state,
            lane: Some(lane as u32),
            centered: false,
        }
    }

    fn without_lane(state: PlacementState) -> Self {
        Self {
            state,
            lane: None,
            centered: false,
        }
    }
}

/// Per-(pool, mode) lane grids for a single pass.
struct OccupancyGrid {
    rows: usize,
    grids: FxHashMap<(i32, DisplayMode), Vec<Option<usize>>>,
}

impl OccupancyGrid {
    fn new(usable_height: u32) -> Self {
        Self {
            rows: usable_height as usize + 1,
            grids: FxHashMap::default(),
        }
    }

    fn lanes_mut(&mut self, pool: i32, mode: DisplayMode) -> &mut Vec<Option<usize>> {
        let rows = self.rows;
        self.grids
            .entry((pool, mode))
            .or_insert_with(|| vec![None; rows])
    }
}

/// Whether `occupant` still blocks its lane when `candidate` appears.
fn is_blocking(occupant: &Comment, candidate: &Comment, canvas: &Canvas) -> bool {
    if candidate.mode.is_static() {
        return occupant.progress + occupant.duration + STILL_TOLERANCE_SECS > candidate.progress;
    }

    let width = f64::from(canvas.width());

    let occupant_span = occupant.max_glyph_width + width;
    if occupant_span <= 0.0 {
        return false;
    }
    // The occupant's tail has fully entered the stage.
    let tail_in = occupant.progress + occupant.duration * occupant.max_glyph_width / occupant_span
        <= candidate.progress;

    let candidate_span = candidate.max_glyph_width + width;
    // The candidate's head reaches the far edge no earlier than the occupant leaves.
    let no_overtake = candidate_span <= 0.0
        || occupant.progress + occupant.duration
            <= candidate.progress + candidate.duration * width / candidate_span;

    !(tail_in && no_overtake)
}

/// Count consecutive free lanes starting at `start`, up to the block height.
fn count_free_rows(
    lanes: &[Option<usize>],
    comments: &[Comment],
    candidate: &Comment,
    start: usize,
    canvas: &Canvas,
) -> usize {
    let row_max = canvas.usable_height() as usize;
    let mut row = start;
    let mut free = 0usize;
    let mut last_seen = None;

    while row < row_max && (free as f64) < candidate.block_height {
        let occupant = lanes[row];
        // A block spans several rows; test each occupant once per run.
        if occupant != last_seen {
            last_seen = occupant;
            if let Some(idx) = occupant
                && is_blocking(&comments[idx], candidate, canvas)
            {
                break;
            }
        }
        row += 1;
        free += 1;
    }

    free
}

/// Lane for a forced placement: the first empty lane, else the one whose
/// occupant started earliest (lowest index on ties).
fn find_alternative_row(
    lanes: &[Option<usize>],
    comments: &[Comment],
    candidate: &Comment,
    usable_height: u32,
) -> usize {
    let limit = (f64::from(usable_height) - candidate.block_height.ceil()).max(0.0) as usize;
    let mut best = 0usize;

    for (row, occupant) in lanes.iter().enumerate().take(limit) {
        match occupant {
            None => return row,
            Some(idx) => {
                let earlier = lanes[best]
                    .is_none_or(|best_idx| comments[*idx].progress < comments[best_idx].progress);
                if earlier {
                    best = row;
                }
            }
        }
    }

    best
}

fn mark_rows(lanes: &mut [Option<usize>], candidate: &Comment, idx: usize, row: usize) {
    let end = (row + candidate.block_height.ceil() as usize).min(lanes.len());
    for lane in &mut lanes[row..end] {
        *lane = Some(idx);
    }
}

/// Canonical processing order: `progress`, then `creation_order`, then
/// insertion order.
pub fn sorted_order(comments: &[Comment]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..comments.len()).collect();
    order.sort_by(|&a, &b| {
        comments[a]
            .progress
            .total_cmp(&comments[b].progress)
            .then_with(|| comments[a].creation_order.cmp(&comments[b].creation_order))
    });
    order
}

/// Assign lanes to `comments` visited in `order`.
///
/// Returns one placement per comment, indexed like `comments`.
pub fn allocate(comments: &[Comment], order: &[usize], canvas: &Canvas) -> Vec<Placement> {
    let usable_height = canvas.usable_height();
    let usable = f64::from(usable_height);
    let mut grid = OccupancyGrid::new(usable_height);
    let mut placements = vec![Placement::without_lane(PlacementState::Deferred); comments.len()];

    for &idx in order {
        let comment = &comments[idx];
        if comment.mode == DisplayMode::AbsolutePosition {
            continue;
        }

        if comment.block_height >= usable {
            placements[idx] = if comment.mode.is_scrolling() {
                Placement {
                    state: PlacementState::Oversized,
                    lane: Some(usable_height / 2),
                    centered: true,
                }
            } else {
                Placement::at(PlacementState::Oversized, 0)
            };
            continue;
        }

        let lanes = grid.lanes_mut(comment.pool, comment.mode);
        let row_max = usable - comment.block_height;
        let mut row = 0usize;
        let mut placed = None;

        while row as f64 <= row_max {
            let free = count_free_rows(lanes, comments, comment, row, canvas);
            if free as f64 >= comment.block_height {
                mark_rows(lanes, comment, idx, row);
                placed = Some(row);
                break;
            }
            row += free.max(1);
        }

        placements[idx] = match placed {
            Some(row) => Placement::at(PlacementState::Placed, row),
            None if canvas.is_reduced() => {
                trace!(
                    order = comment.creation_order,
                    progress = comment.progress,
                    "Stage full, dropping comment"
                );
                Placement::without_lane(PlacementState::Dropped)
            }
            None => {
                let row = find_alternative_row(lanes, comments, comment, usable_height);
                if row == 0 {
                    lanes.fill(None);
                }
                mark_rows(lanes, comment, idx, row);
                trace!(
                    order = comment.creation_order,
                    progress = comment.progress,
                    row,
                    "Stage full, forcing comment onto an occupied lane"
                );
                Placement::at(PlacementState::ForcedPlaced, row)
            }
        };
    }

    placements
}

/// Immutable result of one allocation pass over a comment set.
#[derive(Debug, Clone)]
pub struct Layout<'a> {
    canvas: &'a Canvas,
    comments: &'a [Comment],
    order: Vec<usize>,
    placements: Vec<Placement>,
}

impl<'a> Layout<'a> {
    /// Sort `comments` and allocate lanes for all of them.
    pub fn new(canvas: &'a Canvas, comments: &'a [Comment]) -> Self {
        let order = sorted_order(comments);
        let placements = allocate(comments, &order, canvas);
        Self {
            canvas,
            comments,
            order,
            placements,
        }
    }

    pub fn canvas(&self) -> &'a Canvas {
        self.canvas
    }

    /// Comments with their placements, in processing order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a Comment, Placement)> + '_ {
        self.order
            .iter()
            .map(|&idx| (&self.comments[idx], self.placements[idx]))
    }

    /// Placement of the comment at `index` in the input slice.
    pub fn placement(&self, index: usize) -> Option<Placement> {
        self.placements.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Aggregate placement counters for this pass.
    pub fn statistics(&self) -> LayoutStatistics {
        let mut aggregator = StatisticsAggregator::new();
        for (comment, placement) in self.iter() {
            aggregator.record(comment, placement);
        }
        aggregator.finalize()
    }
}
