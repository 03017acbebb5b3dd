//! Diagonal wall grid: slot arithmetic and selection for the media wall.
//!
//! This module provides the `WallGrid` struct which owns the wall's slot
//! arena and handles:
//! - Deriving column/row counts from the viewport size
//! - Positioning each slot with a per-row diagonal offset
//! - Tracking which slots are fully inside the display bounds
//! - Picking a pseudo-random next slot to load new media into
//!
//! The grid is host-agnostic: a GTK widget (or a test) supplies viewport
//! sizes and reads back positions, it never leaks toolkit types.

use rand::rngs::ThreadRng;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::models::{SlotId, SlotRect, WallSlot};

/// Random draws attempted before falling back to an exhaustive scan.
const MAX_RANDOM_DRAWS: usize = 64;

/// Fatal wall-geometry errors. There is no recovery path: a wall with a
/// degenerate grid cannot lay out a single slot.
#[derive(Debug, Error)]
pub enum WallError {
    #[error("tile geometry must be positive: {tile_width}x{tile_height} with padding {padding}")]
    InvalidTileGeometry {
        tile_width: i32,
        tile_height: i32,
        padding: i32,
    },
    #[error(
        "viewport {width}x{height} yields a {columns}x{rows} wall; both counts must be positive"
    )]
    ViewportTooSmall {
        width: i32,
        height: i32,
        columns: i32,
        rows: i32,
    },
}

/// A wall of fixed-size media slots laid out with a diagonal stagger.
///
/// Slots are addressed by `(column, row)` and stored in a flat arena at
/// `index = column * rows + row`. The arena only ever grows: a resize to
/// a smaller viewport detaches the excess slots but keeps their records,
/// so content reappears when the viewport grows back.
///
/// The content type `T` is opaque to the grid; callers decide what a
/// loaded slot holds.
///
/// Lifecycle: the grid is inert until the first successful `resize`.
/// Before that, `layout` is a no-op, selection returns `None`, and
/// per-slot accessors have no valid addresses to be called with.
pub struct WallGrid<T> {
    tile_width: i32,
    tile_height: i32,
    padding: i32,

    display_width: i32,
    display_height: i32,

    columns: i32,
    rows: i32,

    slots: Vec<WallSlot<T>>,
    /// Arena indices that have never received content, in creation order.
    unassigned: Vec<usize>,

    rng: ThreadRng,
}

impl<T> WallGrid<T> {
    /// Creates an unsized wall.
    ///
    /// `display_width`/`display_height` are the physical screen bounds
    /// used for full-visibility checks; the viewport handed to `resize`
    /// is the widget allocation, which may differ.
    pub fn new(
        tile_width: i32,
        tile_height: i32,
        padding: i32,
        display_width: i32,
        display_height: i32,
    ) -> Result<Self, WallError> {
        if tile_width <= 0 || tile_height <= 0 || padding < 0 {
            return Err(WallError::InvalidTileGeometry {
                tile_width,
                tile_height,
                padding,
            });
        }

        Ok(Self {
            tile_width,
            tile_height,
            padding,
            display_width,
            display_height,
            columns: 0,
            rows: 0,
            slots: Vec::new(),
            unassigned: Vec::new(),
            rng: rand::rng(),
        })
    }

    pub fn tile_width(&self) -> i32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> i32 {
        self.tile_height
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Total slot records in the arena, attached or not.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slots addressable in the current grid (`columns * rows`).
    pub fn grid_slot_count(&self) -> usize {
        (self.columns * self.rows) as usize
    }

    /// Number of slots that have never received content.
    pub fn unassigned_count(&self) -> usize {
        self.unassigned.len()
    }

    /// Recomputes the grid dimensions for a new viewport and grows the
    /// arena if the new grid needs more slots than currently allocated.
    ///
    /// Two extra columns are always added so the diagonal stagger can run
    /// off both screen edges without exposing gaps; a partial bottom row
    /// gets a full extra row. Existing slots keep their content.
    pub fn resize(&mut self, width: i32, height: i32) -> Result<(), WallError> {
        let columns = width / (self.tile_width + self.padding) + 2;
        let mut rows = height / (self.tile_height + self.padding);
        if height % (self.tile_height + self.padding) != 0 {
            rows += 1;
        }

        if columns <= 0 || rows <= 0 {
            return Err(WallError::ViewportTooSmall {
                width,
                height,
                columns,
                rows,
            });
        }

        self.columns = columns;
        self.rows = rows;

        let needed = (columns * rows) as usize;
        if self.slots.len() < needed {
            for index in self.slots.len()..needed {
                self.slots.push(WallSlot::new());
                self.unassigned.push(index);
            }
        }

        debug!(columns, rows, arena = self.slots.len(), "wall resized");
        Ok(())
    }

    /// Positions every slot in the current grid and refreshes its cached
    /// full-visibility flag.
    ///
    /// `x = (column - 1) * (tile_width + padding) + row * (tile_width / rows)`
    /// shifts each row further right, producing the diagonal stagger; the
    /// division truncates, as the stagger is a whole-pixel offset.
    pub fn layout(&mut self) {
        for column in 0..self.columns {
            for row in 0..self.rows {
                let x = (column - 1) * (self.tile_width + self.padding)
                    + row * (self.tile_width / self.rows);
                let y = row * (self.tile_height + self.padding);
                let rect = SlotRect::new(x, y, x + self.tile_width, y + self.tile_height);
                let on_screen = self.rect_on_screen(&rect);

                let slot = &mut self.slots[flat_index(column, row, self.rows)];
                slot.rect = rect;
                slot.fully_on_screen = on_screen;
            }
        }
    }

    /// Top-left corner of the slot as of the last `layout` pass.
    pub fn position(&self, id: SlotId) -> (i32, i32) {
        let rect = self.slot(id).rect;
        (rect.left, rect.top)
    }

    pub fn is_visible(&self, id: SlotId) -> bool {
        self.slot(id).visible
    }

    /// Cached full-visibility flag from the last `layout` pass.
    pub fn is_fully_on_screen(&self, id: SlotId) -> bool {
        self.slot(id).fully_on_screen
    }

    /// Marks the slot hidden and hands back its content so the caller can
    /// tear down whatever is playing or displayed there.
    pub fn hide(&mut self, id: SlotId) -> Option<&T> {
        let index = self.index_of(id);
        self.slots[index].visible = false;
        self.slots[index].content.as_ref()
    }

    pub fn show(&mut self, id: SlotId) {
        let index = self.index_of(id);
        self.slots[index].visible = true;
    }

    /// Assigns content to the slot, removing it from the never-assigned
    /// set. Repeated assignment just replaces the content.
    pub fn set_content(&mut self, id: SlotId, content: T) {
        let index = self.index_of(id);
        self.unassigned.retain(|&i| i != index);
        self.slots[index].content = Some(content);
    }

    pub fn content(&self, id: SlotId) -> Option<&T> {
        self.slot(id).content.as_ref()
    }

    /// True once every slot ever allocated has received content.
    pub fn all_slots_assigned(&self) -> bool {
        self.unassigned.is_empty()
    }

    /// Picks the slot the next piece of media should load into.
    ///
    /// Candidates are drawn uniformly at random, from the never-assigned
    /// set while it has members and from the whole grid afterwards. A
    /// candidate is accepted if it is visible and, when
    /// `require_fully_on_screen` is set (video), its whole rectangle was
    /// on screen at the last layout pass.
    ///
    /// After a bounded number of draws the search switches to an
    /// exhaustive scan, still preferring never-assigned slots, so a
    /// sparse candidate set resolves deterministically. Returns `None`
    /// when no slot is eligible at all.
    pub fn next_load_target(&mut self, require_fully_on_screen: bool) -> Option<SlotId> {
        let in_grid = self.grid_slot_count();
        if in_grid == 0 {
            return None;
        }

        for _ in 0..MAX_RANDOM_DRAWS {
            let index = if self.unassigned.is_empty() {
                self.rng.random_range(0..in_grid)
            } else {
                self.unassigned[self.rng.random_range(0..self.unassigned.len())]
            };
            if self.accepts(index, require_fully_on_screen) {
                return Some(self.id_of(index));
            }
        }

        trace!(require_fully_on_screen, "random draws exhausted, scanning");

        let eligible: Vec<usize> = self
            .unassigned
            .iter()
            .copied()
            .filter(|&index| self.accepts(index, require_fully_on_screen))
            .collect();
        let eligible = if eligible.is_empty() {
            (0..in_grid)
                .filter(|&index| self.accepts(index, require_fully_on_screen))
                .collect()
        } else {
            eligible
        };

        if eligible.is_empty() {
            return None;
        }
        let index = eligible[self.rng.random_range(0..eligible.len())];
        Some(self.id_of(index))
    }

    /// Stable arena key for a slot, usable by hosts that keep per-slot
    /// resources (one display element per record).
    pub fn arena_index(&self, id: SlotId) -> usize {
        self.index_of(id)
    }

    /// All addresses in the current grid, column-major like the arena.
    pub fn slot_ids(&self) -> impl Iterator<Item = SlotId> {
        let rows = self.rows;
        (0..self.columns).flat_map(move |column| (0..rows).map(move |row| SlotId::new(column, row)))
    }

    fn accepts(&self, index: usize, require_fully_on_screen: bool) -> bool {
        // Indices past the current grid are detached leftovers from a
        // larger layout; their flags are stale and their address would
        // fall outside the wall.
        if index >= self.grid_slot_count() {
            return false;
        }
        let slot = &self.slots[index];
        slot.visible && (!require_fully_on_screen || slot.fully_on_screen)
    }

    fn rect_on_screen(&self, rect: &SlotRect) -> bool {
        rect.left >= 0
            && rect.top >= 0
            && rect.right <= self.display_width
            && rect.bottom <= self.display_height
    }

    fn index_of(&self, id: SlotId) -> usize {
        assert!(
            id.column >= 0 && id.column < self.columns && id.row >= 0 && id.row < self.rows,
            "slot ({}, {}) outside the {}x{} wall",
            id.column,
            id.row,
            self.columns,
            self.rows,
        );
        flat_index(id.column, id.row, self.rows)
    }

    fn id_of(&self, index: usize) -> SlotId {
        SlotId::new(index as i32 / self.rows, index as i32 % self.rows)
    }

    fn slot(&self, id: SlotId) -> &WallSlot<T> {
        &self.slots[self.index_of(id)]
    }
}

fn flat_index(column: i32, row: i32, rows: i32) -> usize {
    (column * rows + row) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn wall() -> WallGrid<u32> {
        // 100x100 tiles, 10px padding, on a 500x400 display.
        WallGrid::new(100, 100, 10, 500, 400).unwrap()
    }

    #[test]
    fn test_column_and_row_counts() {
        let mut grid = wall();
        grid.resize(500, 400).unwrap();

        // floor(500 / 110) + 2 and ceil(400 / 110).
        assert_eq!(grid.columns(), 6);
        assert_eq!(grid.rows(), 4);
        assert_eq!(grid.slot_count(), 24);
        assert_eq!(grid.unassigned_count(), 24);
    }

    #[test]
    fn test_exact_height_multiple_adds_no_row() {
        let mut grid: WallGrid<u32> = WallGrid::new(90, 90, 10, 800, 600).unwrap();

        grid.resize(300, 200).unwrap();
        assert_eq!(grid.rows(), 2);

        grid.resize(300, 250).unwrap();
        assert_eq!(grid.rows(), 3);
    }

    #[test]
    fn test_minimum_column_count() {
        // Even a zero-width viewport keeps the two overflow columns.
        let mut grid = wall();
        grid.resize(0, 100).unwrap();
        assert_eq!(grid.columns(), 2);
        assert_eq!(grid.rows(), 1);
    }

    #[test]
    fn test_viewport_too_small() {
        let mut grid = wall();
        let err = grid.resize(500, 0).unwrap_err();
        assert!(matches!(err, WallError::ViewportTooSmall { rows: 0, .. }));
        // The failed resize must not have sized the wall.
        assert_eq!(grid.rows(), 0);
        assert_eq!(grid.slot_count(), 0);
    }

    #[test]
    fn test_invalid_tile_geometry() {
        assert!(WallGrid::<u32>::new(0, 100, 10, 500, 400).is_err());
        assert!(WallGrid::<u32>::new(100, 0, 10, 500, 400).is_err());
        assert!(WallGrid::<u32>::new(100, 100, -1, 500, 400).is_err());
        assert!(WallGrid::<u32>::new(100, 100, 0, 500, 400).is_ok());
    }

    #[test]
    fn test_arena_never_shrinks_and_content_survives() {
        let mut grid = wall();
        grid.resize(500, 400).unwrap();
        grid.set_content(SlotId::new(2, 1), 7);

        grid.resize(200, 200).unwrap();
        assert_eq!(grid.columns(), 3);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.slot_count(), 24, "arena must not shrink");

        grid.resize(500, 400).unwrap();
        assert_eq!(grid.content(SlotId::new(2, 1)), Some(&7));
    }

    #[test]
    fn test_set_content_is_idempotent_on_unassigned_set() {
        let mut grid = wall();
        grid.resize(500, 400).unwrap();

        grid.set_content(SlotId::new(0, 0), 1);
        assert_eq!(grid.unassigned_count(), 23);

        grid.set_content(SlotId::new(0, 0), 2);
        assert_eq!(grid.unassigned_count(), 23);
        assert_eq!(grid.content(SlotId::new(0, 0)), Some(&2));
        assert!(!grid.all_slots_assigned());

        for id in grid.slot_ids().collect::<Vec<_>>() {
            grid.set_content(id, 0);
        }
        assert!(grid.all_slots_assigned());
    }

    #[test]
    fn test_layout_positions_match_formula() {
        let mut grid = wall();
        grid.resize(500, 400).unwrap();
        grid.layout();

        // tile_width / rows truncates: 100 / 4 = 25.
        for id in grid.slot_ids() {
            let expected_x = (id.column - 1) * 110 + id.row * 25;
            let expected_y = id.row * 110;
            assert_eq!(grid.position(id), (expected_x, expected_y));
        }
    }

    #[test]
    fn test_fully_on_screen_bounds_are_non_strict() {
        // 100px tiles, no padding, 200x200 display: stagger is 50px.
        let mut grid: WallGrid<u32> = WallGrid::new(100, 100, 0, 200, 200).unwrap();
        grid.resize(200, 200).unwrap();
        assert_eq!(grid.columns(), 4);
        assert_eq!(grid.rows(), 2);
        grid.layout();

        // (1, 0) sits at the origin, comfortably inside.
        assert!(grid.is_fully_on_screen(SlotId::new(1, 0)));
        // (2, 0) ends exactly at the right display edge.
        assert_eq!(grid.position(SlotId::new(2, 0)), (100, 0));
        assert!(grid.is_fully_on_screen(SlotId::new(2, 0)));
        // (1, 1) ends exactly at the bottom display edge.
        assert_eq!(grid.position(SlotId::new(1, 1)), (50, 100));
        assert!(grid.is_fully_on_screen(SlotId::new(1, 1)));
        // (0, 0) hangs off the left edge, (2, 1) off the right.
        assert!(!grid.is_fully_on_screen(SlotId::new(0, 0)));
        assert!(!grid.is_fully_on_screen(SlotId::new(2, 1)));
    }

    #[test]
    fn test_selection_prefers_unassigned() {
        let mut grid = wall();
        grid.resize(500, 400).unwrap();
        grid.layout();

        let mut empty = HashSet::new();
        for id in grid.slot_ids().collect::<Vec<_>>() {
            if id.column < 2 {
                empty.insert(id);
            } else {
                grid.set_content(id, 0);
            }
        }

        for _ in 0..100 {
            let target = grid.next_load_target(false).unwrap();
            assert!(empty.contains(&target), "{target:?} was already assigned");
        }
    }

    #[test]
    fn test_selection_honors_full_visibility() {
        let mut grid: WallGrid<u32> = WallGrid::new(100, 100, 0, 200, 200).unwrap();
        grid.resize(200, 200).unwrap();
        grid.layout();

        for _ in 0..100 {
            let target = grid.next_load_target(true).unwrap();
            assert!(grid.is_fully_on_screen(target));
        }
    }

    #[test]
    fn test_selection_skips_hidden_slots() {
        let mut grid = wall();
        grid.resize(500, 400).unwrap();
        grid.layout();

        let hidden = SlotId::new(3, 2);
        grid.hide(hidden);
        for _ in 0..100 {
            assert_ne!(grid.next_load_target(false), Some(hidden));
        }
    }

    #[test]
    fn test_selection_none_when_all_hidden() {
        let mut grid = wall();
        grid.resize(500, 400).unwrap();
        grid.layout();

        for id in grid.slot_ids().collect::<Vec<_>>() {
            grid.hide(id);
        }
        assert_eq!(grid.next_load_target(false), None);
    }

    #[test]
    fn test_selection_falls_back_when_no_unassigned_slot_is_eligible() {
        let mut grid = wall();
        grid.resize(500, 400).unwrap();
        grid.layout();

        // One never-assigned slot, hidden; everything else loaded.
        let parked = SlotId::new(1, 1);
        for id in grid.slot_ids().collect::<Vec<_>>() {
            if id != parked {
                grid.set_content(id, 0);
            }
        }
        grid.hide(parked);

        // Drawing only from the never-assigned set would spin forever
        // here; the wall falls back to the already-assigned slots.
        let target = grid.next_load_target(false).unwrap();
        assert_ne!(target, parked);
        assert!(grid.content(target).is_some());
    }

    #[test]
    fn test_selection_stays_in_grid_after_shrink() {
        let mut grid = wall();
        grid.resize(500, 400).unwrap();
        grid.resize(200, 200).unwrap();
        grid.layout();

        for _ in 0..100 {
            let target = grid.next_load_target(false).unwrap();
            assert!(target.column < grid.columns());
            assert!(target.row < grid.rows());
        }
    }

    #[test]
    fn test_selection_covers_whole_grid_once_assigned() {
        let mut grid = wall();
        grid.resize(500, 400).unwrap();
        grid.layout();
        for id in grid.slot_ids().collect::<Vec<_>>() {
            grid.set_content(id, 0);
        }

        for _ in 0..100 {
            let target = grid.next_load_target(false).unwrap();
            assert!(target.column >= 0 && target.column < grid.columns());
            assert!(target.row >= 0 && target.row < grid.rows());
        }
    }

    #[test]
    fn test_hide_returns_content_and_show_restores_eligibility() {
        let mut grid = wall();
        grid.resize(500, 400).unwrap();
        grid.layout();

        let id = SlotId::new(2, 2);
        grid.set_content(id, 42);

        assert_eq!(grid.hide(id), Some(&42));
        assert!(!grid.is_visible(id));
        // Content survives the hide.
        assert_eq!(grid.content(id), Some(&42));

        grid.show(id);
        assert!(grid.is_visible(id));
    }

    #[test]
    fn test_unsized_wall_has_no_target() {
        let mut grid = wall();
        assert_eq!(grid.next_load_target(false), None);
        assert_eq!(grid.next_load_target(true), None);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_range_address_is_fatal() {
        let mut grid = wall();
        grid.resize(500, 400).unwrap();
        grid.position(SlotId::new(grid.columns(), 0));
    }

    #[test]
    fn test_arena_index_round_trip() {
        let mut grid = wall();
        grid.resize(500, 400).unwrap();

        let mut seen = HashSet::new();
        for id in grid.slot_ids() {
            let index = grid.arena_index(id);
            assert!(index < grid.grid_slot_count());
            assert!(seen.insert(index), "arena index {index} repeated");
        }
        assert_eq!(seen.len(), grid.grid_slot_count());
    }
}
