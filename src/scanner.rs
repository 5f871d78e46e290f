//! Greedy decomposition of a [`PixelGrid`] into solid-color rectangles.
//!
//! Points are visited column by column (x outer, y inner). Each unclaimed
//! point grows one rectangle: rightward along its row, then downward while the
//! pixel below the starting column still matches. The rectangle's right edge
//! is the narrowest row reached, so every covered row is solid up to it. The
//! result is deterministic but not minimal.

use std::collections::HashMap;

use log::debug;

use crate::grid::{Color, PixelGrid};

/// Closed-interval rectangle in grid coordinates: covers x1..=x2, y1..=y2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
}

impl Rect {
    pub fn new(x1: usize, y1: usize, x2: usize, y2: usize) -> Self {
        debug_assert!(x1 <= x2 && y1 <= y2);
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> usize {
        self.x2 - self.x1 + 1
    }

    pub fn height(&self) -> usize {
        self.y2 - self.y1 + 1
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

}

/// Rectangles grouped by color, iterated in the order colors were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorGroups {
    groups: Vec<(Color, Vec<Rect>)>,
    index: HashMap<Color, usize>,
}

impl ColorGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, color: Color, rect: Rect) {
        let groups = &mut self.groups;
        let slot = *self.index.entry(color).or_insert_with(|| {
            groups.push((color, Vec::new()));
            groups.len() - 1
        });
        self.groups[slot].1.push(rect);
    }

    #[cfg(test)]
    pub fn get(&self, color: Color) -> Option<&[Rect]> {
        self.index.get(&color).map(|&i| self.groups[i].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Color, &[Rect])> + '_ {
        self.groups.iter().map(|(color, rects)| (*color, rects.as_slice()))
    }

    /// Distinct colors in first-seen order.
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.groups.iter().map(|(color, _)| *color)
    }

    pub fn color_count(&self) -> usize {
        self.groups.len()
    }

    pub fn rect_count(&self) -> usize {
        self.groups.iter().map(|(_, rects)| rects.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<(Color, Rect)> for ColorGroups {
    fn from_iter<I: IntoIterator<Item = (Color, Rect)>>(iter: I) -> Self {
        let mut groups = Self::new();
        for (color, rect) in iter {
            groups.push(color, rect);
        }
        groups
    }
}

/// Splits the grid into same-color rectangles that cover every pixel once.
pub fn scan(grid: &PixelGrid) -> ColorGroups {
    let mut groups = ColorGroups::new();
    if grid.is_empty() {
        return groups;
    }

    let (width, height) = (grid.width(), grid.height());
    let total = width * height;
    let mut claimed = vec![false; total];
    let mut claimed_count = 0;
    // Used to report progress as the grid is consumed
    let mut next_feedback = 10;

    for x in 0..width {
        for y in 0..height {
            if claimed[y * width + x] {
                continue;
            }

            let rect = grow_rect(grid, &claimed, x, y);
            for cy in rect.y1..=rect.y2 {
                claimed[cy * width + rect.x1..=cy * width + rect.x2].fill(true);
            }
            claimed_count += rect.area();
            groups.push(grid.get(x, y), rect);

            while claimed_count * 100 / total >= next_feedback {
                debug!("Scanned {}% of image.", next_feedback);
                next_feedback += 10;
            }
        }
    }

    debug!(
        "Scan found {} rectangles in {} colors.",
        groups.rect_count(),
        groups.color_count()
    );
    groups
}

/// Grows a single rectangle from the unclaimed point (x, y).
fn grow_rect(grid: &PixelGrid, claimed: &[bool], x: usize, y: usize) -> Rect {
    let color = grid.get(x, y);
    let width = grid.width();

    let mut extents = vec![row_extent(grid, x, y, color)];
    let mut last_y = y;
    // A rectangle started in an earlier column may already own the pixel
    // below, so a matching color alone is not enough to keep growing.
    while last_y + 1 < grid.height()
        && grid.get(x, last_y + 1) == color
        && !claimed[(last_y + 1) * width + x]
    {
        last_y += 1;
        extents.push(row_extent(grid, x, last_y, color));
    }

    let x2 = extents.iter().copied().min().unwrap_or(x);
    Rect::new(x, y, x2, last_y)
}

/// Rightmost x' >= x such that row y is `color` from x through x'.
fn row_extent(grid: &PixelGrid, x: usize, y: usize, color: Color) -> usize {
    let mut end = x;
    while end + 1 < grid.width() && grid.get(end + 1, y) == color {
        end += 1;
    }
    end
}
