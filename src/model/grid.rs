//! Uniform spatial grid used to enumerate residue pairs within a distance cutoff.
//!
//! Large biological assemblies contain hundreds of thousands of residues, so the
//! quadratic all-against-all scan is replaced by binning representative points into cubic
//! cells whose side equals the cutoff. A fixed-radius query then only visits the 3×3×3
//! block of cells around the query point.

use super::types::Point;
use nalgebra::Vector3;

/// Sentinel value terminating a cell's linked list.
const SENTINEL: u32 = u32::MAX;

/// Cell-linked list over `(position, item)` pairs.
///
/// # Performance
///
/// - Construction: **O(N)** in the number of items.
/// - Fixed-radius queries: **O(k)** in the number of items of the visited cells.
#[derive(Debug, Clone)]
pub struct Grid<T> {
    cell_size: f64,
    origin: Point,
    dims: Vector3<usize>,
    /// First item of each cell.
    head: Vec<u32>,
    /// Next item in the same cell.
    next: Vec<u32>,
    items: Vec<(Point, T)>,
}

impl<T> Grid<T> {
    /// Bins the provided items into cells of side `cell_size`.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not strictly positive.
    pub fn new(items: impl IntoIterator<Item = (Point, T)>, cell_size: f64) -> Self {
        assert!(cell_size > 0.0, "Cell size must be positive");

        let items: Vec<_> = items.into_iter().collect();
        if items.is_empty() {
            return Self {
                cell_size,
                origin: Point::origin(),
                dims: Vector3::zeros(),
                head: Vec::new(),
                next: Vec::new(),
                items,
            };
        }

        let mut min = Point::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point::new(f64::MIN, f64::MIN, f64::MIN);
        for (pos, _) in &items {
            min = min.inf(pos);
            max = max.sup(pos);
        }

        let extent = (max - min).add_scalar(1e-6);
        let dims = extent.map(|e| ((e / cell_size).ceil() as usize).max(1));

        let mut head = vec![SENTINEL; dims.x * dims.y * dims.z];
        let mut next = vec![SENTINEL; items.len()];

        for (i, (pos, _)) in items.iter().enumerate() {
            let cell = Self::cell_coords(pos, &min, cell_size, &dims);
            let idx = cell.x + cell.y * dims.x + cell.z * dims.x * dims.y;
            next[i] = head[idx];
            head[idx] = i as u32;
        }

        Self {
            cell_size,
            origin: min,
            dims,
            head,
            next,
            items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Clamped integer cell coordinates of `pos`.
    fn cell_coords(
        pos: &Point,
        origin: &Point,
        cell_size: f64,
        dims: &Vector3<usize>,
    ) -> Vector3<usize> {
        let offset = pos - origin;
        Vector3::new(
            Self::clamp_axis(offset.x / cell_size, dims.x),
            Self::clamp_axis(offset.y / cell_size, dims.y),
            Self::clamp_axis(offset.z / cell_size, dims.z),
        )
    }

    fn clamp_axis(value: f64, dim: usize) -> usize {
        (value.floor().max(0.0) as usize).min(dim.saturating_sub(1))
    }

    /// Yields every item whose stored position lies within `radius` (inclusive) of
    /// `center`, together with that position.
    pub fn within<'a>(&'a self, center: &Point, radius: f64) -> Neighborhood<'a, T> {
        if self.items.is_empty() {
            return Neighborhood {
                grid: self,
                lo: Vector3::zeros(),
                hi: Vector3::zeros(),
                cursor: Vector3::new(0, 0, 1),
                item: SENTINEL,
                center: *center,
                radius_sq: radius * radius,
            };
        }

        let span = Vector3::repeat(radius);
        let lo = Self::cell_coords(&(center - span), &self.origin, self.cell_size, &self.dims);
        let hi = Self::cell_coords(&(center + span), &self.origin, self.cell_size, &self.dims);

        Neighborhood {
            grid: self,
            lo,
            hi,
            cursor: lo,
            item: SENTINEL,
            center: *center,
            radius_sq: radius * radius,
        }
    }
}

/// Iterator over the items of a fixed-radius query.
pub struct Neighborhood<'a, T> {
    grid: &'a Grid<T>,
    lo: Vector3<usize>,
    hi: Vector3<usize>,
    cursor: Vector3<usize>,
    item: u32,
    center: Point,
    radius_sq: f64,
}

impl<'a, T> Iterator for Neighborhood<'a, T> {
    type Item = (&'a Point, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            while self.item != SENTINEL {
                let idx = self.item as usize;
                self.item = self.grid.next[idx];
                let (pos, item) = &self.grid.items[idx];
                if nalgebra::distance_squared(pos, &self.center) <= self.radius_sq {
                    return Some((pos, item));
                }
            }

            if self.cursor.x > self.hi.x {
                self.cursor.x = self.lo.x;
                self.cursor.y += 1;
            }
            if self.cursor.y > self.hi.y {
                self.cursor.y = self.lo.y;
                self.cursor.z += 1;
            }
            if self.cursor.z > self.hi.z {
                return None;
            }

            let dims = &self.grid.dims;
            let cell = self.cursor.x + self.cursor.y * dims.x + self.cursor.z * dims.x * dims.y;
            self.cursor.x += 1;

            if let Some(&head) = self.grid.head.get(cell) {
                self.item = head;
            }
        }
    }
}
