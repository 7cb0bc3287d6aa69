//! Per-run accumulation of tracking results.

use crate::Point;
use serde::{Deserialize, Serialize};

/// Payloads and end points of tracers resolved into each cell.
///
/// Entry `i` of `data(cell)` belongs to entry `i` of `ends(cell)`. A tracer
/// stopped at a wall is recorded with its hit point, which lies in the cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingContext<T> {
    cell_to_data: Vec<Vec<T>>,
    cell_to_end: Vec<Vec<Point>>,
}

impl<T> TrackingContext<T> {
    pub fn new(n_cells: usize) -> Self {
        Self {
            cell_to_data: (0..n_cells).map(|_| Vec::new()).collect(),
            cell_to_end: vec![Vec::new(); n_cells],
        }
    }

    pub fn n_cells(&self) -> usize {
        self.cell_to_data.len()
    }

    pub fn record(&mut self, cell: usize, data: T, end: Point) {
        self.cell_to_data[cell].push(data);
        self.cell_to_end[cell].push(end);
    }

    pub fn data(&self, cell: usize) -> &[T] {
        &self.cell_to_data[cell]
    }

    pub fn ends(&self, cell: usize) -> &[Point] {
        &self.cell_to_end[cell]
    }

    /// Number of records over all cells.
    pub fn len(&self) -> usize {
        self.cell_to_data.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over `(cell, payload, end)` records in cell order.
    pub fn records(&self) -> impl Iterator<Item = (usize, &T, Point)> + '_ {
        self.cell_to_data
            .iter()
            .zip(&self.cell_to_end)
            .enumerate()
            .flat_map(|(cell, (data, ends))| {
                data.iter().zip(ends).map(move |(d, e)| (cell, d, *e))
            })
    }

    pub fn clear(&mut self) {
        self.cell_to_data.iter_mut().for_each(Vec::clear);
        self.cell_to_end.iter_mut().for_each(Vec::clear);
    }
}
