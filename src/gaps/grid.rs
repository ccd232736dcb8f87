// Gap filling for 2-D elevation grids
// Cubic scattered-data interpolation over a Delaunay triangulation

use ndarray::Array2;
use std::collections::VecDeque;

use super::edges::GapError;
use super::triangulation::{barycentric, triangulate, Point};

/// Tolerance for treating a cell on a triangle edge as inside
const INSIDE_EPS: f64 = -1e-10;

/// Valid cells within this many rows/columns of a hole support its patches
const RING_WIDTH: usize = 3;

/// Fill missing cells of an elevation grid
///
/// Missing cells are grouped into 8-connected holes. For each hole, the valid
/// cells within `RING_WIDTH` of it act as scattered samples at (column, row)
/// and are triangulated on their own. Hole cells inside that triangulation
/// are interpolated with a cubic Bézier patch per Delaunay triangle, built
/// from the vertex values and estimated vertex gradients. Cells outside the
/// hull of their surrounding samples stay NaN.
pub fn fill_grid_gaps(grid: &Array2<f64>) -> Result<Array2<f64>, GapError> {
    if grid.is_empty() {
        return Err(GapError::Empty);
    }

    let valid = grid.iter().filter(|z| z.is_finite()).count();
    if valid == 0 {
        return Err(GapError::AllInvalid(grid.len()));
    }
    if valid == grid.len() {
        return Ok(grid.clone());
    }

    let (labels, holes) = label_holes(grid);
    log::debug!(
        "{} missing cells in {} holes",
        grid.len() - valid,
        holes.len()
    );

    let mut filled = grid.clone();
    let mut seen = Array2::<usize>::zeros(grid.dim());
    for (i, cells) in holes.iter().enumerate() {
        let id = i + 1;
        let (points, values) = ring_samples(grid, cells, id, &mut seen);
        fill_hole(&mut filled, &labels, id, &points, &values);
    }

    let missing = filled.iter().filter(|z| !z.is_finite()).count();
    if missing > 0 {
        log::warn!("{} cells outside the valid hull remain missing", missing);
    }

    Ok(filled)
}

/// Label 8-connected runs of missing cells; label 0 marks valid cells and
/// hole `i` in the returned list carries label `i + 1`
fn label_holes(grid: &Array2<f64>) -> (Array2<usize>, Vec<Vec<(usize, usize)>>) {
    let (rows, cols) = grid.dim();
    let mut labels = Array2::<usize>::zeros((rows, cols));
    let mut holes = Vec::new();
    let mut queue = VecDeque::new();

    for ((row, col), z) in grid.indexed_iter() {
        if z.is_finite() || labels[[row, col]] != 0 {
            continue;
        }

        let id = holes.len() + 1;
        let mut cells = Vec::new();
        labels[[row, col]] = id;
        queue.push_back((row, col));

        while let Some((r, c)) = queue.pop_front() {
            cells.push((r, c));
            for nr in r.saturating_sub(1)..=(r + 1).min(rows - 1) {
                for nc in c.saturating_sub(1)..=(c + 1).min(cols - 1) {
                    if labels[[nr, nc]] == 0 && !grid[[nr, nc]].is_finite() {
                        labels[[nr, nc]] = id;
                        queue.push_back((nr, nc));
                    }
                }
            }
        }

        holes.push(cells);
    }

    (labels, holes)
}

/// Valid cells within `RING_WIDTH` of a hole, each taken once
fn ring_samples(
    grid: &Array2<f64>,
    cells: &[(usize, usize)],
    id: usize,
    seen: &mut Array2<usize>,
) -> (Vec<Point>, Vec<f64>) {
    let (rows, cols) = grid.dim();
    let mut points = Vec::new();
    let mut values = Vec::new();

    for &(r, c) in cells {
        for nr in r.saturating_sub(RING_WIDTH)..=(r + RING_WIDTH).min(rows - 1) {
            for nc in c.saturating_sub(RING_WIDTH)..=(c + RING_WIDTH).min(cols - 1) {
                let z = grid[[nr, nc]];
                if z.is_finite() && seen[[nr, nc]] != id {
                    seen[[nr, nc]] = id;
                    points.push(Point::new(nc as f64, nr as f64));
                    values.push(z);
                }
            }
        }
    }

    (points, values)
}

/// Interpolate the cells labelled `id` from the samples around them
fn fill_hole(
    filled: &mut Array2<f64>,
    labels: &Array2<usize>,
    id: usize,
    points: &[Point],
    values: &[f64],
) {
    let triangles = triangulate(points);
    if triangles.is_empty() {
        log::warn!(
            "Cannot triangulate {} cells around hole {} (collinear?), leaving it unfilled",
            points.len(),
            id
        );
        return;
    }

    let gradients = vertex_gradients(points, values, &triangles);
    let (rows, cols) = filled.dim();

    for tri in &triangles {
        let [a, b, c] = tri.map(|i| points[i]);
        let patch = CubicPatch::new(*tri, points, values, &gradients);

        let row_min = a.y.min(b.y).min(c.y).ceil().max(0.0) as usize;
        let row_max = (a.y.max(b.y).max(c.y).floor() as usize).min(rows - 1);
        let col_min = a.x.min(b.x).min(c.x).ceil().max(0.0) as usize;
        let col_max = (a.x.max(b.x).max(c.x).floor() as usize).min(cols - 1);

        for row in row_min..=row_max {
            for col in col_min..=col_max {
                if labels[[row, col]] != id || filled[[row, col]].is_finite() {
                    continue;
                }
                let p = Point::new(col as f64, row as f64);
                let (u, v, w) = barycentric(p, a, b, c);
                if u >= INSIDE_EPS && v >= INSIDE_EPS && w >= INSIDE_EPS {
                    filled[[row, col]] = patch.eval(u, v, w);
                }
            }
        }
    }
}

/// Area-weighted average of the planar gradients of the triangles
/// around each vertex
fn vertex_gradients(points: &[Point], values: &[f64], triangles: &[[usize; 3]]) -> Vec<(f64, f64)> {
    let mut sums = vec![(0.0, 0.0, 0.0); points.len()];

    for tri in triangles {
        let [i0, i1, i2] = *tri;
        let (p0, p1, p2) = (points[i0], points[i1], points[i2]);
        let (e1x, e1y, dz1) = (p1.x - p0.x, p1.y - p0.y, values[i1] - values[i0]);
        let (e2x, e2y, dz2) = (p2.x - p0.x, p2.y - p0.y, values[i2] - values[i0]);

        let det = e1x * e2y - e1y * e2x;
        if det.abs() < 1e-12 {
            continue;
        }
        let gx = (dz1 * e2y - dz2 * e1y) / det;
        let gy = (e1x * dz2 - e2x * dz1) / det;
        let area = 0.5 * det.abs();

        for &i in tri {
            sums[i].0 += area * gx;
            sums[i].1 += area * gy;
            sums[i].2 += area;
        }
    }

    sums.into_iter()
        .map(|(gx, gy, area)| if area > 0.0 { (gx / area, gy / area) } else { (0.0, 0.0) })
        .collect()
}

/// Cubic triangular Bézier patch
///
/// Control net layout: `[b300, b030, b003, b210, b201, b120, b021, b102, b012, b111]`.
/// Edge control points follow the vertex tangent planes, so neighbouring
/// patches agree along shared edges (continuous, not slope-matched) and a
/// planar surface is reproduced exactly.
struct CubicPatch {
    b: [f64; 10],
}

impl CubicPatch {
    fn new(tri: [usize; 3], points: &[Point], values: &[f64], gradients: &[(f64, f64)]) -> Self {
        let [i0, i1, i2] = tri;
        let (p0, p1, p2) = (points[i0], points[i1], points[i2]);

        // Value at `from` moved a third of the way towards `to` along its tangent plane
        let toward = |from: usize, p_from: Point, p_to: Point| {
            let (gx, gy) = gradients[from];
            values[from] + (gx * (p_to.x - p_from.x) + gy * (p_to.y - p_from.y)) / 3.0
        };

        let b210 = toward(i0, p0, p1);
        let b201 = toward(i0, p0, p2);
        let b120 = toward(i1, p1, p0);
        let b021 = toward(i1, p1, p2);
        let b102 = toward(i2, p2, p0);
        let b012 = toward(i2, p2, p1);

        let edge_mean = (b210 + b201 + b120 + b021 + b102 + b012) / 6.0;
        let vertex_mean = (values[i0] + values[i1] + values[i2]) / 3.0;
        let b111 = edge_mean + (edge_mean - vertex_mean) / 2.0;

        CubicPatch {
            b: [values[i0], values[i1], values[i2], b210, b201, b120, b021, b102, b012, b111],
        }
    }

    fn eval(&self, u: f64, v: f64, w: f64) -> f64 {
        let [b300, b030, b003, b210, b201, b120, b021, b102, b012, b111] = self.b;
        u * u * u * b300
            + v * v * v * b030
            + w * w * w * b003
            + 3.0 * u * u * v * b210
            + 3.0 * u * u * w * b201
            + 3.0 * u * v * v * b120
            + 3.0 * v * v * w * b021
            + 3.0 * u * w * w * b102
            + 3.0 * v * w * w * b012
            + 6.0 * u * v * w * b111
    }
}
