// Delaunay triangulation of scattered samples
// Incremental Bowyer-Watson insertion inside a super-triangle

use std::collections::HashMap;

/// A sample location in grid coordinates (x = column, y = row)
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy)]
struct Circumcircle {
    cx: f64,
    cy: f64,
    radius_sq: f64,
}

impl Circumcircle {
    fn through(a: Point, b: Point, c: Point) -> Option<Self> {
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        if d.abs() < 1e-12 {
            return None;
        }

        let a2 = a.x * a.x + a.y * a.y;
        let b2 = b.x * b.x + b.y * b.y;
        let c2 = c.x * c.x + c.y * c.y;
        let cx = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
        let cy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;

        Some(Circumcircle {
            cx,
            cy,
            radius_sq: (a.x - cx).powi(2) + (a.y - cy).powi(2),
        })
    }

    /// Strict containment; points on the circle are outside so that
    /// cocircular grid samples do not produce overlapping triangles
    fn contains(&self, p: Point) -> bool {
        let dist_sq = (p.x - self.cx).powi(2) + (p.y - self.cy).powi(2);
        dist_sq < self.radius_sq * (1.0 - 1e-10)
    }
}

#[derive(Debug, Clone, Copy)]
struct Triangle {
    vertices: [usize; 3],
    circle: Option<Circumcircle>,
}

impl Triangle {
    fn new(vertices: [usize; 3], points: &[Point]) -> Self {
        let [a, b, c] = vertices;
        Triangle {
            vertices,
            circle: Circumcircle::through(points[a], points[b], points[c]),
        }
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

/// Triangulate `points`, returning vertex index triples into `points`
///
/// Fewer than three points, or only collinear points, give no triangles.
pub(crate) fn triangulate(points: &[Point]) -> Vec<[usize; 3]> {
    if points.len() < 3 {
        return Vec::new();
    }

    let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
    let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let dx = max_x - min_x;
    let dy = max_y - min_y;
    let delta = dx.max(dy).max(1.0);

    // Super-triangle occupies indices 0..3
    let mut vertices = Vec::with_capacity(points.len() + 3);
    vertices.push(Point::new(min_x - 10.0 * delta, min_y - delta));
    vertices.push(Point::new(min_x + 0.5 * dx, max_y + 10.0 * delta));
    vertices.push(Point::new(max_x + 10.0 * delta, min_y - delta));

    let mut triangles = vec![Triangle::new([0, 1, 2], &vertices)];

    for &point in points {
        let vi = vertices.len();
        vertices.push(point);

        let (bad, good): (Vec<Triangle>, Vec<Triangle>) = triangles
            .into_iter()
            .partition(|tri| tri.circle.map_or(false, |c| c.contains(point)));
        triangles = good;

        // Cavity boundary: edges used by exactly one bad triangle
        let mut edge_count: HashMap<(usize, usize), (usize, (usize, usize))> = HashMap::new();
        for tri in &bad {
            for (a, b) in tri.edges() {
                let key = (a.min(b), a.max(b));
                edge_count.entry(key).or_insert((0, (a, b))).0 += 1;
            }
        }

        for (count, (a, b)) in edge_count.into_values() {
            if count == 1 {
                triangles.push(Triangle::new([a, b, vi], &vertices));
            }
        }
    }

    triangles
        .into_iter()
        .filter(|tri| tri.circle.is_some() && tri.vertices.iter().all(|&v| v >= 3))
        .map(|tri| tri.vertices.map(|v| v - 3))
        .collect()
}

/// Barycentric coordinates (u, v, w) of `p` in triangle (a, b, c)
pub(crate) fn barycentric(p: Point, a: Point, b: Point, c: Point) -> (f64, f64, f64) {
    let (v0x, v0y) = (b.x - a.x, b.y - a.y);
    let (v1x, v1y) = (c.x - a.x, c.y - a.y);
    let (v2x, v2y) = (p.x - a.x, p.y - a.y);

    let dot00 = v0x * v0x + v0y * v0y;
    let dot01 = v0x * v1x + v0y * v1y;
    let dot02 = v0x * v2x + v0y * v2y;
    let dot11 = v1x * v1x + v1y * v1y;
    let dot12 = v1x * v2x + v1y * v2y;

    let inv_denom = 1.0 / (dot00 * dot11 - dot01 * dot01);
    let v = (dot11 * dot02 - dot01 * dot12) * inv_denom;
    let w = (dot00 * dot12 - dot01 * dot02) * inv_denom;

    (1.0 - v - w, v, w)
}
