use crate::permutation::PermutationTable;

/// Magnitude bound of a single octave with the four diagonal gradients.
/// Reached at cell centres when all four corner gradients point at the centre.
pub const SINGLE_OCTAVE_BOUND: f64 = 1.0;

/// Single-octave 2D Perlin noise over a borrowed permutation table.
#[derive(Debug, Clone, Copy)]
pub struct GradientNoise<'a> {
    table: &'a PermutationTable,
}

impl<'a> GradientNoise<'a> {
    pub fn new(table: &'a PermutationTable) -> Self {
        GradientNoise { table }
    }

    /// Evaluates the noise at `(x, y)`. Lattice points always return 0.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        let floor_x = x.floor();
        let floor_y = y.floor();
        let xf = x - floor_x;
        let yf = y - floor_y;

        let cell_x = floor_x as i64;
        let cell_y = floor_y as i64;
        let next_x = cell_x.wrapping_add(1);
        let next_y = cell_y.wrapping_add(1);

        // Hash each corner of the cell containing the point
        let bottom_left = self.table.hash(cell_x, cell_y);
        let bottom_right = self.table.hash(next_x, cell_y);
        let top_left = self.table.hash(cell_x, next_y);
        let top_right = self.table.hash(next_x, next_y);

        // Gradient at each corner dotted with the corner-to-point vector
        let dot_bottom_left = dot(gradient(bottom_left), xf, yf);
        let dot_bottom_right = dot(gradient(bottom_right), xf - 1.0, yf);
        let dot_top_left = dot(gradient(top_left), xf, yf - 1.0);
        let dot_top_right = dot(gradient(top_right), xf - 1.0, yf - 1.0);

        let u = fade(xf);
        let v = fade(yf);
        lerp(
            lerp(dot_bottom_left, dot_top_left, v),
            lerp(dot_bottom_right, dot_top_right, v),
            u,
        )
    }
}

/// Quintic ease curve `6t^5 - 15t^4 + 10t^3`.
#[inline]
pub fn fade(t: f64) -> f64 {
    ((6.0 * t - 15.0) * t + 10.0) * t * t * t
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Picks one of the four diagonal gradients from the low two bits of a hash.
#[inline]
pub fn gradient(hash: u8) -> (f64, f64) {
    match hash & 3 {
        0 => (1.0, 1.0),
        1 => (-1.0, 1.0),
        2 => (1.0, -1.0),
        _ => (-1.0, -1.0),
    }
}

#[inline]
fn dot(gradient: (f64, f64), dx: f64, dy: f64) -> f64 {
    gradient.0 * dx + gradient.1 * dy
}
