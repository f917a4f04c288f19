// Natural cubic spline
//
// Same construction as the cubic spline planner: second derivatives at both
// ends are zero and the tridiagonal system for the `c` coefficients is solved
// with nalgebra. Outside the knot range the curve continues as a straight line.

use nalgebra::{DMatrix, DVector};

use crate::common::{PlannerError, PlannerResult};

#[derive(Debug, Clone)]
pub struct CubicSpline {
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
    x: Vec<f64>,
}

impl CubicSpline {
    /// Fit through `(x[i], y[i])`; `x` must be strictly increasing
    pub fn new(x: &[f64], y: &[f64]) -> PlannerResult<CubicSpline> {
        if x.len() != y.len() {
            return Err(PlannerError::PlanningError(format!(
                "spline needs matching knots, got {} x and {} y",
                x.len(),
                y.len()
            )));
        }
        let nx = x.len();
        if nx < 2 {
            return Err(PlannerError::PlanningError(format!(
                "spline needs at least 2 knots, got {}",
                nx
            )));
        }

        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        if let Some(i) = h.iter().position(|&hi| !(hi > 0.0)) {
            return Err(PlannerError::PlanningError(format!(
                "spline knots must strictly increase, x[{}]={} x[{}]={}",
                i,
                x[i],
                i + 1,
                x[i + 1]
            )));
        }

        let a = y.to_vec();
        let a_mat = Self::calc_a(&h);
        let b_vec = Self::calc_b(&h, &a);

        let c_na = a_mat
            .lu()
            .solve(&b_vec)
            .ok_or_else(|| PlannerError::PlanningError("singular spline system".to_string()))?;
        let c: Vec<f64> = c_na.iter().copied().collect();

        let mut b = Vec::with_capacity(nx - 1);
        let mut d = Vec::with_capacity(nx - 1);
        for i in 0..nx - 1 {
            d.push((c[i + 1] - c[i]) / (3.0 * h[i]));
            b.push((a[i + 1] - a[i]) / h[i] - h[i] * (c[i + 1] + 2.0 * c[i]) / 3.0);
        }

        Ok(CubicSpline { a, b, c, d, x: x.to_vec() })
    }

    pub fn calc(&self, t: f64) -> f64 {
        let n = self.x.len();
        if t < self.x[0] {
            return self.a[0] + self.slope(0, 0.0) * (t - self.x[0]);
        }
        if t > self.x[n - 1] {
            let last = n - 2;
            let h = self.x[n - 1] - self.x[last];
            return self.a[n - 1] + self.slope(last, h) * (t - self.x[n - 1]);
        }
        let i = self.search_index(t);
        let dx = t - self.x[i];
        self.a[i] + self.b[i] * dx + self.c[i] * dx.powi(2) + self.d[i] * dx.powi(3)
    }

    /// First derivative
    pub fn calcd(&self, t: f64) -> f64 {
        let n = self.x.len();
        if t < self.x[0] {
            return self.slope(0, 0.0);
        }
        if t > self.x[n - 1] {
            let last = n - 2;
            return self.slope(last, self.x[n - 1] - self.x[last]);
        }
        let i = self.search_index(t);
        self.slope(i, t - self.x[i])
    }

    fn slope(&self, i: usize, dx: f64) -> f64 {
        self.b[i] + 2.0 * self.c[i] * dx + 3.0 * self.d[i] * dx.powi(2)
    }

    /// Segment holding `t`, clamped to the valid segment range
    fn search_index(&self, t: f64) -> usize {
        let upper = self.x.partition_point(|&xi| xi <= t);
        upper.saturating_sub(1).min(self.x.len() - 2)
    }

    fn calc_a(h: &[f64]) -> DMatrix<f64> {
        let nx = h.len() + 1;
        let mut a = DMatrix::zeros(nx, nx);
        a[(0, 0)] = 1.0;
        for i in 0..nx - 1 {
            if i != nx - 2 {
                a[(i + 1, i + 1)] = 2.0 * (h[i] + h[i + 1]);
            }
            a[(i + 1, i)] = h[i];
            a[(i, i + 1)] = h[i];
        }
        a[(0, 1)] = 0.0;
        a[(nx - 1, nx - 2)] = 0.0;
        a[(nx - 1, nx - 1)] = 1.0;
        a
    }

    fn calc_b(h: &[f64], a: &[f64]) -> DVector<f64> {
        let nx = h.len() + 1;
        let mut b = DVector::zeros(nx);
        for i in 0..nx.saturating_sub(2) {
            b[i + 1] = 3.0 * (a[i + 2] - a[i + 1]) / h[i + 1] - 3.0 * (a[i + 1] - a[i]) / h[i];
        }
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolates_knots() {
        let x = [0.0, 10.0, 20.5, 30.0, 40.5, 50.0];
        let y = [0.0, -6.0, 5.0, 6.5, 0.0, -4.0];
        let sp = CubicSpline::new(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert!((sp.calc(*xi) - yi).abs() < 1e-9);
        }
    }

    #[test]
    fn test_two_knots_is_a_line() {
        let sp = CubicSpline::new(&[0.0, 10.0], &[1.0, 6.0]).unwrap();
        assert!((sp.calc(5.0) - 3.5).abs() < 1e-12);
        assert!((sp.calcd(2.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_reproduces_straight_line() {
        let x = [0.0, 3.0, 30.0, 60.0, 90.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v - 1.0).collect();
        let sp = CubicSpline::new(&x, &y).unwrap();
        for t in [1.0, 17.0, 44.4, 89.0] {
            assert!((sp.calc(t) - (2.0 * t - 1.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_linear_extrapolation() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 0.0, 1.0];
        let sp = CubicSpline::new(&x, &y).unwrap();
        let slope = sp.calcd(3.0);
        assert!((sp.calc(5.0) - (1.0 + 2.0 * slope)).abs() < 1e-9);
        let slope0 = sp.calcd(0.0);
        assert!((sp.calc(-1.0) + slope0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_knots() {
        assert!(CubicSpline::new(&[0.0], &[0.0]).is_err());
        assert!(CubicSpline::new(&[0.0, 1.0], &[0.0]).is_err());
        assert!(CubicSpline::new(&[0.0, 1.0, 1.0], &[0.0, 1.0, 2.0]).is_err());
        assert!(CubicSpline::new(&[0.0, 2.0, 1.0], &[0.0, 1.0, 2.0]).is_err());
    }
}
