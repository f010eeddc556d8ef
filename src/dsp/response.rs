/*
Exponential Response
====================

Envelope segments are driven by a linear progress value (0.0 → 1.0). The
response curve bends that progress before it becomes a level:

    response(x) = (e^(k·x) - 1) / (e^k - 1)

  amount   0 %  →  k = 0, the curve degenerates to the identity (linear)
  amount 100 %  →  k = MAX_CURVATURE, slow start then a steep finish

      1.0 ┤            ..·
          │          .·
          │        .·      amount 0
          │      .·    ·
          │    .·    ·
          │  .·   · ·       amount 100
      0.0 ┼·──·─·─────────→ progress

The attack uses the curve directly. Decay and release run it backwards
(response(1 - progress)) so they fall quickly at first and then settle, which
is the shape acoustic sounds have.
*/

const MAX_CURVATURE: f32 = 8.0;
const LINEAR_THRESHOLD: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialResponse {
    amount: f32,
    curvature: f32,
    scale: f32, // 1 / (e^k - 1), cached
}

impl ExponentialResponse {
    /// `amount` is the curvature in percent and is clamped to `0..=100`.
    pub fn new(amount: f32) -> Self {
        let amount = if amount.is_finite() {
            amount.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let curvature = amount / 100.0 * MAX_CURVATURE;
        let scale = if curvature > LINEAR_THRESHOLD {
            1.0 / (curvature.exp() - 1.0)
        } else {
            1.0
        };

        Self {
            amount,
            curvature,
            scale,
        }
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    /// Map a progress value in `0.0..=1.0` through the curve.
    #[inline]
    pub fn response(&self, progress: f32) -> f32 {
        if progress.is_nan() || progress <= 0.0 {
            return 0.0;
        }
        if progress >= 1.0 {
            return 1.0;
        }
        if self.curvature <= LINEAR_THRESHOLD {
            return progress;
        }

        (((self.curvature * progress).exp() - 1.0) * self.scale).clamp(0.0, 1.0)
    }
}

impl Default for ExponentialResponse {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_amount_is_linear() {
        let curve = ExponentialResponse::new(0.0);
        for i in 0..=20 {
            let x = i as f32 / 20.0;
            assert!((curve.response(x) - x).abs() < 1e-6);
        }
    }

    #[test]
    fn endpoints_are_exact_for_every_amount() {
        for amount in [0.0, 2.0, 50.0, 100.0, 250.0, -10.0] {
            let curve = ExponentialResponse::new(amount);
            assert_eq!(curve.response(0.0), 0.0);
            assert_eq!(curve.response(1.0), 1.0);
        }
    }

    #[test]
    fn curve_is_monotonic() {
        for amount in [1.0, 30.0, 100.0] {
            let curve = ExponentialResponse::new(amount);
            let mut previous = 0.0;
            for i in 0..=1000 {
                let y = curve.response(i as f32 / 1000.0);
                assert!(y >= previous, "amount {amount} dipped at step {i}");
                previous = y;
            }
        }
    }

    #[test]
    fn more_amount_bends_further() {
        let gentle = ExponentialResponse::new(10.0);
        let steep = ExponentialResponse::new(100.0);
        assert!(steep.response(0.5) < gentle.response(0.5));
        assert!(gentle.response(0.5) < 0.5);
    }

    #[test]
    fn nan_progress_maps_to_zero() {
        assert_eq!(ExponentialResponse::new(40.0).response(f32::NAN), 0.0);
    }
}
