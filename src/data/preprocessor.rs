// ============================================================
// Layer 4 — Standard Scaler
// ============================================================
// Rescales every feature column to zero mean and unit variance:
//
//   z = (x - mean) / std
//
// The statistics are learned from the TRAINING rows only and
// then applied unchanged to the test rows, so no information
// about the test set leaks into training.
//
// std is the population standard deviation (ddof = 0). A
// constant column has std = 0; its scale is set to 1 so the
// column becomes all zeros instead of NaN.
//
// Only the dense network consumes scaled features. The trees
// split on raw values.
//
// Reference: ndarray documentation (mean_axis, std_axis,
//            broadcasting arithmetic)

use anyhow::{bail, ensure, Context, Result};
use ndarray::{Array1, Array2, Axis};

/// Scales below this are treated as zero
const MIN_SCALE: f32 = 10.0 * f32::EPSILON;

#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    mean:  Option<Array1<f32>>,
    scale: Option<Array1<f32>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn per-column mean and standard deviation from `x`.
    pub fn fit(&mut self, x: &Array2<f32>) -> Result<()> {
        ensure!(x.nrows() > 0, "Cannot fit a scaler on an empty feature table");

        let mean = x
            .mean_axis(Axis(0))
            .context("Cannot compute column means")?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s < MIN_SCALE { 1.0 } else { s });

        tracing::debug!("Scaler fitted on {} rows × {} columns", x.nrows(), x.ncols());

        self.mean  = Some(mean);
        self.scale = Some(scale);
        Ok(())
    }

    /// Apply the learned scaling to `x`.
    pub fn transform(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        let (Some(mean), Some(scale)) = (&self.mean, &self.scale) else {
            bail!("StandardScaler must be fitted before transform");
        };
        ensure!(
            x.ncols() == mean.len(),
            "Scaler was fitted on {} features but got {}",
            mean.len(),
            x.ncols()
        );

        // [n, d] - [d] broadcasts the row vector over every row
        let centered = x - mean;
        Ok(&centered / scale)
    }

    pub fn fit_transform(&mut self, x: &Array2<f32>) -> Result<Array2<f32>> {
        self.fit(x)?;
        self.transform(x)
    }

    pub fn mean(&self) -> Option<&Array1<f32>> {
        self.mean.as_ref()
    }

    pub fn scale(&self) -> Option<&Array1<f32>> {
        self.scale.as_ref()
    }
}
