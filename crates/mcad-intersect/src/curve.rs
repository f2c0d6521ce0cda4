//! An intersection curve remembered by the ids of the surfaces that produced it.

use mcad_core::{EntityId, McadError, Result};
use mcad_geometry::InterpolatedCurve;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::intersection::Intersection;
use crate::loops::ParameterLoop;
use crate::raster::{rasterize, TrimMasks};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntersectionCurve {
    pub first: EntityId,
    pub second: EntityId,
    pub intersection: Intersection,
}

impl IntersectionCurve {
    pub fn new(first: EntityId, second: EntityId, intersection: Intersection) -> Self {
        Self {
            first,
            second,
            intersection,
        }
    }

    pub fn is_self_intersection(&self) -> bool {
        self.first == self.second
    }

    /// The parameter loops lying on surface `id`. A self-intersection has two.
    pub fn loops_for(&self, id: EntityId) -> Result<Vec<&ParameterLoop>> {
        let [a, b] = &self.intersection.loops;
        match (id == self.first, id == self.second) {
            (true, true) => Ok(vec![a, b]),
            (true, false) => Ok(vec![a]),
            (false, true) => Ok(vec![b]),
            (false, false) => Err(McadError::NotFound(format!(
                "surface {} is not part of intersection {} x {}",
                id, self.first, self.second
            ))),
        }
    }

    /// Trimming masks of surface `id` at `resolution x resolution`.
    #[instrument(skip(self))]
    pub fn trim_masks_for(&self, id: EntityId, resolution: usize) -> Result<TrimMasks> {
        rasterize(self.loops_for(id)?, resolution)
    }

    pub fn to_interpolated(&self) -> InterpolatedCurve {
        self.intersection.to_interpolated_curve()
    }
}
