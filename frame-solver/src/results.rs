//! Result types for frame analysis

use serde::{Deserialize, Serialize};

use crate::analysis::SolveMethod;
use crate::elements::NodeSlot;

/// Displacement results at a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplacement {
    /// Displacement in X direction
    pub dx: f64,
    /// Displacement in Y direction
    pub dy: f64,
    /// Displacement in Z direction
    pub dz: f64,
    /// Rotation about X axis
    pub rx: f64,
    /// Rotation about Y axis
    pub ry: f64,
    /// Rotation about Z axis
    pub rz: f64,
}

impl NodeDisplacement {
    /// Create from array [DX, DY, DZ, RX, RY, RZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            dx: arr[0],
            dy: arr[1],
            dz: arr[2],
            rx: arr[3],
            ry: arr[4],
            rz: arr[5],
        }
    }

    /// Get as array [DX, DY, DZ, RX, RY, RZ]
    pub fn as_array(&self) -> [f64; 6] {
        [self.dx, self.dy, self.dz, self.rx, self.ry, self.rz]
    }

    pub fn is_zero(&self) -> bool {
        self.as_array().iter().all(|v| *v == 0.0)
    }

    /// Get translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2) + self.dz.powi(2)).sqrt()
    }

    /// Get rotation magnitude
    pub fn rotation_magnitude(&self) -> f64 {
        (self.rx.powi(2) + self.ry.powi(2) + self.rz.powi(2)).sqrt()
    }
}

/// Summary of a successful solve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveSummary {
    /// Solver that produced the displacements
    pub method: SolveMethod,
    /// Nodes that took part in the system
    pub used_nodes: usize,
    /// Nodes removed by fixed supports
    pub fixed_nodes: usize,
    /// DOFs before elimination
    pub total_dofs: usize,
    /// DOFs actually solved for
    pub reduced_dofs: usize,
    /// Largest translation magnitude
    pub max_displacement: f64,
    /// Node with the largest translation
    pub max_disp_node: Option<NodeSlot>,
}
