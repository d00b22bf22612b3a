//! Node loads - forces and moments applied directly to nodes

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, FrameResult};

/// One of the six load components acting at a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoadComponent {
    /// Force in global X
    Fx,
    /// Force in global Y
    Fy,
    /// Force in global Z
    Fz,
    /// Moment about global X
    Mx,
    /// Moment about global Y
    My,
    /// Moment about global Z
    Mz,
}

impl LoadComponent {
    /// All components in DOF order
    pub const ALL: [LoadComponent; 6] = [
        LoadComponent::Fx,
        LoadComponent::Fy,
        LoadComponent::Fz,
        LoadComponent::Mx,
        LoadComponent::My,
        LoadComponent::Mz,
    ];

    /// Position of this component within a node's 6-DOF block
    pub fn index(self) -> usize {
        match self {
            LoadComponent::Fx => 0,
            LoadComponent::Fy => 1,
            LoadComponent::Fz => 2,
            LoadComponent::Mx => 3,
            LoadComponent::My => 4,
            LoadComponent::Mz => 5,
        }
    }
}

impl TryFrom<usize> for LoadComponent {
    type Error = FrameError;

    fn try_from(index: usize) -> FrameResult<Self> {
        Self::ALL.get(index).copied().ok_or_else(|| {
            FrameError::InvalidInput(format!("load component index {index} is not in 0..6"))
        })
    }
}

/// A load applied directly to a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeLoad {
    /// Force in X direction (N)
    pub fx: f64,
    /// Force in Y direction (N)
    pub fy: f64,
    /// Force in Z direction (N)
    pub fz: f64,
    /// Moment about X axis (N·m)
    pub mx: f64,
    /// Moment about Y axis (N·m)
    pub my: f64,
    /// Moment about Z axis (N·m)
    pub mz: f64,
}

impl NodeLoad {
    /// Create a new node load with all components
    pub fn new(fx: f64, fy: f64, fz: f64, mx: f64, my: f64, mz: f64) -> Self {
        Self { fx, fy, fz, mx, my, mz }
    }

    /// Create a force-only node load
    pub fn force(fx: f64, fy: f64, fz: f64) -> Self {
        Self::new(fx, fy, fz, 0.0, 0.0, 0.0)
    }

    /// Create a moment-only node load
    pub fn moment(mx: f64, my: f64, mz: f64) -> Self {
        Self::new(0.0, 0.0, 0.0, mx, my, mz)
    }

    /// Build from an array [FX, FY, FZ, MX, MY, MZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3], arr[4], arr[5])
    }

    /// Get the load as an array [FX, FY, FZ, MX, MY, MZ]
    pub fn as_array(&self) -> [f64; 6] {
        [self.fx, self.fy, self.fz, self.mx, self.my, self.mz]
    }

    /// Read a single component
    pub fn component(&self, component: LoadComponent) -> f64 {
        self.as_array()[component.index()]
    }

    /// Overwrite a single component
    pub fn set_component(&mut self, component: LoadComponent, value: f64) {
        let mut arr = self.as_array();
        arr[component.index()] = value;
        *self = Self::from_array(arr);
    }

    /// True when every component is exactly zero
    pub fn is_zero(&self) -> bool {
        self.as_array().iter().all(|v| *v == 0.0)
    }

    /// Scale the load by a factor
    pub fn scaled(&self, factor: f64) -> Self {
        Self::from_array(self.as_array().map(|v| v * factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_roundtrip() {
        let mut load = NodeLoad::default();
        load.set_component(LoadComponent::Fy, -10.0);
        load.set_component(LoadComponent::Mz, 2.5);
        assert_eq!(load.as_array(), [0.0, -10.0, 0.0, 0.0, 0.0, 2.5]);
        assert_eq!(load.component(LoadComponent::Fy), -10.0);
        assert!(!load.is_zero());
    }

    #[test]
    fn test_component_from_index() {
        assert_eq!(LoadComponent::try_from(4).unwrap(), LoadComponent::My);
        assert!(LoadComponent::try_from(6).is_err());
    }

    #[test]
    fn test_scaled() {
        let load = NodeLoad::force(1.0, -2.0, 0.0).scaled(3.0);
        assert_eq!(load.fy, -6.0);
    }
}
