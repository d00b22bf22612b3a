//! Material properties used to build section property sets

use serde::{Deserialize, Serialize};

/// Elastic material constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Modulus of elasticity (Young's modulus) in Pa
    pub e: f64,
    /// Shear modulus in Pa
    pub g: f64,
    /// Poisson's ratio
    pub nu: f64,
}

impl Material {
    /// Create a new material with given properties
    pub fn new(e: f64, g: f64, nu: f64) -> Self {
        Self { e, g, nu }
    }

    /// Create a new isotropic material from E and nu
    /// G is calculated as E / (2 * (1 + nu))
    pub fn isotropic(e: f64, nu: f64) -> Self {
        let g = e / (2.0 * (1.0 + nu));
        Self::new(e, g, nu)
    }

    /// Structural steel
    pub fn steel() -> Self {
        Self {
            e: 200e9, // 200 GPa
            g: 77e9,  // 77 GPa
            nu: 0.3,
        }
    }

    /// Aluminum (6061-T6)
    pub fn aluminum() -> Self {
        Self {
            e: 68.9e9,
            g: 26e9,
            nu: 0.33,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::steel()
    }
}
