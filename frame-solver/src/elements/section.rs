//! Section properties for beam elements

use std::collections::BTreeSet;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::material::Material;
use crate::error::{FrameError, FrameResult};

/// Stable section identifier, never reused
pub type SectionId = usize;

/// Torsion constant assumed when none is given. Non-zero keeps the torsion
/// term of the stiffness matrix from vanishing.
pub const DEFAULT_TORSION_CONSTANT: f64 = 1e-9;

/// Editable cross-section and material property set
///
/// Local axes follow the element frame: local x runs along the member,
/// `izz` resists bending in the local x-y plane and `iyy` in the x-z plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    /// Cross-sectional area in m²
    pub area: f64,
    /// Modulus of elasticity in Pa
    pub modulus: f64,
    /// Shear modulus in Pa
    pub shear_modulus: f64,
    /// Torsion constant in m⁴; defaults to [`DEFAULT_TORSION_CONSTANT`]
    #[serde(default)]
    pub torsion: Option<f64>,
    /// Second moment about local y in m⁴; defaults to `izz`
    #[serde(default)]
    pub iyy: Option<f64>,
    /// Second moment about local z in m⁴
    pub izz: f64,
}

impl SectionProperties {
    /// Symmetric section with the default torsion constant
    pub fn new(area: f64, modulus: f64, shear_modulus: f64, izz: f64) -> Self {
        Self {
            area,
            modulus,
            shear_modulus,
            torsion: None,
            iyy: None,
            izz,
        }
    }

    /// Set the second moment about local y
    pub fn with_iyy(mut self, iyy: f64) -> Self {
        self.iyy = Some(iyy);
        self
    }

    /// Set the torsion constant
    pub fn with_torsion(mut self, torsion: f64) -> Self {
        self.torsion = Some(torsion);
        self
    }

    /// Solid rectangle; `depth` runs along local y, `width` along local z
    pub fn rectangular(material: Material, width: f64, depth: f64) -> Self {
        let area = width * depth;
        let izz = width * depth.powi(3) / 12.0;
        let iyy = depth * width.powi(3) / 12.0;

        // Torsional constant for rectangle (approximate)
        let (long, short) = if width > depth { (width, depth) } else { (depth, width) };
        let j = long * short.powi(3) / 3.0 * (1.0 - 0.63 * short / long);

        Self::new(area, material.e, material.g, izz)
            .with_iyy(iyy)
            .with_torsion(j)
    }

    /// Solid circle
    pub fn circular(material: Material, diameter: f64) -> Self {
        let r = diameter / 2.0;
        let area = PI * r.powi(2);
        let i = PI * r.powi(4) / 4.0;
        let j = PI * r.powi(4) / 2.0;

        Self::new(area, material.e, material.g, i).with_torsion(j)
    }

    /// Hollow circular (pipe) section
    pub fn pipe(material: Material, outer_diameter: f64, wall_thickness: f64) -> Self {
        let r_o = outer_diameter / 2.0;
        let r_i = r_o - wall_thickness;

        let area = PI * (r_o.powi(2) - r_i.powi(2));
        let i = PI * (r_o.powi(4) - r_i.powi(4)) / 4.0;
        let j = PI * (r_o.powi(4) - r_i.powi(4)) / 2.0;

        Self::new(area, material.e, material.g, i).with_torsion(j)
    }

    /// Box/tube section
    pub fn box_section(material: Material, width: f64, depth: f64, wall_thickness: f64) -> Self {
        let t = wall_thickness;
        let b = width;
        let d = depth;
        let bi = b - 2.0 * t;
        let di = d - 2.0 * t;

        let area = b * d - bi * di;
        let izz = (b * d.powi(3) - bi * di.powi(3)) / 12.0;
        let iyy = (d * b.powi(3) - di * bi.powi(3)) / 12.0;

        // Closed thin-walled section (Bredt)
        let am = (b - t) * (d - t);
        let s = 2.0 * (b + d) - 4.0 * t;
        let j = 4.0 * am.powi(2) * t / s;

        Self::new(area, material.e, material.g, izz)
            .with_iyy(iyy)
            .with_torsion(j)
    }

    /// Second moment about local y after defaulting
    pub fn resolved_iyy(&self) -> f64 {
        self.iyy.unwrap_or(self.izz)
    }

    /// Torsion constant after defaulting
    pub fn resolved_torsion(&self) -> f64 {
        self.torsion.unwrap_or(DEFAULT_TORSION_CONSTANT)
    }

    /// Reject non-finite or non-positive properties
    pub fn validate(&self) -> FrameResult<()> {
        let checks = [
            ("area", self.area),
            ("modulus", self.modulus),
            ("shear modulus", self.shear_modulus),
            ("torsion constant", self.resolved_torsion()),
            ("iyy", self.resolved_iyy()),
            ("izz", self.izz),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(FrameError::InvalidSection(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Length-independent bending products reused by every element on a section
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BendingCoefficients {
    pub ez12: f64,
    pub ez6: f64,
    pub ez4: f64,
    pub ez2: f64,
    pub ey12: f64,
    pub ey6: f64,
    pub ey4: f64,
    pub ey2: f64,
}

impl BendingCoefficients {
    fn from_properties(props: &SectionProperties) -> Self {
        let ez = props.modulus * props.izz;
        let ey = props.modulus * props.resolved_iyy();
        Self {
            ez12: 12.0 * ez,
            ez6: 6.0 * ez,
            ez4: 4.0 * ez,
            ez2: 2.0 * ez,
            ey12: 12.0 * ey,
            ey6: 6.0 * ey,
            ey4: 4.0 * ey,
            ey2: 2.0 * ey,
        }
    }
}

/// A section stored in the model, with the elements that reference it
#[derive(Debug, Clone)]
pub struct Section {
    properties: SectionProperties,
    coefficients: BendingCoefficients,
    owners: BTreeSet<usize>,
}

impl Section {
    /// Validate the properties and precompute the coefficients
    pub fn new(properties: SectionProperties) -> FrameResult<Self> {
        properties.validate()?;
        Ok(Self {
            coefficients: BendingCoefficients::from_properties(&properties),
            properties,
            owners: BTreeSet::new(),
        })
    }

    /// Replace the properties in place. Elements using this section keep
    /// stale stiffness until they are recalculated.
    pub fn modify(&mut self, properties: SectionProperties) -> FrameResult<()> {
        properties.validate()?;
        self.coefficients = BendingCoefficients::from_properties(&properties);
        self.properties = properties;
        Ok(())
    }

    pub fn properties(&self) -> &SectionProperties {
        &self.properties
    }

    pub fn coefficients(&self) -> &BendingCoefficients {
        &self.coefficients
    }

    pub fn area(&self) -> f64 {
        self.properties.area
    }

    pub fn modulus(&self) -> f64 {
        self.properties.modulus
    }

    pub fn shear_modulus(&self) -> f64 {
        self.properties.shear_modulus
    }

    pub fn torsion(&self) -> f64 {
        self.properties.resolved_torsion()
    }

    pub fn iyy(&self) -> f64 {
        self.properties.resolved_iyy()
    }

    pub fn izz(&self) -> f64 {
        self.properties.izz
    }

    /// Elements referencing this section
    pub fn owners(&self) -> impl Iterator<Item = usize> + '_ {
        self.owners.iter().copied()
    }

    pub(crate) fn add_owner(&mut self, element: usize) {
        self.owners.insert(element);
    }

    pub(crate) fn remove_owner(&mut self, element: usize) {
        self.owners.remove(&element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let props = SectionProperties::new(0.01, 200e9, 77e9, 2e-5);
        assert_eq!(props.resolved_iyy(), 2e-5);
        assert_eq!(props.resolved_torsion(), DEFAULT_TORSION_CONSTANT);
        assert!(props.resolved_torsion() > 0.0);
    }

    #[test]
    fn test_coefficients() {
        let section = Section::new(
            SectionProperties::new(0.01, 2.0, 1.0, 3.0).with_iyy(5.0),
        )
        .unwrap();
        let c = section.coefficients();
        assert_eq!(c.ez12, 72.0);
        assert_eq!(c.ez2, 12.0);
        assert_eq!(c.ey6, 60.0);
        assert_eq!(c.ey4, 40.0);
    }

    #[test]
    fn test_modify_recomputes() {
        let mut section = Section::new(SectionProperties::new(0.01, 1.0, 1.0, 1.0)).unwrap();
        section
            .modify(SectionProperties::new(0.01, 2.0, 1.0, 1.0))
            .unwrap();
        assert_eq!(section.coefficients().ez12, 24.0);
        assert_eq!(section.coefficients().ey12, 24.0);
    }

    #[test]
    fn test_invalid_rejected() {
        assert!(Section::new(SectionProperties::new(0.0, 1.0, 1.0, 1.0)).is_err());
        assert!(Section::new(SectionProperties::new(1.0, 1.0, 1.0, 1.0).with_torsion(-1.0)).is_err());

        let mut section = Section::new(SectionProperties::new(1.0, 1.0, 1.0, 1.0)).unwrap();
        assert!(section.modify(SectionProperties::new(1.0, f64::NAN, 1.0, 1.0)).is_err());
        assert_eq!(section.modulus(), 1.0);
    }

    #[test]
    fn test_rectangular_section() {
        let props = SectionProperties::rectangular(Material::steel(), 0.3, 0.5);
        assert!((props.area - 0.15).abs() < 1e-12);
        assert!((props.izz - 0.3 * 0.5_f64.powi(3) / 12.0).abs() < 1e-12);
        assert!((props.resolved_iyy() - 0.5 * 0.3_f64.powi(3) / 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_circular_section() {
        let props = SectionProperties::circular(Material::steel(), 0.5);
        assert!((props.area - PI * 0.25_f64.powi(2)).abs() < 1e-12);
        assert_eq!(props.resolved_iyy(), props.izz);
    }
}
