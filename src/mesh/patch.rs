use crate::geom::rotation::rotate_point_around_axis;
use crate::{Point, Vector};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Maps points on a cyclic patch onto its neighbour patch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CyclicTransform {
    /// Pure shift by `separation`.
    Translational { separation: Vector },
    /// Rotation by `angle` (radians) around `axis` through `centre`.
    Rotational {
        axis: Vector,
        centre: Point,
        angle: f64,
    },
}

impl CyclicTransform {
    pub fn apply(&self, pt: Point) -> Result<Point> {
        match self {
            Self::Translational { separation } => Ok(pt + *separation),
            Self::Rotational {
                axis,
                centre,
                angle,
            } => rotate_point_around_axis(pt, axis, *centre, *angle),
        }
    }

    /// Transform of the neighbour patch (maps back onto this one).
    pub fn inverse(&self) -> Self {
        match *self {
            Self::Translational { separation } => Self::Translational {
                separation: -separation,
            },
            Self::Rotational {
                axis,
                centre,
                angle,
            } => Self::Rotational {
                axis,
                centre,
                angle: -angle,
            },
        }
    }
}

/// Boundary patch category. Decides how a tracer continues at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PatchKind {
    /// Axisymmetric wedge side.
    Wedge,
    /// Planar symmetry.
    SymmetryPlane,
    /// Symmetry on a possibly curved surface.
    Symmetry,
    /// Periodic pair. Face `k` matches face `k` of `neighbour_patch`.
    Cyclic {
        neighbour_patch: usize,
        transform: CyclicTransform,
    },
    /// Cut between parallel subdomains. Face `k` matches face `k` of the
    /// processor patch on `neighbour_domain` that points back here.
    Processor { neighbour_domain: usize },
    Wall,
    /// Unclassified boundary.
    Generic,
}

impl PatchKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Wedge => "wedge",
            Self::SymmetryPlane => "symmetryPlane",
            Self::Symmetry => "symmetry",
            Self::Cyclic { .. } => "cyclic",
            Self::Processor { .. } => "processor",
            Self::Wall => "wall",
            Self::Generic => "patch",
        }
    }

    /// True for boundaries that are an artefact of mesh splitting or
    /// periodicity rather than a physical surface.
    pub fn is_coupled(&self) -> bool {
        matches!(self, Self::Cyclic { .. } | Self::Processor { .. })
    }
}

/// Named run of contiguous boundary faces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub name: String,
    pub kind: PatchKind,
    pub start: usize,
    pub size: usize,
}

impl Patch {
    pub fn new(name: &str, kind: PatchKind, start: usize, size: usize) -> Self {
        Self {
            name: name.to_string(),
            kind,
            start,
            size,
        }
    }

    pub fn faces(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.size
    }

    /// Index of mesh face `face` within this patch.
    pub fn local_index(&self, face: usize) -> Option<usize> {
        self.faces().contains(&face).then(|| face - self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translational_round_trip() -> Result<()> {
        let t = CyclicTransform::Translational {
            separation: Vector::new(2., 0., -1.),
        };
        let p = Point::new(0.3, 0.4, 0.5);
        let q = t.apply(p)?;
        assert!(q.is_close(&Point::new(2.3, 0.4, -0.5)));
        assert!(t.inverse().apply(q)?.is_close(&p));
        Ok(())
    }

    #[test]
    fn test_rotational_round_trip() -> Result<()> {
        let t = CyclicTransform::Rotational {
            axis: Vector::new(0., 0., 1.),
            centre: Point::origin(),
            angle: std::f64::consts::FRAC_PI_2,
        };
        let p = Point::new(1., 0., 0.3);
        let q = t.apply(p)?;
        assert!(q.is_close_tol(&Point::new(0., 1., 0.3), 1e-12));
        assert!(t.inverse().apply(q)?.is_close_tol(&p, 1e-12));
        Ok(())
    }

    #[test]
    fn test_patch_local_index() {
        let patch = Patch::new("inlet", PatchKind::Wall, 10, 4);
        assert_eq!(patch.local_index(10), Some(0));
        assert_eq!(patch.local_index(13), Some(3));
        assert_eq!(patch.local_index(14), None);
        assert_eq!(patch.local_index(9), None);
        assert_eq!(patch.kind.type_name(), "wall");
        assert!(!patch.kind.is_coupled());
        assert!(PatchKind::Processor { neighbour_domain: 1 }.is_coupled());
    }
}
