//! Pose reconstruction between the FK and IK representations of a three
//! joint limb chain.
//!
//! Both solves work on plain transforms and positions so they stay
//! independent of any scene type. Sign conventions differ per side and limb:
//! right-side controls are behavior-mirrored, which shows up as negated
//! local axes and a 180 degree flip about local x on the end effector.

use glam::Vec3;
use thiserror::Error;
use tracing::debug;

use scene::Transform;

use crate::rig::{Limb, Side};

/// Distance from the mid joint to the pole control along the pole direction.
pub const DEFAULT_POLE_DEPTH: f32 = 10.0;

// sin^2 of the angle below which two directions count as parallel.
const DEGENERATE_SIN2: f32 = 1e-12;

#[derive(Debug, Error)]
#[error("Degenerate pose: pole direction is undefined")]
pub struct DegeneratePose;

/// Result of an FK -> IK solve.
#[derive(Clone, Copy, Debug)]
pub struct IkPose {
    pub target: Transform,
    pub pole_point: Vec3,
}

/// Result of an IK -> FK solve: new transforms for the three FK controls.
#[derive(Clone, Copy, Debug)]
pub struct FkPose {
    pub fk1: Transform,
    pub fk2: Transform,
    pub fk3: Transform,
}

/// Positions read from the FK chain, used as the position reference for the
/// IK -> FK solve.
#[derive(Clone, Copy, Debug)]
pub struct ChainPositions {
    pub fk1: Vec3,
    pub fk2: Vec3,
    /// Mid bind joint. Tracks the active representation, so it is the
    /// reliable mid position whichever mode drives the limb.
    pub fk2_jnt: Vec3,
}

/// Normalized cross product, failing when the inputs are parallel.
fn cross_dir(a: Vec3, b: Vec3) -> Result<Vec3, DegeneratePose> {
    let cross = a.cross(b);
    if cross.length_squared() <= a.length_squared() * b.length_squared() * DEGENERATE_SIN2 {
        return Err(DegeneratePose);
    }
    Ok(cross.normalize())
}

/// Compute the IK end-effector transform and pole point matching an FK pose.
///
/// The pole point extends from the mid joint along the cross product of the
/// limb vector (fk1 to fk3) and the limb bend.
pub fn solve_fk_to_ik(
    side: Side,
    limb: Limb,
    fk1: &Transform,
    fk2: &Transform,
    fk3: &Transform,
    pole_depth: f32,
) -> Result<IkPose, DegeneratePose> {
    let limb_v = fk3.translation - fk1.translation;
    let limb_bend = match limb {
        Limb::Arm => -fk2.y_axis(),
        Limb::Leg => fk2.x_axis(),
    };
    let pole_dir = cross_dir(limb_v, limb_bend)?;
    let pole_point = fk2.translation + pole_dir * pole_depth;
    debug!(?pole_dir, ?pole_point, "Computed pole");

    let mut target = *fk3;
    if side == Side::Rt {
        target.rotate_local_x(180.0);
    }

    Ok(IkPose { target, pole_point })
}

/// Compute FK control transforms matching an IK pose.
///
/// Each joint's local axes are rebuilt from the chain positions and the pole
/// vector; the end effector copies the IK control orientation.
pub fn solve_ik_to_fk(
    side: Side,
    limb: Limb,
    ik: &Transform,
    pole_pos: Vec3,
    chain: &ChainPositions,
) -> Result<FkPose, DegeneratePose> {
    // fk1
    let upper_v = chain.fk2_jnt - chain.fk1;
    let pole_v = pole_pos - chain.fk1;
    let (lx, ly) = match limb {
        Limb::Arm => {
            let ly = cross_dir(upper_v, pole_v)?;
            let mut lx = upper_v.normalize();
            if side == Side::Rt {
                lx = -lx;
            }
            (lx, ly)
        }
        Limb::Leg => {
            let lx = -cross_dir(upper_v, pole_v)?;
            let mut ly = -upper_v.normalize();
            if side == Side::Rt {
                ly = -ly;
            }
            (lx, ly)
        }
    };
    let fk1 = Transform::from_axes(chain.fk1, lx, ly);

    // fk2
    let lower_v = ik.translation - chain.fk2_jnt;
    let pole_v = pole_pos - chain.fk2_jnt;
    let (lx, ly) = match limb {
        Limb::Arm => {
            let mut lx = lower_v.normalize();
            let ly = cross_dir(lx, pole_v)?;
            if side == Side::Rt {
                lx = -lx;
            }
            (lx, ly)
        }
        Limb::Leg => {
            let mut ly = -lower_v.normalize();
            if side == Side::Rt {
                ly = -ly;
            }
            let mut lx = cross_dir(ly, pole_v)?;
            if side == Side::Rt {
                lx = -lx;
            }
            (lx, ly)
        }
    };
    let fk2 = Transform::from_axes(chain.fk2, lx, ly);

    // fk3 copies the end effector orientation.
    let mut fk3 = *ik;
    if side == Side::Rt {
        fk3.rotate_local_x(180.0);
    }

    Ok(FkPose { fk1, fk2, fk3 })
}
