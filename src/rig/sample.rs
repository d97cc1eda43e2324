use glam::Vec3;
use strum::IntoEnumIterator;

use scene::{Scene, SceneError, Transform};

use crate::rig::{BLEND_ATTR, DEFAULT_POLE_DEPTH, Limb, RigRef, Side};

/// Build a canonical biped control rig under `namespace`: four FK/IK limb
/// systems in a well-formed bind pose (x axes down the bones for arms, y
/// axes up the bones for legs, behavior-mirrored right side).
///
/// Used by the demo shell and as the test fixture.
pub fn build_sample_rig(scene: &mut Scene, namespace: &str) -> Result<RigRef, SceneError> {
    for side in Side::iter() {
        for limb in Limb::iter() {
            build_limb(scene, namespace, side, limb)?;
        }
    }
    Ok(RigRef::new(namespace))
}

/// FK control transforms for the left side of a limb.
fn left_pose(limb: Limb) -> [Transform; 3] {
    match limb {
        // Elbow pushed back in -z, bend plane normal to +y.
        Limb::Arm => {
            let p1 = Vec3::new(2.0, 14.0, 0.0);
            let p2 = Vec3::new(5.0, 14.0, -1.0);
            let p3 = Vec3::new(9.0, 14.0, 0.0);
            [
                Transform::from_axes(p1, p2 - p1, Vec3::Y),
                Transform::from_axes(p2, p3 - p2, Vec3::Y),
                Transform::from_axes(p3, Vec3::new(4.0, 0.0, 1.0), Vec3::Y),
            ]
        }
        // Knee pushed forward in +z, local y pointing up the bones.
        Limb::Leg => {
            let p1 = Vec3::new(1.0, 9.0, 0.0);
            let p2 = Vec3::new(1.0, 5.0, 1.0);
            let p3 = Vec3::new(1.0, 1.0, 0.0);
            [
                Transform::from_axes(p1, Vec3::X, p1 - p2),
                Transform::from_axes(p2, Vec3::X, p2 - p3),
                Transform::from_axes(p3, Vec3::X, Vec3::Y),
            ]
        }
    }
}

/// Behavior-mirror of a left-side control: position mirrored across x = 0,
/// local axes negated in y and z.
fn mirror(t: &Transform) -> Transform {
    let flip = |v: Vec3| Vec3::new(v.x, -v.y, -v.z);
    Transform::from_axes(
        Vec3::new(-t.translation.x, t.translation.y, t.translation.z),
        flip(t.x_axis()),
        flip(t.y_axis()),
    )
}

fn build_limb(scene: &mut Scene, ns: &str, side: Side, limb: Limb) -> Result<(), SceneError> {
    let [fk1, fk2, fk3] = match side {
        Side::Lf => left_pose(limb),
        Side::Rt => {
            let [a, b, c] = left_pose(limb);
            [mirror(&a), mirror(&b), mirror(&c)]
        }
    };

    for (n, transform) in [(1, &fk1), (2, &fk2), (3, &fk3)] {
        let id = scene.create_node(format!("{ns}:{side}_{limb}Fk_{n}_Ctrl"))?;
        scene.set_transform(id, transform);
    }

    // Bind joint tracks the mid control at bind pose.
    let jnt = scene.create_node(format!("{ns}:{side}_{limb}Bnd_2_Jnt"))?;
    scene.set_transform(jnt, &fk2);

    // IK controls start matched to the FK pose.
    let mut ik_t = fk3;
    if side == Side::Rt {
        ik_t.rotate_local_x(180.0);
    }
    let ik = scene.create_node(format!("{ns}:{side}_{limb}Ik_Ctrl"))?;
    scene.set_transform(ik, &ik_t);
    let offset = match limb {
        Limb::Arm => "Elbow_Offset",
        Limb::Leg => "Knee_Offset",
    };
    scene.add_attr(ik, offset, 0.0);

    let pole_dir = match limb {
        Limb::Arm => -Vec3::Z,
        Limb::Leg => Vec3::Z,
    };
    let pole = scene.create_node(format!("{ns}:{side}_{limb}Pole_Ctrl"))?;
    scene.set_translation(pole, fk2.translation + pole_dir * DEFAULT_POLE_DEPTH);

    let joint = match limb {
        Limb::Arm => "wrist",
        Limb::Leg => "ankle",
    };
    let gimbal = scene.create_node(format!("{ns}:{side}_{joint}Gimbal_Ctrl"))?;
    scene.set_translation(gimbal, fk3.translation);
    scene.add_attr(gimbal, BLEND_ATTR, 0.0);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_four_limb_systems() {
        let mut scene = Scene::new();
        let rig = build_sample_rig(&mut scene, "hero").unwrap();

        assert_eq!(scene.node_names().count(), 4 * 7);
        assert!(rig.node(&scene, "Rt_legPole_Ctrl").is_ok());
        assert!(rig.node(&scene, "Lf_wristGimbal_Ctrl").is_ok());
    }

    #[test]
    fn mirrored_side_keeps_positions_across_the_symmetry_plane() {
        let mut scene = Scene::new();
        let rig = build_sample_rig(&mut scene, "hero").unwrap();

        let lf = scene.transform(rig.node(&scene, "Lf_armFk_3_Ctrl").unwrap());
        let rt = scene.transform(rig.node(&scene, "Rt_armFk_3_Ctrl").unwrap());
        assert_eq!(rt.translation, Vec3::new(-lf.translation.x, lf.translation.y, lf.translation.z));
    }

    #[test]
    fn two_rigs_can_share_a_scene() {
        let mut scene = Scene::new();
        build_sample_rig(&mut scene, "hero").unwrap();
        build_sample_rig(&mut scene, "villain").unwrap();

        assert_eq!(scene.node_names().count(), 2 * 4 * 7);
    }
}
