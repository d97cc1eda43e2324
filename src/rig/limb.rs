use scene::{AttrRef, Channel, NodeId, Scene, SceneError};

use crate::rig::RigRef;

/// The blend attribute carried by the gimbal control: 0 = FK, 1 = IK.
pub const BLEND_ATTR: &str = "FK_IK";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Side {
    Lf,
    Rt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::EnumString)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Limb {
    Arm,
    Leg,
}

impl Limb {
    /// Base name of the gimbal joint: wrist for arms, ankle for legs.
    fn gimbal_joint(self) -> &'static str {
        match self {
            Limb::Arm => "wrist",
            Limb::Leg => "ankle",
        }
    }

    /// Name of the mid-joint offset attr on the IK control.
    fn offset_attr(self) -> &'static str {
        match self {
            Limb::Arm => "Elbow_Offset",
            Limb::Leg => "Knee_Offset",
        }
    }
}

/// One FK/IK limb system of a referenced rig: the resolved control and joint
/// handles for a (side, limb) pair.
#[derive(Clone, Debug)]
pub struct LimbSystem {
    pub rig: RigRef,
    pub side: Side,
    pub limb: Limb,

    pub fk1: NodeId,
    pub fk2: NodeId,
    pub fk3: NodeId,
    pub ik: NodeId,
    pub ik_pole: NodeId,
    pub fk2_jnt: NodeId,
    pub gimbal: NodeId,
}

impl LimbSystem {
    /// Resolve the system's nodes from the rig's naming convention.
    pub fn resolve(scene: &Scene, rig: &RigRef, side: Side, limb: Limb) -> Result<Self, SceneError> {
        Ok(Self {
            fk1: rig.node(scene, &format!("{side}_{limb}Fk_1_Ctrl"))?,
            fk2: rig.node(scene, &format!("{side}_{limb}Fk_2_Ctrl"))?,
            fk3: rig.node(scene, &format!("{side}_{limb}Fk_3_Ctrl"))?,
            ik: rig.node(scene, &format!("{side}_{limb}Ik_Ctrl"))?,
            ik_pole: rig.node(scene, &format!("{side}_{limb}Pole_Ctrl"))?,
            fk2_jnt: rig.node(scene, &format!("{side}_{limb}Bnd_2_Jnt"))?,
            gimbal: rig.node(scene, &format!("{side}_{}Gimbal_Ctrl", limb.gimbal_joint()))?,
            rig: rig.clone(),
            side,
            limb,
        })
    }

    pub fn fk_ctrls(&self) -> [NodeId; 3] {
        [self.fk1, self.fk2, self.fk3]
    }

    /// All controls in this system.
    pub fn ctrls(&self) -> [NodeId; 6] {
        [self.fk1, self.fk2, self.fk3, self.ik, self.ik_pole, self.gimbal]
    }

    pub fn blend_attr(&self) -> AttrRef {
        AttrRef::new(self.gimbal, Channel::custom(BLEND_ATTR))
    }

    pub fn offset_attr(&self) -> AttrRef {
        AttrRef::new(self.ik, Channel::custom(self.limb.offset_attr()))
    }

    /// The attrs keyed by switch operations: FK rotate channels, pole
    /// translates, IK translates and rotates, the blend attr and the
    /// mid-joint offset.
    pub fn key_attrs(&self) -> Vec<AttrRef> {
        let mut attrs = Vec::with_capacity(17);
        for ctrl in self.fk_ctrls() {
            for channel in Channel::ROTATE {
                attrs.push(AttrRef::new(ctrl, channel));
            }
        }
        for channel in Channel::TRANSLATE {
            attrs.push(AttrRef::new(self.ik_pole, channel));
        }
        for channel in Channel::TRANSLATE {
            attrs.push(AttrRef::new(self.ik, channel));
        }
        for channel in Channel::ROTATE {
            attrs.push(AttrRef::new(self.ik, channel));
        }
        attrs.push(self.blend_attr());
        attrs.push(self.offset_attr());
        attrs
    }
}

impl std::fmt::Display for LimbSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}_{}", self.rig.namespace(), self.side, self.limb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::build_sample_rig;

    #[test]
    fn names_parse_and_format() {
        assert_eq!("Lf".parse::<Side>().unwrap(), Side::Lf);
        assert_eq!("rt".parse::<Side>().unwrap(), Side::Rt);
        assert_eq!("arm".parse::<Limb>().unwrap(), Limb::Arm);
        assert_eq!(Limb::Leg.to_string(), "leg");
        assert!("tail".parse::<Limb>().is_err());
    }

    #[test]
    fn resolve_finds_all_handles() {
        let mut scene = Scene::new();
        let rig = build_sample_rig(&mut scene, "hero").unwrap();

        let system = LimbSystem::resolve(&scene, &rig, Side::Lf, Limb::Arm).unwrap();
        assert_eq!(scene.node(system.gimbal).name(), "hero:Lf_wristGimbal_Ctrl");
        assert_eq!(scene.node(system.fk2_jnt).name(), "hero:Lf_armBnd_2_Jnt");

        let system = LimbSystem::resolve(&scene, &rig, Side::Rt, Limb::Leg).unwrap();
        assert_eq!(scene.node(system.gimbal).name(), "hero:Rt_ankleGimbal_Ctrl");

        let missing = RigRef::new("nobody");
        assert!(LimbSystem::resolve(&scene, &missing, Side::Lf, Limb::Arm).is_err());
    }

    #[test]
    fn key_attrs_cover_the_tracked_set() {
        let mut scene = Scene::new();
        let rig = build_sample_rig(&mut scene, "hero").unwrap();
        let system = LimbSystem::resolve(&scene, &rig, Side::Lf, Limb::Arm).unwrap();

        let attrs = system.key_attrs();
        assert_eq!(attrs.len(), 17);
        assert!(attrs.contains(&AttrRef::new(system.gimbal, Channel::custom(BLEND_ATTR))));
        assert!(attrs.contains(&AttrRef::new(system.ik, Channel::custom("Elbow_Offset"))));
        assert!(attrs.contains(&AttrRef::new(system.fk3, Channel::RotateZ)));
        assert!(attrs.contains(&AttrRef::new(system.ik_pole, Channel::TranslateY)));
        // FK translates are not tracked.
        assert!(!attrs.contains(&AttrRef::new(system.fk1, Channel::TranslateX)));
    }
}
