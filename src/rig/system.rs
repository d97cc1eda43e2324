use tracing::info;

use scene::Scene;

use crate::rig::{
    ChainPositions, LimbSystem, SwitchError, solve_fk_to_ik, solve_ik_to_fk,
};

impl LimbSystem {
    /// Match the IK controls to the current FK pose and blend to IK.
    ///
    /// The mid-joint offset is reset on apply.
    pub fn apply_fk_to_ik(&self, scene: &mut Scene, pole_depth: f32) -> Result<(), SwitchError> {
        info!("Applying FK -> IK on {self}");

        let fk1 = scene.transform(self.fk1);
        let fk2 = scene.transform(self.fk2);
        let fk3 = scene.transform(self.fk3);
        let pose = solve_fk_to_ik(self.side, self.limb, &fk1, &fk2, &fk3, pole_depth)?;

        scene.set_transform(self.ik, &pose.target);
        scene.set_translation(self.ik_pole, pose.pole_point);
        scene.set_attr(&self.offset_attr(), 0.0)?;
        scene.set_attr(&self.blend_attr(), 1.0)?;
        info!("Set {self} to IK");

        Ok(())
    }

    /// Match the FK controls to the current IK pose and blend to FK.
    pub fn apply_ik_to_fk(&self, scene: &mut Scene) -> Result<(), SwitchError> {
        info!("Applying IK -> FK on {self}");

        let ik = scene.transform(self.ik);
        let pole_pos = scene.transform(self.ik_pole).translation;
        let chain = ChainPositions {
            fk1: scene.transform(self.fk1).translation,
            fk2: scene.transform(self.fk2).translation,
            fk2_jnt: scene.transform(self.fk2_jnt).translation,
        };
        let pose = solve_ik_to_fk(self.side, self.limb, &ik, pole_pos, &chain)?;

        scene.set_transform(self.fk1, &pose.fk1);
        scene.set_transform(self.fk2, &pose.fk2);
        scene.set_transform(self.fk3, &pose.fk3);
        scene.set_attr(&self.blend_attr(), 0.0)?;
        info!("Set {self} to FK");

        Ok(())
    }

    /// Switch to whichever representation is not currently active.
    pub fn toggle(&self, scene: &mut Scene, pole_depth: f32) -> Result<(), SwitchError> {
        if scene.attr(&self.blend_attr())? < 0.5 {
            self.apply_fk_to_ik(scene, pole_depth)
        } else {
            self.apply_ik_to_fk(scene)
        }
    }
}
