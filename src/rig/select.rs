use strum::IntoEnumIterator;

use scene::Scene;

use crate::rig::{Limb, LimbSystem, RigRef, Side, SwitchError};

/// All FK/IK systems with a control in the current selection.
///
/// Candidate systems are swept per (side, limb) pair on the rig of the
/// selection; sides and limbs the rig does not carry are skipped.
pub fn selected_systems(scene: &Scene) -> Vec<LimbSystem> {
    let Some(rig) = RigRef::selected(scene) else {
        return Vec::new();
    };

    let mut systems = Vec::new();
    for side in Side::iter() {
        for limb in Limb::iter() {
            let Ok(system) = LimbSystem::resolve(scene, &rig, side, limb) else {
                continue;
            };
            if scene
                .selection()
                .iter()
                .any(|id| system.ctrls().contains(id))
            {
                systems.push(system);
            }
        }
    }

    systems
}

/// The single FK/IK system identified by the current selection.
///
/// An empty or ambiguous selection is a user error, not a fault.
pub fn selected_system(scene: &Scene) -> Result<LimbSystem, SwitchError> {
    let mut systems = selected_systems(scene);
    match systems.len() {
        1 => Ok(systems.remove(0)),
        found => Err(SwitchError::NoSystemSelected { found }),
    }
}
