use std::collections::BTreeSet;

use thiserror::Error;
use tracing::info;

use scene::{Scene, SceneError};

use crate::rig::{DEFAULT_POLE_DEPTH, DegeneratePose, LimbSystem};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SwitchMode {
    FkToIk,
    IkToFk,
}

/// How a switch interacts with keyframes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum KeyMode {
    /// Convert only; adds no keys.
    None,
    /// Key the pre and post switch pose on the current frame.
    SwitchFrame,
    /// Key the previous frame as well, pinning the pose leading into the
    /// switch.
    PreviousFrame,
    /// Convert across a frame range, keying boundary frames and frames that
    /// already carry keys.
    Range,
}

#[derive(Clone, Copy, Debug)]
pub struct SwitchRequest {
    pub mode: SwitchMode,
    pub key_mode: KeyMode,
    /// Frame range for [`KeyMode::Range`]; the playback range when None.
    pub range: Option<(i32, i32)>,
    /// Bracket a range switch with pre-pose keys just outside the range.
    pub switch_key: bool,
    pub pole_depth: f32,
}

impl SwitchRequest {
    pub fn new(mode: SwitchMode, key_mode: KeyMode) -> Self {
        Self {
            mode,
            key_mode,
            range: None,
            switch_key: false,
            pole_depth: DEFAULT_POLE_DEPTH,
        }
    }

    pub fn with_range(mut self, start: i32, end: i32) -> Self {
        self.range = Some((start, end));
        self
    }

    pub fn with_switch_key(mut self, switch_key: bool) -> Self {
        self.switch_key = switch_key;
        self
    }
}

#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("No FK/IK system selected ({found} matched)")]
    NoSystemSelected { found: usize },

    #[error(transparent)]
    DegeneratePose(#[from] DegeneratePose),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("Empty switch range ({start}..{end})")]
    EmptyRange { start: i32, end: i32 },
}

impl SwitchError {
    /// Errors the user can fix, surfaced as a notification rather than a
    /// hard fault.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            SwitchError::NoSystemSelected { .. } | SwitchError::DegeneratePose(_)
        )
    }
}

/// Execute an FK/IK switch with the requested key behavior.
///
/// Selection and playhead are snapshotted on entry and restored on every
/// exit path. All scene mutations land in one undo group; a mid-procedure
/// failure rolls the group back, so a switch is all-or-nothing.
pub fn exec_switch_and_key(
    scene: &mut Scene,
    system: &LimbSystem,
    request: &SwitchRequest,
) -> Result<(), SwitchError> {
    let saved_selection = scene.selection().to_vec();
    let saved_frame = scene.current_frame();

    let result = scene.with_undo_group("fk/ik switch", |scene| run(scene, system, request));

    scene.set_current_frame(saved_frame);
    scene.select(&saved_selection);
    result
}

fn run(scene: &mut Scene, system: &LimbSystem, request: &SwitchRequest) -> Result<(), SwitchError> {
    match request.key_mode {
        KeyMode::None => apply(scene, system, request),
        KeyMode::SwitchFrame => switch_frame(scene, system, request, true),
        KeyMode::PreviousFrame => {
            let attrs = system.key_attrs();
            let frame = scene.current_frame();
            scene.set_keys(&attrs)?;
            scene.set_current_frame(frame - 1);
            scene.set_keys(&attrs)?;
            scene.set_current_frame(frame);
            apply(scene, system, request)?;
            scene.set_keys(&attrs)?;
            Ok(())
        }
        KeyMode::Range => switch_over_range(scene, system, request),
    }
}

fn apply(scene: &mut Scene, system: &LimbSystem, request: &SwitchRequest) -> Result<(), SwitchError> {
    match request.mode {
        SwitchMode::FkToIk => system.apply_fk_to_ik(scene, request.pole_depth),
        SwitchMode::IkToFk => system.apply_ik_to_fk(scene),
    }
}

/// Single-frame switch: optionally key the pre pose, convert, key the post
/// pose.
fn switch_frame(
    scene: &mut Scene,
    system: &LimbSystem,
    request: &SwitchRequest,
    pre_key: bool,
) -> Result<(), SwitchError> {
    let attrs = system.key_attrs();
    if pre_key {
        scene.set_keys(&attrs)?;
    }
    apply(scene, system, request)?;
    scene.set_keys(&attrs)?;
    Ok(())
}

fn switch_over_range(
    scene: &mut Scene,
    system: &LimbSystem,
    request: &SwitchRequest,
) -> Result<(), SwitchError> {
    let (start, end) = request.range.unwrap_or_else(|| scene.playback_range());
    if end < start {
        return Err(SwitchError::EmptyRange { start, end });
    }
    let attrs = system.key_attrs();

    // Boundary frames plus every frame already keyed strictly inside the
    // range on any tracked attr. Frames between keys stay unkeyed so the
    // existing interpolation is preserved.
    let mut frames = BTreeSet::from([start, end]);
    for attr in &attrs {
        frames.extend(scene.keyed_frames_between(attr, start, end));
    }
    let frames: Vec<i32> = frames.into_iter().collect();

    let mut orig_frames = frames.clone();
    if request.switch_key {
        orig_frames.insert(0, start - 1);
        orig_frames.push(end + 1);
    }

    info!("Keying current state on {orig_frames:?}");
    for &frame in &orig_frames {
        scene.set_current_frame(frame);
        scene.set_keys(&attrs)?;
    }

    info!("Keying switch on {frames:?}");
    for &frame in &frames {
        scene.set_current_frame(frame);
        switch_frame(scene, system, request, false)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene::{AttrRef, Channel};

    use crate::rig::{Limb, Side, build_sample_rig};

    fn rigged_scene() -> (Scene, LimbSystem) {
        let mut scene = Scene::new();
        let rig = build_sample_rig(&mut scene, "hero").unwrap();
        let system = LimbSystem::resolve(&scene, &rig, Side::Lf, Limb::Arm).unwrap();
        (scene, system)
    }

    fn blend_frames(scene: &Scene, system: &LimbSystem, value: f32) -> Vec<i32> {
        let curve = scene.curve(&system.blend_attr()).expect("blend keyed");
        curve
            .frames()
            .filter(|&f| (curve.value_at(f).unwrap() - value).abs() < 1e-6)
            .collect()
    }

    #[test]
    fn no_key_mode_adds_zero_keyframes() {
        let (mut scene, system) = rigged_scene();
        let request = SwitchRequest::new(SwitchMode::FkToIk, KeyMode::None);

        exec_switch_and_key(&mut scene, &system, &request).unwrap();

        for attr in system.key_attrs() {
            assert_eq!(scene.key_count(&attr), 0, "{}", attr.channel);
        }
        assert_eq!(scene.attr(&system.blend_attr()).unwrap(), 1.0);
    }

    #[test]
    fn switch_frame_keys_the_current_frame() {
        let (mut scene, system) = rigged_scene();
        scene.set_current_frame(24);

        let request = SwitchRequest::new(SwitchMode::FkToIk, KeyMode::SwitchFrame);
        exec_switch_and_key(&mut scene, &system, &request).unwrap();

        for attr in system.key_attrs() {
            let curve = scene.curve(&attr).unwrap();
            assert_eq!(curve.frames().collect::<Vec<_>>(), vec![24], "{}", attr.channel);
        }
        // The post-switch pose wins on the switch frame.
        assert_eq!(scene.curve(&system.blend_attr()).unwrap().value_at(24), Some(1.0));
    }

    #[test]
    fn previous_frame_mode_pins_the_incoming_pose() {
        let (mut scene, system) = rigged_scene();
        scene.set_current_frame(24);

        let request = SwitchRequest::new(SwitchMode::FkToIk, KeyMode::PreviousFrame);
        exec_switch_and_key(&mut scene, &system, &request).unwrap();

        let curve = scene.curve(&system.blend_attr()).unwrap();
        assert_eq!(curve.value_at(23), Some(0.0));
        assert_eq!(curve.value_at(24), Some(1.0));
        assert_eq!(scene.current_frame(), 24);
    }

    #[test]
    fn range_keys_boundaries_and_existing_keys() {
        let (mut scene, system) = rigged_scene();

        // Pre-existing animation keys at 10, 15 and 20 on one tracked attr.
        let animated = AttrRef::new(system.fk1, Channel::RotateX);
        for frame in [10, 15, 20] {
            scene.set_current_frame(frame);
            scene.set_key(&animated).unwrap();
        }
        scene.set_current_frame(10);

        let request = SwitchRequest::new(SwitchMode::FkToIk, KeyMode::Range)
            .with_range(10, 20)
            .with_switch_key(true);
        exec_switch_and_key(&mut scene, &system, &request).unwrap();

        // Pre-switch pose keyed on {9, 10, 15, 20, 21}; post-switch pose on
        // {10, 15, 20}. The blend attr records which is which.
        let curve = scene.curve(&system.blend_attr()).unwrap();
        assert_eq!(curve.frames().collect::<Vec<_>>(), vec![9, 10, 15, 20, 21]);
        assert_eq!(blend_frames(&scene, &system, 1.0), vec![10, 15, 20]);
        assert_eq!(blend_frames(&scene, &system, 0.0), vec![9, 21]);

        // Unkeyed interior frames stay unkeyed.
        let pole_tx = AttrRef::new(system.ik_pole, Channel::TranslateX);
        assert_eq!(
            scene.curve(&pole_tx).unwrap().frames().collect::<Vec<_>>(),
            vec![9, 10, 15, 20, 21],
        );
    }

    #[test]
    fn range_without_switch_key_skips_the_brackets() {
        let (mut scene, system) = rigged_scene();

        let request = SwitchRequest::new(SwitchMode::FkToIk, KeyMode::Range).with_range(10, 20);
        exec_switch_and_key(&mut scene, &system, &request).unwrap();

        let curve = scene.curve(&system.blend_attr()).unwrap();
        assert_eq!(curve.frames().collect::<Vec<_>>(), vec![10, 20]);
    }

    #[test]
    fn range_defaults_to_the_playback_range() {
        let (mut scene, system) = rigged_scene();
        scene.set_playback_range(5, 8);

        let request = SwitchRequest::new(SwitchMode::FkToIk, KeyMode::Range);
        exec_switch_and_key(&mut scene, &system, &request).unwrap();

        let curve = scene.curve(&system.blend_attr()).unwrap();
        assert_eq!(curve.frames().collect::<Vec<_>>(), vec![5, 8]);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let (mut scene, system) = rigged_scene();

        let request = SwitchRequest::new(SwitchMode::FkToIk, KeyMode::Range).with_range(20, 10);
        let err = exec_switch_and_key(&mut scene, &system, &request).unwrap_err();
        assert!(matches!(err, SwitchError::EmptyRange { .. }));
    }

    #[test]
    fn selection_and_playhead_are_restored() {
        let (mut scene, system) = rigged_scene();
        scene.select(&[system.fk2]);
        scene.set_current_frame(12);

        let request = SwitchRequest::new(SwitchMode::FkToIk, KeyMode::Range)
            .with_range(10, 20)
            .with_switch_key(true);
        exec_switch_and_key(&mut scene, &system, &request).unwrap();

        assert_eq!(scene.selection(), &[system.fk2]);
        assert_eq!(scene.current_frame(), 12);
    }

    #[test]
    fn a_whole_range_switch_undoes_in_one_step() {
        let (mut scene, system) = rigged_scene();

        let request = SwitchRequest::new(SwitchMode::FkToIk, KeyMode::Range)
            .with_range(10, 20)
            .with_switch_key(true);
        exec_switch_and_key(&mut scene, &system, &request).unwrap();
        assert_eq!(scene.undo_steps(), 1);

        assert!(scene.undo().is_some());
        assert_eq!(scene.attr(&system.blend_attr()).unwrap(), 0.0);
        for attr in system.key_attrs() {
            assert_eq!(scene.key_count(&attr), 0, "{}", attr.channel);
        }
    }

    #[test]
    fn a_failed_switch_leaves_no_partial_keys() {
        let (mut scene, system) = rigged_scene();

        // Aim the mid control's y axis down the limb so the pole direction
        // is undefined.
        let fk1 = scene.transform(system.fk1).translation;
        let fk3 = scene.transform(system.fk3).translation;
        let fk2 = scene.transform(system.fk2).translation;
        let limb_v = fk3 - fk1;
        scene.set_transform(
            system.fk2,
            &scene::Transform::from_axes(fk2, limb_v.cross(glam::Vec3::Y), -limb_v),
        );

        let request = SwitchRequest::new(SwitchMode::FkToIk, KeyMode::SwitchFrame);
        let err = exec_switch_and_key(&mut scene, &system, &request).unwrap_err();
        assert!(err.is_user_facing());

        assert_eq!(scene.undo_steps(), 0);
        for attr in system.key_attrs() {
            assert_eq!(scene.key_count(&attr), 0, "{}", attr.channel);
        }
        assert_eq!(scene.attr(&system.blend_attr()).unwrap(), 0.0);
    }

    #[test]
    fn modes_parse_from_strings() {
        assert_eq!("fk_to_ik".parse::<SwitchMode>().unwrap(), SwitchMode::FkToIk);
        assert_eq!("range".parse::<KeyMode>().unwrap(), KeyMode::Range);
        assert_eq!(KeyMode::SwitchFrame.to_string(), "switch_frame");
        assert!("sideways".parse::<SwitchMode>().is_err());
    }
}
