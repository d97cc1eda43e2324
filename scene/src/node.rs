use ahash::HashMap;
use glam::Vec3;

use crate::{SceneError, Transform};

/// A keyable channel on a node: one of the transform scalars or a named
/// custom attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    TranslateX,
    TranslateY,
    TranslateZ,
    RotateX,
    RotateY,
    RotateZ,
    Custom(String),
}

impl Channel {
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    pub const TRANSLATE: [Channel; 3] = [Channel::TranslateX, Channel::TranslateY, Channel::TranslateZ];
    pub const ROTATE: [Channel; 3] = [Channel::RotateX, Channel::RotateY, Channel::RotateZ];
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::TranslateX => write!(f, "tx"),
            Channel::TranslateY => write!(f, "ty"),
            Channel::TranslateZ => write!(f, "tz"),
            Channel::RotateX => write!(f, "rx"),
            Channel::RotateY => write!(f, "ry"),
            Channel::RotateZ => write!(f, "rz"),
            Channel::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// A transform node with keyable channels.
///
/// Rotate channels hold euler XYZ degrees, the representation the keyable
/// channels and animation curves work in.
#[derive(Clone, Debug)]
pub struct Node {
    name: String,
    pub translate: Vec3,
    pub rotate: Vec3,
    custom: HashMap<String, f32>,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            translate: Vec3::ZERO,
            rotate: Vec3::ZERO,
            custom: HashMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace prefix of this node's name, if any.
    pub fn namespace(&self) -> Option<&str> {
        split_namespace(&self.name).0
    }

    pub fn transform(&self) -> Transform {
        Transform::from_euler_deg(self.translate, self.rotate)
    }

    pub fn set_transform(&mut self, transform: &Transform) {
        self.translate = transform.translation;
        self.rotate = transform.rotate_deg();
    }

    /// Declare a custom scalar attribute with an initial value.
    pub fn add_attr(&mut self, name: impl Into<String>, value: f32) {
        self.custom.insert(name.into(), value);
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.custom.contains_key(name)
    }

    pub fn channel(&self, channel: &Channel) -> Result<f32, SceneError> {
        match channel {
            Channel::TranslateX => Ok(self.translate.x),
            Channel::TranslateY => Ok(self.translate.y),
            Channel::TranslateZ => Ok(self.translate.z),
            Channel::RotateX => Ok(self.rotate.x),
            Channel::RotateY => Ok(self.rotate.y),
            Channel::RotateZ => Ok(self.rotate.z),
            Channel::Custom(name) => self
                .custom
                .get(name)
                .copied()
                .ok_or_else(|| SceneError::AttrNotFound(self.name.clone(), name.clone())),
        }
    }

    pub fn set_channel(&mut self, channel: &Channel, value: f32) -> Result<(), SceneError> {
        match channel {
            Channel::TranslateX => self.translate.x = value,
            Channel::TranslateY => self.translate.y = value,
            Channel::TranslateZ => self.translate.z = value,
            Channel::RotateX => self.rotate.x = value,
            Channel::RotateY => self.rotate.y = value,
            Channel::RotateZ => self.rotate.z = value,
            Channel::Custom(name) => {
                let slot = self
                    .custom
                    .get_mut(name)
                    .ok_or_else(|| SceneError::AttrNotFound(self.name.clone(), name.clone()))?;
                *slot = value;
            }
        }
        Ok(())
    }
}

/// Split a node name into its namespace prefix and base name.
pub fn split_namespace(name: &str) -> (Option<&str>, &str) {
    match name.rsplit_once(':') {
        Some((ns, base)) => (Some(ns), base),
        None => (None, name),
    }
}
