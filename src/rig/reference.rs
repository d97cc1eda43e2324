use scene::{NodeId, Scene, SceneError, split_namespace};

/// A referenced rig instance, identified by its namespace.
///
/// All of a rig's nodes share one namespace prefix, which isolates them from
/// other referenced assets in the same scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RigRef {
    namespace: String,
}

impl RigRef {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Look up a node of this rig by its base name.
    pub fn node(&self, scene: &Scene, name: &str) -> Result<NodeId, SceneError> {
        scene.node_id(&format!("{}:{}", self.namespace, name))
    }

    /// The rig a node belongs to, if its name is namespaced.
    pub fn from_node_name(name: &str) -> Option<Self> {
        split_namespace(name).0.map(Self::new)
    }

    /// The rig of the current selection.
    ///
    /// Returns None if nothing is selected or the selection spans more than
    /// one namespace.
    pub fn selected(scene: &Scene) -> Option<Self> {
        let mut found: Option<Self> = None;
        for &id in scene.selection() {
            let rig = Self::from_node_name(scene.node(id).name())?;
            match found {
                None => found = Some(rig),
                Some(ref current) if *current != rig => return None,
                Some(_) => {}
            }
        }
        found
    }
}
