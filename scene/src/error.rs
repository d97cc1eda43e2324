use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Node not found ({0})")]
    NodeNotFound(String),

    #[error("Attr not found ({0}.{1})")]
    AttrNotFound(String, String),

    #[error("Duplicate node name ({0})")]
    DuplicateNode(String),
}
