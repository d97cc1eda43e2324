use crate::AttrRef;

/// A single reversible mutation recorded while an undo group is open.
pub(crate) enum UndoOp {
    SetChannel {
        attr: AttrRef,
        prev: f32,
    },
    /// `prev` is the key value previously at this frame, if any.
    SetKey {
        attr: AttrRef,
        frame: i32,
        prev: Option<f32>,
    },
}

pub(crate) struct UndoGroup {
    pub label: String,
    pub ops: Vec<UndoOp>,
}

/// Journal state: at most one open group (nested groups are flattened into
/// the outermost via markers) plus the stack of committed groups.
#[derive(Default)]
pub(crate) struct UndoState {
    pub open: Option<UndoGroup>,
    pub markers: Vec<usize>,
    pub stack: Vec<UndoGroup>,
}
