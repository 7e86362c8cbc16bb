//! Update blocks and helper functions.

use crate::ids::ComponentId;
use serde::{Deserialize, Serialize};
use weft_common::Ident;

/// Scheduling tag of an update block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Evaluated whenever its inputs change.
    Combinational,
    /// Evaluated on the clock edge.
    EdgeTriggered,
}

/// A schedulable unit of behavior.
#[derive(Debug, Clone)]
pub struct UpdateBlock {
    /// Declared name.
    pub name: Ident,
    /// Declaring component.
    pub host: ComponentId,
    /// Scheduling tag.
    pub kind: BlockKind,
    /// Body text.
    pub source: String,
}

/// A helper callable from blocks and other helpers.
#[derive(Debug, Clone)]
pub struct Function {
    /// Declared name.
    pub name: Ident,
    /// Declaring component.
    pub host: ComponentId,
    /// Body text.
    pub source: String,
}
