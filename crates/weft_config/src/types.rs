//! Types deserialized from `weft.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// A whole `weft.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Project metadata.
    pub project: ProjectMeta,
    /// Elaboration options.
    #[serde(default)]
    pub elaborate: ElaborateConfig,
    /// Named integer constants usable as static indices in block bodies.
    #[serde(default)]
    pub constants: BTreeMap<String, i64>,
    /// Component classes by name.
    #[serde(default)]
    pub components: BTreeMap<String, ComponentDecl>,
}

/// The `[project]` table.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// Project name.
    pub name: String,
    /// Version string.
    #[serde(default = "default_version")]
    pub version: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Class instantiated as the elaboration root.
    pub top: String,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

/// The `[elaborate]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ElaborateConfig {
    /// Out-of-range integer indices fail instead of resolving to nothing.
    #[serde(default)]
    pub strict_index_bounds: bool,
    /// Run the legality checker after elaboration.
    #[serde(default = "default_true")]
    pub check: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ElaborateConfig {
    fn default() -> Self {
        Self {
            strict_index_bounds: false,
            check: true,
        }
    }
}

/// One `[components.<Class>]` table.
#[derive(Debug, Default, Deserialize)]
pub struct ComponentDecl {
    /// Declared signals in declaration order.
    #[serde(default)]
    pub signals: Vec<SignalDecl>,
    /// Child component instances.
    #[serde(default)]
    pub children: Vec<ChildDecl>,
    /// Update blocks.
    #[serde(default)]
    pub blocks: Vec<BlockDecl>,
    /// Helper functions.
    #[serde(default)]
    pub funcs: Vec<FuncDecl>,
    /// Explicit ordering constraints.
    #[serde(default)]
    pub constraints: Vec<ConstraintDecl>,
}

/// Direction of a declared signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKindDecl {
    /// Input port.
    In,
    /// Output port.
    Out,
    /// Internal wire.
    Wire,
    /// Constant.
    Const,
}

/// Either a single count or a list of array dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Count {
    /// `count = 4`
    One(u32),
    /// `count = [2, 3]`
    Dims(Vec<u32>),
}

impl Count {
    /// Dimensions, outermost first.
    pub fn dims(&self) -> Vec<u32> {
        match self {
            Count::One(n) => vec![*n],
            Count::Dims(dims) => dims.clone(),
        }
    }
}

/// A signal declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct SignalDecl {
    /// Field name on the component.
    pub name: String,
    /// Direction.
    pub kind: SignalKindDecl,
    /// Shape of each element.
    #[serde(flatten)]
    pub shape: ShapeDecl,
    /// Makes this a (possibly multi-dimensional) list of signals.
    #[serde(default)]
    pub count: Option<Count>,
}

/// Shape shared by signals and struct fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShapeDecl {
    /// Vector length; vectors can be sliced and bit-indexed.
    #[serde(default)]
    pub len: Option<u32>,
    /// Struct fields.
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

/// A struct field declaration. Fields inherit the direction of their signal.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDecl {
    /// Field name.
    pub name: String,
    /// Shape of each element.
    #[serde(flatten)]
    pub shape: ShapeDecl,
    /// Makes this field a list.
    #[serde(default)]
    pub count: Option<Count>,
}

/// A child instance declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChildDecl {
    /// Field name on the parent.
    pub name: String,
    /// Component class to instantiate.
    pub class: String,
    /// Makes this a list of instances.
    #[serde(default)]
    pub count: Option<Count>,
}

/// Scheduling tag of an update block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKindDecl {
    /// Combinational.
    #[default]
    Comb,
    /// Edge-triggered.
    Edge,
}

/// An update block declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockDecl {
    /// Block name.
    pub name: String,
    /// Scheduling tag.
    #[serde(default)]
    pub kind: BlockKindDecl,
    /// Body text.
    pub source: String,
}

/// A helper function declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct FuncDecl {
    /// Function name.
    pub name: String,
    /// Body text.
    pub source: String,
}

/// One endpoint of an ordering constraint, written `U(blk)`, `RD(s.x)` or `WR(s.x)`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum EndpointDecl {
    /// An update block by name.
    Block(String),
    /// Reads of the signal named by a chain.
    Read(String),
    /// Writes of the signal named by a chain.
    Write(String),
}

impl TryFrom<String> for EndpointDecl {
    type Error = String;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        let text = text.trim();
        let (head, rest) = text
            .split_once('(')
            .ok_or_else(|| format!("expected U(..), RD(..) or WR(..), got '{text}'"))?;
        let inner = rest
            .strip_suffix(')')
            .ok_or_else(|| format!("unterminated constraint endpoint '{text}'"))?
            .trim()
            .to_string();
        if inner.is_empty() {
            return Err(format!("empty constraint endpoint '{text}'"));
        }
        match head.trim() {
            "U" => Ok(EndpointDecl::Block(inner)),
            "RD" => Ok(EndpointDecl::Read(inner)),
            "WR" => Ok(EndpointDecl::Write(inner)),
            other => Err(format!("unknown constraint endpoint kind '{other}'")),
        }
    }
}

impl fmt::Display for EndpointDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointDecl::Block(b) => write!(f, "U({b})"),
            EndpointDecl::Read(s) => write!(f, "RD({s})"),
            EndpointDecl::Write(s) => write!(f, "WR({s})"),
        }
    }
}

/// `first` is ordered before `second`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConstraintDecl {
    /// Earlier endpoint.
    pub first: EndpointDecl,
    /// Later endpoint.
    pub second: EndpointDecl,
}
