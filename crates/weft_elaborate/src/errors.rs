//! Elaboration errors, their diagnostic codes, and conversion to [`Diagnostic`]s.
//!
//! Error codes `E300`--`E312` cover every way a design can be rejected, from
//! a malformed block body to a port written from the wrong side.

use std::fmt;
use weft_common::InternalError;
use weft_config::ConfigError;
use weft_diagnostics::{Category, Diagnostic, DiagnosticCode, Label};
use weft_ir::DeclError;
use weft_parser::ParseError;
use weft_source::Span;

/// Block or function body outside the accepted grammar.
pub const E300: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 300,
};

/// Reference that does not resolve against the live design.
pub const E301: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 301,
};

/// Signal written by more than one update block.
pub const E302: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 302,
};

/// Port or wire accessed from the wrong component.
pub const E303: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 303,
};

/// Cycle in the helper-function call graph.
pub const E304: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 304,
};

/// Two declarations share one name in a component.
pub const E305: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 305,
};

/// Explicit constraint that cannot be recorded.
pub const E306: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 306,
};

/// Component class that instantiates itself.
pub const E307: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 307,
};

/// Whole-design operation used before or after its time.
pub const E308: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 308,
};

/// Structural edit outside the elaborated tree.
pub const E309: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 309,
};

/// Other rejected declaration or edit.
pub const E310: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 310,
};

/// Unusable project configuration.
pub const E311: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 311,
};

/// Internal invariant broken.
pub const E312: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 312,
};

/// The flavor of a multiple-writer conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterConflict {
    /// One signal written by several blocks.
    Direct {
        /// Path of the signal.
        signal: String,
        /// Paths of every writing block.
        writers: Vec<String>,
    },
    /// A signal and an enclosing struct or vector written by different blocks.
    Nested {
        /// Path of the inner signal.
        signal: String,
        /// Its writer.
        writer: String,
        /// Path of the enclosing signal.
        ancestor: String,
        /// The enclosing signal's writer.
        ancestor_writer: String,
    },
    /// Two overlapping slices of one vector written by different blocks.
    SliceOverlap {
        /// Path of one slice.
        signal: String,
        /// Its writer.
        writer: String,
        /// Path of the overlapping slice.
        sibling: String,
        /// The overlapping slice's writer.
        sibling_writer: String,
    },
}

impl fmt::Display for WriterConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriterConflict::Direct { signal, writers } => {
                let writers: Vec<String> = writers.iter().map(|w| format!("`{w}`")).collect();
                write!(
                    f,
                    "multiple update blocks write `{signal}`: {}",
                    writers.join(", ")
                )
            }
            WriterConflict::Nested {
                signal,
                writer,
                ancestor,
                ancestor_writer,
            } => write!(
                f,
                "two-writer conflict in nested struct or slice: `{ancestor}` (in `{ancestor_writer}`) and `{signal}` (in `{writer}`)"
            ),
            WriterConflict::SliceOverlap {
                signal,
                writer,
                sibling,
                sibling_writer,
            } => write!(
                f,
                "two-writer conflict between sibling slices: `{sibling}` (in `{sibling_writer}`) and `{signal}` (in `{writer}`)"
            ),
        }
    }
}

/// Which port-direction rule an access broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    /// A wire read from outside its component.
    WireRead,
    /// An input port written by anything but its component's parent.
    InPortWrite,
    /// An output port written from outside its component.
    OutPortWrite,
    /// A wire written from outside its component.
    WireWrite,
}

impl AccessRule {
    /// Advice shown with the diagnostic.
    pub fn help(self) -> &'static str {
        match self {
            AccessRule::WireRead => {
                "only read wire `x.w` in x's own update blocks, or declare it as an output port"
            }
            AccessRule::InPortWrite => {
                "write a child's input port `x.y.in` from x's update blocks, never `x.in` itself"
            }
            AccessRule::OutPortWrite => {
                "write output port `x.out` in x's own update blocks, never `x.y.out` from outside"
            }
            AccessRule::WireWrite => {
                "only write wire `x.w` in x's own update blocks, or declare it as an input port"
            }
        }
    }
}

impl fmt::Display for AccessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AccessRule::WireRead => "invalid read of a wire",
            AccessRule::InPortWrite => "invalid write to an input port",
            AccessRule::OutPortWrite => "invalid write to an output port",
            AccessRule::WireWrite => "invalid write to a wire",
        };
        f.write_str(text)
    }
}

/// The chain of calls that closed a cycle: a block, then every function
/// entered, ending with the function that was already open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPath {
    /// Path of the originating block.
    pub block: String,
    /// Paths of the functions in call order.
    pub funcs: Vec<String>,
}

impl CallPath {
    /// The call that re-entered an open function.
    pub fn closing_edge(&self) -> Option<(&str, &str)> {
        match self.funcs.as_slice() {
            [.., caller, callee] => Some((caller.as_str(), callee.as_str())),
            _ => None,
        }
    }
}

impl fmt::Display for CallPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.block)?;
        for func in &self.funcs {
            write!(f, " -> {func}")?;
        }
        Ok(())
    }
}

/// Every way elaboration can fail.
#[derive(Debug, thiserror::Error)]
pub enum ElabError {
    /// A body is outside the accepted grammar.
    #[error("syntax error: {0}")]
    Syntax(#[from] ParseError),

    /// A reference names nothing in the live design.
    #[error("cannot resolve `{reference}` in `{owner}`: {reason}")]
    UnresolvedReference {
        /// Source-like text of the reference.
        reference: String,
        /// What failed.
        reason: String,
        /// Block or function containing the reference.
        owner: String,
        /// Location in the body.
        span: Span,
    },

    /// A signal has conflicting writers.
    #[error("{0}")]
    MultiWriter(WriterConflict),

    /// A port or wire is accessed from the wrong component.
    #[error("{rule}: `{signal}` of `{host}` is accessed in update block `{block}`")]
    SignalAccess {
        /// The broken rule.
        rule: AccessRule,
        /// Path of the signal.
        signal: String,
        /// Path of the signal's component.
        host: String,
        /// Path of the offending block.
        block: String,
    },

    /// Helper functions call each other in a cycle.
    #[error("helper functions call each other in a cycle: {path}")]
    CallCycle {
        /// The calls from the block to the repeated function.
        path: CallPath,
    },

    /// Two declarations share a name.
    #[error("`{name}` is declared twice in `{component}` (already a {existing})")]
    DuplicateName {
        /// Path of the component.
        component: String,
        /// The contested name.
        name: String,
        /// What already holds the name.
        existing: &'static str,
    },

    /// An explicit constraint is invalid.
    #[error("invalid constraint in `{component}`: {reason}")]
    InvalidConstraint {
        /// Path of the declaring component.
        component: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A class instantiates itself.
    #[error("circular instantiation of component class `{class}`")]
    CircularInstantiation {
        /// The repeated class.
        class: String,
        /// Classes being constructed, outermost first.
        stack: Vec<String>,
    },

    /// A whole-design operation was used before elaboration.
    #[error("`{operation}` requires an elaborated root")]
    NotElaborated {
        /// The rejected operation.
        operation: &'static str,
    },

    /// `elaborate` was called twice.
    #[error("the design is already elaborated at `{root}`")]
    AlreadyElaborated {
        /// Path of the existing root.
        root: String,
    },

    /// An edit named a component outside the elaborated tree.
    #[error("`{component}` is not part of the elaborated tree")]
    NotInElaboratedTree {
        /// Path of the component.
        component: String,
    },

    /// Any other rejected declaration or edit.
    #[error(transparent)]
    Declaration(DeclError),

    /// The project configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A bug in weft itself.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl From<DeclError> for ElabError {
    fn from(err: DeclError) -> Self {
        match err {
            DeclError::DuplicateName {
                component,
                name,
                existing,
            } => ElabError::DuplicateName {
                component,
                name,
                existing,
            },
            DeclError::InvalidConstraint { component, reason } => {
                ElabError::InvalidConstraint { component, reason }
            }
            other => ElabError::Declaration(other),
        }
    }
}

impl ElabError {
    /// Stable code of this error.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            ElabError::Syntax(_) => E300,
            ElabError::UnresolvedReference { .. } => E301,
            ElabError::MultiWriter(_) => E302,
            ElabError::SignalAccess { .. } => E303,
            ElabError::CallCycle { .. } => E304,
            ElabError::DuplicateName { .. } => E305,
            ElabError::InvalidConstraint { .. } => E306,
            ElabError::CircularInstantiation { .. } => E307,
            ElabError::NotElaborated { .. } | ElabError::AlreadyElaborated { .. } => E308,
            ElabError::NotInElaboratedTree { .. } => E309,
            ElabError::Declaration(_) => E310,
            ElabError::Config(_) => E311,
            ElabError::Internal(_) => E312,
        }
    }

    /// Converts this error into a diagnostic for rendering.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let message = self.to_string();
        match self {
            ElabError::Syntax(err) => Diagnostic::error(E300, message, err.span)
                .with_label(Label::primary(err.span, err.message.clone())),
            ElabError::UnresolvedReference { owner, span, .. } => {
                Diagnostic::error(E301, message, *span)
                    .with_label(Label::primary(*span, "not found in the design"))
                    .with_note(format!("in `{owner}`"))
            }
            ElabError::MultiWriter(conflict) => {
                let diag = Diagnostic::error(E302, message, Span::DUMMY);
                match conflict {
                    WriterConflict::Direct { .. } => diag
                        .with_help("a signal may only be assigned by a single update block"),
                    _ => diag.with_help(
                        "a signal and anything enclosing or overlapping it must share one writer",
                    ),
                }
            }
            ElabError::SignalAccess { rule, .. } => {
                Diagnostic::error(E303, message, Span::DUMMY).with_help(rule.help())
            }
            ElabError::CallCycle { path } => {
                let diag = Diagnostic::error(E304, message, Span::DUMMY);
                match path.closing_edge() {
                    Some((caller, callee)) => diag.with_note(format!(
                        "the cycle closes where `{caller}` calls `{callee}`"
                    )),
                    None => diag,
                }
            }
            ElabError::DuplicateName { .. } => Diagnostic::error(E305, message, Span::DUMMY)
                .with_help("update blocks, functions, signals and children share one namespace"),
            ElabError::InvalidConstraint { .. } => Diagnostic::error(E306, message, Span::DUMMY),
            ElabError::CircularInstantiation { stack, .. } => {
                Diagnostic::error(E307, message, Span::DUMMY).with_note(format!(
                    "instantiation chain: {}",
                    stack.join(" -> ")
                ))
            }
            ElabError::NotElaborated { .. } | ElabError::AlreadyElaborated { .. } => {
                Diagnostic::error(E308, message, Span::DUMMY)
            }
            ElabError::NotInElaboratedTree { .. } => {
                Diagnostic::error(E309, message, Span::DUMMY)
                    .with_help("structural edits must target a component under the elaborated root")
            }
            ElabError::Declaration(_) => Diagnostic::error(E310, message, Span::DUMMY),
            ElabError::Config(_) => Diagnostic::error(E311, message, Span::DUMMY),
            ElabError::Internal(_) => Diagnostic::error(E312, message, Span::DUMMY)
                .with_note("this is a bug in weft"),
        }
    }
}
