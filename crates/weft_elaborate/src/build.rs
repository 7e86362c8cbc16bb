//! Constructing a [`Design`] from a project configuration.
//!
//! Classes are instantiated depth-first from `project.top`. Each instance
//! declares its signals, then its children, then its blocks and functions,
//! and finally its constraints, whose endpoints are resolved against the
//! finished instance.

use crate::errors::ElabError;
use crate::resolve::resolve_endpoint;
use weft_config::{BlockKindDecl, ChildDecl, ConfigError, ProjectConfig, ShapeDecl, SignalKindDecl};
use weft_ir::{BlockKind, ComponentId, Design, Member, SignalKind, SignalSpec};

/// Builds the design described by `config` and returns it with its root.
pub fn build_design(config: &ProjectConfig) -> Result<(Design, ComponentId), ElabError> {
    let mut builder = Builder {
        config,
        design: Design::new(),
        stack: Vec::new(),
    };
    for (name, &value) in &config.constants {
        builder.design.set_constant(name, value);
    }
    let root = builder.instantiate(&config.project.top)?;
    tracing::debug!(
        components = builder.design.components.len(),
        signals = builder.design.signals.len(),
        "design constructed"
    );
    Ok((builder.design, root))
}

struct Builder<'a> {
    config: &'a ProjectConfig,
    design: Design,
    // Classes under construction, for circular instantiation.
    stack: Vec<String>,
}

impl Builder<'_> {
    fn instantiate(&mut self, class: &str) -> Result<ComponentId, ElabError> {
        let config = self.config;
        let decl = config
            .components
            .get(class)
            .ok_or_else(|| ConfigError::UnknownClass(class.to_string()))?;
        if self.stack.iter().any(|c| c == class) {
            let mut stack = self.stack.clone();
            stack.push(class.to_string());
            return Err(ElabError::CircularInstantiation {
                class: class.to_string(),
                stack,
            });
        }
        self.stack.push(class.to_string());

        let comp = self.design.add_component(class);
        for sig in &decl.signals {
            let spec = signal_spec(&sig.shape, sig.count.as_ref().map(|c| c.dims()));
            self.design.add_signal(comp, &sig.name, signal_kind(sig.kind), &spec)?;
        }
        for child in &decl.children {
            let member = self.instantiate_child(child)?;
            self.design.attach(comp, &child.name, member)?;
        }
        for blk in &decl.blocks {
            let kind = match blk.kind {
                BlockKindDecl::Comb => BlockKind::Combinational,
                BlockKindDecl::Edge => BlockKind::EdgeTriggered,
            };
            self.design.add_block(comp, &blk.name, kind, blk.source.clone())?;
        }
        for func in &decl.funcs {
            self.design.add_func(comp, &func.name, func.source.clone())?;
        }
        for constraint in &decl.constraints {
            let first = resolve_endpoint(&mut self.design, comp, &constraint.first)?;
            let second = resolve_endpoint(&mut self.design, comp, &constraint.second)?;
            self.design.add_constraint(comp, first, second)?;
        }

        self.stack.pop();
        Ok(comp)
    }

    fn instantiate_child(&mut self, child: &ChildDecl) -> Result<Member, ElabError> {
        let dims = child.count.as_ref().map(|c| c.dims()).unwrap_or_default();
        self.instantiate_array(&child.class, &dims)
    }

    fn instantiate_array(&mut self, class: &str, dims: &[u32]) -> Result<Member, ElabError> {
        match dims.split_first() {
            None => Ok(Member::Component(self.instantiate(class)?)),
            Some((&n, rest)) => {
                let items = (0..n)
                    .map(|_| self.instantiate_array(class, rest))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Member::List(items))
            }
        }
    }
}

fn signal_kind(kind: SignalKindDecl) -> SignalKind {
    match kind {
        SignalKindDecl::In => SignalKind::InPort,
        SignalKindDecl::Out => SignalKind::OutPort,
        SignalKindDecl::Wire => SignalKind::Wire,
        SignalKindDecl::Const => SignalKind::Const,
    }
}

fn signal_spec(shape: &ShapeDecl, dims: Option<Vec<u32>>) -> SignalSpec {
    let base = if let Some(len) = shape.len {
        SignalSpec::vector(len)
    } else if !shape.fields.is_empty() {
        SignalSpec::structure(shape.fields.iter().map(|f| {
            (
                f.name.clone(),
                signal_spec(&f.shape, f.count.as_ref().map(|c| c.dims())),
            )
        }))
    } else {
        SignalSpec::scalar()
    };
    match dims {
        Some(dims) => base.array(dims),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_config::load_config_from_str;
    use weft_ir::Constraint;

    fn build(toml: &str) -> Result<(Design, ComponentId), ElabError> {
        build_design(&load_config_from_str(toml).unwrap())
    }

    #[test]
    fn builds_nested_children_and_shapes() {
        let (design, root) = build(
            r#"
[project]
name = "demo"
top = "Top"

[components.Top]
signals = [
  { name = "v", kind = "out", len = 8 },
  { name = "p", kind = "wire", fields = [ { name = "x" }, { name = "y", len = 4 } ] },
  { name = "arr", kind = "in", count = [2, 3] },
]
children = [ { name = "leaf", class = "Leaf" }, { name = "leaves", class = "Leaf", count = 2 } ]

[components.Leaf]
signals = [ { name = "i", kind = "in" } ]
"#,
        )
        .unwrap();
        let top = &design.components[root];
        assert_eq!(top.children.len(), 3);
        // v, p, p.x, p.y, six array elements
        assert_eq!(top.signals.len(), 10);
        let last = *top.children.last().unwrap();
        assert_eq!(design.component_path(last), "s.leaves[1]");
    }

    #[test]
    fn constraints_resolve_against_the_instance() {
        let (design, root) = build(
            r#"
[project]
name = "demo"
top = "Top"

[components.Top]
signals = [ { name = "a", kind = "wire" } ]
children = [ { name = "child", class = "Child" } ]
blocks = [ { name = "up1", source = "s.a = 1" }, { name = "up2", source = "pass" } ]
constraints = [
  { first = "U(up1)", second = "U(s.child.inner)" },
  { first = "RD(s.a)", second = "U(up2)" },
]

[components.Child]
blocks = [ { name = "inner", kind = "edge", source = "pass" } ]
"#,
        )
        .unwrap();
        let constraints = &design.components[root].constraints;
        assert_eq!(constraints.len(), 2);
        assert!(matches!(constraints[0], Constraint::BlockOrder { .. }));
        assert_eq!(
            design.constraint_text(&constraints[0]),
            "U(s.up1) < U(s.child.inner)"
        );
        assert_eq!(design.constraint_text(&constraints[1]), "RD(s.a) < U(s.up2)");
    }

    #[test]
    fn two_value_endpoints_are_invalid() {
        let err = build(
            r#"
[project]
name = "demo"
top = "Top"

[components.Top]
signals = [ { name = "a", kind = "wire" }, { name = "b", kind = "wire" } ]
constraints = [ { first = "RD(s.a)", second = "WR(s.b)" } ]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ElabError::InvalidConstraint { .. }));
    }

    #[test]
    fn block_endpoint_must_be_a_block() {
        let err = build(
            r#"
[project]
name = "demo"
top = "Top"

[components.Top]
signals = [ { name = "a", kind = "wire" } ]
constraints = [ { first = "U(a)", second = "RD(a)" } ]
"#,
        )
        .unwrap_err();
        match err {
            ElabError::InvalidConstraint { reason, .. } => {
                assert!(reason.contains("not an update block"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn self_instantiation_is_circular() {
        let err = build(
            r#"
[project]
name = "demo"
top = "A"

[components.A]
children = [ { name = "b", class = "B" } ]

[components.B]
children = [ { name = "a", class = "A" } ]
"#,
        )
        .unwrap_err();
        match err {
            ElabError::CircularInstantiation { class, stack } => {
                assert_eq!(class, "A");
                assert_eq!(stack, vec!["A", "B", "A"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn function_and_block_names_collide() {
        let err = build(
            r#"
[project]
name = "demo"
top = "Top"

[components.Top]
blocks = [ { name = "f", source = "pass" } ]
funcs = [ { name = "f", source = "pass" } ]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ElabError::DuplicateName { .. }));
    }
}
