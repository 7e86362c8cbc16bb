//! Turning name chains into concrete signals.
//!
//! A chain is walked depth-first against the live object graph: each segment
//! fetches a field off every current value, then applies its subscripts in
//! order. Wildcards fan out over list elements, integers pick one element or
//! one bit, slices create (or reuse) a registered slice view. Whatever is left
//! at the end is flattened into leaf signals; blocks, functions and components
//! drop out.
//!
//! Fields detached by an incremental edit are recorded as [`Holes`]. A chain
//! that steps into a hole selects nothing instead of failing, and the
//! resolver remembers that it did.

use crate::errors::ElabError;
use indexmap::IndexSet;
use weft_common::Ident;
use weft_config::EndpointDecl;
use weft_ir::{ComponentId, Design, Endpoint, Member, SignalId};
use weft_parser::{parse_chain, IndexDesc, NameChain};
use weft_source::{FileId, Span};

/// Where a chain came from, for error reporting.
#[derive(Debug, Clone, Copy)]
pub struct RefSite<'a> {
    /// Path of the block or function containing the reference.
    pub owner: &'a str,
    /// Location of the reference in the body.
    pub span: Span,
}

/// Fields of live components whose subtrees were removed, as `(parent, field)`.
pub type Holes = IndexSet<(ComponentId, Ident)>;

/// Resolves chains relative to one component.
pub struct Resolver<'d> {
    design: &'d mut Design,
    strict_bounds: bool,
    holes: Option<&'d Holes>,
    hit_hole: bool,
}

impl<'d> Resolver<'d> {
    /// Creates a resolver. With `strict_bounds`, an out-of-range integer index
    /// is an error instead of selecting nothing.
    pub fn new(design: &'d mut Design, strict_bounds: bool) -> Self {
        Self {
            design,
            strict_bounds,
            holes: None,
            hit_hole: false,
        }
    }

    /// Lets chains that step into one of `holes` select nothing.
    pub fn with_holes(mut self, holes: &'d Holes) -> Self {
        self.holes = Some(holes);
        self
    }

    /// Returns `true` once any chain has stepped into a hole.
    pub fn hit_hole(&self) -> bool {
        self.hit_hole
    }

    /// Resolves `chain` against component `root` into leaf signals.
    pub fn resolve(
        &mut self,
        root: ComponentId,
        chain: &NameChain,
        site: RefSite<'_>,
    ) -> Result<IndexSet<SignalId>, ElabError> {
        let values = self.resolve_members(root, chain, site)?;
        let mut out = IndexSet::new();
        for value in &values {
            flatten(value, &mut out);
        }
        tracing::trace!(
            reference = %chain.display(&self.design.interner),
            owner = site.owner,
            signals = out.len(),
            "resolved"
        );
        Ok(out)
    }

    /// Resolves `chain` against component `root` without flattening, so
    /// blocks, functions and components are kept.
    pub fn resolve_members(
        &mut self,
        root: ComponentId,
        chain: &NameChain,
        site: RefSite<'_>,
    ) -> Result<Vec<Member>, ElabError> {
        let mut values = vec![Member::Component(root)];
        for seg in &chain.segments {
            let mut fetched = Vec::with_capacity(values.len());
            for value in &values {
                let field = self
                    .design
                    .container(value)
                    .and_then(|c| c.field(seg.field))
                    .cloned();
                match field {
                    Some(member) => fetched.push(member),
                    None if self.is_hole(value, seg.field) => self.hit_hole = true,
                    None => {
                        let reason = format!(
                            "{} has no field `{}`",
                            self.describe(value),
                            self.design.name(seg.field)
                        );
                        return Err(self.unresolved(chain, site, reason));
                    }
                }
            }
            values = fetched;

            for &index in &seg.indices {
                let mut selected = Vec::new();
                for value in values {
                    self.select(value, index, chain, site, &mut selected)?;
                }
                values = selected;
            }
        }
        Ok(values)
    }

    fn is_hole(&self, value: &Member, field: Ident) -> bool {
        match (value, self.holes) {
            (Member::Component(c), Some(holes)) => holes.contains(&(*c, field)),
            _ => false,
        }
    }

    fn select(
        &mut self,
        value: Member,
        index: IndexDesc,
        chain: &NameChain,
        site: RefSite<'_>,
        out: &mut Vec<Member>,
    ) -> Result<(), ElabError> {
        let index = match index {
            IndexDesc::Named(name) => match self.design.constant(name) {
                Some(v) => IndexDesc::Int(v),
                None => IndexDesc::Wildcard,
            },
            other => other,
        };

        match (value, index) {
            (Member::List(items), IndexDesc::Wildcard) => out.extend(items),
            // A leaf under a wildcard stands for itself.
            (value, IndexDesc::Wildcard) => out.push(value),
            (Member::List(items), IndexDesc::Int(i)) => {
                match usize::try_from(i).ok().and_then(|i| items.get(i)) {
                    Some(item) => out.push(item.clone()),
                    None => {
                        let what = format!("a list of {} elements", items.len());
                        self.out_of_range(i, &what, items.len(), chain, site)?;
                    }
                }
            }
            (Member::List(items), IndexDesc::Slice { lo, hi }) => {
                let len = items.len() as i64;
                let lo = lo.clamp(0, len) as usize;
                let hi = hi.clamp(0, len) as usize;
                if lo < hi {
                    out.push(Member::List(items[lo..hi].to_vec()));
                }
            }
            (Member::Signal(id), IndexDesc::Int(i)) => match self.design.signals[id].width() {
                Some(width) if (0..width as i64).contains(&i) => {
                    let bit = self.design.slice_view(id, i, i + 1)?;
                    out.push(Member::Signal(bit));
                }
                Some(width) => {
                    let what = format!("`{}`", self.design.signal_path(id));
                    self.out_of_range(i, &what, width as usize, chain, site)?;
                }
                None => {
                    let reason = format!("`{}` cannot be indexed", self.design.signal_path(id));
                    return Err(self.unresolved(chain, site, reason));
                }
            },
            (Member::Signal(id), IndexDesc::Slice { lo, hi }) => {
                let view = self
                    .design
                    .slice_view(id, lo, hi)
                    .map_err(|err| self.unresolved(chain, site, err.to_string()))?;
                out.push(Member::Signal(view));
            }
            (value, _) => {
                let reason = format!("{} cannot be indexed", self.describe(&value));
                return Err(self.unresolved(chain, site, reason));
            }
        }
        Ok(())
    }

    fn out_of_range(
        &self,
        index: i64,
        what: &str,
        len: usize,
        chain: &NameChain,
        site: RefSite<'_>,
    ) -> Result<(), ElabError> {
        if self.strict_bounds {
            let reason = format!("index {index} is out of range for {what} (length {len})");
            return Err(self.unresolved(chain, site, reason));
        }
        tracing::trace!(
            reference = %chain.display(&self.design.interner),
            index,
            "index out of range selects nothing"
        );
        Ok(())
    }

    fn describe(&self, value: &Member) -> String {
        match value {
            Member::Component(c) => format!("`{}`", self.design.component_path(*c)),
            Member::Signal(s) => format!("`{}`", self.design.signal_path(*s)),
            Member::Block(b) => format!("update block `{}`", self.design.block_path(*b)),
            Member::Func(f) => format!("function `{}`", self.design.func_path(*f)),
            Member::List(items) => format!("a list of {} elements", items.len()),
        }
    }

    fn unresolved(&self, chain: &NameChain, site: RefSite<'_>, reason: String) -> ElabError {
        ElabError::UnresolvedReference {
            reference: chain.display(&self.design.interner),
            reason,
            owner: site.owner.to_string(),
            span: site.span,
        }
    }
}

/// Resolves `U(..)`, `RD(..)` or `WR(..)` text against `comp`. The `s.`
/// prefix is optional.
pub(crate) fn resolve_endpoint(
    design: &mut Design,
    comp: ComponentId,
    decl: &EndpointDecl,
) -> Result<Endpoint, ElabError> {
    let text = match decl {
        EndpointDecl::Block(t) | EndpointDecl::Read(t) | EndpointDecl::Write(t) => t,
    };
    let full = if text == "s" || text.starts_with("s.") {
        text.clone()
    } else {
        format!("s.{text}")
    };
    let owner = format!("{} constraint {decl}", design.component_path(comp));
    let invalid = |reason: String| ElabError::InvalidConstraint {
        component: owner.clone(),
        reason,
    };
    let chain = parse_chain(&full, FileId::DUMMY, &design.interner)?;
    let site = RefSite {
        owner: &owner,
        span: Span::DUMMY,
    };
    let mut resolver = Resolver::new(design, false);
    match decl {
        EndpointDecl::Block(_) => match resolver.resolve_members(comp, &chain, site)?.as_slice() {
            [Member::Block(b)] => Ok(Endpoint::Block(*b)),
            _ => Err(invalid(format!("`{text}` is not an update block"))),
        },
        EndpointDecl::Read(_) | EndpointDecl::Write(_) => {
            let signals = resolver.resolve(comp, &chain, site)?;
            let signal = match signals.first() {
                Some(&signal) if signals.len() == 1 => signal,
                _ => {
                    return Err(invalid(format!(
                        "`{text}` must name exactly one signal, found {}",
                        signals.len()
                    )))
                }
            };
            Ok(match decl {
                EndpointDecl::Read(_) => Endpoint::Read(signal),
                _ => Endpoint::Write(signal),
            })
        }
    }
}

/// Writes `endpoint` as text relative to `host`, so that
/// [`resolve_endpoint`] finds it again. `None` if it lies outside `host`.
pub(crate) fn endpoint_decl(
    design: &Design,
    host: ComponentId,
    endpoint: Endpoint,
) -> Option<EndpointDecl> {
    let (owner, path) = match endpoint {
        Endpoint::Block(b) => (design.blocks[b].host, design.block_path(b)),
        Endpoint::Read(s) | Endpoint::Write(s) => (design.signals[s].host, design.signal_path(s)),
    };
    if owner != host && !design.is_ancestor(host, owner) {
        return None;
    }
    let rest = path.strip_prefix(&design.component_path(host))?;
    let text = format!("s{rest}");
    Some(match endpoint {
        Endpoint::Block(_) => EndpointDecl::Block(text),
        Endpoint::Read(_) => EndpointDecl::Read(text),
        Endpoint::Write(_) => EndpointDecl::Write(text),
    })
}

fn flatten(value: &Member, out: &mut IndexSet<SignalId>) {
    match value {
        Member::Signal(id) => {
            out.insert(*id);
        }
        Member::List(items) => {
            for item in items {
                flatten(item, out);
            }
        }
        Member::Component(_) | Member::Block(_) | Member::Func(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ir::{SignalKind, SignalSpec};
    use weft_parser::parse_chain;
    use weft_source::FileId;

    fn chain(design: &Design, text: &str) -> NameChain {
        parse_chain(text, FileId::from_raw(0), &design.interner).unwrap()
    }

    fn site() -> RefSite<'static> {
        RefSite {
            owner: "s.up",
            span: Span::DUMMY,
        }
    }

    fn paths(design: &Design, set: &IndexSet<SignalId>) -> Vec<String> {
        set.iter().map(|&s| design.signal_path(s)).collect()
    }

    fn resolve(design: &mut Design, root: ComponentId, text: &str) -> IndexSet<SignalId> {
        let chain = chain(design, text);
        Resolver::new(design, false)
            .resolve(root, &chain, site())
            .unwrap()
    }

    #[test]
    fn wildcard_over_array_of_structs() {
        let mut design = Design::new();
        let top = design.add_component("Top");
        let spec = SignalSpec::structure([("y", SignalSpec::scalar()), ("z", SignalSpec::scalar())])
            .array([3]);
        design.add_signal(top, "x", SignalKind::Wire, &spec).unwrap();

        let got = resolve(&mut design, top, "s.x[i].y");
        assert_eq!(paths(&design, &got), vec!["s.x[0].y", "s.x[1].y", "s.x[2].y"]);
    }

    #[test]
    fn named_index_uses_constant_or_fans_out() {
        let mut design = Design::new();
        let top = design.add_component("Top");
        design
            .add_signal(top, "x", SignalKind::Wire, &SignalSpec::scalar().array([4]))
            .unwrap();
        design.set_constant("NUM", 2);

        let got = resolve(&mut design, top, "s.x[NUM]");
        assert_eq!(paths(&design, &got), vec!["s.x[2]"]);
        let got = resolve(&mut design, top, "s.x[i]");
        assert_eq!(got.len(), 4);
    }

    #[test]
    fn whole_list_flattens() {
        let mut design = Design::new();
        let top = design.add_component("Top");
        design
            .add_signal(top, "m", SignalKind::Wire, &SignalSpec::scalar().array([2, 2]))
            .unwrap();
        let got = resolve(&mut design, top, "s.m");
        assert_eq!(
            paths(&design, &got),
            vec!["s.m[0][0]", "s.m[0][1]", "s.m[1][0]", "s.m[1][1]"]
        );
    }

    #[test]
    fn out_of_range_is_empty_unless_strict() {
        let mut design = Design::new();
        let top = design.add_component("Top");
        design
            .add_signal(top, "x", SignalKind::Wire, &SignalSpec::scalar().array([2]))
            .unwrap();

        assert!(resolve(&mut design, top, "s.x[5]").is_empty());

        let c = chain(&design, "s.x[5]");
        let err = Resolver::new(&mut design, true)
            .resolve(top, &c, site())
            .unwrap_err();
        match err {
            ElabError::UnresolvedReference { reason, .. } => {
                assert!(reason.contains("out of range"), "{reason}")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn slices_are_views_of_the_base_vector() {
        let mut design = Design::new();
        let top = design.add_component("Top");
        let v = design
            .add_signal(top, "v", SignalKind::OutPort, &SignalSpec::vector(8))
            .unwrap();
        let Member::Signal(v) = v else { panic!() };

        let a = resolve(&mut design, top, "s.v[2:5]");
        let b = resolve(&mut design, top, "s.v[0:4]");
        let again = resolve(&mut design, top, "s.v[2:5]");
        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(paths(&design, &a), vec!["s.v[2:5]"]);
        assert_eq!(design.signals[v].slices.len(), 2);

        let bit = resolve(&mut design, top, "s.v[3]");
        assert_eq!(paths(&design, &bit), vec!["s.v[3]"]);
    }

    #[test]
    fn bad_slice_is_unresolved() {
        let mut design = Design::new();
        let top = design.add_component("Top");
        design
            .add_signal(top, "v", SignalKind::Wire, &SignalSpec::vector(4))
            .unwrap();
        let c = chain(&design, "s.v[2:9]");
        let err = Resolver::new(&mut design, false)
            .resolve(top, &c, site())
            .unwrap_err();
        assert!(matches!(err, ElabError::UnresolvedReference { .. }));
    }

    #[test]
    fn missing_field_names_the_field() {
        let mut design = Design::new();
        let top = design.add_component("Top");
        let c = chain(&design, "s.nope");
        let err = Resolver::new(&mut design, false)
            .resolve(top, &c, site())
            .unwrap_err();
        match err {
            ElabError::UnresolvedReference {
                reference,
                reason,
                owner,
                ..
            } => {
                assert_eq!(reference, "s.nope");
                assert_eq!(reason, "`s` has no field `nope`");
                assert_eq!(owner, "s.up");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn functions_and_components_are_excluded() {
        let mut design = Design::new();
        let top = design.add_component("Top");
        let child = design.add_component("Child");
        design.attach(top, "child", Member::Component(child)).unwrap();
        design.add_func(top, "f", "pass").unwrap();

        assert!(resolve(&mut design, top, "s.child").is_empty());
        assert!(resolve(&mut design, top, "s.f").is_empty());
    }

    #[test]
    fn holes_select_nothing() {
        let mut design = Design::new();
        let top = design.add_component("Top");
        design
            .add_signal(top, "a", SignalKind::Wire, &SignalSpec::scalar())
            .unwrap();
        let mut holes = Holes::new();
        holes.insert((top, design.intern("gone")));

        let c = chain(&design, "s.gone.i");
        let mut resolver = Resolver::new(&mut design, false).with_holes(&holes);
        assert!(resolver.resolve(top, &c, site()).unwrap().is_empty());
        assert!(resolver.hit_hole());

        let c = chain(&design, "s.nope");
        let mut resolver = Resolver::new(&mut design, false).with_holes(&holes);
        assert!(resolver.resolve(top, &c, site()).is_err());
        assert!(!resolver.hit_hole());
    }

    #[test]
    fn endpoints_are_written_relative_to_their_host() {
        let mut design = Design::new();
        let top = design.add_component("Top");
        let kid = design.add_component("Kid");
        design.attach(top, "kid", Member::Component(kid)).unwrap();
        let run = design
            .add_block(kid, "run", weft_ir::BlockKind::Combinational, "pass")
            .unwrap();
        let v = design
            .add_signal(kid, "v", SignalKind::Wire, &SignalSpec::vector(8))
            .unwrap();
        let Member::Signal(v) = v else { panic!() };
        let low = design.slice_view(v, 0, 4).unwrap();

        let decl = endpoint_decl(&design, top, Endpoint::Block(run)).unwrap();
        assert_eq!(decl, EndpointDecl::Block("s.kid.run".into()));
        assert_eq!(resolve_endpoint(&mut design, top, &decl).unwrap(), Endpoint::Block(run));

        let decl = endpoint_decl(&design, top, Endpoint::Write(low)).unwrap();
        assert_eq!(decl, EndpointDecl::Write("s.kid.v[0:4]".into()));
        assert_eq!(resolve_endpoint(&mut design, top, &decl).unwrap(), Endpoint::Write(low));

        assert!(endpoint_decl(&design, kid, Endpoint::Block(run)).is_some());
        let other = design.add_component("Other");
        assert!(endpoint_decl(&design, other, Endpoint::Block(run)).is_none());
    }

    #[test]
    fn wildcard_on_leaf_is_the_whole_signal() {
        let mut design = Design::new();
        let top = design.add_component("Top");
        design
            .add_signal(top, "v", SignalKind::Wire, &SignalSpec::vector(4))
            .unwrap();
        let got = resolve(&mut design, top, "s.v[i]");
        assert_eq!(paths(&design, &got), vec!["s.v"]);
    }
}
