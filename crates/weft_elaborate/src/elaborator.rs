//! Whole-design elaboration state and incremental structural edits.
//!
//! An [`Elaborator`] is bound to one root. Elaborating the root is the same
//! as adding its entire tree to an empty aggregate: every component is
//! elaborated locally first, and only if all succeed are they collected.
//!
//! Removing a subtree never fails on references into it. The detached field
//! becomes a hole. Components whose references crossed it are re-resolved
//! with those references selecting nothing, and are marked dangling.
//! Constraints naming removed blocks or signals are suspended. Attaching a
//! subtree at a hole resolves both again, so removing and re-adding an
//! equivalent subtree restores the aggregate.

use crate::aggregate::{Aggregate, Summary};
use crate::cache::ChainCache;
use crate::check::LegalityChecker;
use crate::errors::ElabError;
use crate::local::{elaborate_local, AccessSets, LocalMeta, Owner};
use crate::resolve::{endpoint_decl, resolve_endpoint, Holes};
use indexmap::{IndexMap, IndexSet};
use weft_common::InternalError;
use weft_config::{ElaborateConfig, EndpointDecl};
use weft_ir::{BlockId, ComponentId, Constraint, Design, Endpoint, Member, SignalId};
use weft_parser::Body;
use weft_source::Span;

/// Knobs for elaboration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElabOptions {
    /// Out-of-range integer indices are errors instead of selecting nothing.
    pub strict_index_bounds: bool,
}

impl From<&ElaborateConfig> for ElabOptions {
    fn from(config: &ElaborateConfig) -> Self {
        Self {
            strict_index_bounds: config.strict_index_bounds,
        }
    }
}

type Metas = Vec<(ComponentId, LocalMeta)>;

/// A declared constraint whose endpoints are currently detached.
#[derive(Debug, Clone)]
struct Suspended {
    host: ComponentId,
    first: EndpointDecl,
    second: EndpointDecl,
}

/// Elaboration state of one design root.
#[derive(Debug, Default)]
pub struct Elaborator {
    options: ElabOptions,
    root: Option<ComponentId>,
    cache: ChainCache,
    local: IndexMap<ComponentId, LocalMeta>,
    aggregate: Aggregate,
    holes: Holes,
    dangling: IndexSet<ComponentId>,
    suspended: Vec<Suspended>,
}

impl Elaborator {
    /// Creates an elaborator with no root yet.
    pub fn new(options: ElabOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// The elaborated root, if any.
    pub fn root(&self) -> Option<ComponentId> {
        self.root
    }

    /// The extraction cache.
    pub fn cache(&self) -> &ChainCache {
        &self.cache
    }

    /// Components with references into removed subtrees.
    pub fn dangling(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.dangling.iter().copied()
    }

    /// Elaborates the tree under `root`.
    pub fn elaborate(&mut self, design: &mut Design, root: ComponentId) -> Result<(), ElabError> {
        if let Some(existing) = self.root {
            return Err(ElabError::AlreadyElaborated {
                root: design.component_path(existing),
            });
        }
        tracing::debug!(root = %design.component_path(root), "elaborating");
        let comps = design.subtree(root);
        let metas = self.elaborate_all(design, &comps)?;
        self.collect_all(design, metas)?;
        self.root = Some(root);
        Ok(())
    }

    fn elaborate_all(
        &mut self,
        design: &mut Design,
        comps: &[ComponentId],
    ) -> Result<Metas, ElabError> {
        let mut metas = Vec::with_capacity(comps.len());
        for &comp in comps {
            let meta = elaborate_local(
                design,
                &mut self.cache,
                comp,
                self.options.strict_index_bounds,
                &self.holes,
            )?;
            metas.push((comp, meta));
        }
        Ok(metas)
    }

    fn collect_all(
        &mut self,
        design: &Design,
        metas: Metas,
    ) -> Result<(), ElabError> {
        for (comp, meta) in metas {
            tracing::debug!(component = %design.component_path(comp), "collect");
            self.aggregate.collect(comp, &meta)?;
            if meta.dangling {
                self.dangling.insert(comp);
            }
            self.aggregate
                .add_signals(design.components[comp].signals.iter().copied());
            self.local.insert(comp, meta);
        }
        Ok(())
    }

    /// Swaps the collected metadata of `comp` for `fresh`.
    fn replace(&mut self, comp: ComponentId, fresh: LocalMeta) -> Result<(), ElabError> {
        if fresh.dangling {
            self.dangling.insert(comp);
        } else {
            self.dangling.shift_remove(&comp);
        }
        if let Some(meta) = self.local.get_mut(&comp) {
            self.aggregate.uncollect(comp, meta)?;
            self.aggregate.collect(comp, &fresh)?;
            *meta = fresh;
        }
        Ok(())
    }

    fn require_root(&self, operation: &'static str) -> Result<ComponentId, ElabError> {
        self.root.ok_or(ElabError::NotElaborated { operation })
    }

    fn require_in_tree(&self, design: &Design, comp: ComponentId) -> Result<(), ElabError> {
        if self.local.contains_key(&comp) {
            Ok(())
        } else {
            Err(ElabError::NotInElaboratedTree {
                component: design.component_path(comp),
            })
        }
    }

    /// Attaches `subtree` as field `name` of `parent` and elaborates it.
    ///
    /// When `name` was left by [`remove_subtree`](Self::remove_subtree),
    /// dangling components and suspended constraints are resolved again.
    /// If anything fails to elaborate, the subtree is detached again and
    /// nothing else changes.
    pub fn add_subtree(
        &mut self,
        design: &mut Design,
        parent: ComponentId,
        name: &str,
        subtree: Member,
    ) -> Result<(), ElabError> {
        self.require_root("add_subtree")?;
        self.require_in_tree(design, parent)?;
        design.attach(parent, name, subtree.clone())?;

        let comps: Vec<ComponentId> = subtree
            .components()
            .into_iter()
            .flat_map(|c| design.subtree(c))
            .collect();
        let hole = (parent, design.intern(name));
        let filled = self.holes.shift_remove(&hole);
        tracing::debug!(
            parent = %design.component_path(parent),
            name,
            components = comps.len(),
            filled,
            "adding subtree"
        );

        let (added, refreshed) = match self.stage_add(design, &comps, filled) {
            Ok(staged) => staged,
            Err(err) => {
                if filled {
                    self.holes.insert(hole);
                }
                design.detach(parent, name)?;
                return Err(err);
            }
        };

        self.collect_all(design, added)?;
        let mut refreshed: IndexMap<ComponentId, LocalMeta> = refreshed.into_iter().collect();
        if filled {
            self.restore_constraints(design, &mut refreshed)?;
        }
        for (comp, fresh) in refreshed {
            tracing::debug!(component = %design.component_path(comp), "re-resolved");
            self.replace(comp, fresh)?;
        }
        Ok(())
    }

    /// Elaborates added components, and dangling ones when a hole was filled,
    /// without touching the aggregate.
    fn stage_add(
        &mut self,
        design: &mut Design,
        comps: &[ComponentId],
        filled: bool,
    ) -> Result<(Metas, Metas), ElabError> {
        let added = self.elaborate_all(design, comps)?;
        if !filled {
            return Ok((added, Vec::new()));
        }
        let dangling: Vec<ComponentId> = self.dangling.iter().copied().collect();
        let refreshed = self.elaborate_all(design, &dangling)?;
        Ok((added, refreshed))
    }

    /// Re-declares every suspended constraint whose endpoints resolve again.
    fn restore_constraints(
        &mut self,
        design: &mut Design,
        refreshed: &mut IndexMap<ComponentId, LocalMeta>,
    ) -> Result<(), ElabError> {
        let mut still = Vec::new();
        for entry in std::mem::take(&mut self.suspended) {
            if !self.local.contains_key(&entry.host) {
                still.push(entry);
                continue;
            }
            let resolved = resolve_endpoint(design, entry.host, &entry.first).and_then(|first| {
                Ok((first, resolve_endpoint(design, entry.host, &entry.second)?))
            });
            let constraint = match resolved {
                Ok((first, second)) => Constraint::between(first, second),
                Err(err) => {
                    tracing::trace!(error = %err, "constraint stays suspended");
                    None
                }
            };
            let Some(constraint) = constraint else {
                still.push(entry);
                continue;
            };
            let host = entry.host;
            if design.components[host].constraints.contains(&constraint) {
                continue;
            }
            tracing::debug!(
                constraint = %design.constraint_text(&constraint),
                "constraint restored"
            );
            design.components[host].constraints.push(constraint);
            if let Some(fresh) = refreshed.get_mut(&host) {
                fresh.constraints.push(constraint);
            } else if let Some(meta) = self.local.get_mut(&host) {
                self.aggregate.uncollect(host, meta)?;
                meta.constraints.push(constraint);
                self.aggregate.collect(host, meta)?;
            }
        }
        self.suspended = still;
        Ok(())
    }

    /// Detaches field `name` of `parent`, removes its components from the
    /// aggregate and returns the detached subtree.
    ///
    /// References into the subtree from components that stay resolve to
    /// nothing until an equivalent subtree is added at the same field, and
    /// constraints naming removed blocks or signals are suspended until then.
    pub fn remove_subtree(
        &mut self,
        design: &mut Design,
        parent: ComponentId,
        name: &str,
    ) -> Result<Member, ElabError> {
        self.require_root("remove_subtree")?;
        self.require_in_tree(design, parent)?;

        // Constraint text is taken while the subtree is still attached.
        let removed: IndexSet<ComponentId> = design
            .interner
            .get(name)
            .and_then(|field| design.components[parent].fields.get(&field))
            .map(|member| {
                member
                    .components()
                    .into_iter()
                    .flat_map(|c| design.subtree(c))
                    .collect()
            })
            .unwrap_or_default();
        let dead_signals: IndexSet<SignalId> = design
            .signals
            .iter()
            .filter(|(_, s)| removed.contains(&s.host))
            .map(|(id, _)| id)
            .collect();
        let dead_blocks: IndexSet<BlockId> = design
            .blocks
            .iter()
            .filter(|(_, b)| removed.contains(&b.host))
            .map(|(id, _)| id)
            .collect();
        let stale = |c: &Constraint| {
            c.blocks().iter().any(|b| dead_blocks.contains(b))
                || c.signal().is_some_and(|s| dead_signals.contains(&s))
        };
        let suspended: Vec<(ComponentId, Constraint, Option<Suspended>)> = self
            .local
            .iter()
            .filter(|(comp, _)| !removed.contains(*comp))
            .flat_map(|(&host, meta)| meta.constraints.iter().map(move |c| (host, *c)))
            .filter(|(_, c)| stale(c))
            .map(|(host, c)| {
                let (first, second) = c.endpoints();
                let entry = endpoint_decl(design, host, first)
                    .zip(endpoint_decl(design, host, second))
                    .map(|(first, second)| Suspended { host, first, second });
                (host, c, entry)
            })
            .collect();
        let member = design.detach(parent, name)?;

        tracing::debug!(
            parent = %design.component_path(parent),
            name,
            components = removed.len(),
            "removing subtree"
        );
        let hole = (parent, design.intern(name));
        self.holes.insert(hole);
        let ancestors: Vec<ComponentId> = std::iter::successors(Some(parent), |&c| {
            design.components[c].parent
        })
        .filter(|c| self.local.contains_key(c))
        .collect();
        let fresh = match self.elaborate_all(design, &ancestors) {
            Ok(fresh) => fresh,
            Err(err) => {
                self.holes.shift_remove(&hole);
                design.attach(parent, name, member)?;
                return Err(err);
            }
        };

        for &comp in &removed {
            self.dangling.shift_remove(&comp);
            if let Some(meta) = self.local.shift_remove(&comp) {
                self.aggregate.uncollect(comp, &meta)?;
            }
        }
        self.aggregate.remove_signals(&dead_signals);

        for (host, constraint, entry) in suspended {
            design.components[host].constraints.retain(|c| *c != constraint);
            match entry {
                Some(entry) => self.suspended.push(entry),
                None => tracing::warn!(
                    component = %design.component_path(host),
                    "dropping constraint on blocks outside its component"
                ),
            }
            if let Some(meta) = self.local.get_mut(&host) {
                self.aggregate.uncollect(host, meta)?;
                meta.constraints.retain(|c| *c != constraint);
                self.aggregate.collect(host, meta)?;
            }
        }
        for (comp, mut meta) in fresh {
            meta.constraints.retain(|c| !stale(c));
            if meta.dangling {
                tracing::debug!(component = %design.component_path(comp), "dangling");
            }
            self.replace(comp, meta)?;
        }
        Ok(member)
    }

    /// Records "`first` before `second`" on `host`, keeping the aggregate in
    /// step when `host` is already elaborated.
    pub fn add_constraint(
        &mut self,
        design: &mut Design,
        host: ComponentId,
        first: Endpoint,
        second: Endpoint,
    ) -> Result<Constraint, ElabError> {
        let constraint = design.add_constraint(host, first, second)?;
        if let Some(meta) = self.local.get_mut(&host) {
            self.aggregate.uncollect(host, meta)?;
            meta.constraints.push(constraint);
            self.aggregate.collect(host, meta)?;
        }
        Ok(constraint)
    }

    /// Runs the legality checker over the aggregate.
    pub fn check(&self, design: &Design) -> Result<(), ElabError> {
        self.require_root("check")?;
        LegalityChecker::new().check(design, &self.aggregate)
    }

    /// Aggregated metadata of the whole tree.
    pub fn aggregate(&self) -> Result<&Aggregate, ElabError> {
        self.require_root("aggregate")?;
        Ok(&self.aggregate)
    }

    /// Path-keyed snapshot of the aggregate.
    pub fn summary(&self, design: &Design) -> Result<Summary, ElabError> {
        Ok(self.aggregate()?.summary(design))
    }

    /// Local metadata of one elaborated component.
    pub fn local_meta(&self, comp: ComponentId) -> Option<&LocalMeta> {
        self.local.get(&comp)
    }

    /// The component that declared `block`.
    pub fn block_host(&self, design: &Design, block: BlockId) -> Result<ComponentId, ElabError> {
        self.require_root("block_host")?;
        let host = design.blocks[block].host;
        self.require_in_tree(design, host)?;
        Ok(host)
    }

    /// Reads, writes and flattened calls of `block`.
    pub fn block_access(&self, design: &Design, block: BlockId) -> Result<&AccessSets, ElabError> {
        self.block_host(design, block)?;
        self.aggregate.block(block).ok_or_else(|| {
            InternalError::new(format!("{} is not aggregated", design.block_path(block))).into()
        })
    }

    /// Syntax tree of `block`.
    pub fn block_ast(&self, design: &Design, block: BlockId) -> Result<&Body, ElabError> {
        let host = self.block_host(design, block)?;
        self.local
            .get(&host)
            .and_then(|meta| meta.bodies.get(&Owner::Block(block)))
            .map(|entry| &entry.body)
            .ok_or_else(|| {
                InternalError::new(format!("no body for {}", design.block_path(block))).into()
            })
    }

    /// Every reference in `owner` with the signals it resolved to.
    pub fn references(
        &self,
        design: &Design,
        owner: Owner,
    ) -> Result<Vec<(Span, &IndexSet<SignalId>)>, ElabError> {
        self.require_root("references")?;
        let host = match owner {
            Owner::Block(b) => design.blocks[b].host,
            Owner::Func(f) => design.funcs[f].host,
        };
        self.require_in_tree(design, host)?;
        let meta = &self.local[&host];
        Ok(meta
            .references
            .iter()
            .filter(|((o, _), _)| *o == owner)
            .map(|(&(_, span), set)| (span, set))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ir::{BlockKind, SignalKind, SignalSpec};

    fn up_pair() -> (Design, ComponentId, BlockId, BlockId) {
        let mut design = Design::new();
        let top = design.add_component("Top");
        for name in ["a", "b"] {
            design
                .add_signal(top, name, SignalKind::Wire, &SignalSpec::scalar())
                .unwrap();
        }
        let up1 = design
            .add_block(top, "up1", BlockKind::Combinational, "s.b = s.a")
            .unwrap();
        let up2 = design
            .add_block(top, "up2", BlockKind::Combinational, "s.a = s.b")
            .unwrap();
        (design, top, up1, up2)
    }

    fn paths(design: &Design, set: &IndexSet<SignalId>) -> Vec<String> {
        set.iter().map(|&s| design.signal_path(s)).collect()
    }

    #[test]
    fn blocks_feeding_each_other() {
        let (mut design, top, up1, up2) = up_pair();
        let mut elab = Elaborator::default();
        elab.elaborate(&mut design, top).unwrap();

        let first = elab.block_access(&design, up1).unwrap();
        assert_eq!(paths(&design, &first.reads), vec!["s.a"]);
        assert_eq!(paths(&design, &first.writes), vec!["s.b"]);
        let second = elab.block_access(&design, up2).unwrap();
        assert_eq!(paths(&design, &second.reads), vec!["s.b"]);
        assert_eq!(paths(&design, &second.writes), vec!["s.a"]);
        assert!(first.calls.is_empty());
        elab.check(&design).unwrap();
    }

    #[test]
    fn queries_need_an_elaborated_root() {
        let (design, _, up1, _) = up_pair();
        let elab = Elaborator::default();
        assert!(matches!(
            elab.aggregate(),
            Err(ElabError::NotElaborated { operation: "aggregate" })
        ));
        assert!(elab.block_access(&design, up1).is_err());
        assert!(elab.check(&design).is_err());
    }

    #[test]
    fn elaborating_twice_is_rejected() {
        let (mut design, top, _, _) = up_pair();
        let mut elab = Elaborator::default();
        elab.elaborate(&mut design, top).unwrap();
        let err = elab.elaborate(&mut design, top).unwrap_err();
        assert!(matches!(err, ElabError::AlreadyElaborated { .. }));
    }

    #[test]
    fn block_host_and_ast() {
        let (mut design, top, up1, _) = up_pair();
        let mut elab = Elaborator::default();
        elab.elaborate(&mut design, top).unwrap();
        assert_eq!(elab.block_host(&design, up1).unwrap(), top);
        assert_eq!(elab.block_ast(&design, up1).unwrap().stmts.len(), 1);
        let refs = elab.references(&design, Owner::Block(up1)).unwrap();
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn edits_outside_the_tree_are_rejected() {
        let (mut design, top, _, _) = up_pair();
        let stray = design.add_component("Stray");
        let mut elab = Elaborator::default();
        elab.elaborate(&mut design, top).unwrap();
        let child = design.add_component("Child");
        let err = elab
            .add_subtree(&mut design, stray, "c", Member::Component(child))
            .unwrap_err();
        assert!(matches!(err, ElabError::NotInElaboratedTree { .. }));
    }

    #[test]
    fn late_constraint_reaches_the_aggregate() {
        let (mut design, top, up1, up2) = up_pair();
        let mut elab = Elaborator::default();
        elab.elaborate(&mut design, top).unwrap();
        elab.add_constraint(&mut design, top, Endpoint::Block(up1), Endpoint::Block(up2))
            .unwrap();
        let order: Vec<_> = elab.aggregate().unwrap().block_order().collect();
        assert_eq!(order, vec![(up1, up2)]);

        let err = elab
            .add_constraint(&mut design, top, Endpoint::Block(up1), Endpoint::Block(up2))
            .unwrap_err();
        assert!(matches!(err, ElabError::InvalidConstraint { .. }));
    }

    #[test]
    fn failed_add_leaves_design_unchanged() {
        let (mut design, top, _, _) = up_pair();
        let mut elab = Elaborator::default();
        elab.elaborate(&mut design, top).unwrap();
        let before = elab.summary(&design).unwrap();

        let bad = design.add_component("Bad");
        design
            .add_block(bad, "up", BlockKind::Combinational, "s.nothing = 1")
            .unwrap();
        let err = elab
            .add_subtree(&mut design, top, "bad", Member::Component(bad))
            .unwrap_err();
        assert!(matches!(err, ElabError::UnresolvedReference { .. }));
        assert!(design.components[bad].parent.is_none());
        assert_eq!(elab.summary(&design).unwrap(), before);
    }

    #[test]
    fn remove_and_re_add_an_unreferenced_child() {
        let (mut design, top, _, _) = up_pair();
        let child = design.add_component("Child");
        design.attach(top, "child", Member::Component(child)).unwrap();
        let mut elab = Elaborator::default();
        elab.elaborate(&mut design, top).unwrap();
        let before = elab.summary(&design).unwrap();

        let err = elab.remove_subtree(&mut design, top, "nope").unwrap_err();
        assert!(matches!(err, ElabError::Declaration(_)), "{err:?}");
        assert_eq!(elab.summary(&design).unwrap(), before);

        let member = elab.remove_subtree(&mut design, top, "child").unwrap();
        assert_eq!(elab.dangling().count(), 0);
        elab.add_subtree(&mut design, top, "child", member).unwrap();
        assert_eq!(elab.summary(&design).unwrap(), before);
    }
}
