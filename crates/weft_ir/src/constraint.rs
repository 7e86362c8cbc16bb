//! Explicit ordering constraints authored by users.

use crate::ids::{BlockId, SignalId};
use serde::{Deserialize, Serialize};

/// Which access of a signal a value constraint orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Access {
    /// `RD(x)`
    Read,
    /// `WR(x)`
    Write,
}

/// Direction of a value constraint relative to its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValueOrder {
    /// The access happens before the block runs.
    BeforeBlock,
    /// The access happens after the block runs.
    AfterBlock,
}

/// One side of a constraint as written by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `U(blk)`
    Block(BlockId),
    /// `RD(x)`
    Read(SignalId),
    /// `WR(x)`
    Write(SignalId),
}

/// A stored constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// `before` runs before `after`.
    BlockOrder {
        /// Earlier block.
        before: BlockId,
        /// Later block.
        after: BlockId,
    },
    /// An access of `signal` is ordered against `block`.
    Value {
        /// Read or write.
        access: Access,
        /// Constrained signal.
        signal: SignalId,
        /// Block on the other side.
        block: BlockId,
        /// Direction.
        order: ValueOrder,
    },
}

impl Constraint {
    /// Builds the constraint meaning "`first` before `second`".
    ///
    /// Returns `None` when neither endpoint is a block, since two accesses
    /// cannot be ordered against each other directly.
    pub fn between(first: Endpoint, second: Endpoint) -> Option<Self> {
        let value = |access, signal, block, order| Constraint::Value {
            access,
            signal,
            block,
            order,
        };
        match (first, second) {
            (Endpoint::Block(before), Endpoint::Block(after)) => {
                Some(Constraint::BlockOrder { before, after })
            }
            (Endpoint::Read(s), Endpoint::Block(b)) => {
                Some(value(Access::Read, s, b, ValueOrder::BeforeBlock))
            }
            (Endpoint::Write(s), Endpoint::Block(b)) => {
                Some(value(Access::Write, s, b, ValueOrder::BeforeBlock))
            }
            (Endpoint::Block(b), Endpoint::Read(s)) => {
                Some(value(Access::Read, s, b, ValueOrder::AfterBlock))
            }
            (Endpoint::Block(b), Endpoint::Write(s)) => {
                Some(value(Access::Write, s, b, ValueOrder::AfterBlock))
            }
            _ => None,
        }
    }

    /// The two endpoints, in order. Inverse of [`between`](Self::between).
    pub fn endpoints(&self) -> (Endpoint, Endpoint) {
        match *self {
            Constraint::BlockOrder { before, after } => (Endpoint::Block(before), Endpoint::Block(after)),
            Constraint::Value {
                access,
                signal,
                block,
                order,
            } => {
                let value = match access {
                    Access::Read => Endpoint::Read(signal),
                    Access::Write => Endpoint::Write(signal),
                };
                match order {
                    ValueOrder::BeforeBlock => (value, Endpoint::Block(block)),
                    ValueOrder::AfterBlock => (Endpoint::Block(block), value),
                }
            }
        }
    }

    /// Blocks named by this constraint.
    pub fn blocks(&self) -> Vec<BlockId> {
        match *self {
            Constraint::BlockOrder { before, after } => vec![before, after],
            Constraint::Value { block, .. } => vec![block],
        }
    }

    /// Signal named by this constraint, if any.
    pub fn signal(&self) -> Option<SignalId> {
        match *self {
            Constraint::BlockOrder { .. } => None,
            Constraint::Value { signal, .. } => Some(signal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blk(n: u32) -> BlockId {
        BlockId::from_raw(n)
    }

    #[test]
    fn block_pair_orders_blocks() {
        assert_eq!(
            Constraint::between(Endpoint::Block(blk(0)), Endpoint::Block(blk(1))),
            Some(Constraint::BlockOrder {
                before: blk(0),
                after: blk(1)
            })
        );
    }

    #[test]
    fn value_side_decides_order() {
        let sig = SignalId::from_raw(3);
        let before = Constraint::between(Endpoint::Write(sig), Endpoint::Block(blk(1))).unwrap();
        let after = Constraint::between(Endpoint::Block(blk(1)), Endpoint::Write(sig)).unwrap();
        assert!(matches!(
            before,
            Constraint::Value { access: Access::Write, order: ValueOrder::BeforeBlock, .. }
        ));
        assert!(matches!(
            after,
            Constraint::Value { order: ValueOrder::AfterBlock, .. }
        ));
        assert_eq!(after.signal(), Some(sig));
        assert_eq!(after.blocks(), vec![blk(1)]);
        assert_eq!(after.endpoints(), (Endpoint::Block(blk(1)), Endpoint::Write(sig)));
        assert_eq!(before.endpoints(), (Endpoint::Write(sig), Endpoint::Block(blk(1))));
    }

    #[test]
    fn two_values_cannot_be_ordered() {
        let a = SignalId::from_raw(0);
        let b = SignalId::from_raw(1);
        assert!(Constraint::between(Endpoint::Read(a), Endpoint::Write(b)).is_none());
    }
}
