//! Stable handles for every object in a [`Design`](crate::Design).

use crate::arena::Handle;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Handle for the raw slot index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Raw slot index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl Handle for $name {
            fn at(slot: usize) -> Self {
                Self(slot as u32)
            }

            fn slot(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// Handle of a component instance.
    ComponentId
);

define_id!(
    /// Handle of a state object: a declared signal, a struct field, or a slice view.
    SignalId
);

define_id!(
    /// Handle of an update block instance.
    BlockId
);

define_id!(
    /// Handle of a helper function instance.
    FuncId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip() {
        assert_eq!(BlockId::from_raw(9).as_raw(), 9);
        assert_eq!(FuncId::at(2), FuncId::from_raw(2));
        assert_eq!(FuncId::from_raw(2).slot(), 2);
    }

    #[test]
    fn ordering_follows_index() {
        assert!(ComponentId::from_raw(1) < ComponentId::from_raw(2));
    }
}
