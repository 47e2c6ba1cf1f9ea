// Error-presence scan over report values
use std::collections::{BTreeMap, HashMap};

/// A node of a report tree that can say whether it, or anything it owns,
/// carries an error.
///
/// Records implement this by hand: a present `error` field reports `true`
/// (even when the message is empty), otherwise the record asks its nested
/// fields. Containers answer with the first child that reports an error.
///
/// Only owning containers and shared references implement the trait. There is
/// no impl for `Rc`, `Arc` or interior-mutable cells, so every value that can
/// be scanned is a tree and the walk always terminates.
pub trait Fallible {
    fn has_errors(&self) -> bool;
}

impl<T: Fallible + ?Sized> Fallible for &T {
    fn has_errors(&self) -> bool {
        (**self).has_errors()
    }
}

impl<T: Fallible + ?Sized> Fallible for Box<T> {
    fn has_errors(&self) -> bool {
        (**self).has_errors()
    }
}

/// `None` is a nil reference: no error, nothing to look at.
impl<T: Fallible> Fallible for Option<T> {
    fn has_errors(&self) -> bool {
        self.as_ref().is_some_and(Fallible::has_errors)
    }
}

impl<T: Fallible> Fallible for [T] {
    fn has_errors(&self) -> bool {
        self.iter().any(Fallible::has_errors)
    }
}

impl<T: Fallible> Fallible for Vec<T> {
    fn has_errors(&self) -> bool {
        self.as_slice().has_errors()
    }
}

impl<K, V: Fallible, S> Fallible for HashMap<K, V, S> {
    fn has_errors(&self) -> bool {
        self.values().any(Fallible::has_errors)
    }
}

impl<K, V: Fallible> Fallible for BTreeMap<K, V> {
    fn has_errors(&self) -> bool {
        self.values().any(Fallible::has_errors)
    }
}
