//! Dependency lists for effect memoization.
//!
//! A [`Deps`] is an ordered list of heterogeneous values. Two lists are the
//! same when they have the same length and every pair of elements at the same
//! index has the same type and compares equal. Elements compare with
//! `PartialEq`, except `f32` and `f64`, which compare by value identity:
//! `NaN` matches `NaN` and `0.0` does not match `-0.0`. Wrap shared values in
//! [`Identity`] to compare them by address instead.

use smallvec::SmallVec;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

trait DepValue: Any {
    fn dep_eq(&self, other: &dyn DepValue) -> bool;
    fn as_any(&self) -> &dyn Any;
}

impl<T: PartialEq + 'static> DepValue for T {
    fn dep_eq(&self, other: &dyn DepValue) -> bool {
        let Some(other) = other.as_any().downcast_ref::<T>() else {
            return false;
        };
        let this: &dyn Any = self;
        let that: &dyn Any = other;
        if let (Some(a), Some(b)) = (this.downcast_ref::<f64>(), that.downcast_ref::<f64>()) {
            return (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits();
        }
        if let (Some(a), Some(b)) = (this.downcast_ref::<f32>(), that.downcast_ref::<f32>()) {
            return (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits();
        }
        self == other
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One element of a dependency list.
pub struct Dep(Box<dyn DepValue>);

impl Dep {
    pub fn new<T: PartialEq + 'static>(value: T) -> Self {
        Self(Box::new(value))
    }
}

impl PartialEq for Dep {
    fn eq(&self, other: &Self) -> bool {
        self.0.dep_eq(&*other.0)
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dep(..)")
    }
}

/// Ordered dependency list of an effect. Build it with [`deps!`](crate::deps!).
#[derive(Default, Debug)]
pub struct Deps {
    values: SmallVec<[Dep; 4]>,
}

impl Deps {
    /// Empty list: the effect runs on mount only.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: PartialEq + 'static>(mut self, value: T) -> Self {
        self.values.push(Dep::new(value));
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether `self` and `previous` would let an effect skip its re-run.
    pub fn same_as(&self, previous: &Deps) -> bool {
        self.values.len() == previous.values.len()
            && self
                .values
                .iter()
                .zip(previous.values.iter())
                .all(|(next, prev)| next == prev)
    }
}

impl FromIterator<Dep> for Deps {
    fn from_iter<I: IntoIterator<Item = Dep>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Builds a [`Deps`] list from expressions.
///
/// ```
/// use hookline_core::deps;
///
/// let count = 3;
/// let label = "clicks";
/// assert!(deps![count, label].same_as(&deps![3, "clicks"]));
/// assert!(deps![].is_empty());
/// ```
#[macro_export]
macro_rules! deps {
    () => {
        $crate::Deps::new()
    };
    ($($value:expr),+ $(,)?) => {
        <$crate::Deps as ::core::iter::FromIterator<$crate::Dep>>::from_iter([
            $($crate::Dep::new($value)),+
        ])
    };
}

/// Dependency compared by `Rc` address rather than by value.
pub struct Identity<T: ?Sized>(pub Rc<T>);

impl<T: ?Sized> Identity<T> {
    pub fn new(value: &Rc<T>) -> Self {
        Self(Rc::clone(value))
    }
}

impl<T: ?Sized> Clone for Identity<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: ?Sized> PartialEq for Identity<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ?Sized> fmt::Debug for Identity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({:p})", Rc::as_ptr(&self.0))
    }
}
