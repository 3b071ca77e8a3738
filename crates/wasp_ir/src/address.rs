use std::fmt;

/// A fully-qualified global path, e.g. the root at which a class's
/// prototype lives. Segments are stored innermost-first (reversed), which
/// is how the writer collaborator expects to consume them, but
/// [`Address::segments`] and `Display` present them in natural order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    reversed: Vec<String>,
}

impl Address {
    pub fn new(natural_order: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut reversed: Vec<String> = natural_order.into_iter().map(Into::into).collect();
        reversed.reverse();
        Self { reversed }
    }

    pub fn from_reversed(reversed: Vec<String>) -> Self {
        Self { reversed }
    }

    pub fn segments(&self) -> Vec<&str> {
        self.reversed.iter().rev().map(String::as_str).collect()
    }

    /// The address of the immediate parent (e.g. a class's address given
    /// its static-member address), or `None` at the root.
    pub fn parent(&self) -> Option<Address> {
        if self.reversed.len() <= 1 {
            return None;
        }
        Some(Address { reversed: self.reversed[1..].to_vec() })
    }

    pub fn child(&self, segment: impl Into<String>) -> Address {
        let mut reversed = vec![segment.into()];
        reversed.extend(self.reversed.iter().cloned());
        Address { reversed }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments().join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_natural_order() {
        let addr = Address::new(["N", "M", "method"]);
        assert_eq!(addr.segments(), vec!["N", "M", "method"]);
        assert_eq!(addr.to_string(), "N.M.method");
    }

    #[test]
    fn child_prepends_segment() {
        let addr = Address::new(["N", "M"]);
        let field = addr.child("prototype");
        assert_eq!(field.segments(), vec!["N", "M", "prototype"]);
    }

    #[test]
    fn parent_drops_innermost_segment() {
        let addr = Address::new(["N", "M", "method"]);
        let parent = addr.parent().unwrap();
        assert_eq!(parent.segments(), vec!["N", "M"]);
    }
}
