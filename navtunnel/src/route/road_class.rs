//! Road classification tags attached to route intersections.

use std::fmt;
use std::str::FromStr;

/// A single road-class tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoadClass {
    /// Toll road.
    Toll,
    /// Access-restricted road.
    Restricted,
    /// Motorway / freeway.
    Motorway,
    /// Ferry crossing.
    Ferry,
    /// Road segment inside a tunnel.
    Tunnel,
}

impl RoadClass {
    /// All road classes in declaration order.
    pub const ALL: [RoadClass; 5] = [
        RoadClass::Toll,
        RoadClass::Restricted,
        RoadClass::Motorway,
        RoadClass::Ferry,
        RoadClass::Tunnel,
    ];

    /// Lowercase tag name as used in route data.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoadClass::Toll => "toll",
            RoadClass::Restricted => "restricted",
            RoadClass::Motorway => "motorway",
            RoadClass::Ferry => "ferry",
            RoadClass::Tunnel => "tunnel",
        }
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoadClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoadClass::ALL
            .into_iter()
            .find(|class| class.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown road class '{}'", s))
    }
}

/// Set of road-class tags, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoadClassSet(u8);

impl RoadClassSet {
    /// An empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// A set containing only `class`.
    pub fn only(class: RoadClass) -> Self {
        Self(class.bit())
    }

    /// Add a tag.
    pub fn insert(&mut self, class: RoadClass) {
        self.0 |= class.bit();
    }

    /// Whether the set contains `class`.
    pub fn contains(&self, class: RoadClass) -> bool {
        self.0 & class.bit() != 0
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate tags in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = RoadClass> + '_ {
        RoadClass::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl FromIterator<RoadClass> for RoadClassSet {
    fn from_iter<I: IntoIterator<Item = RoadClass>>(iter: I) -> Self {
        let mut set = RoadClassSet::empty();
        for class in iter {
            set.insert(class);
        }
        set
    }
}

impl fmt::Display for RoadClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|c| c.as_str()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_contains_nothing() {
        let set = RoadClassSet::empty();
        assert!(set.is_empty());
        for class in RoadClass::ALL {
            assert!(!set.contains(class));
        }
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = RoadClassSet::only(RoadClass::Motorway);
        set.insert(RoadClass::Tunnel);

        assert!(set.contains(RoadClass::Tunnel));
        assert!(set.contains(RoadClass::Motorway));
        assert!(!set.contains(RoadClass::Ferry));
    }

    #[test]
    fn test_from_iterator_and_display() {
        let set: RoadClassSet = [RoadClass::Tunnel, RoadClass::Toll].into_iter().collect();
        assert_eq!(set.to_string(), "{toll, tunnel}");
    }

    #[test]
    fn test_parse_road_class() {
        assert_eq!("tunnel".parse::<RoadClass>(), Ok(RoadClass::Tunnel));
        assert_eq!(" Motorway ".parse::<RoadClass>(), Ok(RoadClass::Motorway));
        assert!("bridge".parse::<RoadClass>().is_err());
    }
}
