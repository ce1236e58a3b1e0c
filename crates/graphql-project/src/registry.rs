use crate::Location;

/// A `fragment Name on Type { ... }` definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentDefinition {
    pub name: String,
    pub type_condition: String,

    /// Span of the fragment name, in host-file coordinates
    pub location: Option<Location>,
}

/// A `...Name` usage of a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSpread {
    pub name: String,

    /// Span of the spread name, in host-file coordinates
    pub location: Option<Location>,
}

/// Read-only view of the fragments known to a project.
///
/// The editor features only need to look fragments up by name and find where
/// they are spread, so the project index is consumed through this trait.
pub trait FragmentRegistry {
    /// The definition of a fragment, if one is indexed under `name`.
    fn fragment(&self, name: &str) -> Option<FragmentDefinition>;

    /// Every spread of the fragment `name`, in document index order.
    fn fragment_spreads(&self, name: &str) -> Vec<FragmentSpread>;

    /// All fragment definitions, one per name.
    fn fragments(&self) -> Vec<FragmentDefinition>;
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;

    /// In-memory registry for unit tests
    #[derive(Debug, Default)]
    pub struct FakeRegistry {
        pub fragments: Vec<FragmentDefinition>,
        pub spreads: Vec<FragmentSpread>,
    }

    impl FakeRegistry {
        pub fn with_fragment(mut self, name: &str, type_condition: &str) -> Self {
            self.fragments.push(FragmentDefinition {
                name: name.to_string(),
                type_condition: type_condition.to_string(),
                location: None,
            });
            self
        }

        pub fn with_spread(mut self, name: &str, location: Option<Location>) -> Self {
            self.spreads.push(FragmentSpread {
                name: name.to_string(),
                location,
            });
            self
        }
    }

    impl FragmentRegistry for FakeRegistry {
        fn fragment(&self, name: &str) -> Option<FragmentDefinition> {
            self.fragments.iter().find(|f| f.name == name).cloned()
        }

        fn fragment_spreads(&self, name: &str) -> Vec<FragmentSpread> {
            self.spreads
                .iter()
                .filter(|spread| spread.name == name)
                .cloned()
                .collect()
        }

        fn fragments(&self) -> Vec<FragmentDefinition> {
            self.fragments.clone()
        }
    }
}
