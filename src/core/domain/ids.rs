//! Domain identifier types with proper encapsulation.

use std::fmt;

macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from anything string-like.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

id_newtype!(MarketId, "Opaque identity of a Market.");
id_newtype!(OptionId, "Opaque identity of a Market Option (upstream token id for real venues).");
id_newtype!(RuleId, "Identity of a RuleDefinition row.");
id_newtype!(SignalId, "Identity of an emitted Signal.");
id_newtype!(GroupId, "Identity of a SynonymGroup.");
id_newtype!(PolicyId, "Identity of an ExecutionPolicy.");
id_newtype!(IntentId, "Identity of an OrderIntent.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_id_roundtrips_through_string_and_str() {
        assert_eq!(MarketId::from("m-1".to_string()).as_str(), "m-1");
        assert_eq!(MarketId::from("m-1").as_str(), "m-1");
        assert_eq!(format!("{}", MarketId::new("m-1")), "m-1");
    }

    #[test]
    fn ids_of_different_kinds_do_not_implicitly_convert() {
        let market = MarketId::new("same-text");
        let option = OptionId::new("same-text");
        assert_eq!(market.as_str(), option.as_str());
    }

    #[test]
    fn ids_are_ordered_lexicographically() {
        let mut ids = vec![MarketId::new("b"), MarketId::new("a"), MarketId::new("c")];
        ids.sort();
        assert_eq!(ids, vec![MarketId::new("a"), MarketId::new("b"), MarketId::new("c")]);
    }
}
