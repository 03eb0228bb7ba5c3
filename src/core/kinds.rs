//! Identifiers shared by the catalog, the registry and the pipeline.
//!
//! All of them are cheap to clone (`Cow<'static, str>` backed) so they can be
//! copied into registrations, contexts and traces without bookkeeping.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Cow<'static, str>);

        impl $name {
            pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
                Self(name.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&'static str> for $name {
            fn from(name: &'static str) -> Self {
                Self(Cow::Borrowed(name))
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(Cow::Owned(name))
            }
        }
    };
}

string_identifier!(
    /// Names a class of marker (e.g. `"retry"`, `"audit"`).
    MarkerKind
);

string_identifier!(
    /// Names an aspect implementation able to wrap a call.
    AspectKind
);

string_identifier!(
    /// Names an implementation type whose methods may carry markers.
    TypeKey
);

impl AspectKind {
    /// The aspect kind of a Rust type, keyed by its type name.
    pub fn of<A: ?Sized + 'static>() -> Self {
        Self::new(std::any::type_name::<A>())
    }
}

impl TypeKey {
    /// The key of a Rust type, keyed by its type name.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(std::any::type_name::<T>())
    }
}

/// A stable handle to one method on one implementation type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodIdentity {
    declaring_type: TypeKey,
    name: Cow<'static, str>,
}

impl MethodIdentity {
    pub fn new(declaring_type: TypeKey, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            declaring_type,
            name: name.into(),
        }
    }

    /// Shorthand for a method declared on the Rust type `T`.
    pub fn of<T: ?Sized + 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(TypeKey::of::<T>(), name)
    }

    pub fn declaring_type(&self) -> &TypeKey {
        &self.declaring_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for MethodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring_type, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Foo;

    #[test]
    fn test_kinds_compare_by_name() {
        assert_eq!(MarkerKind::from("retry"), MarkerKind::new(String::from("retry")));
        assert_ne!(MarkerKind::from("retry"), MarkerKind::from("audit"));
        assert_eq!(AspectKind::from("Spy").to_string(), "Spy");
    }

    #[test]
    fn test_type_derived_keys() {
        assert_eq!(TypeKey::of::<Foo>().as_str(), std::any::type_name::<Foo>());
        assert_eq!(AspectKind::of::<Foo>(), AspectKind::of::<Foo>());
        assert_ne!(TypeKey::of::<Foo>(), TypeKey::of::<String>());
    }

    #[test]
    fn test_method_identity_equality_and_hash() {
        let a = MethodIdentity::of::<Foo>("bar");
        let b = MethodIdentity::new(TypeKey::of::<Foo>(), String::from("bar"));
        let c = MethodIdentity::of::<Foo>("baz");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&b));
        assert!(!set.contains(&c));
    }

    #[test]
    fn test_method_identity_display() {
        let method = MethodIdentity::new(TypeKey::from("Calculator"), "add");
        assert_eq!(method.to_string(), "Calculator::add");
        assert_eq!(method.name(), "add");
    }

    #[test]
    fn test_identifiers_serialize_as_plain_strings() {
        let kind = MarkerKind::from("audit");
        assert_eq!(serde_json::to_value(&kind).unwrap(), serde_json::json!("audit"));
        let back: MarkerKind = serde_json::from_value(serde_json::json!("audit")).unwrap();
        assert_eq!(back, kind);
    }
}
