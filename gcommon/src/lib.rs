//! Shared primitives for the gossamer workspace crates.
//!
//! ```rust
//! use gcommon::{MetadataMap, Registry, SessionId, TraceId};
//!
//! let session = SessionId::new("chat-7");
//! let trace = TraceId::from("trace-7");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("tenant".to_string(), "acme".to_string());
//!
//! let mut registry = Registry::new();
//! registry.insert("echo".to_string(), 1_u32);
//!
//! assert_eq!(session.as_str(), "chat-7");
//! assert_eq!(trace.to_string(), "trace-7");
//! assert!(registry.contains_key("echo"));
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use gcommon::BoxFuture;
    //!
    //! fn word_count<'a>(text: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { text.split_whitespace().count() })
    //! }
    //!
    //! let _future = word_count("one two three");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Cross-crate identifier newtypes and request metadata.

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    pub type MetadataMap = HashMap<String, String>;

    macro_rules! string_id {
        ($name:ident) => {
            #[derive(Debug, Clone, PartialEq, Eq, Hash)]
            pub struct $name(String);

            impl $name {
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                pub fn as_str(&self) -> &str {
                    self.0.as_str()
                }

                pub fn into_inner(self) -> String {
                    self.0
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<String> for $name {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }
        };
    }

    string_id!(SessionId);
    string_id!(TraceId);
}

pub mod registry {
    //! Generic name-keyed map used by the runtime registries.

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::{MetadataMap, SessionId, TraceId};
pub use future::BoxFuture;
pub use registry::Registry;

#[cfg(test)]
mod tests {
    use super::{Registry, SessionId, TraceId};

    #[test]
    fn id_newtypes_round_trip_strings() {
        let session = SessionId::new("chat-1");
        let trace = TraceId::from("trace-1".to_string());

        assert_eq!(session.as_str(), "chat-1");
        assert_eq!(session.to_string(), "chat-1");
        assert_eq!(trace.into_inner(), "trace-1");
    }

    #[test]
    fn registry_insert_get_remove() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.insert("alpha".to_string(), 10_u32);
        registry.insert("beta".to_string(), 20_u32);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("alpha"), Some(&10));
        assert!(registry.keys().any(|key| key == "beta"));

        assert_eq!(registry.remove("alpha"), Some(10));
        assert!(!registry.contains_key("alpha"));
    }

    #[test]
    fn registry_insert_replaces_existing_entry() {
        let mut registry = Registry::new();
        assert_eq!(registry.insert("echo".to_string(), 1_u32), None);
        assert_eq!(registry.insert("echo".to_string(), 2_u32), Some(1));
        assert_eq!(registry.get("echo"), Some(&2));
        assert_eq!(registry.len(), 1);
    }
}
