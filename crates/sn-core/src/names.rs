//! Strongly-typed node and pipeline names.
//!
//! Both wrap a `String` that is checked once, at construction or
//! deserialization, and then used as a map key and interpolated into SQL.

/// Generate a checked string wrapper. `$check` returns the reason a candidate is rejected.
macro_rules! checked_name {
    (
        $(#[$meta:meta])*
        $Name:ident, $check:path
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        #[serde(transparent)]
        pub struct $Name(String);

        impl $Name {
            /// Create a name from trusted input, panicking if it is invalid.
            pub fn new(name: impl Into<String>) -> Self {
                match Self::parse(name) {
                    Ok(name) => name,
                    Err(reason) => panic!("{}", reason),
                }
            }

            /// Create a name, returning why it is invalid otherwise.
            pub fn parse(name: impl Into<String>) -> Result<Self, String> {
                let name = name.into();
                $check(&name).map(|()| Self(name))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl<'de> serde::Deserialize<'de> for $Name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                $Name::parse(raw).map_err(serde::de::Error::custom)
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $Name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $Name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<String> for $Name {
            fn eq(&self, other: &String) -> bool {
                self.0 == *other
            }
        }
    };
}

checked_name! {
    /// A managed node name, usually schema-qualified (e.g. `derived.survey`).
    ///
    /// Interpolated unquoted into DDL and as a catalog literal in drop scripts,
    /// so it must be non-empty, free of whitespace and quotes, and lowercase:
    /// PostgreSQL folds unquoted identifiers, and `pg_views.viewname` holds the
    /// folded name.
    NodeName, check_node_name
}

checked_name! {
    /// A pipeline name, matching a registered row in the pipeline state table.
    PipelineName, check_pipeline_name
}

fn check_node_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("node name must not be empty".to_string());
    }
    if name.chars().any(char::is_whitespace) {
        return Err(format!("node name '{}' must not contain whitespace", name));
    }
    if name.contains('"') {
        return Err(format!("node name '{}' must not contain quotes", name));
    }
    if name.chars().any(char::is_uppercase) {
        return Err(format!(
            "node name '{}' must be lowercase (PostgreSQL folds unquoted identifiers)",
            name
        ));
    }
    if name.starts_with('.') || name.ends_with('.') {
        return Err(format!("node name '{}' has an empty schema or object part", name));
    }
    Ok(())
}

fn check_pipeline_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("pipeline name must not be empty".to_string());
    }
    Ok(())
}
