//! Classification axes attached to every [`crate::model::ErrorObj`].

use serde::{Deserialize, Serialize};

macro_rules! labelled {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

labelled!(
    /// Which subsystem produced the error.
    ErrorKind {
        Auth => "Auth",
        Token => "Token",
        Keys => "Keys",
        Schema => "Schema",
        Provider => "Provider",
        Unknown => "Unknown",
    }
);

labelled!(
    /// Whether repeating the same call may succeed.
    RetryClass {
        Transient => "transient",
        Permanent => "permanent",
    }
);

labelled!(
    Severity {
        Info => "info",
        Warn => "warn",
        Error => "error",
        Critical => "critical",
    }
);
