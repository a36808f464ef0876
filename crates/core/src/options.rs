//! Session options forwarded to the backend with every job.
//!
//! Each option enum maps to the exact string the backend expects on the
//! wire. [`Options`] bundles them; `crate_type: None` means the crate type
//! is inferred from the source at dispatch time (see
//! [`CrateType::infer`]).

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! define_option_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident = $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant ),+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Wire name of this value.
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.name().eq_ignore_ascii_case(s))
                    .ok_or_else(|| CoreError::UnknownName {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

define_option_enum! {
    /// Toolchain release channel.
    Channel ("channel") {
        Stable = "stable",
        Beta = "beta",
        Nightly = "nightly",
    }
}

define_option_enum! {
    /// Optimisation profile.
    Mode ("mode") {
        Debug = "debug",
        Release = "release",
    }
}

define_option_enum! {
    /// Rust edition used to compile the snippet.
    Edition ("edition") {
        E2015 = "2015",
        E2018 = "2018",
        E2021 = "2021",
        E2024 = "2024",
    }
}

define_option_enum! {
    /// Crate type passed to `rustc --crate-type`.
    CrateType ("crate type") {
        Bin = "bin",
        Lib = "lib",
        Dylib = "dylib",
        Rlib = "rlib",
        Staticlib = "staticlib",
        Cdylib = "cdylib",
        ProcMacro = "proc-macro",
    }
}

define_option_enum! {
    /// Assembly syntax for the ASM target.
    AssemblyFlavor ("assembly flavor") {
        Att = "att",
        Intel = "intel",
    }
}

define_option_enum! {
    /// Whether assembly output is filtered down to user code.
    ProcessAssembly ("assembly processing") {
        Filter = "filter",
        Raw = "raw",
    }
}

/// Matches an inner `#![crate_type = "..."]` attribute.
static CRATE_TYPE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"#!\s*\[\s*crate_type\s*=\s*"([^"]+)"\s*\]"#).expect("valid crate_type regex")
});

/// Matches a `fn main` definition.
static MAIN_FN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfn\s+main\s*\(").expect("valid main regex"));

impl CrateType {
    /// Crate type explicitly declared by the source, if any.
    pub fn declared_in(code: &str) -> Option<CrateType> {
        CRATE_TYPE_ATTR
            .captures(code)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Infer the crate type of a source snippet.
    ///
    /// An explicit `#![crate_type]` attribute wins; otherwise code with a
    /// `fn main` is a binary and anything else a library.
    pub fn infer(code: &str) -> CrateType {
        if let Some(declared) = Self::declared_in(code) {
            return declared;
        }
        if MAIN_FN.is_match(code) {
            CrateType::Bin
        } else {
            CrateType::Rlib
        }
    }
}

/// Typed option mapping sent along with the source code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    pub channel: Channel,
    pub mode: Mode,
    pub edition: Edition,
    /// `None` infers the crate type from the source.
    pub crate_type: Option<CrateType>,
    pub assembly_flavor: AssemblyFlavor,
    pub demangle_assembly: bool,
    pub process_assembly: ProcessAssembly,
    pub backtrace: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            channel: Channel::Stable,
            mode: Mode::Debug,
            edition: Edition::E2021,
            crate_type: None,
            assembly_flavor: AssemblyFlavor::Att,
            demangle_assembly: true,
            process_assembly: ProcessAssembly::Filter,
            backtrace: false,
        }
    }
}

impl Options {
    /// Crate type that will actually be compiled for `code`.
    pub fn effective_crate_type(&self, code: &str) -> CrateType {
        self.crate_type.unwrap_or_else(|| CrateType::infer(code))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn option_names_round_trip_through_from_str() {
        assert_eq!("nightly".parse::<Channel>().unwrap(), Channel::Nightly);
        assert_eq!("Release".parse::<Mode>().unwrap(), Mode::Release);
        assert_eq!("2018".parse::<Edition>().unwrap(), Edition::E2018);
        assert_eq!("proc-macro".parse::<CrateType>().unwrap(), CrateType::ProcMacro);
        assert_eq!("intel".parse::<AssemblyFlavor>().unwrap(), AssemblyFlavor::Intel);
        assert_matches!(
            "weekly".parse::<Channel>(),
            Err(CoreError::UnknownName { kind: "channel", .. })
        );
    }

    #[test]
    fn declared_crate_type_wins() {
        let code = "#![crate_type = \"cdylib\"]\nfn main() {}";
        assert_eq!(CrateType::declared_in(code), Some(CrateType::Cdylib));
        assert_eq!(CrateType::infer(code), CrateType::Cdylib);
    }

    #[test]
    fn main_function_means_binary() {
        assert_eq!(
            CrateType::infer("fn main() { println!(\"hi\"); }"),
            CrateType::Bin
        );
        assert_eq!(CrateType::infer("pub fn add(a: i32) -> i32 { a }"), CrateType::Rlib);
    }

    #[test]
    fn unknown_declared_crate_type_is_ignored() {
        let code = "#![crate_type = \"banana\"]\nfn main() {}";
        assert_eq!(CrateType::declared_in(code), None);
        assert_eq!(CrateType::infer(code), CrateType::Bin);
    }

    #[test]
    fn explicit_option_overrides_inference() {
        let options = Options {
            crate_type: Some(CrateType::Lib),
            ..Default::default()
        };
        assert_eq!(options.effective_crate_type("fn main() {}"), CrateType::Lib);
        assert_eq!(
            Options::default().effective_crate_type("fn main() {}"),
            CrateType::Bin
        );
    }

    #[test]
    fn options_serialize_with_wire_names() {
        let json = serde_json::to_value(Options::default()).unwrap();
        assert_eq!(json["channel"], "stable");
        assert_eq!(json["edition"], "2021");
        assert_eq!(json["assemblyFlavor"], "att");
        assert!(json["crateType"].is_null());
    }
}
