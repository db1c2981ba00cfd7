//! TOML language-version gating.

/// Which TOML language version a parse targets.
///
/// Gates dotted keys (§4.2, ≥ 0.5.0), heterogeneous literal arrays
/// (≥ 1.0.0), and raw tabs inside basic strings (≥ 1.0.0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TomlVersion {
    /// TOML 0.4.0: no dotted keys.
    V0_4_0,
    /// TOML 0.5.0: dotted keys, homogeneous arrays only.
    V0_5_0,
    /// TOML 1.0.0: dotted keys, heterogeneous arrays, raw tabs in strings.
    #[default]
    V1_0_0,
}

impl TomlVersion {
    pub(crate) fn supports_dotted_keys(self) -> bool {
        !matches!(self, TomlVersion::V0_4_0)
    }

    pub(crate) fn supports_heterogeneous_arrays(self) -> bool {
        matches!(self, TomlVersion::V1_0_0)
    }

    pub(crate) fn allows_raw_tab_in_string(self) -> bool {
        matches!(self, TomlVersion::V1_0_0)
    }
}
