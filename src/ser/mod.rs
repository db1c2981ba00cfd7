//! Serializers (ambient addition; the teacher crate has none).
//!
//! Both walk the `Table`/`Value` tree directly with `write!`/`format!`,
//! matching the teacher's preference (seen in `datetime.rs`'s `Display`
//! impls) for explicit, allocation-based formatting over a templating
//! dependency.

pub(crate) mod json;
pub(crate) mod toml;
