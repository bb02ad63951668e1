//! Attributes injected into `TunableBase` and their construction keywords.

use std::collections::BTreeMap;

use crate::core::attribute::AttributeTable;

/// Fields the exporter reads from tunables that the sealed layout lacks.
pub const TUNABLE_INJECTED_ATTRS: [&str; 12] = [
    "name",
    "description",
    "tuning_filter",
    "group",
    "_deprecated",
    "_category",
    "needs_tuning",
    "export_modes",
    "_allow_empty",
    "_display_name",
    "minlength",
    "maxlength",
];

/// Construction keyword for an injected attribute (`_deprecated` -> `deprecated`).
pub fn init_arg_name(attr: &str) -> &str {
    attr.trim_matches('_')
}

/// Keyword name -> injected attribute name.
pub fn init_arg_map() -> BTreeMap<&'static str, &'static str> {
    TUNABLE_INJECTED_ATTRS
        .into_iter()
        .map(|attr| (init_arg_name(attr), attr))
        .collect()
}

/// Inject every missing attribute into `table`; returns the names injected.
pub fn inject_tunable_attrs(table: &mut AttributeTable) -> Vec<&'static str> {
    TUNABLE_INJECTED_ATTRS
        .into_iter()
        .filter(|attr| table.inject_into(attr))
        .collect()
}
