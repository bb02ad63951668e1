//! Host namespace enumeration seam.

use crate::core::types::{Member, TunedClass};

/// Read-only view of the host's module graph.
///
/// The exporter never inspects host objects directly; it asks the host to
/// enumerate a module and classify each member.
pub trait Namespaces {
    /// True if `module` can be resolved.
    fn contains_module(&self, module: &str) -> bool;

    /// Members of `module` sorted by name. Unknown modules have none.
    fn members(&self, module: &str) -> Vec<Member>;
}

/// First tagged member of `members` whose name matches `class_name` ignoring case.
pub fn find_tuned_class<'a>(members: &'a [Member], class_name: &str) -> Option<&'a TunedClass> {
    let wanted = class_name.to_lowercase();
    members
        .iter()
        .filter(|member| member.name.to_lowercase() == wanted)
        .find_map(Member::as_tuned_class)
}
