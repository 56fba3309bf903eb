//! Criterion catalog builder.
//!
//! template (by category) → audience overrides (replacements) → renormalise.
//! Renormalisation is always the last step.

use reviewcrew_common::{CriteriaCatalog, Criterion, Result};

use crate::weights;

/// Build the weighted criterion list for a (category, audience) pair.
///
/// Unknown categories fall back to the generic template and unknown
/// audiences leave template weights untouched, so a pair is never rejected
/// by the built-in catalog. A custom catalog whose overrides zero out every
/// weight fails with a configuration error.
pub fn build_criteria(
    catalog: &CriteriaCatalog,
    category: &str,
    audience: &str,
) -> Result<Vec<Criterion>> {
    let mut criteria: Vec<Criterion> = catalog
        .template_for(category)
        .iter()
        .map(|t| t.to_criterion())
        .collect();

    if let Some(overrides) = catalog.overrides_for(audience) {
        for c in criteria.iter_mut() {
            if let Some(&w) = overrides.get(&c.name) {
                c.weight = w;
            }
        }
    }

    weights::renormalise(&mut criteria)?;
    Ok(criteria)
}
