//! Directory ordering and search matching.
//!
//! Both are defined here, over plain [`Supplier`] values, so every backend
//! produces the same order regardless of its collation rules.

use crate::supplier::Supplier;

/// Normalise a raw search term. Returns `None` when the term is blank, in
/// which case a search is the full listing.
pub fn search_term(raw: &str) -> Option<String> {
  let trimmed = raw.trim();
  (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// Case-insensitive substring match on company name or TIN. `term` must
/// already be lowercased by [`search_term`].
pub fn matches(supplier: &Supplier, term: &str) -> bool {
  supplier.company_name.to_lowercase().contains(term)
    || supplier.tin.to_lowercase().contains(term)
}

/// Company name ascending, case-insensitively, ties broken by id.
pub fn sort(suppliers: &mut [Supplier]) {
  suppliers
    .sort_by_cached_key(|s| (s.company_name.to_lowercase(), s.supplier_id));
}

/// Apply an optional search term and the directory order.
pub fn filter_sorted(mut suppliers: Vec<Supplier>, raw_term: &str) -> Vec<Supplier> {
  if let Some(term) = search_term(raw_term) {
    suppliers.retain(|s| matches(s, &term));
  }
  sort(&mut suppliers);
  suppliers
}
