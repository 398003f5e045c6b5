//! Predicate assembly for each filter request type.
//!
//! Every fragment is optional and driven by one field. Emission order is
//! fixed: identifier, search, status, date range.

use chrono::NaiveDate;

use crate::{
    models::{
        catalog::{CategoryFilter, ProductFilter},
        order::OrderFilter,
        types::{non_blank, PaginateReq, SortReq},
    },
    query::{
        fragment::PredicateFragment,
        source::{categories, orders, products},
    },
    traits::Expression,
};

static DEFAULT_SORT: SortReq = SortReq {
    order_by: String::new(),
    sort: String::new(),
};

/// A list request that can be turned into a statement.
pub trait FilterRequest {
    /// The WHERE fragments, in emission order. Never fails.
    fn predicates(&self) -> Vec<PredicateFragment>;

    fn sort(&self) -> &SortReq {
        &DEFAULT_SORT
    }

    /// `None` reads every matching row.
    fn paginate(&self) -> Option<PaginateReq> {
        None
    }
}

/// Both endpoints as `YYYY-MM-DD`, or nothing.
fn date_range(start: &Option<String>, end: &Option<String>) -> Option<(String, String)> {
    let parse = |value: &str| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok();
    let start = parse(non_blank(start)?)?;
    let end = parse(non_blank(end)?)?;
    Some((
        start.format("%Y-%m-%d").to_string(),
        end.format("%Y-%m-%d").to_string(),
    ))
}

impl FilterRequest for OrderFilter {
    fn predicates(&self) -> Vec<PredicateFragment> {
        let mut fragments = Vec::new();

        if let Some(id) = non_blank(&self.id) {
            fragments.push(PredicateFragment::new(orders::ID.eq(id)));
        }

        if let Some(term) = non_blank(&self.search) {
            fragments.push(PredicateFragment::new(
                orders::USER_ID
                    .ilike(term)
                    .or(orders::ADDRESS.ilike(term))
                    .or(orders::CONTACT.ilike(term)),
            ));
        }

        if let Some(status) = non_blank(&self.status) {
            fragments.push(PredicateFragment::new(
                orders::STATUS.lower().eq(status.to_lowercase()),
            ));
        }

        if let Some((start, end)) = date_range(&self.start_date, &self.end_date) {
            fragments.push(PredicateFragment::new(
                orders::CREATED_AT.date().between(start, end),
            ));
        }

        fragments
    }

    fn sort(&self) -> &SortReq {
        &self.sort
    }

    fn paginate(&self) -> Option<PaginateReq> {
        Some(self.paginate)
    }
}

impl FilterRequest for ProductFilter {
    fn predicates(&self) -> Vec<PredicateFragment> {
        let mut fragments = Vec::new();

        if let Some(id) = non_blank(&self.id) {
            fragments.push(PredicateFragment::new(products::ID.eq(id)));
        }

        if let Some(term) = non_blank(&self.search) {
            fragments.push(PredicateFragment::new(
                products::TITLE
                    .ilike(term)
                    .or(products::DESCRIPTION.ilike(term)),
            ));
        }

        fragments
    }

    fn sort(&self) -> &SortReq {
        &self.sort
    }

    fn paginate(&self) -> Option<PaginateReq> {
        Some(self.paginate)
    }
}

impl FilterRequest for CategoryFilter {
    fn predicates(&self) -> Vec<PredicateFragment> {
        non_blank(&self.title)
            .map(|title| PredicateFragment::new(categories::TITLE.ilike(title)))
            .into_iter()
            .collect()
    }
}
