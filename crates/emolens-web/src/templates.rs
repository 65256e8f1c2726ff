use askama::Template;
use emolens_models::Endpoint;

use crate::render::{ResultView, PLACEHOLDER};
use crate::workflow::Notice;

/// One option of the endpoint selector.
pub struct EndpointOption {
    pub slug: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl EndpointOption {
    fn all(selected: Endpoint) -> Vec<Self> {
        Endpoint::ALL
            .iter()
            .map(|endpoint| Self {
                slug: endpoint.as_slug(),
                label: endpoint.label(),
                selected: *endpoint == selected,
            })
            .collect()
    }
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct Page<'a> {
    endpoints: Vec<EndpointOption>,
    notices: &'a [Notice],
    result: Option<&'a ResultView>,
    placeholder: &'static str,
}

impl<'a> Page<'a> {
    pub fn new(selected: Endpoint, notices: &'a [Notice], result: Option<&'a ResultView>) -> Self {
        Self {
            endpoints: EndpointOption::all(selected),
            notices,
            result,
            placeholder: PLACEHOLDER,
        }
    }
}
