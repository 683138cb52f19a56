//! Askama templates for the HTML pages.

use askama::Template;

use crate::models::states::State;

/// The states listing page. `states` is rendered in the order given.
#[derive(Template)]
#[template(path = "7-states_list.html")]
pub struct StatesListTemplate<'a> {
    pub states: &'a [State],
}
