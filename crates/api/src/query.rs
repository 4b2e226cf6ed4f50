//! Query parameter types for API handlers.

/// Query parameters for `GET /places` (`?name=`).
///
/// `name` filters to places whose name contains it as a substring. Built
/// from the raw key/value pairs so a repeated `name` is not an error: the
/// last occurrence wins. Other keys are ignored.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PlaceListParams {
    pub name: Option<String>,
}

impl From<Vec<(String, String)>> for PlaceListParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        let name = pairs
            .into_iter()
            .filter(|(key, _)| key == "name")
            .map(|(_, value)| value)
            .last();
        Self { name }
    }
}
