use serde::Deserialize;
use tally_database_types::ConnectionQueryArgs;

/// Query string of a REST list request, e.g.
/// `?first=10&after=Mw==&orderBy=name:desc&parentId=2`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub first: Option<u64>,
    pub last: Option<u64>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub order_by: Option<String>,
    pub parent_id: Option<i64>,
}

impl ListParams {
    pub fn into_parts(self) -> (ConnectionQueryArgs, Option<i64>) {
        let args = ConnectionQueryArgs {
            first: self.first,
            last: self.last,
            after: self.after,
            before: self.before,
            order_by: self.order_by,
        };
        (args, self.parent_id)
    }
}
