use serde::{Deserialize, Serialize};

use crate::auth::dto::PublicUser;

/// Query parameters for the paginated user list. Missing values fall back to
/// page 1 and 10 per page.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_users: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<PublicUser>,
    pub pagination: Pagination,
}
