//! Response envelope for JSON handlers.

use serde::Serialize;

/// `{ "data": T }` wrapper every JSON endpoint responds with, so clients
/// can rely on one envelope shape across the API.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
