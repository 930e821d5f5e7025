use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};

use shared_models::identity::CallerIdentity;

/// Turns an optional bearer header into the caller identity forwarded to the
/// admin API. The token is passed through untouched; a missing or blank
/// token yields `None` and is rejected by the operation that needs it.
pub fn caller_identity(
    auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> Option<CallerIdentity> {
    auth.and_then(|TypedHeader(auth)| CallerIdentity::new(auth.token()))
}
