use axum::extract::State;
use berth_common::{params::PaginationParams, views::PaginatedList};

use crate::{context::ApiContext, error::ApiError};

pub mod apps;
pub mod certs;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

#[utoipa::path(
    get,
    path = "/health",
    tags = ["health"],
    responses((status = 200, description = "Storage is reachable", body = String))
)]
pub async fn health_check(State(ctx): State<ApiContext>) -> Result<&'static str, ApiError> {
    ctx.db.ping().await?;
    Ok("Healthy")
}

/// Cut one page out of `records`. The `next_token` handed out is the offset
/// of the first record of the following page.
pub(crate) fn paginate<T, V: From<T>>(
    records: Vec<T>,
    params: &PaginationParams,
) -> Result<PaginatedList<V>, ApiError> {
    let offset = match params.next_token.as_deref() {
        Some(token) => token
            .parse::<usize>()
            .map_err(|_| ApiError::bad_request("Invalid next_token"))?,
        None => 0,
    };

    let limit = match params.limit {
        Some(0) => return Err(ApiError::bad_request("limit must be greater than zero")),
        Some(limit) => usize::try_from(limit).unwrap_or(usize::MAX),
        None => usize::MAX,
    };

    let total = records.len();
    let items: Vec<V> = records
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(Into::into)
        .collect();

    let end = offset.saturating_add(items.len());
    let next_token = (end < total).then(|| end.to_string());

    Ok(PaginatedList {
        items,
        next_token,
        limit: params.limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(
        records: Vec<u32>,
        next_token: Option<&str>,
        limit: Option<u64>,
    ) -> Result<PaginatedList<u32>, ApiError> {
        paginate(
            records,
            &PaginationParams {
                next_token: next_token.map(Into::into),
                limit,
            },
        )
    }

    #[test]
    fn no_params_returns_everything() {
        let list = page(vec![1, 2, 3], None, None).unwrap();
        assert_eq!(list.items, vec![1, 2, 3]);
        assert_eq!(list.next_token, None);
    }

    #[test]
    fn pages_follow_next_token() {
        let first = page(vec![1, 2, 3], None, Some(2)).unwrap();
        assert_eq!(first.items, vec![1, 2]);
        assert_eq!(first.next_token.as_deref(), Some("2"));

        let second = page(vec![1, 2, 3], first.next_token.as_deref(), Some(2)).unwrap();
        assert_eq!(second.items, vec![3]);
        assert_eq!(second.next_token, None);
    }

    #[test]
    fn exact_fit_has_no_next_token() {
        let list = page(vec![1, 2], None, Some(2)).unwrap();
        assert_eq!(list.next_token, None);
    }

    #[test]
    fn offset_past_the_end_is_empty() {
        let list = page(vec![1, 2], Some("10"), None).unwrap();
        assert!(list.items.is_empty());
        assert_eq!(list.next_token, None);
    }

    #[test]
    fn malformed_token_and_zero_limit_are_rejected() {
        assert!(matches!(
            page(vec![1], Some("abc"), None),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            page(vec![1], None, Some(0)),
            Err(ApiError::BadRequest(_))
        ));
    }
}
