//! Route handlers for creating, listing and deleting categories.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    Error,
    auth::Claims,
    models::{Category, CategoryName, DatabaseID},
    state::AppState,
};

/// The data a client sends to create a category.
#[derive(Debug, Deserialize)]
pub struct CategoryData {
    /// The name of the new category.
    pub name: String,
}

/// Handler for creating a category owned by the authenticated user.
///
/// # Errors
/// This function will return an [Error::EmptyCategoryName] if the name is an
/// empty string.
pub async fn create_category(
    State(state): State<AppState>,
    claims: Claims,
    Json(data): Json<CategoryData>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let name = CategoryName::new(&data.name)?;

    let connection = state.db_connection().lock().unwrap();
    let category = Category::insert(name, claims.user_id(), &connection)?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Handler for listing the authenticated user's categories.
pub async fn get_categories(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state.db_connection().lock().unwrap();
    let categories = Category::select_by_user(claims.user_id(), &connection)?;

    Ok(Json(categories))
}

/// Handler for fetching one of the authenticated user's categories.
///
/// # Errors
/// This function will return an [Error::NotFound] if the category does not
/// exist or belongs to another user. The two cases are indistinguishable to
/// the client on purpose.
pub async fn get_category(
    State(state): State<AppState>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
) -> Result<Json<Category>, Error> {
    let connection = state.db_connection().lock().unwrap();
    let category = Category::select(category_id, &connection)?;

    if category.user_id() != claims.user_id() {
        return Err(Error::NotFound);
    }

    Ok(Json(category))
}

/// Handler for deleting one of the authenticated user's categories.
///
/// # Errors
/// This function will return an [Error::NotFound] if the category does not
/// exist or belongs to another user.
pub async fn delete_category(
    State(state): State<AppState>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
) -> Result<StatusCode, Error> {
    let connection = state.db_connection().lock().unwrap();
    Category::delete(category_id, claims.user_id(), &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
