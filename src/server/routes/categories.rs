use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        Category, Question,
    },
    server::{app::AppState, error::ApiError},
};

use super::ApiResponse;

#[derive(Serialize)]
pub struct CategoriesList {
    success: bool,
    category: Vec<Category>,
    total_categories: usize,
}

#[derive(Serialize)]
pub struct CategoryQuestions {
    success: bool,
    questions: Vec<Question>,
    category: i64,
    total_questions_in_category: usize,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesList>> {
    let category = categories::get_all_categories(&pool).await?;
    if category.is_empty() {
        return Err(ApiError::NotFound("no categories stored".to_owned()));
    }
    Ok(Json(CategoriesList {
        success: true,
        total_categories: category.len(),
        category,
    }))
}

#[tracing::instrument(skip_all)]
async fn category_questions(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<CategoryQuestions>> {
    let Path(id) = id?;
    match categories::get_category(&pool, id).await {
        Ok(_) => {}
        Err(sqlx::Error::RowNotFound) => {
            return Err(ApiError::NotFound(format!("category {id} does not exist")))
        }
        Err(e) => return Err(e.into()),
    }
    let questions = questions::get_questions_for_category(&pool, id).await?;
    tracing::debug!("Category {id} has {} questions", questions.len());
    Ok(Json(CategoryQuestions {
        success: true,
        total_questions_in_category: questions.len(),
        questions,
        category: id,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(category_questions))
        .with_state(state)
}
