use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions, NewQuestion, Question},
    pagination::paginate,
    server::{app::AppState, deserializers::LenientI64, error::ApiError},
};

use super::ApiResponse;

const DIFFICULTY_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default = "first_page")]
    page: usize,
}

fn first_page() -> usize {
    1
}

// `search` wins when both shapes are present, a null `search` falls
// through to creation
#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionsBody {
    Search { search: String },
    Create(CreateQuestion),
}

#[derive(Deserialize)]
struct CreateQuestion {
    question: String,
    answer: String,
    category: LenientI64,
    difficulty: LenientI64,
}

impl TryFrom<CreateQuestion> for NewQuestion {
    type Error = ApiError;

    fn try_from(body: CreateQuestion) -> Result<Self, Self::Error> {
        let question = body.question.trim();
        let answer = body.answer.trim();
        if question.is_empty() || answer.is_empty() {
            return Err(ApiError::Unprocessable(
                "question and answer must not be blank".to_owned(),
            ));
        }
        let difficulty = i64::from(body.difficulty);
        if !DIFFICULTY_RANGE.contains(&difficulty) {
            return Err(ApiError::Unprocessable(format!(
                "difficulty {difficulty} is outside {DIFFICULTY_RANGE:?}"
            )));
        }
        Ok(NewQuestion {
            question: question.to_owned(),
            answer: answer.to_owned(),
            category: body.category.into(),
            difficulty,
        })
    }
}

#[derive(Serialize)]
pub struct QuestionsPage {
    success: bool,
    question: Vec<Question>,
    total_questions: usize,
}

#[derive(Serialize)]
pub struct DeletedQuestion {
    success: bool,
    deleted_question_id: i64,
    total_questions_remaining: i64,
}

#[derive(Serialize)]
pub struct CreatedQuestion {
    success: bool,
    created: i64,
    total_questions: i64,
}

#[derive(Serialize)]
pub struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions_in_search: usize,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum QuestionsPostResponse {
    Created(CreatedQuestion),
    Search(SearchResults),
}

async fn get_questions(
    State(pool): State<SqlitePool>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<QuestionsPage>> {
    let Query(PageQuery { page }) = query?;
    let selection = questions::get_all_questions(&pool).await?;
    let current = paginate(&selection, page);
    if current.is_empty() {
        return Err(ApiError::NotFound(format!(
            "page {page} of {} questions is empty",
            selection.len()
        )));
    }
    Ok(Json(QuestionsPage {
        success: true,
        question: current.to_vec(),
        total_questions: selection.len(),
    }))
}

async fn post_questions(
    State(pool): State<SqlitePool>,
    body: Result<Json<QuestionsBody>, JsonRejection>,
) -> ApiResponse<Json<QuestionsPostResponse>> {
    let Json(body) = body?;
    let response = match body {
        QuestionsBody::Search { search } => {
            QuestionsPostResponse::Search(search_questions(&pool, &search).await?)
        }
        QuestionsBody::Create(create) => {
            QuestionsPostResponse::Created(create_question(&pool, create.try_into()?).await?)
        }
    };
    Ok(Json(response))
}

#[tracing::instrument(skip(pool))]
async fn search_questions(pool: &SqlitePool, term: &str) -> ApiResponse<SearchResults> {
    if term.trim().is_empty() {
        return Err(ApiError::Unprocessable("search term is blank".to_owned()));
    }
    let found = questions::search_questions(pool, term).await?;
    tracing::debug!("Search matched {} questions", found.len());
    Ok(SearchResults {
        success: true,
        total_questions_in_search: found.len(),
        questions: found,
    })
}

async fn create_question(pool: &SqlitePool, question: NewQuestion) -> ApiResponse<CreatedQuestion> {
    let mut tx = pool.begin().await?;
    let id = questions::create_question(&mut *tx, &question).await?;
    let total_questions = questions::count_questions(&mut *tx).await?;
    tx.commit().await?;

    tracing::info!("Created question {id} in category {}", question.category);
    Ok(CreatedQuestion {
        success: true,
        created: id,
        total_questions,
    })
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<DeletedQuestion>> {
    let Path(id) = id?;
    let mut tx = pool.begin().await?;
    if !questions::delete_question(&mut *tx, id).await? {
        return Err(ApiError::Unprocessable(format!(
            "question {id} does not exist"
        )));
    }
    let total_questions_remaining = questions::count_questions(&mut *tx).await?;
    tx.commit().await?;

    tracing::info!("Deleted question {id}");
    Ok(Json(DeletedQuestion {
        success: true,
        deleted_question_id: id,
        total_questions_remaining,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(get_questions).post(post_questions))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> QuestionsBody {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn search_takes_precedence() {
        let parsed = body(r#"{"search": "title", "question": "q", "answer": "a"}"#);
        assert!(matches!(parsed, QuestionsBody::Search { search } if search == "title"));
    }

    #[test]
    fn null_search_falls_back_to_create() {
        let parsed = body(
            r#"{"search": null, "question": "q", "answer": "a", "category": "2", "difficulty": 3}"#,
        );
        let QuestionsBody::Create(create) = parsed else {
            panic!("expected a create body");
        };
        let new = NewQuestion::try_from(create).unwrap();
        assert_eq!(new.category, 2);
        assert_eq!(new.difficulty, 3);
    }

    #[test]
    fn missing_fields_do_not_parse() {
        assert!(serde_json::from_str::<QuestionsBody>(r#"{"question": "q"}"#).is_err());
        assert!(serde_json::from_str::<QuestionsBody>("{}").is_err());
    }

    #[test]
    fn blank_text_and_bad_difficulty_are_rejected() {
        let create = |question: &str, difficulty: i64| CreateQuestion {
            question: question.to_owned(),
            answer: "answer".to_owned(),
            category: LenientI64(1),
            difficulty: LenientI64(difficulty),
        };
        assert!(NewQuestion::try_from(create("   ", 1)).is_err());
        assert!(NewQuestion::try_from(create("question", 0)).is_err());
        assert!(NewQuestion::try_from(create("question", 6)).is_err());
        assert!(NewQuestion::try_from(create("question", 5)).is_ok());
    }
}
