use std::collections::HashSet;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions, Question},
    quiz::{select_question, ALL_CATEGORIES},
    server::{app::AppState, deserializers::LenientI64},
    telemetry::{QUIZZES_EXHAUSTED, QUIZ_QUESTIONS_SERVED},
};

use super::ApiResponse;

#[derive(Deserialize)]
struct QuizRequest {
    previous_questions: Vec<LenientI64>,
    quiz_category: QuizCategory,
}

#[derive(Deserialize)]
struct QuizCategory {
    id: LenientI64,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Serialize)]
pub struct QuizQuestion {
    success: bool,
    question: Option<Question>,
}

#[tracing::instrument(skip_all)]
async fn play_quiz(
    State(pool): State<SqlitePool>,
    body: Result<Json<QuizRequest>, JsonRejection>,
) -> ApiResponse<Json<QuizQuestion>> {
    let Json(QuizRequest {
        previous_questions,
        quiz_category,
    }) = body?;
    let category = i64::from(quiz_category.id);
    let served: HashSet<i64> = previous_questions.into_iter().map(i64::from).collect();
    tracing::debug!(
        "Quiz request for category {category} ({:?}), {} served",
        quiz_category.kind,
        served.len()
    );

    let candidates = if category == ALL_CATEGORIES {
        questions::get_all_questions(&pool).await?
    } else {
        questions::get_questions_for_category(&pool, category).await?
    };
    let question = select_question(&candidates, &served, &mut rand::thread_rng()).cloned();

    match &question {
        Some(q) => {
            tracing::info!("Serving question {} from category {category}", q.id);
            QUIZ_QUESTIONS_SERVED
                .with_label_values(&[category.to_string().as_str()])
                .inc();
        }
        None => {
            tracing::info!(
                "No unseen questions left in category {category} ({} served)",
                served.len()
            );
            QUIZZES_EXHAUSTED.inc();
        }
    }

    Ok(Json(QuizQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(play_quiz))
        .with_state(state)
}
