use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqliteExecutor};

/// A stored trivia question. The serialized form is the external
/// representation returned by every endpoint that lists questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

pub async fn get_all_questions(executor: impl SqliteExecutor<'_>) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn get_questions_for_category(
    executor: impl SqliteExecutor<'_>,
    category_id: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        WHERE questions.category = ?1
        ORDER BY id
        "#,
    )
    .bind(category_id)
    .fetch_all(executor)
    .await
}

/// Case-insensitive substring match over the question text, in id order.
/// Folding happens here rather than in SQLite, whose `LIKE` and `lower()`
/// only fold ASCII.
pub async fn search_questions(
    executor: impl SqliteExecutor<'_>,
    term: &str,
) -> sqlx::Result<Vec<Question>> {
    let needle = term.to_lowercase();
    let mut found = get_all_questions(executor).await?;
    found.retain(|q| q.question.to_lowercase().contains(&needle));
    Ok(found)
}

pub async fn count_questions(executor: impl SqliteExecutor<'_>) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
        .fetch_one(executor)
        .await
}

pub async fn create_question(
    executor: impl SqliteExecutor<'_>,
    question: &NewQuestion,
) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .execute(executor)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Returns `true` when a row was removed.
pub async fn delete_question(executor: impl SqliteExecutor<'_>, id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

async fn insert_question_with_id(
    executor: impl SqliteExecutor<'_>,
    question: &Question,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO questions (id, question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(question.id)
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .execute(executor)
    .await?;
    Ok(())
}

async fn update_question(executor: impl SqliteExecutor<'_>, question: &Question) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE questions SET question = ?1, answer = ?2, category = ?3, difficulty = ?4
        WHERE questions.id = ?5
        "#,
    )
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .bind(question.id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Same reconciliation as [`super::categories::import_categories`].
pub async fn import_questions(
    conn: &mut SqliteConnection,
    questions: Vec<Question>,
) -> sqlx::Result<()> {
    let existing_ids: HashSet<i64> = get_all_questions(&mut *conn)
        .await?
        .iter()
        .map(|q| q.id)
        .collect();
    let new_ids: HashSet<i64> = questions.iter().map(|q| q.id).collect();
    for id in existing_ids.difference(&new_ids) {
        delete_question(&mut *conn, *id).await?;
    }
    for question in questions {
        if existing_ids.contains(&question.id) {
            update_question(&mut *conn, &question).await?;
        } else {
            insert_question_with_id(&mut *conn, &question).await?;
        }
    }
    Ok(())
}
