use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqliteExecutor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

pub async fn get_all_categories(executor: impl SqliteExecutor<'_>) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, "type" FROM categories ORDER BY id
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn get_category(executor: impl SqliteExecutor<'_>, id: i64) -> sqlx::Result<Category> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, "type" FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .fetch_one(executor)
    .await
}

pub async fn create_category(
    executor: impl SqliteExecutor<'_>,
    id: Option<i64>,
    kind: &str,
) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO categories (id, "type") VALUES (?1, ?2)
        "#,
    )
    .bind(id)
    .bind(kind)
    .execute(executor)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn update_category(executor: impl SqliteExecutor<'_>, category: &Category) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE categories SET "type" = ?1 WHERE categories.id = ?2
        "#,
    )
    .bind(&category.kind)
    .bind(category.id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn delete_category(executor: impl SqliteExecutor<'_>, id: i64) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        DELETE FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Makes the categories table match `categories`: rows missing from the
/// input are deleted, known ids are updated and the rest are inserted
/// with their ids preserved.
pub async fn import_categories(
    conn: &mut SqliteConnection,
    categories: Vec<Category>,
) -> sqlx::Result<()> {
    let existing_ids: HashSet<i64> = get_all_categories(&mut *conn)
        .await?
        .iter()
        .map(|c| c.id)
        .collect();
    let new_ids: HashSet<i64> = categories.iter().map(|c| c.id).collect();
    for id in existing_ids.difference(&new_ids) {
        delete_category(&mut *conn, *id).await?;
    }
    for category in categories {
        if existing_ids.contains(&category.id) {
            update_category(&mut *conn, &category).await?;
        } else {
            create_category(&mut *conn, Some(category.id), &category.kind).await?;
        }
    }
    Ok(())
}
