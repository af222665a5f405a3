//! CSV import and export of the trivia tables.

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::queries::{categories, questions};
use crate::db::{Category, Question};

const CATEGORIES_FILE: &str = "categories.csv";
const QUESTIONS_FILE: &str = "questions.csv";

fn write_to(path: &Path, data: &[impl Serialize]) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record.with_context(|| format!("Bad record in {}", path.display()))?;
        out.push(record);
    }
    Ok(out)
}

pub async fn export_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories = categories::get_all_categories(pool).await?;
    let questions = questions::get_all_questions(pool).await?;
    if !dir.exists() {
        std::fs::create_dir_all(dir)?
    }
    write_to(&dir.join(CATEGORIES_FILE), &categories)?;
    write_to(&dir.join(QUESTIONS_FILE), &questions)?;
    tracing::info!(
        "Exported {} categories and {} questions to {}",
        categories.len(),
        questions.len(),
        dir.display()
    );
    Ok(())
}

/// Replaces the stored categories and questions with the contents of
/// `dir`. Everything happens in one transaction with foreign key checks
/// deferred to commit, so the files only have to be consistent as a whole.
pub async fn import_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_from(&dir.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_from(&dir.join(QUESTIONS_FILE))?;
    let (category_count, question_count) = (categories.len(), questions.len());

    let mut tx = pool.begin().await?;
    sqlx::query("PRAGMA defer_foreign_keys = ON")
        .execute(&mut *tx)
        .await?;
    categories::import_categories(&mut *tx, categories).await?;
    questions::import_questions(&mut *tx, questions).await?;
    tx.commit()
        .await
        .context("Imported questions reference unknown categories")?;

    tracing::info!("Imported {category_count} categories and {question_count} questions");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::run_migrations;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn seeded_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn export_then_import_into_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let source = seeded_pool().await;
        export_data(&source, dir.path()).await.unwrap();

        let target = seeded_pool().await;
        sqlx::query("DELETE FROM questions")
            .execute(&target)
            .await
            .unwrap();
        import_data(&target, dir.path()).await.unwrap();

        assert_eq!(
            questions::get_all_questions(&target).await.unwrap(),
            questions::get_all_questions(&source).await.unwrap()
        );
    }

    #[tokio::test]
    async fn import_reconciles_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let categories = vec![Category {
            id: 1,
            kind: "Science".to_owned(),
        }];
        let questions = vec![Question {
            id: 20,
            question: "What is the heaviest organ in the human body?".to_owned(),
            answer: "Skin".to_owned(),
            category: 1,
            difficulty: 2,
        }];
        write_to(&dir.path().join(CATEGORIES_FILE), &categories).unwrap();
        write_to(&dir.path().join(QUESTIONS_FILE), &questions).unwrap();

        let pool = seeded_pool().await;
        import_data(&pool, dir.path()).await.unwrap();

        assert_eq!(categories::get_all_categories(&pool).await.unwrap(), categories);
        assert_eq!(questions::get_all_questions(&pool).await.unwrap(), questions);
    }

    #[tokio::test]
    async fn dangling_category_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let categories = vec![Category {
            id: 1,
            kind: "Science".to_owned(),
        }];
        let questions = vec![Question {
            id: 1,
            question: "Orphan?".to_owned(),
            answer: "Yes".to_owned(),
            category: 99,
            difficulty: 1,
        }];
        write_to(&dir.path().join(CATEGORIES_FILE), &categories).unwrap();
        write_to(&dir.path().join(QUESTIONS_FILE), &questions).unwrap();

        let pool = seeded_pool().await;
        assert!(import_data(&pool, dir.path()).await.is_err());
        assert_eq!(questions::count_questions(&pool).await.unwrap(), 19);
    }
}
