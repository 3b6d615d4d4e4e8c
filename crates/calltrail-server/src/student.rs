//! Student records and their storage.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub sno: String,
    pub name: String,
    pub sex: String,
}

/// Fields that may change on update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentUpdate {
    pub name: String,
    pub sex: String,
}

/// Storage for students.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn find_by_sno(&self, sno: &str) -> Result<Option<Student>, AppError>;

    /// All students ordered by number.
    async fn list(&self) -> Result<Vec<Student>, AppError>;

    async fn insert(&self, student: &Student) -> Result<(), AppError>;

    /// Returns the number of rows changed.
    async fn update(&self, sno: &str, update: &StudentUpdate) -> Result<u64, AppError>;

    /// Returns the number of rows removed.
    async fn delete(&self, sno: &str) -> Result<u64, AppError>;
}

pub struct PgStudentRepository {
    pool: PgPool,
}

impl PgStudentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn student_from_row(row: &PgRow) -> Result<Student, sqlx::Error> {
    Ok(Student {
        sno: row.try_get("sno")?,
        name: row.try_get("name")?,
        sex: row.try_get("sex")?,
    })
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    async fn find_by_sno(&self, sno: &str) -> Result<Option<Student>, AppError> {
        let row = sqlx::query("SELECT sno, name, sex FROM student WHERE sno = $1")
            .bind(sno)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(student_from_row).transpose()?)
    }

    async fn list(&self) -> Result<Vec<Student>, AppError> {
        let rows = sqlx::query("SELECT sno, name, sex FROM student ORDER BY sno")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(student_from_row).collect::<Result<_, _>>()?)
    }

    async fn insert(&self, student: &Student) -> Result<(), AppError> {
        let result = sqlx::query("INSERT INTO student (sno, name, sex) VALUES ($1, $2, $3)")
            .bind(&student.sno)
            .bind(&student.name)
            .bind(&student.sex)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                AppError::Conflict(format!("student '{}' already exists", student.sno)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, sno: &str, update: &StudentUpdate) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE student SET name = $1, sex = $2 WHERE sno = $3")
            .bind(&update.name)
            .bind(&update.sex)
            .bind(sno)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, sno: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM student WHERE sno = $1")
            .bind(sno)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// In-memory repository, used when no database is configured.
#[derive(Default)]
pub struct MemoryStudentRepository {
    students: RwLock<BTreeMap<String, Student>>,
}

impl MemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-filled with `students`.
    pub fn with_students(students: impl IntoIterator<Item = Student>) -> Self {
        let map = students
            .into_iter()
            .map(|s| (s.sno.clone(), s))
            .collect::<BTreeMap<_, _>>();
        Self {
            students: RwLock::new(map),
        }
    }
}

#[async_trait]
impl StudentRepository for MemoryStudentRepository {
    async fn find_by_sno(&self, sno: &str) -> Result<Option<Student>, AppError> {
        Ok(self.students.read().await.get(sno).cloned())
    }

    async fn list(&self) -> Result<Vec<Student>, AppError> {
        Ok(self.students.read().await.values().cloned().collect())
    }

    async fn insert(&self, student: &Student) -> Result<(), AppError> {
        let mut students = self.students.write().await;
        if students.contains_key(&student.sno) {
            return Err(AppError::Conflict(format!(
                "student '{}' already exists",
                student.sno
            )));
        }
        students.insert(student.sno.clone(), student.clone());
        Ok(())
    }

    async fn update(&self, sno: &str, update: &StudentUpdate) -> Result<u64, AppError> {
        let mut students = self.students.write().await;
        match students.get_mut(sno) {
            Some(student) => {
                student.name = update.name.clone();
                student.sex = update.sex.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, sno: &str) -> Result<u64, AppError> {
        Ok(self.students.write().await.remove(sno).map_or(0, |_| 1))
    }
}
