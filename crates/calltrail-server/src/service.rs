//! Student operations, each routed through the audit interceptor.

use calltrail_audit::{CallerContext, Interceptor, Invocation, TaggedMethods};
use std::sync::Arc;

use crate::error::AppError;
use crate::student::{Student, StudentRepository, StudentUpdate};

pub const QUERY_BY_SNO: &str = "StudentService::query_by_sno";
pub const LIST_ALL: &str = "StudentService::list_all";
pub const ADD: &str = "StudentService::add";
pub const UPDATE: &str = "StudentService::update";
pub const DELETE: &str = "StudentService::delete";

/// Tags used when the configuration lists no audited methods.
pub fn default_tags() -> TaggedMethods {
    TaggedMethods::new()
        .tag_with(QUERY_BY_SNO, "query student")
        .tag_with(LIST_ALL, "list students")
        .tag_with(ADD, "add student")
        .tag_with(UPDATE, "update student")
        .tag_with(DELETE, "delete student")
}

#[derive(Clone)]
pub struct StudentService {
    repo: Arc<dyn StudentRepository>,
    interceptor: Interceptor,
}

impl StudentService {
    pub fn new(repo: Arc<dyn StudentRepository>, interceptor: Interceptor) -> Self {
        Self { repo, interceptor }
    }

    pub async fn query_by_sno(
        &self,
        caller: &CallerContext,
        sno: &str,
    ) -> Result<Student, AppError> {
        self.interceptor
            .intercept(Invocation::new(QUERY_BY_SNO).param("sno", sno), caller, || async {
                self.repo
                    .find_by_sno(sno)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("student '{}'", sno)))
            })
            .await
    }

    pub async fn list_all(&self, caller: &CallerContext) -> Result<Vec<Student>, AppError> {
        self.interceptor
            .intercept(Invocation::new(LIST_ALL), caller, || self.repo.list())
            .await
    }

    pub async fn add(&self, caller: &CallerContext, student: Student) -> Result<Student, AppError> {
        validate(&student.sno, &student.name)?;

        self.interceptor
            .intercept(
                Invocation::new(ADD).param("student", &student),
                caller,
                || async {
                    self.repo.insert(&student).await?;
                    Ok::<_, AppError>(student.clone())
                },
            )
            .await
    }

    pub async fn update(
        &self,
        caller: &CallerContext,
        sno: &str,
        update: StudentUpdate,
    ) -> Result<Student, AppError> {
        validate(sno, &update.name)?;

        self.interceptor
            .intercept(
                Invocation::new(UPDATE)
                    .param("sno", sno)
                    .param("update", &update),
                caller,
                || async {
                    if self.repo.update(sno, &update).await? == 0 {
                        return Err(AppError::NotFound(format!("student '{}'", sno)));
                    }
                    Ok(Student {
                        sno: sno.to_string(),
                        name: update.name.clone(),
                        sex: update.sex.clone(),
                    })
                },
            )
            .await
    }

    pub async fn delete(&self, caller: &CallerContext, sno: &str) -> Result<(), AppError> {
        self.interceptor
            .intercept(Invocation::new(DELETE).param("sno", sno), caller, || async {
                match self.repo.delete(sno).await? {
                    0 => Err(AppError::NotFound(format!("student '{}'", sno))),
                    _ => Ok(()),
                }
            })
            .await
    }
}

fn validate(sno: &str, name: &str) -> Result<(), AppError> {
    if sno.trim().is_empty() {
        return Err(AppError::InvalidRequest("sno must not be empty".to_string()));
    }
    if name.trim().is_empty() {
        return Err(AppError::InvalidRequest("name must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::MemoryStudentRepository;
    use calltrail_audit::MemorySink;

    fn service(sink: Arc<MemorySink>) -> StudentService {
        let repo = MemoryStudentRepository::with_students([Student {
            sno: "1".to_string(),
            name: "Tom".to_string(),
            sex: "M".to_string(),
        }]);
        StudentService::new(
            Arc::new(repo),
            Interceptor::new(Arc::new(default_tags()), sink),
        )
    }

    #[tokio::test]
    async fn every_operation_is_audited_once() {
        let sink = Arc::new(MemorySink::new());
        let svc = service(sink.clone());
        let caller = CallerContext::new("admin", "127.0.0.1");

        svc.query_by_sno(&caller, "1").await.unwrap();
        svc.list_all(&caller).await.unwrap();
        svc.add(
            &caller,
            Student {
                sno: "2".to_string(),
                name: "Ann".to_string(),
                sex: "F".to_string(),
            },
        )
        .await
        .unwrap();
        svc.update(
            &caller,
            "2",
            StudentUpdate {
                name: "Anna".to_string(),
                sex: "F".to_string(),
            },
        )
        .await
        .unwrap();
        svc.delete(&caller, "2").await.unwrap();

        let operations: Vec<String> = sink
            .records()
            .iter()
            .map(|r| r.operation().to_string())
            .collect();
        assert_eq!(
            operations,
            vec![
                "query student",
                "list students",
                "add student",
                "update student",
                "delete student"
            ]
        );
    }

    #[tokio::test]
    async fn not_found_is_audited_and_returned() {
        let sink = Arc::new(MemorySink::new());
        let svc = service(sink.clone());

        let err = svc
            .query_by_sno(&CallerContext::default(), "99")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.records()[0].params(), r#"{"sno":"99"}"#);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_interception() {
        let sink = Arc::new(MemorySink::new());
        let svc = service(sink.clone());

        let err = svc
            .add(
                &CallerContext::default(),
                Student {
                    sno: " ".to_string(),
                    name: "X".to_string(),
                    sex: "M".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert!(sink.is_empty());
    }
}
