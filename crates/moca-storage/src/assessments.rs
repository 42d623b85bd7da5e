use moca_core::BoxFuture;
use moca_core::api_paths;
use moca_core::models::answer::AnswerPackage;
use moca_core::models::assessment::{Submission, SubmissionReceipt, TestId, TestResult};
use tracing::info;

use crate::client::HttpStore;
use crate::error::StorageError;

/// Persists submitted answer packages and reports reviewer scores.
pub trait AssessmentStore: Send + Sync {
    /// `POST /test/`. Returns the store-assigned identifier.
    fn submit<'a>(&'a self, package: &'a AnswerPackage)
    -> BoxFuture<'a, Result<TestId, StorageError>>;

    /// `GET /test/{id}/`.
    fn fetch_result<'a>(&'a self, id: &'a TestId) -> BoxFuture<'a, Result<TestResult, StorageError>>;
}

impl AssessmentStore for HttpStore {
    fn submit<'a>(
        &'a self,
        package: &'a AnswerPackage,
    ) -> BoxFuture<'a, Result<TestId, StorageError>> {
        Box::pin(async move {
            let body = serde_json::to_value(Submission {
                answers_package: package,
            })?;
            let url = self.url(api_paths::SUBMIT_TEST);
            let agent = self.agent();

            info!(url = %url, answers = package.len(), "submitting answer package");

            let receipt = tokio::task::spawn_blocking(move || {
                agent
                    .post(url.as_str())
                    .send_json(&body)?
                    .body_mut()
                    .read_json::<SubmissionReceipt>()
            })
            .await?
            .map_err(|e| StorageError::from_ureq("submit test", e))?;

            info!(test_id = %receipt.id, "answer package stored");
            Ok(receipt.id)
        })
    }

    fn fetch_result<'a>(&'a self, id: &'a TestId) -> BoxFuture<'a, Result<TestResult, StorageError>> {
        Box::pin(async move {
            let url = self.url(&api_paths::test(id));
            let agent = self.agent();

            let result = tokio::task::spawn_blocking(move || {
                agent
                    .get(url.as_str())
                    .call()?
                    .body_mut()
                    .read_json::<TestResult>()
            })
            .await?
            .map_err(|e| match e {
                ureq::Error::StatusCode(404) => StorageError::NotFound { id: id.to_string() },
                other => StorageError::from_ureq("fetch test result", other),
            })?;

            info!(test_id = %id, reviewed = result.points.is_some(), "fetched test result");
            Ok(result)
        })
    }
}
