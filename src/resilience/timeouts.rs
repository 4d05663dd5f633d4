//! Deadline enforcement.
//!
//! Every backend call goes through [`with_deadline`]; an expired deadline
//! drops the in-flight future and surfaces as [`RequestError::Timeout`].

use std::future::Future;
use std::time::Duration;
use tokio::time;

use crate::client::RequestError;

pub async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T, RequestError>
where
    F: Future<Output = Result<T, RequestError>>,
{
    match time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(RequestError::Timeout(deadline)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let result: Result<(), _> = with_deadline(Duration::from_millis(50), async {
            time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(RequestError::Timeout(d)) if d == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let result: Result<(), _> = with_deadline(Duration::from_secs(1), async {
            Err(RequestError::InvalidRequest("bad".into()))
        })
        .await;

        assert!(matches!(result, Err(RequestError::InvalidRequest(_))));
    }
}
