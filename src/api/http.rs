// Shared HTTP client and client-side request deadlines.
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Runs `request` and abandons it once `deadline` passes. Dropping the
/// future aborts the in-flight fetch.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn with_timeout<T, F>(deadline: Duration, request: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, request).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(deadline)),
    }
}

#[cfg(target_arch = "wasm32")]
pub(crate) async fn with_timeout<T, F>(deadline: Duration, request: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    use futures_util::future::{select, Either};

    let millis = u32::try_from(deadline.as_millis()).unwrap_or(u32::MAX);
    let timer = gloo_timers::future::TimeoutFuture::new(millis);
    futures_util::pin_mut!(request, timer);
    match select(request, timer).await {
        Either::Left((result, _)) => result,
        Either::Right(_) => Err(Error::Timeout(deadline)),
    }
}

/// GETs `url` and decodes a JSON body, failing on non-success statuses.
pub(crate) async fn get_json<T: DeserializeOwned>(
    url: &str,
    user_agent: Option<&str>,
    deadline: Duration,
) -> Result<T> {
    with_timeout(deadline, async {
        let mut request = HTTP_CLIENT.get(url);
        if let Some(agent) = user_agent {
            request = request.header(reqwest::header::USER_AGENT, agent);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice::<T>(&bytes)?)
    })
    .await
}

/// GETs `url` and only reports whether the server answered with success.
pub(crate) async fn probe(url: &str, user_agent: Option<&str>, deadline: Duration) -> Result<()> {
    with_timeout(deadline, async {
        let mut request = HTTP_CLIENT.get(url);
        if let Some(agent) = user_agent {
            request = request.header(reqwest::header::USER_AGENT, agent);
        }
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Status(status.as_u16()))
        }
    })
    .await
}
