//! Parallel Fan-Out
//!
//! N개의 독립적인 작업을 동시에 실행하고 에러를 집계합니다.

use std::future::Future;

use futures::future::join_all;

use super::error::{DriverError, DriverResult};

/// 인덱스별 작업을 병렬 실행하고 실패를 집계
///
/// 인덱스마다 태스크 하나를 생성하며, 태스크 간 순서는 보장하지 않습니다.
/// 모든 작업이 끝날 때까지 기다린 뒤 실패를 하나의 집계 에러로 묶습니다.
/// `n == 0`이면 아무것도 하지 않고 성공합니다.
pub(crate) async fn for_each_parallel<F, Fut>(n: usize, f: F) -> DriverResult<()>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = DriverResult<()>> + Send + 'static,
{
    let handles: Vec<_> = (0..n).map(|i| tokio::spawn(f(i))).collect();

    let mut errors = Vec::new();
    for joined in join_all(handles).await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => errors.push(err),
            Err(_) => errors.push(DriverError::internal("fan-out worker panicked")),
        }
    }

    match DriverError::combine(errors) {
        None => Ok(()),
        Some(err) => Err(err),
    }
}

/// 인덱스별 작업을 병렬 실행하고 결과를 수집
///
/// 전부 성공하면 인덱스 순서의 결과 목록을 반환합니다. 하나라도 실패하면
/// 집계 에러와 함께 이미 만들어진 결과를 돌려주어 호출자가 정리할 수
/// 있게 합니다.
pub(crate) async fn map_parallel<T, F, Fut>(n: usize, f: F) -> Result<Vec<T>, (DriverError, Vec<T>)>
where
    T: Send + 'static,
    F: Fn(usize) -> Fut,
    Fut: Future<Output = DriverResult<T>> + Send + 'static,
{
    let handles: Vec<_> = (0..n).map(|i| tokio::spawn(f(i))).collect();

    let mut values = Vec::with_capacity(n);
    let mut errors = Vec::new();
    for joined in join_all(handles).await {
        match joined {
            Ok(Ok(value)) => values.push(value),
            Ok(Err(err)) => errors.push(err),
            Err(_) => errors.push(DriverError::internal("fan-out worker panicked")),
        }
    }

    match DriverError::combine(errors) {
        None => Ok(values),
        Some(err) => Err((err, values)),
    }
}

// ============================================================================
// Tests
// ============================================================================
