//! Router Error Types
//!
//! 라우터 에러 정의

use std::fmt;
use std::io;

use thiserror::Error;

// ============================================================================
// DriverError - 라우터 에러
// ============================================================================

/// 라우터 에러
#[derive(Error, Debug)]
pub enum DriverError {
    /// 연결 에러
    #[error("Connection error: {0}")]
    Connection(String),

    /// 타임아웃 에러
    #[error("Timeout: {0}")]
    Timeout(String),

    /// 설정 에러
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 트랜잭션 에러
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// 프리페어드 스테이트먼트 에러
    #[error("Statement error: {0}")]
    Statement(String),

    /// 쿼리 에러
    #[error("Query error: {0}")]
    Query(String),

    /// 결과 행 없음
    #[error("No rows in result set")]
    NoRows,

    /// I/O 에러
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 팬아웃 집계 에러
    #[error("{0}")]
    Multi(MultiError),

    /// 내부 에러
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DriverError {
    /// 연결 에러 생성
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// 타임아웃 에러 생성
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// 설정 에러 생성
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// 트랜잭션 에러 생성
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// 스테이트먼트 에러 생성
    pub fn statement(msg: impl Into<String>) -> Self {
        Self::Statement(msg.into())
    }

    /// 쿼리 에러 생성
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// 내부 에러 생성
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 연결 계층 에러 여부
    ///
    /// 레플리카 읽기 실패 시 프라이머리로 1회 재시도할지 판단하는 기준입니다.
    /// 네트워크 계층 실패만 해당하며, 데이터 계층 에러는 재시도하지 않습니다.
    pub fn is_connection_error(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::TimedOut
                    | io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::HostUnreachable
                    | io::ErrorKind::NetworkUnreachable
            ),
            _ => false,
        }
    }

    /// 클라이언트 에러 여부
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Query(_) | Self::NoRows
        )
    }

    /// 에러 목록을 하나로 결합
    ///
    /// `Multi` 항목은 평탄화되어 중첩되지 않습니다.
    /// 빈 목록은 `None`, 단일 에러는 그대로 반환합니다.
    pub fn combine(errors: Vec<DriverError>) -> Option<DriverError> {
        let mut multi = MultiError::new();
        for err in errors {
            multi.push(err);
        }

        match multi.len() {
            0 => None,
            1 => multi.errors.pop(),
            _ => Some(DriverError::Multi(multi)),
        }
    }
}

// ============================================================================
// Result Type
// ============================================================================

/// 라우터 결과 타입
pub type DriverResult<T> = Result<T, DriverError>;

// ============================================================================
// MultiError - 팬아웃 집계 에러
// ============================================================================

/// 팬아웃 집계 에러
///
/// 물리 핸들별 실패를 하나씩 담습니다. 성공 여부만 필요한 호출자는
/// 집계 자체를 검사하고, 핸들별 진단이 필요한 호출자는 [`MultiError::errors`]를
/// 순회합니다.
#[derive(Debug, Default)]
pub struct MultiError {
    /// 하위 에러 목록
    errors: Vec<DriverError>,
}

impl MultiError {
    /// 빈 집계 에러 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 에러 추가 (`Multi`는 평탄화)
    pub fn push(&mut self, err: DriverError) {
        match err {
            DriverError::Multi(inner) => self.errors.extend(inner.errors),
            other => self.errors.push(other),
        }
    }

    /// 하위 에러 수
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// 비어있는지 여부
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// 하위 에러 목록
    pub fn errors(&self) -> &[DriverError] {
        &self.errors
    }

    /// 하위 에러 목록으로 변환
    pub fn into_errors(self) -> Vec<DriverError> {
        self.errors
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} errors occurred: ", self.errors.len())?;
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for MultiError {}

impl From<MultiError> for DriverError {
    fn from(err: MultiError) -> Self {
        DriverError::Multi(err)
    }
}

// ============================================================================
// Tests
// ============================================================================
