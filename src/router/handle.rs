//! Physical Database Handles
//!
//! 라우터가 다루는 외부 드라이버의 계약을 정의합니다.
//!
//! 라우터는 와이어 프로토콜을 소유하지 않습니다. 실제 드라이버는 이
//! 트레이트들을 구현하는 어댑터로 연결되며, 라우터는 `Arc<dyn Database>`
//! 핸들 위에서만 동작합니다.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::error::DriverResult;
use super::types::{DatabaseStats, ExecResult, Row, Rows, TxOptions, Value};

// ============================================================================
// Database - 물리 데이터베이스 핸들
// ============================================================================

/// 물리 데이터베이스 핸들
///
/// 표준 SQL 핸들 계약을 따릅니다. 구현은 자체 연결 풀을 가지며 동시
/// 호출에 안전해야 합니다. 전송 계층 실패는
/// [`DriverError::Connection`](crate::router::DriverError::Connection),
/// [`DriverError::Timeout`](crate::router::DriverError::Timeout) 또는 네트워크
/// 계열 [`DriverError::Io`](crate::router::DriverError::Io)로 매핑해야
/// 레플리카 폴백 판정에 참여합니다.
#[async_trait]
pub trait Database: Send + Sync {
    /// 드라이버 이름
    fn driver_name(&self) -> &str;

    /// 행을 반환하지 않는 쿼리 실행
    async fn exec(&self, query: &str, args: &[Value]) -> DriverResult<ExecResult>;

    /// 행을 반환하는 쿼리 실행
    async fn query(&self, query: &str, args: &[Value]) -> DriverResult<Rows>;

    /// 최대 한 행을 반환하는 쿼리 실행
    ///
    /// 에러는 반환된 행에 실려 지연 관찰됩니다.
    async fn query_row(&self, query: &str, args: &[Value]) -> Row;

    /// 트랜잭션 시작
    async fn begin(&self, opts: TxOptions) -> DriverResult<Box<dyn DatabaseTx>>;

    /// 프리페어드 스테이트먼트 생성
    async fn prepare(&self, query: &str) -> DriverResult<Arc<dyn DatabaseStmt>>;

    /// 풀에서 단일 연결 획득
    async fn conn(&self) -> DriverResult<Box<dyn DatabaseConn>>;

    /// 연결 상태 확인
    async fn ping(&self) -> DriverResult<()>;

    /// 핸들 종료
    async fn close(&self) -> DriverResult<()>;

    /// 유휴 연결 최대 수 설정
    fn set_max_idle_conns(&self, n: usize);

    /// 열린 연결 최대 수 설정
    fn set_max_open_conns(&self, n: usize);

    /// 연결 최대 수명 설정
    fn set_conn_max_lifetime(&self, d: Duration);

    /// 연결 최대 유휴 시간 설정
    fn set_conn_max_idle_time(&self, d: Duration);

    /// 연결 풀 통계
    fn stats(&self) -> DatabaseStats;
}

// ============================================================================
// DatabaseStmt - 드라이버 프리페어드 스테이트먼트
// ============================================================================

/// 드라이버 프리페어드 스테이트먼트
///
/// 스테이트먼트는 자신을 준비한 핸들에서만 실행되어야 합니다. 그 보장은
/// 라우터의 집계 스테이트먼트가 담당합니다.
#[async_trait]
pub trait DatabaseStmt: Send + Sync {
    /// 스테이트먼트 실행 (쓰기)
    async fn exec(&self, args: &[Value]) -> DriverResult<ExecResult>;

    /// 스테이트먼트 실행 (행 반환)
    async fn query(&self, args: &[Value]) -> DriverResult<Rows>;

    /// 스테이트먼트 실행 (최대 한 행)
    async fn query_row(&self, args: &[Value]) -> Row;

    /// 스테이트먼트 종료
    async fn close(&self) -> DriverResult<()>;
}

// ============================================================================
// DatabaseTx - 드라이버 트랜잭션
// ============================================================================

/// 드라이버 트랜잭션
///
/// 이미 하나의 물리 핸들에 고정되어 있습니다. 종료 후 호출은 드라이버의
/// 트랜잭션 종료 에러로 실패해야 합니다.
#[async_trait]
pub trait DatabaseTx: Send + Sync {
    /// 커밋
    async fn commit(&self) -> DriverResult<()>;

    /// 롤백
    async fn rollback(&self) -> DriverResult<()>;

    /// 트랜잭션 내 쿼리 실행 (쓰기)
    async fn exec(&self, query: &str, args: &[Value]) -> DriverResult<ExecResult>;

    /// 트랜잭션 내 쿼리 실행 (행 반환)
    async fn query(&self, query: &str, args: &[Value]) -> DriverResult<Rows>;

    /// 트랜잭션 내 쿼리 실행 (최대 한 행)
    async fn query_row(&self, query: &str, args: &[Value]) -> Row;

    /// 트랜잭션 범위 프리페어드 스테이트먼트 생성
    async fn prepare(&self, query: &str) -> DriverResult<Arc<dyn DatabaseStmt>>;

    /// 기존 스테이트먼트를 트랜잭션 범위로 재바인딩
    async fn stmt(&self, stmt: Arc<dyn DatabaseStmt>) -> DriverResult<Arc<dyn DatabaseStmt>>;
}

// ============================================================================
// DatabaseConn - 드라이버 단일 연결
// ============================================================================

/// 풀에서 꺼낸 단일 연결
#[async_trait]
pub trait DatabaseConn: Send + Sync {
    /// 연결에서 쿼리 실행 (쓰기)
    async fn exec(&self, query: &str, args: &[Value]) -> DriverResult<ExecResult>;

    /// 연결에서 쿼리 실행 (행 반환)
    async fn query(&self, query: &str, args: &[Value]) -> DriverResult<Rows>;

    /// 연결에서 쿼리 실행 (최대 한 행)
    async fn query_row(&self, query: &str, args: &[Value]) -> Row;

    /// 이 연결에서 트랜잭션 시작
    async fn begin(&self, opts: TxOptions) -> DriverResult<Box<dyn DatabaseTx>>;

    /// 이 연결에서 프리페어드 스테이트먼트 생성
    async fn prepare(&self, query: &str) -> DriverResult<Arc<dyn DatabaseStmt>>;

    /// 연결 상태 확인
    async fn ping(&self) -> DriverResult<()>;

    /// 드라이버 수준 연결 객체 접근
    fn raw(&self) -> &(dyn Any + Send + Sync);

    /// 연결을 풀로 반환
    async fn close(&self) -> DriverResult<()>;
}

// ============================================================================
// Connector - 문자열 기반 오픈
// ============================================================================

/// DSN 문자열로 물리 핸들을 여는 커넥터
#[async_trait]
pub trait Connector: Send + Sync {
    /// 드라이버 이름
    fn driver_name(&self) -> &str;

    /// DSN으로 핸들 오픈
    async fn connect(&self, dsn: &str) -> DriverResult<Arc<dyn Database>>;
}

// ============================================================================
// HandleId - 핸들 식별자
// ============================================================================

/// 물리 핸들 식별자
///
/// `Arc` 할당 주소를 키로 씁니다. 리졸버 수명 동안 핸들은 재생성되지
/// 않으므로 안정적입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(usize);

impl HandleId {
    /// 핸들의 식별자 계산
    pub fn of(handle: &Arc<dyn Database>) -> Self {
        Self(Arc::as_ptr(handle) as *const () as usize)
    }
}

// ============================================================================
// Tests
// ============================================================================
