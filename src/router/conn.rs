//! Connection Wrapper
//!
//! 하나의 프라이머리에 고정된 풀 연결을 감쌉니다.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::error::DriverResult;
use super::handle::{Database, DatabaseConn};
use super::stmt::AggregateStmt;
use super::tx::RouterTx;
use super::types::{ExecResult, Row, Rows, TxOptions, Value};

// ============================================================================
// RouterConn - 연결 래퍼
// ============================================================================

/// 연결 래퍼
///
/// 연결은 이미 하나의 물리 핸들에 속하므로 실행 계열은 라우팅 없이
/// 위임합니다. 이 연결에서 시작한 트랜잭션과 prepare는 같은 핸들에
/// 고정됩니다.
pub struct RouterConn {
    /// 연결이 속한 물리 핸들
    source: Arc<dyn Database>,
    /// 드라이버 연결
    conn: Box<dyn DatabaseConn>,
}

impl RouterConn {
    /// 새 연결 래퍼 생성
    pub(crate) fn new(source: Arc<dyn Database>, conn: Box<dyn DatabaseConn>) -> Self {
        Self { source, conn }
    }

    /// 연결에서 쿼리 실행 (쓰기)
    pub async fn exec(&self, query: &str, args: &[Value]) -> DriverResult<ExecResult> {
        self.conn.exec(query, args).await
    }

    /// 연결에서 쿼리 실행 (행 반환)
    pub async fn query(&self, query: &str, args: &[Value]) -> DriverResult<Rows> {
        self.conn.query(query, args).await
    }

    /// 연결에서 쿼리 실행 (최대 한 행)
    pub async fn query_row(&self, query: &str, args: &[Value]) -> Row {
        self.conn.query_row(query, args).await
    }

    /// 이 연결에서 트랜잭션 시작
    ///
    /// 반환된 트랜잭션은 이 연결의 핸들에 고정됩니다.
    pub async fn begin(&self) -> DriverResult<RouterTx> {
        self.begin_with(TxOptions::default()).await
    }

    /// 옵션과 함께 이 연결에서 트랜잭션 시작
    pub async fn begin_with(&self, opts: TxOptions) -> DriverResult<RouterTx> {
        let tx = self.conn.begin(opts).await?;
        Ok(RouterTx::new(self.source.clone(), tx))
    }

    /// 이 연결에서 프리페어드 스테이트먼트 생성
    ///
    /// 연결의 핸들 하나에 쓰기 고정된 집계 스테이트먼트를 반환합니다.
    pub async fn prepare(&self, query: &str) -> DriverResult<AggregateStmt> {
        let stmt = self.conn.prepare(query).await?;
        Ok(AggregateStmt::single(&self.source, stmt))
    }

    /// 연결 상태 확인
    pub async fn ping(&self) -> DriverResult<()> {
        self.conn.ping().await
    }

    /// 드라이버 수준 연결 객체 접근
    pub fn raw(&self) -> &(dyn Any + Send + Sync) {
        self.conn.raw()
    }

    /// 연결을 풀로 반환
    pub async fn close(self) -> DriverResult<()> {
        self.conn.close().await
    }
}

impl fmt::Debug for RouterConn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterConn")
            .field("source", &self.source.driver_name())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
