//! Transaction Wrapper
//!
//! 하나의 프라이머리에 고정된 드라이버 트랜잭션을 감쌉니다.

use std::fmt;
use std::sync::Arc;

use super::error::{DriverError, DriverResult};
use super::handle::{Database, DatabaseTx};
use super::stmt::AggregateStmt;
use super::types::{ExecResult, Row, Rows, Value};

// ============================================================================
// RouterTx - 트랜잭션 래퍼
// ============================================================================

/// 트랜잭션 래퍼
///
/// 드라이버 트랜잭션이 이미 물리 핸들 친화성을 보장하므로 실행 계열은
/// 라우팅 없이 위임합니다. 래퍼의 역할은 prepare와 재바인딩이 집계
/// 스테이트먼트를 돌려주게 하는 것입니다. 커밋과 롤백은 래퍼를 소비하며,
/// 이후 사용은 타입 수준에서 불가능합니다.
pub struct RouterTx {
    /// 트랜잭션이 시작된 물리 핸들
    source: Arc<dyn Database>,
    /// 드라이버 트랜잭션
    tx: Box<dyn DatabaseTx>,
}

impl RouterTx {
    /// 새 트랜잭션 래퍼 생성
    pub(crate) fn new(source: Arc<dyn Database>, tx: Box<dyn DatabaseTx>) -> Self {
        Self { source, tx }
    }

    /// 커밋
    pub async fn commit(self) -> DriverResult<()> {
        self.tx.commit().await
    }

    /// 롤백
    pub async fn rollback(self) -> DriverResult<()> {
        self.tx.rollback().await
    }

    /// 트랜잭션 내 쿼리 실행 (쓰기)
    pub async fn exec(&self, query: &str, args: &[Value]) -> DriverResult<ExecResult> {
        self.tx.exec(query, args).await
    }

    /// 트랜잭션 내 쿼리 실행 (행 반환)
    pub async fn query(&self, query: &str, args: &[Value]) -> DriverResult<Rows> {
        self.tx.query(query, args).await
    }

    /// 트랜잭션 내 쿼리 실행 (최대 한 행)
    pub async fn query_row(&self, query: &str, args: &[Value]) -> Row {
        self.tx.query_row(query, args).await
    }

    /// 트랜잭션 범위 프리페어드 스테이트먼트 생성
    ///
    /// 트랜잭션의 핸들 하나에 쓰기 고정된 집계 스테이트먼트를 반환합니다.
    pub async fn prepare(&self, query: &str) -> DriverResult<AggregateStmt> {
        let stmt = self.tx.prepare(query).await?;
        Ok(AggregateStmt::single(&self.source, stmt))
    }

    /// 기존 집계 스테이트먼트를 이 트랜잭션으로 재바인딩
    ///
    /// 집계에서 이 트랜잭션의 핸들에 대응하는 하위 스테이트먼트를 찾아
    /// 드라이버에게 트랜잭션 범위 스테이트먼트를 요청합니다.
    pub async fn stmt(&self, stmt: &AggregateStmt) -> DriverResult<AggregateStmt> {
        let target = stmt
            .statement_for(&self.source)
            .ok_or_else(|| DriverError::statement("aggregate statement has no underlying statements"))?
            .clone();

        let bound = self.tx.stmt(target).await?;
        Ok(AggregateStmt::single(&self.source, bound))
    }
}

impl fmt::Debug for RouterTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterTx")
            .field("source", &self.source.driver_name())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
