//! Aggregate Prepared Statement
//!
//! 물리 핸들마다 하나씩 준비된 스테이트먼트를 묶어 라우팅합니다.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::balancer::Selector;
use super::error::{DriverError, DriverResult};
use super::fanout::for_each_parallel;
use super::handle::{Database, DatabaseStmt, HandleId};
use super::query::QueryType;
use super::types::{ExecResult, Row, Rows, Value};

// ============================================================================
// AggregateStmt - 집계 스테이트먼트
// ============================================================================

/// 집계 프리페어드 스테이트먼트
///
/// 쓰기 실행은 항상 프라이머리 쪽 스테이트먼트로, 읽기 실행은 레플리카
/// 쪽으로 라우팅됩니다. 트랜잭션이나 단일 연결에서 준비된 스테이트먼트는
/// 쓰기 고정되어 자신의 핸들 하나로만 라우팅됩니다.
pub struct AggregateStmt {
    /// 스테이트먼트 선택기
    selector: Arc<Selector>,
    /// 프라이머리 쪽 스테이트먼트
    primary_stmts: Vec<Arc<dyn DatabaseStmt>>,
    /// 레플리카 쪽 스테이트먼트
    replica_stmts: Vec<Arc<dyn DatabaseStmt>>,
    /// 핸들 식별자 → 스테이트먼트 매핑
    by_handle: HashMap<HandleId, Arc<dyn DatabaseStmt>>,
    /// 쓰기 고정 여부
    write_pinned: bool,
    /// 준비 시점의 분류기 판정
    query_type: QueryType,
}

impl AggregateStmt {
    /// 팬아웃 준비 결과로 집계 스테이트먼트 생성
    pub(crate) fn new(
        selector: Arc<Selector>,
        primary_stmts: Vec<Arc<dyn DatabaseStmt>>,
        replica_stmts: Vec<Arc<dyn DatabaseStmt>>,
        by_handle: HashMap<HandleId, Arc<dyn DatabaseStmt>>,
        query_type: QueryType,
    ) -> Self {
        Self {
            selector,
            primary_stmts,
            replica_stmts,
            by_handle,
            write_pinned: false,
            query_type,
        }
    }

    /// 단일 핸들 집계 스테이트먼트 생성
    ///
    /// 트랜잭션과 단일 연결의 prepare가 사용합니다. 쓰기 고정되며 모든
    /// 실행이 이 하나의 스테이트먼트로 향합니다.
    pub(crate) fn single(handle: &Arc<dyn Database>, stmt: Arc<dyn DatabaseStmt>) -> Self {
        let mut by_handle = HashMap::with_capacity(1);
        by_handle.insert(HandleId::of(handle), stmt.clone());

        Self {
            selector: Arc::new(Selector::round_robin()),
            primary_stmts: vec![stmt],
            replica_stmts: Vec::new(),
            by_handle,
            write_pinned: true,
            query_type: QueryType::Unknown,
        }
    }

    /// 쓰기 고정 여부
    pub fn is_write_pinned(&self) -> bool {
        self.write_pinned
    }

    /// 준비 시점의 분류기 판정
    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    /// 프라이머리 쪽 스테이트먼트 수
    pub fn primary_count(&self) -> usize {
        self.primary_stmts.len()
    }

    /// 레플리카 쪽 스테이트먼트 수
    pub fn replica_count(&self) -> usize {
        self.replica_stmts.len()
    }

    /// 스테이트먼트 실행 (쓰기)
    ///
    /// 항상 프라이머리 쪽 스테이트먼트를 사용합니다.
    pub async fn exec(&self, args: &[Value]) -> DriverResult<ExecResult> {
        self.rw_stmt()?.exec(args).await
    }

    /// 스테이트먼트 실행 (행 반환)
    ///
    /// 레플리카 쪽 실행이 연결 계층 에러로 실패하면 프라이머리 쪽으로
    /// 1회 재시도합니다.
    pub async fn query(&self, args: &[Value]) -> DriverResult<Rows> {
        if self.routes_to_primary() {
            return self.rw_stmt()?.query(args).await;
        }

        match self.ro_stmt()?.query(args).await {
            Err(err) if err.is_connection_error() => {
                tracing::warn!(
                    error = %err,
                    "read statement failed with a connection error, retrying on a primary"
                );
                self.rw_stmt()?.query(args).await
            }
            other => other,
        }
    }

    /// 스테이트먼트 실행 (최대 한 행)
    ///
    /// 행에 실린 지연 에러가 연결 계층 에러면 프라이머리 쪽으로 1회
    /// 재시도합니다.
    pub async fn query_row(&self, args: &[Value]) -> Row {
        if self.routes_to_primary() {
            return match self.rw_stmt() {
                Ok(stmt) => stmt.query_row(args).await,
                Err(err) => Row::from_error(err),
            };
        }

        let stmt = match self.ro_stmt() {
            Ok(stmt) => stmt,
            Err(err) => return Row::from_error(err),
        };

        let row = stmt.query_row(args).await;
        let retry = match row.error() {
            Some(err) if err.is_connection_error() => {
                tracing::warn!(
                    error = %err,
                    "read statement failed with a connection error, retrying on a primary"
                );
                true
            }
            _ => false,
        };

        if !retry {
            return row;
        }
        match self.rw_stmt() {
            Ok(stmt) => stmt.query_row(args).await,
            Err(err) => Row::from_error(err),
        }
    }

    /// 스테이트먼트 종료
    ///
    /// 모든 하위 스테이트먼트를 동시에 닫고 실패를 집계합니다.
    pub async fn close(&self) -> DriverResult<()> {
        let primaries = self.primary_stmts.clone();
        let err_primaries = for_each_parallel(primaries.len(), move |i| {
            let stmt = primaries[i].clone();
            async move { stmt.close().await }
        })
        .await
        .err();

        let replicas = self.replica_stmts.clone();
        let err_replicas = for_each_parallel(replicas.len(), move |i| {
            let stmt = replicas[i].clone();
            async move { stmt.close().await }
        })
        .await
        .err();

        match DriverError::combine(err_primaries.into_iter().chain(err_replicas).collect()) {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// 물리 핸들에 대응하는 하위 스테이트먼트 조회
    ///
    /// 트랜잭션 재바인딩이 사용합니다. 매핑에 없으면 프라이머리 쪽 첫
    /// 스테이트먼트를 돌려주어, 이후 드라이버 호출이 불일치를 명확한
    /// 에러로 드러내게 합니다.
    pub fn statement_for(&self, handle: &Arc<dyn Database>) -> Option<&Arc<dyn DatabaseStmt>> {
        self.by_handle
            .get(&HandleId::of(handle))
            .or_else(|| self.primary_stmts.first())
            .or_else(|| self.replica_stmts.first())
    }

    /// 프라이머리로만 라우팅해야 하는지 여부
    fn routes_to_primary(&self) -> bool {
        self.write_pinned || self.query_type == QueryType::Write
    }

    /// 프라이머리 쪽 스테이트먼트 선택
    fn rw_stmt(&self) -> DriverResult<&Arc<dyn DatabaseStmt>> {
        self.selector
            .resolve(&self.primary_stmts)
            .ok_or_else(|| DriverError::statement("no primary statement available"))
    }

    /// 레플리카 쪽 스테이트먼트 선택
    ///
    /// 레플리카가 없으면 프라이머리 쪽에서 선택합니다.
    fn ro_stmt(&self) -> DriverResult<&Arc<dyn DatabaseStmt>> {
        if self.replica_stmts.is_empty() {
            return self.rw_stmt();
        }
        self.selector
            .resolve(&self.replica_stmts)
            .ok_or_else(|| DriverError::statement("no replica statement available"))
    }
}

impl fmt::Debug for AggregateStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateStmt")
            .field("primary_stmts", &self.primary_stmts.len())
            .field("replica_stmts", &self.replica_stmts.len())
            .field("write_pinned", &self.write_pinned)
            .field("query_type", &self.query_type)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
