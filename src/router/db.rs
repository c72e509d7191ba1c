//! Routing Database
//!
//! 프라이머리/레플리카 클러스터 위의 논리 데이터베이스입니다.
//!
//! 읽기는 레플리카로, 쓰기는 프라이머리로 자동 라우팅됩니다. 레플리카가
//! 없으면 읽기도 프라이머리로 내려갑니다.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::balancer::Selector;
use super::config::RoutingConfig;
use super::conn::RouterConn;
use super::error::{DriverError, DriverResult};
use super::fanout::{for_each_parallel, map_parallel};
use super::handle::{Connector, Database, DatabaseStmt, HandleId};
use super::query::{QueryType, QueryTypeChecker};
use super::stmt::AggregateStmt;
use super::tx::RouterTx;
use super::types::{DatabaseStats, ExecResult, Row, Rows, TxOptions, Value};

// ============================================================================
// RoutingDb - 논리 데이터베이스
// ============================================================================

/// 논리 데이터베이스
///
/// 여러 물리 핸들을 하나의 읽기/쓰기 데이터베이스처럼 노출합니다.
/// 모든 연산은 동시 호출에 안전합니다.
///
/// `conn`, `stats`, `driver_name`은 본질적으로 단일 핸들 연산이라 로드밸런서를
/// 타지 않고 항상 첫 번째 프라이머리로 향합니다. 반환 값은 클러스터 구성원
/// 하나에 대한 것입니다.
pub struct RoutingDb {
    /// 프라이머리 핸들 (쓰기, 비어있지 않음)
    primaries: Vec<Arc<dyn Database>>,
    /// 레플리카 핸들 (읽기 전용, 비어있을 수 있음)
    replicas: Vec<Arc<dyn Database>>,
    /// 물리 핸들 선택기
    db_selector: Selector,
    /// 스테이트먼트 선택기 (집계 스테이트먼트들과 공유)
    stmt_selector: Arc<Selector>,
    /// 쿼리 분류기
    checker: Arc<dyn QueryTypeChecker>,
}

impl RoutingDb {
    /// 빌더 시작
    pub fn builder() -> super::config::RoutingConfigBuilder {
        RoutingConfig::builder()
    }

    /// 설정으로 리졸버 생성
    pub fn with_config(config: RoutingConfig) -> DriverResult<Self> {
        config.validate()?;

        Ok(Self {
            primaries: config.primaries,
            replicas: config.replicas,
            db_selector: Selector::new(config.policy),
            stmt_selector: Arc::new(Selector::new(config.policy)),
            checker: config.checker,
        })
    }

    /// 프라이머리 핸들 목록
    pub fn primaries(&self) -> &[Arc<dyn Database>] {
        &self.primaries
    }

    /// 레플리카 핸들 목록
    pub fn replicas(&self) -> &[Arc<dyn Database>] {
        &self.replicas
    }

    /// 행을 반환하지 않는 쿼리 실행
    ///
    /// 로드밸런서가 고른 프라이머리에서 실행합니다. 실패해도 다른
    /// 프라이머리로 재시도하지 않습니다.
    pub async fn exec(&self, query: &str, args: &[Value]) -> DriverResult<ExecResult> {
        self.read_write()?.exec(query, args).await
    }

    /// 행을 반환하는 쿼리 실행
    ///
    /// 분류기가 쓰기로 판정하면 프라이머리로, 아니면 레플리카로
    /// 라우팅됩니다.
    pub async fn query(&self, query: &str, args: &[Value]) -> DriverResult<Rows> {
        let db = match self.checker.check(query) {
            QueryType::Write => self.read_write()?,
            QueryType::Read | QueryType::Unknown => self.read_only()?,
        };
        db.query(query, args).await
    }

    /// 최대 한 행을 반환하는 쿼리 실행
    ///
    /// 에러는 반환된 행에 실려 지연 관찰됩니다.
    pub async fn query_row(&self, query: &str, args: &[Value]) -> Row {
        let selected = match self.checker.check(query) {
            QueryType::Write => self.read_write(),
            QueryType::Read | QueryType::Unknown => self.read_only(),
        };

        match selected {
            Ok(db) => db.query_row(query, args).await,
            Err(err) => Row::from_error(err),
        }
    }

    /// 트랜잭션 시작
    ///
    /// 로드밸런서가 고른 프라이머리에 고정된 트랜잭션을 반환합니다.
    pub async fn begin(&self) -> DriverResult<RouterTx> {
        self.begin_with(TxOptions::default()).await
    }

    /// 옵션과 함께 트랜잭션 시작
    pub async fn begin_with(&self, opts: TxOptions) -> DriverResult<RouterTx> {
        let db = self.read_write()?.clone();
        let tx = db.begin(opts).await?;
        Ok(RouterTx::new(db, tx))
    }

    /// 풀에서 단일 연결 획득
    ///
    /// 항상 첫 번째 프라이머리의 풀에서 가져옵니다.
    pub async fn conn(&self) -> DriverResult<RouterConn> {
        let db = self.first_primary()?;
        let conn = db.conn().await?;
        Ok(RouterConn::new(db.clone(), conn))
    }

    /// 프리페어드 스테이트먼트 생성
    ///
    /// 모든 물리 핸들에 동시에 준비하고, 핸들별 스테이트먼트를 담은 집계
    /// 스테이트먼트를 반환합니다. 일부 핸들에서 실패하면 이미 만들어진
    /// 스테이트먼트를 최선 노력으로 닫은 뒤 집계 에러를 반환합니다.
    pub async fn prepare(&self, query: &str) -> DriverResult<AggregateStmt> {
        let primary_result = {
            let dbs = self.primaries.clone();
            let text = query.to_string();
            map_parallel(dbs.len(), move |i| {
                let db = dbs[i].clone();
                let text = text.clone();
                async move { db.prepare(&text).await }
            })
            .await
        };

        let replica_result = {
            let dbs = self.replicas.clone();
            let text = query.to_string();
            map_parallel(dbs.len(), move |i| {
                let db = dbs[i].clone();
                let text = text.clone();
                async move { db.prepare(&text).await }
            })
            .await
        };

        let (primary_stmts, replica_stmts) = match (primary_result, replica_result) {
            (Ok(primary_stmts), Ok(replica_stmts)) => (primary_stmts, replica_stmts),
            (primary_result, replica_result) => {
                let mut errors = Vec::new();
                let mut created: Vec<Arc<dyn DatabaseStmt>> = Vec::new();
                for result in [primary_result, replica_result] {
                    match result {
                        Ok(stmts) => created.extend(stmts),
                        Err((err, partial)) => {
                            errors.push(err);
                            created.extend(partial);
                        }
                    }
                }

                tracing::debug!(
                    created = created.len(),
                    "prepare fan-out failed, closing partially created statements"
                );
                let count = created.len();
                let _ = for_each_parallel(count, move |i| {
                    let stmt = created[i].clone();
                    async move {
                        let _ = stmt.close().await;
                        Ok(())
                    }
                })
                .await;

                return Err(DriverError::combine(errors)
                    .unwrap_or_else(|| DriverError::internal("prepare fan-out failed")));
            }
        };

        let mut by_handle = HashMap::with_capacity(primary_stmts.len() + replica_stmts.len());
        for (db, stmt) in self.primaries.iter().zip(primary_stmts.iter()) {
            by_handle.insert(HandleId::of(db), stmt.clone());
        }
        for (db, stmt) in self.replicas.iter().zip(replica_stmts.iter()) {
            by_handle.insert(HandleId::of(db), stmt.clone());
        }

        Ok(AggregateStmt::new(
            self.stmt_selector.clone(),
            primary_stmts,
            replica_stmts,
            by_handle,
            self.checker.check(query),
        ))
    }

    /// 모든 물리 핸들의 연결 상태 확인
    ///
    /// 모든 핸들을 동시에 ping하고 실패를 집계합니다. 전부 성공해야
    /// 성공입니다.
    pub async fn ping(&self) -> DriverResult<()> {
        let primaries = self.primaries.clone();
        let err_primaries = for_each_parallel(primaries.len(), move |i| {
            let db = primaries[i].clone();
            async move { db.ping().await }
        })
        .await
        .err();

        let replicas = self.replicas.clone();
        let err_replicas = for_each_parallel(replicas.len(), move |i| {
            let db = replicas[i].clone();
            async move { db.ping().await }
        })
        .await
        .err();

        match DriverError::combine(err_primaries.into_iter().chain(err_replicas).collect()) {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// 모든 물리 핸들 종료
    ///
    /// 모든 핸들을 동시에 닫고 실패를 집계합니다. 반복 호출의 동작은
    /// 드라이버 close의 멱등성을 그대로 따릅니다.
    pub async fn close(&self) -> DriverResult<()> {
        tracing::debug!(
            primaries = self.primaries.len(),
            replicas = self.replicas.len(),
            "closing logical database"
        );

        let primaries = self.primaries.clone();
        let err_primaries = for_each_parallel(primaries.len(), move |i| {
            let db = primaries[i].clone();
            async move { db.close().await }
        })
        .await
        .err();

        let replicas = self.replicas.clone();
        let err_replicas = for_each_parallel(replicas.len(), move |i| {
            let db = replicas[i].clone();
            async move { db.close().await }
        })
        .await
        .err();

        match DriverError::combine(err_primaries.into_iter().chain(err_replicas).collect()) {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// 모든 핸들의 유휴 연결 최대 수 설정
    pub fn set_max_idle_conns(&self, n: usize) {
        for db in self.primaries.iter().chain(self.replicas.iter()) {
            db.set_max_idle_conns(n);
        }
    }

    /// 모든 핸들의 열린 연결 최대 수 설정
    pub fn set_max_open_conns(&self, n: usize) {
        for db in self.primaries.iter().chain(self.replicas.iter()) {
            db.set_max_open_conns(n);
        }
    }

    /// 모든 핸들의 연결 최대 수명 설정
    pub fn set_conn_max_lifetime(&self, d: Duration) {
        for db in self.primaries.iter().chain(self.replicas.iter()) {
            db.set_conn_max_lifetime(d);
        }
    }

    /// 모든 핸들의 연결 최대 유휴 시간 설정
    pub fn set_conn_max_idle_time(&self, d: Duration) {
        for db in self.primaries.iter().chain(self.replicas.iter()) {
            db.set_conn_max_idle_time(d);
        }
    }

    /// 첫 번째 프라이머리의 드라이버 이름
    pub fn driver_name(&self) -> &str {
        self.primaries
            .first()
            .map(|db| db.driver_name())
            .unwrap_or("")
    }

    /// 첫 번째 프라이머리의 연결 풀 통계
    pub fn stats(&self) -> DatabaseStats {
        self.primaries
            .first()
            .map(|db| db.stats())
            .unwrap_or_default()
    }

    /// 읽기용 핸들 선택
    ///
    /// 레플리카가 없으면 프라이머리에서 선택합니다.
    fn read_only(&self) -> DriverResult<&Arc<dyn Database>> {
        if self.replicas.is_empty() {
            return self.read_write();
        }
        self.db_selector
            .resolve(&self.replicas)
            .ok_or_else(|| DriverError::configuration("no replica database available"))
    }

    /// 쓰기용 핸들 선택
    fn read_write(&self) -> DriverResult<&Arc<dyn Database>> {
        self.db_selector
            .resolve(&self.primaries)
            .ok_or_else(|| DriverError::configuration("no primary database available"))
    }

    /// 첫 번째 프라이머리
    fn first_primary(&self) -> DriverResult<&Arc<dyn Database>> {
        self.primaries
            .first()
            .ok_or_else(|| DriverError::configuration("no primary database available"))
    }
}

impl fmt::Debug for RoutingDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingDb")
            .field("primaries", &self.primaries.len())
            .field("replicas", &self.replicas.len())
            .field("policy", &self.db_selector.policy())
            .finish()
    }
}

// ============================================================================
// 문자열 기반 오픈
// ============================================================================

/// DSN 목록으로 리졸버 오픈 (단일 프라이머리)
///
/// `;`로 구분된 목록에서 첫 번째 DSN이 프라이머리, 나머지가 레플리카가
/// 됩니다. 모든 DSN을 동시에 엽니다.
pub async fn open(connector: Arc<dyn Connector>, dsns: &str) -> DriverResult<RoutingDb> {
    let entries = split_dsns(dsns)?;
    let mut handles = connect_all(connector, entries).await?;

    let primary = handles.remove(0);
    RoutingDb::builder()
        .with_primary(primary)
        .with_replicas(handles)
        .build()
}

/// DSN 목록으로 리졸버 오픈 (다중 프라이머리)
///
/// 프라이머리와 레플리카 목록을 각각 `;`로 구분하여 받습니다. 레플리카
/// 목록은 비어 있을 수 있습니다.
pub async fn open_multi(
    connector: Arc<dyn Connector>,
    primary_dsns: &str,
    replica_dsns: &str,
) -> DriverResult<RoutingDb> {
    let primary_entries = split_dsns(primary_dsns)?;
    let replica_entries = split_dsns_lenient(replica_dsns);

    let primary_count = primary_entries.len();
    let mut entries = primary_entries;
    entries.extend(replica_entries);

    let mut handles = connect_all(connector, entries).await?;
    let replicas = handles.split_off(primary_count);

    RoutingDb::builder()
        .with_primaries(handles)
        .with_replicas(replicas)
        .build()
}

/// `;` 구분 DSN 목록 파싱
///
/// 빈 항목은 건너뛰며, 항목이 하나도 없으면 설정 에러입니다.
fn split_dsns(dsns: &str) -> DriverResult<Vec<String>> {
    let entries = split_dsns_lenient(dsns);
    if entries.is_empty() {
        return Err(DriverError::configuration("empty data source list"));
    }
    Ok(entries)
}

/// `;` 구분 DSN 목록 파싱 (빈 목록 허용)
fn split_dsns_lenient(dsns: &str) -> Vec<String> {
    dsns.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// 모든 DSN을 동시에 오픈
///
/// 일부가 실패하면 이미 열린 핸들을 최선 노력으로 닫고 집계 에러를
/// 반환합니다.
async fn connect_all(
    connector: Arc<dyn Connector>,
    dsns: Vec<String>,
) -> DriverResult<Vec<Arc<dyn Database>>> {
    tracing::debug!(driver = connector.driver_name(), count = dsns.len(), "opening data sources");

    match map_parallel(dsns.len(), move |i| {
        let connector = connector.clone();
        let dsn = dsns[i].clone();
        async move { connector.connect(&dsn).await }
    })
    .await
    {
        Ok(handles) => Ok(handles),
        Err((err, partial)) => {
            let count = partial.len();
            let _ = for_each_parallel(count, move |i| {
                let db = partial[i].clone();
                async move {
                    let _ = db.close().await;
                    Ok(())
                }
            })
            .await;
            Err(err)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
