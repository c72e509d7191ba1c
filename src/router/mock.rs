//! Mock Driver
//!
//! 테스트 전용 인메모리 드라이버. 핸들별 호출 기록과 에러 주입을
//! 지원합니다.

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{DriverError, DriverResult};
use super::handle::{Connector, Database, DatabaseConn, DatabaseStmt, DatabaseTx};
use super::types::{DatabaseStats, ExecResult, Row, Rows, TxOptions, Value};

/// stats 식별용 전역 마커
static NEXT_MARKER: AtomicUsize = AtomicUsize::new(1);

/// 풀 튜닝 호출 기록
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PoolSettings {
    pub max_idle: Option<usize>,
    pub max_open: Option<usize>,
    pub max_lifetime: Option<Duration>,
    pub max_idle_time: Option<Duration>,
}

/// 핸들 간 공유되는 모의 드라이버 상태
struct MockState {
    name: String,
    marker: usize,
    ops: Mutex<Vec<String>>,
    fail_ping: AtomicBool,
    fail_prepare: AtomicBool,
    fail_query_connection: AtomicBool,
    pool: Mutex<PoolSettings>,
}

impl MockState {
    fn note(&self, op: impl Into<String>) {
        self.ops.lock().push(op.into());
    }
}

// ============================================================================
// MockDb - 모의 물리 핸들
// ============================================================================

/// 모의 물리 데이터베이스 핸들
pub(crate) struct MockDb {
    state: Arc<MockState>,
}

impl MockDb {
    /// 이름을 가진 공유 핸들 생성
    pub(crate) fn shared(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            state: Arc::new(MockState {
                name: name.into(),
                marker: NEXT_MARKER.fetch_add(1, Ordering::Relaxed),
                ops: Mutex::new(Vec::new()),
                fail_ping: AtomicBool::new(false),
                fail_prepare: AtomicBool::new(false),
                fail_query_connection: AtomicBool::new(false),
                pool: Mutex::new(PoolSettings::default()),
            }),
        })
    }

    /// stats 식별 마커
    pub(crate) fn marker(&self) -> usize {
        self.state.marker
    }

    /// 기록된 호출 목록
    pub(crate) fn ops(&self) -> Vec<String> {
        self.state.ops.lock().clone()
    }

    /// 접두사로 호출 횟수 집계
    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.state
            .ops
            .lock()
            .iter()
            .filter(|op| op.starts_with(prefix))
            .count()
    }

    /// ping 실패 주입
    pub(crate) fn fail_ping(&self, fail: bool) {
        self.state.fail_ping.store(fail, Ordering::SeqCst);
    }

    /// prepare 실패 주입
    pub(crate) fn fail_prepare(&self, fail: bool) {
        self.state.fail_prepare.store(fail, Ordering::SeqCst);
    }

    /// 쿼리 경로에 연결 에러 주입
    pub(crate) fn fail_query_connection(&self, fail: bool) {
        self.state.fail_query_connection.store(fail, Ordering::SeqCst);
    }

    /// 기록된 풀 튜닝 설정
    pub(crate) fn pool_settings(&self) -> PoolSettings {
        self.state.pool.lock().clone()
    }
}

#[async_trait]
impl Database for MockDb {
    fn driver_name(&self) -> &str {
        &self.state.name
    }

    async fn exec(&self, query: &str, _args: &[Value]) -> DriverResult<ExecResult> {
        self.state.note(format!("exec:{}", query));
        Ok(ExecResult::new(1, None))
    }

    async fn query(&self, query: &str, _args: &[Value]) -> DriverResult<Rows> {
        self.state.note(format!("query:{}", query));
        if self.state.fail_query_connection.load(Ordering::SeqCst) {
            return Err(DriverError::connection("connection reset by peer"));
        }
        Ok(Rows::new(
            vec!["n".to_string()],
            vec![vec![Value::Integer(1)]],
        ))
    }

    async fn query_row(&self, query: &str, _args: &[Value]) -> Row {
        self.state.note(format!("query_row:{}", query));
        if self.state.fail_query_connection.load(Ordering::SeqCst) {
            return Row::from_error(DriverError::connection("connection reset by peer"));
        }
        Row::new(vec!["n".to_string()], vec![Value::Integer(1)])
    }

    async fn begin(&self, _opts: TxOptions) -> DriverResult<Box<dyn DatabaseTx>> {
        self.state.note("begin");
        Ok(Box::new(MockTx {
            state: self.state.clone(),
            done: AtomicBool::new(false),
        }))
    }

    async fn prepare(&self, query: &str) -> DriverResult<Arc<dyn DatabaseStmt>> {
        self.state.note(format!("prepare:{}", query));
        if self.state.fail_prepare.load(Ordering::SeqCst) {
            return Err(DriverError::statement("prepare refused"));
        }
        Ok(Arc::new(MockStmt {
            state: self.state.clone(),
            query: query.to_string(),
            closed: AtomicBool::new(false),
        }))
    }

    async fn conn(&self) -> DriverResult<Box<dyn DatabaseConn>> {
        self.state.note("conn");
        Ok(Box::new(MockConn {
            state: self.state.clone(),
            raw_token: format!("raw:{}", self.state.name),
            closed: AtomicBool::new(false),
        }))
    }

    async fn ping(&self) -> DriverResult<()> {
        self.state.note("ping");
        if self.state.fail_ping.load(Ordering::SeqCst) {
            return Err(DriverError::connection(format!(
                "{} is unreachable",
                self.state.name
            )));
        }
        Ok(())
    }

    async fn close(&self) -> DriverResult<()> {
        self.state.note("close");
        Ok(())
    }

    fn set_max_idle_conns(&self, n: usize) {
        self.state.pool.lock().max_idle = Some(n);
    }

    fn set_max_open_conns(&self, n: usize) {
        self.state.pool.lock().max_open = Some(n);
    }

    fn set_conn_max_lifetime(&self, d: Duration) {
        self.state.pool.lock().max_lifetime = Some(d);
    }

    fn set_conn_max_idle_time(&self, d: Duration) {
        self.state.pool.lock().max_idle_time = Some(d);
    }

    fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            open_connections: 1,
            wait_count: self.state.marker as u64,
            ..Default::default()
        }
    }
}

// ============================================================================
// MockStmt - 모의 프리페어드 스테이트먼트
// ============================================================================

/// 모의 프리페어드 스테이트먼트
pub(crate) struct MockStmt {
    state: Arc<MockState>,
    query: String,
    closed: AtomicBool,
}

impl MockStmt {
    fn ensure_open(&self) -> DriverResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DriverError::statement("statement already closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl DatabaseStmt for MockStmt {
    async fn exec(&self, _args: &[Value]) -> DriverResult<ExecResult> {
        self.ensure_open()?;
        self.state.note(format!("stmt.exec:{}", self.query));
        Ok(ExecResult::new(1, None))
    }

    async fn query(&self, _args: &[Value]) -> DriverResult<Rows> {
        self.ensure_open()?;
        self.state.note(format!("stmt.query:{}", self.query));
        if self.state.fail_query_connection.load(Ordering::SeqCst) {
            return Err(DriverError::connection("connection reset by peer"));
        }
        Ok(Rows::new(
            vec!["n".to_string()],
            vec![vec![Value::Integer(1)]],
        ))
    }

    async fn query_row(&self, _args: &[Value]) -> Row {
        if let Err(err) = self.ensure_open() {
            return Row::from_error(err);
        }
        self.state.note(format!("stmt.query_row:{}", self.query));
        if self.state.fail_query_connection.load(Ordering::SeqCst) {
            return Row::from_error(DriverError::connection("connection reset by peer"));
        }
        Row::new(vec!["n".to_string()], vec![Value::Integer(1)])
    }

    async fn close(&self) -> DriverResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(DriverError::statement("statement already closed"));
        }
        self.state.note(format!("stmt.close:{}", self.query));
        Ok(())
    }
}

// ============================================================================
// MockTx - 모의 트랜잭션
// ============================================================================

/// 모의 드라이버 트랜잭션
pub(crate) struct MockTx {
    state: Arc<MockState>,
    done: AtomicBool,
}

impl MockTx {
    fn ensure_active(&self) -> DriverResult<()> {
        if self.done.load(Ordering::SeqCst) {
            return Err(DriverError::transaction(
                "transaction has already been committed or rolled back",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DatabaseTx for MockTx {
    async fn commit(&self) -> DriverResult<()> {
        if self.done.swap(true, Ordering::SeqCst) {
            return Err(DriverError::transaction(
                "transaction has already been committed or rolled back",
            ));
        }
        self.state.note("tx.commit");
        Ok(())
    }

    async fn rollback(&self) -> DriverResult<()> {
        if self.done.swap(true, Ordering::SeqCst) {
            return Err(DriverError::transaction(
                "transaction has already been committed or rolled back",
            ));
        }
        self.state.note("tx.rollback");
        Ok(())
    }

    async fn exec(&self, query: &str, _args: &[Value]) -> DriverResult<ExecResult> {
        self.ensure_active()?;
        self.state.note(format!("tx.exec:{}", query));
        Ok(ExecResult::new(1, None))
    }

    async fn query(&self, query: &str, _args: &[Value]) -> DriverResult<Rows> {
        self.ensure_active()?;
        self.state.note(format!("tx.query:{}", query));
        Ok(Rows::new(
            vec!["n".to_string()],
            vec![vec![Value::Integer(1)]],
        ))
    }

    async fn query_row(&self, query: &str, _args: &[Value]) -> Row {
        if let Err(err) = self.ensure_active() {
            return Row::from_error(err);
        }
        self.state.note(format!("tx.query_row:{}", query));
        Row::new(vec!["n".to_string()], vec![Value::Integer(1)])
    }

    async fn prepare(&self, query: &str) -> DriverResult<Arc<dyn DatabaseStmt>> {
        self.ensure_active()?;
        self.state.note(format!("tx.prepare:{}", query));
        Ok(Arc::new(MockStmt {
            state: self.state.clone(),
            query: format!("tx:{}", query),
            closed: AtomicBool::new(false),
        }))
    }

    async fn stmt(&self, _stmt: Arc<dyn DatabaseStmt>) -> DriverResult<Arc<dyn DatabaseStmt>> {
        self.ensure_active()?;
        self.state.note("tx.stmt");
        Ok(Arc::new(MockStmt {
            state: self.state.clone(),
            query: "tx:rebound".to_string(),
            closed: AtomicBool::new(false),
        }))
    }
}

// ============================================================================
// MockConn - 모의 단일 연결
// ============================================================================

/// 모의 단일 연결
pub(crate) struct MockConn {
    state: Arc<MockState>,
    raw_token: String,
    closed: AtomicBool,
}

impl MockConn {
    fn ensure_open(&self) -> DriverResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DriverError::connection("connection already returned to pool"));
        }
        Ok(())
    }
}

#[async_trait]
impl DatabaseConn for MockConn {
    async fn exec(&self, query: &str, _args: &[Value]) -> DriverResult<ExecResult> {
        self.ensure_open()?;
        self.state.note(format!("conn.exec:{}", query));
        Ok(ExecResult::new(1, None))
    }

    async fn query(&self, query: &str, _args: &[Value]) -> DriverResult<Rows> {
        self.ensure_open()?;
        self.state.note(format!("conn.query:{}", query));
        Ok(Rows::new(
            vec!["n".to_string()],
            vec![vec![Value::Integer(1)]],
        ))
    }

    async fn query_row(&self, query: &str, _args: &[Value]) -> Row {
        if let Err(err) = self.ensure_open() {
            return Row::from_error(err);
        }
        self.state.note(format!("conn.query_row:{}", query));
        Row::new(vec!["n".to_string()], vec![Value::Integer(1)])
    }

    async fn begin(&self, _opts: TxOptions) -> DriverResult<Box<dyn DatabaseTx>> {
        self.ensure_open()?;
        self.state.note("conn.begin");
        Ok(Box::new(MockTx {
            state: self.state.clone(),
            done: AtomicBool::new(false),
        }))
    }

    async fn prepare(&self, query: &str) -> DriverResult<Arc<dyn DatabaseStmt>> {
        self.ensure_open()?;
        self.state.note(format!("conn.prepare:{}", query));
        Ok(Arc::new(MockStmt {
            state: self.state.clone(),
            query: format!("conn:{}", query),
            closed: AtomicBool::new(false),
        }))
    }

    async fn ping(&self) -> DriverResult<()> {
        self.ensure_open()?;
        self.state.note("conn.ping");
        Ok(())
    }

    fn raw(&self) -> &(dyn Any + Send + Sync) {
        &self.raw_token
    }

    async fn close(&self) -> DriverResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(DriverError::connection("connection already returned to pool"));
        }
        self.state.note("conn.close");
        Ok(())
    }
}

// ============================================================================
// MockConnector - 모의 커넥터
// ============================================================================

/// DSN별 모의 핸들을 여는 커넥터
pub(crate) struct MockConnector {
    fail_dsn: Mutex<Option<String>>,
    opened: Mutex<Vec<Arc<MockDb>>>,
}

impl MockConnector {
    /// 새 커넥터 생성
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            fail_dsn: Mutex::new(None),
            opened: Mutex::new(Vec::new()),
        })
    }

    /// 특정 DSN의 오픈을 실패시킴
    pub(crate) fn fail_on(&self, dsn: impl Into<String>) {
        *self.fail_dsn.lock() = Some(dsn.into());
    }

    /// 지금까지 열린 핸들 목록
    pub(crate) fn opened(&self) -> Vec<Arc<MockDb>> {
        self.opened.lock().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    fn driver_name(&self) -> &str {
        "mock"
    }

    async fn connect(&self, dsn: &str) -> DriverResult<Arc<dyn Database>> {
        if self.fail_dsn.lock().as_deref() == Some(dsn) {
            return Err(DriverError::connection(format!("cannot open {}", dsn)));
        }
        let db = MockDb::shared(dsn);
        self.opened.lock().push(db.clone());
        Ok(db)
    }
}
