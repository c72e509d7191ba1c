//! Router Types
//!
//! 라우터에서 사용하는 드라이버 중립 타입 정의

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{DriverError, DriverResult};

// ============================================================================
// Value - SQL 값
// ============================================================================

/// SQL 값 타입
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null
    Null,
    /// Boolean
    Boolean(bool),
    /// Integer (i64)
    Integer(i64),
    /// Float (f64)
    Float(f64),
    /// String
    String(String),
    /// Bytes
    Bytes(Vec<u8>),
}

impl Value {
    /// Null 여부
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Boolean으로 변환
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer로 변환
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Float로 변환
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// String으로 변환
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Bytes로 변환
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// 타입 이름
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

// ============================================================================
// ExecResult - 실행 결과
// ============================================================================

/// 쓰기 쿼리 실행 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// 영향받은 행 수
    pub rows_affected: u64,
    /// 마지막 INSERT ID (드라이버가 지원하는 경우)
    pub last_insert_id: Option<i64>,
}

impl ExecResult {
    /// 새 실행 결과 생성
    pub fn new(rows_affected: u64, last_insert_id: Option<i64>) -> Self {
        Self {
            rows_affected,
            last_insert_id,
        }
    }
}

// ============================================================================
// Rows - 쿼리 결과 집합
// ============================================================================

/// 쿼리 결과 집합
#[derive(Debug, Clone, Default)]
pub struct Rows {
    /// 컬럼 이름
    columns: Vec<String>,
    /// 행 목록
    rows: Vec<Vec<Value>>,
}

impl Rows {
    /// 새 결과 집합 생성
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// 빈 결과 집합 생성
    pub fn empty() -> Self {
        Self::default()
    }

    /// 컬럼 이름 목록
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// 행 목록
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// 행 수
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 빈 결과 여부
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl IntoIterator for Rows {
    type Item = Vec<Value>;
    type IntoIter = std::vec::IntoIter<Vec<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

// ============================================================================
// Row - 단일 행
// ============================================================================

/// 단일 행 결과
///
/// 실행 에러는 즉시 반환되지 않고 행에 실려 [`Row::error`] 또는
/// [`Row::into_values`] 시점에 관찰됩니다.
#[derive(Debug)]
pub struct Row {
    /// 컬럼 이름
    columns: Vec<String>,
    /// 값 목록 (행이 없으면 None)
    values: Option<Vec<Value>>,
    /// 지연된 에러
    error: Option<DriverError>,
}

impl Row {
    /// 새 행 생성
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self {
            columns,
            values: Some(values),
            error: None,
        }
    }

    /// 행 없음
    pub fn no_rows() -> Self {
        Self {
            columns: Vec::new(),
            values: None,
            error: None,
        }
    }

    /// 에러를 실은 행 생성
    pub fn from_error(error: DriverError) -> Self {
        Self {
            columns: Vec::new(),
            values: None,
            error: Some(error),
        }
    }

    /// 지연된 에러
    pub fn error(&self) -> Option<&DriverError> {
        self.error.as_ref()
    }

    /// 컬럼 이름 목록
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// 인덱스로 값 가져오기
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.as_ref().and_then(|v| v.get(index))
    }

    /// 컬럼 이름으로 값 가져오기
    pub fn column(&self, name: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == name)?;
        self.get(index)
    }

    /// 값 목록으로 변환
    ///
    /// 지연된 에러가 있으면 그 에러를, 행이 없으면 [`DriverError::NoRows`]를
    /// 반환합니다.
    pub fn into_values(self) -> DriverResult<Vec<Value>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.values.ok_or(DriverError::NoRows)
    }
}

// ============================================================================
// TxOptions - 트랜잭션 옵션
// ============================================================================

/// 트랜잭션 격리 수준
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    /// Read Uncommitted
    ReadUncommitted,
    /// Read Committed
    ReadCommitted,
    /// Repeatable Read
    RepeatableRead,
    /// Serializable
    Serializable,
}

/// 트랜잭션 옵션
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxOptions {
    /// 격리 수준 (None이면 드라이버 기본값)
    pub isolation: Option<IsolationLevel>,
    /// 읽기 전용 여부
    pub read_only: bool,
}

impl TxOptions {
    /// 새 옵션 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 격리 수준 설정
    pub fn with_isolation(mut self, level: IsolationLevel) -> Self {
        self.isolation = Some(level);
        self
    }

    /// 읽기 전용 설정
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

// ============================================================================
// DatabaseStats - 풀 통계
// ============================================================================

/// 물리 핸들의 연결 풀 통계
#[derive(Debug, Clone, Default)]
pub struct DatabaseStats {
    /// 열린 연결 수
    pub open_connections: usize,
    /// 사용 중인 연결 수
    pub in_use: usize,
    /// 유휴 연결 수
    pub idle: usize,
    /// 연결 대기 횟수
    pub wait_count: u64,
    /// 누적 연결 대기 시간
    pub wait_duration: Duration,
    /// max idle 초과로 닫힌 연결 수
    pub max_idle_closed: u64,
    /// 수명 초과로 닫힌 연결 수
    pub max_lifetime_closed: u64,
}

// ============================================================================
// 파라미터 맵 (편의)
// ============================================================================

/// 이름 있는 파라미터 맵
pub type Params = HashMap<String, Value>;

// ============================================================================
// Tests
// ============================================================================
