//! Routing Configuration
//!
//! 리졸버 구성 옵션

use std::fmt;
use std::sync::Arc;

use super::balancer::LoadBalancerPolicy;
use super::db::RoutingDb;
use super::error::{DriverError, DriverResult};
use super::handle::Database;
use super::query::{DefaultQueryTypeChecker, QueryTypeChecker};

// ============================================================================
// RoutingConfig - 라우팅 설정
// ============================================================================

/// 라우팅 설정
///
/// 구성 이후에는 불변입니다. 프라이머리는 최소 하나 필요하며 검증은
/// [`RoutingConfig::validate`] 또는 빌드 시점에 수행됩니다.
pub struct RoutingConfig {
    /// 프라이머리 핸들 목록 (쓰기)
    pub primaries: Vec<Arc<dyn Database>>,
    /// 레플리카 핸들 목록 (읽기 전용)
    pub replicas: Vec<Arc<dyn Database>>,
    /// 로드밸런서 정책
    pub policy: LoadBalancerPolicy,
    /// 쿼리 분류기
    pub checker: Arc<dyn QueryTypeChecker>,
}

impl RoutingConfig {
    /// 빌더 시작
    pub fn builder() -> RoutingConfigBuilder {
        RoutingConfigBuilder::new()
    }

    /// 설정 검증
    pub fn validate(&self) -> DriverResult<()> {
        if self.primaries.is_empty() {
            return Err(DriverError::configuration(
                "at least one primary database is required",
            ));
        }
        Ok(())
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            primaries: Vec::new(),
            replicas: Vec::new(),
            policy: LoadBalancerPolicy::default(),
            checker: Arc::new(DefaultQueryTypeChecker),
        }
    }
}

impl fmt::Debug for RoutingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingConfig")
            .field("primaries", &self.primaries.len())
            .field("replicas", &self.replicas.len())
            .field("policy", &self.policy)
            .finish()
    }
}

// ============================================================================
// RoutingConfigBuilder - 설정 빌더
// ============================================================================

/// 라우팅 설정 빌더
#[derive(Default)]
pub struct RoutingConfigBuilder {
    config: RoutingConfig,
}

impl RoutingConfigBuilder {
    /// 새 빌더 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 프라이머리 핸들 추가
    pub fn with_primary(mut self, db: Arc<dyn Database>) -> Self {
        self.config.primaries.push(db);
        self
    }

    /// 프라이머리 핸들 목록 추가
    pub fn with_primaries(mut self, dbs: Vec<Arc<dyn Database>>) -> Self {
        self.config.primaries.extend(dbs);
        self
    }

    /// 레플리카 핸들 추가
    pub fn with_replica(mut self, db: Arc<dyn Database>) -> Self {
        self.config.replicas.push(db);
        self
    }

    /// 레플리카 핸들 목록 추가
    pub fn with_replicas(mut self, dbs: Vec<Arc<dyn Database>>) -> Self {
        self.config.replicas.extend(dbs);
        self
    }

    /// 로드밸런서 정책 설정
    pub fn with_load_balancer(mut self, policy: LoadBalancerPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// 정책 이름으로 로드밸런서 설정
    ///
    /// `ROUND_ROBIN`과 `RANDOM`만 허용하며, 알 수 없는 이름은 설정
    /// 에러로 거부합니다.
    pub fn with_load_balancer_name(mut self, name: &str) -> DriverResult<Self> {
        self.config.policy = LoadBalancerPolicy::parse(name)?;
        Ok(self)
    }

    /// 쿼리 분류기 설정
    pub fn with_query_type_checker(mut self, checker: Arc<dyn QueryTypeChecker>) -> Self {
        self.config.checker = checker;
        self
    }

    /// 설정으로 변환
    pub fn into_config(self) -> RoutingConfig {
        self.config
    }

    /// 리졸버 빌드
    pub fn build(self) -> DriverResult<RoutingDb> {
        RoutingDb::with_config(self.config)
    }
}

// ============================================================================
// Tests
// ============================================================================
