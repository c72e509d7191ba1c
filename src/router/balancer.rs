//! Load Balancing Policies
//!
//! 물리 핸들 및 프리페어드 스테이트먼트 선택 전략을 정의합니다.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::{DriverError, DriverResult};

// ============================================================================
// LoadBalancerPolicy - 로드밸런서 정책
// ============================================================================

/// 로드밸런서 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadBalancerPolicy {
    /// 라운드 로빈 (기본값)
    #[default]
    RoundRobin,
    /// 균등 랜덤
    Random,
}

impl LoadBalancerPolicy {
    /// 정책 이름에서 파싱
    ///
    /// 알 수 없는 이름은 설정 시점에 거부됩니다.
    pub fn parse(name: &str) -> DriverResult<Self> {
        match name {
            "ROUND_ROBIN" => Ok(Self::RoundRobin),
            "RANDOM" => Ok(Self::Random),
            other => Err(DriverError::configuration(format!(
                "unknown load balancer policy: {}",
                other
            ))),
        }
    }

    /// 정책 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoundRobin => "ROUND_ROBIN",
            Self::Random => "RANDOM",
        }
    }
}

// ============================================================================
// Selector - 선택기
// ============================================================================

/// 랜덤 정책 상태
///
/// RNG와 예측 슬롯을 하나의 락으로 직렬화합니다. 비보호 RNG 상태는
/// 동시 호출에서 "선택된 핸들"과 "호출을 받은 핸들"이 갈라지는 경쟁이
/// 알려져 있어 락으로 고정합니다.
#[derive(Debug)]
struct RandomState {
    /// 시드된 RNG (생성 시 1회 시드)
    rng: StdRng,
    /// 다음 선택에 소비될 예측 값
    pending: Option<usize>,
}

/// 핸들 선택기
///
/// 정책에 따라 비어있지 않은 슬라이스에서 원소 하나를 고릅니다.
/// 원소 타입에 대해 다형적이며, 모든 선택은 같은 카운터/RNG 상태를
/// 공유하므로 동시 호출에 안전합니다.
#[derive(Debug)]
pub struct Selector {
    /// 정책
    policy: LoadBalancerPolicy,
    /// 라운드 로빈 카운터
    counter: AtomicU64,
    /// 랜덤 정책 상태
    random: Mutex<RandomState>,
}

impl Selector {
    /// 새 선택기 생성
    pub fn new(policy: LoadBalancerPolicy) -> Self {
        Self {
            policy,
            counter: AtomicU64::new(0),
            random: Mutex::new(RandomState {
                rng: StdRng::from_entropy(),
                pending: None,
            }),
        }
    }

    /// 라운드 로빈 선택기
    pub fn round_robin() -> Self {
        Self::new(LoadBalancerPolicy::RoundRobin)
    }

    /// 랜덤 선택기
    pub fn random() -> Self {
        Self::new(LoadBalancerPolicy::Random)
    }

    /// 현재 정책
    pub fn policy(&self) -> LoadBalancerPolicy {
        self.policy
    }

    /// 목록에서 원소 하나 선택
    ///
    /// 빈 슬라이스에만 `None`을 반환합니다. 호출자는 비어있지 않음을
    /// 보장하는 것이 계약입니다.
    pub fn resolve<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.next_index(items.len());
        items.get(index)
    }

    /// 다음 선택 인덱스 미리보기
    ///
    /// 라운드 로빈은 실제 선택 흐름에 영향을 주지 않습니다. 랜덤은 값을
    /// 뽑아 예측 슬롯에 저장하고, 다음 [`Selector::resolve`]가 그 값을
    /// 소비합니다.
    pub fn predict(&self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        match self.policy {
            LoadBalancerPolicy::RoundRobin => {
                ((self.counter.load(Ordering::Relaxed).wrapping_add(1)) % n as u64) as usize
            }
            LoadBalancerPolicy::Random => {
                let mut state = self.random.lock();
                let index = state.rng.gen_range(0..n);
                state.pending = Some(index);
                index
            }
        }
    }

    /// 정책별 인덱스 계산
    fn next_index(&self, n: usize) -> usize {
        // 단일 원소면 카운터를 건드리지 않음
        if n <= 1 {
            return 0;
        }
        match self.policy {
            LoadBalancerPolicy::RoundRobin => {
                let count = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
                (count % n as u64) as usize
            }
            LoadBalancerPolicy::Random => {
                let mut state = self.random.lock();
                match state.pending.take() {
                    // 예측이 현재 목록 크기 안에 있을 때만 소비
                    Some(index) if index < n => index,
                    _ => state.rng.gen_range(0..n),
                }
            }
        }
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::round_robin()
    }
}

// ============================================================================
// Tests
// ============================================================================
