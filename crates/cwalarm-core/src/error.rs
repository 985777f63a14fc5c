use cwalarm_types::{MetricKind, ResourceKind};
use thiserror::Error;

/// 告警构建错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlarmError {
    /// 指标没有通用默认阈值，且调用方未提供
    #[error("Missing threshold for {metric} on {resource}")]
    MissingThreshold { resource: String, metric: MetricKind },

    /// 单指标配置不合法
    #[error("Invalid configuration for {metric} on {resource}: {reason}")]
    InvalidConfig {
        resource: String,
        metric: MetricKind,
        reason: String,
    },

    /// 资源类型与指标所属服务不符
    #[error("Metric {metric} cannot be applied to a {actual} resource (expected {expected})")]
    ResourceMismatch {
        metric: MetricKind,
        expected: ResourceKind,
        actual: ResourceKind,
    },

    /// 告警目录缺失或不一致
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// 同一父节点下的构造 ID 重复
    #[error("Construct already exists: {0}")]
    DuplicateConstruct(String),

    /// 同一告警被创建两次
    #[error("Alarm already provisioned: {0}")]
    DuplicateAlarm(String),
}

/// 告警构建结果类型
pub type Result<T> = std::result::Result<T, AlarmError>;

impl AlarmError {
    /// 创建配置错误
    pub fn invalid_config(
        resource: impl Into<String>,
        metric: impl Into<MetricKind>,
        reason: impl Into<String>,
    ) -> Self {
        AlarmError::InvalidConfig {
            resource: resource.into(),
            metric: metric.into(),
            reason: reason.into(),
        }
    }

    /// 创建目录错误
    pub fn catalog(msg: impl Into<String>) -> Self {
        AlarmError::Catalog(msg.into())
    }

    /// 是否属于调用方配置错误（需修改配置后重试）
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            AlarmError::MissingThreshold { .. } | AlarmError::InvalidConfig { .. }
        )
    }

    /// 出错的指标（如有）
    pub fn metric(&self) -> Option<MetricKind> {
        match self {
            AlarmError::MissingThreshold { metric, .. }
            | AlarmError::InvalidConfig { metric, .. }
            | AlarmError::ResourceMismatch { metric, .. } => Some(*metric),
            _ => None,
        }
    }
}
