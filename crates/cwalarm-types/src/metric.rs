use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use thiserror::Error;

use crate::resource::ResourceKind;

/// 指标/服务名称解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Unknown {service} metric: {name}")]
    UnknownMetric { service: Service, name: String },

    #[error("Invalid statistic: {0}")]
    InvalidStatistic(String),
}

/// 受支持的 AWS 服务
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Lambda,
    S3,
    Sqs,
    Sns,
}

impl Service {
    pub const ALL: &'static [Service] = &[Service::Lambda, Service::S3, Service::Sqs, Service::Sns];

    /// CloudWatch 命名空间
    pub fn namespace(self) -> &'static str {
        match self {
            Service::Lambda => "AWS/Lambda",
            Service::S3 => "AWS/S3",
            Service::Sqs => "AWS/SQS",
            Service::Sns => "AWS/SNS",
        }
    }

    /// 该服务被监控的资源类型
    pub fn resource_kind(self) -> ResourceKind {
        match self {
            Service::Lambda => ResourceKind::Function,
            Service::S3 => ResourceKind::Bucket,
            Service::Sqs => ResourceKind::Queue,
            Service::Sns => ResourceKind::Topic,
        }
    }

    /// 配置文件中使用的键
    pub fn key(self) -> &'static str {
        match self {
            Service::Lambda => "lambda",
            Service::S3 => "s3",
            Service::Sqs => "sqs",
            Service::Sns => "sns",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::Lambda => "Lambda",
            Service::S3 => "S3",
            Service::Sqs => "SQS",
            Service::Sns => "SNS",
        };
        f.write_str(name)
    }
}

impl FromStr for Service {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .iter()
            .copied()
            .find(|service| service.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownService(s.to_string()))
    }
}

/// 某个服务下的指标枚举
///
/// `ALL` 的顺序即推荐告警的固定构建顺序。
pub trait ServiceMetric:
    Copy
    + Eq
    + Ord
    + Hash
    + fmt::Debug
    + fmt::Display
    + FromStr<Err = ParseError>
    + Into<MetricKind>
    + 'static
{
    const SERVICE: Service;
    const ALL: &'static [Self];

    /// CloudWatch 指标名，例如 `4xxErrors`
    fn metric_name(self) -> &'static str;

    /// 枚举标识符，例如 `ERRORS_4XX`
    fn identifier(self) -> &'static str;

    fn kind(self) -> MetricKind {
        self.into()
    }
}

macro_rules! service_metric {
    (
        $(#[$meta:meta])*
        $name:ident for $svc:ident {
            $( $variant:ident => ($ident:literal, $key:literal, $metric:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $( #[serde(rename = $key)] $variant ),+
        }

        impl ServiceMetric for $name {
            const SERVICE: Service = Service::$svc;
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn metric_name(self) -> &'static str {
                match self {
                    $( $name::$variant => $metric ),+
                }
            }

            fn identifier(self) -> &'static str {
                match self {
                    $( $name::$variant => $ident ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.identifier())
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( _ if s.eq_ignore_ascii_case($ident) || s.eq_ignore_ascii_case($metric) => {
                        Ok($name::$variant)
                    } )+
                    _ => Err(ParseError::UnknownMetric {
                        service: Service::$svc,
                        name: s.to_string(),
                    }),
                }
            }
        }

        impl From<$name> for MetricKind {
            fn from(metric: $name) -> Self {
                MetricKind::$svc(metric)
            }
        }
    };
}

service_metric! {
    /// Lambda 函数推荐告警指标
    LambdaMetric for Lambda {
        Errors => ("ERRORS", "errors", "Errors"),
        Throttles => ("THROTTLES", "throttles", "Throttles"),
        Duration => ("DURATION", "duration", "Duration"),
        ConcurrentExecutions => ("CONCURRENT_EXECUTIONS", "concurrent_executions", "ConcurrentExecutions"),
    }
}

service_metric! {
    /// S3 存储桶推荐告警指标（需要开启请求指标）
    S3Metric for S3 {
        Errors4xx => ("ERRORS_4XX", "errors_4xx", "4xxErrors"),
        Errors5xx => ("ERRORS_5XX", "errors_5xx", "5xxErrors"),
    }
}

service_metric! {
    /// SQS 队列推荐告警指标
    SqsMetric for Sqs {
        ApproximateAgeOfOldestMessage => (
            "APPROXIMATE_AGE_OF_OLDEST_MESSAGE",
            "approximate_age_of_oldest_message",
            "ApproximateAgeOfOldestMessage"
        ),
        ApproximateNumberOfMessagesNotVisible => (
            "APPROXIMATE_NUMBER_OF_MESSAGES_NOT_VISIBLE",
            "approximate_number_of_messages_not_visible",
            "ApproximateNumberOfMessagesNotVisible"
        ),
        ApproximateNumberOfMessagesVisible => (
            "APPROXIMATE_NUMBER_OF_MESSAGES_VISIBLE",
            "approximate_number_of_messages_visible",
            "ApproximateNumberOfMessagesVisible"
        ),
        NumberOfMessagesSent => (
            "NUMBER_OF_MESSAGES_SENT",
            "number_of_messages_sent",
            "NumberOfMessagesSent"
        ),
    }
}

service_metric! {
    /// SNS 主题推荐告警指标
    SnsMetric for Sns {
        NumberOfMessagesPublished => (
            "NUMBER_OF_MESSAGES_PUBLISHED",
            "number_of_messages_published",
            "NumberOfMessagesPublished"
        ),
        NumberOfNotificationsDelivered => (
            "NUMBER_OF_NOTIFICATIONS_DELIVERED",
            "number_of_notifications_delivered",
            "NumberOfNotificationsDelivered"
        ),
        NumberOfNotificationsFailed => (
            "NUMBER_OF_NOTIFICATIONS_FAILED",
            "number_of_notifications_failed",
            "NumberOfNotificationsFailed"
        ),
        NumberOfNotificationsFilteredOutInvalidAttributes => (
            "NUMBER_OF_NOTIFICATIONS_FILTERED_OUT_INVALID_ATTRIBUTES",
            "number_of_notifications_filtered_out_invalid_attributes",
            "NumberOfNotificationsFilteredOut-InvalidAttributes"
        ),
        NumberOfNotificationsFilteredOutInvalidMessageBody => (
            "NUMBER_OF_NOTIFICATIONS_FILTERED_OUT_INVALID_MESSAGE_BODY",
            "number_of_notifications_filtered_out_invalid_message_body",
            "NumberOfNotificationsFilteredOut-InvalidMessageBody"
        ),
        NumberOfNotificationsRedrivenToDlq => (
            "NUMBER_OF_NOTIFICATIONS_REDRIVEN_TO_DLQ",
            "number_of_notifications_redriven_to_dlq",
            "NumberOfNotificationsRedrivenToDlq"
        ),
        NumberOfNotificationsFailedToRedriveToDlq => (
            "NUMBER_OF_NOTIFICATIONS_FAILED_TO_REDRIVE_TO_DLQ",
            "number_of_notifications_failed_to_redrive_to_dlq",
            "NumberOfNotificationsFailedToRedriveToDlq"
        ),
    }
}

/// 跨服务的指标标识，用作告警目录的键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "service", content = "metric", rename_all = "snake_case")]
pub enum MetricKind {
    Lambda(LambdaMetric),
    S3(S3Metric),
    Sqs(SqsMetric),
    Sns(SnsMetric),
}

impl MetricKind {
    pub fn service(self) -> Service {
        match self {
            MetricKind::Lambda(_) => Service::Lambda,
            MetricKind::S3(_) => Service::S3,
            MetricKind::Sqs(_) => Service::Sqs,
            MetricKind::Sns(_) => Service::Sns,
        }
    }

    pub fn metric_name(self) -> &'static str {
        match self {
            MetricKind::Lambda(m) => m.metric_name(),
            MetricKind::S3(m) => m.metric_name(),
            MetricKind::Sqs(m) => m.metric_name(),
            MetricKind::Sns(m) => m.metric_name(),
        }
    }

    pub fn identifier(self) -> &'static str {
        match self {
            MetricKind::Lambda(m) => m.identifier(),
            MetricKind::S3(m) => m.identifier(),
            MetricKind::Sqs(m) => m.identifier(),
            MetricKind::Sns(m) => m.identifier(),
        }
    }

    /// 按服务解析指标名（枚举标识符或 CloudWatch 指标名均可）
    pub fn parse(service: Service, name: &str) -> Result<Self, ParseError> {
        Ok(match service {
            Service::Lambda => MetricKind::Lambda(name.parse()?),
            Service::S3 => MetricKind::S3(name.parse()?),
            Service::Sqs => MetricKind::Sqs(name.parse()?),
            Service::Sns => MetricKind::Sns(name.parse()?),
        })
    }

    /// 所有服务的全部指标，按服务再按枚举顺序
    pub fn all() -> impl Iterator<Item = MetricKind> {
        LambdaMetric::ALL
            .iter()
            .map(|m| m.kind())
            .chain(S3Metric::ALL.iter().map(|m| m.kind()))
            .chain(SqsMetric::ALL.iter().map(|m| m.kind()))
            .chain(SnsMetric::ALL.iter().map(|m| m.kind()))
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.service().key(), self.identifier())
    }
}
