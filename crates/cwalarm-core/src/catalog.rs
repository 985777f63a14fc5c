//! 推荐告警目录
//!
//! 每个 (服务, 指标) 对应一条 AWS 推荐的默认值。目录本身是数据，
//! 可以整体替换或逐条覆盖，工厂逻辑不依赖具体数值。

use cwalarm_types::{
    ComparisonOperator, LambdaMetric, MetricKind, S3Metric, SnsMetric, SqsMetric, Statistic,
    TreatMissingData,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AlarmError, Result};

/// 内置目录版本
pub const BUILTIN_CATALOG_VERSION: &str = "aws-recommended-2024";

/// 默认聚合周期（秒）
pub const DEFAULT_PERIOD_SECS: u64 = 60;

/// 阈值策略
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// 存在通用默认阈值
    Default(f64),
    /// 必须由调用方提供
    Required,
    /// 未配置时不创建该告警；配置了则必须给出阈值
    Optional,
}

impl ThresholdPolicy {
    pub fn default_threshold(self) -> Option<f64> {
        match self {
            ThresholdPolicy::Default(value) => Some(value),
            _ => None,
        }
    }
}

/// 单个指标的推荐默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefaults {
    pub statistic: Statistic,
    pub comparison_operator: ComparisonOperator,
    pub threshold: ThresholdPolicy,
    pub evaluation_periods: u32,
    pub datapoints_to_alarm: u32,
    pub period_secs: u64,
    pub treat_missing_data: TreatMissingData,
    pub description: String,
}

impl MetricDefaults {
    fn new(
        statistic: Statistic,
        comparison_operator: ComparisonOperator,
        threshold: ThresholdPolicy,
        periods: (u32, u32),
        treat_missing_data: TreatMissingData,
        description: &str,
    ) -> Self {
        Self {
            statistic,
            comparison_operator,
            threshold,
            evaluation_periods: periods.0,
            datapoints_to_alarm: periods.1,
            period_secs: DEFAULT_PERIOD_SECS,
            treat_missing_data,
            description: description.to_string(),
        }
    }
}

/// CloudWatch 只接受 10 秒、30 秒或 60 秒整数倍的周期
pub fn is_valid_period(period_secs: u64) -> bool {
    period_secs == 10 || period_secs == 30 || (period_secs > 0 && period_secs % 60 == 0)
}

/// 告警默认值目录
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmCatalog {
    version: String,
    entries: BTreeMap<MetricKind, MetricDefaults>,
}

impl AlarmCatalog {
    /// 创建空目录
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            entries: BTreeMap::new(),
        }
    }

    /// AWS 推荐告警目录
    pub fn builtin() -> Self {
        use ComparisonOperator::*;
        use ThresholdPolicy::*;
        use TreatMissingData::*;

        let mut catalog = Self::new(BUILTIN_CATALOG_VERSION);

        // Lambda
        catalog.insert(
            LambdaMetric::Errors.into(),
            MetricDefaults::new(
                Statistic::Sum,
                GreaterThanThreshold,
                Required,
                (3, 3),
                NotBreaching,
                "This alarm detects high error counts. Errors include the exceptions thrown by the code as well as exceptions thrown by the Lambda runtime.",
            ),
        );
        catalog.insert(
            LambdaMetric::Throttles.into(),
            MetricDefaults::new(
                Statistic::Sum,
                GreaterThanThreshold,
                Required,
                (5, 5),
                NotBreaching,
                "This alarm detects a high number of throttled invocation requests. Throttling occurs when there is no concurrency available for scale up.",
            ),
        );
        catalog.insert(
            LambdaMetric::Duration.into(),
            MetricDefaults::new(
                Statistic::Percentile(90.0),
                GreaterThanThreshold,
                Required,
                (15, 15),
                Missing,
                "This alarm detects long duration times for processing an event by a Lambda function.",
            ),
        );
        catalog.insert(
            LambdaMetric::ConcurrentExecutions.into(),
            MetricDefaults::new(
                Statistic::Maximum,
                GreaterThanThreshold,
                Optional,
                (10, 10),
                Missing,
                "This alarm helps to monitor if the concurrency of the function is approaching the Region-level concurrency limit of the account.",
            ),
        );

        // S3
        for (metric, description) in [
            (
                S3Metric::Errors4xx,
                "This alarm helps report the total number of 4xx error status codes that are made in response to client requests.",
            ),
            (
                S3Metric::Errors5xx,
                "This alarm helps detect a high number of server-side errors. These errors indicate that a client made a request that the server could not complete.",
            ),
        ] {
            catalog.insert(
                metric.into(),
                MetricDefaults::new(
                    Statistic::Average,
                    GreaterThanThreshold,
                    Default(0.05),
                    (15, 15),
                    NotBreaching,
                    description,
                ),
            );
        }

        // SQS
        catalog.insert(
            SqsMetric::ApproximateAgeOfOldestMessage.into(),
            MetricDefaults::new(
                Statistic::Maximum,
                GreaterThanOrEqualToThreshold,
                Required,
                (15, 15),
                Missing,
                "This alarm watches the age of the oldest message in the queue. It can be used to monitor if consumers are processing messages at the desired speed.",
            ),
        );
        catalog.insert(
            SqsMetric::ApproximateNumberOfMessagesNotVisible.into(),
            MetricDefaults::new(
                Statistic::Average,
                GreaterThanOrEqualToThreshold,
                Required,
                (15, 15),
                Missing,
                "This alarm helps to detect a high number of in-flight messages in the queue.",
            ),
        );
        catalog.insert(
            SqsMetric::ApproximateNumberOfMessagesVisible.into(),
            MetricDefaults::new(
                Statistic::Average,
                GreaterThanOrEqualToThreshold,
                Required,
                (15, 15),
                Missing,
                "This alarm watches for the message queue backlog to be bigger than expected.",
            ),
        );
        catalog.insert(
            SqsMetric::NumberOfMessagesSent.into(),
            MetricDefaults::new(
                Statistic::Sum,
                LessThanOrEqualToThreshold,
                Default(0.0),
                (15, 15),
                Breaching,
                "This alarm helps to detect if there are no messages being sent from a producer.",
            ),
        );

        // SNS
        catalog.insert(
            SnsMetric::NumberOfMessagesPublished.into(),
            MetricDefaults::new(
                Statistic::Sum,
                LessThanThreshold,
                Optional,
                (5, 5),
                Breaching,
                "This alarm can detect when the number of SNS messages published is too low.",
            ),
        );
        catalog.insert(
            SnsMetric::NumberOfNotificationsDelivered.into(),
            MetricDefaults::new(
                Statistic::Sum,
                LessThanThreshold,
                Optional,
                (5, 5),
                Breaching,
                "This alarm can detect when the number of SNS messages delivered is too low.",
            ),
        );
        for (metric, description) in [
            (
                SnsMetric::NumberOfNotificationsFailed,
                "This alarm can detect when the number of failed SNS messages is too high.",
            ),
            (
                SnsMetric::NumberOfNotificationsFilteredOutInvalidAttributes,
                "This alarm helps to monitor and resolve potential problems with the publisher or subscribers caused by invalid message attributes.",
            ),
            (
                SnsMetric::NumberOfNotificationsFilteredOutInvalidMessageBody,
                "This alarm helps to monitor and resolve potential problems with the publisher or subscribers caused by an invalid message body.",
            ),
            (
                SnsMetric::NumberOfNotificationsRedrivenToDlq,
                "This alarm helps to monitor the number of messages that are moved to a dead-letter queue.",
            ),
            (
                SnsMetric::NumberOfNotificationsFailedToRedriveToDlq,
                "This alarm helps to monitor messages that could not be moved to a dead-letter queue.",
            ),
        ] {
            catalog.insert(
                metric.into(),
                MetricDefaults::new(
                    Statistic::Sum,
                    GreaterThanThreshold,
                    Default(0.0),
                    (5, 5),
                    NotBreaching,
                    description,
                ),
            );
        }

        catalog
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 插入或替换一条默认值，返回被替换的旧值
    pub fn insert(&mut self, metric: MetricKind, defaults: MetricDefaults) -> Option<MetricDefaults> {
        self.entries.insert(metric, defaults)
    }

    pub fn with_entry(mut self, metric: impl Into<MetricKind>, defaults: MetricDefaults) -> Self {
        self.insert(metric.into(), defaults);
        self
    }

    /// 查询指标默认值
    pub fn get(&self, metric: impl Into<MetricKind>) -> Result<&MetricDefaults> {
        let metric = metric.into();
        self.entries.get(&metric).ok_or_else(|| {
            AlarmError::catalog(format!(
                "no defaults for {} in catalog {}",
                metric, self.version
            ))
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = (&MetricKind, &MetricDefaults)> {
        self.entries.iter()
    }

    /// 校验每条默认值是否自洽
    pub fn validate(&self) -> Result<()> {
        for (metric, defaults) in &self.entries {
            if defaults.evaluation_periods == 0 {
                return Err(AlarmError::catalog(format!(
                    "{}: evaluation_periods must be greater than 0",
                    metric
                )));
            }
            if defaults.datapoints_to_alarm == 0
                || defaults.datapoints_to_alarm > defaults.evaluation_periods
            {
                return Err(AlarmError::catalog(format!(
                    "{}: datapoints_to_alarm ({}) must be within 1..={}",
                    metric, defaults.datapoints_to_alarm, defaults.evaluation_periods
                )));
            }
            if !is_valid_period(defaults.period_secs) {
                return Err(AlarmError::catalog(format!(
                    "{}: invalid period {}s",
                    metric, defaults.period_secs
                )));
            }
            if let ThresholdPolicy::Default(value) = defaults.threshold {
                if !value.is_finite() {
                    return Err(AlarmError::catalog(format!(
                        "{}: default threshold must be finite",
                        metric
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for AlarmCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
