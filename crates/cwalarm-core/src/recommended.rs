use cwalarm_types::{
    AlarmConfig, AlarmDefinition, LambdaMetric, RecommendedAlarmsConfig, ResourceHandle,
    S3Metric, ServiceMetric, SnsMetric, SqsMetric,
};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use tracing::debug;

use crate::catalog::ThresholdPolicy;
use crate::error::Result;
use crate::factory::AlarmFactory;

/// 某类资源的推荐告警集合
///
/// 按指标枚举顺序逐个构建；遇到第一个错误即中止，不返回部分结果。
#[derive(Debug, Clone)]
pub struct RecommendedAlarms<M> {
    factory: AlarmFactory,
    _metric: PhantomData<M>,
}

pub type LambdaRecommendedAlarms = RecommendedAlarms<LambdaMetric>;
pub type S3RecommendedAlarms = RecommendedAlarms<S3Metric>;
pub type SqsRecommendedAlarms = RecommendedAlarms<SqsMetric>;
pub type SnsRecommendedAlarms = RecommendedAlarms<SnsMetric>;

impl<M: ServiceMetric> RecommendedAlarms<M> {
    pub fn new(factory: AlarmFactory) -> Self {
        Self {
            factory,
            _metric: PhantomData,
        }
    }

    pub fn factory(&self) -> &AlarmFactory {
        &self.factory
    }

    /// 将要构建的指标（已排除的、未配置的可选指标不在其中）
    pub fn planned_metrics(&self, config: &RecommendedAlarmsConfig<M>) -> Result<Vec<M>> {
        let mut planned = Vec::new();
        for &metric in M::ALL {
            if config.is_excluded(metric) {
                continue;
            }
            let table = self.factory.catalog().get(metric)?;
            if table.threshold == ThresholdPolicy::Optional && config.alarm(metric).is_none() {
                continue;
            }
            planned.push(metric);
        }
        Ok(planned)
    }

    /// 为资源构建全部推荐告警
    pub fn apply(
        &self,
        resource: &ResourceHandle,
        config: &RecommendedAlarmsConfig<M>,
    ) -> Result<BTreeMap<M, AlarmDefinition>> {
        let empty = AlarmConfig::default();
        let mut alarms = BTreeMap::new();

        for metric in self.planned_metrics(config)? {
            let alarm_config = config.alarm(metric).unwrap_or(&empty);
            let definition = self
                .factory
                .build(resource, metric, alarm_config, &config.defaults)?;
            alarms.insert(metric, definition);
        }

        let skipped: Vec<String> = M::ALL
            .iter()
            .filter(|m| !alarms.contains_key(*m))
            .map(|m| m.to_string())
            .collect();
        debug!(
            resource = %resource,
            built = alarms.len(),
            skipped = ?skipped,
            "Recommended alarms resolved"
        );

        Ok(alarms)
    }
}

impl<M: ServiceMetric> Default for RecommendedAlarms<M> {
    fn default() -> Self {
        Self::new(AlarmFactory::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AlarmError;
    use cwalarm_types::{MetricKind, SharedDefaults};

    #[test]
    fn test_s3_without_overrides() {
        let alarms = S3RecommendedAlarms::default()
            .apply(&ResourceHandle::bucket("assets"), &RecommendedAlarmsConfig::new())
            .unwrap();

        assert_eq!(alarms.len(), 2);
        for alarm in alarms.values() {
            assert_eq!(alarm.threshold, 0.05);
            assert_eq!(alarm.evaluation_periods, 15);
            assert_eq!(alarm.datapoints_to_alarm, 15);
            assert_eq!(alarm.period_secs, 60);
        }
        assert_eq!(
            alarms.keys().copied().collect::<Vec<_>>(),
            vec![S3Metric::Errors4xx, S3Metric::Errors5xx]
        );
    }

    #[test]
    fn test_excluded_metric_never_built() {
        let aggregate = S3RecommendedAlarms::default();
        let bucket = ResourceHandle::bucket("assets");

        for &excluded in S3Metric::ALL {
            let config = RecommendedAlarmsConfig::new().exclude(excluded);
            let alarms = aggregate.apply(&bucket, &config).unwrap();
            assert!(!alarms.contains_key(&excluded));
            assert_eq!(alarms.len(), 1);
        }
    }

    #[test]
    fn test_lambda_with_exclusion() {
        let config = RecommendedAlarmsConfig::new()
            .with_alarm(LambdaMetric::Duration, AlarmConfig::new().with_threshold(15.0))
            .with_alarm(LambdaMetric::Errors, AlarmConfig::new().with_threshold(1.0))
            .with_alarm(LambdaMetric::Throttles, AlarmConfig::new().with_threshold(0.0))
            .exclude(LambdaMetric::Duration);

        let alarms = LambdaRecommendedAlarms::default()
            .apply(&ResourceHandle::function("orders"), &config)
            .unwrap();

        assert_eq!(alarms.len(), 2);
        assert_eq!(alarms[&LambdaMetric::Errors].threshold, 1.0);
        assert_eq!(alarms[&LambdaMetric::Throttles].threshold, 0.0);
        assert!(!alarms.contains_key(&LambdaMetric::Duration));
        assert!(!alarms.contains_key(&LambdaMetric::ConcurrentExecutions));
    }

    #[test]
    fn test_optional_metric_built_when_configured() {
        let config = RecommendedAlarmsConfig::new()
            .with_alarm(LambdaMetric::Errors, AlarmConfig::new().with_threshold(1.0))
            .with_alarm(LambdaMetric::Throttles, AlarmConfig::new().with_threshold(0.0))
            .with_alarm(LambdaMetric::Duration, AlarmConfig::new().with_threshold(3000.0))
            .with_alarm(
                LambdaMetric::ConcurrentExecutions,
                AlarmConfig::new().with_threshold(900.0),
            );

        let alarms = LambdaRecommendedAlarms::default()
            .apply(&ResourceHandle::function("orders"), &config)
            .unwrap();
        assert_eq!(alarms.len(), 4);
        assert_eq!(alarms[&LambdaMetric::ConcurrentExecutions].evaluation_periods, 10);
    }

    #[test]
    fn test_aborts_on_first_missing_threshold() {
        let config = RecommendedAlarmsConfig::new()
            .with_alarm(LambdaMetric::Errors, AlarmConfig::new().with_threshold(1.0));

        let err = LambdaRecommendedAlarms::default()
            .apply(&ResourceHandle::function("orders"), &config)
            .unwrap_err();

        match err {
            AlarmError::MissingThreshold { resource, metric } => {
                assert_eq!(resource, "orders");
                assert_eq!(metric, MetricKind::Lambda(LambdaMetric::Throttles));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_apply_is_idempotent() {
        let config = RecommendedAlarmsConfig::new()
            .with_defaults(
                SharedDefaults::default().with_alarm_action("arn:aws:sns:us-east-1:123456789012:ops"),
            )
            .with_alarm(
                SqsMetric::ApproximateAgeOfOldestMessage,
                AlarmConfig::new().with_threshold(300.0),
            )
            .with_alarm(
                SqsMetric::ApproximateNumberOfMessagesNotVisible,
                AlarmConfig::new().with_threshold(1000.0),
            )
            .with_alarm(
                SqsMetric::ApproximateNumberOfMessagesVisible,
                AlarmConfig::new().with_threshold(500.0),
            );
        let aggregate = SqsRecommendedAlarms::default();
        let queue = ResourceHandle::queue("jobs");

        let first = aggregate.apply(&queue, &config).unwrap();
        let second = aggregate.apply(&queue, &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        assert_eq!(first[&SqsMetric::NumberOfMessagesSent].threshold, 0.0);
    }

    #[test]
    fn test_sns_defaults_skip_optional_metrics() {
        let aggregate = SnsRecommendedAlarms::default();
        let config = RecommendedAlarmsConfig::new();
        let planned = aggregate.planned_metrics(&config).unwrap();
        assert_eq!(planned.len(), 5);
        assert!(!planned.contains(&SnsMetric::NumberOfMessagesPublished));

        let alarms = aggregate.apply(&ResourceHandle::topic("events"), &config).unwrap();
        assert_eq!(alarms.len(), 5);
        assert!(alarms.values().all(|a| a.threshold == 0.0 && a.evaluation_periods == 5));
    }
}
