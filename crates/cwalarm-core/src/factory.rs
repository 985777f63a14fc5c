use cwalarm_types::{
    AlarmConfig, AlarmDefinition, ResourceHandle, ServiceMetric, SharedDefaults,
};
use std::sync::Arc;
use tracing::debug;

use crate::catalog::{is_valid_period, AlarmCatalog};
use crate::error::{AlarmError, Result};

/// 单指标告警工厂
///
/// 字段解析顺序：单指标配置 → 共享默认值（仅三个动作和缺失数据处理）
/// → 目录默认值 → 无通用阈值的指标报错。
#[derive(Debug, Clone)]
pub struct AlarmFactory {
    catalog: Arc<AlarmCatalog>,
}

impl AlarmFactory {
    pub fn new(catalog: Arc<AlarmCatalog>) -> Self {
        Self { catalog }
    }

    /// 使用内置目录
    pub fn builtin() -> Self {
        Self::new(Arc::new(AlarmCatalog::builtin()))
    }

    pub fn catalog(&self) -> &AlarmCatalog {
        &self.catalog
    }

    /// 为资源的一个指标构建告警定义
    pub fn build<M: ServiceMetric>(
        &self,
        resource: &ResourceHandle,
        metric: M,
        config: &AlarmConfig,
        defaults: &SharedDefaults,
    ) -> Result<AlarmDefinition> {
        let expected = M::SERVICE.resource_kind();
        if resource.kind() != expected {
            return Err(AlarmError::ResourceMismatch {
                metric: metric.kind(),
                expected,
                actual: resource.kind(),
            });
        }

        let table = self.catalog.get(metric)?;
        let resource_name = resource.name();
        let invalid = |reason: String| AlarmError::invalid_config(resource_name, metric, reason);

        let threshold = config
            .threshold
            .or_else(|| table.threshold.default_threshold())
            .ok_or_else(|| AlarmError::MissingThreshold {
                resource: resource_name.to_string(),
                metric: metric.kind(),
            })?;
        if !threshold.is_finite() {
            return Err(invalid(format!("threshold must be finite, got {}", threshold)));
        }

        let evaluation_periods = config
            .evaluation_periods
            .unwrap_or(table.evaluation_periods);
        if evaluation_periods == 0 {
            return Err(invalid("evaluation_periods must be greater than 0".to_string()));
        }

        // 只覆盖了评估周期时，数据点数不能超过新的评估周期
        let datapoints_to_alarm = config
            .datapoints_to_alarm
            .unwrap_or_else(|| table.datapoints_to_alarm.min(evaluation_periods));
        if datapoints_to_alarm == 0 || datapoints_to_alarm > evaluation_periods {
            return Err(invalid(format!(
                "datapoints_to_alarm ({}) must be within 1..={}",
                datapoints_to_alarm, evaluation_periods
            )));
        }

        let period_secs = config.period_secs.unwrap_or(table.period_secs);
        if !is_valid_period(period_secs) {
            return Err(invalid(format!(
                "period must be 10, 30 or a multiple of 60 seconds, got {}",
                period_secs
            )));
        }

        let alarm_actions = config
            .alarm_action
            .clone()
            .or_else(|| defaults.default_alarm_action.clone())
            .into_iter()
            .collect();
        let ok_actions = config
            .ok_action
            .clone()
            .or_else(|| defaults.default_ok_action.clone())
            .into_iter()
            .collect();
        let insufficient_data_actions = config
            .insufficient_data_action
            .clone()
            .or_else(|| defaults.default_insufficient_data_action.clone())
            .into_iter()
            .collect();
        let treat_missing_data = config
            .treat_missing_data
            .or(defaults.treat_missing_data)
            .unwrap_or(table.treat_missing_data);

        let alarm_name = config
            .alarm_name
            .clone()
            .unwrap_or_else(|| format!("{} - {}", resource_name, metric.metric_name()));
        let alarm_description = config
            .alarm_description
            .clone()
            .unwrap_or_else(|| table.description.clone());

        let definition = AlarmDefinition {
            logical_id: logical_id(resource_name, metric.metric_name()),
            alarm_name,
            alarm_description,
            namespace: M::SERVICE.namespace().to_string(),
            metric_name: metric.metric_name().to_string(),
            dimensions: resource.dimensions(),
            statistic: table.statistic,
            comparison_operator: table.comparison_operator,
            threshold,
            evaluation_periods,
            datapoints_to_alarm,
            period_secs,
            treat_missing_data,
            alarm_actions,
            ok_actions,
            insufficient_data_actions,
        };

        debug!(
            resource = %resource,
            metric = %metric,
            threshold = definition.threshold,
            evaluation_periods = definition.evaluation_periods,
            "Alarm definition built"
        );

        Ok(definition)
    }
}

impl Default for AlarmFactory {
    fn default() -> Self {
        Self::builtin()
    }
}

/// 由资源名和指标名生成逻辑 ID，例如 `orders-handler` + `Errors` → `OrdersHandlerErrorsAlarm`
pub fn logical_id(resource_name: &str, metric_name: &str) -> String {
    let mut id = String::with_capacity(resource_name.len() + metric_name.len() + 5);
    for part in resource_name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .chain(metric_name.split(|c: char| !c.is_ascii_alphanumeric()))
    {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            id.push(first.to_ascii_uppercase());
            id.extend(chars);
        }
    }
    id.push_str("Alarm");
    id
}
