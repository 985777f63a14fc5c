use anyhow::{anyhow, Result};
use cwalarm_types::{AlarmConfig, RecommendedAlarmsConfig, ServiceMetric, SharedDefaults};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_enabled() -> bool {
    true
}

/// 单个服务的告警配置段（可覆盖全局默认值）
///
/// 指标键保持字符串形式，在合并时按服务解析。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSection {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub exclude_resources: Vec<String>,
    #[serde(default)]
    pub exclude_alarms: Vec<String>,
    #[serde(default)]
    pub defaults: SharedDefaults,
    #[serde(default)]
    pub alarms: BTreeMap<String, AlarmConfig>,
}

impl ServiceSection {
    /// 合并全局默认值，生成推荐告警配置
    pub fn merge_with_global<M: ServiceMetric>(
        &self,
        global: &SharedDefaults,
    ) -> Result<RecommendedAlarmsConfig<M>> {
        let mut config =
            RecommendedAlarmsConfig::new().with_defaults(self.defaults.merge_with_global(global));

        for (key, alarm) in &self.alarms {
            let metric = parse_metric::<M>(key)?;
            config.alarms.insert(metric, alarm.clone());
        }
        for key in &self.exclude_alarms {
            config.exclude_alarms.insert(parse_metric::<M>(key)?);
        }

        Ok(config)
    }
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            enabled: true,
            exclude_resources: Vec::new(),
            exclude_alarms: Vec::new(),
            defaults: SharedDefaults::default(),
            alarms: BTreeMap::new(),
        }
    }
}

fn parse_metric<M: ServiceMetric>(key: &str) -> Result<M> {
    key.parse::<M>()
        .map_err(|e| anyhow!("[{}] {}", M::SERVICE.key(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cwalarm_types::{AlarmAction, LambdaMetric, SqsMetric, TreatMissingData};

    #[test]
    fn test_merge_with_global() {
        let global = SharedDefaults::default()
            .with_alarm_action("arn:aws:sns:us-east-1:123456789012:global")
            .with_treat_missing_data(TreatMissingData::Missing);
        let mut section = ServiceSection::default();
        section.defaults =
            SharedDefaults::default().with_ok_action("arn:aws:sns:us-east-1:123456789012:ok");
        section
            .alarms
            .insert("errors".to_string(), AlarmConfig::new().with_threshold(1.0));
        section.exclude_alarms.push("DURATION".to_string());

        let merged = section.merge_with_global::<LambdaMetric>(&global).unwrap();

        assert_eq!(
            merged.defaults.default_alarm_action,
            Some(AlarmAction::new("arn:aws:sns:us-east-1:123456789012:global"))
        );
        assert_eq!(
            merged.defaults.default_ok_action,
            Some(AlarmAction::new("arn:aws:sns:us-east-1:123456789012:ok"))
        );
        assert!(merged.is_excluded(LambdaMetric::Duration));
        assert_eq!(merged.alarm(LambdaMetric::Errors).unwrap().threshold, Some(1.0));
    }

    #[test]
    fn test_unknown_metric_key_rejected() {
        let mut section = ServiceSection::default();
        section.exclude_alarms.push("errors".to_string());

        let err = section
            .merge_with_global::<SqsMetric>(&SharedDefaults::default())
            .unwrap_err();
        assert!(err.to_string().starts_with("[sqs]"));
    }

    #[test]
    fn test_section_from_toml() {
        let section: ServiceSection = toml::from_str(
            r#"
exclude_resources = ["Lambda1"]
exclude_alarms = ["duration"]

[alarms.errors]
threshold = 1.0
alarm_action = "arn:aws:sns:us-east-1:123456789012:ops"
"#,
        )
        .unwrap();

        assert!(section.enabled);
        assert_eq!(section.exclude_resources, vec!["Lambda1".to_string()]);
        assert_eq!(section.alarms["errors"].threshold, Some(1.0));

        let config = section
            .merge_with_global::<LambdaMetric>(&SharedDefaults::default())
            .unwrap();
        assert!(config.is_excluded(LambdaMetric::Duration));
    }
}
