use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::alarm::{AlarmAction, TreatMissingData};
use crate::metric::ServiceMetric;

/// 单个指标的告警配置（全部可选）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    pub threshold: Option<f64>,
    pub evaluation_periods: Option<u32>,
    pub datapoints_to_alarm: Option<u32>,
    pub period_secs: Option<u64>,
    pub alarm_name: Option<String>,
    pub alarm_description: Option<String>,
    pub alarm_action: Option<AlarmAction>,
    pub ok_action: Option<AlarmAction>,
    pub insufficient_data_action: Option<AlarmAction>,
    pub treat_missing_data: Option<TreatMissingData>,
}

impl AlarmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_evaluation_periods(mut self, evaluation_periods: u32) -> Self {
        self.evaluation_periods = Some(evaluation_periods);
        self
    }

    pub fn with_datapoints_to_alarm(mut self, datapoints_to_alarm: u32) -> Self {
        self.datapoints_to_alarm = Some(datapoints_to_alarm);
        self
    }

    pub fn with_period_secs(mut self, period_secs: u64) -> Self {
        self.period_secs = Some(period_secs);
        self
    }

    pub fn with_alarm_name(mut self, alarm_name: impl Into<String>) -> Self {
        self.alarm_name = Some(alarm_name.into());
        self
    }

    pub fn with_alarm_description(mut self, description: impl Into<String>) -> Self {
        self.alarm_description = Some(description.into());
        self
    }

    pub fn with_alarm_action(mut self, action: impl Into<AlarmAction>) -> Self {
        self.alarm_action = Some(action.into());
        self
    }

    pub fn with_ok_action(mut self, action: impl Into<AlarmAction>) -> Self {
        self.ok_action = Some(action.into());
        self
    }

    pub fn with_insufficient_data_action(mut self, action: impl Into<AlarmAction>) -> Self {
        self.insufficient_data_action = Some(action.into());
        self
    }

    pub fn with_treat_missing_data(mut self, treat_missing_data: TreatMissingData) -> Self {
        self.treat_missing_data = Some(treat_missing_data);
        self
    }
}

/// 同一组推荐告警共享的默认值
///
/// 只在单指标配置未设置对应字段时生效。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedDefaults {
    pub default_alarm_action: Option<AlarmAction>,
    pub default_ok_action: Option<AlarmAction>,
    pub default_insufficient_data_action: Option<AlarmAction>,
    pub treat_missing_data: Option<TreatMissingData>,
}

impl SharedDefaults {
    pub fn with_alarm_action(mut self, action: impl Into<AlarmAction>) -> Self {
        self.default_alarm_action = Some(action.into());
        self
    }

    pub fn with_ok_action(mut self, action: impl Into<AlarmAction>) -> Self {
        self.default_ok_action = Some(action.into());
        self
    }

    pub fn with_insufficient_data_action(mut self, action: impl Into<AlarmAction>) -> Self {
        self.default_insufficient_data_action = Some(action.into());
        self
    }

    pub fn with_treat_missing_data(mut self, treat_missing_data: TreatMissingData) -> Self {
        self.treat_missing_data = Some(treat_missing_data);
        self
    }

    /// 合并外层默认值，本层已设置的字段优先
    pub fn merge_with_global(&self, global: &SharedDefaults) -> SharedDefaults {
        SharedDefaults {
            default_alarm_action: self
                .default_alarm_action
                .clone()
                .or_else(|| global.default_alarm_action.clone()),
            default_ok_action: self
                .default_ok_action
                .clone()
                .or_else(|| global.default_ok_action.clone()),
            default_insufficient_data_action: self
                .default_insufficient_data_action
                .clone()
                .or_else(|| global.default_insufficient_data_action.clone()),
            treat_missing_data: self.treat_missing_data.or(global.treat_missing_data),
        }
    }
}

/// 一类资源的推荐告警配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "M: Serialize",
    deserialize = "M: Deserialize<'de> + Ord"
))]
pub struct RecommendedAlarmsConfig<M> {
    #[serde(default = "BTreeMap::new")]
    pub alarms: BTreeMap<M, AlarmConfig>,
    #[serde(default)]
    pub defaults: SharedDefaults,
    #[serde(default = "BTreeSet::new")]
    pub exclude_alarms: BTreeSet<M>,
}

impl<M: ServiceMetric> RecommendedAlarmsConfig<M> {
    pub fn new() -> Self {
        Self {
            alarms: BTreeMap::new(),
            defaults: SharedDefaults::default(),
            exclude_alarms: BTreeSet::new(),
        }
    }

    pub fn with_alarm(mut self, metric: M, config: AlarmConfig) -> Self {
        self.alarms.insert(metric, config);
        self
    }

    pub fn with_defaults(mut self, defaults: SharedDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn exclude(mut self, metric: M) -> Self {
        self.exclude_alarms.insert(metric);
        self
    }

    pub fn is_excluded(&self, metric: M) -> bool {
        self.exclude_alarms.contains(&metric)
    }

    pub fn alarm(&self, metric: M) -> Option<&AlarmConfig> {
        self.alarms.get(&metric)
    }
}

impl<M: ServiceMetric> Default for RecommendedAlarmsConfig<M> {
    fn default() -> Self {
        Self::new()
    }
}
