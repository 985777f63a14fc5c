use anyhow::{anyhow, Context, Result};
use cwalarm_core::{AlarmCatalog, ThresholdPolicy};
use cwalarm_types::{ComparisonOperator, MetricKind, Service, Statistic, TreatMissingData};
use serde::{Deserialize, Serialize};

/// 告警目录覆盖文件
///
/// 每条记录按 (服务, 指标) 覆盖内置目录中的对应字段，未填写的字段保持不变。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    pub version: Option<String>,
    #[serde(default)]
    pub metrics: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub service: Service,
    pub metric: String,
    pub statistic: Option<Statistic>,
    pub comparison_operator: Option<ComparisonOperator>,
    pub threshold: Option<ThresholdPolicy>,
    pub evaluation_periods: Option<u32>,
    pub datapoints_to_alarm: Option<u32>,
    pub period_secs: Option<u64>,
    pub treat_missing_data: Option<TreatMissingData>,
    pub description: Option<String>,
}

impl CatalogFile {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid catalog file")
    }

    /// 在基础目录上应用覆盖并校验结果
    pub fn apply_to(&self, mut catalog: AlarmCatalog) -> Result<AlarmCatalog> {
        if let Some(version) = &self.version {
            catalog.set_version(version.clone());
        }

        for entry in &self.metrics {
            let metric = MetricKind::parse(entry.service, &entry.metric)
                .map_err(|e| anyhow!("Catalog entry rejected: {}", e))?;
            let mut defaults = catalog.get(metric)?.clone();

            if let Some(statistic) = entry.statistic {
                defaults.statistic = statistic;
            }
            if let Some(comparison) = entry.comparison_operator {
                defaults.comparison_operator = comparison;
            }
            if let Some(threshold) = entry.threshold {
                defaults.threshold = threshold;
            }
            if let Some(evaluation_periods) = entry.evaluation_periods {
                defaults.evaluation_periods = evaluation_periods;
            }
            if let Some(datapoints) = entry.datapoints_to_alarm {
                defaults.datapoints_to_alarm = datapoints;
            }
            if let Some(period_secs) = entry.period_secs {
                defaults.period_secs = period_secs;
            }
            if let Some(treat_missing_data) = entry.treat_missing_data {
                defaults.treat_missing_data = treat_missing_data;
            }
            if let Some(description) = &entry.description {
                defaults.description = description.clone();
            }

            catalog.insert(metric, defaults);
        }

        catalog.validate()?;
        Ok(catalog)
    }
}
