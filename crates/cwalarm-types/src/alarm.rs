use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::metric::ParseError;

/// 指标统计方式
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Statistic {
    Average,
    Sum,
    Minimum,
    Maximum,
    SampleCount,
    /// 百分位，例如 `p90`
    Percentile(f64),
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statistic::Average => f.write_str("Average"),
            Statistic::Sum => f.write_str("Sum"),
            Statistic::Minimum => f.write_str("Minimum"),
            Statistic::Maximum => f.write_str("Maximum"),
            Statistic::SampleCount => f.write_str("SampleCount"),
            Statistic::Percentile(p) => write!(f, "p{}", p),
        }
    }
}

impl FromStr for Statistic {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stat = match s.to_ascii_lowercase().as_str() {
            "average" | "avg" => Statistic::Average,
            "sum" => Statistic::Sum,
            "minimum" | "min" => Statistic::Minimum,
            "maximum" | "max" => Statistic::Maximum,
            "samplecount" | "n" => Statistic::SampleCount,
            other => {
                let p = other
                    .strip_prefix('p')
                    .and_then(|v| v.parse::<f64>().ok())
                    .filter(|p| *p > 0.0 && *p <= 100.0)
                    .ok_or_else(|| ParseError::InvalidStatistic(s.to_string()))?;
                Statistic::Percentile(p)
            }
        };
        Ok(stat)
    }
}

impl From<Statistic> for String {
    fn from(stat: Statistic) -> Self {
        stat.to_string()
    }
}

impl TryFrom<String> for Statistic {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// 阈值比较方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    GreaterThanOrEqualToThreshold,
    GreaterThanThreshold,
    LessThanThreshold,
    LessThanOrEqualToThreshold,
}

/// 缺失数据处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatMissingData {
    Breaching,
    NotBreaching,
    Ignore,
    Missing,
}

impl fmt::Display for TreatMissingData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            TreatMissingData::Breaching => "breaching",
            TreatMissingData::NotBreaching => "notBreaching",
            TreatMissingData::Ignore => "ignore",
            TreatMissingData::Missing => "missing",
        };
        f.write_str(value)
    }
}

/// 告警动作（SNS 主题等目标的 ARN）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlarmAction(String);

impl AlarmAction {
    pub fn new(arn: impl Into<String>) -> Self {
        Self(arn.into())
    }

    pub fn arn(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlarmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AlarmAction {
    fn from(arn: &str) -> Self {
        Self::new(arn)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 完全解析后的告警定义
///
/// 由告警工厂生成，交给外部的告警资源创建方，之后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmDefinition {
    pub logical_id: String,
    pub alarm_name: String,
    pub alarm_description: String,
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<Dimension>,
    pub statistic: Statistic,
    pub comparison_operator: ComparisonOperator,
    pub threshold: f64,
    pub evaluation_periods: u32,
    pub datapoints_to_alarm: u32,
    pub period_secs: u64,
    pub treat_missing_data: TreatMissingData,
    pub alarm_actions: Vec<AlarmAction>,
    pub ok_actions: Vec<AlarmAction>,
    pub insufficient_data_actions: Vec<AlarmAction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistic_round_trip_strings() {
        assert_eq!("Average".parse::<Statistic>().unwrap(), Statistic::Average);
        assert_eq!("p90".parse::<Statistic>().unwrap(), Statistic::Percentile(90.0));
        assert_eq!(Statistic::Percentile(99.9).to_string(), "p99.9");
        assert!("p0".parse::<Statistic>().is_err());
        assert!("median".parse::<Statistic>().is_err());

        let json = serde_json::to_string(&Statistic::Maximum).unwrap();
        assert_eq!(json, "\"Maximum\"");
    }
}
