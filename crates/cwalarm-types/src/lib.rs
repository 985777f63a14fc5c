pub mod alarm;
pub mod config;
pub mod metric;
pub mod resource;

pub use alarm::{AlarmAction, AlarmDefinition, ComparisonOperator, Dimension, Statistic, TreatMissingData};
pub use config::{AlarmConfig, RecommendedAlarmsConfig, SharedDefaults};
pub use metric::{
    LambdaMetric, MetricKind, ParseError, S3Metric, Service, ServiceMetric, SnsMetric, SqsMetric,
};
pub use resource::{ResourceHandle, ResourceKind, DEFAULT_S3_FILTER_ID};
