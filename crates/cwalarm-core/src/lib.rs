pub mod aspect;
pub mod catalog;
pub mod construct;
pub mod error;
pub mod factory;
pub mod provision;
pub mod recommended;

pub use aspect::{
    Aspect, LambdaAlarmsAspect, RecommendedAlarmsAspect, S3AlarmsAspect, SnsAlarmsAspect,
    SqsAlarmsAspect,
};
pub use catalog::{AlarmCatalog, MetricDefaults, ThresholdPolicy, BUILTIN_CATALOG_VERSION};
pub use construct::{ConstructNode, NodeKind};
pub use error::{AlarmError, Result};
pub use factory::AlarmFactory;
pub use provision::{AlarmHandle, AlarmProvisioner, InMemoryProvisioner};
pub use recommended::{
    LambdaRecommendedAlarms, RecommendedAlarms, S3RecommendedAlarms, SnsRecommendedAlarms,
    SqsRecommendedAlarms,
};

pub use cwalarm_types as types;
