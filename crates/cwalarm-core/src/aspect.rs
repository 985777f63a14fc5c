use cwalarm_types::{
    LambdaMetric, RecommendedAlarmsConfig, S3Metric, ServiceMetric, SnsMetric, SqsMetric,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::AlarmCatalog;
use crate::construct::ConstructNode;
use crate::error::Result;
use crate::factory::AlarmFactory;
use crate::provision::AlarmProvisioner;
use crate::recommended::RecommendedAlarms;

/// 在构造树每个节点上执行的访问者
pub trait Aspect {
    fn name(&self) -> &str;

    /// 访问单个节点；不匹配的节点应直接返回 `Ok(())`
    fn visit(&self, node: &ConstructNode, provisioner: &mut dyn AlarmProvisioner) -> Result<()>;
}

/// 为匹配类型的每个资源应用推荐告警
pub struct RecommendedAlarmsAspect<M> {
    name: String,
    config: RecommendedAlarmsConfig<M>,
    exclude_resources: BTreeSet<String>,
    alarms: RecommendedAlarms<M>,
}

pub type LambdaAlarmsAspect = RecommendedAlarmsAspect<LambdaMetric>;
pub type S3AlarmsAspect = RecommendedAlarmsAspect<S3Metric>;
pub type SqsAlarmsAspect = RecommendedAlarmsAspect<SqsMetric>;
pub type SnsAlarmsAspect = RecommendedAlarmsAspect<SnsMetric>;

impl<M: ServiceMetric> RecommendedAlarmsAspect<M> {
    pub fn new(config: RecommendedAlarmsConfig<M>) -> Self {
        Self::with_catalog(config, Arc::new(AlarmCatalog::builtin()))
    }

    /// 使用自定义目录（多个切面可共享同一个目录）
    pub fn with_catalog(config: RecommendedAlarmsConfig<M>, catalog: Arc<AlarmCatalog>) -> Self {
        Self {
            name: format!("{}RecommendedAlarms", M::SERVICE),
            config,
            exclude_resources: BTreeSet::new(),
            alarms: RecommendedAlarms::new(AlarmFactory::new(catalog)),
        }
    }

    /// 排除某个资源（构造 ID 或完整路径）
    pub fn exclude_resource(mut self, id_or_path: impl Into<String>) -> Self {
        self.exclude_resources.insert(id_or_path.into());
        self
    }

    pub fn exclude_resources<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_resources.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn config(&self) -> &RecommendedAlarmsConfig<M> {
        &self.config
    }

    pub fn excluded_resources(&self) -> &BTreeSet<String> {
        &self.exclude_resources
    }

    pub fn is_excluded(&self, node: &ConstructNode) -> bool {
        self.exclude_resources.contains(node.id()) || self.exclude_resources.contains(node.path())
    }
}

impl<M: ServiceMetric> Aspect for RecommendedAlarmsAspect<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn visit(&self, node: &ConstructNode, provisioner: &mut dyn AlarmProvisioner) -> Result<()> {
        let handle = match node.resource_handle() {
            Some(handle) if handle.kind() == M::SERVICE.resource_kind() => handle,
            _ => return Ok(()),
        };

        if self.is_excluded(node) {
            warn!(path = %node.path(), aspect = %self.name, "Resource excluded from recommended alarms");
            return Ok(());
        }

        debug!(path = %node.path(), resource = %handle, "Applying recommended alarms");
        let alarms = self.alarms.apply(handle, &self.config)?;
        let count = alarms.len();
        provisioner.provision_all(node, alarms.into_values().collect())?;

        info!(path = %node.path(), alarms = count, aspect = %self.name, "Recommended alarms provisioned");
        Ok(())
    }
}
