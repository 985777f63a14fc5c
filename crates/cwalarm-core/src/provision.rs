use cwalarm_types::AlarmDefinition;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::construct::ConstructNode;
use crate::error::{AlarmError, Result};

/// 已创建告警的句柄
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AlarmHandle {
    /// `<作用域路径>/<逻辑 ID>`
    pub key: String,
    pub alarm_name: String,
}

/// 告警资源创建方
///
/// 接收完全解析的告警定义，在指定作用域下登记告警资源。
pub trait AlarmProvisioner {
    fn provision(&mut self, scope: &ConstructNode, definition: AlarmDefinition) -> Result<AlarmHandle>;

    /// 在同一作用域下创建一组告警
    fn provision_all(
        &mut self,
        scope: &ConstructNode,
        definitions: Vec<AlarmDefinition>,
    ) -> Result<Vec<AlarmHandle>> {
        definitions
            .into_iter()
            .map(|definition| self.provision(scope, definition))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
struct ProvisionedAlarm {
    key: String,
    scope: String,
    definition: AlarmDefinition,
}

/// 内存中的告警创建方，按创建顺序记录告警定义
#[derive(Debug, Default)]
pub struct InMemoryProvisioner {
    alarms: Vec<ProvisionedAlarm>,
    index: HashMap<String, usize>,
}

impl InMemoryProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    /// 全部告警定义（按创建顺序）
    pub fn definitions(&self) -> impl Iterator<Item = &AlarmDefinition> {
        self.alarms.iter().map(|a| &a.definition)
    }

    /// 某个作用域下创建的告警
    pub fn for_scope<'a>(&'a self, scope_path: &'a str) -> impl Iterator<Item = &'a AlarmDefinition> {
        self.alarms
            .iter()
            .filter(move |a| a.scope == scope_path)
            .map(|a| &a.definition)
    }

    pub fn get(&self, key: &str) -> Option<&AlarmDefinition> {
        self.index.get(key).map(|&i| &self.alarms[i].definition)
    }

    /// 告警清单（JSON）
    pub fn manifest(&self) -> serde_json::Value {
        serde_json::json!({
            "alarmCount": self.alarms.len(),
            "alarms": self.alarms,
        })
    }
}

fn alarm_key(scope: &ConstructNode, definition: &AlarmDefinition) -> String {
    format!("{}/{}", scope.path(), definition.logical_id)
}

impl AlarmProvisioner for InMemoryProvisioner {
    fn provision(&mut self, scope: &ConstructNode, definition: AlarmDefinition) -> Result<AlarmHandle> {
        let key = alarm_key(scope, &definition);
        if self.index.contains_key(&key) {
            return Err(AlarmError::DuplicateAlarm(key));
        }

        let handle = AlarmHandle {
            key: key.clone(),
            alarm_name: definition.alarm_name.clone(),
        };
        info!(key = %key, alarm_name = %definition.alarm_name, "Alarm provisioned");

        self.index.insert(key.clone(), self.alarms.len());
        self.alarms.push(ProvisionedAlarm {
            key,
            scope: scope.path().to_string(),
            definition,
        });

        Ok(handle)
    }

    /// 先检查整组键是否冲突，任一冲突则一个都不创建
    fn provision_all(
        &mut self,
        scope: &ConstructNode,
        definitions: Vec<AlarmDefinition>,
    ) -> Result<Vec<AlarmHandle>> {
        let mut keys = HashSet::with_capacity(definitions.len());
        for definition in &definitions {
            let key = alarm_key(scope, definition);
            if self.index.contains_key(&key) || !keys.insert(key.clone()) {
                return Err(AlarmError::DuplicateAlarm(key));
            }
        }

        definitions
            .into_iter()
            .map(|definition| self.provision(scope, definition))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::AlarmFactory;
    use cwalarm_types::{AlarmConfig, ResourceHandle, S3Metric, SharedDefaults};

    fn bucket_alarm(metric: S3Metric) -> AlarmDefinition {
        AlarmFactory::builtin()
            .build(
                &ResourceHandle::bucket("assets"),
                metric,
                &AlarmConfig::new(),
                &SharedDefaults::default(),
            )
            .unwrap()
    }

    #[test]
    fn test_provision_records_in_order() {
        let scope = ConstructNode::resource("Assets", ResourceHandle::bucket("assets"));
        let mut provisioner = InMemoryProvisioner::new();

        let handle = provisioner
            .provision(&scope, bucket_alarm(S3Metric::Errors4xx))
            .unwrap();
        provisioner
            .provision(&scope, bucket_alarm(S3Metric::Errors5xx))
            .unwrap();

        assert_eq!(handle.key, "Assets/Assets4xxErrorsAlarm");
        assert_eq!(handle.alarm_name, "assets - 4xxErrors");
        assert_eq!(provisioner.len(), 2);
        assert_eq!(provisioner.for_scope("Assets").count(), 2);
        assert!(provisioner.get("Assets/Assets5xxErrorsAlarm").is_some());

        let names: Vec<_> = provisioner.definitions().map(|d| d.metric_name.as_str()).collect();
        assert_eq!(names, vec!["4xxErrors", "5xxErrors"]);
    }

    #[test]
    fn test_duplicate_alarm_rejected() {
        let scope = ConstructNode::resource("Assets", ResourceHandle::bucket("assets"));
        let mut provisioner = InMemoryProvisioner::new();

        provisioner
            .provision(&scope, bucket_alarm(S3Metric::Errors4xx))
            .unwrap();
        let err = provisioner
            .provision(&scope, bucket_alarm(S3Metric::Errors4xx))
            .unwrap_err();

        assert_eq!(err, AlarmError::DuplicateAlarm("Assets/Assets4xxErrorsAlarm".to_string()));
        assert_eq!(provisioner.len(), 1);
    }

    #[test]
    fn test_provision_all_is_atomic() {
        let scope = ConstructNode::resource("Assets", ResourceHandle::bucket("assets"));
        let mut provisioner = InMemoryProvisioner::new();
        provisioner
            .provision(&scope, bucket_alarm(S3Metric::Errors5xx))
            .unwrap();

        let err = provisioner
            .provision_all(
                &scope,
                vec![bucket_alarm(S3Metric::Errors4xx), bucket_alarm(S3Metric::Errors5xx)],
            )
            .unwrap_err();
        assert_eq!(err, AlarmError::DuplicateAlarm("Assets/Assets5xxErrorsAlarm".to_string()));
        assert_eq!(provisioner.len(), 1);
        assert!(provisioner.get("Assets/Assets4xxErrorsAlarm").is_none());

        // 同一批内重复也会整体拒绝
        let mut fresh = InMemoryProvisioner::new();
        assert!(fresh
            .provision_all(
                &scope,
                vec![bucket_alarm(S3Metric::Errors4xx), bucket_alarm(S3Metric::Errors4xx)],
            )
            .is_err());
        assert!(fresh.is_empty());

        let handles = fresh
            .provision_all(
                &scope,
                vec![bucket_alarm(S3Metric::Errors4xx), bucket_alarm(S3Metric::Errors5xx)],
            )
            .unwrap();
        assert_eq!(handles.len(), 2);
        assert_eq!(fresh.len(), 2);
    }

    #[test]
    fn test_manifest() {
        let scope = ConstructNode::resource("Assets", ResourceHandle::bucket("assets"));
        let mut provisioner = InMemoryProvisioner::new();
        provisioner
            .provision(&scope, bucket_alarm(S3Metric::Errors4xx))
            .unwrap();

        let manifest = provisioner.manifest();
        assert_eq!(manifest["alarmCount"], 1);
        let alarm = &manifest["alarms"][0];
        assert_eq!(alarm["scope"], "Assets");
        assert_eq!(alarm["definition"]["metricName"], "4xxErrors");
        assert_eq!(alarm["definition"]["statistic"], "Average");
        assert_eq!(alarm["definition"]["threshold"], 0.05);
        assert_eq!(alarm["definition"]["dimensions"][1]["value"], "EntireBucket");
    }
}
