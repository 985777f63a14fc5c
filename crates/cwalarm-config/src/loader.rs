use anyhow::{anyhow, Context, Result};
use config::{Config, File, FileFormat};
use cwalarm_core::{AlarmCatalog, AlarmFactory, Aspect, RecommendedAlarms, RecommendedAlarmsAspect};
use cwalarm_types::{
    LambdaMetric, ResourceHandle, ResourceKind, S3Metric, ServiceMetric, SharedDefaults, SnsMetric,
    SqsMetric,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog_file::CatalogFile;
use crate::global::GlobalConfig;
use crate::service::ServiceSection;

/// 全局配置文件名
pub const GLOBAL_CONFIG_FILE: &str = "alarms.toml";

/// 配置加载器
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// 创建配置加载器
    pub fn new<P: AsRef<Path>>(config_dir: P) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// 加载全局配置
    pub fn load_global(&self) -> Result<GlobalConfig> {
        let config_path = self.config_dir.join(GLOBAL_CONFIG_FILE);

        if !config_path.exists() {
            // 配置文件不存在时使用默认配置
            debug!(path = %config_path.display(), "Global config not found, using defaults");
            return Ok(GlobalConfig::default());
        }

        let config = Config::builder()
            .add_source(File::new(
                config_path.to_str().ok_or_else(|| anyhow!("Invalid config path"))?,
                FileFormat::Toml,
            ))
            .build()?;

        config
            .try_deserialize()
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    /// 加载告警目录（内置目录 + 可选覆盖文件）
    pub fn load_catalog(&self, global: &GlobalConfig) -> Result<AlarmCatalog> {
        let catalog = AlarmCatalog::builtin();

        let Some(relative) = &global.catalog else {
            return Ok(catalog);
        };

        let path = self.config_dir.join(relative);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Catalog file not readable: {}", path.display()))?;
        let catalog = CatalogFile::parse(&content)?.apply_to(catalog)?;

        info!(
            path = %path.display(),
            version = catalog.version(),
            "Alarm catalog loaded"
        );
        Ok(catalog)
    }

    /// 根据配置构建已启用服务的切面
    pub fn build_aspects(&self) -> Result<Vec<Box<dyn Aspect>>> {
        let global = self.load_global()?;
        let catalog = Arc::new(self.load_catalog(&global)?);

        let mut aspects: Vec<Box<dyn Aspect>> = Vec::new();
        push_aspect::<LambdaMetric>(&mut aspects, global.lambda.as_ref(), &global.defaults, &catalog)?;
        push_aspect::<S3Metric>(&mut aspects, global.s3.as_ref(), &global.defaults, &catalog)?;
        push_aspect::<SqsMetric>(&mut aspects, global.sqs.as_ref(), &global.defaults, &catalog)?;
        push_aspect::<SnsMetric>(&mut aspects, global.sns.as_ref(), &global.defaults, &catalog)?;

        info!(aspects = aspects.len(), "Recommended alarm aspects configured");
        Ok(aspects)
    }

    /// 验证配置
    ///
    /// 对每个已启用的服务试构建一次告警，提前暴露缺失阈值等配置错误。
    pub fn validate(&self) -> Result<()> {
        let global = self.load_global()?;
        let catalog = Arc::new(self.load_catalog(&global)?);

        validate_section::<LambdaMetric>(global.lambda.as_ref(), &global.defaults, &catalog)?;
        validate_section::<S3Metric>(global.s3.as_ref(), &global.defaults, &catalog)?;
        validate_section::<SqsMetric>(global.sqs.as_ref(), &global.defaults, &catalog)?;
        validate_section::<SnsMetric>(global.sns.as_ref(), &global.defaults, &catalog)?;

        Ok(())
    }
}

fn push_aspect<M: ServiceMetric>(
    aspects: &mut Vec<Box<dyn Aspect>>,
    section: Option<&ServiceSection>,
    global: &SharedDefaults,
    catalog: &Arc<AlarmCatalog>,
) -> Result<()> {
    let Some(section) = section.filter(|s| s.enabled) else {
        return Ok(());
    };

    let config = section.merge_with_global::<M>(global)?;
    let aspect = RecommendedAlarmsAspect::with_catalog(config, catalog.clone())
        .exclude_resources(section.exclude_resources.iter().cloned());
    aspects.push(Box::new(aspect));
    Ok(())
}

fn validate_section<M: ServiceMetric>(
    section: Option<&ServiceSection>,
    global: &SharedDefaults,
    catalog: &Arc<AlarmCatalog>,
) -> Result<()> {
    let Some(section) = section.filter(|s| s.enabled) else {
        return Ok(());
    };

    let config = section.merge_with_global::<M>(global)?;
    let placeholder = placeholder_resource(M::SERVICE.resource_kind());
    RecommendedAlarms::<M>::new(AlarmFactory::new(catalog.clone()))
        .apply(&placeholder, &config)
        .with_context(|| format!("Invalid [{}] section", M::SERVICE.key()))?;
    Ok(())
}

fn placeholder_resource(kind: ResourceKind) -> ResourceHandle {
    const NAME: &str = "validation";
    match kind {
        ResourceKind::Bucket => ResourceHandle::bucket(NAME),
        ResourceKind::Queue => ResourceHandle::queue(NAME),
        ResourceKind::Topic => ResourceHandle::topic(NAME),
        ResourceKind::Function => ResourceHandle::function(NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cwalarm_core::{ConstructNode, InMemoryProvisioner};
    use cwalarm_logging::{LogFormat, LogLevel};
    use cwalarm_types::{AlarmAction, TreatMissingData};
    use std::fs;
    use tempfile::tempdir;

    const GLOBAL: &str = r#"
catalog = "catalog.toml"

[logging]
level = "debug"
format = "json"

[defaults]
default_alarm_action = "arn:aws:sns:us-east-1:123456789012:ops"
treat_missing_data = "not_breaching"

[lambda]
exclude_resources = ["Lambda1"]
exclude_alarms = ["duration"]

[lambda.alarms.errors]
threshold = 1.0

[lambda.alarms.throttles]
threshold = 0.0
alarm_action = "arn:aws:sns:us-east-1:123456789012:lambda"

[s3]
enabled = false
"#;

    const CATALOG: &str = r#"
version = "team-2025-01"

[[metrics]]
service = "lambda"
metric = "errors"
evaluation_periods = 5
datapoints_to_alarm = 2
"#;

    fn write_config(dir: &Path, global: &str, catalog: Option<&str>) {
        fs::write(dir.join(GLOBAL_CONFIG_FILE), global).unwrap();
        if let Some(catalog) = catalog {
            fs::write(dir.join("catalog.toml"), catalog).unwrap();
        }
    }

    #[test]
    fn test_load_default_global_config() {
        let temp_dir = tempdir().unwrap();
        let loader = ConfigLoader::new(temp_dir.path());

        let config = loader.load_global().unwrap();
        assert_eq!(config.enabled_services(), 0);
        assert_eq!(loader.load_catalog(&config).unwrap(), AlarmCatalog::builtin());
        assert!(loader.build_aspects().unwrap().is_empty());
        assert!(loader.validate().is_ok());
    }

    #[test]
    fn test_load_global_config_from_file() {
        let temp_dir = tempdir().unwrap();
        write_config(temp_dir.path(), GLOBAL, Some(CATALOG));

        let loader = ConfigLoader::new(temp_dir.path());
        let config = loader.load_global().unwrap();

        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.defaults.default_alarm_action,
            Some(AlarmAction::new("arn:aws:sns:us-east-1:123456789012:ops"))
        );
        assert_eq!(config.defaults.treat_missing_data, Some(TreatMissingData::NotBreaching));

        let lambda = config.lambda.as_ref().unwrap();
        assert!(lambda.enabled);
        assert_eq!(lambda.exclude_resources, vec!["Lambda1".to_string()]);
        assert_eq!(lambda.exclude_alarms, vec!["duration".to_string()]);
        assert_eq!(lambda.alarms["errors"].threshold, Some(1.0));
        assert!(!config.s3.as_ref().unwrap().enabled);
        assert_eq!(config.enabled_services(), 1);

        let catalog = loader.load_catalog(&config).unwrap();
        assert_eq!(catalog.version(), "team-2025-01");
        assert_eq!(catalog.get(LambdaMetric::Errors).unwrap().evaluation_periods, 5);
    }

    #[test]
    fn test_build_aspects_and_apply() {
        let temp_dir = tempdir().unwrap();
        write_config(temp_dir.path(), GLOBAL, Some(CATALOG));
        let loader = ConfigLoader::new(temp_dir.path());

        let aspects = loader.build_aspects().unwrap();
        assert_eq!(aspects.len(), 1);

        let app = ConstructNode::scope("App")
            .with_child(ConstructNode::resource("Lambda1", ResourceHandle::function("lambda-1")))
            .unwrap()
            .with_child(ConstructNode::resource("Lambda2", ResourceHandle::function("lambda-2")))
            .unwrap()
            .with_child(ConstructNode::resource("Assets", ResourceHandle::bucket("assets")))
            .unwrap();
        let mut provisioner = InMemoryProvisioner::new();
        app.apply_aspects(&aspects, &mut provisioner).unwrap();

        assert_eq!(provisioner.len(), 2);
        let errors = provisioner.get("App/Lambda2/Lambda2ErrorsAlarm").unwrap();
        assert_eq!(errors.evaluation_periods, 5);
        assert_eq!(errors.datapoints_to_alarm, 2);
        assert_eq!(errors.treat_missing_data, TreatMissingData::NotBreaching);
        assert_eq!(
            errors.alarm_actions,
            vec![AlarmAction::new("arn:aws:sns:us-east-1:123456789012:ops")]
        );

        let throttles = provisioner.get("App/Lambda2/Lambda2ThrottlesAlarm").unwrap();
        assert_eq!(
            throttles.alarm_actions,
            vec![AlarmAction::new("arn:aws:sns:us-east-1:123456789012:lambda")]
        );
    }

    #[test]
    fn test_cloudwatch_metric_name_keys() {
        let temp_dir = tempdir().unwrap();
        write_config(
            temp_dir.path(),
            r#"
[lambda.alarms.Errors]
threshold = 1.0

[lambda.alarms.Throttles]
threshold = 0.0

[lambda.alarms.Duration]
threshold = 3000.0

[lambda.alarms.ConcurrentExecutions]
threshold = 900.0

[s3.alarms.4xxErrors]
threshold = 0.1

[sns]
exclude_alarms = ["NumberOfNotificationsFailed"]

[sns.alarms.NumberOfNotificationsFilteredOut-InvalidAttributes]
threshold = 5.0
"#,
            None,
        );
        let loader = ConfigLoader::new(temp_dir.path());
        assert!(loader.validate().is_ok());

        let aspects = loader.build_aspects().unwrap();
        assert_eq!(aspects.len(), 3);

        let app = ConstructNode::scope("App")
            .with_child(ConstructNode::resource("Fn", ResourceHandle::function("fn")))
            .unwrap()
            .with_child(ConstructNode::resource("Assets", ResourceHandle::bucket("assets")))
            .unwrap()
            .with_child(ConstructNode::resource("Events", ResourceHandle::topic("events")))
            .unwrap();
        let mut provisioner = InMemoryProvisioner::new();
        app.apply_aspects(&aspects, &mut provisioner).unwrap();

        assert_eq!(provisioner.for_scope("App/Fn").count(), 4);
        assert_eq!(
            provisioner
                .get("App/Fn/FnConcurrentExecutionsAlarm")
                .unwrap()
                .threshold,
            900.0
        );
        assert_eq!(
            provisioner.get("App/Assets/Assets4xxErrorsAlarm").unwrap().threshold,
            0.1
        );
        assert_eq!(provisioner.for_scope("App/Events").count(), 4);
        assert_eq!(
            provisioner
                .get("App/Events/EventsNumberOfNotificationsFilteredOutInvalidAttributesAlarm")
                .unwrap()
                .threshold,
            5.0
        );
        assert!(provisioner
            .get("App/Events/EventsNumberOfNotificationsFailedAlarm")
            .is_none());
    }

    #[test]
    fn test_validate_config() {
        let temp_dir = tempdir().unwrap();
        write_config(temp_dir.path(), GLOBAL, Some(CATALOG));
        assert!(ConfigLoader::new(temp_dir.path()).validate().is_ok());
    }

    #[test]
    fn test_validate_reports_missing_threshold() {
        let temp_dir = tempdir().unwrap();
        write_config(
            temp_dir.path(),
            r#"
[sqs]
exclude_alarms = ["approximate_age_of_oldest_message"]
"#,
            None,
        );

        let err = ConfigLoader::new(temp_dir.path()).validate().unwrap_err();
        assert!(format!("{:#}", err).contains("[sqs]"));
    }

    #[test]
    fn test_missing_catalog_file() {
        let temp_dir = tempdir().unwrap();
        write_config(temp_dir.path(), "catalog = \"absent.toml\"\n", None);

        let loader = ConfigLoader::new(temp_dir.path());
        let global = loader.load_global().unwrap();
        assert!(loader.load_catalog(&global).is_err());
    }
}
