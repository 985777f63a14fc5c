use cwalarm_logging::LoggingConfig;
use cwalarm_types::SharedDefaults;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::service::ServiceSection;

/// 全局配置（对应 `alarms.toml`）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// 所有服务共享的默认值
    #[serde(default)]
    pub defaults: SharedDefaults,

    /// 告警目录覆盖文件（相对配置目录）
    #[serde(default)]
    pub catalog: Option<PathBuf>,

    #[serde(default)]
    pub lambda: Option<ServiceSection>,
    #[serde(default)]
    pub s3: Option<ServiceSection>,
    #[serde(default)]
    pub sqs: Option<ServiceSection>,
    #[serde(default)]
    pub sns: Option<ServiceSection>,
}

impl GlobalConfig {
    /// 已启用的服务段数量
    pub fn enabled_services(&self) -> usize {
        [
            self.lambda.as_ref().map(|s| s.enabled),
            self.s3.as_ref().map(|s| s.enabled),
            self.sqs.as_ref().map(|s| s.enabled),
            self.sns.as_ref().map(|s| s.enabled),
        ]
        .into_iter()
        .filter(|enabled| *enabled == Some(true))
        .count()
    }
}
