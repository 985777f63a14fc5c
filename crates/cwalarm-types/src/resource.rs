use serde::{Deserialize, Serialize};
use std::fmt;

use crate::alarm::Dimension;

/// S3 请求指标默认的过滤器 ID
pub const DEFAULT_S3_FILTER_ID: &str = "EntireBucket";

/// 可被监控的资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Bucket,
    Queue,
    Topic,
    Function,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Bucket => "Bucket",
            ResourceKind::Queue => "Queue",
            ResourceKind::Topic => "Topic",
            ResourceKind::Function => "Function",
        };
        f.write_str(name)
    }
}

/// 资源句柄
///
/// 每种资源只携带生成告警维度所需的物理名称。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceHandle {
    Bucket {
        bucket_name: String,
        filter_id: String,
    },
    Queue {
        queue_name: String,
    },
    Topic {
        topic_name: String,
    },
    Function {
        function_name: String,
    },
}

impl ResourceHandle {
    pub fn bucket(bucket_name: impl Into<String>) -> Self {
        Self::bucket_with_filter(bucket_name, DEFAULT_S3_FILTER_ID)
    }

    pub fn bucket_with_filter(bucket_name: impl Into<String>, filter_id: impl Into<String>) -> Self {
        ResourceHandle::Bucket {
            bucket_name: bucket_name.into(),
            filter_id: filter_id.into(),
        }
    }

    pub fn queue(queue_name: impl Into<String>) -> Self {
        ResourceHandle::Queue {
            queue_name: queue_name.into(),
        }
    }

    pub fn topic(topic_name: impl Into<String>) -> Self {
        ResourceHandle::Topic {
            topic_name: topic_name.into(),
        }
    }

    pub fn function(function_name: impl Into<String>) -> Self {
        ResourceHandle::Function {
            function_name: function_name.into(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceHandle::Bucket { .. } => ResourceKind::Bucket,
            ResourceHandle::Queue { .. } => ResourceKind::Queue,
            ResourceHandle::Topic { .. } => ResourceKind::Topic,
            ResourceHandle::Function { .. } => ResourceKind::Function,
        }
    }

    /// 资源物理名称，用于默认告警名
    pub fn name(&self) -> &str {
        match self {
            ResourceHandle::Bucket { bucket_name, .. } => bucket_name,
            ResourceHandle::Queue { queue_name } => queue_name,
            ResourceHandle::Topic { topic_name } => topic_name,
            ResourceHandle::Function { function_name } => function_name,
        }
    }

    /// CloudWatch 指标维度
    pub fn dimensions(&self) -> Vec<Dimension> {
        match self {
            ResourceHandle::Bucket {
                bucket_name,
                filter_id,
            } => vec![
                Dimension::new("BucketName", bucket_name),
                Dimension::new("FilterId", filter_id),
            ],
            ResourceHandle::Queue { queue_name } => vec![Dimension::new("QueueName", queue_name)],
            ResourceHandle::Topic { topic_name } => vec![Dimension::new("TopicName", topic_name)],
            ResourceHandle::Function { function_name } => {
                vec![Dimension::new("FunctionName", function_name)]
            }
        }
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.name())
    }
}
