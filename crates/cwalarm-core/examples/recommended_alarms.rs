use cwalarm_core::types::{
    AlarmConfig, LambdaMetric, RecommendedAlarmsConfig, ResourceHandle, SharedDefaults, SqsMetric,
};
use cwalarm_core::{
    Aspect, ConstructNode, InMemoryProvisioner, LambdaAlarmsAspect, S3AlarmsAspect,
    SqsAlarmsAspect,
};
use cwalarm_logging::{init_logging, LoggingConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LoggingConfig::default())?;

    println!("=== 推荐告警示例 ===\n");

    // 1. 构建构造树
    println!("1. 构建构造树");
    let mut app = ConstructNode::scope("App");
    let stack = app.add_child(ConstructNode::scope("OrdersStack"))?;
    stack.add_child(ConstructNode::resource("Api", ResourceHandle::function("orders-api")))?;
    stack.add_child(ConstructNode::resource("Worker", ResourceHandle::function("orders-worker")))?;
    stack.add_child(ConstructNode::resource("Jobs", ResourceHandle::queue("orders-jobs")))?;
    stack.add_child(ConstructNode::resource("Uploads", ResourceHandle::bucket("orders-uploads")))?;
    println!("共 {} 个节点\n", app.node_count());

    // 2. 配置切面
    println!("2. 配置切面");
    let defaults = SharedDefaults::default()
        .with_alarm_action("arn:aws:sns:us-east-1:123456789012:oncall");

    let lambda = LambdaAlarmsAspect::new(
        RecommendedAlarmsConfig::new()
            .with_defaults(defaults.clone())
            .with_alarm(LambdaMetric::Errors, AlarmConfig::new().with_threshold(1.0))
            .with_alarm(LambdaMetric::Throttles, AlarmConfig::new().with_threshold(0.0))
            .with_alarm(LambdaMetric::Duration, AlarmConfig::new().with_threshold(3000.0)),
    )
    .exclude_resource("Worker");

    let sqs = SqsAlarmsAspect::new(
        RecommendedAlarmsConfig::new()
            .with_defaults(defaults.clone())
            .with_alarm(
                SqsMetric::ApproximateAgeOfOldestMessage,
                AlarmConfig::new().with_threshold(900.0),
            )
            .with_alarm(
                SqsMetric::ApproximateNumberOfMessagesNotVisible,
                AlarmConfig::new().with_threshold(500.0),
            )
            .with_alarm(
                SqsMetric::ApproximateNumberOfMessagesVisible,
                AlarmConfig::new().with_threshold(1000.0),
            ),
    );

    let s3 = S3AlarmsAspect::new(RecommendedAlarmsConfig::new().with_defaults(defaults));

    let aspects: Vec<Box<dyn Aspect>> = vec![Box::new(lambda), Box::new(sqs), Box::new(s3)];
    println!("已配置 {} 个切面\n", aspects.len());

    // 3. 应用切面
    println!("3. 应用切面");
    let mut provisioner = InMemoryProvisioner::new();
    app.apply_aspects(&aspects, &mut provisioner)?;
    println!("共创建 {} 个告警\n", provisioner.len());

    for alarm in provisioner.definitions() {
        println!(
            "  {:<45} {} {} {} ({}/{})",
            alarm.alarm_name,
            alarm.statistic,
            alarm.metric_name,
            alarm.threshold,
            alarm.datapoints_to_alarm,
            alarm.evaluation_periods
        );
    }

    // 4. 输出清单
    println!("\n4. 告警清单");
    println!("{}", serde_json::to_string_pretty(&provisioner.manifest())?);

    Ok(())
}
