//! Task-type tagging for usage analytics
//!
//! Independent of skill matching: the tag never influences routing.

use agentgv_types::TaskType;

/// Rules in priority order; the first rule with any hit wins
const RULES: &[(TaskType, &[&str])] = &[
    (TaskType::Architecture, &["架构", "设计", "system"]),
    (TaskType::Research, &["调研", "研究", "分析"]),
    (TaskType::Coding, &["开发", "实现", "编码"]),
    (TaskType::Review, &["测试", "审查", "质量"]),
    (TaskType::Documentation, &["文档", "报告", "写作"]),
    (TaskType::Coordination, &["协调", "管理", "项目"]),
];

/// Classify a task description, returning [`TaskType::Other`] when no rule fires
pub fn classify_task_type(description: &str) -> TaskType {
    let desc = description.to_lowercase();

    RULES
        .iter()
        .find(|(_, triggers)| triggers.iter().any(|t| desc.contains(t)))
        .map_or(TaskType::Other, |(task_type, _)| *task_type)
}
